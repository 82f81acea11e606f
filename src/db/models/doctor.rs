//! Doctor profiles.
//!
//! A profile belongs to exactly one user with the DOCTOR role. Reads go
//! through [`DoctorDetail`], which joins in the owning user's name and email so
//! callers can match a profile to an authenticated identity.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor, SqlitePool};

use crate::db::now_rfc3339;

/// Slots given to a doctor profile registered without any
pub const DEFAULT_SLOTS: [&str; 4] = ["09:00", "10:30", "14:00", "15:30"];

pub fn default_slots() -> Vec<String> {
    DEFAULT_SLOTS.iter().map(|s| s.to_string()).collect()
}

/// Encode a slot list for the `available_slots` column
pub fn slots_to_json(slots: &[String]) -> String {
    serde_json::to_string(slots).unwrap_or_else(|_| "[]".to_string())
}

/// Decode the `available_slots` column; unreadable values decode to no slots
pub fn slots_from_json(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

/// Profile row joined with its owning user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DoctorDetail {
    pub id: i64,
    pub user_id: i64,
    pub specialization: String,
    pub clinic_name: Option<String>,
    pub location: Option<String>,
    pub available_slots: String,
    pub created_at: String,
    pub updated_at: String,
    pub name: String,
    pub email: String,
}

const DETAIL_SELECT: &str = r#"
    SELECT d.id, d.user_id, d.specialization, d.clinic_name, d.location,
           d.available_slots, d.created_at, d.updated_at,
           u.name AS name, u.email AS email
    FROM doctors d
    JOIN users u ON u.id = d.user_id
"#;

/// Mutable profile fields
#[derive(Debug, Clone)]
pub struct DoctorFields<'a> {
    pub specialization: &'a str,
    pub clinic_name: Option<&'a str>,
    pub location: Option<&'a str>,
    pub available_slots: &'a [String],
}

impl DoctorDetail {
    pub fn slots(&self) -> Vec<String> {
        slots_from_json(&self.available_slots)
    }

    /// Insert a profile for `user_id` and return its id
    pub async fn insert<'e, E: SqliteExecutor<'e>>(
        executor: E,
        user_id: i64,
        fields: &DoctorFields<'_>,
    ) -> Result<i64, sqlx::Error> {
        let now = now_rfc3339();
        let result = sqlx::query(
            r#"
            INSERT INTO doctors (user_id, specialization, clinic_name, location, available_slots, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(fields.specialization)
        .bind(fields.clinic_name)
        .bind(fields.location)
        .bind(slots_to_json(fields.available_slots))
        .bind(&now)
        .bind(&now)
        .execute(executor)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(db: &SqlitePool, id: i64) -> Result<Option<DoctorDetail>, sqlx::Error> {
        sqlx::query_as(&format!("{} WHERE d.id = ?", DETAIL_SELECT))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn find_by_user_id(
        db: &SqlitePool,
        user_id: i64,
    ) -> Result<Option<DoctorDetail>, sqlx::Error> {
        sqlx::query_as(&format!("{} WHERE d.user_id = ?", DETAIL_SELECT))
            .bind(user_id)
            .fetch_optional(db)
            .await
    }

    pub async fn list_all(db: &SqlitePool) -> Result<Vec<DoctorDetail>, sqlx::Error> {
        sqlx::query_as(&format!("{} ORDER BY d.id ASC", DETAIL_SELECT))
            .fetch_all(db)
            .await
    }

    pub async fn update(
        db: &SqlitePool,
        id: i64,
        fields: &DoctorFields<'_>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE doctors
            SET specialization = ?, clinic_name = ?, location = ?, available_slots = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(fields.specialization)
        .bind(fields.clinic_name)
        .bind(fields.location)
        .bind(slots_to_json(fields.available_slots))
        .bind(now_rfc3339())
        .bind(id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM doctors WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Doctor profile as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorResponse {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub specialization: String,
    pub clinic_name: Option<String>,
    pub location: Option<String>,
    pub available_slots: Vec<String>,
}

impl From<DoctorDetail> for DoctorResponse {
    fn from(doctor: DoctorDetail) -> Self {
        let available_slots = doctor.slots();
        Self {
            id: doctor.id,
            user_id: doctor.user_id,
            name: doctor.name,
            email: doctor.email,
            specialization: doctor.specialization,
            clinic_name: doctor.clinic_name,
            location: doctor.location,
            available_slots,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDoctorRequest {
    pub user_id: i64,
    pub specialization: String,
    pub clinic_name: Option<String>,
    pub location: Option<String>,
    pub available_slots: Option<Vec<String>>,
}

/// Full replacement of a profile's editable fields
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDoctorRequest {
    pub specialization: String,
    pub clinic_name: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub available_slots: Vec<String>,
}
