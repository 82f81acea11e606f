//! Prescriptions written by a doctor profile for a patient.

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::auth::ScopedRecord;
use crate::db::now_rfc3339;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PrescriptionDetail {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub patient_name: String,
    pub patient_email: String,
    pub doctor_name: String,
    pub doctor_email: String,
}

impl ScopedRecord for PrescriptionDetail {
    fn patient_identity(&self) -> &str {
        &self.patient_email
    }

    fn doctor_identity(&self) -> &str {
        &self.doctor_email
    }
}

const DETAIL_SELECT: &str = r#"
    SELECT r.id, r.patient_id, r.doctor_id, r.medication_name, r.dosage,
           r.frequency, r.notes, r.created_at, r.updated_at,
           p.name AS patient_name, p.email AS patient_email,
           du.name AS doctor_name, du.email AS doctor_email
    FROM prescriptions r
    JOIN users p ON p.id = r.patient_id
    JOIN doctors d ON d.id = r.doctor_id
    JOIN users du ON du.id = d.user_id
"#;

#[derive(Debug, Clone)]
pub struct PrescriptionFields<'a> {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub medication_name: &'a str,
    pub dosage: &'a str,
    pub frequency: &'a str,
    pub notes: Option<&'a str>,
}

impl PrescriptionDetail {
    pub async fn insert(db: &SqlitePool, fields: &PrescriptionFields<'_>) -> Result<i64, sqlx::Error> {
        let now = now_rfc3339();
        let result = sqlx::query(
            r#"
            INSERT INTO prescriptions (patient_id, doctor_id, medication_name, dosage, frequency, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(fields.patient_id)
        .bind(fields.doctor_id)
        .bind(fields.medication_name)
        .bind(fields.dosage)
        .bind(fields.frequency)
        .bind(fields.notes)
        .bind(&now)
        .bind(&now)
        .execute(db)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(
        db: &SqlitePool,
        id: i64,
    ) -> Result<Option<PrescriptionDetail>, sqlx::Error> {
        sqlx::query_as(&format!("{} WHERE r.id = ?", DETAIL_SELECT))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn list_all(db: &SqlitePool) -> Result<Vec<PrescriptionDetail>, sqlx::Error> {
        sqlx::query_as(&format!("{} ORDER BY r.id ASC", DETAIL_SELECT))
            .fetch_all(db)
            .await
    }

    pub async fn update(
        db: &SqlitePool,
        id: i64,
        fields: &PrescriptionFields<'_>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE prescriptions
            SET patient_id = ?, doctor_id = ?, medication_name = ?, dosage = ?,
                frequency = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(fields.patient_id)
        .bind(fields.doctor_id)
        .bind(fields.medication_name)
        .bind(fields.dosage)
        .bind(fields.frequency)
        .bind(fields.notes)
        .bind(now_rfc3339())
        .bind(id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM prescriptions WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrescriptionResponse {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub patient_email: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub doctor_email: String,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<PrescriptionDetail> for PrescriptionResponse {
    fn from(p: PrescriptionDetail) -> Self {
        Self {
            id: p.id,
            patient_id: p.patient_id,
            patient_name: p.patient_name,
            patient_email: p.patient_email,
            doctor_id: p.doctor_id,
            doctor_name: p.doctor_name,
            doctor_email: p.doctor_email,
            medication_name: p.medication_name,
            dosage: p.dosage,
            frequency: p.frequency,
            notes: p.notes,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// New prescription. The writing doctor is always the caller's own profile.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePrescriptionRequest {
    pub patient_id: i64,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub notes: Option<String>,
}

/// Full overwrite of a prescription
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePrescriptionRequest {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub medication_name: String,
    pub dosage: String,
    pub frequency: String,
    pub notes: Option<String>,
}
