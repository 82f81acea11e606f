//! Appointments between a patient and a doctor profile.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use crate::auth::ScopedRecord;
use crate::db::now_rfc3339;

/// Time-of-day format stored in `appointment_time`
pub const TIME_FORMAT: &str = "%H:%M";

/// Appointment lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AppointmentStatus {
    Pending,
    Approved,
    Rejected,
    Canceled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "PENDING",
            AppointmentStatus::Approved => "APPROVED",
            AppointmentStatus::Rejected => "REJECTED",
            AppointmentStatus::Canceled => "CANCELED",
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(AppointmentStatus::Pending),
            "APPROVED" => Ok(AppointmentStatus::Approved),
            "REJECTED" => Ok(AppointmentStatus::Rejected),
            "CANCELED" => Ok(AppointmentStatus::Canceled),
            _ => Err(format!("Unknown appointment status: {}", s)),
        }
    }
}

/// Appointment joined with the patient and the doctor profile's user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AppointmentDetail {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub reason: Option<String>,
    pub appointment_date: String,
    pub appointment_time: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
    pub patient_name: String,
    pub patient_email: String,
    pub doctor_name: String,
    pub doctor_email: String,
    pub specialization: String,
}

impl ScopedRecord for AppointmentDetail {
    fn patient_identity(&self) -> &str {
        &self.patient_email
    }

    fn doctor_identity(&self) -> &str {
        &self.doctor_email
    }
}

const DETAIL_SELECT: &str = r#"
    SELECT a.id, a.patient_id, a.doctor_id, a.reason, a.appointment_date,
           a.appointment_time, a.status, a.created_at, a.updated_at,
           p.name AS patient_name, p.email AS patient_email,
           du.name AS doctor_name, du.email AS doctor_email,
           d.specialization AS specialization
    FROM appointments a
    JOIN users p ON p.id = a.patient_id
    JOIN doctors d ON d.id = a.doctor_id
    JOIN users du ON du.id = d.user_id
"#;

/// Values written by insert and full update
#[derive(Debug, Clone)]
pub struct AppointmentFields<'a> {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub reason: Option<&'a str>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub status: AppointmentStatus,
}

impl AppointmentDetail {
    /// Parsed status; rows are constrained to the four known values
    pub fn status_enum(&self) -> Option<AppointmentStatus> {
        self.status.parse().ok()
    }

    pub async fn insert(db: &SqlitePool, fields: &AppointmentFields<'_>) -> Result<i64, sqlx::Error> {
        let now = now_rfc3339();
        let result = sqlx::query(
            r#"
            INSERT INTO appointments (patient_id, doctor_id, reason, appointment_date, appointment_time, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(fields.patient_id)
        .bind(fields.doctor_id)
        .bind(fields.reason)
        .bind(fields.date.to_string())
        .bind(fields.time.format(TIME_FORMAT).to_string())
        .bind(fields.status.as_str())
        .bind(&now)
        .bind(&now)
        .execute(db)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(
        db: &SqlitePool,
        id: i64,
    ) -> Result<Option<AppointmentDetail>, sqlx::Error> {
        sqlx::query_as(&format!("{} WHERE a.id = ?", DETAIL_SELECT))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn list_all(db: &SqlitePool) -> Result<Vec<AppointmentDetail>, sqlx::Error> {
        sqlx::query_as(&format!("{} ORDER BY a.id ASC", DETAIL_SELECT))
            .fetch_all(db)
            .await
    }

    pub async fn list_by_patient(
        db: &SqlitePool,
        patient_id: i64,
    ) -> Result<Vec<AppointmentDetail>, sqlx::Error> {
        sqlx::query_as(&format!("{} WHERE a.patient_id = ? ORDER BY a.id ASC", DETAIL_SELECT))
            .bind(patient_id)
            .fetch_all(db)
            .await
    }

    pub async fn list_by_doctor(
        db: &SqlitePool,
        doctor_id: i64,
    ) -> Result<Vec<AppointmentDetail>, sqlx::Error> {
        sqlx::query_as(&format!("{} WHERE a.doctor_id = ? ORDER BY a.id ASC", DETAIL_SELECT))
            .bind(doctor_id)
            .fetch_all(db)
            .await
    }

    pub async fn update(
        db: &SqlitePool,
        id: i64,
        fields: &AppointmentFields<'_>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE appointments
            SET patient_id = ?, doctor_id = ?, reason = ?, appointment_date = ?,
                appointment_time = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(fields.patient_id)
        .bind(fields.doctor_id)
        .bind(fields.reason)
        .bind(fields.date.to_string())
        .bind(fields.time.format(TIME_FORMAT).to_string())
        .bind(fields.status.as_str())
        .bind(now_rfc3339())
        .bind(id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn set_status(
        db: &SqlitePool,
        id: i64,
        status: AppointmentStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE appointments SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(now_rfc3339())
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(db: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Appointment as returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentResponse {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub patient_email: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub doctor_email: String,
    pub specialization: String,
    pub reason: Option<String>,
    pub appointment_date: String,
    pub appointment_time: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<AppointmentDetail> for AppointmentResponse {
    fn from(a: AppointmentDetail) -> Self {
        Self {
            id: a.id,
            patient_id: a.patient_id,
            patient_name: a.patient_name,
            patient_email: a.patient_email,
            doctor_id: a.doctor_id,
            doctor_name: a.doctor_name,
            doctor_email: a.doctor_email,
            specialization: a.specialization,
            reason: a.reason,
            appointment_date: a.appointment_date,
            appointment_time: a.appointment_time,
            status: a.status,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer};

    /// Accepts `HH:MM` and `HH:MM:SS`
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, super::TIME_FORMAT)
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

/// Booking request. `patient_id` and `status` are accepted in any shape and
/// ignored: the patient is always the caller and new bookings are pending.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub doctor_id: i64,
    pub reason: Option<String>,
    pub appointment_date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub appointment_time: NaiveTime,
    #[serde(default)]
    pub patient_id: Option<serde_json::Value>,
    #[serde(default)]
    pub status: Option<serde_json::Value>,
}

/// Full overwrite of an appointment
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub reason: Option<String>,
    pub appointment_date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub appointment_time: NaiveTime,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}
