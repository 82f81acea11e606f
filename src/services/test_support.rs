//! Fixtures shared by the service tests.

use chrono::{NaiveDate, NaiveTime};

use crate::auth::{Principal, Role};
use crate::db::{default_slots, init_in_memory, DbPool, DoctorDetail, DoctorFields, User};
use crate::db::{AppointmentStatus, CreateAppointmentRequest};

pub async fn test_pool() -> DbPool {
    init_in_memory().await.unwrap()
}

async fn insert_user(pool: &DbPool, email: &str, role: Role) -> i64 {
    User::insert(pool, "Test User", email, "not-a-real-hash", role)
        .await
        .unwrap()
}

pub async fn register_patient(pool: &DbPool, email: &str) -> i64 {
    insert_user(pool, email, Role::Patient).await
}

pub async fn register_admin(pool: &DbPool, email: &str) -> i64 {
    insert_user(pool, email, Role::Admin).await
}

/// Returns (user id, doctor profile id)
pub async fn register_doctor(pool: &DbPool, email: &str) -> (i64, i64) {
    let user_id = insert_user(pool, email, Role::Doctor).await;
    let slots = default_slots();
    let doctor_id = DoctorDetail::insert(
        pool,
        user_id,
        &DoctorFields {
            specialization: "Cardiology",
            clinic_name: Some("Heart Care Center"),
            location: None,
            available_slots: &slots,
        },
    )
    .await
    .unwrap();
    (user_id, doctor_id)
}

pub fn patient(email: &str) -> Principal {
    Principal::new(email, Role::Patient)
}

pub fn doctor(email: &str) -> Principal {
    Principal::new(email, Role::Doctor)
}

pub fn admin(email: &str) -> Principal {
    Principal::new(email, Role::Admin)
}

pub fn booking(doctor_id: i64) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        doctor_id,
        reason: Some("Checkup".to_string()),
        appointment_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        appointment_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        patient_id: None,
        status: None,
    }
}

pub const ALL_STATUSES: [AppointmentStatus; 4] = [
    AppointmentStatus::Pending,
    AppointmentStatus::Approved,
    AppointmentStatus::Rejected,
    AppointmentStatus::Canceled,
];
