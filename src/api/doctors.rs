use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_required, validate_slots};
use crate::auth::{authorize, CurrentPrincipal, Operation};
use crate::db::{CreateDoctorRequest, DoctorResponse, UpdateDoctorRequest};
use crate::services::DoctorService;
use crate::AppState;

/// List every doctor profile
pub async fn list_doctors(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<Vec<DoctorResponse>>, ApiError> {
    authorize(principal.as_ref(), Operation::ListDoctors)?;
    let doctors = DoctorService::new(&state.db).list().await?;
    Ok(Json(doctors.into_iter().map(DoctorResponse::from).collect()))
}

pub async fn get_doctor(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<i64>,
) -> Result<Json<DoctorResponse>, ApiError> {
    authorize(principal.as_ref(), Operation::GetDoctor)?;
    let doctor = DoctorService::new(&state.db).get(id).await?;
    Ok(Json(DoctorResponse::from(doctor)))
}

/// Attach a doctor profile to an existing DOCTOR user
pub async fn create_doctor(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Json(req): Json<CreateDoctorRequest>,
) -> Result<(StatusCode, Json<DoctorResponse>), ApiError> {
    authorize(principal.as_ref(), Operation::CreateDoctor)?;

    let mut errors = ValidationErrorBuilder::new();
    errors.check("specialization", validate_required(&req.specialization, "Specialization"));
    if let Some(slots) = &req.available_slots {
        errors.check("available_slots", validate_slots(slots));
    }
    errors.finish()?;

    let doctor = DoctorService::new(&state.db).create(&req).await?;
    Ok((StatusCode::CREATED, Json(DoctorResponse::from(doctor))))
}

/// Update a profile. Doctors may only update their own.
pub async fn update_doctor(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<i64>,
    Json(req): Json<UpdateDoctorRequest>,
) -> Result<Json<DoctorResponse>, ApiError> {
    let caller = authorize(principal.as_ref(), Operation::UpdateDoctor)?;

    let mut errors = ValidationErrorBuilder::new();
    errors
        .check("specialization", validate_required(&req.specialization, "Specialization"))
        .check("available_slots", validate_slots(&req.available_slots));
    errors.finish()?;

    let doctor = DoctorService::new(&state.db).update(id, &req, caller).await?;
    Ok(Json(DoctorResponse::from(doctor)))
}

pub async fn delete_doctor(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    authorize(principal.as_ref(), Operation::DeleteDoctor)?;
    DoctorService::new(&state.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
