use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::validate_required;
use crate::auth::{authorize, CurrentPrincipal, Operation};
use crate::db::{
    CreatePrescriptionRequest, PrescriptionDetail, PrescriptionResponse,
    UpdatePrescriptionRequest,
};
use crate::services::PrescriptionService;
use crate::AppState;

fn to_responses(prescriptions: Vec<PrescriptionDetail>) -> Json<Vec<PrescriptionResponse>> {
    Json(prescriptions.into_iter().map(PrescriptionResponse::from).collect())
}

fn check_fields(medication_name: &str, dosage: &str, frequency: &str) -> Result<(), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors
        .check("medication_name", validate_required(medication_name, "Medication name"))
        .check("dosage", validate_required(dosage, "Dosage"))
        .check("frequency", validate_required(frequency, "Frequency"));
    errors.finish()
}

/// Write a prescription from the caller's doctor profile
pub async fn create_prescription(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Json(req): Json<CreatePrescriptionRequest>,
) -> Result<(StatusCode, Json<PrescriptionResponse>), ApiError> {
    let caller = authorize(principal.as_ref(), Operation::CreatePrescription)?;
    check_fields(&req.medication_name, &req.dosage, &req.frequency)?;

    let prescription = PrescriptionService::new(&state.db)
        .create_for_caller(&req, caller)
        .await?;
    Ok((StatusCode::CREATED, Json(PrescriptionResponse::from(prescription))))
}

pub async fn list_prescriptions(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<Vec<PrescriptionResponse>>, ApiError> {
    authorize(principal.as_ref(), Operation::ListPrescriptions)?;
    let prescriptions = PrescriptionService::new(&state.db).list_all().await?;
    Ok(to_responses(prescriptions))
}

/// Prescriptions written by, or issued to, the caller
pub async fn my_prescriptions(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<Vec<PrescriptionResponse>>, ApiError> {
    let caller = authorize(principal.as_ref(), Operation::ListOwnPrescriptions)?;
    let prescriptions = PrescriptionService::new(&state.db)
        .list_for_caller(caller)
        .await?;
    Ok(to_responses(prescriptions))
}

pub async fn get_prescription(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<i64>,
) -> Result<Json<PrescriptionResponse>, ApiError> {
    let caller = authorize(principal.as_ref(), Operation::GetPrescription)?;
    let prescription = PrescriptionService::new(&state.db).get(id, caller).await?;
    Ok(Json(PrescriptionResponse::from(prescription)))
}

pub async fn update_prescription(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePrescriptionRequest>,
) -> Result<Json<PrescriptionResponse>, ApiError> {
    authorize(principal.as_ref(), Operation::UpdatePrescription)?;
    check_fields(&req.medication_name, &req.dosage, &req.frequency)?;

    let prescription = PrescriptionService::new(&state.db).update(id, &req).await?;
    Ok(Json(PrescriptionResponse::from(prescription)))
}

pub async fn delete_prescription(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    authorize(principal.as_ref(), Operation::DeletePrescription)?;
    PrescriptionService::new(&state.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
