use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::error::ApiError;
use crate::auth::{authorize, CurrentPrincipal, Operation};
use crate::db::{
    AppointmentDetail, AppointmentResponse, CreateAppointmentRequest, UpdateAppointmentRequest,
    UpdateStatusRequest,
};
use crate::services::AppointmentService;
use crate::AppState;

fn to_responses(appointments: Vec<AppointmentDetail>) -> Json<Vec<AppointmentResponse>> {
    Json(appointments.into_iter().map(AppointmentResponse::from).collect())
}

/// Book an appointment for the caller
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Json(req): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentResponse>), ApiError> {
    let caller = authorize(principal.as_ref(), Operation::CreateAppointment)?;
    let appointment = AppointmentService::new(&state.db)
        .create_for_caller(&req, caller)
        .await?;
    Ok((StatusCode::CREATED, Json(AppointmentResponse::from(appointment))))
}

pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<Vec<AppointmentResponse>>, ApiError> {
    authorize(principal.as_ref(), Operation::ListAppointments)?;
    let appointments = AppointmentService::new(&state.db).list_all().await?;
    Ok(to_responses(appointments))
}

/// Appointments the caller takes part in
pub async fn my_appointments(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<Vec<AppointmentResponse>>, ApiError> {
    let caller = authorize(principal.as_ref(), Operation::ListOwnAppointments)?;
    let appointments = AppointmentService::new(&state.db)
        .list_for_caller(caller)
        .await?;
    Ok(to_responses(appointments))
}

pub async fn list_by_patient(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(patient_id): Path<i64>,
) -> Result<Json<Vec<AppointmentResponse>>, ApiError> {
    authorize(principal.as_ref(), Operation::ListAppointmentsByPatient)?;
    let appointments = AppointmentService::new(&state.db)
        .list_by_patient(patient_id)
        .await?;
    Ok(to_responses(appointments))
}

pub async fn list_by_doctor(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Vec<AppointmentResponse>>, ApiError> {
    authorize(principal.as_ref(), Operation::ListAppointmentsByDoctor)?;
    let appointments = AppointmentService::new(&state.db)
        .list_by_doctor(doctor_id)
        .await?;
    Ok(to_responses(appointments))
}

pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<i64>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    let caller = authorize(principal.as_ref(), Operation::GetAppointment)?;
    let appointment = AppointmentService::new(&state.db).get(id, caller).await?;
    Ok(Json(AppointmentResponse::from(appointment)))
}

pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<i64>,
    Json(req): Json<UpdateAppointmentRequest>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    authorize(principal.as_ref(), Operation::UpdateAppointment)?;
    let appointment = AppointmentService::new(&state.db).update(id, &req).await?;
    Ok(Json(AppointmentResponse::from(appointment)))
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<AppointmentResponse>, ApiError> {
    authorize(principal.as_ref(), Operation::UpdateAppointmentStatus)?;
    let appointment = AppointmentService::new(&state.db)
        .update_status(id, req.status)
        .await?;
    Ok(Json(AppointmentResponse::from(appointment)))
}

pub async fn delete_appointment(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    authorize(principal.as_ref(), Operation::DeleteAppointment)?;
    AppointmentService::new(&state.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
