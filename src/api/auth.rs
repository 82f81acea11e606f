use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_email, validate_name, validate_password, validate_slots};
use crate::auth::{AuthError, CurrentPrincipal, Principal};
use crate::db::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use crate::services::AccountService;
use crate::AppState;

fn accounts(state: &AppState) -> AccountService<'_> {
    AccountService::new(
        &state.db,
        &state.tokens,
        state.config.auth.allow_admin_registration,
    )
}

/// Login endpoint
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let (credential, role) = accounts(&state)
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token: credential.token,
        role,
        expires_at: credential.expires_at.to_rfc3339(),
    }))
}

/// Self-service registration
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let mut errors = ValidationErrorBuilder::new();
    errors
        .check("name", validate_name(&request.name))
        .check("email", validate_email(&request.email))
        .check("password", validate_password(&request.password));
    if let Some(slots) = &request.available_slots {
        errors.check("available_slots", validate_slots(slots));
    }
    errors.finish()?;

    let user_id = accounts(&state).register(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user_id,
        }),
    ))
}

/// Identity and role behind the presented token
pub async fn validate(CurrentPrincipal(principal): CurrentPrincipal) -> Result<Json<Principal>, ApiError> {
    principal
        .map(Json)
        .ok_or_else(|| AuthError::Unauthenticated.into())
}
