use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::error::{ApiError, ValidationErrorBuilder};
use super::validation::{validate_email, validate_name, validate_password};
use crate::auth::{authorize, CurrentPrincipal, Operation};
use crate::db::{UpdateUserRequest, UserResponse};
use crate::services::UserService;
use crate::AppState;

/// List all users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    authorize(principal.as_ref(), Operation::ListUsers)?;
    let users = UserService::new(&state.db).list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    authorize(principal.as_ref(), Operation::GetUser)?;
    let user = UserService::new(&state.db).get(id).await?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    authorize(principal.as_ref(), Operation::UpdateUser)?;

    let mut errors = ValidationErrorBuilder::new();
    errors
        .check("name", validate_name(&req.name))
        .check("email", validate_email(&req.email));
    if let Some(password) = &req.password {
        errors.check("password", validate_password(password));
    }
    errors.finish()?;

    let user = UserService::new(&state.db).update(id, &req).await?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    authorize(principal.as_ref(), Operation::DeleteUser)?;
    UserService::new(&state.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
