mod appointments;
pub mod auth;
mod doctors;
pub mod error;
mod prescriptions;
mod users;
mod validation;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::gate::authentication_layer;
use crate::config::CorsConfig;
use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Auth routes (public, except validate which reads the principal)
    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/validate", get(auth::validate));

    // Role checks happen per handler
    let api_routes = Router::new()
        // Users
        .route("/users", get(users::list_users))
        .route("/users/:id", get(users::get_user))
        .route("/users/:id", put(users::update_user))
        .route("/users/:id", delete(users::delete_user))
        // Doctors
        .route("/doctors", get(doctors::list_doctors))
        .route("/doctors", post(doctors::create_doctor))
        .route("/doctors/:id", get(doctors::get_doctor))
        .route("/doctors/:id", put(doctors::update_doctor))
        .route("/doctors/:id", delete(doctors::delete_doctor))
        // Appointments
        .route("/appointments", get(appointments::list_appointments))
        .route("/appointments", post(appointments::create_appointment))
        .route("/appointments/my-appointments", get(appointments::my_appointments))
        .route("/appointments/patient/:id", get(appointments::list_by_patient))
        .route("/appointments/doctor/:id", get(appointments::list_by_doctor))
        .route("/appointments/:id", get(appointments::get_appointment))
        .route("/appointments/:id", put(appointments::update_appointment))
        .route("/appointments/:id", delete(appointments::delete_appointment))
        .route("/appointments/:id/status", put(appointments::update_status))
        // Prescriptions
        .route("/prescriptions", get(prescriptions::list_prescriptions))
        .route("/prescriptions", post(prescriptions::create_prescription))
        .route("/prescriptions/my-prescriptions", get(prescriptions::my_prescriptions))
        .route("/prescriptions/:id", get(prescriptions::get_prescription))
        .route("/prescriptions/:id", put(prescriptions::update_prescription))
        .route("/prescriptions/:id", delete(prescriptions::delete_prescription));

    let cors = cors_layer(&state.config.cors);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api", api_routes)
        // Attaches the principal when a valid bearer token is present; never rejects
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_layer,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn health_check() -> &'static str {
    "OK"
}
