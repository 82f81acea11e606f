//! Login and self-service registration.

use tracing::{info, warn};

use crate::auth::password::{hash_password, verify_dummy, verify_password};
use crate::auth::{Credential, Role, TokenService};
use crate::db::{default_slots, DbPool, DoctorDetail, DoctorFields, RegisterRequest, User};

use super::{DomainError, DomainResult};

pub struct AccountService<'a> {
    db: &'a DbPool,
    tokens: &'a TokenService,
    allow_admin_registration: bool,
}

impl<'a> AccountService<'a> {
    pub fn new(db: &'a DbPool, tokens: &'a TokenService, allow_admin_registration: bool) -> Self {
        Self {
            db,
            tokens,
            allow_admin_registration,
        }
    }

    /// Exchange email and password for a credential.
    ///
    /// Unknown emails and wrong passwords both fail with
    /// [`DomainError::InvalidCredentials`].
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<(Credential, Role)> {
        let user = match User::find_by_email(self.db, email).await? {
            Some(user) => user,
            None => {
                verify_dummy(password);
                info!("Login failed: unknown email");
                return Err(DomainError::InvalidCredentials);
            }
        };

        if !verify_password(password, &user.password_hash) {
            info!(user_id = user.id, "Login failed: wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        let role = user.role_enum().ok_or_else(|| {
            DomainError::InvariantViolation(format!("User {} has unknown role {}", user.id, user.role))
        })?;
        let credential = self.tokens.issue(&user.email, role)?;

        info!(user_id = user.id, role = %role, "User logged in");
        Ok((credential, role))
    }

    /// Create an account, and for doctors the linked profile, atomically.
    /// Returns the new user id.
    pub async fn register(&self, request: &RegisterRequest) -> DomainResult<i64> {
        if request.role == Role::Admin && !self.allow_admin_registration {
            warn!(email = %request.email, "Refused admin self-registration");
            return Err(DomainError::validation(
                "role",
                "Admin accounts cannot be self-registered",
            ));
        }

        let specialization = match request.role {
            Role::Doctor => match request.specialization.as_deref().map(str::trim) {
                Some(s) if !s.is_empty() => Some(s),
                _ => {
                    return Err(DomainError::validation(
                        "specialization",
                        "Doctors must provide a specialization",
                    ))
                }
            },
            _ => None,
        };

        if User::find_by_email(self.db, &request.email).await?.is_some() {
            return Err(DomainError::Conflict(
                "Email already registered. Please use a different email or login.".to_string(),
            ));
        }

        let password_hash =
            hash_password(&request.password).map_err(|e| DomainError::PasswordHash(e.to_string()))?;

        let mut tx = self.db.begin().await?;

        let user_id = User::insert(
            &mut *tx,
            &request.name,
            &request.email,
            &password_hash,
            request.role,
        )
        .await
        .map_err(DomainError::from_write)?;

        if let Some(specialization) = specialization {
            let slots = match &request.available_slots {
                Some(slots) if !slots.is_empty() => slots.clone(),
                _ => default_slots(),
            };
            DoctorDetail::insert(
                &mut *tx,
                user_id,
                &DoctorFields {
                    specialization,
                    clinic_name: request.clinic_name.as_deref(),
                    location: request.location.as_deref(),
                    available_slots: &slots,
                },
            )
            .await?;
        }

        tx.commit().await?;

        info!(user_id, role = %request.role, "Registered user");
        Ok(user_id)
    }
}
