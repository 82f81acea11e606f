use crate::auth::AuthError;

/// Failures raised by the domain services
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Unknown email or wrong password; the two are deliberately indistinguishable
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// The caller is authorized but lacks the domain record the operation needs
    #[error("{0}")]
    InvariantViolation(String),

    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("failed to issue token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("failed to hash password: {0}")]
    PasswordHash(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl DomainError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DomainError::NotFound(format!("{} {}", entity, id))
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Map a failed delete: rows still referencing the target become a conflict
    pub(crate) fn from_delete(err: sqlx::Error, entity: &str) -> Self {
        if crate::db::is_foreign_key_violation(&err) {
            DomainError::Conflict(format!("{} is still referenced by other records", entity))
        } else {
            DomainError::Database(err)
        }
    }

    /// Map a failed write: a duplicate email becomes a conflict and a dangling
    /// reference a missing record
    pub(crate) fn from_write(err: sqlx::Error) -> Self {
        if crate::db::is_unique_violation(&err) {
            DomainError::Conflict("Record already exists".to_string())
        } else if crate::db::is_foreign_key_violation(&err) {
            DomainError::NotFound("Referenced record".to_string())
        } else {
            DomainError::Database(err)
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(DomainError::not_found("Appointment", 7).to_string(), "Appointment 7 not found");
        assert_eq!(
            DomainError::validation("role", "nope").to_string(),
            "role: nope"
        );
        assert_eq!(
            DomainError::from(AuthError::Unauthenticated).to_string(),
            "authentication required"
        );
    }
}
