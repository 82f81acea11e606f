//! User administration.

use tracing::info;

use crate::auth::password::hash_password;
use crate::db::{DbPool, UpdateUserRequest, User};

use super::{DomainError, DomainResult};

pub struct UserService<'a> {
    db: &'a DbPool,
}

impl<'a> UserService<'a> {
    pub fn new(db: &'a DbPool) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> DomainResult<Vec<User>> {
        Ok(User::list_all(self.db).await?)
    }

    pub async fn get(&self, id: i64) -> DomainResult<User> {
        User::find_by_id(self.db, id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", id))
    }

    /// Update name, email and optionally the password. The role stays as registered.
    pub async fn update(&self, id: i64, request: &UpdateUserRequest) -> DomainResult<User> {
        let existing = self.get(id).await?;

        let password_hash = match &request.password {
            Some(password) => {
                hash_password(password).map_err(|e| DomainError::PasswordHash(e.to_string()))?
            }
            None => existing.password_hash,
        };

        let updated = User::update(self.db, id, &request.name, &request.email, &password_hash)
            .await
            .map_err(|e| {
                if crate::db::is_unique_violation(&e) {
                    DomainError::Conflict(format!("Email {} is already in use", request.email))
                } else {
                    DomainError::Database(e)
                }
            })?;
        if !updated {
            return Err(DomainError::not_found("User", id));
        }

        info!(user_id = id, "User updated");
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> DomainResult<()> {
        let deleted = User::delete(self.db, id)
            .await
            .map_err(|e| DomainError::from_delete(e, "User"))?;
        if !deleted {
            return Err(DomainError::not_found("User", id));
        }
        info!(user_id = id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::auth::Role;
    use crate::services::test_support::*;

    fn rename(email: &str, password: Option<&str>) -> UpdateUserRequest {
        UpdateUserRequest {
            name: "Renamed".to_string(),
            email: email.to_string(),
            password: password.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_update_keeps_role_and_optionally_password() {
        let pool = test_pool().await;
        let id = register_patient(&pool, "pat@example.com").await;
        let service = UserService::new(&pool);

        let updated = service.update(id, &rename("new@example.com", None)).await.unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.email, "new@example.com");
        assert_eq!(updated.role_enum(), Some(Role::Patient));
        assert_eq!(updated.password_hash, "not-a-real-hash");

        let updated = service
            .update(id, &rename("new@example.com", Some("brand-new-pass")))
            .await
            .unwrap();
        assert!(verify_password("brand-new-pass", &updated.password_hash));
    }

    #[tokio::test]
    async fn test_update_to_taken_email_conflicts() {
        let pool = test_pool().await;
        let id = register_patient(&pool, "pat@example.com").await;
        register_patient(&pool, "taken@example.com").await;
        let service = UserService::new(&pool);

        assert!(matches!(
            service.update(id, &rename("taken@example.com", None)).await,
            Err(DomainError::Conflict(_))
        ));
        assert!(matches!(
            service.update(999, &rename("x@example.com", None)).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let pool = test_pool().await;
        let id = register_patient(&pool, "pat@example.com").await;
        let (doctor_user, _) = register_doctor(&pool, "doc@example.com").await;
        let service = UserService::new(&pool);

        // Still owns a doctor profile
        assert!(matches!(service.delete(doctor_user).await, Err(DomainError::Conflict(_))));

        service.delete(id).await.unwrap();
        assert!(matches!(service.get(id).await, Err(DomainError::NotFound(_))));
        assert_eq!(service.list().await.unwrap().len(), 1);
    }
}
