//! Maps an authenticated identity to the records it stands for.

use crate::auth::Principal;
use crate::db::{DbPool, DoctorDetail, User};

use super::{DomainError, DomainResult};

pub struct IdentityResolver<'a> {
    db: &'a DbPool,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(db: &'a DbPool) -> Self {
        Self { db }
    }

    /// The user row behind `identity` (exact email match)
    pub async fn resolve_user(&self, identity: &str) -> DomainResult<User> {
        User::find_by_email(self.db, identity)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("User with email {}", identity)))
    }

    pub async fn resolve_principal(&self, principal: &Principal) -> DomainResult<User> {
        self.resolve_user(&principal.identity).await
    }

    /// The doctor profile whose linked user has email `identity`.
    ///
    /// Scans every profile; there is at most one match because a user owns at
    /// most one profile.
    pub async fn resolve_doctor_profile(&self, identity: &str) -> DomainResult<DoctorDetail> {
        DoctorDetail::list_all(self.db)
            .await?
            .into_iter()
            .find(|doctor| doctor.email == identity)
            .ok_or_else(|| DomainError::NotFound(format!("Doctor profile for {}", identity)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{register_doctor, register_patient, test_pool};

    #[tokio::test]
    async fn test_resolve_user() {
        let pool = test_pool().await;
        let id = register_patient(&pool, "pat@example.com").await;
        let resolver = IdentityResolver::new(&pool);

        assert_eq!(resolver.resolve_user("pat@example.com").await.unwrap().id, id);
        assert!(matches!(
            resolver.resolve_user("PAT@example.com").await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_doctor_profile() {
        let pool = test_pool().await;
        let (_, doctor_id) = register_doctor(&pool, "doc@example.com").await;
        register_patient(&pool, "pat@example.com").await;
        let resolver = IdentityResolver::new(&pool);

        let profile = resolver.resolve_doctor_profile("doc@example.com").await.unwrap();
        assert_eq!(profile.id, doctor_id);
        // A user without a profile resolves to nothing
        assert!(matches!(
            resolver.resolve_doctor_profile("pat@example.com").await,
            Err(DomainError::NotFound(_))
        ));
    }
}
