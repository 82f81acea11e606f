//! Doctor profile administration.

use tracing::info;

use crate::auth::policy::owns_doctor_profile;
use crate::auth::{AuthError, Principal, Role};
use crate::db::{
    default_slots, CreateDoctorRequest, DbPool, DoctorDetail, DoctorFields, UpdateDoctorRequest,
    User,
};

use super::{DomainError, DomainResult};

pub struct DoctorService<'a> {
    db: &'a DbPool,
}

impl<'a> DoctorService<'a> {
    pub fn new(db: &'a DbPool) -> Self {
        Self { db }
    }

    /// Attach a profile to an existing DOCTOR user
    pub async fn create(&self, request: &CreateDoctorRequest) -> DomainResult<DoctorDetail> {
        let user = User::find_by_id(self.db, request.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", request.user_id))?;

        if user.role_enum() != Some(Role::Doctor) {
            return Err(DomainError::InvariantViolation(format!(
                "User {} has role {}, only DOCTOR users can have a doctor profile",
                user.id, user.role
            )));
        }

        let slots = request.available_slots.clone().unwrap_or_else(default_slots);
        let id = DoctorDetail::insert(
            self.db,
            user.id,
            &DoctorFields {
                specialization: &request.specialization,
                clinic_name: request.clinic_name.as_deref(),
                location: request.location.as_deref(),
                available_slots: &slots,
            },
        )
        .await
        .map_err(|e| {
            if crate::db::is_unique_violation(&e) {
                DomainError::Conflict(format!("User {} already has a doctor profile", user.id))
            } else {
                DomainError::Database(e)
            }
        })?;

        info!(doctor_id = id, user_id = user.id, "Doctor profile created");
        self.get(id).await
    }

    pub async fn list(&self) -> DomainResult<Vec<DoctorDetail>> {
        Ok(DoctorDetail::list_all(self.db).await?)
    }

    pub async fn get(&self, id: i64) -> DomainResult<DoctorDetail> {
        DoctorDetail::find_by_id(self.db, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Doctor", id))
    }

    /// Replace a profile's editable fields. Doctors may only edit their own.
    pub async fn update(
        &self,
        id: i64,
        request: &UpdateDoctorRequest,
        caller: &Principal,
    ) -> DomainResult<DoctorDetail> {
        let existing = self.get(id).await?;
        if !owns_doctor_profile(caller, &existing.email) {
            return Err(AuthError::NotOwner.into());
        }

        DoctorDetail::update(
            self.db,
            id,
            &DoctorFields {
                specialization: &request.specialization,
                clinic_name: request.clinic_name.as_deref(),
                location: request.location.as_deref(),
                available_slots: &request.available_slots,
            },
        )
        .await?;

        info!(doctor_id = id, "Doctor profile updated");
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> DomainResult<()> {
        let deleted = DoctorDetail::delete(self.db, id)
            .await
            .map_err(|e| DomainError::from_delete(e, "Doctor"))?;
        if !deleted {
            return Err(DomainError::not_found("Doctor", id));
        }
        info!(doctor_id = id, "Doctor profile deleted");
        Ok(())
    }
}
