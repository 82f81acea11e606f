//! Prescription lifecycle, scoped to the calling principal.

use tracing::{info, warn};

use crate::auth::policy::ensure_visible;
use crate::auth::{AuthError, Operation, Principal, Role, ScopedRecord};
use crate::db::{
    CreatePrescriptionRequest, DbPool, PrescriptionDetail, PrescriptionFields,
    UpdatePrescriptionRequest, User,
};

use super::identity::IdentityResolver;
use super::{DomainError, DomainResult};

pub struct PrescriptionService<'a> {
    db: &'a DbPool,
    identity: IdentityResolver<'a>,
}

impl<'a> PrescriptionService<'a> {
    pub fn new(db: &'a DbPool) -> Self {
        Self {
            db,
            identity: IdentityResolver::new(db),
        }
    }

    /// Write a prescription from the caller's own doctor profile.
    ///
    /// A caller without a doctor profile (an admin, typically) cannot
    /// prescribe; nothing is written in that case.
    pub async fn create_for_caller(
        &self,
        request: &CreatePrescriptionRequest,
        caller: &Principal,
    ) -> DomainResult<PrescriptionDetail> {
        let doctor = match self.identity.resolve_doctor_profile(&caller.identity).await {
            Ok(doctor) => doctor,
            Err(DomainError::NotFound(_)) => {
                warn!(identity = %caller.identity, "Prescription refused: caller has no doctor profile");
                return Err(DomainError::InvariantViolation(format!(
                    "{} has no doctor profile and cannot write prescriptions",
                    caller.identity
                )));
            }
            Err(e) => return Err(e),
        };

        let patient = User::find_by_id(self.db, request.patient_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Patient", request.patient_id))?;

        let id = PrescriptionDetail::insert(
            self.db,
            &PrescriptionFields {
                patient_id: patient.id,
                doctor_id: doctor.id,
                medication_name: &request.medication_name,
                dosage: &request.dosage,
                frequency: &request.frequency,
                notes: request.notes.as_deref(),
            },
        )
        .await
        .map_err(DomainError::from_write)?;

        info!(
            prescription_id = id,
            patient_id = patient.id,
            doctor_id = doctor.id,
            "Prescription written"
        );
        self.find(id).await
    }

    pub async fn list_all(&self) -> DomainResult<Vec<PrescriptionDetail>> {
        Ok(PrescriptionDetail::list_all(self.db).await?)
    }

    /// Prescriptions written by a doctor caller, or issued to a patient caller
    pub async fn list_for_caller(&self, caller: &Principal) -> DomainResult<Vec<PrescriptionDetail>> {
        let all = PrescriptionDetail::list_all(self.db).await?;
        let mine = match caller.role {
            Role::Doctor => all
                .into_iter()
                .filter(|p| p.doctor_identity() == caller.identity)
                .collect(),
            Role::Patient => all
                .into_iter()
                .filter(|p| p.patient_identity() == caller.identity)
                .collect(),
            Role::Admin => {
                return Err(AuthError::Forbidden {
                    role: caller.role,
                    operation: Operation::ListOwnPrescriptions,
                }
                .into())
            }
        };
        Ok(mine)
    }

    pub async fn get(&self, id: i64, caller: &Principal) -> DomainResult<PrescriptionDetail> {
        let prescription = self.find(id).await?;
        ensure_visible(caller, &prescription)?;
        Ok(prescription)
    }

    pub async fn update(
        &self,
        id: i64,
        request: &UpdatePrescriptionRequest,
    ) -> DomainResult<PrescriptionDetail> {
        let updated = PrescriptionDetail::update(
            self.db,
            id,
            &PrescriptionFields {
                patient_id: request.patient_id,
                doctor_id: request.doctor_id,
                medication_name: &request.medication_name,
                dosage: &request.dosage,
                frequency: &request.frequency,
                notes: request.notes.as_deref(),
            },
        )
        .await
        .map_err(DomainError::from_write)?;

        if !updated {
            return Err(DomainError::not_found("Prescription", id));
        }
        info!(prescription_id = id, "Prescription updated");
        self.find(id).await
    }

    pub async fn delete(&self, id: i64) -> DomainResult<()> {
        let deleted = PrescriptionDetail::delete(self.db, id)
            .await
            .map_err(|e| DomainError::from_delete(e, "Prescription"))?;
        if !deleted {
            return Err(DomainError::not_found("Prescription", id));
        }
        info!(prescription_id = id, "Prescription deleted");
        Ok(())
    }

    async fn find(&self, id: i64) -> DomainResult<PrescriptionDetail> {
        PrescriptionDetail::find_by_id(self.db, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Prescription", id))
    }
}
