//! Appointment lifecycle, scoped to the calling principal.

use tracing::info;

use crate::auth::policy::ensure_visible;
use crate::auth::{AuthError, Operation, Principal, Role, ScopedRecord};
use crate::db::{
    AppointmentDetail, AppointmentFields, AppointmentStatus, CreateAppointmentRequest, DbPool,
    DoctorDetail, UpdateAppointmentRequest,
};

use super::identity::IdentityResolver;
use super::{DomainError, DomainResult};

pub struct AppointmentService<'a> {
    db: &'a DbPool,
    identity: IdentityResolver<'a>,
}

impl<'a> AppointmentService<'a> {
    pub fn new(db: &'a DbPool) -> Self {
        Self {
            db,
            identity: IdentityResolver::new(db),
        }
    }

    /// Book an appointment for the caller.
    ///
    /// Whatever patient or status the request names, the appointment belongs
    /// to the caller and starts out pending.
    pub async fn create_for_caller(
        &self,
        request: &CreateAppointmentRequest,
        caller: &Principal,
    ) -> DomainResult<AppointmentDetail> {
        let patient = self.identity.resolve_principal(caller).await?;

        if DoctorDetail::find_by_id(self.db, request.doctor_id).await?.is_none() {
            return Err(DomainError::not_found("Doctor", request.doctor_id));
        }

        let id = AppointmentDetail::insert(
            self.db,
            &AppointmentFields {
                patient_id: patient.id,
                doctor_id: request.doctor_id,
                reason: request.reason.as_deref(),
                date: request.appointment_date,
                time: request.appointment_time,
                status: AppointmentStatus::Pending,
            },
        )
        .await
        .map_err(DomainError::from_write)?;

        info!(
            appointment_id = id,
            patient_id = patient.id,
            doctor_id = request.doctor_id,
            "Appointment booked"
        );
        self.find(id).await
    }

    pub async fn list_all(&self) -> DomainResult<Vec<AppointmentDetail>> {
        Ok(AppointmentDetail::list_all(self.db).await?)
    }

    /// Appointments the caller takes part in: assigned ones for a doctor, own
    /// bookings for a patient. Admins have no "own" appointments.
    pub async fn list_for_caller(&self, caller: &Principal) -> DomainResult<Vec<AppointmentDetail>> {
        let all = AppointmentDetail::list_all(self.db).await?;
        let mine: Vec<AppointmentDetail> = match caller.role {
            Role::Doctor => all
                .into_iter()
                .filter(|a| a.doctor_identity() == caller.identity)
                .collect(),
            Role::Patient => all
                .into_iter()
                .filter(|a| a.patient_identity() == caller.identity)
                .collect(),
            Role::Admin => {
                return Err(AuthError::Forbidden {
                    role: caller.role,
                    operation: Operation::ListOwnAppointments,
                }
                .into())
            }
        };
        Ok(mine)
    }

    pub async fn list_by_patient(&self, patient_id: i64) -> DomainResult<Vec<AppointmentDetail>> {
        Ok(AppointmentDetail::list_by_patient(self.db, patient_id).await?)
    }

    pub async fn list_by_doctor(&self, doctor_id: i64) -> DomainResult<Vec<AppointmentDetail>> {
        Ok(AppointmentDetail::list_by_doctor(self.db, doctor_id).await?)
    }

    /// Fetch one appointment, hiding it from callers who do not take part in it
    pub async fn get(&self, id: i64, caller: &Principal) -> DomainResult<AppointmentDetail> {
        let appointment = self.find(id).await?;
        ensure_visible(caller, &appointment)?;
        Ok(appointment)
    }

    /// Overwrite every field of an existing appointment
    pub async fn update(
        &self,
        id: i64,
        request: &UpdateAppointmentRequest,
    ) -> DomainResult<AppointmentDetail> {
        let updated = AppointmentDetail::update(
            self.db,
            id,
            &AppointmentFields {
                patient_id: request.patient_id,
                doctor_id: request.doctor_id,
                reason: request.reason.as_deref(),
                date: request.appointment_date,
                time: request.appointment_time,
                status: request.status,
            },
        )
        .await
        .map_err(DomainError::from_write)?;

        if !updated {
            return Err(DomainError::not_found("Appointment", id));
        }
        info!(appointment_id = id, "Appointment updated");
        self.find(id).await
    }

    /// Set the status. Any status may follow any other.
    pub async fn update_status(
        &self,
        id: i64,
        status: AppointmentStatus,
    ) -> DomainResult<AppointmentDetail> {
        if !AppointmentDetail::set_status(self.db, id, status).await? {
            return Err(DomainError::not_found("Appointment", id));
        }
        info!(appointment_id = id, status = %status, "Appointment status changed");
        self.find(id).await
    }

    pub async fn delete(&self, id: i64) -> DomainResult<()> {
        let deleted = AppointmentDetail::delete(self.db, id)
            .await
            .map_err(|e| DomainError::from_delete(e, "Appointment"))?;
        if !deleted {
            return Err(DomainError::not_found("Appointment", id));
        }
        info!(appointment_id = id, "Appointment deleted");
        Ok(())
    }

    async fn find(&self, id: i64) -> DomainResult<AppointmentDetail> {
        AppointmentDetail::find_by_id(self.db, id)
            .await?
            .ok_or_else(|| DomainError::not_found("Appointment", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;

    #[tokio::test]
    async fn test_patient_booking_is_pending_and_bound_to_caller() {
        let pool = test_pool().await;
        let (_, doctor_id) = register_doctor(&pool, "doc@example.com").await;
        let patient_id = register_patient(&pool, "pat@example.com").await;
        let victim_id = register_patient(&pool, "victim@example.com").await;
        let service = AppointmentService::new(&pool);

        let mut request = booking(doctor_id);
        request.patient_id = Some(serde_json::json!(victim_id));
        request.status = Some(serde_json::json!(AppointmentStatus::Approved));

        let created = service
            .create_for_caller(&request, &patient("pat@example.com"))
            .await
            .unwrap();

        assert_eq!(created.patient_id, patient_id);
        assert_eq!(created.patient_email, "pat@example.com");
        assert_eq!(created.status_enum(), Some(AppointmentStatus::Pending));
        assert_eq!(created.appointment_time, "09:00");
        assert_eq!(created.appointment_date, "2026-03-02");
        assert!(service.list_by_patient(victim_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_booking_unknown_doctor_is_not_found() {
        let pool = test_pool().await;
        register_patient(&pool, "pat@example.com").await;
        let service = AppointmentService::new(&pool);

        let err = service
            .create_for_caller(&booking(42), &patient("pat@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_booking_for_unregistered_caller_is_not_found() {
        let pool = test_pool().await;
        let (_, doctor_id) = register_doctor(&pool, "doc@example.com").await;
        let service = AppointmentService::new(&pool);

        let err = service
            .create_for_caller(&booking(doctor_id), &patient("ghost@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_for_doctor_is_exact() {
        let pool = test_pool().await;
        let (_, first) = register_doctor(&pool, "first@example.com").await;
        let (_, second) = register_doctor(&pool, "second@example.com").await;
        register_doctor(&pool, "idle@example.com").await;
        register_patient(&pool, "pat@example.com").await;
        let service = AppointmentService::new(&pool);
        let caller = patient("pat@example.com");

        let a = service.create_for_caller(&booking(first), &caller).await.unwrap();
        service.create_for_caller(&booking(second), &caller).await.unwrap();
        let c = service.create_for_caller(&booking(first), &caller).await.unwrap();

        let mine = service.list_for_caller(&doctor("first@example.com")).await.unwrap();
        let ids: Vec<i64> = mine.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);

        assert!(service
            .list_for_caller(&doctor("idle@example.com"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_list_for_patient_and_admin() {
        let pool = test_pool().await;
        let (_, doctor_id) = register_doctor(&pool, "doc@example.com").await;
        register_patient(&pool, "one@example.com").await;
        register_patient(&pool, "two@example.com").await;
        let service = AppointmentService::new(&pool);

        service.create_for_caller(&booking(doctor_id), &patient("one@example.com")).await.unwrap();
        service.create_for_caller(&booking(doctor_id), &patient("two@example.com")).await.unwrap();

        let mine = service.list_for_caller(&patient("two@example.com")).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].patient_email, "two@example.com");

        let err = service.list_for_caller(&admin("root@example.com")).await.unwrap_err();
        assert!(matches!(err, DomainError::Auth(AuthError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_admin_booking_binds_admin_as_patient() {
        let pool = test_pool().await;
        let (_, doctor_id) = register_doctor(&pool, "doc@example.com").await;
        let admin_id = register_admin(&pool, "root@example.com").await;
        let service = AppointmentService::new(&pool);

        let created = service
            .create_for_caller(&booking(doctor_id), &admin("root@example.com"))
            .await
            .unwrap();
        assert_eq!(created.patient_id, admin_id);
    }

    #[tokio::test]
    async fn test_get_enforces_ownership() {
        let pool = test_pool().await;
        let (_, doctor_id) = register_doctor(&pool, "doc@example.com").await;
        register_doctor(&pool, "other-doc@example.com").await;
        register_patient(&pool, "pat@example.com").await;
        register_patient(&pool, "nosy@example.com").await;
        let service = AppointmentService::new(&pool);

        let created = service
            .create_for_caller(&booking(doctor_id), &patient("pat@example.com"))
            .await
            .unwrap();

        assert!(service.get(created.id, &patient("pat@example.com")).await.is_ok());
        assert!(service.get(created.id, &doctor("doc@example.com")).await.is_ok());
        assert!(service.get(created.id, &admin("root@example.com")).await.is_ok());
        assert!(matches!(
            service.get(created.id, &patient("nosy@example.com")).await,
            Err(DomainError::Auth(AuthError::NotOwner))
        ));
        assert!(matches!(
            service.get(created.id, &doctor("other-doc@example.com")).await,
            Err(DomainError::Auth(AuthError::NotOwner))
        ));
        assert!(matches!(
            service.get(999, &admin("root@example.com")).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_status_transitions_are_unguarded() {
        let pool = test_pool().await;
        let (_, doctor_id) = register_doctor(&pool, "doc@example.com").await;
        register_patient(&pool, "pat@example.com").await;
        let service = AppointmentService::new(&pool);
        let created = service
            .create_for_caller(&booking(doctor_id), &patient("pat@example.com"))
            .await
            .unwrap();

        for from in ALL_STATUSES {
            for to in ALL_STATUSES {
                service.update_status(created.id, from).await.unwrap();
                let updated = service.update_status(created.id, to).await.unwrap();
                assert_eq!(updated.status_enum(), Some(to));
            }
        }

        service.update_status(created.id, AppointmentStatus::Canceled).await.unwrap();
        let revived = service
            .update_status(created.id, AppointmentStatus::Approved)
            .await
            .unwrap();
        assert_eq!(revived.status, "APPROVED");
    }

    #[tokio::test]
    async fn test_status_update_on_missing_id() {
        let pool = test_pool().await;
        let service = AppointmentService::new(&pool);
        assert!(matches!(
            service.update_status(404, AppointmentStatus::Approved).await,
            Err(DomainError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let pool = test_pool().await;
        let (_, doctor_id) = register_doctor(&pool, "doc@example.com").await;
        let (_, other_doctor) = register_doctor(&pool, "other@example.com").await;
        let patient_id = register_patient(&pool, "pat@example.com").await;
        let service = AppointmentService::new(&pool);
        let created = service
            .create_for_caller(&booking(doctor_id), &patient("pat@example.com"))
            .await
            .unwrap();

        let request = UpdateAppointmentRequest {
            patient_id,
            doctor_id: other_doctor,
            reason: Some("Follow-up".to_string()),
            appointment_date: chrono::NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            appointment_time: chrono::NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            status: AppointmentStatus::Approved,
        };
        let updated = service.update(created.id, &request).await.unwrap();
        assert_eq!(updated.doctor_email, "other@example.com");
        assert_eq!(updated.reason.as_deref(), Some("Follow-up"));
        assert_eq!(updated.appointment_time, "14:00");
        assert_eq!(service.list_by_doctor(other_doctor).await.unwrap().len(), 1);

        assert!(matches!(
            service.update(999, &request).await,
            Err(DomainError::NotFound(_))
        ));

        service.delete(created.id).await.unwrap();
        assert!(matches!(service.delete(created.id).await, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_to_unknown_doctor_is_not_found() {
        let pool = test_pool().await;
        let (_, doctor_id) = register_doctor(&pool, "doc@example.com").await;
        let patient_id = register_patient(&pool, "pat@example.com").await;
        let service = AppointmentService::new(&pool);
        let created = service
            .create_for_caller(&booking(doctor_id), &patient("pat@example.com"))
            .await
            .unwrap();

        let request = UpdateAppointmentRequest {
            patient_id,
            doctor_id: 777,
            reason: None,
            appointment_date: chrono::NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            appointment_time: chrono::NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
            status: AppointmentStatus::Pending,
        };
        assert!(matches!(
            service.update(created.id, &request).await,
            Err(DomainError::NotFound(_))
        ));
    }
}
