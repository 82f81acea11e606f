//! Role-to-operation table and ownership predicates.
//!
//! `authorize` answers "may this role call this operation at all". Which rows a
//! permitted caller sees is decided by the services, using the ownership
//! predicates below.

use super::{Principal, Role};

/// Every guarded operation exposed by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListUsers,
    GetUser,
    UpdateUser,
    DeleteUser,

    CreateDoctor,
    ListDoctors,
    GetDoctor,
    UpdateDoctor,
    DeleteDoctor,

    CreateAppointment,
    ListAppointments,
    ListAppointmentsByPatient,
    ListAppointmentsByDoctor,
    ListOwnAppointments,
    GetAppointment,
    UpdateAppointment,
    UpdateAppointmentStatus,
    DeleteAppointment,

    CreatePrescription,
    ListPrescriptions,
    ListOwnPrescriptions,
    GetPrescription,
    UpdatePrescription,
    DeletePrescription,
}

const ADMIN: &[Role] = &[Role::Admin];
const ADMIN_DOCTOR: &[Role] = &[Role::Admin, Role::Doctor];
const ADMIN_PATIENT: &[Role] = &[Role::Admin, Role::Patient];
const DOCTOR_PATIENT: &[Role] = &[Role::Doctor, Role::Patient];
const ANY_ROLE: &[Role] = &Role::ALL;

impl Operation {
    /// Roles permitted to invoke this operation
    pub fn allowed_roles(self) -> &'static [Role] {
        use Operation::*;
        match self {
            ListUsers | GetUser | UpdateUser | DeleteUser => ADMIN,

            CreateDoctor | DeleteDoctor => ADMIN,
            ListDoctors | GetDoctor => ANY_ROLE,
            UpdateDoctor => ADMIN_DOCTOR,

            CreateAppointment => ADMIN_PATIENT,
            ListAppointments | ListAppointmentsByPatient | ListAppointmentsByDoctor => ADMIN_DOCTOR,
            ListOwnAppointments => DOCTOR_PATIENT,
            GetAppointment => ANY_ROLE,
            UpdateAppointment | UpdateAppointmentStatus => ADMIN_DOCTOR,
            DeleteAppointment => ADMIN,

            CreatePrescription | UpdatePrescription => ADMIN_DOCTOR,
            ListPrescriptions => ADMIN_DOCTOR,
            ListOwnPrescriptions => DOCTOR_PATIENT,
            GetPrescription => ANY_ROLE,
            DeletePrescription => ADMIN,
        }
    }

    pub fn permits(self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }

    pub fn as_str(&self) -> &'static str {
        use Operation::*;
        match self {
            ListUsers => "user.list",
            GetUser => "user.get",
            UpdateUser => "user.update",
            DeleteUser => "user.delete",
            CreateDoctor => "doctor.create",
            ListDoctors => "doctor.list",
            GetDoctor => "doctor.get",
            UpdateDoctor => "doctor.update",
            DeleteDoctor => "doctor.delete",
            CreateAppointment => "appointment.create",
            ListAppointments => "appointment.list",
            ListAppointmentsByPatient => "appointment.list_by_patient",
            ListAppointmentsByDoctor => "appointment.list_by_doctor",
            ListOwnAppointments => "appointment.list_own",
            GetAppointment => "appointment.get",
            UpdateAppointment => "appointment.update",
            UpdateAppointmentStatus => "appointment.update_status",
            DeleteAppointment => "appointment.delete",
            CreatePrescription => "prescription.create",
            ListPrescriptions => "prescription.list",
            ListOwnPrescriptions => "prescription.list_own",
            GetPrescription => "prescription.get",
            UpdatePrescription => "prescription.update",
            DeletePrescription => "prescription.delete",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authorization failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No valid credential was presented for an operation that needs one
    #[error("authentication required")]
    Unauthenticated,
    /// The caller's role is not in the operation's allowed set
    #[error("role {role} may not perform {operation}")]
    Forbidden { role: Role, operation: Operation },
    /// The caller may call the operation but the record belongs to someone else
    #[error("record is not owned by the caller")]
    NotOwner,
}

/// Check that a principal is present and its role may perform `operation`.
pub fn authorize(
    principal: Option<&Principal>,
    operation: Operation,
) -> Result<&Principal, AuthError> {
    let principal = principal.ok_or(AuthError::Unauthenticated)?;
    if operation.permits(principal.role) {
        Ok(principal)
    } else {
        tracing::debug!(
            identity = %principal.identity,
            role = %principal.role,
            operation = %operation,
            "Operation denied"
        );
        Err(AuthError::Forbidden {
            role: principal.role,
            operation,
        })
    }
}

/// A clinical record linked to one patient and one doctor
pub trait ScopedRecord {
    /// Email of the patient the record belongs to
    fn patient_identity(&self) -> &str;
    /// Email of the user behind the record's doctor profile
    fn doctor_identity(&self) -> &str;
}

/// Admins see everything, doctors their assigned records, patients their own.
pub fn is_visible_to<R: ScopedRecord + ?Sized>(principal: &Principal, record: &R) -> bool {
    match principal.role {
        Role::Admin => true,
        Role::Doctor => record.doctor_identity() == principal.identity,
        Role::Patient => record.patient_identity() == principal.identity,
    }
}

pub fn ensure_visible<R: ScopedRecord + ?Sized>(
    principal: &Principal,
    record: &R,
) -> Result<(), AuthError> {
    if is_visible_to(principal, record) {
        Ok(())
    } else {
        Err(AuthError::NotOwner)
    }
}

/// Whether `principal` may edit the doctor profile linked to `profile_identity`
pub fn owns_doctor_profile(principal: &Principal, profile_identity: &str) -> bool {
    match principal.role {
        Role::Admin => true,
        Role::Doctor => profile_identity == principal.identity,
        Role::Patient => false,
    }
}
