//! Domain services.
//!
//! Handlers authorize the operation first, then call into these with the
//! request's [`Principal`](crate::auth::Principal). The services bind the
//! caller's identity to the records it may create or see.

pub mod accounts;
pub mod appointments;
pub mod doctors;
mod error;
pub mod identity;
pub mod prescriptions;
pub mod users;

#[cfg(test)]
mod test_support;

pub use accounts::AccountService;
pub use appointments::AppointmentService;
pub use doctors::DoctorService;
pub use error::{DomainError, DomainResult};
pub use identity::IdentityResolver;
pub use prescriptions::PrescriptionService;
pub use users::UserService;
