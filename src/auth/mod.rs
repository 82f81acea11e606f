//! Authentication and authorization.
//!
//! - [`token`]: issues and validates signed access tokens
//! - [`gate`]: turns a request's bearer token into a [`Principal`]
//! - [`policy`]: decides whether a principal may perform an [`Operation`]
//! - [`password`]: Argon2 password hashing

pub mod gate;
pub mod password;
pub mod policy;
mod principal;
pub mod token;

pub use gate::{authenticate, CurrentPrincipal};
pub use policy::{authorize, AuthError, Operation, ScopedRecord};
pub use principal::{Principal, Role};
pub use token::{Credential, TokenRejection, TokenService};
