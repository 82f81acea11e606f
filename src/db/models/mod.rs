//! Database models, one module per table.

pub mod appointment;
pub mod doctor;
pub mod prescription;
pub mod user;

pub use appointment::*;
pub use doctor::*;
pub use prescription::*;
pub use user::*;
