//! Domain models for the vetdose system.

mod dosage;
mod medication;
mod user;

pub use dosage::*;
pub use medication::*;
pub use user::*;
