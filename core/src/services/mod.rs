//! Domain services for one-time code issuance and verification.

pub mod verification;

pub use verification::*;
