//! # Verigate Core
//!
//! Core verification logic for Verigate. This crate contains the domain
//! entities, the error taxonomy, the store and delivery ports, and the
//! verification service that issues and checks one-time codes.

pub mod domain;
pub mod errors;
pub mod services;
pub mod use_cases;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use services::*;
pub use use_cases::*;
