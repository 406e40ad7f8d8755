//! Application use cases built on the verification service.

pub mod verification;

pub use verification::*;
