//! Code delivery channels
//!
//! Implementations of [`vg_core::CodeDelivery`]. Email rendering and SMTP
//! live in a separate mail worker; this crate only hands tasks over.
//!
//! - [`RedisMailQueue`]: pushes JSON jobs onto a Redis list for the worker
//! - [`LoggingDelivery`]: logs a redacted summary and keeps an in-memory
//!   outbox, for development and tests

pub mod logging_delivery;
pub mod redis_mail_queue;

pub use logging_delivery::LoggingDelivery;
pub use redis_mail_queue::{MailJob, RedisMailQueue};
