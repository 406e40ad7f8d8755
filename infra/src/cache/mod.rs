//! Cache module for verification state
//!
//! Provides the Redis client with bounded timeouts and the two
//! [`vg_core::StateStore`] implementations: Redis for shared deployments
//! and an in-process map for development and tests.

pub mod memory_state_store;
pub mod redis_client;
pub mod redis_state_store;


pub use memory_state_store::MemoryStateStore;
pub use redis_client::{RedisClient, RedisFuture};
pub use redis_state_store::RedisStateStore;

pub(crate) use redis_client::{is_retriable_error, is_unavailable_error};
