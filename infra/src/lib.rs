//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for Verigate. It provides
//! the concrete state stores and delivery channels behind the ports defined
//! in `vg_core`, plus configuration loading and tracing setup.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Cache**: Redis client, Redis-backed and in-process [`StateStore`]s
//! - **Delivery**: Redis mail queue and a logging channel for development
//! - **Config**: layered configuration loading
//! - **Telemetry**: `tracing` subscriber initialisation

use std::sync::Arc;

use vg_core::{
    CodeDelivery, DomainError, StateStore, VerificationService, VerificationUseCases,
};
use vg_shared::{AppConfig, CacheBackend, CacheConfig, DeliveryConfig, DeliveryProvider};

/// Cache module - Redis client and state stores
pub mod cache;

/// Configuration loading
pub mod config;

/// Delivery module - mail queue and development channels
pub mod delivery;

/// Tracing subscriber setup
pub mod telemetry;

use cache::{MemoryStateStore, RedisClient, RedisStateStore};
use delivery::{LoggingDelivery, RedisMailQueue};

/// Verification service over any state store
pub type DynVerificationService = VerificationService<dyn StateStore>;

/// Infrastructure service container
#[derive(Clone)]
pub struct InfrastructureServices {
    /// Backing store shared by every component
    pub store: Arc<dyn StateStore>,
    /// Channel that receives issued codes
    pub delivery: Arc<dyn CodeDelivery>,
    /// Verification facade
    pub verification: Arc<DynVerificationService>,
    /// Email verification and password reset flows
    pub use_cases: Arc<VerificationUseCases<dyn StateStore, dyn CodeDelivery>>,
}

/// Initialize infrastructure services
///
/// This function sets up:
/// - The configured state store (Redis connection or in-process map)
/// - The code delivery channel
/// - The verification service and its use cases
pub async fn initialize(config: &AppConfig) -> Result<InfrastructureServices, InfrastructureError> {
    tracing::info!(
        environment = %config.environment,
        "Initializing infrastructure services..."
    );

    // A single Redis connection is shared by the store and the mail queue
    let redis_client = match (config.cache.backend, config.delivery.provider) {
        (CacheBackend::Memory, DeliveryProvider::Log) => None,
        _ => Some(RedisClient::new(config.cache.clone()).await?),
    };

    let store = build_state_store(&config.cache, redis_client.clone());
    let delivery = build_delivery(&config.delivery, redis_client)?;

    let verification = Arc::new(
        VerificationService::from_config(Arc::clone(&store), &config.verification)
            .map_err(|e| InfrastructureError::Config(e.to_string()))?,
    );
    let use_cases = Arc::new(VerificationUseCases::new(
        Arc::clone(&verification),
        Arc::clone(&delivery),
        &config.verification,
        config.delivery.company_name.clone(),
    ));

    tracing::info!("Infrastructure services initialized successfully");

    Ok(InfrastructureServices {
        store,
        delivery,
        verification,
        use_cases,
    })
}

/// Pick the state store for the configured backend
///
/// Falls back to a fresh connection-less memory store when the Redis
/// backend is configured without a client.
pub fn build_state_store(
    config: &CacheConfig,
    redis_client: Option<RedisClient>,
) -> Arc<dyn StateStore> {
    match (config.backend, redis_client) {
        (CacheBackend::Redis, Some(client)) => Arc::new(RedisStateStore::new(client)),
        (CacheBackend::Redis, None) => {
            tracing::warn!("Redis backend configured without a client, using in-process store");
            Arc::new(MemoryStateStore::new())
        }
        (CacheBackend::Memory, _) => {
            tracing::warn!("Using in-process state store; do not run more than one instance");
            Arc::new(MemoryStateStore::new())
        }
    }
}

/// Pick the delivery channel for the configured provider
pub fn build_delivery(
    config: &DeliveryConfig,
    redis_client: Option<RedisClient>,
) -> Result<Arc<dyn CodeDelivery>, InfrastructureError> {
    match config.provider {
        DeliveryProvider::Log => Ok(Arc::new(LoggingDelivery::new())),
        DeliveryProvider::RedisQueue => {
            let client = redis_client.ok_or_else(|| {
                InfrastructureError::Config(
                    "redis-queue delivery requires a Redis connection".to_string(),
                )
            })?;
            Ok(Arc::new(RedisMailQueue::new(client, config.queue_name.clone())))
        }
    }
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Redis cache error
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// A store call exceeded its deadline
    #[error("Operation '{operation}' timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Mail delivery error
    #[error("Delivery error: {0}")]
    Delivery(String),
}

impl From<InfrastructureError> for DomainError {
    fn from(error: InfrastructureError) -> Self {
        match error {
            InfrastructureError::Cache(e) if cache::is_unavailable_error(&e) => {
                DomainError::StoreUnavailable {
                    message: e.to_string(),
                }
            }
            InfrastructureError::Timeout { .. } => DomainError::StoreUnavailable {
                message: error.to_string(),
            },
            InfrastructureError::Delivery(message) => DomainError::Delivery { message },
            other => DomainError::Internal {
                message: other.to_string(),
            },
        }
    }
}
