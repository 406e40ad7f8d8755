//! Redis client implementation
//!
//! This module provides a Redis client over one multiplexed connection with
//! bounded command timeouts. Reads may go through [`RedisClient::execute_with_retry`],
//! which retries transient failures with exponential backoff; mutations go
//! through [`RedisClient::execute_once`] and are never replayed, since a
//! replayed `INCR` or `DECR` would count twice.

use redis::{aio::MultiplexedConnection, Client, RedisError, RedisResult};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};
use vg_shared::utils::masking::mask_url;
use vg_shared::CacheConfig;

use crate::InfrastructureError;

/// Boxed future returned by retryable operations
pub type RedisFuture<T> = Pin<Box<dyn Future<Output = RedisResult<T>> + Send>>;

/// Redis client with bounded timeouts and read retry
#[derive(Clone)]
pub struct RedisClient {
    /// Redis multiplexed connection for async operations
    connection: MultiplexedConnection,
    /// Configuration used to create this client
    config: CacheConfig,
}

impl RedisClient {
    /// Connect to the Redis server named by `config.url`
    ///
    /// The connection is retried `config.max_retries` times with exponential
    /// backoff; each attempt is bounded by `config.connection_timeout_ms`.
    ///
    /// # Example
    /// ```no_run
    /// use vg_infra::cache::RedisClient;
    /// use vg_shared::CacheConfig;
    ///
    /// async fn create_client() -> Result<RedisClient, vg_infra::InfrastructureError> {
    ///     RedisClient::new(CacheConfig::new("redis://localhost:6379")).await
    /// }
    /// ```
    pub async fn new(config: CacheConfig) -> Result<Self, InfrastructureError> {
        info!(
            url = %mask_url(&config.url),
            command_timeout_ms = config.command_timeout_ms,
            "Creating Redis client"
        );

        // Parse Redis URL and create client
        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!("Failed to parse Redis URL: {}", e);
            InfrastructureError::Config(format!("Invalid Redis URL: {}", e))
        })?;

        let connection = Self::create_connection_with_retry(&client, &config).await?;

        info!("Redis client created successfully");

        Ok(Self { connection, config })
    }

    /// Create multiplexed connection with retry logic
    async fn create_connection_with_retry(
        client: &Client,
        config: &CacheConfig,
    ) -> Result<MultiplexedConnection, InfrastructureError> {
        let connect_timeout = Duration::from_millis(config.connection_timeout_ms);
        let max_attempts = config.max_retries.max(1);
        let mut attempts = 0;
        let mut delay = config.retry_delay_ms;

        loop {
            attempts += 1;
            debug!("Attempting to connect to Redis (attempt {})", attempts);

            let result = match timeout(connect_timeout, client.get_multiplexed_async_connection()).await {
                Ok(result) => result.map_err(InfrastructureError::Cache),
                Err(_) => Err(InfrastructureError::Timeout {
                    operation: "connect",
                    timeout_ms: config.connection_timeout_ms,
                }),
            };

            match result {
                Ok(connection) => {
                    info!("Successfully connected to Redis");
                    return Ok(connection);
                }
                Err(e) if attempts < max_attempts => {
                    warn!(
                        "Failed to connect to Redis (attempt {}/{}): {}. Retrying in {}ms...",
                        attempts, max_attempts, e, delay
                    );
                    sleep(Duration::from_millis(delay)).await;
                    // Exponential backoff with cap at 5 seconds
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!("Failed to connect to Redis after {} attempts: {}", attempts, e);
                    return Err(e);
                }
            }
        }
    }

    /// Apply the configured key prefix
    pub fn make_key(&self, key: &str) -> String {
        self.config.make_key(key)
    }

    /// A handle on the shared connection
    pub fn connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }

    /// Per-command deadline
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.config.command_timeout_ms)
    }

    /// Run a single operation under the command timeout, without retry
    pub async fn execute_once<F, T>(
        &self,
        operation: &'static str,
        future: F,
    ) -> Result<T, InfrastructureError>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match timeout(self.command_timeout(), future).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!(operation = operation, error = %e, "Redis operation failed");
                Err(InfrastructureError::Cache(e))
            }
            Err(_) => {
                error!(
                    operation = operation,
                    timeout_ms = self.config.command_timeout_ms,
                    "Redis operation timed out"
                );
                Err(InfrastructureError::Timeout {
                    operation,
                    timeout_ms: self.config.command_timeout_ms,
                })
            }
        }
    }

    /// Execute an idempotent Redis operation with automatic retry logic
    ///
    /// Each attempt is bounded by the command timeout. Timeouts and
    /// transient errors are retried with exponential backoff.
    pub async fn execute_with_retry<F, T>(
        &self,
        operation_name: &'static str,
        operation: F,
    ) -> Result<T, InfrastructureError>
    where
        F: Fn(MultiplexedConnection) -> RedisFuture<T>,
    {
        let max_attempts = self.config.max_retries.max(1);
        let mut attempts = 0;
        let mut delay = self.config.retry_delay_ms;

        loop {
            attempts += 1;
            let conn = self.connection.clone();

            let result = match timeout(self.command_timeout(), operation(conn)).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => InfrastructureError::Cache(e),
                Err(_) => InfrastructureError::Timeout {
                    operation: operation_name,
                    timeout_ms: self.config.command_timeout_ms,
                },
            };

            let retriable = match &result {
                InfrastructureError::Cache(e) => is_retriable_error(e),
                InfrastructureError::Timeout { .. } => true,
                _ => false,
            };

            if retriable && attempts < max_attempts {
                warn!(
                    "Redis operation '{}' failed (attempt {}/{}): {}. Retrying in {}ms...",
                    operation_name, attempts, max_attempts, result, delay
                );
                sleep(Duration::from_millis(delay)).await;
                // Exponential backoff with cap at 5 seconds
                delay = (delay * 2).min(5000);
            } else {
                error!(
                    "Redis operation '{}' failed after {} attempts: {}",
                    operation_name, attempts, result
                );
                return Err(result);
            }
        }
    }

    /// Check if the Redis connection is healthy
    ///
    /// Performs a PING command to verify connectivity.
    pub async fn health_check(&self) -> Result<bool, InfrastructureError> {
        debug!("Performing Redis health check");

        let response: String = self
            .execute_with_retry("ping", |mut conn| {
                Box::pin(async move { redis::cmd("PING").query_async::<_, String>(&mut conn).await })
            })
            .await?;

        if response == "PONG" {
            debug!("Redis health check passed");
            Ok(true)
        } else {
            warn!("Redis health check returned unexpected response: {}", response);
            Ok(false)
        }
    }
}

/// Check if a Redis error is transient and the operation may be retried
pub(crate) fn is_retriable_error(error: &RedisError) -> bool {
    matches!(
        error.kind(),
        redis::ErrorKind::IoError
            | redis::ErrorKind::BusyLoadingError
            | redis::ErrorKind::TryAgain
    ) || error.is_connection_dropped()
        || error.is_timeout()
}

/// Check if a Redis error means the store cannot be reached right now
pub(crate) fn is_unavailable_error(error: &RedisError) -> bool {
    is_retriable_error(error) || error.is_connection_refusal() || error.is_io_error()
}
