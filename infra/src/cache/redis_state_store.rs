//! Redis implementation of the verification state store
//!
//! Unconditional batches run as MULTI/EXEC pipelines; anything that must
//! read before it writes runs as a Lua script, which Redis executes
//! without interleaving other commands. Key layout:
//! - `[{prefix}:]{namespace}:{subject}:code` - Argon2 hash of the code
//! - `[{prefix}:]{namespace}:{subject}:attempts` - remaining attempts
//! - `[{prefix}:]{namespace}:{subject}:rate` - issuance counter

use async_trait::async_trait;
use once_cell::sync::Lazy;
use redis::Script;
use std::time::Duration;
use tracing::debug;

use vg_core::{CounterWindow, DomainResult, RecordKey, StateStore, StoredRecord, VerificationRecord};

use super::redis_client::RedisClient;

/// Delete both keys if the stored hash is `ARGV[1]`
static DELETE_IF_CURRENT_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
if redis.call('GET', KEYS[1]) == ARGV[1] then
  redis.call('DEL', KEYS[1], KEYS[2])
  return 1
end
return 0
"#,
    )
});

/// Delete both keys if the stored hash is `ARGV[1]` and attempts remain
static CONSUME_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
if redis.call('GET', KEYS[1]) ~= ARGV[1] then
  return 0
end
local attempts = tonumber(redis.call('GET', KEYS[2]))
if attempts == nil or attempts <= 0 then
  return 0
end
redis.call('DEL', KEYS[1], KEYS[2])
return 1
"#,
    )
});

/// Decrement attempts above the floor `ARGV[2]` while the hash is `ARGV[1]`
static DECR_BOUNDED_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
if redis.call('GET', KEYS[1]) ~= ARGV[1] then
  return false
end
local attempts = tonumber(redis.call('GET', KEYS[2]))
if attempts == nil then
  return false
end
if attempts > tonumber(ARGV[2]) then
  return redis.call('DECR', KEYS[2])
end
return attempts
"#,
    )
});

/// Increment a counter and start its window on the first hit
static INCR_WITH_TTL_SCRIPT: Lazy<Script> = Lazy::new(|| {
    Script::new(
        r#"
local count = redis.call('INCR', KEYS[1])
local ttl = redis.call('PTTL', KEYS[1])
if ttl < 0 then
  redis.call('PEXPIRE', KEYS[1], ARGV[1])
  ttl = tonumber(ARGV[1])
end
return {count, ttl}
"#,
    )
});

/// Verification state store on a shared Redis instance
#[derive(Clone)]
pub struct RedisStateStore {
    client: RedisClient,
}

impl RedisStateStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    fn code_key(&self, key: &RecordKey) -> String {
        self.client.make_key(&key.code_key())
    }

    fn attempts_key(&self, key: &RecordKey) -> String {
        self.client.make_key(&key.attempts_key())
    }
}

/// Redis wants whole milliseconds; never round a live TTL down to zero
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

/// Convert a `PTTL` reply, where negative values mean "no expiry" or "no key"
fn pttl_to_duration(pttl: i64) -> Option<Duration> {
    u64::try_from(pttl).ok().filter(|ms| *ms > 0).map(Duration::from_millis)
}

#[async_trait]
impl StateStore for RedisStateStore {
    async fn atomic_write(&self, record: &VerificationRecord) -> DomainResult<()> {
        let ttl_ms = ttl_millis(record.ttl);

        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("SET")
            .arg(self.code_key(&record.key))
            .arg(&record.code_hash)
            .arg("PX")
            .arg(ttl_ms)
            .ignore()
            .cmd("SET")
            .arg(self.attempts_key(&record.key))
            .arg(record.max_attempts)
            .arg("PX")
            .arg(ttl_ms)
            .ignore();

        let mut conn = self.client.connection();
        self.client
            .execute_once("atomic_write", pipe.query_async::<_, ()>(&mut conn))
            .await?;

        debug!(ttl_ms = ttl_ms, "Verification record written");
        Ok(())
    }

    async fn read(&self, key: &RecordKey) -> DomainResult<Option<StoredRecord>> {
        let code_key = self.code_key(key);
        let attempts_key = self.attempts_key(key);

        let (code_hash, attempts, pttl): (Option<String>, Option<i64>, i64) = self
            .client
            .execute_with_retry("read", |mut conn| {
                let code_key = code_key.clone();
                let attempts_key = attempts_key.clone();

                Box::pin(async move {
                    redis::pipe()
                        .atomic()
                        .cmd("GET")
                        .arg(&code_key)
                        .cmd("GET")
                        .arg(&attempts_key)
                        .cmd("PTTL")
                        .arg(&code_key)
                        .query_async(&mut conn)
                        .await
                })
            })
            .await?;

        Ok(match (code_hash, attempts) {
            (Some(code_hash), Some(remaining_attempts)) if remaining_attempts > 0 => {
                Some(StoredRecord {
                    code_hash,
                    remaining_attempts,
                    expires_in: pttl_to_duration(pttl),
                })
            }
            _ => None,
        })
    }

    async fn delete(&self, key: &RecordKey) -> DomainResult<bool> {
        let mut conn = self.client.connection();
        let deleted: i64 = self
            .client
            .execute_once(
                "delete",
                redis::cmd("DEL")
                    .arg(self.code_key(key))
                    .arg(self.attempts_key(key))
                    .query_async(&mut conn),
            )
            .await?;
        Ok(deleted > 0)
    }

    async fn delete_if_current(&self, key: &RecordKey, code_hash: &str) -> DomainResult<bool> {
        let mut conn = self.client.connection();
        let deleted: i64 = self
            .client
            .execute_once(
                "delete_if_current",
                DELETE_IF_CURRENT_SCRIPT
                    .key(self.code_key(key))
                    .key(self.attempts_key(key))
                    .arg(code_hash)
                    .invoke_async(&mut conn),
            )
            .await?;
        Ok(deleted == 1)
    }

    async fn consume(&self, key: &RecordKey, code_hash: &str) -> DomainResult<bool> {
        let mut conn = self.client.connection();
        let consumed: i64 = self
            .client
            .execute_once(
                "consume",
                CONSUME_SCRIPT
                    .key(self.code_key(key))
                    .key(self.attempts_key(key))
                    .arg(code_hash)
                    .invoke_async(&mut conn),
            )
            .await?;
        Ok(consumed == 1)
    }

    async fn incr_with_ttl(
        &self,
        counter_key: &str,
        window: Duration,
    ) -> DomainResult<CounterWindow> {
        let mut conn = self.client.connection();
        let (count, pttl): (i64, i64) = self
            .client
            .execute_once(
                "incr_with_ttl",
                INCR_WITH_TTL_SCRIPT
                    .key(self.client.make_key(counter_key))
                    .arg(ttl_millis(window))
                    .invoke_async(&mut conn),
            )
            .await?;

        Ok(CounterWindow {
            count: u64::try_from(count).unwrap_or(0),
            resets_in: pttl_to_duration(pttl),
        })
    }

    async fn decr_bounded(
        &self,
        key: &RecordKey,
        code_hash: &str,
        floor: i64,
    ) -> DomainResult<Option<i64>> {
        let mut conn = self.client.connection();
        let remaining: Option<i64> = self
            .client
            .execute_once(
                "decr_bounded",
                DECR_BOUNDED_SCRIPT
                    .key(self.code_key(key))
                    .key(self.attempts_key(key))
                    .arg(code_hash)
                    .arg(floor)
                    .invoke_async(&mut conn),
            )
            .await?;
        Ok(remaining)
    }

    async fn ping(&self) -> DomainResult<bool> {
        Ok(self.client.health_check().await?)
    }
}
