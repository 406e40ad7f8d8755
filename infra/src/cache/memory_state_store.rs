//! In-process verification state store
//!
//! Keeps the same key layout and expiry semantics as the Redis store inside
//! one mutex-guarded map. State is not shared between processes, so this is
//! only suitable for development, tests and single-instance deployments.
//!
//! Deadlines use the tokio clock, so tests running with a paused clock can
//! expire records with `tokio::time::advance`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use vg_core::{
    CounterWindow, DomainError, DomainResult, RecordKey, StateStore, StoredRecord,
    VerificationRecord,
};

#[derive(Debug, Clone)]
enum Value {
    Text(String),
    Int(i64),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Value,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |deadline| deadline > now)
    }
}

#[derive(Debug, Default)]
struct Keyspace {
    entries: HashMap<String, Entry>,
}

impl Keyspace {
    fn get(&mut self, key: &str, now: Instant) -> Option<&mut Entry> {
        if self.entries.get(key).map_or(false, |e| !e.is_live(now)) {
            self.entries.remove(key);
        }
        self.entries.get_mut(key)
    }

    fn get_text(&mut self, key: &str, now: Instant) -> Option<String> {
        match self.get(key, now).map(|e| &e.value) {
            Some(Value::Text(text)) => Some(text.clone()),
            _ => None,
        }
    }

    fn get_int(&mut self, key: &str, now: Instant) -> Option<i64> {
        match self.get(key, now).map(|e| &e.value) {
            Some(Value::Int(value)) => Some(*value),
            _ => None,
        }
    }

    fn remaining(&mut self, key: &str, now: Instant) -> Option<Duration> {
        self.get(key, now)
            .and_then(|e| e.expires_at)
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    fn remove(&mut self, key: &str, now: Instant) -> bool {
        let existed = self.get(key, now).is_some();
        self.entries.remove(key);
        existed
    }

    fn purge_expired(&mut self, now: Instant) {
        self.entries.retain(|_, entry| entry.is_live(now));
    }
}

/// Deadline `ttl` after `now`, rejecting lifetimes the clock cannot represent
fn deadline(now: Instant, ttl: Duration) -> DomainResult<Instant> {
    now.checked_add(ttl).ok_or_else(|| DomainError::Validation {
        message: format!("expiry of {}s is out of range", ttl.as_secs()),
    })
}

/// Verification state store held in process memory
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    keyspace: Mutex<Keyspace>,
    key_prefix: Option<String>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose keys carry `prefix`, mirroring `CacheConfig::key_prefix`
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            keyspace: Mutex::new(Keyspace::default()),
            key_prefix: Some(prefix.into()),
        }
    }

    fn make_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, key),
            None => key.to_string(),
        }
    }

    /// Number of live keys, for diagnostics
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        let keyspace = self.keyspace.lock().await;
        keyspace.entries.values().filter(|e| e.is_live(now)).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Whether a live key exists, for tests and diagnostics
    pub async fn contains_key(&self, key: &str) -> bool {
        let now = Instant::now();
        let full_key = self.make_key(key);
        self.keyspace.lock().await.get(&full_key, now).is_some()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn atomic_write(&self, record: &VerificationRecord) -> DomainResult<()> {
        let now = Instant::now();
        let expires_at = Some(deadline(now, record.ttl)?);
        let mut keyspace = self.keyspace.lock().await;

        keyspace.purge_expired(now);
        keyspace.entries.insert(
            self.make_key(&record.key.code_key()),
            Entry {
                value: Value::Text(record.code_hash.clone()),
                expires_at,
            },
        );
        keyspace.entries.insert(
            self.make_key(&record.key.attempts_key()),
            Entry {
                value: Value::Int(i64::from(record.max_attempts)),
                expires_at,
            },
        );
        Ok(())
    }

    async fn read(&self, key: &RecordKey) -> DomainResult<Option<StoredRecord>> {
        let now = Instant::now();
        let code_key = self.make_key(&key.code_key());
        let attempts_key = self.make_key(&key.attempts_key());
        let mut keyspace = self.keyspace.lock().await;

        let code_hash = keyspace.get_text(&code_key, now);
        let attempts = keyspace.get_int(&attempts_key, now);

        Ok(match (code_hash, attempts) {
            (Some(code_hash), Some(remaining_attempts)) if remaining_attempts > 0 => {
                Some(StoredRecord {
                    code_hash,
                    remaining_attempts,
                    expires_in: keyspace.remaining(&code_key, now),
                })
            }
            _ => None,
        })
    }

    async fn delete(&self, key: &RecordKey) -> DomainResult<bool> {
        let now = Instant::now();
        let mut keyspace = self.keyspace.lock().await;
        let code_removed = keyspace.remove(&self.make_key(&key.code_key()), now);
        let attempts_removed = keyspace.remove(&self.make_key(&key.attempts_key()), now);
        Ok(code_removed || attempts_removed)
    }

    async fn delete_if_current(&self, key: &RecordKey, code_hash: &str) -> DomainResult<bool> {
        let now = Instant::now();
        let code_key = self.make_key(&key.code_key());
        let mut keyspace = self.keyspace.lock().await;

        if keyspace.get_text(&code_key, now).as_deref() != Some(code_hash) {
            return Ok(false);
        }
        keyspace.remove(&code_key, now);
        keyspace.remove(&self.make_key(&key.attempts_key()), now);
        Ok(true)
    }

    async fn consume(&self, key: &RecordKey, code_hash: &str) -> DomainResult<bool> {
        let now = Instant::now();
        let code_key = self.make_key(&key.code_key());
        let attempts_key = self.make_key(&key.attempts_key());
        let mut keyspace = self.keyspace.lock().await;

        let current = keyspace.get_text(&code_key, now).as_deref() == Some(code_hash);
        let usable = keyspace.get_int(&attempts_key, now).map_or(false, |n| n > 0);
        if !(current && usable) {
            return Ok(false);
        }
        keyspace.remove(&code_key, now);
        keyspace.remove(&attempts_key, now);
        Ok(true)
    }

    async fn incr_with_ttl(
        &self,
        counter_key: &str,
        window: Duration,
    ) -> DomainResult<CounterWindow> {
        let now = Instant::now();
        let full_key = self.make_key(counter_key);
        let window_end = deadline(now, window)?;
        let mut keyspace = self.keyspace.lock().await;

        let count = match keyspace.get(&full_key, now) {
            Some(Entry {
                value: Value::Int(count),
                ..
            }) => {
                *count += 1;
                *count
            }
            _ => {
                keyspace.entries.insert(
                    full_key.clone(),
                    Entry {
                        value: Value::Int(1),
                        expires_at: Some(window_end),
                    },
                );
                1
            }
        };

        Ok(CounterWindow {
            count: u64::try_from(count).unwrap_or(0),
            resets_in: keyspace.remaining(&full_key, now),
        })
    }

    async fn decr_bounded(
        &self,
        key: &RecordKey,
        code_hash: &str,
        floor: i64,
    ) -> DomainResult<Option<i64>> {
        let now = Instant::now();
        let code_key = self.make_key(&key.code_key());
        let attempts_key = self.make_key(&key.attempts_key());
        let mut keyspace = self.keyspace.lock().await;

        if keyspace.get_text(&code_key, now).as_deref() != Some(code_hash) {
            return Ok(None);
        }

        Ok(match keyspace.get(&attempts_key, now) {
            Some(Entry {
                value: Value::Int(attempts),
                ..
            }) => {
                if *attempts > floor {
                    *attempts -= 1;
                }
                Some(*attempts)
            }
            _ => None,
        })
    }

    async fn ping(&self) -> DomainResult<bool> {
        Ok(true)
    }
}
