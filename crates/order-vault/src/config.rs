//! Environment-driven configuration.
//!
//! | Variable | Default |
//! |---|---|
//! | `STORE_BUFFER_SIZE` | 32 |
//! | `STORE_WRITE_POLICY` | `best-effort` |
//! | `QUEUE_TOPIC` | `orders` |
//! | `QUEUE_CAPACITY` | 1024 |
//! | `CACHE_REFRESH_INTERVAL_SECS` | 1800 |
//! | `CACHE_LIMIT` | 5000 |
//!
//! A variable that is unset keeps its default. One that is set but does not
//! parse (or is zero where zero makes no sense) also keeps its default and logs
//! a warning.

use crate::store::WritePolicy;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Request buffer of each relation's channel.
    pub buffer_size: usize,
    pub write_policy: WritePolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            buffer_size: 32,
            write_policy: WritePolicy::BestEffort,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    pub topic: String,
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            topic: "orders".to_string(),
            capacity: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub refresh_interval: Duration,
    /// Configured size limit. Informational only.
    pub limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(30 * 60),
            limit: 5000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub queue: QueueConfig,
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Reads the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads variables through `lookup`, falling back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let positive = |n: &usize| *n > 0;

        Self {
            store: StoreConfig {
                buffer_size: parse_or(&lookup, "STORE_BUFFER_SIZE", defaults.store.buffer_size, positive),
                write_policy: parse_or(&lookup, "STORE_WRITE_POLICY", defaults.store.write_policy, |_| true),
            },
            queue: QueueConfig {
                topic: lookup("QUEUE_TOPIC")
                    .filter(|topic| !topic.is_empty())
                    .unwrap_or(defaults.queue.topic),
                capacity: parse_or(&lookup, "QUEUE_CAPACITY", defaults.queue.capacity, positive),
            },
            cache: CacheConfig {
                refresh_interval: Duration::from_secs(parse_or(
                    &lookup,
                    "CACHE_REFRESH_INTERVAL_SECS",
                    defaults.cache.refresh_interval.as_secs(),
                    |secs: &u64| *secs > 0,
                )),
                limit: parse_or(&lookup, "CACHE_LIMIT", defaults.cache.limit, |_| true),
            },
        }
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
    valid: impl Fn(&T) -> bool,
) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    let Some(raw) = lookup(name) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if valid(&value) => value,
        Ok(value) => {
            warn!(variable = name, %value, %default, "Value out of range, using default");
            default
        }
        Err(e) => {
            warn!(variable = name, value = %raw, %default, error = %e, "Unparsable value, using default");
            default
        }
    }
}
