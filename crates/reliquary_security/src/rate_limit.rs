//! Per-key fixed-window rate limiting.
//!
//! Each key gets a counter that resets at the end of its window. Bursts of
//! up to twice the ceiling are possible across a window boundary; callers
//! wanting smoother limiting can swap in another algorithm behind
//! [`RateLimiter::check`].

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Rate limit configuration, one ceiling per operation category and a
/// shared window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct RateLimitConfig {
    /// Whether limiting is active at all
    #[serde(default = "default_enabled")]
    enabled: bool,
    /// Window length in milliseconds
    #[serde(default = "default_window_ms")]
    window_ms: u64,
    /// Uploads allowed per key per window
    #[serde(default = "default_upload_max")]
    upload_max: u32,
    /// Reads allowed per key per window
    #[serde(default = "default_read_max")]
    read_max: u32,
    /// Deletes allowed per key per window
    #[serde(default = "default_delete_max")]
    delete_max: u32,
}

fn default_enabled() -> bool {
    true
}

fn default_window_ms() -> u64 {
    60_000
}

fn default_upload_max() -> u32 {
    20
}

fn default_read_max() -> u32 {
    300
}

fn default_delete_max() -> u32 {
    30
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            window_ms: default_window_ms(),
            upload_max: default_upload_max(),
            read_max: default_read_max(),
            delete_max: default_delete_max(),
        }
    }
}

/// Counter for one key.
#[derive(Debug, Clone, Copy)]
struct Bucket {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window limiter for a single operation category.
///
/// Bucket state is process-local and guarded by a mutex.
///
/// # Example
///
/// ```
/// use reliquary_security::RateLimiter;
/// use std::time::Duration;
///
/// let limiter = RateLimiter::new(2, Duration::from_secs(60));
/// assert!(limiter.check("u1"));
/// assert!(limiter.check("u1"));
/// assert!(!limiter.check("u1"));
/// assert!(limiter.check("u2"));
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    enabled: bool,
    max: u32,
    window: Duration,
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl RateLimiter {
    /// Longest window a limiter will use; longer requests are clamped.
    pub const MAX_WINDOW: Duration = Duration::from_secs(365 * 24 * 60 * 60);

    /// Create an active limiter allowing `max` calls per key per `window`.
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            enabled: true,
            max,
            window: window.min(Self::MAX_WINDOW),
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Create a limiter that allows everything and tracks nothing.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            max: 0,
            window: Duration::ZERO,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Whether checks are enforced.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Window length in use.
    pub fn window(&self) -> Duration {
        self.window
    }

    fn buckets(&self) -> MutexGuard<'_, HashMap<String, Bucket>> {
        // A panic while holding the lock cannot leave a bucket half-written
        self.buckets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Count a call for `key`; `false` if the key is over its ceiling.
    pub fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now())
    }

    /// [`check`](Self::check) against an explicit clock reading.
    #[instrument(skip(self), fields(max = self.max))]
    pub fn check_at(&self, key: &str, now: Instant) -> bool {
        if !self.enabled {
            return true;
        }

        let mut buckets = self.buckets();
        match buckets.get_mut(key) {
            Some(bucket) if now < bucket.reset_at => {
                if bucket.count >= self.max {
                    debug!(count = bucket.count, "Rate limit exceeded");
                    false
                } else {
                    bucket.count += 1;
                    true
                }
            }
            _ => {
                let Some(reset_at) = now.checked_add(self.window) else {
                    debug!("Window end not representable, allowing call untracked");
                    return true;
                };
                buckets.insert(
                    key.to_string(),
                    Bucket {
                        count: 1,
                        reset_at,
                    },
                );
                true
            }
        }
    }

    /// Calls left for `key` in its current window.
    pub fn remaining(&self, key: &str) -> u32 {
        self.remaining_at(key, Instant::now())
    }

    /// [`remaining`](Self::remaining) against an explicit clock reading.
    pub fn remaining_at(&self, key: &str, now: Instant) -> u32 {
        if !self.enabled {
            return u32::MAX;
        }

        match self.buckets().get(key) {
            Some(bucket) if now < bucket.reset_at => self.max.saturating_sub(bucket.count),
            _ => self.max,
        }
    }

    /// Drop buckets whose window has elapsed. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    /// [`purge_expired`](Self::purge_expired) against an explicit clock reading.
    pub fn purge_expired_at(&self, now: Instant) -> usize {
        let mut buckets = self.buckets();
        let before = buckets.len();
        buckets.retain(|_, bucket| now < bucket.reset_at);
        before - buckets.len()
    }

    /// Number of keys currently tracked.
    pub fn bucket_count(&self) -> usize {
        self.buckets().len()
    }
}

/// Operation categories limited independently.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::AsRefStr, derive_more::Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum OperationCategory {
    /// Asset uploads
    #[display("upload")]
    Upload,
    /// Metadata and file reads
    #[display("read")]
    Read,
    /// Asset deletes
    #[display("delete")]
    Delete,
}

/// One limiter per [`OperationCategory`].
///
/// # Example
///
/// ```
/// use reliquary_security::{OperationCategory, RateLimitConfig, RateLimiters};
///
/// let limiters = RateLimiters::from_config(&RateLimitConfig::default().with_upload_max(1));
/// assert!(limiters.check(OperationCategory::Upload, "u1"));
/// assert!(!limiters.check(OperationCategory::Upload, "u1"));
/// assert!(limiters.check(OperationCategory::Read, "u1"));
/// ```
#[derive(Debug)]
pub struct RateLimiters {
    upload: RateLimiter,
    read: RateLimiter,
    delete: RateLimiter,
}

impl RateLimiters {
    /// Build limiters from configuration.
    pub fn from_config(config: &RateLimitConfig) -> Self {
        if !config.enabled {
            return Self {
                upload: RateLimiter::disabled(),
                read: RateLimiter::disabled(),
                delete: RateLimiter::disabled(),
            };
        }

        let window = Duration::from_millis(config.window_ms);
        Self {
            upload: RateLimiter::new(config.upload_max, window),
            read: RateLimiter::new(config.read_max, window),
            delete: RateLimiter::new(config.delete_max, window),
        }
    }

    /// The limiter for `category`.
    pub fn limiter(&self, category: OperationCategory) -> &RateLimiter {
        match category {
            OperationCategory::Upload => &self.upload,
            OperationCategory::Read => &self.read,
            OperationCategory::Delete => &self.delete,
        }
    }

    /// Count a call in `category` for `key`.
    pub fn check(&self, category: OperationCategory, key: &str) -> bool {
        let allowed = self.limiter(category).check(key);
        if !allowed {
            tracing::warn!(category = %category, key, "Rate limit exceeded");
        }
        allowed
    }

    /// Drop elapsed buckets in every category.
    pub fn purge_expired(&self) -> usize {
        self.upload.purge_expired() + self.read.purge_expired() + self.delete.purge_expired()
    }
}

/// Key a caller is limited under: the owner id, else the network address.
///
/// # Example
///
/// ```
/// use reliquary_security::caller_key;
///
/// assert_eq!(caller_key(Some("u1"), Some("10.0.0.1")), "owner:u1");
/// assert_eq!(caller_key(None, Some("10.0.0.1")), "addr:10.0.0.1");
/// assert_eq!(caller_key(Some(" "), None), "anonymous");
/// ```
pub fn caller_key(owner_id: Option<&str>, remote_addr: Option<&str>) -> String {
    let non_blank = |s: &&str| !s.trim().is_empty();

    match (owner_id.filter(non_blank), remote_addr.filter(non_blank)) {
        (Some(owner), _) => format!("owner:{}", owner),
        (None, Some(addr)) => format!("addr:{}", addr),
        (None, None) => "anonymous".to_string(),
    }
}
