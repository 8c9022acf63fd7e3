//! Token bucket rate limiter for share resolution.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use uuid::Uuid;

/// Buckets idle longer than this are dropped when the map is swept.
const BUCKET_IDLE_TTL: Duration = Duration::from_secs(600);
/// Sweep the bucket map once it grows past this many entries.
const SWEEP_THRESHOLD: usize = 10_000;

/// In-memory token bucket limiter keyed by caller identity + share token,
/// defending share tokens against enumeration.
#[derive(Debug, Clone)]
pub struct ShareRateLimiter {
    /// `caller:token` → bucket state.
    buckets: Arc<Mutex<HashMap<String, TokenBucket>>>,
    /// Maximum tokens per bucket.
    burst: u32,
    /// Token refill rate per second.
    refill_per_second: f64,
}

#[derive(Debug, Clone)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl ShareRateLimiter {
    /// Creates a new rate limiter.
    pub fn new(burst: u32, refill_per_second: f64) -> Self {
        Self {
            buckets: Arc::new(Mutex::new(HashMap::new())),
            burst,
            refill_per_second,
        }
    }

    /// Attempts to consume a token for the given caller and share token.
    /// Returns false when the caller is over the limit.
    pub async fn check(&self, requesting_user: Option<Uuid>, share_token: &str) -> bool {
        let key = match requesting_user {
            Some(user) => format!("{user}:{share_token}"),
            None => format!("anon:{share_token}"),
        };

        let mut buckets = self.buckets.lock().await;
        let now = Instant::now();

        if buckets.len() > SWEEP_THRESHOLD {
            let before = buckets.len();
            buckets.retain(|_, b| now.duration_since(b.last_refill) < BUCKET_IDLE_TTL);
            tracing::debug!(
                swept = before - buckets.len(),
                "Swept idle rate limit buckets"
            );
        }

        let bucket = buckets.entry(key).or_insert(TokenBucket {
            tokens: self.burst as f64,
            last_refill: now,
        });

        // Refill tokens
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_second).min(self.burst as f64);
        bucket.last_refill = now;

        // Try to consume
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}
