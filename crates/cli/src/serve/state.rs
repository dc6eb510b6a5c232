//! Application state, the current artifact pair, and rate limiting.

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Instant;

use tokio::sync::{Mutex, RwLock};

use super::cache::AlignmentCache;
use super::RATE_LIMIT_WINDOW_SECS;

/// The most recently uploaded (model, log) pair.
///
/// Handlers clone this out of the lock and work on the request-scoped copy;
/// nothing downstream touches the shared slot, so a concurrent upload can
/// never swap artifacts underneath a running analytic.
#[derive(Debug, Clone)]
pub(crate) struct ArtifactPair {
    pub(crate) model_path: PathBuf,
    pub(crate) log_path: PathBuf,
    /// SHA-256 over the raw bytes of both documents; the cache key.
    pub(crate) fingerprint: String,
    pub(crate) uploaded_at: time::OffsetDateTime,
}

/// Per-IP request tracker: (request count, window start time).
type IpTracker = HashMap<IpAddr, (u64, Instant)>;

/// In-memory per-IP rate limiter.
pub(crate) struct RateLimiter {
    /// Request counts per IP per window.
    tracker: Mutex<IpTracker>,
    /// Maximum requests per window.
    pub(crate) max_requests: u64,
}

impl RateLimiter {
    pub(crate) fn new(max_requests: u64) -> Self {
        Self {
            tracker: Mutex::new(HashMap::new()),
            max_requests,
        }
    }

    /// Check if a request from the given IP is allowed.
    /// Returns Ok(()) if allowed, Err(retry_after_secs) if rate limited.
    pub(crate) async fn check(&self, ip: IpAddr) -> Result<(), u64> {
        let mut tracker = self.tracker.lock().await;
        let now = Instant::now();

        let entry = tracker.entry(ip).or_insert((0, now));

        // Reset window if expired
        let elapsed = now.duration_since(entry.1).as_secs();
        if elapsed >= RATE_LIMIT_WINDOW_SECS {
            entry.0 = 0;
            entry.1 = now;
        }

        entry.0 += 1;
        if entry.0 > self.max_requests {
            let retry_after = RATE_LIMIT_WINDOW_SECS.saturating_sub(elapsed);
            Err(retry_after)
        } else {
            Ok(())
        }
    }
}

/// Application state shared across request handlers.
pub(crate) struct AppState {
    /// The most recently uploaded artifact pair, if any.
    pub(crate) artifacts: RwLock<Option<ArtifactPair>>,
    /// Alignment results keyed by pair fingerprint.
    pub(crate) cache: AlignmentCache,
    /// Per-IP rate limiter.
    pub(crate) rate_limiter: RateLimiter,
    /// Directory that receives uploaded artifact documents.
    pub(crate) upload_dir: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rate_limiter_allows_up_to_max() {
        let limiter = RateLimiter::new(3);
        let ip: IpAddr = "127.0.0.1".parse().unwrap();

        for _ in 0..3 {
            assert!(limiter.check(ip).await.is_ok());
        }
        assert!(limiter.check(ip).await.is_err());
    }

    #[tokio::test]
    async fn rate_limiter_tracks_ips_independently() {
        let limiter = RateLimiter::new(1);
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();

        assert!(limiter.check(a).await.is_ok());
        assert!(limiter.check(b).await.is_ok());
        assert!(limiter.check(a).await.is_err());
    }
}
