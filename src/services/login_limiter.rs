use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use parking_lot::Mutex;

/// Counts attempts per caller key.
pub trait RateLimiter: Send + Sync {
    /// Records an attempt. Returns how long the caller must wait when the
    /// limit has been reached.
    fn hit(&self, key: &str) -> Result<(), Duration>;
    fn reset(&self, key: &str);
}

#[derive(Debug, Clone, Copy)]
struct Attempts {
    count: u32,
    last_attempt: Instant,
}

/// In-process login limiter. Each attempt refreshes the window, so a caller
/// is let back in once `window` has passed since its last counted attempt.
pub struct LoginAttemptLimiter {
    attempts: Mutex<HashMap<String, Attempts>>,
    max_attempts: u32,
    window: Duration,
}

impl LoginAttemptLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        LoginAttemptLimiter {
            attempts: Mutex::new(HashMap::new()),
            max_attempts,
            window,
        }
    }

    pub fn hit_at(&self, key: &str, now: Instant) -> Result<(), Duration> {
        let mut attempts = self.attempts.lock();
        attempts.retain(|_, entry| now.duration_since(entry.last_attempt) <= self.window);

        let entry = attempts.entry(key.to_string()).or_insert(Attempts {
            count: 0,
            last_attempt: now,
        });

        if entry.count >= self.max_attempts {
            let elapsed = now.duration_since(entry.last_attempt);
            return Err(self.window.saturating_sub(elapsed));
        }

        entry.count += 1;
        entry.last_attempt = now;
        Ok(())
    }
}

impl RateLimiter for LoginAttemptLimiter {
    fn hit(&self, key: &str) -> Result<(), Duration> {
        self.hit_at(key, Instant::now())
    }

    fn reset(&self, key: &str) {
        self.attempts.lock().remove(key);
    }
}
