pub mod login_limiter;
pub mod response_cache;

pub use login_limiter::{LoginAttemptLimiter, RateLimiter};
pub use response_cache::{LruResponseCache, ResponseCache};
