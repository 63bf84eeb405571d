pub mod cache;
pub mod jwt_auth;
pub mod rate_limit;
pub mod sanitize;

pub use cache::cache_middleware;
pub use jwt_auth::jwt_auth_middleware;
pub use rate_limit::login_rate_limit_middleware;
pub use sanitize::sanitize_middleware;
