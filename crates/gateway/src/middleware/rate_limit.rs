//! Rate limiting middleware using token bucket algorithm

use axum::{extract::Request, middleware::Next, response::Response};
use governor::{
    clock::QuantaClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use mangaforge_common::errors::AppError;
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter using governor crate
pub type GlobalRateLimiter = RateLimiter<NotKeyed, InMemoryState, QuantaClock>;

/// Create a new rate limiter with a per-minute quota
pub fn create_rate_limiter(requests_per_minute: u32, burst: u32) -> Arc<GlobalRateLimiter> {
    let quota = Quota::per_minute(NonZeroU32::new(requests_per_minute.max(1)).unwrap())
        .allow_burst(NonZeroU32::new(burst.max(1)).unwrap());

    Arc::new(RateLimiter::direct(quota))
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    request: Request,
    next: Next,
    limiter: Arc<GlobalRateLimiter>,
    enabled: bool,
) -> Result<Response, AppError> {
    if !enabled {
        return Ok(next.run(request).await);
    }

    match limiter.check() {
        Ok(_) => Ok(next.run(request).await),
        Err(_) => {
            tracing::warn!(path = %request.uri().path(), "Rate limit exceeded");
            Err(AppError::RateLimited)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_creation() {
        let limiter = create_rate_limiter(60, 10);
        assert!(limiter.check().is_ok());
    }

    #[test]
    fn test_rate_limiter_exhausts_burst() {
        let limiter = create_rate_limiter(1, 1);
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }
}
