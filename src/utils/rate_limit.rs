use crate::{config::Config, error::AppError, error::Result, services::auth::AuthUser};
use governor::{
    clock::DefaultClock,
    state::keyed::DashMapStateStore,
    Quota, RateLimiter,
};
use std::{num::NonZeroU32, time::Duration};
use tracing::warn;

type KeyedRateLimiter = RateLimiter<String, DashMapStateStore<String>, DefaultClock>;

/// Per-user rate limiting for mutating blog endpoints, with a higher
/// quota for admins than for regular editors.
pub struct RateLimits {
    admin: KeyedRateLimiter,
    regular: KeyedRateLimiter,
}

impl RateLimits {
    pub fn new(config: &Config) -> Self {
        let window = Duration::from_secs(config.rate_limit_window_secs.max(1));

        Self {
            admin: RateLimiter::dashmap(quota(window, config.rate_limit_admin_requests)),
            regular: RateLimiter::dashmap(quota(window, config.rate_limit_user_requests)),
        }
    }

    pub fn check(&self, user: &AuthUser) -> Result<()> {
        let limiter = if user.is_admin { &self.admin } else { &self.regular };

        match limiter.check_key(&user.id) {
            Ok(_) => Ok(()),
            Err(_) => {
                warn!("Rate limit exceeded for user: {}", user.id);
                Err(AppError::RateLimitExceeded)
            }
        }
    }
}

fn quota(window: Duration, requests: u32) -> Quota {
    let requests = NonZeroU32::new(requests.max(1)).unwrap();
    let period = (window / requests.get()).max(Duration::from_millis(1));
    Quota::with_period(period).unwrap().allow_burst(requests)
}
