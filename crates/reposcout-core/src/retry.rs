//! Same-endpoint retry with fixed or exponential backoff.

use std::time::Duration;

use crate::{FetchError, FetchErrorKind};

/// Backoff strategy between attempts against one endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Uses a fixed delay between retries.
    Fixed {
        /// Delay between retries.
        delay: Duration,
    },
    /// Uses an exponential delay between retries.
    ///
    /// The delay is calculated as `base * (factor ^ attempt)`.
    Exponential {
        /// The initial backoff duration.
        base: Duration,
        /// The multiplicative factor for each subsequent retry.
        factor: f64,
        /// The maximum duration to wait between retries.
        max: Duration,
        /// Whether to apply random jitter (+/- 50%) to the delay.
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(200),
            factor: 2.0,
            max: Duration::from_secs(3),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let seconds = (base.as_secs_f64() * factor.powi(exponent)).min(max.as_secs_f64());
                let capped = Duration::try_from_secs_f64(seconds).unwrap_or(max);
                if !jitter {
                    return capped;
                }

                // Spread uniformly over [capped / 2, capped * 3 / 2].
                let millis = u64::try_from(capped.as_millis()).unwrap_or(u64::MAX);
                let half = millis / 2;
                Duration::from_millis(millis - half + fastrand::u64(0..=half.saturating_mul(2)))
            }
        }
    }
}

/// Retry policy applied to each endpoint before the resolver falls back.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    pub enabled: bool,
    /// Total attempts per endpoint = `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
    pub retry_on_timeout: bool,
    pub retry_on_transport: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::no_retry()
    }
}

impl RetryConfig {
    pub fn exponential(max_retries: u32) -> Self {
        Self {
            enabled: true,
            max_retries,
            backoff: Backoff::default(),
            retry_on_timeout: true,
            retry_on_transport: true,
        }
    }

    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            backoff: Backoff::Fixed { delay },
            ..Self::exponential(max_retries)
        }
    }

    /// One attempt per endpoint.
    pub fn no_retry() -> Self {
        Self {
            enabled: false,
            max_retries: 0,
            backoff: Backoff::default(),
            retry_on_timeout: false,
            retry_on_transport: false,
        }
    }

    /// Whether `retries_done` earlier retries still leave room for `error` to be retried.
    pub fn should_retry(&self, error: &FetchError, retries_done: u32) -> bool {
        if !self.enabled || retries_done >= self.max_retries || !error.retryable() {
            return false;
        }
        match error.kind() {
            FetchErrorKind::Timeout => self.retry_on_timeout,
            FetchErrorKind::Transport => self.retry_on_transport,
            FetchErrorKind::NotFound
            | FetchErrorKind::Rejected
            | FetchErrorKind::InvalidCoordinate => false,
        }
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff.delay(attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_backoff() {
        let backoff = Backoff::Fixed {
            delay: Duration::from_millis(100),
        };

        assert_eq!(backoff.delay(0), Duration::from_millis(100));
        assert_eq!(backoff.delay(10), Duration::from_millis(100));
    }

    #[test]
    fn test_exponential_backoff_is_capped() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(100),
            factor: 2.0,
            max: Duration::from_secs(1),
            jitter: false,
        };

        assert_eq!(backoff.delay(0), Duration::from_millis(100));
        assert_eq!(backoff.delay(1), Duration::from_millis(200));
        assert_eq!(backoff.delay(3), Duration::from_millis(800));
        assert_eq!(backoff.delay(4), Duration::from_secs(1));
    }

    #[test]
    fn test_exponential_backoff_with_jitter_stays_in_band() {
        let backoff = Backoff::Exponential {
            base: Duration::from_millis(100),
            factor: 2.0,
            max: Duration::from_secs(1),
            jitter: true,
        };

        for _ in 0..10 {
            for attempt in 0..5 {
                let delay_ms = backoff.delay(attempt).as_millis() as f64;
                let expected = (100.0 * 2_f64.powi(attempt as i32)).min(1000.0);
                assert!(delay_ms >= expected * 0.49, "attempt={attempt}, delay_ms={delay_ms}");
                assert!(delay_ms <= expected * 1.51, "attempt={attempt}, delay_ms={delay_ms}");
            }
        }
    }

    #[test]
    fn test_default_is_single_attempt() {
        let config = RetryConfig::default();

        assert!(!config.enabled);
        assert!(!config.should_retry(&FetchError::transport("reset"), 0));
    }

    #[test]
    fn test_only_retryable_kinds_are_retried() {
        let config = RetryConfig::fixed(Duration::from_millis(5), 2);

        assert!(config.should_retry(&FetchError::transport("reset"), 0));
        assert!(config.should_retry(&FetchError::timeout("slow"), 1));
        assert!(!config.should_retry(&FetchError::timeout("slow"), 2));
        assert!(!config.should_retry(&FetchError::not_found("missing"), 0));
        assert!(!config.should_retry(
            &FetchError::transport("status 500").with_retryable(false),
            0
        ));
    }
}
