//! Capped exponential backoff with jitter.
//!
//! The schedule is explicit and caller-tunable: attempts, base delay,
//! multiplier, jitter fraction, per-sleep cap, and an absolute deadline
//! for the whole submission.

use std::time::Duration;

use rand::Rng;

use crate::error::SubmitError;

/// Retry policy for one submission.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of transport rounds across both the add-leaf and
    /// proof-polling phases.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub base_delay: Duration,
    /// Growth factor applied per attempt. Must be at least 1.
    pub multiplier: f64,
    /// Jitter fraction in `0..=1`; each delay is scaled by a random
    /// factor in `1 - jitter ..= 1 + jitter`.
    pub jitter: f64,
    /// Upper bound for any single delay, before jitter.
    pub max_delay: Duration,
    /// Absolute budget for the whole submission.
    pub deadline: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            base_delay: Duration::from_millis(500),
            multiplier: 1.5,
            jitter: 0.2,
            max_delay: Duration::from_secs(10),
            deadline: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    /// Reject nonsensical policies before a submission starts.
    pub fn validate(&self) -> Result<(), SubmitError> {
        if self.max_attempts == 0 {
            return Err(SubmitError::InvalidPolicy(
                "max_attempts must be at least 1".into(),
            ));
        }
        if self.base_delay.is_zero() {
            return Err(SubmitError::InvalidPolicy(
                "base_delay must be non-zero".into(),
            ));
        }
        if self.multiplier < 1.0 {
            return Err(SubmitError::InvalidPolicy(
                "multiplier must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(SubmitError::InvalidPolicy(
                "jitter must be within 0..=1".into(),
            ));
        }
        if self.max_delay < self.base_delay {
            return Err(SubmitError::InvalidPolicy(
                "max_delay must not be below base_delay".into(),
            ));
        }
        if self.deadline.is_zero() {
            return Err(SubmitError::InvalidPolicy(
                "deadline must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Delay to sleep after the given 0-based attempt, capped and
    /// jittered.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.min(64)).unwrap_or(64);
        let raw = self.base_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = raw.min(self.max_delay.as_secs_f64());
        let jittered = if self.jitter > 0.0 {
            capped * rand::thread_rng().gen_range(1.0 - self.jitter..=1.0 + self.jitter)
        } else {
            capped
        };
        Duration::from_secs_f64(jittered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn no_jitter() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(100),
            multiplier: 2.0,
            jitter: 0.0,
            max_delay: Duration::from_secs(1),
            deadline: Duration::from_secs(30),
        }
    }

    #[test]
    fn default_policy_is_valid() {
        RetryPolicy::default().validate().unwrap();
    }

    #[test]
    fn delays_grow_then_cap() {
        let policy = no_jitter();
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
        // 100ms * 2^4 = 1.6s, capped at 1s.
        assert_eq!(policy.delay_for(4), Duration::from_secs(1));
        assert_eq!(policy.delay_for(60), Duration::from_secs(1));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let mut policy = no_jitter();
        policy.jitter = 0.5;
        for attempt in 0..6 {
            let capped = no_jitter().delay_for(attempt);
            for _ in 0..50 {
                let d = policy.delay_for(attempt);
                assert!(d >= capped.mul_f64(0.5), "attempt {attempt}: {d:?}");
                assert!(d <= capped.mul_f64(1.5), "attempt {attempt}: {d:?}");
            }
        }
    }

    #[test]
    fn invalid_policies_rejected() {
        let mut policy = no_jitter();
        policy.max_attempts = 0;
        assert_matches!(policy.validate(), Err(SubmitError::InvalidPolicy(_)));

        let mut policy = no_jitter();
        policy.multiplier = 0.5;
        assert_matches!(policy.validate(), Err(SubmitError::InvalidPolicy(_)));

        let mut policy = no_jitter();
        policy.jitter = 1.5;
        assert_matches!(policy.validate(), Err(SubmitError::InvalidPolicy(_)));

        let mut policy = no_jitter();
        policy.max_delay = Duration::from_millis(10);
        assert_matches!(policy.validate(), Err(SubmitError::InvalidPolicy(_)));
    }
}
