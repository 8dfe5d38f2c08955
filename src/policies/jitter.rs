//! # Jitter policy for retry delays.
//!
//! [`JitterPolicy`] adds randomness to backoff delays so that many supervisors
//! retrying the same failing dependency do not wake up in lockstep.
//!
//! - [`JitterPolicy::None`]: no randomization, predictable delays
//! - [`JitterPolicy::Multiply`]: delay × random[1.0, 2.0), re-capped at the max

use rand::Rng;
use std::time::Duration;

/// Policy controlling randomization of retry delays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// No jitter: use exact backoff delay.
    #[default]
    None,

    /// Multiplicative jitter: delay × random[1.0, 2.0).
    ///
    /// Never shortens a delay; at most doubles it. The result is capped again
    /// so the configured maximum still holds.
    Multiply,
}

impl JitterPolicy {
    /// Maps the `randomize` flag onto a policy.
    #[inline]
    pub fn from_randomize(randomize: bool) -> Self {
        if randomize {
            JitterPolicy::Multiply
        } else {
            JitterPolicy::None
        }
    }

    /// Applies jitter to the given (already capped) delay and re-caps it at `max`.
    pub fn apply(&self, delay: Duration, max: Option<Duration>) -> Duration {
        let jittered = match self {
            JitterPolicy::None => delay,
            JitterPolicy::Multiply => Self::multiply(delay),
        };
        match max {
            Some(max) => jittered.min(max),
            None => jittered,
        }
    }

    /// delay × random[1.0, 2.0)
    fn multiply(delay: Duration) -> Duration {
        if delay.is_zero() {
            return Duration::ZERO;
        }
        let factor: f64 = rand::rng().random_range(1.0..2.0);
        Duration::try_from_secs_f64(delay.as_secs_f64() * factor).unwrap_or(Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_identity() {
        let d = Duration::from_millis(750);
        assert_eq!(JitterPolicy::None.apply(d, None), d);
        assert_eq!(
            JitterPolicy::None.apply(d, Some(Duration::from_millis(500))),
            Duration::from_millis(500)
        );
    }

    #[test]
    fn test_multiply_bounds() {
        let base = Duration::from_millis(100);
        for _ in 0..200 {
            let d = JitterPolicy::Multiply.apply(base, None);
            assert!(d >= base, "{d:?} below base");
            assert!(d <= base * 2, "{d:?} above 2x base");
        }
    }

    #[test]
    fn test_multiply_recaps() {
        let base = Duration::from_millis(900);
        let max = Some(Duration::from_millis(1000));
        for _ in 0..200 {
            let d = JitterPolicy::Multiply.apply(base, max);
            assert!(d >= base);
            assert!(d <= Duration::from_millis(1000));
        }
    }

    #[test]
    fn test_zero_stays_zero() {
        assert_eq!(
            JitterPolicy::Multiply.apply(Duration::ZERO, None),
            Duration::ZERO
        );
    }

    #[test]
    fn test_from_randomize() {
        assert_eq!(JitterPolicy::from_randomize(true), JitterPolicy::Multiply);
        assert_eq!(JitterPolicy::from_randomize(false), JitterPolicy::None);
    }
}
