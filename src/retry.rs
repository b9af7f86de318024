use std::time::Duration;

/// Base stall budget granted to the first attempt. Each retry gets an extra
/// half of this on top of the previous attempt's budget.
const BASE_ATTEMPT_BUDGET: Duration = Duration::from_secs(4);

/// Computes per-attempt stall budgets and decides whether another attempt is
/// permitted.
///
/// The budget grows linearly: `base + base/2 * (attempt_index - 1)`, so a
/// retried request gets a longer grace period each time. The attempt limit
/// defaults to 1, and with that default the first attempt consumes the only
/// permitted attempt before any timeout can fire, so the restart path never
/// runs unless the caller raises the limit. Callers relying on the no-retry
/// default get exactly that.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    base_budget: Duration,
    attempt_limit: u32,
}

impl RetryPolicy {
    pub fn new(attempt_limit: u32) -> Self {
        Self {
            base_budget: BASE_ATTEMPT_BUDGET,
            attempt_limit: attempt_limit.max(1),
        }
    }

    /// Stall budget for the given 1-based attempt index.
    pub fn attempt_budget(&self, attempt_index: u32) -> Duration {
        self.base_budget + (self.base_budget / 2) * attempt_index.saturating_sub(1)
    }

    /// Whether another attempt may start after `attempts_used` attempts.
    pub fn allows_another(&self, attempts_used: u32) -> bool {
        attempts_used < self.attempt_limit
    }

    pub fn attempt_limit(&self) -> u32 {
        self.attempt_limit
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::RetryPolicy;

    #[test]
    fn budget_grows_linearly_per_attempt() {
        let policy = RetryPolicy::new(3);
        assert_eq!(policy.attempt_budget(1), Duration::from_secs(4));
        assert_eq!(policy.attempt_budget(2), Duration::from_secs(6));
        assert_eq!(policy.attempt_budget(3), Duration::from_secs(8));
    }

    #[test]
    fn default_limit_never_allows_a_second_attempt() {
        let policy = RetryPolicy::new(1);
        assert!(policy.allows_another(0));
        assert!(!policy.allows_another(1));
    }

    #[test]
    fn attempts_are_bounded_by_the_limit() {
        let policy = RetryPolicy::new(3);
        assert!(policy.allows_another(1));
        assert!(policy.allows_another(2));
        assert!(!policy.allows_another(3));
    }

    #[test]
    fn zero_limit_is_clamped_to_one() {
        let policy = RetryPolicy::new(0);
        assert_eq!(policy.attempt_limit(), 1);
    }
}
