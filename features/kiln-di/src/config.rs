/// How often the resolver retries deferred recipes after the first pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetryPolicy {
    /// Retry until a round builds nothing new
    #[default]
    UntilNoProgress,
    /// Retry at most this many rounds, stopping early when a round builds nothing new
    Rounds(usize),
}
impl RetryPolicy {
    /// Whether another round may run after `completed` rounds
    pub(crate) fn allows(&self, completed: usize) -> bool {
        match self {
            RetryPolicy::UntilNoProgress => true,
            RetryPolicy::Rounds(rounds) => completed < *rounds,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContainerConfig {
    pub retry: RetryPolicy,
    /// Recipe batches at or above this size are ordered with the parallel sort
    pub sort_threshold: usize,
}
impl Default for ContainerConfig {
    fn default() -> Self {
        ContainerConfig {
            retry: RetryPolicy::default(),
            sort_threshold: kiln_sort::SEQUENTIAL_THRESHOLD,
        }
    }
}
impl ContainerConfig {
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_sort_threshold(mut self, sort_threshold: usize) -> Self {
        self.sort_threshold = sort_threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_policy_bounds_rounds() {
        assert!(RetryPolicy::UntilNoProgress.allows(10_000));
        assert!(RetryPolicy::Rounds(1).allows(0));
        assert!(!RetryPolicy::Rounds(1).allows(1));
        assert!(!RetryPolicy::Rounds(0).allows(0));
    }

    #[test]
    fn defaults() {
        let config = ContainerConfig::default();
        assert_eq!(config.retry, RetryPolicy::UntilNoProgress);
        assert_eq!(config.sort_threshold, 2048);

        let config = config.with_retry(RetryPolicy::Rounds(2)).with_sort_threshold(8);
        assert_eq!(config.retry, RetryPolicy::Rounds(2));
        assert_eq!(config.sort_threshold, 8);
    }
}
