// ABOUTME: Polling policy for draining a command's output streams.
// ABOUTME: Busy polling mirrors the historical tight loop; bounded polling sleeps and gives up.

use serde::Deserialize;
use std::time::Duration;

/// Largest block read from one stream per poll.
pub const CHUNK_SIZE: usize = 4096;

/// How the drain loop waits between polls and when it stops waiting.
///
/// Fields left out of a config section keep their [`Default`] values, so busy
/// polling needs `interval: null` and `timeout: null` spelled out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PollPolicy {
    /// Pause between polls. `None` re-polls immediately, only yielding to the
    /// runtime so the protocol reader can make progress.
    #[serde(with = "humantime_serde")]
    pub interval: Option<Duration>,

    /// Give up on the command after this long. `None` waits forever.
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,

    /// Keep reading bytes that are still buffered when the exit status posts.
    /// Off by default: those bytes are dropped.
    pub flush_on_exit: bool,
}

impl PollPolicy {
    /// Tight polling with no timeout.
    pub fn busy() -> Self {
        Self {
            interval: None,
            timeout: None,
            flush_on_exit: false,
        }
    }

    /// Sleep `interval` between polls and stop after `timeout`.
    pub fn bounded(interval: Duration, timeout: Duration) -> Self {
        Self {
            interval: Some(interval),
            timeout: Some(timeout),
            flush_on_exit: false,
        }
    }

    pub fn flush_on_exit(mut self, flush: bool) -> Self {
        self.flush_on_exit = flush;
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) async fn pause(&self) {
        match self.interval {
            Some(interval) => tokio::time::sleep(interval).await,
            None => tokio::task::yield_now().await,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::bounded(Duration::from_millis(5), Duration::from_secs(300))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_has_no_limits() {
        let policy = PollPolicy::busy();
        assert!(policy.interval.is_none());
        assert!(policy.timeout.is_none());
        assert!(!policy.flush_on_exit);
    }

    #[test]
    fn deserializes_humantime_values() {
        let policy: PollPolicy =
            serde_yaml::from_str("interval: 10ms\ntimeout: 2m\nflush_on_exit: true\n").unwrap();
        assert_eq!(policy.interval, Some(Duration::from_millis(10)));
        assert_eq!(policy.timeout, Some(Duration::from_secs(120)));
        assert!(policy.flush_on_exit);
    }

    #[test]
    fn missing_fields_keep_bounded_defaults() {
        let policy: PollPolicy = serde_yaml::from_str("{}").unwrap();
        assert_eq!(policy, PollPolicy::default());
    }

    #[test]
    fn partial_section_keeps_timeout() {
        let policy: PollPolicy = serde_yaml::from_str("flush_on_exit: true\n").unwrap();
        assert!(policy.flush_on_exit);
        assert_eq!(policy.interval, Some(Duration::from_millis(5)));
        assert_eq!(policy.timeout, Some(Duration::from_secs(300)));
    }

    #[test]
    fn explicit_nulls_select_busy_polling() {
        let policy: PollPolicy = serde_yaml::from_str("interval: null\ntimeout: null\n").unwrap();
        assert_eq!(policy, PollPolicy::busy());
    }
}
