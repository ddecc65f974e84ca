//! Politeness pacing between outbound requests
//!
//! The fixed inter-seed delay is the sole back-pressure mechanism toward
//! the anonymizing network. It is modeled as a minimum inter-call
//! interval rather than a bare sleep so it can be swapped for a
//! token-bucket later and tested against tokio's virtual clock.

use std::time::Duration;
use tokio::time::Instant;

/// Enforces a minimum interval between successive calls
#[derive(Debug)]
pub struct Pacer {
    min_interval: Duration,
    last_call: Option<Instant>,
}

impl Pacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: None,
        }
    }

    /// Waits until at least `min_interval` has passed since the previous
    /// call, then records the new call time
    ///
    /// The first call never waits.
    pub async fn pace(&mut self) {
        if let Some(last) = self.last_call {
            let next_allowed = last + self.min_interval;
            let now = Instant::now();
            if next_allowed > now {
                tokio::time::sleep_until(next_allowed).await;
            }
        }
        self.last_call = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_does_not_wait() {
        let mut pacer = Pacer::new(Duration::from_secs(2));
        let before = Instant::now();
        pacer.pace().await;
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enforces_minimum_interval() {
        let mut pacer = Pacer::new(Duration::from_secs(2));
        pacer.pace().await;

        let before = Instant::now();
        pacer.pace().await;
        assert!(Instant::now() - before >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_when_interval_already_elapsed() {
        let mut pacer = Pacer::new(Duration::from_secs(2));
        pacer.pace().await;

        tokio::time::advance(Duration::from_secs(5)).await;

        let before = Instant::now();
        pacer.pace().await;
        assert_eq!(Instant::now(), before);
    }
}
