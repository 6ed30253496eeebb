use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// A schedule-once timer. After `delay` it delivers `event` on the channel,
/// unless it has been cancelled or dropped first.
///
/// The session holds at most one of these, and only while the game is `Ready`.
#[derive(Debug)]
pub struct GreenTimer {
    handle: JoinHandle<()>,
}

impl GreenTimer {
    pub fn schedule<E: Send + 'static>(
        delay: Duration,
        events: UnboundedSender<E>,
        event: E,
    ) -> Self {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The receiver is gone only when the session has ended.
            let _ = events.send(event);
        });
        Self { handle }
    }

    /// Stops the timer. An event that has already been delivered is not recalled.
    pub fn cancel(self) {
        self.handle.abort();
    }
}

impl Drop for GreenTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// A wait drawn uniformly from `[min_ms, max_ms]`.
pub fn random_delay(min_ms: u64, max_ms: u64) -> Duration {
    let (low, high) = if min_ms <= max_ms { (min_ms, max_ms) } else { (max_ms, min_ms) };
    let span = (high - low) as f64;
    Duration::from_millis(low + (rand::random::<f64>() * span).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_the_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _timer = GreenTimer::schedule(Duration::from_millis(2500), tx, 7u64);

        assert_eq!(rx.recv().await, Some(7));
        // The sender moved into the task is gone once it has fired.
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u64>();
        let timer = GreenTimer::schedule(Duration::from_millis(2500), tx, 1);
        timer.cancel();

        // Aborting drops the task and its sender, so the channel closes without a value.
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_timer_never_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u64>();
        drop(GreenTimer::schedule(Duration::from_secs(1), tx, 1));
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn random_delay_stays_in_range() {
        for _ in 0..1000 {
            let delay = random_delay(2000, 5000);
            assert!(delay >= Duration::from_millis(2000));
            assert!(delay <= Duration::from_millis(5000));
        }
        assert_eq!(random_delay(300, 300), Duration::from_millis(300));
    }
}
