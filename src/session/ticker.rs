use std::time::Duration;

use tokio::time::{self, Instant, Interval, MissedTickBehavior};

const TICK: Duration = Duration::from_secs(1);

/// 1 Hz elapsed-time ticker.
///
/// Armed exactly when a session enters `Recording` and disarmed exactly when
/// it leaves. There is a single interval per session, the first tick lands
/// one full second after arming, and a missed tick is skipped rather than
/// delivered in a burst, so the session total stays within one tick of wall
/// clock.
#[derive(Debug, Default)]
pub struct ElapsedTicker {
    interval: Option<Interval>,
}

impl ElapsedTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh interval, replacing any previous one.
    pub fn arm(&mut self) {
        let mut interval = time::interval_at(Instant::now() + TICK, TICK);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.interval = Some(interval);
    }

    pub fn disarm(&mut self) {
        self.interval = None;
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Complete on the next tick; pend forever while disarmed.
    ///
    /// Cancellation safe, which is what lets this sit in a `select!` arm
    /// next to the event streams.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_tick_lands_after_one_second() {
        let mut ticker = ElapsedTicker::new();
        ticker.arm();

        let before = Instant::now();
        ticker.tick().await;
        assert!(Instant::now() - before >= TICK);
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_restarts_the_interval() {
        let mut ticker = ElapsedTicker::new();
        ticker.arm();
        ticker.tick().await;

        ticker.disarm();
        assert!(!ticker.is_armed());

        ticker.arm();
        let before = Instant::now();
        ticker.tick().await;
        assert!(Instant::now() - before >= TICK);
    }

    #[tokio::test(start_paused = true)]
    async fn disarmed_ticker_pends() {
        let mut ticker = ElapsedTicker::new();
        let pending = tokio::time::timeout(Duration::from_secs(5), ticker.tick()).await;
        assert!(pending.is_err(), "disarmed ticker must never fire");
    }
}
