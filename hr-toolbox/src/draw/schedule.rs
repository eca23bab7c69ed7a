// Spin pacing: a decelerating tick chain run as a cancellable task.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::DrawConfig;
use crate::protocol::TaskEvent;

/// Timing of one spin cycle.
///
/// The first tick fires immediately; the delay before tick `k + 1` is
/// `base_delay + k * delay_increment`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinSchedule {
    pub ticks: u32,
    pub base_delay: Duration,
    pub delay_increment: Duration,
}

impl Default for SpinSchedule {
    fn default() -> Self {
        SpinSchedule {
            ticks: 40,
            base_delay: Duration::from_millis(50),
            delay_increment: Duration::from_millis(5),
        }
    }
}

impl SpinSchedule {
    pub fn from_config(config: &DrawConfig) -> Self {
        SpinSchedule {
            ticks: config.ticks,
            base_delay: Duration::from_millis(config.base_delay_ms),
            delay_increment: Duration::from_millis(config.delay_increment_ms),
        }
    }

    /// Delay between tick number `tick` (1-based) and the next one.
    pub fn delay_after(&self, tick: u32) -> Duration {
        self.base_delay + self.delay_increment * tick
    }

    /// Wall time from the first tick to the last.
    pub fn total_duration(&self) -> Duration {
        (1..self.ticks).map(|k| self.delay_after(k)).sum()
    }
}

/// Drive one spin cycle: send `SpinTick` per step, then `SpinFinished`.
///
/// Only sleeps and sends; the app owns all state. Every event carries
/// `generation` so the app can drop events from an aborted cycle. Stops
/// early if the receiver is gone.
pub async fn run_spin(schedule: SpinSchedule, generation: u64, tx: mpsc::Sender<TaskEvent>) {
    for tick in 1..=schedule.ticks {
        if tx.send(TaskEvent::SpinTick { generation }).await.is_err() {
            return;
        }
        if tick < schedule.ticks {
            tokio::time::sleep(schedule.delay_after(tick)).await;
        }
    }
    let _ = tx.send(TaskEvent::SpinFinished { generation }).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn default_matches_forty_decelerating_ticks() {
        let s = SpinSchedule::default();
        assert_eq!(s.ticks, 40);
        assert_eq!(s.delay_after(1), Duration::from_millis(55));
        assert_eq!(s.delay_after(39), Duration::from_millis(245));
    }

    #[test]
    fn delays_never_decrease() {
        let s = SpinSchedule::default();
        let delays: Vec<Duration> = (1..s.ticks).map(|k| s.delay_after(k)).collect();
        assert!(delays.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn zero_increment_is_constant() {
        let s = SpinSchedule {
            ticks: 5,
            base_delay: Duration::from_millis(10),
            delay_increment: Duration::ZERO,
        };
        assert_eq!(s.delay_after(1), s.delay_after(4));
        assert_eq!(s.total_duration(), Duration::from_millis(40));
    }

    #[test]
    fn total_duration_sums_gaps() {
        // sum over k = 1..=39 of (50 + 5k) ms
        assert_eq!(
            SpinSchedule::default().total_duration(),
            Duration::from_millis(5850)
        );
    }

    #[tokio::test]
    async fn run_spin_emits_ticks_then_finish() {
        tokio::time::pause();
        let (tx, mut rx) = mpsc::channel(64);
        let schedule = SpinSchedule {
            ticks: 4,
            base_delay: Duration::from_millis(10),
            delay_increment: Duration::from_millis(5),
        };
        let handle = tokio::spawn(run_spin(schedule, 3, tx));

        let start = Instant::now();
        let mut stamps = Vec::new();
        for _ in 0..4 {
            let event = rx.recv().await.unwrap();
            assert_eq!(event, TaskEvent::SpinTick { generation: 3 });
            stamps.push(start.elapsed());
        }
        assert_eq!(rx.recv().await.unwrap(), TaskEvent::SpinFinished { generation: 3 });
        handle.await.unwrap();

        let gaps: Vec<Duration> = stamps.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(gaps.windows(2).all(|w| w[0] <= w[1]), "gaps {:?}", gaps);
        assert!(start.elapsed() >= schedule.total_duration());
    }

    #[tokio::test]
    async fn run_spin_stops_when_receiver_dropped() {
        tokio::time::pause();
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        // Returns instead of looping through every tick.
        run_spin(SpinSchedule::default(), 0, tx).await;
    }
}
