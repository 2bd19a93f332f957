//! Countdown ticks for the active phase.
//!
//! One background task per started countdown sends a [`Tick`] every second.
//! Stopping aborts the task and drops ticks already queued, so nothing is
//! delivered after [`Countdown::stop`] returns.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::debug;

use lab_core::Instruction;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// One elapsed second of the countdown started for `generation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub generation: u64,
}

#[derive(Debug)]
pub struct Countdown {
    sender: mpsc::UnboundedSender<Tick>,
    receiver: mpsc::UnboundedReceiver<Tick>,
    running: Option<JoinHandle<()>>,
}

impl Countdown {
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver,
            running: None,
        }
    }

    /// Start sending `seconds` ticks, replacing any countdown in progress.
    pub fn start(&mut self, generation: u64, seconds: u32) {
        self.stop();
        let sender = self.sender.clone();
        debug!(generation, seconds, "countdown started");
        self.running = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            for _ in 0..seconds {
                interval.tick().await;
                if sender.send(Tick { generation }).is_err() {
                    break;
                }
            }
        }));
    }

    /// Cancel the countdown. Returns `false` if none was running.
    pub fn stop(&mut self) -> bool {
        let Some(task) = self.running.take() else {
            return false;
        };
        task.abort();
        while self.receiver.try_recv().is_ok() {}
        debug!("countdown stopped");
        true
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Wait for the next tick. Pending forever while no countdown runs.
    pub async fn next_tick(&mut self) -> Option<Tick> {
        self.receiver.recv().await
    }

    /// Carry out timer instructions; returns `true` if `instruction` was one.
    pub fn apply(&mut self, instruction: &Instruction) -> bool {
        match instruction {
            Instruction::StartTimer {
                generation,
                seconds,
            } => {
                self.start(*generation, *seconds);
                true
            }
            Instruction::StopTimer => {
                self.stop();
                true
            }
            _ => false,
        }
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        if let Some(task) = self.running.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, sleep, timeout};

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second_until_exhausted() {
        let mut countdown = Countdown::new();
        countdown.start(4, 3);

        for _ in 0..3 {
            let tick = countdown.next_tick().await.unwrap();
            assert_eq!(tick, Tick { generation: 4 });
        }
        let extra = timeout(Duration::from_secs(5), countdown.next_tick()).await;
        assert!(extra.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn no_tick_after_stop() {
        let mut countdown = Countdown::new();
        countdown.start(1, 60);
        assert_eq!(countdown.next_tick().await, Some(Tick { generation: 1 }));

        // Let a couple more ticks queue up, then cancel.
        advance(Duration::from_secs(2)).await;
        sleep(Duration::from_millis(1)).await;
        assert!(countdown.stop());
        assert!(!countdown.stop());

        let after = timeout(Duration::from_secs(10), countdown.next_tick()).await;
        assert!(after.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_previous_countdown() {
        let mut countdown = Countdown::new();
        assert!(countdown.apply(&Instruction::StartTimer {
            generation: 1,
            seconds: 30,
        }));
        assert!(countdown.apply(&Instruction::StartTimer {
            generation: 2,
            seconds: 30,
        }));
        assert_eq!(countdown.next_tick().await, Some(Tick { generation: 2 }));
        assert!(countdown.apply(&Instruction::StopTimer));
        assert!(!countdown.apply(&Instruction::HideHint));
        assert!(!countdown.is_running());
    }
}
