//! Quiz clock
//!
//! Runs a background tokio task that emits one `ClockEvent::Tick` per
//! period while running. The owner of the attempt applies `tick()` for each
//! event; the clock itself holds no quiz state.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    Tick,
}

/// Control messages for the clock task
#[derive(Debug)]
enum ClockMessage {
    Pause,
    Resume,
    Shutdown,
}

pub struct QuizClock {
    sender: mpsc::Sender<ClockMessage>,
    handle: JoinHandle<()>,
}

impl QuizClock {
    /// Start a one-second clock. Must be called inside a tokio runtime.
    pub fn start() -> (Self, mpsc::Receiver<ClockEvent>) {
        Self::with_period(Duration::from_secs(1))
    }

    pub fn with_period(period: Duration) -> (Self, mpsc::Receiver<ClockEvent>) {
        let (tx, rx) = mpsc::channel(8);
        let (events_tx, events_rx) = mpsc::channel(64);

        let handle = tokio::spawn(async move {
            clock_loop(period, rx, events_tx).await;
        });

        (Self { sender: tx, handle }, events_rx)
    }

    pub fn pause(&self) {
        let _ = self.sender.try_send(ClockMessage::Pause);
    }

    pub fn resume(&self) {
        let _ = self.sender.try_send(ClockMessage::Resume);
    }

    pub fn shutdown(&self) {
        let _ = self.sender.try_send(ClockMessage::Shutdown);
    }
}

impl Drop for QuizClock {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn clock_loop(
    period: Duration,
    mut receiver: mpsc::Receiver<ClockMessage>,
    events: mpsc::Sender<ClockEvent>,
) {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut running = true;

    loop {
        tokio::select! {
            _ = ticker.tick(), if running => {
                if events.send(ClockEvent::Tick).await.is_err() {
                    log::debug!("Clock: receiver dropped, stopping");
                    break;
                }
            }

            msg = receiver.recv() => {
                match msg {
                    Some(ClockMessage::Pause) => {
                        log::debug!("Clock: paused");
                        running = false;
                    }
                    Some(ClockMessage::Resume) => {
                        if !running {
                            log::debug!("Clock: resumed");
                            // A full period must pass before the next tick
                            ticker.reset();
                            running = true;
                        }
                    }
                    Some(ClockMessage::Shutdown) | None => {
                        log::debug!("Clock: shutting down");
                        break;
                    }
                }
            }
        }
    }
}
