use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Countdown gating the "resend code" affordance. Purely advisory, not a
/// security control.
///
/// The current value is published through a `watch` channel so the UI can
/// subscribe without polling. Re-arming aborts the previous tick task, and
/// dropping the timer aborts it too, so a torn-down flow never leaks a
/// ticking task.
pub struct ResendTimer {
    remaining: watch::Sender<u32>,
    tick_task: Mutex<Option<JoinHandle<()>>>,
}

impl ResendTimer {
    pub fn new() -> Self {
        let (remaining, _) = watch::channel(0);
        Self {
            remaining,
            tick_task: Mutex::new(None),
        }
    }

    /// Arm the countdown: set the remaining seconds and decrement once per
    /// second until zero, then stop. Must be called on a tokio runtime.
    pub fn start(&self, secs: u32) {
        self.abort_tick_task();
        self.remaining.send_replace(secs);
        if secs == 0 {
            return;
        }

        let remaining = self.remaining.clone();
        let handle = tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_secs(1));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let next = remaining.borrow().saturating_sub(1);
                remaining.send_replace(next);
                if next == 0 {
                    break;
                }
            }
        });
        *self.tick_task.lock().unwrap() = Some(handle);
    }

    /// Re-arm the countdown (after a successful resend).
    pub fn reset(&self, secs: u32) {
        self.start(secs);
    }

    pub fn remaining(&self) -> u32 {
        *self.remaining.borrow()
    }

    /// Observe countdown changes without polling.
    pub fn subscribe(&self) -> watch::Receiver<u32> {
        self.remaining.subscribe()
    }

    /// Stop ticking without touching the published value.
    pub fn cancel(&self) {
        self.abort_tick_task();
    }

    fn abort_tick_task(&self) {
        if let Some(task) = self.tick_task.lock().unwrap().take() {
            task.abort();
        }
    }
}

impl Default for ResendTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ResendTimer {
    fn drop(&mut self) {
        self.abort_tick_task();
    }
}
