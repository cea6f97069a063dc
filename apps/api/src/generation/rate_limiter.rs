//! Cooldown gate in front of the generation service.
//!
//! `Open --(dispatch)--> Cooldown(30)`, then one tick per second down to
//! `Open`. The ticker is a task owned by the limiter and aborted when the
//! limiter is dropped, so no tick can land after the session is gone.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::info;

pub const COOLDOWN_PERIOD_SECS: u32 = 30;

const TICK: Duration = Duration::from_secs(1);

/// Operator-visible cooldown. `locked == (remaining_seconds > 0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CooldownState {
    pub locked: bool,
    pub remaining_seconds: u32,
}

impl CooldownState {
    fn with_remaining(remaining_seconds: u32) -> Self {
        Self {
            locked: remaining_seconds > 0,
            remaining_seconds,
        }
    }
}

pub struct RateLimiter {
    period_secs: u32,
    state: Arc<watch::Sender<CooldownState>>,
    ticker: Option<JoinHandle<()>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(COOLDOWN_PERIOD_SECS)
    }
}

impl RateLimiter {
    pub fn new(period_secs: u32) -> Self {
        let (state, _) = watch::channel(CooldownState::with_remaining(0));
        Self {
            period_secs,
            state: Arc::new(state),
            ticker: None,
        }
    }

    pub fn state(&self) -> CooldownState {
        *self.state.borrow()
    }

    pub fn is_open(&self) -> bool {
        !self.state().locked
    }

    /// Follows every change of the cooldown state.
    #[cfg(test)]
    pub fn subscribe(&self) -> watch::Receiver<CooldownState> {
        self.state.subscribe()
    }

    /// Records a dispatch. Returns the current state unchanged if the gate
    /// is still cooling down.
    pub fn dispatch(&mut self) -> Result<(), CooldownState> {
        let current = self.state();
        if current.locked {
            return Err(current);
        }
        if self.period_secs == 0 {
            return Ok(());
        }

        self.cancel();
        self.state
            .send_replace(CooldownState::with_remaining(self.period_secs));
        info!(seconds = self.period_secs, "generation cooldown started");

        let state = self.state.clone();
        self.ticker = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + TICK, TICK);
            loop {
                ticker.tick().await;
                let mut finished = false;
                state.send_modify(|s| {
                    *s = CooldownState::with_remaining(s.remaining_seconds.saturating_sub(1));
                    finished = !s.locked;
                });
                if finished {
                    info!("generation cooldown elapsed");
                    break;
                }
            }
        }));
        Ok(())
    }

    fn cancel(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Drop for RateLimiter {
    fn drop(&mut self) {
        self.cancel();
    }
}
