//! Playback clock state machine.
//!
//! Stopped -> play() -> Running -> pause() -> Stopped. The running state
//! owns a cancellation token handed to the tick task; `pause` cancels it
//! synchronously and is idempotent. The tick task re-checks the token
//! before every mutation, so no tick can advance the time axis after
//! `pause` returns.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use viewer_common::AxisRange;

/// Next time index for one playback tick: advance by one, wrapping to the
/// lower bound of the playable range past the axis maximum.
pub fn next_time_index(current: u32, range: &AxisRange) -> u32 {
    if current >= range.max {
        range.min
    } else {
        current + 1
    }
}

/// Cancellable periodic ticker driving the time axis.
#[derive(Debug)]
pub struct PlaybackClock {
    cadence: Duration,
    current: Option<CancellationToken>,
}

impl PlaybackClock {
    pub fn new(cadence: Duration) -> Self {
        Self {
            cadence,
            current: None,
        }
    }

    pub fn cadence(&self) -> Duration {
        self.cadence
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    /// Transition to Running. Returns the cancellation token the tick
    /// task must honor, or `None` if already running.
    pub fn start(&mut self) -> Option<CancellationToken> {
        if self.current.is_some() {
            return None;
        }
        let token = CancellationToken::new();
        self.current = Some(token.clone());
        Some(token)
    }

    /// Transition to Stopped, cancelling the tick task. Idempotent:
    /// stopping a stopped clock is a no-op and reports `false`.
    pub fn stop(&mut self) -> bool {
        match self.current.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}
