use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time,
};
use tokio_util::sync::CancellationToken;

use crate::error::JourneyResult;

use super::{PlayerState, StepOutcome};

const ENABLE_LOGS: bool = true;
use crate::{log_debug, log_info};

struct PlayerInner {
    state: PlayerState,
    /// Token of the step chain scheduled by the current run. Cancelled and
    /// cleared on every transition away from `Running`.
    step_token: Option<CancellationToken>,
    ticker: Option<JoinHandle<()>>,
    /// Read when a run starts; a run in progress keeps its own copy.
    interval: Duration,
}

impl PlayerInner {
    fn cancel_steps(&mut self) {
        if let Some(token) = self.step_token.take() {
            token.cancel();
        }
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

/// Replays the journey one record per interval.
///
/// Steps and cancellation both run under the same lock, and a step re-checks
/// its token after acquiring it, so a step scheduled before `stop`/`reset`
/// can never land afterwards. Dropping the player cancels any pending step.
pub struct TimelinePlayer {
    inner: Arc<Mutex<PlayerInner>>,
    shutdown: CancellationToken,
    updates: Arc<watch::Sender<PlayerState>>,
}

impl TimelinePlayer {
    pub fn new(interval: Duration) -> Self {
        let (updates, _) = watch::channel(PlayerState::new());
        Self {
            inner: Arc::new(Mutex::new(PlayerInner {
                state: PlayerState::new(),
                step_token: None,
                ticker: None,
                interval,
            })),
            shutdown: CancellationToken::new(),
            updates: Arc::new(updates),
        }
    }

    pub async fn interval(&self) -> Duration {
        self.inner.lock().await.interval
    }

    /// Changes the step delay. Playback in progress is reset, since its
    /// steps were scheduled with the old delay; subscribers stay attached.
    pub async fn set_interval(&self, interval: Duration) -> PlayerState {
        let mut guard = self.inner.lock().await;
        guard.cancel_steps();
        guard.state.reset();
        guard.interval = interval;
        log_debug!("Timeline playback interval set to {interval:?}");
        self.updates.send_replace(guard.state);
        guard.state
    }

    pub async fn snapshot(&self) -> PlayerState {
        self.inner.lock().await.state
    }

    /// Receives every state change.
    pub fn subscribe(&self) -> watch::Receiver<PlayerState> {
        self.updates.subscribe()
    }

    pub async fn has_pending_step(&self) -> bool {
        self.inner.lock().await.step_token.is_some()
    }

    /// Starts playback over `total` records. With no records nothing is
    /// scheduled and the current state comes back unchanged.
    pub async fn start(&self, total: usize) -> JourneyResult<PlayerState> {
        let mut guard = self.inner.lock().await;
        if !guard.state.start(total)? {
            log_debug!("Timeline playback not started: journey is empty");
            return Ok(guard.state);
        }

        guard.cancel_steps();
        let token = self.shutdown.child_token();
        guard.step_token = Some(token.clone());
        guard.ticker = Some(tokio::spawn(run_steps(
            self.inner.clone(),
            token,
            guard.interval,
            self.updates.clone(),
        )));

        log_info!("Timeline playback started over {total} records");
        self.updates.send_replace(guard.state);
        Ok(guard.state)
    }

    /// Halts playback, keeping the current index.
    pub async fn stop(&self) -> JourneyResult<PlayerState> {
        let mut guard = self.inner.lock().await;
        guard.state.stop()?;
        guard.cancel_steps();

        log_info!(
            "Timeline playback stopped at index {}",
            guard.state.current_index
        );
        self.updates.send_replace(guard.state);
        Ok(guard.state)
    }

    /// Cancels any pending step and rewinds to `Idle` at index 0.
    pub async fn reset(&self) -> PlayerState {
        let mut guard = self.inner.lock().await;
        guard.cancel_steps();
        guard.state.reset();
        self.updates.send_replace(guard.state);
        guard.state
    }
}

impl Drop for TimelinePlayer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn run_steps(
    inner: Arc<Mutex<PlayerInner>>,
    token: CancellationToken,
    interval: Duration,
    updates: Arc<watch::Sender<PlayerState>>,
) {
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = time::sleep(interval) => {}
        }

        let mut guard = inner.lock().await;
        if token.is_cancelled() {
            break;
        }

        let outcome = guard.state.advance();
        updates.send_replace(guard.state);
        match outcome {
            StepOutcome::Advanced => {
                log_debug!("Timeline playback at index {}", guard.state.current_index);
            }
            StepOutcome::Completed | StepOutcome::Ignored => {
                guard.step_token = None;
                // Detach rather than abort: this task is the ticker.
                guard.ticker = None;
                log_info!("Timeline playback finished");
                break;
            }
        }
    }
}
