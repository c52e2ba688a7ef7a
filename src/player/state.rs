use serde::{Deserialize, Serialize};

use crate::error::{JourneyError, JourneyResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PlayerStatus {
    Idle,
    Running,
    Stopped,
}

impl Default for PlayerStatus {
    fn default() -> Self {
        PlayerStatus::Idle
    }
}

impl PlayerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerStatus::Idle => "idle",
            PlayerStatus::Running => "running",
            PlayerStatus::Stopped => "stopped",
        }
    }
}

/// Result of applying one scheduled step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced,
    Completed,
    /// The player was not running; nothing changed.
    Ignored,
}

/// Playback position over the chronological record list.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub status: PlayerStatus,
    /// 0-based index into the oldest-first record list.
    pub current_index: usize,
    pub total: usize,
}

impl PlayerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.status == PlayerStatus::Running
    }

    /// Moves to `Running(0)`. An empty journey is not an error: the state is
    /// left as is and `false` comes back.
    pub fn start(&mut self, total: usize) -> JourneyResult<bool> {
        if self.is_running() {
            return Err(JourneyError::InvalidTransition {
                from: self.status.as_str(),
                action: "start",
            });
        }
        if total == 0 {
            return Ok(false);
        }
        *self = Self {
            status: PlayerStatus::Running,
            current_index: 0,
            total,
        };
        Ok(true)
    }

    pub fn advance(&mut self) -> StepOutcome {
        if !self.is_running() {
            return StepOutcome::Ignored;
        }
        if self.current_index + 1 >= self.total {
            self.status = PlayerStatus::Idle;
            StepOutcome::Completed
        } else {
            self.current_index += 1;
            StepOutcome::Advanced
        }
    }

    /// Keeps the current index.
    pub fn stop(&mut self) -> JourneyResult<()> {
        if !self.is_running() {
            return Err(JourneyError::InvalidTransition {
                from: self.status.as_str(),
                action: "stop",
            });
        }
        self.status = PlayerStatus::Stopped;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.status = PlayerStatus::Idle;
        self.current_index = 0;
    }

    /// "Day 3 of 7" while running.
    pub fn day_label(&self) -> Option<String> {
        self.is_running()
            .then(|| format!("Day {} of {}", self.current_index + 1, self.total))
    }
}
