pub mod controller;
pub mod state;

pub use controller::TimelinePlayer;
pub use state::{PlayerState, PlayerStatus, StepOutcome};
