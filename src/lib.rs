//! Auto Fish - tick-driven fishing agent for block-world game bots
//!
//! The agent casts a rod, watches its lure's velocity for the straight-down
//! pull of a bite, and reels in. It runs on top of a host platform that owns
//! the network connection and world state; see [`host`] for that boundary.

pub mod error;
pub mod fishing;
pub mod host;
pub mod log_main;
pub mod settings;
pub mod utils;

// Re-exports for convenience
pub use error::FisherError;
pub use fishing::{EventSink, Fisher, FisherEvent, FishingStateMachine};
pub use host::{Host, SimulatedPond};
pub use settings::{get_settings, ReactionSpeed, Sensitivity, Settings};
pub use utils::bot_state::{FisherActivity, FishingStats, SharedFisherState};
