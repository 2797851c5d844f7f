//! Fishing control loop: session state, bite detection and the task that drives them

pub mod actor;
pub mod bite;
pub mod look;
pub mod machine;
pub mod state;

pub use actor::{EventSink, Fisher, FisherEvent};
pub use machine::FishingStateMachine;
pub use state::{FishingSession, LureHandle, Pending, Schedule, Thresholds};
