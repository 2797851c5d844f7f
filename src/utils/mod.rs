//! Utility modules

pub mod bot_state;
pub mod path;
