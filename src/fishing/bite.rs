//! Bite detection from lure velocity

use crate::host::Velocity;

/// Raw velocity units per block per tick
pub const VELOCITY_SCALE: f64 = 8000.0;

/// Convert a raw velocity component to blocks per tick
pub fn normalize(raw: i16) -> f64 {
    raw as f64 / VELOCITY_SCALE
}

/// A bite pulls the lure straight down: no horizontal motion and a vertical
/// speed at or below the threshold.
pub fn is_bite(velocity: Velocity, motion_threshold: f64) -> bool {
    if velocity.x != 0 || velocity.z != 0 {
        return false;
    }
    normalize(velocity.y) <= motion_threshold
}
