//! Session data owned by the state machine

use std::time::Duration;
use tokio::time::Instant;

use crate::host::EntityId;
use crate::settings::Settings;

/// Lure motion is ignored for this long after a cast
pub const CAST_SETTLE: Duration = Duration::from_secs(6);
/// Reel in and retry if nothing bites within this window
pub const MAX_WAIT: Duration = Duration::from_secs(60);

/// Ticks skipped after every eligible tick
pub const BASE_COOLDOWN_TICKS: u32 = 5;
/// Ticks skipped after throwing the line
pub const CAST_COOLDOWN_TICKS: u32 = 20;

/// The lure currently in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LureHandle {
    pub object_id: EntityId,
    pub owner: EntityId,
}

/// One fishing attempt
#[derive(Debug, Clone, Default)]
pub struct FishingSession {
    /// A line is out and we are waiting for a bite or the deadline
    pub fishing: bool,
    pub cast_time: Option<Instant>,
    pub max_wait_deadline: Option<Instant>,
    pub lure: Option<LureHandle>,
}

impl FishingSession {
    pub fn lure_spawned(&self) -> bool {
        self.lure.is_some()
    }

    /// Drop the fishing flag and the lure handle
    pub fn reset(&mut self) {
        self.fishing = false;
        self.lure = None;
    }

    pub fn begin_cast(&mut self, now: Instant) {
        self.cast_time = Some(now);
        self.max_wait_deadline = Some(now + MAX_WAIT);
        self.fishing = true;
    }

    /// Whether the settle window after the last cast is still running.
    /// Never casting counts as settled.
    pub fn settling(&self, now: Instant) -> bool {
        self.cast_time
            .is_some_and(|cast| now.saturating_duration_since(cast) < CAST_SETTLE)
    }

    /// Whether the forced-reel deadline has passed
    pub fn deadline_passed(&self, now: Instant) -> bool {
        self.max_wait_deadline.is_some_and(|deadline| now > deadline)
    }
}

/// What the next eligible tick should do with the rod
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pending {
    #[default]
    Nothing,
    /// Throw the line
    Cast,
    /// Pull the line in after a bite, then cast again
    Reel,
}

/// Tick scheduling: one-shot intents on top of a cooldown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// Ticks left to skip before the next decision
    pub cooldown: u32,
    pub pending: Pending,
    /// View orientation still owed for this session
    pub look_pending: bool,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            cooldown: 0,
            pending: Pending::Nothing,
            look_pending: true,
        }
    }
}

impl Schedule {
    /// Consume one tick of cooldown. Returns true when this tick may act,
    /// in which case the base cooldown is armed again.
    pub fn tick(&mut self) -> bool {
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return false;
        }
        self.cooldown = BASE_COOLDOWN_TICKS;
        true
    }
}

/// Values derived from [`Settings`] for the lifetime of the fisher
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub motion_threshold: f64,
    pub reaction_delay_ticks: u32,
    pub orient_view: bool,
}

impl From<&Settings> for Thresholds {
    fn from(settings: &Settings) -> Self {
        Self {
            motion_threshold: settings.sensitivity.motion_threshold(),
            reaction_delay_ticks: settings.reaction_speed.cooldown_ticks(),
            orient_view: settings.keep_rotation,
        }
    }
}
