//! Shared fisher state for observers outside the fishing task

use std::sync::atomic::{AtomicBool, Ordering};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Fisher activity for status display
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
pub enum FisherActivity {
    #[default]
    Idle,
    OrientingView,
    EquippingRod,
    Casting,
    WaitingForLure,
    WaitingForBite,
    Reeling,
    Recasting,
    Incapacitated,
    Stopped,
}

impl FisherActivity {
    /// Get human-readable description of the activity
    pub fn description(&self) -> &'static str {
        match self {
            FisherActivity::Idle => "Idle",
            FisherActivity::OrientingView => "Looking at water...",
            FisherActivity::EquippingRod => "Equipping fishing rod...",
            FisherActivity::Casting => "Casting fishing line...",
            FisherActivity::WaitingForLure => "Waiting for the lure to land...",
            FisherActivity::WaitingForBite => "Waiting for fish to bite...",
            FisherActivity::Reeling => "Fish on the line! Reeling in...",
            FisherActivity::Recasting => "Recasting...",
            FisherActivity::Incapacitated => "Dead or eating, fishing paused",
            FisherActivity::Stopped => "Fisher stopped",
        }
    }
}

/// Counters for one fishing run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FishingStats {
    pub casts: u32,
    pub bites: u32,
    /// Reels forced by the max wait deadline
    pub timeouts: u32,
    /// Casts whose lure never showed up
    pub lure_failures: u32,
}

impl FishingStats {
    /// Percentage of casts that ended in a bite
    pub fn bite_rate(&self) -> f64 {
        if self.casts > 0 {
            (self.bites as f64 / self.casts as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Fisher state readable from any thread
#[derive(Debug, Default)]
pub struct SharedFisherState {
    running: AtomicBool,
    activity: RwLock<FisherActivity>,
    stats: RwLock<FishingStats>,
}

impl SharedFisherState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the fisher is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
        if !running {
            self.set_activity(FisherActivity::Stopped);
        }
    }

    pub fn get_activity(&self) -> FisherActivity {
        *self.activity.read()
    }

    pub fn set_activity(&self, activity: FisherActivity) {
        *self.activity.write() = activity;
    }

    pub fn get_stats(&self) -> FishingStats {
        *self.stats.read()
    }

    pub fn set_stats(&self, stats: FishingStats) {
        *self.stats.write() = stats;
    }

    /// Get status as JSON string
    pub fn to_json(&self) -> String {
        let stats = self.get_stats();

        serde_json::json!({
            "running": self.is_running(),
            "activity": self.get_activity().description(),
            "stats": {
                "casts": stats.casts,
                "bites": stats.bites,
                "timeouts": stats.timeouts,
                "lure_failures": stats.lure_failures,
                "rate": format!("{:.2}", stats.bite_rate())
            }
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bite_rate() {
        let stats = FishingStats { casts: 4, bites: 1, ..Default::default() };
        assert_eq!(stats.bite_rate(), 25.0);
        assert_eq!(FishingStats::default().bite_rate(), 0.0);
    }

    #[test]
    fn test_stop_sets_activity() {
        let state = SharedFisherState::new();
        state.set_running(true);
        state.set_activity(FisherActivity::WaitingForBite);
        state.set_running(false);
        assert_eq!(state.get_activity(), FisherActivity::Stopped);
    }

    #[test]
    fn test_to_json() {
        let state = SharedFisherState::new();
        state.set_stats(FishingStats { casts: 2, bites: 1, ..Default::default() });
        let json: serde_json::Value = serde_json::from_str(&state.to_json()).unwrap();
        assert_eq!(json["running"], false);
        assert_eq!(json["stats"]["casts"], 2);
        assert_eq!(json["stats"]["rate"], "50.00");
    }
}
