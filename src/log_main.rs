//! Session log persistence

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::FisherError;
use crate::utils::bot_state::FishingStats;
use crate::utils::path::get_data_dir;

/// Session entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub start: String,
    pub stop: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<FishingStats>,
}

/// Get sessions file path
pub fn get_sessions_path() -> PathBuf {
    get_data_dir().join("logs").join("sessions.json")
}

/// Load sessions from file; a missing or unreadable file yields no sessions
pub fn load_sessions(path: &Path) -> Vec<Session> {
    if !path.exists() {
        return Vec::new();
    }

    match fs::read_to_string(path).map(|content| serde_json::from_str(&content)) {
        Ok(Ok(sessions)) => sessions,
        Ok(Err(e)) => {
            tracing::warn!("[SESSION] Ignoring corrupt session log {:?}: {}", path, e);
            Vec::new()
        }
        Err(e) => {
            tracing::warn!("[SESSION] Failed to read session log {:?}: {}", path, e);
            Vec::new()
        }
    }
}

/// Save sessions to file
pub fn save_sessions(path: &Path, sessions: &[Session]) -> Result<(), FisherError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(sessions)?)?;
    Ok(())
}

/// Open a new session. A session left open by an earlier run is closed first.
pub fn start_session(path: &Path) -> Result<(), FisherError> {
    let mut sessions = load_sessions(path);
    let now = Utc::now().to_rfc3339();

    if let Some(last) = sessions.last_mut().filter(|s| s.stop.is_none()) {
        tracing::warn!("[SESSION] Closing session left open since {}", last.start);
        last.stop = Some(now.clone());
    }

    sessions.push(Session {
        start: now,
        stop: None,
        stats: None,
    });
    save_sessions(path, &sessions)
}

/// Close the open session with its final stats. Returns false if none was open.
pub fn end_session(path: &Path, stats: FishingStats) -> Result<bool, FisherError> {
    let mut sessions = load_sessions(path);

    let Some(last) = sessions.last_mut().filter(|s| s.stop.is_none()) else {
        return Ok(false);
    };
    last.stop = Some(Utc::now().to_rfc3339());
    last.stats = Some(stats);

    save_sessions(path, &sessions)?;
    Ok(true)
}
