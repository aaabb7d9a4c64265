use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::timestamp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanSession {
    pub id: i64,
    pub node: String,
    pub room_id: i64,
    #[serde(default)]
    pub room_name: String,
    pub building_id: i64,
    #[serde(default)]
    pub building_name: String,
    pub started_at: String,
    #[serde(default)]
    pub ended_at: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionList {
    #[serde(default)]
    pub sessions: Vec<ScanSession>,
}

impl ScanSession {
    pub fn started_at_display(&self) -> String {
        timestamp::display(&self.started_at)
    }

    pub fn ended_at_display(&self) -> String {
        timestamp::display_opt(self.ended_at.as_deref())
    }

    /// Ids of rooms with a session currently running.
    pub fn active_room_ids(sessions: &[ScanSession]) -> HashSet<i64> {
        sessions
            .iter()
            .filter(|s| s.is_active)
            .map(|s| s.room_id)
            .collect()
    }

    /// Number of distinct rooms that ever had a session.
    pub fn rooms_scanned(sessions: &[ScanSession]) -> usize {
        sessions
            .iter()
            .map(|s| s.room_id)
            .collect::<HashSet<_>>()
            .len()
    }
}
