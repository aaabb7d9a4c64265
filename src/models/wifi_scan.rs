use serde::{Deserialize, Serialize};

use super::timestamp;

/// One Wi-Fi observation reported by a scanning node.
///
/// Room and building names are only filled in by some endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WifiScan {
    pub id: i64,
    pub received_at: String,
    #[serde(default)]
    pub node: Option<String>,
    #[serde(default)]
    pub ssid: Option<String>,
    #[serde(default)]
    pub bssid: Option<String>,
    #[serde(default)]
    pub rssi: Option<i32>,
    #[serde(default)]
    pub channel: Option<i32>,
    #[serde(default)]
    pub enc: Option<String>,
    #[serde(default)]
    pub room_id: Option<i64>,
    #[serde(default)]
    pub room_name: Option<String>,
    #[serde(default)]
    pub building_id: Option<i64>,
    #[serde(default)]
    pub building_name: Option<String>,
}

/// Rows returned by `/rooms/{id}/wifi`.
pub type RoomWifiRow = WifiScan;

/// Rows returned by `/buildings/{id}/wifi`.
pub type BuildingWifiRow = WifiScan;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub floor: Option<String>,
    #[serde(default)]
    pub room_type: Option<String>,
    pub building_id: i64,
    #[serde(default)]
    pub building_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RoomScanData {
    pub room: RoomSummary,
    #[serde(default)]
    pub rows: Vec<RoomWifiRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildingSummary {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildingScanData {
    pub building: BuildingSummary,
    #[serde(default)]
    pub rows: Vec<BuildingWifiRow>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScanList {
    #[serde(default)]
    pub rows: Vec<WifiScan>,
}

impl WifiScan {
    pub fn ssid_or(&self, fallback: &str) -> String {
        match self.ssid.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => fallback.to_string(),
        }
    }

    pub fn bssid_display(&self) -> String {
        self.bssid.clone().unwrap_or_else(|| "—".to_string())
    }

    pub fn rssi_display(&self) -> String {
        self.rssi
            .map(|r| format!("{} dBm", r))
            .unwrap_or_else(|| "—".to_string())
    }

    pub fn channel_display(&self) -> String {
        self.channel
            .map(|c| format!("Ch {}", c))
            .unwrap_or_else(|| "—".to_string())
    }

    pub fn node_display(&self) -> String {
        self.node.clone().unwrap_or_else(|| "—".to_string())
    }

    pub fn received_at_display(&self) -> String {
        timestamp::display(&self.received_at)
    }
}

impl RoomSummary {
    /// "Building • Floor 2 • Lab" style subtitle, skipping missing parts.
    pub fn subtitle(&self) -> String {
        let mut parts = vec![self.building_name.clone()];
        if let Some(floor) = self.floor.as_deref().filter(|f| !f.is_empty()) {
            parts.push(format!("Floor {}", floor));
        }
        if let Some(kind) = self.room_type.as_deref().filter(|t| !t.is_empty()) {
            parts.push(kind.to_string());
        }
        parts.retain(|p| !p.is_empty());
        parts.join(" • ")
    }
}

impl RoomScanData {
    /// Labels rows with this room's name and building where the backend left
    /// them out; room readings arrive without those fields.
    pub fn label_rows(&mut self) {
        for row in &mut self.rows {
            if row.room_id.is_none() {
                row.room_id = Some(self.room.id);
            }
            if row.room_name.is_none() {
                row.room_name = Some(self.room.name.clone());
            }
            if row.building_name.is_none() && !self.room.building_name.is_empty() {
                row.building_name = Some(self.room.building_name.clone());
            }
        }
    }
}
