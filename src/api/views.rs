//! Display rows shared by the admin and user pages.

use crate::models::{Room, WifiScan};
use crate::services::placement::NormalizedPoint;
use crate::services::signal::SignalStrength;

/// A scan row ready for a table, with its signal classification resolved.
#[derive(Debug, Clone)]
pub struct ScanRow {
    pub id: i64,
    pub ssid: String,
    pub bssid: String,
    pub rssi: String,
    pub label: &'static str,
    pub badge_class: &'static str,
    pub color: &'static str,
    pub channel: String,
    pub time: String,
    pub node: String,
    pub room: String,
}

impl ScanRow {
    pub fn new(scan: &WifiScan, hidden_ssid: &str) -> Self {
        let signal = SignalStrength::from_rssi(scan.rssi);
        Self {
            id: scan.id,
            ssid: scan.ssid_or(hidden_ssid),
            bssid: scan.bssid_display(),
            rssi: scan.rssi_display(),
            label: signal.label(),
            badge_class: signal.badge_class(),
            color: signal.color(),
            channel: scan.channel_display(),
            time: scan.received_at_display(),
            node: scan.node_display(),
            room: scan
                .room_name
                .clone()
                .unwrap_or_else(|| "Unassigned".to_string()),
        }
    }

    pub fn from_scans(scans: &[WifiScan], hidden_ssid: &str) -> Vec<Self> {
        scans.iter().map(|s| Self::new(s, hidden_ssid)).collect()
    }
}

/// A room pinned on the currently displayed floor plan.
#[derive(Debug, Clone)]
pub struct Marker {
    pub room_id: i64,
    pub name: String,
    pub left: String,
    pub top: String,
    pub color: &'static str,
}

impl Marker {
    pub fn new(room: &Room, point: NormalizedPoint, color: &'static str) -> Self {
        Self {
            room_id: room.id,
            name: room.name.clone(),
            left: point.left_percent(),
            top: point.top_percent(),
            color,
        }
    }
}

/// A floor plan option in a selector.
#[derive(Debug, Clone)]
pub struct FloorOption {
    pub id: i64,
    pub name: String,
    pub selected: bool,
}

/// Markers for every room placed on `floorplan_id`.
pub fn markers_for<F>(rooms: &[Room], floorplan_id: i64, color_of: F) -> Vec<Marker>
where
    F: Fn(&Room) -> &'static str,
{
    rooms
        .iter()
        .filter_map(|room| {
            room.placement_on(floorplan_id)
                .map(|point| Marker::new(room, point, color_of(room)))
        })
        .collect()
}

/// Trims a form field, turning blank input into `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
