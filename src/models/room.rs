use serde::{Deserialize, Serialize};

use crate::services::placement::NormalizedPoint;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub building_id: i64,
    #[serde(default)]
    pub building_name: String,
    #[serde(default)]
    pub floor: Option<String>,
    #[serde(default)]
    pub room_type: Option<String>,
    #[serde(default)]
    pub floorplan_id: Option<i64>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateRoomData {
    pub name: String,
    pub building_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateRoomData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_type: Option<String>,
}

/// Body of the room update that pins a room onto a floor plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoomPlacement {
    pub floorplan_id: i64,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoomList {
    #[serde(default)]
    pub rooms: Vec<Room>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RoomEnvelope {
    pub room: Room,
}

impl Room {
    /// Marker position on `floorplan_id`, if the room has been placed there.
    pub fn placement_on(&self, floorplan_id: i64) -> Option<NormalizedPoint> {
        match (self.floorplan_id, self.x, self.y) {
            (Some(fp), Some(x), Some(y)) if fp == floorplan_id => {
                Some(NormalizedPoint::clamped(x, y))
            }
            _ => None,
        }
    }

    pub fn floor_display(&self) -> String {
        self.floor.clone().unwrap_or_else(|| "—".to_string())
    }

    pub fn room_type_display(&self) -> String {
        self.room_type.clone().unwrap_or_else(|| "—".to_string())
    }
}
