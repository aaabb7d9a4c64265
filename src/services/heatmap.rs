//! Per-room signal classification for the building heatmap.

use crate::models::{Room, WifiScan};
use crate::services::signal::SignalStrength;

const GRID_COLUMNS: usize = 4;
const CELL_WIDTH: u32 = 150;
const CELL_HEIGHT: u32 = 100;

/// Overall colour of a room on the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomSignal {
    NoData,
    Weak,
    Medium,
    Strong,
}

impl RoomSignal {
    /// Id of the SVG radial gradient used to paint the room.
    pub fn gradient_id(&self) -> &'static str {
        match self {
            RoomSignal::Strong => "strongSignal",
            RoomSignal::Medium => "mediumSignal",
            RoomSignal::Weak => "weakSignal",
            RoomSignal::NoData => "noSignal",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            RoomSignal::Strong => SignalStrength::Strong.color(),
            RoomSignal::Medium => SignalStrength::Medium.color(),
            RoomSignal::Weak => SignalStrength::Weak.color(),
            RoomSignal::NoData => SignalStrength::Unknown.color(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RoomSignal::Strong => "Strong",
            RoomSignal::Medium => "Medium",
            RoomSignal::Weak => "Weak",
            RoomSignal::NoData => "No data",
        }
    }
}

/// Classifies a room from the scans attributed to it.
///
/// Rows without an RSSI are ignored. A room with a single usable non-weak
/// reading is still painted weak.
pub fn classify_room<'a, I>(rows: I) -> RoomSignal
where
    I: IntoIterator<Item = &'a WifiScan>,
{
    let (mut strong, mut medium, mut weak) = (0usize, 0usize, 0usize);
    for row in rows {
        match SignalStrength::from_rssi(row.rssi) {
            SignalStrength::Strong => strong += 1,
            SignalStrength::Medium => medium += 1,
            SignalStrength::Weak => weak += 1,
            SignalStrength::Unknown => {}
        }
    }

    let total = strong + medium + weak;
    if total == 0 {
        return RoomSignal::NoData;
    }

    if weak == total || strong + medium == 1 {
        RoomSignal::Weak
    } else if strong > medium {
        RoomSignal::Strong
    } else if medium > strong {
        RoomSignal::Medium
    } else {
        RoomSignal::Weak
    }
}

/// A room cell on the schematic 800x600 building map.
#[derive(Debug, Clone)]
pub struct RoomCell {
    pub room_id: i64,
    pub name: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub scan_count: usize,
    pub signal: RoomSignal,
}

impl RoomCell {
    pub fn center_x(&self) -> u32 {
        self.x + self.width / 2
    }

    pub fn center_y(&self) -> u32 {
        self.y + self.height / 2
    }

    pub fn label_y(&self) -> u32 {
        self.y + 25
    }

    pub fn caption_y(&self) -> u32 {
        self.y + 85
    }

    pub fn caption(&self) -> String {
        match self.scan_count {
            0 => "No scans".to_string(),
            1 => "1 scan".to_string(),
            n => format!("{} scans", n),
        }
    }
}

/// Top-left corner of grid slot `index`, four rooms per row.
pub fn grid_origin(index: usize) -> (u32, u32) {
    let col = (index % GRID_COLUMNS) as u32;
    let row = (index / GRID_COLUMNS) as u32;
    (col * 180 + 50, row * 140 + 50)
}

/// Lays rooms out on the schematic grid and classifies each one from `rows`.
pub fn build_cells(rooms: &[Room], rows: &[WifiScan]) -> Vec<RoomCell> {
    rooms
        .iter()
        .enumerate()
        .map(|(index, room)| {
            let room_rows: Vec<&WifiScan> =
                rows.iter().filter(|r| r.room_id == Some(room.id)).collect();
            let (x, y) = grid_origin(index);

            RoomCell {
                room_id: room.id,
                name: room.name.clone(),
                x,
                y,
                width: CELL_WIDTH,
                height: CELL_HEIGHT,
                scan_count: room_rows.len(),
                signal: classify_room(room_rows.iter().copied()),
            }
        })
        .collect()
}

/// Height of the SVG canvas needed to fit `room_count` cells.
pub fn canvas_height(room_count: usize) -> u32 {
    let rows = room_count.div_ceil(GRID_COLUMNS).max(1) as u32;
    (rows * 140 + 60).max(600)
}
