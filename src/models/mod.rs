// Models module - Backend record representations

pub mod building;
pub mod floor_plan;
pub mod room;
pub mod scan_session;
pub mod timestamp;
pub mod wifi_scan;

pub use building::Building;
pub use floor_plan::{BuildingFloorPlans, FloorPlan};
pub use room::Room;
pub use scan_session::ScanSession;
pub use wifi_scan::{RoomScanData, WifiScan};
