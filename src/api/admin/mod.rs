// Admin views - building, room, floor plan and scan session management

pub mod buildings;
pub mod dashboard;
pub mod floorplans;
pub mod rooms;
pub mod scans;
pub mod sessions;

use axum::Router;

use crate::api::middleware::session::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(dashboard::router())
        .merge(buildings::router())
        .merge(rooms::router())
        .merge(floorplans::router())
        .merge(sessions::router())
        .merge(scans::router())
}
