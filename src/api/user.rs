use std::collections::HashMap;

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::api::middleware::session::AppState;
use crate::api::views::{markers_for, FloorOption, Marker, ScanRow};
use crate::error::Result;
use crate::models::Building;
use crate::services::{
    backend_client::DEFAULT_ROOM_SCANS_LIMIT,
    heatmap::{self, RoomCell, RoomSignal},
    signal,
};

const BUILDING_SCANS_LIMIT: u32 = 50;

#[derive(Template)]
#[template(path = "user/dashboard.html")]
struct UserDashboardTemplate {
    building_count: usize,
    active_count: usize,
    session_count: usize,
    buildings: Vec<Building>,
}

struct FloorPlanView {
    floor_name: String,
    image_url: String,
    markers: Vec<Marker>,
}

#[derive(Template)]
#[template(path = "user/building.html")]
struct UserBuildingTemplate {
    refresh_secs: u64,
    building: Building,
    room_count: usize,
    scan_count: usize,
    unique_ssids: usize,
    canvas_height: u32,
    cells: Vec<RoomCell>,
    floors: Vec<FloorOption>,
    floor_plan: Option<FloorPlanView>,
}

struct NetworkCard {
    ssid: String,
    rssi: String,
    delay: String,
}

#[derive(Template)]
#[template(path = "user/room.html")]
struct UserRoomTemplate {
    building_id: i64,
    building_name: String,
    room_name: String,
    total_scans: usize,
    strong_count: usize,
    average_signal: String,
    networks: Vec<NetworkCard>,
    rows: Vec<ScanRow>,
}

#[derive(Template)]
#[template(path = "user/not_found.html")]
struct NotFoundTemplate {
    what: &'static str,
}

fn not_found(what: &'static str) -> Response {
    (StatusCode::NOT_FOUND, NotFoundTemplate { what }).into_response()
}

/// Read-only overview of all buildings
async fn user_dashboard(State(state): State<AppState>) -> Result<UserDashboardTemplate> {
    let (buildings, sessions) = tokio::try_join!(
        state.backend.list_buildings(),
        state.backend.list_sessions(),
    )?;

    Ok(UserDashboardTemplate {
        building_count: buildings.len(),
        active_count: sessions.iter().filter(|s| s.is_active).count(),
        session_count: sessions.len(),
        buildings,
    })
}

#[derive(Deserialize)]
struct BuildingQuery {
    floorplan: Option<i64>,
}

/// Building heatmap, refreshed periodically so room colours follow new scans
async fn user_building(
    State(state): State<AppState>,
    Path(building_id): Path<i64>,
    Query(query): Query<BuildingQuery>,
) -> Result<Response> {
    let buildings = state.backend.list_buildings().await?;
    let Some(building) = Building::find(&buildings, building_id).cloned() else {
        return Ok(not_found("Building"));
    };

    let (rooms, scans) = tokio::try_join!(
        state.backend.list_rooms(Some(building_id)),
        state.backend.building_scans(building_id, BUILDING_SCANS_LIMIT),
    )?;

    // Floor plans are optional decoration; the schematic map works without them
    let plans = match state.backend.building_floor_plans(building_id).await {
        Ok(plans) => Some(plans),
        Err(e) => {
            tracing::warn!(building_id, error = %e, "Could not load floor plans");
            None
        }
    };

    let rows = scans.rows;
    let cells = heatmap::build_cells(&rooms, &rows);
    let signal_by_room: HashMap<i64, RoomSignal> =
        cells.iter().map(|c| (c.room_id, c.signal)).collect();

    let mut floors = Vec::new();
    let mut floor_plan = None;
    if let Some(plans) = &plans {
        let selected = plans.select(query.floorplan);
        floors = plans
            .floorplans
            .iter()
            .map(|fp| FloorOption {
                id: fp.id,
                name: fp.floor_name.clone(),
                selected: selected.map(|s| s.id) == Some(fp.id),
            })
            .collect();
        floor_plan = selected.map(|fp| FloorPlanView {
            floor_name: fp.floor_name.clone(),
            image_url: state.image_url(&fp.image_url),
            markers: markers_for(&rooms, fp.id, |room| {
                signal_by_room
                    .get(&room.id)
                    .copied()
                    .unwrap_or(RoomSignal::NoData)
                    .color()
            }),
        });
    }

    let page = UserBuildingTemplate {
        refresh_secs: state.config.user_refresh_secs,
        room_count: rooms.len(),
        scan_count: rows.len(),
        unique_ssids: signal::unique_ssids(&rows),
        canvas_height: heatmap::canvas_height(rooms.len()),
        cells,
        floors,
        floor_plan,
        building,
    };

    Ok(page.into_response())
}

/// Strong networks and all readings for one room
async fn user_room(
    State(state): State<AppState>,
    Path((building_id, room_id)): Path<(i64, i64)>,
) -> Result<Response> {
    let (buildings, rooms) = tokio::try_join!(
        state.backend.list_buildings(),
        state.backend.list_rooms(Some(building_id)),
    )?;

    let (Some(building), Some(room)) = (
        Building::find(&buildings, building_id),
        rooms.iter().find(|r| r.id == room_id),
    ) else {
        return Ok(not_found("Room"));
    };

    let mut data = state
        .backend
        .room_scans(room_id, DEFAULT_ROOM_SCANS_LIMIT)
        .await?;
    data.label_rows();

    let strong = signal::strong_networks(&data.rows);

    let page = UserRoomTemplate {
        building_id,
        building_name: building.name.clone(),
        room_name: room.name.clone(),
        total_scans: data.rows.len(),
        strong_count: strong.len(),
        average_signal: signal::average_rssi_display(&data.rows),
        networks: strong
            .iter()
            .enumerate()
            .map(|(index, scan)| NetworkCard {
                ssid: scan.ssid_or("Hidden Network"),
                rssi: scan.rssi_display(),
                delay: format!("{:.1}s", index as f64 * 0.1),
            })
            .collect(),
        rows: ScanRow::from_scans(&data.rows, "Hidden Network"),
    };

    Ok(page.into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user", get(user_dashboard))
        .route("/user/buildings/:id", get(user_building))
        .route("/user/buildings/:id/rooms/:room_id", get(user_room))
}
