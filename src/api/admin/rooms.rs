use askama::Template;
use axum::{
    extract::{Path, State},
    response::Redirect,
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::api::middleware::{
    flash::{self, Flash},
    session::AppState,
};
use crate::api::views::{non_blank, ScanRow};
use crate::error::{AppError, Result};
use crate::models::{
    room::{CreateRoomData, UpdateRoomData},
    Building, Room, ScanSession,
};
use crate::services::{
    backend_client::DEFAULT_ROOM_SCANS_LIMIT,
    signal::{self, SignalStrength},
};

struct RoomStatusRow {
    room: Room,
    active: bool,
}

#[derive(Template)]
#[template(path = "admin/rooms.html")]
struct RoomsTemplate {
    flash: Option<Flash>,
    building_id: i64,
    building_name: String,
    building_description: String,
    rooms: Vec<RoomStatusRow>,
}

struct BuildingOption {
    id: i64,
    name: String,
    selected: bool,
}

#[derive(Template)]
#[template(path = "admin/room_edit.html")]
struct EditRoomTemplate {
    flash: Option<Flash>,
    room: Room,
    floor: String,
    room_type: String,
    buildings: Vec<BuildingOption>,
}

struct HeatmapCell {
    ssid: String,
    rssi: String,
    label: &'static str,
    color: &'static str,
    delay: String,
}

#[derive(Template)]
#[template(path = "admin/room_wifi.html")]
struct RoomWifiTemplate {
    flash: Option<Flash>,
    refresh_secs: u64,
    room_name: String,
    building_id: i64,
    subtitle: String,
    total_scans: usize,
    unique_networks: usize,
    average_signal: String,
    cells: Vec<HeatmapCell>,
    rows: Vec<ScanRow>,
}

/// Rooms of a building with their current scan status
async fn list_rooms(
    State(state): State<AppState>,
    Path(building_id): Path<i64>,
    session: Session,
) -> Result<RoomsTemplate> {
    let (buildings, rooms, sessions) = tokio::try_join!(
        state.backend.list_buildings(),
        state.backend.list_rooms(Some(building_id)),
        state.backend.list_sessions(),
    )?;

    let building = Building::find(&buildings, building_id)
        .ok_or_else(|| AppError::NotFound(format!("Building {}", building_id)))?;
    let active = ScanSession::active_room_ids(&sessions);

    Ok(RoomsTemplate {
        flash: flash::take(&session).await,
        building_id,
        building_name: building.name.clone(),
        building_description: building.description_or_empty().to_string(),
        rooms: rooms
            .into_iter()
            .map(|room| RoomStatusRow {
                active: active.contains(&room.id),
                room,
            })
            .collect(),
    })
}

#[derive(Deserialize)]
struct CreateRoomForm {
    name: String,
    floor: Option<String>,
    room_type: Option<String>,
}

/// Add a room to a building
async fn create_room(
    State(state): State<AppState>,
    Path(building_id): Path<i64>,
    session: Session,
    Form(form): Form<CreateRoomForm>,
) -> Redirect {
    let back = Redirect::to(&format!("/admin/buildings/{}/rooms", building_id));

    let name = form.name.trim();
    if name.is_empty() {
        flash::error(&session, "Room name is required").await;
        return back;
    }

    let data = CreateRoomData {
        name: name.to_string(),
        building_id,
        floor: non_blank(form.floor),
        room_type: non_blank(form.room_type),
    };

    match state.backend.create_room(&data).await {
        Ok(room) => {
            tracing::info!(room_id = room.id, building_id, "Created room");
            flash::success(&session, format!("Room \"{}\" added", room.name)).await;
        }
        Err(e) => {
            tracing::warn!(building_id, error = %e, "Could not create room");
            flash::error(&session, format!("Could not create room: {}", e)).await;
        }
    }

    back
}

#[derive(Deserialize)]
struct ReturnToBuilding {
    building_id: i64,
}

/// Start a scan session for a room
async fn start_scan(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
    session: Session,
    Form(form): Form<ReturnToBuilding>,
) -> Redirect {
    match state.backend.start_scan(room_id).await {
        Ok(()) => {
            tracing::info!(room_id, "Started scan session");
            flash::success(&session, "Scan started").await;
        }
        Err(e) => {
            tracing::warn!(room_id, error = %e, "Could not start scan");
            flash::error(&session, format!("Could not start scan for this room: {}", e)).await;
        }
    }

    Redirect::to(&format!("/admin/buildings/{}/rooms", form.building_id))
}

/// Stop the running scan session of a room
async fn stop_scan(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
    session: Session,
    Form(form): Form<ReturnToBuilding>,
) -> Redirect {
    match state.backend.stop_scan(room_id).await {
        Ok(()) => {
            tracing::info!(room_id, "Stopped scan session");
            flash::success(&session, "Scan stopped").await;
        }
        Err(e) => {
            tracing::warn!(room_id, error = %e, "Could not stop scan");
            flash::error(&session, format!("Could not stop scan for this room: {}", e)).await;
        }
    }

    Redirect::to(&format!("/admin/buildings/{}/rooms", form.building_id))
}

/// Show the room edit form
async fn edit_room_form(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
    session: Session,
) -> Result<EditRoomTemplate> {
    let (rooms, buildings) = tokio::try_join!(
        state.backend.list_rooms(None),
        state.backend.list_buildings(),
    )?;

    let room = rooms
        .into_iter()
        .find(|r| r.id == room_id)
        .ok_or_else(|| AppError::NotFound(format!("Room {}", room_id)))?;

    Ok(EditRoomTemplate {
        flash: flash::take(&session).await,
        floor: room.floor.clone().unwrap_or_default(),
        room_type: room.room_type.clone().unwrap_or_default(),
        buildings: buildings
            .into_iter()
            .map(|b| BuildingOption {
                selected: b.id == room.building_id,
                id: b.id,
                name: b.name,
            })
            .collect(),
        room,
    })
}

#[derive(Deserialize)]
struct UpdateRoomForm {
    name: String,
    building_id: i64,
    floor: Option<String>,
    room_type: Option<String>,
}

/// Update room details, possibly moving it to another building
async fn update_room(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
    session: Session,
    Form(form): Form<UpdateRoomForm>,
) -> Redirect {
    let name = form.name.trim();
    if name.is_empty() {
        flash::error(&session, "Room name is required").await;
        return Redirect::to(&format!("/admin/rooms/{}/edit", room_id));
    }

    let data = UpdateRoomData {
        name: Some(name.to_string()),
        building_id: Some(form.building_id),
        floor: Some(form.floor.unwrap_or_default().trim().to_string()),
        room_type: Some(form.room_type.unwrap_or_default().trim().to_string()),
    };

    match state.backend.update_room(room_id, &data).await {
        Ok(room) => {
            tracing::info!(room_id, building_id = room.building_id, "Updated room");
            flash::success(&session, format!("Room \"{}\" updated", room.name)).await;
            Redirect::to(&format!("/admin/buildings/{}/rooms", room.building_id))
        }
        Err(e) => {
            tracing::warn!(room_id, error = %e, "Could not update room");
            flash::error(&session, format!("Failed to update room: {}", e)).await;
            Redirect::to(&format!("/admin/rooms/{}/edit", room_id))
        }
    }
}

/// Delete a room
async fn delete_room(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
    session: Session,
    Form(form): Form<ReturnToBuilding>,
) -> Redirect {
    match state.backend.delete_room(room_id).await {
        Ok(()) => {
            tracing::info!(room_id, "Deleted room");
            flash::success(&session, "Room deleted").await;
        }
        Err(e) => {
            tracing::warn!(room_id, error = %e, "Could not delete room");
            flash::error(&session, format!("Failed to delete room: {}", e)).await;
        }
    }

    Redirect::to(&format!("/admin/buildings/{}/rooms", form.building_id))
}

/// Wi-Fi readings collected for a room, refreshed periodically
async fn room_wifi(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
    session: Session,
) -> Result<RoomWifiTemplate> {
    let (mut data, buildings) = tokio::try_join!(
        state.backend.room_scans(room_id, DEFAULT_ROOM_SCANS_LIMIT),
        state.backend.list_buildings(),
    )?;
    data.label_rows();

    let mut room = data.room;
    if let Some(building) = Building::find(&buildings, room.building_id) {
        room.building_name = building.name.clone();
    }

    let mut rows = data.rows;
    let highlights = signal::heatmap_highlights(&rows);
    let cells = highlights
        .cells()
        .into_iter()
        .enumerate()
        .map(|(index, scan)| {
            let strength = SignalStrength::from_rssi(scan.rssi);
            HeatmapCell {
                ssid: scan.ssid_or("Hidden Network"),
                rssi: scan.rssi_display(),
                label: strength.label(),
                color: strength.color(),
                delay: format!("{:.1}s", index as f64 * 0.1),
            }
        })
        .collect();

    let total_scans = rows.len();
    let unique_networks = signal::unique_ssids(&rows);
    let average_signal = signal::average_rssi_display(&rows);
    signal::newest_first(&mut rows);

    Ok(RoomWifiTemplate {
        flash: flash::take(&session).await,
        refresh_secs: state.config.admin_refresh_secs,
        room_name: room.name.clone(),
        building_id: room.building_id,
        subtitle: room.subtitle(),
        total_scans,
        unique_networks,
        average_signal,
        cells,
        rows: ScanRow::from_scans(&rows, "Hidden Network"),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/buildings/:id/rooms",
            get(list_rooms).post(create_room),
        )
        .route("/admin/rooms/:id", get(room_wifi).post(update_room))
        .route("/admin/rooms/:id/edit", get(edit_room_form))
        .route("/admin/rooms/:id/delete", post(delete_room))
        .route("/admin/rooms/:id/start-scan", post(start_scan))
        .route("/admin/rooms/:id/stop-scan", post(stop_scan))
}
