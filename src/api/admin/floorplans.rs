use askama::Template;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
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
use crate::api::views::{markers_for, non_blank, FloorOption, Marker};
use crate::error::Result;
use crate::models::{
    floor_plan::{FloorPlanFromUrl, FloorPlanUpload, UpdateFloorPlanData},
    room::RoomPlacement,
    Room,
};
use crate::services::placement;

const ADMIN_MARKER_COLOR: &str = "#1e40af";

struct SelectedPlan {
    id: i64,
    floor_name: String,
    image_url: String,
    raw_image_url: String,
    markers: Vec<Marker>,
}

struct PlacementRow {
    id: i64,
    name: String,
    status: String,
}

#[derive(Template)]
#[template(path = "admin/floorplans.html")]
struct FloorPlansTemplate {
    flash: Option<Flash>,
    building_id: i64,
    building_name: String,
    floors: Vec<FloorOption>,
    selected: Option<SelectedPlan>,
    rooms: Vec<PlacementRow>,
}

#[derive(Deserialize)]
struct FloorPlanQuery {
    floorplan: Option<i64>,
}

fn floorplans_url(building_id: i64, floorplan_id: Option<i64>) -> String {
    match floorplan_id {
        Some(id) => format!("/admin/buildings/{}/floorplans?floorplan={}", building_id, id),
        None => format!("/admin/buildings/{}/floorplans", building_id),
    }
}

fn placement_status(room: &Room, floors: &[FloorOption]) -> String {
    match (room.floorplan_id, room.x, room.y) {
        (Some(fp), Some(_), Some(_)) => floors
            .iter()
            .find(|f| f.id == fp)
            .map(|f| format!("Placed on {}", f.name))
            .unwrap_or_else(|| "Placed".to_string()),
        _ => "Not placed".to_string(),
    }
}

/// Floor plans of a building with room markers on the selected plan
async fn list_floor_plans(
    State(state): State<AppState>,
    Path(building_id): Path<i64>,
    Query(query): Query<FloorPlanQuery>,
    session: Session,
) -> Result<FloorPlansTemplate> {
    let (plans, rooms) = tokio::try_join!(
        state.backend.building_floor_plans(building_id),
        state.backend.list_rooms(Some(building_id)),
    )?;

    let selected_plan = plans.select(query.floorplan);
    let floors: Vec<FloorOption> = plans
        .floorplans
        .iter()
        .map(|fp| FloorOption {
            id: fp.id,
            name: fp.floor_name.clone(),
            selected: selected_plan.map(|s| s.id) == Some(fp.id),
        })
        .collect();

    let selected = selected_plan.map(|fp| SelectedPlan {
        id: fp.id,
        floor_name: fp.floor_name.clone(),
        image_url: state.image_url(&fp.image_url),
        raw_image_url: fp.image_url.clone(),
        markers: markers_for(&rooms, fp.id, |_| ADMIN_MARKER_COLOR),
    });

    Ok(FloorPlansTemplate {
        flash: flash::take(&session).await,
        building_id,
        building_name: plans.building.name.clone(),
        rooms: rooms
            .iter()
            .map(|room| PlacementRow {
                id: room.id,
                name: room.name.clone(),
                status: placement_status(room, &floors),
            })
            .collect(),
        floors,
        selected,
    })
}

/// Reads the upload form. An empty file input counts as no file.
async fn read_upload_form(
    mut multipart: Multipart,
) -> std::result::Result<(String, Option<FloorPlanUpload>), MultipartError> {
    let mut floor_name = String::new();
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "floor_name" => floor_name = field.text().await?.trim().to_string(),
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;

                if !file_name.is_empty() && !bytes.is_empty() {
                    upload = Some(FloorPlanUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok((floor_name, upload))
}

/// Upload a floor plan image
async fn upload_floor_plan(
    State(state): State<AppState>,
    Path(building_id): Path<i64>,
    session: Session,
    multipart: Multipart,
) -> Redirect {
    let back = Redirect::to(&floorplans_url(building_id, None));

    let (floor_name, upload) = match read_upload_form(multipart).await {
        Ok(form) => form,
        Err(e) => {
            tracing::warn!(building_id, error = %e, "Malformed floor plan upload");
            flash::error(&session, format!("Could not read upload: {}", e)).await;
            return back;
        }
    };

    if floor_name.is_empty() {
        flash::error(&session, "Floor name is required").await;
        return back;
    }
    let Some(upload) = upload else {
        flash::error(&session, "Choose an image file to upload").await;
        return back;
    };

    match state
        .backend
        .upload_floor_plan(building_id, &floor_name, upload)
        .await
    {
        Ok(plan) => {
            tracing::info!(building_id, floorplan_id = plan.id, "Uploaded floor plan");
            flash::success(&session, format!("Floor plan \"{}\" uploaded", plan.floor_name)).await;
            Redirect::to(&floorplans_url(building_id, Some(plan.id)))
        }
        Err(e) => {
            tracing::warn!(building_id, error = %e, "Could not upload floor plan");
            flash::error(&session, format!("Could not upload floor plan: {}", e)).await;
            back
        }
    }
}

#[derive(Deserialize)]
struct FloorPlanUrlForm {
    floor_name: String,
    image_url: String,
}

/// Register a floor plan hosted elsewhere
async fn create_floor_plan_from_url(
    State(state): State<AppState>,
    Path(building_id): Path<i64>,
    session: Session,
    Form(form): Form<FloorPlanUrlForm>,
) -> Redirect {
    let back = Redirect::to(&floorplans_url(building_id, None));

    let floor_name = form.floor_name.trim();
    let image_url = form.image_url.trim();
    if floor_name.is_empty() || image_url.is_empty() {
        flash::error(&session, "Floor name and image URL are required").await;
        return back;
    }

    let data = FloorPlanFromUrl {
        building_id,
        floor_name: floor_name.to_string(),
        image_url: image_url.to_string(),
    };

    match state.backend.create_floor_plan_from_url(&data).await {
        Ok(plan) => {
            tracing::info!(building_id, floorplan_id = plan.id, "Added floor plan from URL");
            flash::success(&session, format!("Floor plan \"{}\" added", plan.floor_name)).await;
            Redirect::to(&floorplans_url(building_id, Some(plan.id)))
        }
        Err(e) => {
            tracing::warn!(building_id, error = %e, "Could not add floor plan");
            flash::error(&session, format!("Could not add floor plan: {}", e)).await;
            back
        }
    }
}

#[derive(Deserialize)]
struct UpdateFloorPlanForm {
    building_id: i64,
    floor_name: String,
    image_url: Option<String>,
}

/// Rename a floor plan or point it at a different image
async fn update_floor_plan(
    State(state): State<AppState>,
    Path(floorplan_id): Path<i64>,
    session: Session,
    Form(form): Form<UpdateFloorPlanForm>,
) -> Redirect {
    let back = Redirect::to(&floorplans_url(form.building_id, Some(floorplan_id)));

    let floor_name = form.floor_name.trim();
    if floor_name.is_empty() {
        flash::error(&session, "Floor name is required").await;
        return back;
    }

    let data = UpdateFloorPlanData {
        building_id: form.building_id,
        floor_name: floor_name.to_string(),
        image_url: non_blank(form.image_url),
    };

    match state.backend.update_floor_plan(floorplan_id, &data).await {
        Ok(plan) => {
            tracing::info!(floorplan_id, "Updated floor plan");
            flash::success(&session, format!("Floor plan \"{}\" updated", plan.floor_name)).await;
        }
        Err(e) => {
            tracing::warn!(floorplan_id, error = %e, "Could not update floor plan");
            flash::error(&session, format!("Could not update floor plan: {}", e)).await;
        }
    }

    back
}

#[derive(Deserialize)]
struct DeleteFloorPlanForm {
    building_id: i64,
}

/// Delete a floor plan; rooms placed on it lose their placement
async fn delete_floor_plan(
    State(state): State<AppState>,
    Path(floorplan_id): Path<i64>,
    session: Session,
    Form(form): Form<DeleteFloorPlanForm>,
) -> Redirect {
    match state.backend.delete_floor_plan(floorplan_id).await {
        Ok(()) => {
            tracing::info!(floorplan_id, "Deleted floor plan");
            flash::success(&session, "Floor plan deleted").await;
        }
        Err(e) => {
            tracing::warn!(floorplan_id, error = %e, "Could not delete floor plan");
            flash::error(&session, format!("Could not delete floor plan: {}", e)).await;
        }
    }

    Redirect::to(&floorplans_url(form.building_id, None))
}

/// Click position reported by the floor plan image, in displayed pixels.
///
/// Fields arrive as strings because the browser leaves them empty until the
/// image has been clicked.
#[derive(Deserialize)]
struct PlaceRoomForm {
    building_id: i64,
    room_id: String,
    click_x: String,
    click_y: String,
    display_width: String,
    display_height: String,
}

fn parse_placement(
    form: &PlaceRoomForm,
    floorplan_id: i64,
) -> std::result::Result<(i64, RoomPlacement), String> {
    let room_id: i64 = form
        .room_id
        .trim()
        .parse()
        .map_err(|_| "Select a room to place".to_string())?;

    let number = |v: &str| v.trim().parse::<f64>().ok();
    let (Some(cx), Some(cy), Some(w), Some(h)) = (
        number(&form.click_x),
        number(&form.click_y),
        number(&form.display_width),
        number(&form.display_height),
    ) else {
        return Err("Click on the floor plan where the room is".to_string());
    };

    let point = placement::normalize_click(cx, cy, w, h).map_err(|e| e.to_string())?;

    Ok((
        room_id,
        RoomPlacement {
            floorplan_id,
            x: point.x,
            y: point.y,
        },
    ))
}

/// Place a room marker where the admin clicked on the floor plan
async fn place_room(
    State(state): State<AppState>,
    Path(floorplan_id): Path<i64>,
    session: Session,
    Form(form): Form<PlaceRoomForm>,
) -> Redirect {
    let back = Redirect::to(&floorplans_url(form.building_id, Some(floorplan_id)));

    let (room_id, placement) = match parse_placement(&form, floorplan_id) {
        Ok(parsed) => parsed,
        Err(msg) => {
            flash::error(&session, msg).await;
            return back;
        }
    };

    match state.backend.place_room(room_id, &placement).await {
        Ok(room) => {
            tracing::info!(
                room_id,
                floorplan_id,
                x = placement.x,
                y = placement.y,
                "Placed room on floor plan"
            );
            flash::success(&session, format!("Room \"{}\" placed", room.name)).await;
        }
        Err(e) => {
            tracing::warn!(room_id, floorplan_id, error = %e, "Could not place room");
            flash::error(&session, format!("Could not place room: {}", e)).await;
        }
    }

    back
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/buildings/:id/floorplans",
            get(list_floor_plans).post(upload_floor_plan),
        )
        .route(
            "/admin/buildings/:id/floorplans/url",
            post(create_floor_plan_from_url),
        )
        .route("/admin/floorplans/:id", post(update_floor_plan))
        .route("/admin/floorplans/:id/delete", post(delete_floor_plan))
        .route("/admin/floorplans/:id/place", post(place_room))
}
