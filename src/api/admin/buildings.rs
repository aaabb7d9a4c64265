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
use crate::api::views::non_blank;
use crate::error::{AppError, Result};
use crate::models::{
    building::{CreateBuildingData, UpdateBuildingData},
    Building,
};

#[derive(Template)]
#[template(path = "admin/buildings.html")]
struct BuildingsTemplate {
    flash: Option<Flash>,
    buildings: Vec<Building>,
}

#[derive(Template)]
#[template(path = "admin/building_edit.html")]
struct EditBuildingTemplate {
    flash: Option<Flash>,
    building: Building,
}

/// List all buildings
async fn list_buildings(
    State(state): State<AppState>,
    session: Session,
) -> Result<BuildingsTemplate> {
    let buildings = state.backend.list_buildings().await?;

    Ok(BuildingsTemplate {
        flash: flash::take(&session).await,
        buildings,
    })
}

#[derive(Deserialize)]
struct BuildingForm {
    name: String,
    description: Option<String>,
}

/// Create a new building
async fn create_building(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<BuildingForm>,
) -> Redirect {
    let name = form.name.trim();
    if name.is_empty() {
        flash::error(&session, "Building name is required").await;
        return Redirect::to("/admin/buildings");
    }

    let data = CreateBuildingData {
        name: name.to_string(),
        description: non_blank(form.description),
    };

    match state.backend.create_building(&data).await {
        Ok(building) => {
            tracing::info!(building_id = building.id, "Created building");
            flash::success(&session, format!("Building \"{}\" created", building.name)).await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not create building");
            flash::error(&session, format!("Could not create building: {}", e)).await;
        }
    }

    Redirect::to("/admin/buildings")
}

/// Show edit form
async fn edit_building_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    session: Session,
) -> Result<EditBuildingTemplate> {
    let buildings = state.backend.list_buildings().await?;
    let building = Building::find(&buildings, id)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Building {}", id)))?;

    Ok(EditBuildingTemplate {
        flash: flash::take(&session).await,
        building,
    })
}

/// Update an existing building
async fn update_building(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    session: Session,
    Form(form): Form<BuildingForm>,
) -> Redirect {
    let name = form.name.trim();
    if name.is_empty() {
        flash::error(&session, "Building name is required").await;
        return Redirect::to(&format!("/admin/buildings/{}/edit", id));
    }

    // An emptied description is sent as "" so the backend clears it
    let data = UpdateBuildingData {
        name: Some(name.to_string()),
        description: Some(form.description.unwrap_or_default().trim().to_string()),
    };

    match state.backend.update_building(id, &data).await {
        Ok(building) => {
            tracing::info!(building_id = building.id, "Updated building");
            flash::success(&session, format!("Building \"{}\" updated", building.name)).await;
            Redirect::to("/admin/buildings")
        }
        Err(e) => {
            tracing::warn!(building_id = id, error = %e, "Could not update building");
            flash::error(&session, format!("Failed to update building: {}", e)).await;
            Redirect::to(&format!("/admin/buildings/{}/edit", id))
        }
    }
}

/// Delete a building together with its rooms
async fn delete_building(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    session: Session,
) -> Redirect {
    match state.backend.delete_building(id).await {
        Ok(()) => {
            tracing::info!(building_id = id, "Deleted building");
            flash::success(&session, "Building deleted").await;
        }
        Err(e) => {
            tracing::warn!(building_id = id, error = %e, "Could not delete building");
            flash::error(&session, format!("Failed to delete building: {}", e)).await;
        }
    }

    Redirect::to("/admin/buildings")
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/buildings", get(list_buildings).post(create_building))
        .route("/admin/buildings/:id/edit", get(edit_building_form))
        .route("/admin/buildings/:id", post(update_building))
        .route("/admin/buildings/:id/delete", post(delete_building))
}
