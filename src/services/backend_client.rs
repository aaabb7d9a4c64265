use std::time::Duration;

use reqwest::{
    multipart::{Form, Part},
    Client, Method, RequestBuilder, Response, StatusCode,
};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;

use crate::models::{
    building::{Building, BuildingEnvelope, BuildingList, CreateBuildingData, UpdateBuildingData},
    floor_plan::{
        BuildingFloorPlans, FloorPlan, FloorPlanEnvelope, FloorPlanFromUrl, FloorPlanUpload,
        UpdateFloorPlanData,
    },
    room::{CreateRoomData, Room, RoomEnvelope, RoomList, RoomPlacement, UpdateRoomData},
    scan_session::{ScanSession, SessionList},
    wifi_scan::{BuildingScanData, RoomScanData, ScanList, WifiScan},
};

/// Rows requested for a room Wi-Fi view
pub const DEFAULT_ROOM_SCANS_LIMIT: u32 = 100;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Request failed: {status} {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to parse response: {0}")]
    Decode(String),

    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// Client for the Wi-Fi mapping backend API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    http: Client,
    api_token: Option<Secret<String>>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url)
            .field("has_token", &self.api_token.is_some())
            .finish()
    }
}

impl BackendClient {
    pub fn new(
        base_url: &str,
        api_token: Option<Secret<String>>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let parsed =
            url::Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            api_token,
        })
    }

    pub fn from_config(config: &crate::config::Config) -> Result<Self, ApiError> {
        Self::new(
            &config.api_base_url,
            config.api_token.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));

        match &self.api_token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    // ---------- Buildings ----------

    #[tracing::instrument(skip(self))]
    pub async fn list_buildings(&self) -> Result<Vec<Building>, ApiError> {
        let response = self.request(Method::GET, "/buildings").send().await?;
        let list: BuildingList = handle_json(response).await?;
        Ok(list.buildings)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_building(&self, data: &CreateBuildingData) -> Result<Building, ApiError> {
        let response = self
            .request(Method::POST, "/buildings")
            .json(data)
            .send()
            .await?;
        let envelope: BuildingEnvelope = handle_json(response).await?;
        Ok(envelope.building)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_building(
        &self,
        building_id: i64,
        data: &UpdateBuildingData,
    ) -> Result<Building, ApiError> {
        let response = self
            .request(Method::PUT, &format!("/buildings/{}", building_id))
            .json(data)
            .send()
            .await?;
        let envelope: BuildingEnvelope = handle_json(response).await?;
        Ok(envelope.building)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_building(&self, building_id: i64) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &format!("/buildings/{}", building_id))
            .send()
            .await?;
        check_status(response).await.map(drop)
    }

    // ---------- Rooms ----------

    #[tracing::instrument(skip(self))]
    pub async fn list_rooms(&self, building_id: Option<i64>) -> Result<Vec<Room>, ApiError> {
        let mut request = self.request(Method::GET, "/rooms");
        if let Some(id) = building_id {
            request = request.query(&[("building_id", id)]);
        }

        let list: RoomList = handle_json(request.send().await?).await?;
        Ok(list.rooms)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_room(&self, data: &CreateRoomData) -> Result<Room, ApiError> {
        let response = self
            .request(Method::POST, "/rooms")
            .json(data)
            .send()
            .await?;
        let envelope: RoomEnvelope = handle_json(response).await?;
        Ok(envelope.room)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_room(&self, room_id: i64, data: &UpdateRoomData) -> Result<Room, ApiError> {
        let response = self
            .request(Method::PUT, &format!("/rooms/{}", room_id))
            .json(data)
            .send()
            .await?;
        let envelope: RoomEnvelope = handle_json(response).await?;
        Ok(envelope.room)
    }

    /// Pins a room onto a floor plan at a normalized position.
    #[tracing::instrument(skip(self))]
    pub async fn place_room(&self, room_id: i64, placement: &RoomPlacement) -> Result<Room, ApiError> {
        let response = self
            .request(Method::PUT, &format!("/rooms/{}", room_id))
            .json(placement)
            .send()
            .await?;
        let envelope: RoomEnvelope = handle_json(response).await?;
        Ok(envelope.room)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_room(&self, room_id: i64) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &format!("/rooms/{}", room_id))
            .send()
            .await?;
        check_status(response).await.map(drop)
    }

    // ---------- Scans ----------

    #[tracing::instrument(skip(self))]
    pub async fn recent_scans(&self, limit: u32) -> Result<Vec<WifiScan>, ApiError> {
        let response = self
            .request(Method::GET, "/wifi/rawScans")
            .query(&[("limit", limit)])
            .send()
            .await?;
        let list: ScanList = handle_json(response).await?;
        Ok(list.rows)
    }

    #[tracing::instrument(skip(self))]
    pub async fn room_scans(&self, room_id: i64, limit: u32) -> Result<RoomScanData, ApiError> {
        let response = self
            .request(Method::GET, &format!("/rooms/{}/wifi", room_id))
            .query(&[("limit", limit)])
            .send()
            .await?;
        handle_json(response).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn building_scans(
        &self,
        building_id: i64,
        limit: u32,
    ) -> Result<BuildingScanData, ApiError> {
        let response = self
            .request(Method::GET, &format!("/buildings/{}/wifi", building_id))
            .query(&[("limit", limit)])
            .send()
            .await?;
        handle_json(response).await
    }

    // ---------- Scan sessions ----------

    #[tracing::instrument(skip(self))]
    pub async fn list_sessions(&self) -> Result<Vec<ScanSession>, ApiError> {
        let response = self.request(Method::GET, "/sessions").send().await?;
        let list: SessionList = handle_json(response).await?;
        Ok(list.sessions)
    }

    /// Starts a scan session for the room. The backend picks the node.
    #[tracing::instrument(skip(self))]
    pub async fn start_scan(&self, room_id: i64) -> Result<(), ApiError> {
        let response = self
            .request(Method::POST, &format!("/rooms/{}/start-scan", room_id))
            .json(&serde_json::json!({}))
            .send()
            .await?;
        check_status(response).await.map(drop)
    }

    #[tracing::instrument(skip(self))]
    pub async fn stop_scan(&self, room_id: i64) -> Result<(), ApiError> {
        let response = self
            .request(Method::POST, &format!("/rooms/{}/stop-scan", room_id))
            .json(&serde_json::json!({}))
            .send()
            .await?;
        check_status(response).await.map(drop)
    }

    // ---------- Floor plans ----------

    #[tracing::instrument(skip(self))]
    pub async fn building_floor_plans(
        &self,
        building_id: i64,
    ) -> Result<BuildingFloorPlans, ApiError> {
        let response = self
            .request(Method::GET, &format!("/buildings/{}/floorplans", building_id))
            .send()
            .await?;
        handle_json(response).await
    }

    #[tracing::instrument(skip(self, upload), fields(file_name = %upload.file_name, size = upload.bytes.len()))]
    pub async fn upload_floor_plan(
        &self,
        building_id: i64,
        floor_name: &str,
        upload: FloorPlanUpload,
    ) -> Result<FloorPlan, ApiError> {
        let mut file = Part::bytes(upload.bytes).file_name(upload.file_name);
        if let Some(content_type) = upload.content_type.as_deref() {
            file = file.mime_str(content_type)?;
        }

        let form = Form::new()
            .text("building_id", building_id.to_string())
            .text("floor_name", floor_name.to_string())
            .part("file", file);

        let response = self
            .request(Method::POST, "/floorplans")
            .multipart(form)
            .send()
            .await?;
        let envelope: FloorPlanEnvelope = handle_json(response).await?;
        Ok(envelope.floorplan)
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_floor_plan_from_url(
        &self,
        data: &FloorPlanFromUrl,
    ) -> Result<FloorPlan, ApiError> {
        let response = self
            .request(Method::POST, "/floorplans/url")
            .json(data)
            .send()
            .await?;
        let envelope: FloorPlanEnvelope = handle_json(response).await?;
        Ok(envelope.floorplan)
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_floor_plan(
        &self,
        floorplan_id: i64,
        data: &UpdateFloorPlanData,
    ) -> Result<FloorPlan, ApiError> {
        let response = self
            .request(Method::PUT, &format!("/floorplans/{}", floorplan_id))
            .json(data)
            .send()
            .await?;
        let envelope: FloorPlanEnvelope = handle_json(response).await?;
        Ok(envelope.floorplan)
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_floor_plan(&self, floorplan_id: i64) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &format!("/floorplans/{}", floorplan_id))
            .send()
            .await?;
        check_status(response).await.map(drop)
    }

    // ---------- Health ----------

    /// Checks that the backend answers on `/health`.
    pub async fn ping(&self) -> Result<(), ApiError> {
        let response = self
            .request(Method::GET, "/health")
            .timeout(Duration::from_secs(3))
            .send()
            .await?;
        check_status(response).await.map(drop)
    }
}

/// Turns any non-2xx response into [`ApiError::Status`] carrying the body text.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = %status, body = %body, "Backend request failed");

    Err(ApiError::Status {
        status,
        body: body.trim().to_string(),
    })
}

async fn handle_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = check_status(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}
