use serde::{Deserialize, Serialize};

use super::building::BuildingRef;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorPlan {
    pub id: i64,
    pub floor_name: String,
    pub image_url: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub building_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildingFloorPlans {
    pub building: BuildingRef,
    #[serde(default)]
    pub floorplans: Vec<FloorPlan>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FloorPlanFromUrl {
    pub building_id: i64,
    pub floor_name: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateFloorPlanData {
    pub building_id: i64,
    pub floor_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// An image file received from the dashboard's upload form.
#[derive(Debug, Clone)]
pub struct FloorPlanUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FloorPlanEnvelope {
    pub floorplan: FloorPlan,
}

/// Resolves a floor plan image reference against the backend's public URL.
///
/// Absolute URLs are returned unchanged; backend-relative paths such as
/// `/uploads/floor1.png` get the base prefixed.
pub fn resolve_image_url(public_base: &str, image_url: &str) -> String {
    if image_url.starts_with("http") {
        return image_url.to_string();
    }

    let base = public_base.trim_end_matches('/');
    if image_url.starts_with('/') {
        format!("{}{}", base, image_url)
    } else {
        format!("{}/{}", base, image_url)
    }
}

impl BuildingFloorPlans {
    /// The plan with `id`, or the first plan when `id` is absent or unknown.
    pub fn select(&self, id: Option<i64>) -> Option<&FloorPlan> {
        id.and_then(|id| self.floorplans.iter().find(|fp| fp.id == id))
            .or_else(|| self.floorplans.first())
    }
}
