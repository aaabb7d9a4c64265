use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// The short building header embedded in floor plan responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingRef {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateBuildingData {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateBuildingData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BuildingList {
    #[serde(default)]
    pub buildings: Vec<Building>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BuildingEnvelope {
    pub building: Building,
}

impl Building {
    /// Finds a building by id in an already fetched list.
    pub fn find(buildings: &[Building], id: i64) -> Option<&Building> {
        buildings.iter().find(|b| b.id == id)
    }

    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}
