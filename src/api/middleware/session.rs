use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};

use crate::config::Config;
use crate::services::BackendClient;

/// Creates the session layer backing flash messages.
///
/// Sessions only carry one-shot alerts, so an in-memory store is enough; a
/// restart drops pending messages and nothing else.
pub fn create_session_layer(secure: bool) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_secure(secure)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(24)))
}

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub backend: BackendClient,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, crate::services::ApiError> {
        let backend = BackendClient::from_config(&config)?;
        Ok(Self { backend, config })
    }

    /// Absolute URL for a floor plan image as the browser should load it.
    pub fn image_url(&self, image_url: &str) -> String {
        crate::models::floor_plan::resolve_image_url(&self.config.public_api_base_url, image_url)
    }
}
