use askama::Template;
use axum::{extract::State, routing::get, Router};
use tower_sessions::Session;

use crate::api::middleware::{
    flash::{self, Flash},
    session::AppState,
};
use crate::error::Result;
use crate::models::ScanSession;

struct SessionRow {
    id: i64,
    building_name: String,
    room_name: String,
    node: String,
    started_at: String,
    ended_at: String,
    is_active: bool,
}

#[derive(Template)]
#[template(path = "admin/sessions.html")]
struct SessionsTemplate {
    flash: Option<Flash>,
    active_count: usize,
    total_count: usize,
    rooms_scanned: usize,
    sessions: Vec<SessionRow>,
}

/// All scan sessions, running and finished
async fn list_sessions(
    State(state): State<AppState>,
    session: Session,
) -> Result<SessionsTemplate> {
    let sessions = state.backend.list_sessions().await?;

    Ok(SessionsTemplate {
        flash: flash::take(&session).await,
        active_count: sessions.iter().filter(|s| s.is_active).count(),
        total_count: sessions.len(),
        rooms_scanned: ScanSession::rooms_scanned(&sessions),
        sessions: sessions
            .iter()
            .map(|s| SessionRow {
                id: s.id,
                building_name: s.building_name.clone(),
                room_name: s.room_name.clone(),
                node: s.node.clone(),
                started_at: s.started_at_display(),
                ended_at: s.ended_at_display(),
                is_active: s.is_active,
            })
            .collect(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/admin/sessions", get(list_sessions))
}
