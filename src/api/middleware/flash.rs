use serde::{Deserialize, Serialize};
use tower_sessions::Session;

/// Session key holding the pending flash message
pub const SESSION_KEY_FLASH: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// One-shot alert shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn css_class(&self) -> &'static str {
        match self.kind {
            FlashKind::Success => "alert alert-success",
            FlashKind::Error => "alert alert-error",
        }
    }
}

async fn push(session: &Session, kind: FlashKind, message: String) {
    let flash = Flash { kind, message };
    if let Err(e) = session.insert(SESSION_KEY_FLASH, &flash).await {
        // The action itself already happened; losing the alert is not fatal
        tracing::warn!(error = %e, message = %flash.message, "Failed to store flash message");
    }
}

pub async fn success(session: &Session, message: impl Into<String>) {
    push(session, FlashKind::Success, message.into()).await;
}

pub async fn error(session: &Session, message: impl Into<String>) {
    push(session, FlashKind::Error, message.into()).await;
}

/// Removes and returns the pending flash message, if any.
pub async fn take(session: &Session) -> Option<Flash> {
    session
        .remove::<Flash>(SESSION_KEY_FLASH)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to read flash message");
            None
        })
}
