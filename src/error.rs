use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::services::ApiError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Backend(#[from] ApiError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    status: u16,
    title: String,
    message: String,
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Backend(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            AppError::Backend(_) => StatusCode::BAD_GATEWAY,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (title, message) = match &self {
            AppError::Backend(e) => {
                tracing::error!(error = %e, "Backend request failed");
                ("Could not load data from the Wi-Fi API".to_string(), e.to_string())
            }
            AppError::Validation(msg) => ("Invalid request".to_string(), msg.clone()),
            AppError::NotFound(msg) => ("Not found".to_string(), msg.clone()),
            AppError::Internal(e) => {
                tracing::error!(error = ?e, "Internal error");
                ("Something went wrong".to_string(), self.to_string())
            }
        };

        let page = ErrorTemplate {
            status: status.as_u16(),
            title,
            message,
        };

        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to render error page");
                (status, page.message).into_response()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
