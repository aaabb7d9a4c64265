// Services module - Backend access and signal analysis

pub mod backend_client;
pub mod heatmap;
pub mod placement;
pub mod signal;

pub use backend_client::{ApiError, BackendClient};
