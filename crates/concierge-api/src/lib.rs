//! HTTP surface of the concierge service.
//!
//! Routes: `POST /api/text`, `POST /api/voice`, `GET /health`, behind an
//! origin allow-list and request tracing.

pub mod cors;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
