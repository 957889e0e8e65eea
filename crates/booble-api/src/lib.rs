//! # booble-api
//!
//! HTTP API layer for BoobleDrive built on Axum.
//!
//! Provides the REST endpoints under `/api/v1`, middleware (CORS, request
//! logging, body limits), extractors, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state};
pub use error::ApiError;
pub use state::AppState;
