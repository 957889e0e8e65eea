//! Core type definitions used across the BoobleDrive workspace.

pub mod pagination;

pub use pagination::{PageRequest, PageResponse};
