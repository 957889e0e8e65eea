//! # booble-entity
//!
//! Domain entity models for BoobleDrive. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`; value objects validate on construction.

pub mod file;
pub mod share;
pub mod tag;
pub mod token;
pub mod upload;
pub mod user;
