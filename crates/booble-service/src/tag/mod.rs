//! Tag listing and lookup.

pub mod service;

pub use service::TagService;
