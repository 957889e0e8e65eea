//! File tags.

pub mod model;

pub use model::{MAX_TAG_LENGTH, Tag, normalize_tags};
