//! Stored files, their versions, and related value types.

pub mod filter;
pub mod mime;
pub mod model;
pub mod version;
pub mod visibility;

pub use filter::FileTypeFilter;
pub use mime::MimeType;
pub use model::{CreateFile, DriveFile, UpdateFileMetadata};
pub use version::{CreateFileVersion, FileVersion};
pub use visibility::FileVisibility;
