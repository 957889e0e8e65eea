//! Chunked upload session state.

pub mod session;

pub use session::UploadSession;
