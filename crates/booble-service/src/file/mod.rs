//! File management: CRUD, versions, sharing, chunked uploads, thumbnails.

pub mod dto;
pub mod hashing;
pub mod service;
pub mod thumbnail;
pub mod upload;

pub use dto::{DownloadedFile, FileDto, FileVersionDto};
pub use service::{
    FileService, SearchFilesRequest, ShareFileRequest, UpdateFileRequest, UploadFileRequest,
};
pub use thumbnail::{Thumbnail, ThumbnailService};
pub use upload::{ChunkReceived, InitiateUploadRequest, InitiateUploadResponse, UploadService};
