//! Thumbnail configuration.

use serde::{Deserialize, Serialize};

/// Thumbnail generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    /// Edge length of the square thumbnail in pixels.
    #[serde(default = "default_size")]
    pub size: u32,
    /// JPEG quality (1-100).
    #[serde(default = "default_quality")]
    pub jpeg_quality: u8,
    /// Path to an `ffmpeg` binary. Video thumbnails are disabled when unset.
    #[serde(default)]
    pub ffmpeg_path: Option<String>,
    /// Number of generated thumbnails kept in memory.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            size: default_size(),
            jpeg_quality: default_quality(),
            ffmpeg_path: None,
            cache_capacity: default_cache_capacity(),
        }
    }
}

fn default_size() -> u32 {
    100
}

fn default_quality() -> u8 {
    80
}

fn default_cache_capacity() -> u64 {
    1000
}
