//! Square JPEG thumbnails for images and, when ffmpeg is configured, videos.

use std::process::Stdio;
use std::sync::Arc;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use moka::future::Cache;
use tracing::{debug, warn};
use uuid::Uuid;

use booble_core::config::ThumbnailConfig;
use booble_core::error::AppError;
use booble_entity::file::{DriveFile, MimeType};
use booble_entity::share::FilePermission;

use crate::context::RequestContext;
use crate::share::PublicLinkService;

use super::service::FileService;

/// MIME type of every generated thumbnail.
pub const THUMBNAIL_CONTENT_TYPE: &str = "image/jpeg";

/// A rendered thumbnail.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    /// JPEG bytes.
    pub data: Bytes,
    /// Always [`THUMBNAIL_CONTENT_TYPE`].
    pub content_type: &'static str,
}

/// Generates and caches thumbnails.
#[derive(Clone)]
pub struct ThumbnailService {
    file_service: Arc<FileService>,
    link_service: Arc<PublicLinkService>,
    /// Rendered thumbnails keyed by file and content hash.
    cache: Cache<(Uuid, String), Bytes>,
    config: ThumbnailConfig,
}

impl std::fmt::Debug for ThumbnailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThumbnailService")
            .field("size", &self.config.size)
            .field("cached", &self.cache.entry_count())
            .field("ffmpeg", &self.config.ffmpeg_path)
            .finish()
    }
}

impl ThumbnailService {
    /// Creates a new thumbnail service.
    pub fn new(
        file_service: Arc<FileService>,
        link_service: Arc<PublicLinkService>,
        config: ThumbnailConfig,
    ) -> Self {
        Self {
            file_service,
            link_service,
            cache: Cache::builder().max_capacity(config.cache_capacity).build(),
            config,
        }
    }

    /// Thumbnail of a file the caller can read.
    pub async fn thumbnail(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
    ) -> Result<Thumbnail, AppError> {
        let file = self
            .file_service
            .authorize(ctx, file_id, FilePermission::Read)
            .await?;
        self.render(&file).await
    }

    /// Thumbnail of the file behind a public link.
    pub async fn public_thumbnail(
        &self,
        token: &str,
        password: Option<&str>,
    ) -> Result<Thumbnail, AppError> {
        let (_, file) = self.link_service.resolve(token, password).await?;
        self.render(&file).await
    }

    async fn render(&self, file: &DriveFile) -> Result<Thumbnail, AppError> {
        let key = (file.id, file.hash.clone());
        if let Some(data) = self.cache.get(&key).await {
            debug!(file_id = %file.id, "Thumbnail cache hit");
            return Ok(jpeg(data));
        }

        let mime = MimeType::parse(&file.content_type)?;
        let ffmpeg = self
            .config
            .ffmpeg_path
            .as_deref()
            .filter(|_| mime.is_video());
        let data = if mime.is_image() {
            let content = self.file_service.read_content(file).await?.data;
            let (size, quality) = (self.config.size, self.config.jpeg_quality);
            tokio::task::spawn_blocking(move || render_image(&content, size, quality))
                .await
                .map_err(|e| AppError::internal(format!("Thumbnail task failed: {e}")))??
        } else if let Some(ffmpeg) = ffmpeg {
            let content = self.file_service.read_content(file).await?.data;
            render_video(ffmpeg, &content, self.config.size).await?
        } else {
            return Err(AppError::not_found(format!(
                "No thumbnail available for {mime}"
            )));
        };

        let data = Bytes::from(data);
        self.cache.insert(key, data.clone()).await;
        Ok(jpeg(data))
    }
}

fn jpeg(data: Bytes) -> Thumbnail {
    Thumbnail {
        data,
        content_type: THUMBNAIL_CONTENT_TYPE,
    }
}

/// Center-crop `data` to a `size`×`size` JPEG.
pub fn render_image(data: &[u8], size: u32, quality: u8) -> Result<Vec<u8>, AppError> {
    let img = image::load_from_memory(data)
        .map_err(|e| AppError::validation(format!("Failed to decode image: {e}")))?;

    let thumb = image::DynamicImage::ImageRgb8(
        img.resize_to_fill(size, size, FilterType::Triangle).to_rgb8(),
    );

    let mut buf = Vec::new();
    thumb
        .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))
        .map_err(|e| AppError::internal(format!("Failed to encode thumbnail: {e}")))?;
    Ok(buf)
}

/// Grab the frame at one second with ffmpeg, scaled and cropped to `size`.
async fn render_video(ffmpeg: &str, data: &[u8], size: u32) -> Result<Vec<u8>, AppError> {
    // ffmpeg needs a seekable input for most containers.
    let input = std::env::temp_dir().join(format!("booble-thumb-{}", Uuid::new_v4().simple()));
    tokio::fs::write(&input, data).await?;

    let filter = format!(
        "scale={size}:{size}:force_original_aspect_ratio=increase,crop={size}:{size}"
    );
    let output = tokio::process::Command::new(ffmpeg)
        .args(["-v", "error", "-ss", "1", "-i"])
        .arg(&input)
        .args(["-frames:v", "1", "-vf", &filter, "-f", "image2", "-c:v", "mjpeg", "pipe:1"])
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await;

    let _ = tokio::fs::remove_file(&input).await;

    let output = output.map_err(|e| {
        AppError::external(format!("Failed to run ffmpeg at '{ffmpeg}': {e}"))
    })?;
    if !output.status.success() || output.stdout.is_empty() {
        warn!(
            status = %output.status,
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            "ffmpeg produced no thumbnail"
        );
        return Err(AppError::not_found("No thumbnail available for this video"));
    }
    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, _| image::Rgb([(x % 255) as u8, 0, 0]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_render_image_is_square_jpeg() {
        let out = render_image(&png(300, 120), 100, 80).unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.dimensions(), (100, 100));
    }

    #[test]
    fn test_render_small_image_is_upscaled() {
        let out = render_image(&png(10, 30), 64, 90).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        assert_eq!(decoded.dimensions(), (64, 64));
    }

    #[test]
    fn test_render_rejects_garbage() {
        let err = render_image(b"definitely not an image", 100, 80).unwrap_err();
        assert_eq!(err.kind, booble_core::error::ErrorKind::Validation);
    }
}
