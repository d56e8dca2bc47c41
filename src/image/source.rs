//! Loading the image a style-transfer request starts from.

use crate::error::{GenImgError, Result};
use crate::image::types::{sniff_mime_type, InlineImage};
use std::time::Duration;

/// Assumed for downloads that declare no usable type.
const FALLBACK_REMOTE_MIME: &str = "image/jpeg";

/// Assumed for local files whose bytes are not recognized.
const FALLBACK_LOCAL_MIME: &str = "image/png";

/// Loads an input image from an `http(s)://` URL or a local path.
///
/// Downloads take the MIME type from `Content-Type`; files are sniffed.
pub async fn load_input_image(location: &str, timeout: Duration) -> Result<InlineImage> {
    let image = if is_remote(location) {
        fetch(location, timeout).await?
    } else {
        read_file(location)?
    };

    if image.data.is_empty() {
        return Err(failed(location, "image is empty"));
    }
    tracing::info!(
        mime_type = %image.mime_type,
        size_bytes = image.size(),
        "loaded input image"
    );
    Ok(image)
}

fn is_remote(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

async fn fetch(url: &str, timeout: Duration) -> Result<InlineImage> {
    tracing::debug!(%url, "fetching input image");
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| GenImgError::from_reqwest(e, timeout))?;

    let status = response.status();
    if !status.is_success() {
        return Err(failed(url, &format!("HTTP {status}")));
    }

    let declared = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::trim)
        .filter(|v| v.starts_with("image/"))
        .map(str::to_string);

    let data = response
        .bytes()
        .await
        .map_err(|e| GenImgError::from_reqwest(e, timeout))?
        .to_vec();

    let mime_type = declared
        .or_else(|| sniff_mime_type(&data).map(str::to_string))
        .unwrap_or_else(|| FALLBACK_REMOTE_MIME.to_string());
    Ok(InlineImage::new(mime_type, data))
}

fn read_file(path: &str) -> Result<InlineImage> {
    let data = std::fs::read(path).map_err(|e| failed(path, &e.to_string()))?;
    let mime_type = sniff_mime_type(&data).unwrap_or(FALLBACK_LOCAL_MIME);
    Ok(InlineImage::new(mime_type, data))
}

fn failed(location: &str, reason: &str) -> GenImgError {
    GenImgError::InputImage {
        location: location.to_string(),
        reason: reason.to_string(),
    }
}
