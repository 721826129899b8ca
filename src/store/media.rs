//! Thumbnail mirroring and generated-image URLs.

use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::ImportError;

/// URL of a generated dish photo, for recipes that have no thumbnail of
/// their own (chef proposals, text-only imports).
pub fn generated_image_url(dish: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(dish.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    format!(
        "https://image.pollinations.ai/prompt/delicious_{encoded}_food_photography_high_quality?width=400&height=300&nologo=true"
    )
}

/// Whether the URL points at the image generator rather than a real
/// thumbnail. Generated URLs are never mirrored: they are stable and the
/// image behind them is synthesized on demand.
pub fn is_generated(url: &str) -> bool {
    url.contains("pollinations")
}

/// Local path a record's mirrored thumbnail lives at.
pub fn mirrored_path(media_dir: &Path, id: &str) -> PathBuf {
    media_dir.join(format!("{id}.jpg"))
}

/// Mirror an externally hosted thumbnail into the media directory.
///
/// Returns the local path, or `None` when the URL is absent, generated,
/// not HTTP, or not fetchable; the caller then keeps the remote URL.
pub async fn mirror_image(url: Option<&str>, media_dir: &Path, id: &str) -> Option<String> {
    let url = url?;
    if url.is_empty() || is_generated(url) || !url.contains("http") {
        return None;
    }

    match fetch_and_store(url, media_dir, id).await {
        Ok(path) => Some(path),
        Err(e) => {
            warn!("Could not mirror {}: {}", url, e);
            None
        }
    }
}

async fn fetch_and_store(url: &str, media_dir: &Path, id: &str) -> Result<String, ImportError> {
    let response = reqwest::get(url).await?;
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(ImportError::Api { status, body });
    }
    let bytes = response.bytes().await?;

    tokio::fs::create_dir_all(media_dir).await?;
    let path = mirrored_path(media_dir, id);
    tokio::fs::write(&path, &bytes).await?;
    debug!("Mirrored {} to {}", url, path.display());
    Ok(path.to_string_lossy().into_owned())
}

/// Remove a record's mirrored thumbnail, if one exists. Best-effort: a
/// missing file is the common case (external or generated URLs).
pub async fn remove_mirrored(media_dir: &Path, id: &str) {
    let path = mirrored_path(media_dir, id);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => debug!("Removed mirrored image {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove {}: {}", path.display(), e),
    }
}
