use std::path::{Path, PathBuf};
use tracing::{error, info, instrument};

use crate::config::AppConfig;
use crate::shared::AppError;

/// Largest accepted image
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
/// URL prefix the upload directory is served under
pub const PUBLIC_URL_PREFIX: &str = "/uploads/fotos";

const ALLOWED_IMAGE_TYPES: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub dir: PathBuf,
    pub max_bytes: usize,
}

/// A file written to the upload directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub filename: String,
    pub url: String,
}

impl UploadConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_bytes: MAX_UPLOAD_BYTES,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.upload_dir.clone())
    }

    /// Validates and writes an uploaded image, returning its public URL
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn store(
        &self,
        original_name: Option<&str>,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<StoredFile, AppError> {
        if !content_type.is_some_and(is_allowed_image) {
            return Err(AppError::BadRequest(
                "Only image files are allowed (jpg, jpeg, png, gif, webp)".to_string(),
            ));
        }
        if bytes.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }
        if bytes.len() > self.max_bytes {
            return Err(AppError::BadRequest(format!(
                "File exceeds the {} MiB limit",
                self.max_bytes / (1024 * 1024)
            )));
        }

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            error!(dir = %self.dir.display(), error = %e, "Failed to create upload directory");
            AppError::Internal
        })?;

        let filename = generate_filename(original_name);
        let path = self.dir.join(&filename);
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to write uploaded file");
            AppError::Internal
        })?;

        info!(%filename, "Photo file stored");
        Ok(StoredFile {
            url: format!("{PUBLIC_URL_PREFIX}/{filename}"),
            filename,
        })
    }
}

/// Accepts `image/<subtype>` for the supported subtypes
pub fn is_allowed_image(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    match essence.split_once('/') {
        Some(("image", subtype)) => ALLOWED_IMAGE_TYPES.contains(&subtype),
        _ => false,
    }
}

/// `foto-<unix millis>-<random><.ext>`, keeping the original extension
pub fn generate_filename(original_name: Option<&str>) -> String {
    let extension = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = rand::random::<u32>() % 1_000_000_000;
    format!("foto-{millis}-{suffix}{extension}")
}
