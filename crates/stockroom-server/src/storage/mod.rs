//! Local filesystem storage for seal images
//!
//! A seal is the photo of an item's inventory sticker. It is stored once per
//! item code as `<dir>/<code><ext>`; history rows record only `<ext>`.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::{self, File};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tracing::{debug, info, instrument};

use crate::config::SealConfig;

#[derive(Debug, Error)]
pub enum SealError {
    #[error("Seal must be an image, got '{0}'")]
    InvalidAttachmentType(String),

    #[error("Invalid seal key '{0}'")]
    InvalidKey(String),

    #[error("Failed to write seal: {0}")]
    Io(#[from] std::io::Error),
}

/// An uploaded file as received from a multipart request
#[derive(Debug)]
pub struct SealUpload {
    pub filename: String,
    pub mime_type: Option<String>,
    pub content: File,
}

impl SealUpload {
    pub fn new(filename: impl Into<String>, mime_type: Option<String>, content: File) -> Self {
        Self {
            filename: filename.into(),
            mime_type,
            content,
        }
    }

    /// `.ext` of the uploaded filename, or an empty string when it has none
    pub fn extension(&self) -> String {
        Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default()
    }

    /// Reject anything whose MIME type is not `image/*`
    pub fn check_type(&self) -> Result<(), SealError> {
        match self.mime_type.as_deref() {
            Some(mime) if mime.starts_with("image/") => Ok(()),
            other => Err(SealError::InvalidAttachmentType(
                other.unwrap_or("unknown").to_string(),
            )),
        }
    }
}

/// Reject keys that are empty or could escape the seal directory
pub fn check_key(key: &str) -> Result<(), SealError> {
    if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
        return Err(SealError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct SealStorage {
    dir: PathBuf,
}

impl SealStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config(config: &SealConfig) -> Self {
        Self::new(config.dir.clone())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Location of the seal stored under `key` with extension `ext`
    pub fn path_for(&self, key: &str, ext: &str) -> PathBuf {
        self.dir.join(format!("{}{}", key, ext))
    }

    /// Copy `upload` to `<dir>/<key><ext>` and return `ext`
    ///
    /// The upload is rewound first, so the same upload can be stored under
    /// several keys. The file is synced to disk before returning.
    #[instrument(skip(self, upload), fields(filename = %upload.filename))]
    pub async fn store(&self, upload: &mut SealUpload, key: &str) -> Result<String, SealError> {
        upload.check_type()?;
        check_key(key)?;

        fs::create_dir_all(&self.dir).await?;
        upload.content.seek(SeekFrom::Start(0)).await?;

        let ext = upload.extension();
        let path = self.path_for(key, &ext);
        debug!(path = %path.display(), "Writing seal");

        let mut dest = File::create(&path).await?;
        let bytes = tokio::io::copy(&mut upload.content, &mut dest).await?;
        dest.flush().await?;
        dest.sync_all().await?;

        info!(key, bytes, "Seal stored");
        Ok(ext)
    }
}
