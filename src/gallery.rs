use crate::error::{CodeBeastError, Result};
use crate::imaging::GeneratedImage;
use crate::models::GalleryEntry;
use image::{DynamicImage, ImageFormat};
use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const GENERATED_PREFIX: &str = "generated_";
const PIXELATED_PREFIX: &str = "pixelated_";
const EXTENSION: &str = ".png";

/// URL prefix the temp directory is served under
pub const TEMP_URL_PREFIX: &str = "/static/temp";

/// Files written for one generation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedImage {
    pub path: PathBuf,
    pub url: String,
    pub pixelated_path: Option<PathBuf>,
    pub pixelated_url: Option<String>,
}

/// Restrict a handle to characters that are safe in a file name
pub fn sanitize_handle(handle: &str) -> String {
    let cleaned: String = handle
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}

pub fn generated_file_name(handle: &str) -> String {
    format!("{}{}{}", GENERATED_PREFIX, sanitize_handle(handle), EXTENSION)
}

pub fn pixelated_file_name(handle: &str) -> String {
    format!("{}{}{}", PIXELATED_PREFIX, sanitize_handle(handle), EXTENSION)
}

/// Generated images on disk, one file per GitHub handle.
///
/// Saving for a handle replaces whatever was there; concurrent saves for the
/// same handle are last-write-wins.
#[derive(Debug, Clone)]
pub struct TempImageStore {
    dir: PathBuf,
}

impl TempImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        TempImageStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    pub async fn save(&self, handle: &str, generated: &GeneratedImage) -> Result<SavedImage> {
        self.ensure_dir().await?;

        let file_name = generated_file_name(handle);
        let path = self.dir.join(&file_name);
        write_png(&path, &generated.image).await?;
        info!("Saved generated image to {}", path.display());

        let (pixelated_path, pixelated_url) = match &generated.pixelated {
            Some(pixelated) => {
                let pixel_name = pixelated_file_name(handle);
                let pixel_path = self.dir.join(&pixel_name);
                write_png(&pixel_path, pixelated).await?;
                debug!("Saved pixelated image to {}", pixel_path.display());
                (Some(pixel_path), Some(file_url(&pixel_name)))
            }
            None => {
                remove_if_exists(&self.dir.join(pixelated_file_name(handle))).await?;
                (None, None)
            }
        };

        Ok(SavedImage {
            path,
            url: file_url(&file_name),
            pixelated_path,
            pixelated_url,
        })
    }

    /// Every generated image, sorted by username
    pub async fn list(&self) -> Result<Vec<GalleryEntry>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut gallery = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let Some(username) = file_name
                .strip_prefix(GENERATED_PREFIX)
                .and_then(|rest| rest.strip_suffix(EXTENSION))
            else {
                continue;
            };
            if username.is_empty() {
                continue;
            }
            gallery.push(GalleryEntry {
                username: username.to_string(),
                image_url: file_url(file_name),
            });
        }

        gallery.sort_by(|a, b| a.username.cmp(&b.username));
        info!("Found {} CodeBeasts in the gallery", gallery.len());
        Ok(gallery)
    }
}

fn file_url(file_name: &str) -> String {
    format!("{}/{}", TEMP_URL_PREFIX, file_name)
}

async fn write_png(path: &Path, image: &DynamicImage) -> Result<()> {
    let image = image.clone();
    let encoded = tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        image.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    })
    .await
    .map_err(|e| CodeBeastError::Runtime(format!("Image encoding task failed: {}", e)))??;

    tokio::fs::write(path, encoded).await?;
    Ok(())
}

async fn remove_if_exists(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!("Removed stale {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}
