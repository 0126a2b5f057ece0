//! Directory listing for source images and converted pages

use crate::types::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Extensions accepted as page images (compared case-insensitively)
pub const SUPPORTED_IMAGE_EXTENSIONS: [&str; 5] = ["tif", "tiff", "png", "jpg", "jpeg"];

/// Lower-cased extension of a path, if any
pub(crate) fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

pub fn is_supported_image(path: &Path) -> bool {
    extension(path).is_some_and(|ext| SUPPORTED_IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Regular files in `dir` accepted by `keep`, sorted by file name
async fn list_files(dir: &Path, keep: impl Fn(&Path) -> bool) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_file() && keep(&path) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Page images in `dir`, in page order
///
/// Two images with the same stem would convert to the same page file and are
/// rejected.
pub async fn list_images(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let images = list_files(dir.as_ref(), is_supported_image).await?;

    {
        let mut stems = HashMap::new();
        for image in &images {
            let stem = image.file_stem().unwrap_or_default();
            if let Some(previous) = stems.insert(stem, image) {
                return Err(ConvertError::Config(format!(
                    "{} and {} would both become page {}.pdf",
                    previous.display(),
                    image.display(),
                    stem.to_string_lossy()
                )));
            }
        }
    }

    Ok(images)
}

/// Converted single-page PDFs in `dir`, in page order
pub async fn list_pages(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    list_files(dir.as_ref(), |path| extension(path).as_deref() == Some("pdf")).await
}

/// File stems of `paths`, the text outline labels are read from
pub fn page_stems(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|path| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
        .collect()
}
