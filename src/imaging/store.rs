/// Copies picked image files into the application's data directory
///
/// Uploads are copied rather than referenced so the wardrobe and
/// profile keep working if the user moves or deletes the original.

use std::path::{Path, PathBuf};

use crate::error::{ImageOrigin, StudioResult};
use crate::state::data::PixelData;
use crate::state::library;

/// Directory holding copied uploads
pub fn images_dir() -> PathBuf {
    library::data_dir().join("images")
}

/// Validate and copy an image into `dir`, returning the new path
pub async fn import_image(source: PathBuf, dir: PathBuf) -> StudioResult<PathBuf> {
    let bytes = tokio::fs::read(&source).await?;

    // Reject anything that is not an image before keeping a copy
    PixelData::from_bytes(bytes.clone(), ImageOrigin::Local)?;

    tokio::fs::create_dir_all(&dir).await?;
    let extension = source
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| "img".to_string());
    let target = dir.join(format!("{}.{}", uuid::Uuid::new_v4(), extension));
    tokio::fs::write(&target, bytes).await?;

    log::info!("Imported {} as {}", source.display(), target.display());
    Ok(target)
}

/// Delete a copied upload. Files outside `dir` are never touched.
pub async fn discard(path: PathBuf, dir: PathBuf) {
    if !is_within(&path, &dir) {
        return;
    }
    if let Err(e) = tokio::fs::remove_file(&path).await {
        log::warn!("Could not delete {}: {}", path.display(), e);
    }
}

/// Display name for an uploaded file
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "Untitled".to_string())
}

fn is_within(path: &Path, dir: &Path) -> bool {
    path.parent().map(|parent| parent == dir).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("style-studio-store-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_import_copies_valid_image() {
        let dir = scratch_dir();
        let source = std::env::temp_dir().join(format!("{}.PNG", uuid::Uuid::new_v4()));
        RgbaImage::from_pixel(2, 2, Rgba([1, 1, 1, 255]))
            .save_with_format(&source, image::ImageFormat::Png)
            .unwrap();

        let copied = import_image(source.clone(), dir.clone()).await.unwrap();
        assert!(copied.exists());
        assert_eq!(copied.parent().unwrap(), dir.as_path());
        assert_eq!(copied.extension().unwrap(), "png");

        discard(copied.clone(), dir.clone()).await;
        assert!(!copied.exists());

        // Outside the directory: left alone
        discard(source.clone(), dir.clone()).await;
        assert!(source.exists());

        let _ = std::fs::remove_file(source);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_import_rejects_non_images() {
        let dir = scratch_dir();
        let source = std::env::temp_dir().join(format!("{}.txt", uuid::Uuid::new_v4()));
        std::fs::write(&source, "hello").unwrap();

        assert!(import_image(source.clone(), dir.clone()).await.is_err());
        assert!(!dir.exists());

        let _ = std::fs::remove_file(source);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(Path::new("/x/y/shirt.png")), "shirt.png");
    }
}
