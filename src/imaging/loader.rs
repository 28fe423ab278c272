/// Image loading for garments and profile photos
///
/// Reading and probing files happens on the blocking pool. `data:` links
/// are decoded in place. Web links are never fetched: they are drawn as a
/// plain placeholder card so the item can still be placed, moved and
/// bought, while its real pixels stay unreadable.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{Rgba, RgbaImage};
use std::fs;
use std::path::Path;
use tokio::task;

use crate::error::{ImageOrigin, StudioError, StudioResult};
use crate::state::data::{BasePhoto, GarmentId, ImageSource, PixelData};
use crate::state::library::PhotoRecord;

/// Load the pixels behind an image source
pub async fn load_pixels(source: ImageSource) -> StudioResult<PixelData> {
    task::spawn_blocking(move || load_pixels_blocking(&source))
        .await
        .map_err(|e| StudioError::Task(e.to_string()))?
}

/// Load a garment's image, keeping the garment id with the result
pub async fn load_garment(id: GarmentId, source: ImageSource) -> (GarmentId, StudioResult<PixelData>) {
    (id, load_pixels(source).await)
}

/// Load a stored profile photo
pub async fn load_photo(record: PhotoRecord) -> StudioResult<BasePhoto> {
    let pixels = load_pixels(ImageSource::File(record.path.clone())).await?;
    Ok(BasePhoto {
        id: record.id,
        role: record.role,
        path: record.path,
        pixels,
    })
}

/// Load every stored photo, skipping (and logging) the unreadable ones
pub async fn load_photos(records: Vec<PhotoRecord>) -> Vec<BasePhoto> {
    let mut photos = Vec::with_capacity(records.len());
    for record in records {
        let path = record.path.clone();
        match load_photo(record).await {
            Ok(photo) => photos.push(photo),
            Err(e) => log::warn!("Skipping profile photo {}: {}", path.display(), e),
        }
    }
    photos
}

fn load_pixels_blocking(source: &ImageSource) -> StudioResult<PixelData> {
    match source {
        ImageSource::File(path) => read_file(path),
        ImageSource::Link(url) if source.is_inline() => decode_data_link(url),
        ImageSource::Link(url) => link_placeholder(url),
    }
}

/// Decode a `data:<mime>;base64,<payload>` link
fn decode_data_link(link: &str) -> StudioResult<PixelData> {
    let (header, payload) = link
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| StudioError::decode(ImageOrigin::Local, "malformed data link"))?;

    if !header.ends_with(";base64") {
        return Err(StudioError::decode(ImageOrigin::Local, "only base64 data links are supported"));
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| StudioError::decode(ImageOrigin::Local, e))?;
    PixelData::from_bytes(bytes, ImageOrigin::Local)
}

/// Card size for web links, portrait like most garment shots
const PLACEHOLDER_SIZE: (u32, u32) = (120, 160);
const PLACEHOLDER_BORDER: u32 = 3;

fn link_placeholder(url: &str) -> StudioResult<PixelData> {
    log::info!("Drawing a placeholder for linked image {}", url);

    let (width, height) = PLACEHOLDER_SIZE;
    let card = RgbaImage::from_fn(width, height, |x, y| {
        let edge = x < PLACEHOLDER_BORDER
            || y < PLACEHOLDER_BORDER
            || x >= width - PLACEHOLDER_BORDER
            || y >= height - PLACEHOLDER_BORDER;
        if edge {
            Rgba([107, 114, 128, 255])
        } else {
            Rgba([229, 231, 235, 220])
        }
    });
    PixelData::from_rgba(&card)
}

fn read_file(path: &Path) -> StudioResult<PixelData> {
    let bytes = fs::read(path)
        .map_err(|e| StudioError::decode(ImageOrigin::Local, format!("{}: {}", path.display(), e)))?;
    let pixels = PixelData::from_bytes(bytes, ImageOrigin::Local)?;

    log::debug!(
        "Loaded {} ({}x{})",
        path.display(),
        pixels.width(),
        pixels.height()
    );
    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::{PhotoId, PhotoRole};
    use image::{Rgba, RgbaImage};
    use std::path::PathBuf;

    fn temp_png() -> PathBuf {
        let path = std::env::temp_dir().join(format!("style-studio-loader-{}.png", uuid::Uuid::new_v4()));
        RgbaImage::from_pixel(6, 3, Rgba([9, 9, 9, 255])).save(&path).unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_file() {
        let path = temp_png();
        let pixels = load_pixels(ImageSource::File(path.clone())).await.unwrap();
        assert_eq!((pixels.width(), pixels.height()), (6, 3));
        let _ = fs::remove_file(path);
    }

    #[tokio::test]
    async fn test_missing_file_is_local_decode_failure() {
        let result = load_pixels(ImageSource::File(PathBuf::from("/nonexistent/shirt.png"))).await;
        assert!(matches!(
            result,
            Err(StudioError::ImageDecode {
                origin: ImageOrigin::Local,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_web_links_load_as_placeholder() {
        let id = GarmentId::new();
        let (loaded_id, result) = load_garment(id, ImageSource::Link("https://shop.example/a.png".into())).await;
        assert_eq!(loaded_id, id);

        let pixels = result.unwrap();
        assert_eq!((pixels.width(), pixels.height()), PLACEHOLDER_SIZE);
    }

    #[tokio::test]
    async fn test_data_links_decode_inline() {
        let mut bytes = Vec::new();
        RgbaImage::from_pixel(5, 7, Rgba([1, 2, 3, 255]))
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        let link = format!("data:image/png;base64,{}", STANDARD.encode(&bytes));

        let pixels = load_pixels(ImageSource::from_link(&link)).await.unwrap();
        assert_eq!((pixels.width(), pixels.height()), (5, 7));

        for broken in ["data:image/png;base64,@@@", "data:image/png,plain", "data:nocomma"] {
            let result = load_pixels(ImageSource::Link(broken.into())).await;
            assert!(matches!(
                result,
                Err(StudioError::ImageDecode {
                    origin: ImageOrigin::Local,
                    ..
                })
            ));
        }
    }

    #[tokio::test]
    async fn test_load_photos_skips_unreadable() {
        let path = temp_png();
        let records = vec![
            PhotoRecord {
                id: PhotoId::new(),
                role: PhotoRole::Front,
                path: path.clone(),
            },
            PhotoRecord {
                id: PhotoId::new(),
                role: PhotoRole::Back,
                path: PathBuf::from("/nonexistent/back.jpg"),
            },
        ];

        let photos = load_photos(records).await;
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].role, PhotoRole::Front);
        let _ = fs::remove_file(path);
    }
}
