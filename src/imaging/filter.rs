/// Naive light-background removal
///
/// Every pixel whose red, green and blue channels are all above the
/// threshold becomes fully transparent. There is no flood fill and no
/// edge smoothing: white pixels inside a garment are cleared too.

use image::RgbaImage;
use tokio::task;

use crate::error::{ImageOrigin, StudioError, StudioResult};
use crate::state::data::PixelData;

/// Threshold used when the settings file does not override it
pub const DEFAULT_THRESHOLD: u8 = 240;

/// Clear the alpha of near-white pixels in place
pub fn remove_light_background_in_place(image: &mut RgbaImage, threshold: u8) -> usize {
    let mut cleared = 0;
    for pixel in image.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        if r > threshold && g > threshold && b > threshold {
            pixel.0[3] = 0;
            cleared += 1;
        }
    }
    cleared
}

/// Same dimensions out, only alpha ever changes
#[cfg(test)]
pub fn remove_light_background(image: &RgbaImage, threshold: u8) -> RgbaImage {
    let mut output = image.clone();
    remove_light_background_in_place(&mut output, threshold);
    output
}

/// Decode, filter and re-encode as PNG
pub fn remove_light_background_pixels(
    pixels: &PixelData,
    threshold: u8,
    origin: ImageOrigin,
) -> StudioResult<PixelData> {
    let mut image = pixels.decode(origin)?;
    let cleared = remove_light_background_in_place(&mut image, threshold);
    log::debug!(
        "Cleared {} of {} pixels (threshold {})",
        cleared,
        image.width() as u64 * image.height() as u64,
        threshold
    );
    PixelData::from_rgba(&image)
}

/// Run the filter on the blocking pool so the UI keeps handling input
pub async fn remove_light_background_async(
    pixels: PixelData,
    threshold: u8,
    origin: ImageOrigin,
) -> StudioResult<PixelData> {
    task::spawn_blocking(move || remove_light_background_pixels(&pixels, threshold, origin))
        .await
        .map_err(|e| StudioError::Task(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn sample() -> RgbaImage {
        let mut image = RgbaImage::new(3, 2);
        image.put_pixel(0, 0, Rgba([255, 255, 255, 255])); // white
        image.put_pixel(1, 0, Rgba([241, 241, 241, 128])); // just above, half alpha
        image.put_pixel(2, 0, Rgba([240, 250, 250, 255])); // red at threshold
        image.put_pixel(0, 1, Rgba([250, 250, 10, 255])); // yellow
        image.put_pixel(1, 1, Rgba([12, 40, 200, 77])); // dark blue
        image.put_pixel(2, 1, Rgba([255, 255, 255, 0])); // already transparent
        image
    }

    #[test]
    fn test_clears_only_pixels_above_threshold() {
        let output = remove_light_background(&sample(), DEFAULT_THRESHOLD);

        assert_eq!(output.dimensions(), (3, 2));
        assert_eq!(output.get_pixel(0, 0), &Rgba([255, 255, 255, 0]));
        assert_eq!(output.get_pixel(1, 0), &Rgba([241, 241, 241, 0]));
        assert_eq!(output.get_pixel(2, 0), &Rgba([240, 250, 250, 255]));
        assert_eq!(output.get_pixel(0, 1), &Rgba([250, 250, 10, 255]));
        assert_eq!(output.get_pixel(1, 1), &Rgba([12, 40, 200, 77]));
        assert_eq!(output.get_pixel(2, 1), &Rgba([255, 255, 255, 0]));
    }

    #[test]
    fn test_never_touches_rgb_or_raises_alpha() {
        let input = sample();
        for threshold in [0u8, 10, 128, 240, 254, 255] {
            let output = remove_light_background(&input, threshold);
            for (before, after) in input.pixels().zip(output.pixels()) {
                assert_eq!(before.0[..3], after.0[..3]);
                assert!(after.0[3] <= before.0[3]);
                let [r, g, b, _] = before.0;
                if r <= threshold || g <= threshold || b <= threshold {
                    assert_eq!(before, after);
                }
            }
        }
    }

    #[test]
    fn test_isolated_interior_white_is_cleared() {
        let mut image = RgbaImage::from_pixel(3, 3, Rgba([20, 20, 120, 255]));
        image.put_pixel(1, 1, Rgba([255, 255, 255, 255]));

        let output = remove_light_background(&image, DEFAULT_THRESHOLD);
        assert_eq!(output.get_pixel(1, 1).0[3], 0);
        assert_eq!(output.get_pixel(0, 0).0[3], 255);
    }

    #[tokio::test]
    async fn test_async_filter_produces_new_pixels() {
        let pixels = PixelData::from_rgba(&sample()).unwrap();
        let filtered = remove_light_background_async(pixels.clone(), DEFAULT_THRESHOLD, ImageOrigin::Local)
            .await
            .unwrap();

        assert_ne!(filtered.id(), pixels.id());
        assert_eq!((filtered.width(), filtered.height()), (3, 2));
        let decoded = filtered.decode(ImageOrigin::Local).unwrap();
        assert_eq!(decoded.get_pixel(0, 0).0[3], 0);
    }

    #[tokio::test]
    async fn test_async_filter_rejects_undecodable_bytes() {
        let broken = PixelData::unchecked(b"\x89PNG garbage".to_vec(), 3, 2);

        let result = remove_light_background_async(broken, DEFAULT_THRESHOLD, ImageOrigin::External).await;
        assert!(matches!(
            result,
            Err(StudioError::ImageDecode {
                origin: ImageOrigin::External,
                ..
            })
        ));
    }
}
