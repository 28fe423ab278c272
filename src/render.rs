/// Draw instructions for the fitting canvas
///
/// The session emits an ordered list of what to draw; the canvas widget
/// turns percentages into device pixels and paints. Geometry helpers
/// live here so hit testing and painting agree on where an item is.

use crate::state::data::{PixelData, PlacementId};
use crate::state::placement::Placements;

/// One placement to paint, in draw order
#[derive(Debug, Clone, PartialEq)]
pub struct DrawInstruction {
    pub placement: PlacementId,
    pub pixels: PixelData,
    /// Center, percent of canvas width
    pub x: f32,
    /// Center, percent of canvas height
    pub y: f32,
    /// Percent of canvas width; height follows the image aspect
    pub width: f32,
    /// Degrees, clockwise
    pub rotation: f32,
    pub selected: bool,
}

/// A placement resolved to device pixels, relative to the canvas origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemFrame {
    pub center_x: f32,
    pub center_y: f32,
    pub width: f32,
    pub height: f32,
    /// Radians, clockwise in a y-down space
    pub rotation: f32,
}

impl ItemFrame {
    /// Whether a canvas-local point falls inside the rotated rectangle
    pub fn contains(&self, x: f32, y: f32) -> bool {
        let dx = x - self.center_x;
        let dy = y - self.center_y;
        let (sin, cos) = self.rotation.sin_cos();

        // Undo the rotation
        let local_x = dx * cos + dy * sin;
        let local_y = -dx * sin + dy * cos;

        local_x.abs() <= self.width / 2.0 && local_y.abs() <= self.height / 2.0
    }
}

impl DrawInstruction {
    pub fn frame(&self, canvas_width: f32, canvas_height: f32) -> ItemFrame {
        let width = self.width / 100.0 * canvas_width;
        ItemFrame {
            center_x: self.x / 100.0 * canvas_width,
            center_y: self.y / 100.0 * canvas_height,
            width,
            height: width * self.pixels.aspect(),
            rotation: self.rotation.to_radians(),
        }
    }
}

/// Everything to paint, ascending z-index, ties in insertion order
pub fn draw_list(placements: &Placements) -> Vec<DrawInstruction> {
    let selected = placements.selected();
    placements
        .in_draw_order()
        .into_iter()
        .map(|item| DrawInstruction {
            placement: item.id,
            pixels: item.rendered.clone(),
            x: item.x,
            y: item.y,
            width: item.width,
            rotation: item.rotation,
            selected: selected == Some(item.id),
        })
        .collect()
}

/// Topmost placement under a canvas-local point
pub fn hit_test(
    instructions: &[DrawInstruction],
    x: f32,
    y: f32,
    canvas_width: f32,
    canvas_height: f32,
) -> Option<PlacementId> {
    instructions
        .iter()
        .rev()
        .find(|instruction| instruction.frame(canvas_width, canvas_height).contains(x, y))
        .map(|instruction| instruction.placement)
}

/// Fit an image inside the canvas keeping its aspect ratio, centered.
/// Returns (x, y, width, height) in canvas pixels.
pub fn contain(image_width: u32, image_height: u32, canvas_width: f32, canvas_height: f32) -> (f32, f32, f32, f32) {
    if image_width == 0 || image_height == 0 || canvas_width <= 0.0 || canvas_height <= 0.0 {
        return (0.0, 0.0, 0.0, 0.0);
    }

    let scale = (canvas_width / image_width as f32).min(canvas_height / image_height as f32);
    let width = image_width as f32 * scale;
    let height = image_height as f32 * scale;

    (
        (canvas_width - width) / 2.0,
        (canvas_height - height) / 2.0,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::GarmentId;
    use crate::state::placement::{LayerDirection, PlacementPatch};
    use image::{Rgba, RgbaImage};

    fn square() -> PixelData {
        PixelData::from_rgba(&RgbaImage::from_pixel(10, 10, Rgba([90, 90, 90, 255]))).unwrap()
    }

    #[test]
    fn test_empty_session_draws_nothing() {
        let placements = Placements::default();
        assert!(draw_list(&placements).is_empty());
    }

    #[test]
    fn test_draw_list_follows_z_then_insertion() {
        let mut placements = Placements::default();
        let a = placements.add(GarmentId::new(), square());
        let b = placements.add(GarmentId::new(), square());
        let c = placements.add(GarmentId::new(), square());
        placements.change_layer(c, LayerDirection::Down).unwrap();
        placements.update(a, PlacementPatch::z_index(5)).unwrap();

        let list = draw_list(&placements);
        let order: Vec<PlacementId> = list.iter().map(|i| i.placement).collect();
        assert_eq!(order, vec![b, c, a]);
        assert_eq!(list.iter().filter(|i| i.selected).count(), 1);
        assert!(list.iter().find(|i| i.placement == c).unwrap().selected);
    }

    #[test]
    fn test_frame_uses_canvas_width_for_size() {
        let mut placements = Placements::default();
        placements.add(GarmentId::new(), square());
        let list = draw_list(&placements);

        let frame = list[0].frame(1000.0, 500.0);
        assert_eq!((frame.center_x, frame.center_y), (500.0, 250.0));
        assert_eq!((frame.width, frame.height), (300.0, 300.0));
    }

    #[test]
    fn test_rotated_frame_contains() {
        let frame = ItemFrame {
            center_x: 0.0,
            center_y: 0.0,
            width: 100.0,
            height: 10.0,
            rotation: 90f32.to_radians(),
        };
        // Now tall and thin
        assert!(frame.contains(0.0, 45.0));
        assert!(!frame.contains(45.0, 0.0));
    }

    #[test]
    fn test_hit_test_prefers_topmost() {
        let mut placements = Placements::default();
        let below = placements.add(GarmentId::new(), square());
        let above = placements.add(GarmentId::new(), square());
        let list = draw_list(&placements);

        assert_eq!(hit_test(&list, 500.0, 500.0, 1000.0, 1000.0), Some(above));

        placements.change_layer(above, LayerDirection::Down).unwrap();
        placements.change_layer(above, LayerDirection::Down).unwrap();
        let list = draw_list(&placements);
        assert_eq!(hit_test(&list, 500.0, 500.0, 1000.0, 1000.0), Some(below));
        assert_eq!(hit_test(&list, 10.0, 10.0, 1000.0, 1000.0), None);
    }

    #[test]
    fn test_contain_letterboxes() {
        assert_eq!(contain(100, 200, 400.0, 400.0), (100.0, 0.0, 200.0, 400.0));
        assert_eq!(contain(0, 200, 400.0, 400.0), (0.0, 0.0, 0.0, 0.0));
    }
}
