use iced::widget::canvas::{self, Path, Program, Stroke};
use iced::widget::image::Handle;
use iced::mouse::{self, Cursor};
use iced::{alignment, touch, Color, Point, Rectangle, Renderer, Size, Theme, Vector};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::interaction::{PointerEvent, PointerTarget};
use crate::render::{self, DrawInstruction};
use crate::state::data::{BasePhoto, PixelData};
use crate::Message;

/// Image handles for decoded pixel buffers, keyed by buffer id.
/// Building a handle copies the encoded bytes once; the GPU upload is
/// then cached by iced for as long as the handle lives.
#[derive(Debug, Default)]
pub struct HandleCache {
    handles: HashMap<Uuid, Handle>,
}

impl HandleCache {
    pub fn ensure(&mut self, pixels: &PixelData) {
        self.handles
            .entry(pixels.id())
            .or_insert_with(|| Handle::from_bytes(pixels.bytes().to_vec()));
    }

    pub fn get(&self, pixels: &PixelData) -> Option<&Handle> {
        self.handles.get(&pixels.id())
    }

    /// Drop handles whose buffers are no longer displayed
    pub fn retain(&mut self, live: &HashSet<Uuid>) {
        self.handles.retain(|id, _| live.contains(id));
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }
}

/// The fitting room canvas: base photo, then every placed garment in
/// draw order
pub struct FittingCanvas<'a> {
    pub photo: Option<&'a BasePhoto>,
    /// Back to front
    pub instructions: Vec<DrawInstruction>,
    pub handles: &'a HandleCache,
    pub cache: &'a canvas::Cache,
}

const BACKDROP: Color = Color::from_rgb(0.976, 0.980, 0.984);
const SELECTION: Color = Color::from_rgb(0.231, 0.510, 0.965);
const PLACEHOLDER: Color = Color::from_rgb(0.612, 0.639, 0.686);

impl<'a> Program<Message> for FittingCanvas<'a> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let geometry = self.cache.draw(renderer, bounds.size(), |frame| {
            frame.fill_rectangle(Point::ORIGIN, frame.size(), BACKDROP);

            match self.photo {
                Some(photo) => {
                    if let Some(handle) = self.handles.get(&photo.pixels) {
                        let (x, y, width, height) = render::contain(
                            photo.pixels.width(),
                            photo.pixels.height(),
                            bounds.width,
                            bounds.height,
                        );
                        frame.draw_image(
                            Rectangle::new(Point::new(x, y), Size::new(width, height)),
                            canvas::Image::new(handle.clone()),
                        );
                    }
                }
                None => {
                    frame.fill_text(canvas::Text {
                        content: "Add a profile photo to see garments on you".to_string(),
                        position: Point::new(bounds.width / 2.0, bounds.height / 2.0),
                        color: PLACEHOLDER,
                        size: 16.0.into(),
                        horizontal_alignment: alignment::Horizontal::Center,
                        vertical_alignment: alignment::Vertical::Center,
                        ..canvas::Text::default()
                    });
                }
            }

            if self.instructions.is_empty() && self.photo.is_some() {
                frame.fill_text(canvas::Text {
                    content: "Add items from your wardrobe".to_string(),
                    position: Point::new(bounds.width / 2.0, bounds.height - 24.0),
                    color: PLACEHOLDER,
                    size: 14.0.into(),
                    horizontal_alignment: alignment::Horizontal::Center,
                    vertical_alignment: alignment::Vertical::Center,
                    ..canvas::Text::default()
                });
            }

            for instruction in &self.instructions {
                let Some(handle) = self.handles.get(&instruction.pixels) else {
                    continue;
                };
                let item = instruction.frame(bounds.width, bounds.height);

                frame.with_save(|frame| {
                    frame.translate(Vector::new(item.center_x, item.center_y));
                    frame.rotate(item.rotation);

                    let rect = Rectangle::new(
                        Point::new(-item.width / 2.0, -item.height / 2.0),
                        Size::new(item.width, item.height),
                    );
                    frame.draw_image(rect, canvas::Image::new(handle.clone()));

                    if instruction.selected {
                        let outline = Path::rectangle(
                            Point::new(rect.x - 4.0, rect.y - 4.0),
                            Size::new(rect.width + 8.0, rect.height + 8.0),
                        );
                        frame.stroke(&outline, Stroke::default().with_color(SELECTION).with_width(2.0));
                    }
                });
            }
        });

        vec![geometry]
    }

    fn update(
        &self,
        _state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        // Only presses are handled here. Moves and releases are picked up at
        // window level while a drag is live, so dragging off the canvas works.
        let position = match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                cursor.position_over(bounds)
            }
            canvas::Event::Touch(touch::Event::FingerPressed { position, .. }) if bounds.contains(position) => {
                Some(position)
            }
            _ => None,
        };

        let Some(position) = position else {
            return (canvas::event::Status::Ignored, None);
        };

        let local = position - bounds.position();
        let target = match render::hit_test(&self.instructions, local.x, local.y, bounds.width, bounds.height) {
            Some(id) => PointerTarget::Item(id),
            None => PointerTarget::Canvas,
        };

        (
            canvas::event::Status::Captured,
            Some(Message::PointerPressed {
                event: PointerEvent::down(position.x, position.y),
                target,
                canvas: bounds.size(),
            }),
        )
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        let over_item = cursor.position_in(bounds).is_some_and(|local| {
            render::hit_test(&self.instructions, local.x, local.y, bounds.width, bounds.height).is_some()
        });

        if over_item {
            mouse::Interaction::Grab
        } else {
            mouse::Interaction::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_handle_cache_keeps_only_live_buffers() {
        let a = PixelData::from_rgba(&RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]))).unwrap();
        let b = PixelData::from_rgba(&RgbaImage::from_pixel(1, 1, Rgba([9, 9, 9, 255]))).unwrap();

        let mut cache = HandleCache::default();
        cache.ensure(&a);
        cache.ensure(&a);
        cache.ensure(&b);
        assert_eq!(cache.len(), 2);

        cache.retain(&HashSet::from([b.id()]));
        assert!(cache.get(&a).is_none());
        assert!(cache.get(&b).is_some());
    }
}
