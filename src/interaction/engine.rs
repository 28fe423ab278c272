/// Drag state machine and toolbar controls
///
/// The engine owns no placements. It is handed the session's
/// `Placements` on every call and turns input into model updates.

use super::pointer::{PointerEvent, PointerPhase, PointerTarget};
use crate::error::{StudioError, StudioResult};
use crate::state::data::PlacementId;
use crate::state::placement::{LayerDirection, PlacementPatch, Placements};

/// Current drag state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        item: PlacementId,
        /// Pointer position at press time, device pixels
        pointer_origin: (f32, f32),
        /// Item position at press time, canvas percent
        item_origin: (f32, f32),
    },
}

/// Discrete toolbar input for the selected item
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlInput {
    /// Width slider, percent of canvas width
    Resize(f32),
    /// Rotation slider, degrees
    Rotate(f32),
    Layer(LayerDirection),
    Delete,
}

/// Ranges enforced by the sliders
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlLimits {
    pub min_width: f32,
    pub max_width: f32,
    pub rotation_limit: f32,
}

impl Default for ControlLimits {
    fn default() -> Self {
        Self {
            min_width: 10.0,
            max_width: 100.0,
            rotation_limit: 180.0,
        }
    }
}

impl ControlLimits {
    /// Ranges `clamp` can use: finite, `0 < min_width <= max_width`,
    /// `rotation_limit >= 0`
    pub fn is_valid(&self) -> bool {
        self.min_width.is_finite()
            && self.max_width.is_finite()
            && self.rotation_limit.is_finite()
            && self.min_width > 0.0
            && self.min_width <= self.max_width
            && self.rotation_limit >= 0.0
    }
}

#[derive(Debug, Default)]
pub struct InteractionEngine {
    state: DragState,
    /// Rendered canvas size in device pixels
    canvas_size: (f32, f32),
    limits: ControlLimits,
}

impl InteractionEngine {
    pub fn new(limits: ControlLimits) -> Self {
        let limits = if limits.is_valid() {
            limits
        } else {
            log::warn!("Ignoring unusable control limits {:?}", limits);
            ControlLimits::default()
        };

        Self {
            limits,
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn limits(&self) -> ControlLimits {
        self.limits
    }

    /// Record the canvas's current rendered size
    pub fn set_canvas_size(&mut self, width: f32, height: f32) {
        self.canvas_size = (width, height);
    }

    /// Feed one pointer sample.
    ///
    /// `target` is only consulted for presses; `None` counts as the empty
    /// canvas. Returns true if the placement model changed.
    pub fn handle_pointer(
        &mut self,
        placements: &mut Placements,
        event: PointerEvent,
        target: Option<PointerTarget>,
    ) -> bool {
        match event.phase {
            PointerPhase::Down => self.press(placements, event, target.unwrap_or(PointerTarget::Canvas)),
            PointerPhase::Move => self.drag_to(placements, event),
            PointerPhase::Up | PointerPhase::Cancel => {
                self.release();
                false
            }
        }
    }

    /// End any drag without touching the model
    pub fn release(&mut self) {
        if self.is_dragging() {
            log::debug!("Drag ended");
        }
        self.state = DragState::Idle;
    }

    /// Apply a slider or button to one placement. Does not touch drag
    /// state unless the dragged item is deleted.
    pub fn apply_control(
        &mut self,
        placements: &mut Placements,
        id: PlacementId,
        input: ControlInput,
    ) -> StudioResult<()> {
        match input {
            ControlInput::Resize(width) => {
                let width = width.clamp(self.limits.min_width, self.limits.max_width);
                placements.update(id, PlacementPatch::width(width))
            }
            ControlInput::Rotate(degrees) => {
                let limit = self.limits.rotation_limit;
                placements.update(id, PlacementPatch::rotation(degrees.clamp(-limit, limit)))
            }
            ControlInput::Layer(direction) => placements.change_layer(id, direction),
            ControlInput::Delete => {
                self.forget(id);
                placements.remove(id).map(|_| ())
            }
        }
    }

    /// Stop tracking an item that is going away
    pub fn forget(&mut self, id: PlacementId) {
        if matches!(self.state, DragState::Dragging { item, .. } if item == id) {
            self.release();
        }
    }

    fn press(&mut self, placements: &mut Placements, event: PointerEvent, target: PointerTarget) -> bool {
        let before = placements.revision();

        match target {
            PointerTarget::Item(id) => match placements.get(id).map(|item| (item.x, item.y)) {
                Some(item_origin) => {
                    placements.select(Some(id));
                    // A press while already dragging re-anchors on the new item
                    self.state = DragState::Dragging {
                        item: id,
                        pointer_origin: (event.x, event.y),
                        item_origin,
                    };
                    log::debug!("Drag started on {}", id);
                }
                None => {
                    log::debug!("Press on stale placement {}", id);
                    placements.select(None);
                    self.state = DragState::Idle;
                }
            },
            PointerTarget::Canvas => {
                placements.select(None);
                self.state = DragState::Idle;
            }
        }

        placements.revision() != before
    }

    fn drag_to(&mut self, placements: &mut Placements, event: PointerEvent) -> bool {
        let DragState::Dragging {
            item,
            pointer_origin,
            item_origin,
        } = self.state
        else {
            return false;
        };

        let (width, height) = self.canvas_size;
        if width <= 0.0 || height <= 0.0 {
            return false;
        }

        let delta_x = (event.x - pointer_origin.0) / width * 100.0;
        let delta_y = (event.y - pointer_origin.1) / height * 100.0;
        let patch = PlacementPatch::position(item_origin.0 + delta_x, item_origin.1 + delta_y);

        match placements.update(item, patch) {
            Ok(()) => true,
            Err(StudioError::NotFound(_)) => {
                log::debug!("Dragged placement {} is gone, ending drag", item);
                self.state = DragState::Idle;
                false
            }
            Err(e) => {
                log::warn!("Drag update failed: {}", e);
                false
            }
        }
    }
}
