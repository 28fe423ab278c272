/// Device-independent pointer input
///
/// Mouse and touch input both arrive here as a `PointerEvent`; the
/// adapter in `ui::pointer` does the normalizing.

use crate::state::data::PlacementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// A pointer sample in device pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    pub phase: PointerPhase,
}

impl PointerEvent {
    pub fn new(x: f32, y: f32, phase: PointerPhase) -> Self {
        Self { x, y, phase }
    }

    pub fn down(x: f32, y: f32) -> Self {
        Self::new(x, y, PointerPhase::Down)
    }

    #[cfg(test)]
    pub fn moved(x: f32, y: f32) -> Self {
        Self::new(x, y, PointerPhase::Move)
    }

    #[cfg(test)]
    pub fn up(x: f32, y: f32) -> Self {
        Self::new(x, y, PointerPhase::Up)
    }
}

/// What a pointer-down landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Item(PlacementId),
    /// Empty canvas area, or the base photo
    Canvas,
}
