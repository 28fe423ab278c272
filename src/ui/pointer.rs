use iced::{mouse, touch, Event, Point};

use crate::interaction::{PointerEvent, PointerPhase};

/// A window event reduced to what the interaction engine cares about.
/// Mouse releases carry no position, so it is optional here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPointer {
    pub position: Option<Point>,
    pub phase: PointerPhase,
}

impl RawPointer {
    pub fn at(position: Point, phase: PointerPhase) -> Self {
        Self {
            position: Some(position),
            phase,
        }
    }
}

/// Normalize window-level mouse and touch input for an active drag.
/// Presses are not handled here; the canvas reports those with a hit target.
pub fn normalize(event: &Event) -> Option<RawPointer> {
    match event {
        Event::Mouse(mouse::Event::CursorMoved { position }) => {
            Some(RawPointer::at(*position, PointerPhase::Move))
        }
        Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => Some(RawPointer {
            position: None,
            phase: PointerPhase::Up,
        }),
        Event::Touch(touch::Event::FingerMoved { position, .. }) => {
            Some(RawPointer::at(*position, PointerPhase::Move))
        }
        Event::Touch(touch::Event::FingerLifted { position, .. }) => {
            Some(RawPointer::at(*position, PointerPhase::Up))
        }
        Event::Touch(touch::Event::FingerLost { position, .. }) => {
            Some(RawPointer::at(*position, PointerPhase::Cancel))
        }
        _ => None,
    }
}

/// Remembers the last known pointer position so position-less events
/// can still be handed to the engine
#[derive(Debug, Clone, Copy)]
pub struct PointerTracker {
    last: Point,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self { last: Point::ORIGIN }
    }
}

impl PointerTracker {
    pub fn resolve(&mut self, raw: RawPointer) -> PointerEvent {
        if let Some(position) = raw.position {
            self.last = position;
        }
        PointerEvent::new(self.last.x, self.last.y, raw.phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_and_touch_normalize_alike() {
        let mouse_move = normalize(&Event::Mouse(mouse::Event::CursorMoved {
            position: Point::new(10.0, 20.0),
        }));
        let finger_move = normalize(&Event::Touch(touch::Event::FingerMoved {
            id: touch::Finger(0),
            position: Point::new(10.0, 20.0),
        }));
        assert_eq!(mouse_move, finger_move);

        let lost = normalize(&Event::Touch(touch::Event::FingerLost {
            id: touch::Finger(0),
            position: Point::new(1.0, 1.0),
        }))
        .unwrap();
        assert_eq!(lost.phase, PointerPhase::Cancel);

        assert!(normalize(&Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left))).is_none());
    }

    #[test]
    fn test_release_uses_last_position() {
        let mut tracker = PointerTracker::default();
        tracker.resolve(RawPointer::at(Point::new(40.0, 60.0), PointerPhase::Move));

        let release = normalize(&Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left))).unwrap();
        let event = tracker.resolve(release);
        assert_eq!(event, PointerEvent::up(40.0, 60.0));
    }
}
