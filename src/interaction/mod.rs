/// Interaction engine
///
/// Turns pointer streams and toolbar controls into placement updates:
/// - Pointer abstraction shared by mouse and touch (pointer.rs)
/// - Drag state machine and control handling (engine.rs)

pub mod engine;
pub mod pointer;

pub use engine::{ControlInput, DragState, InteractionEngine};
pub use pointer::{PointerEvent, PointerPhase, PointerTarget};
