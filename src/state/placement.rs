/// Placement model: garment images positioned on the fitting canvas
///
/// Positions and sizes are percentages of the canvas so a session
/// survives window resizes. The model never clamps: sliders enforce
/// their own ranges, and items may be dragged off-canvas.

use super::data::{GarmentId, PixelData, PlacementId};
use crate::error::{StudioError, StudioResult};

/// Default values for newly placed items
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementDefaults {
    pub x: f32,
    pub y: f32,
    pub width: f32,
}

impl Default for PlacementDefaults {
    fn default() -> Self {
        Self {
            x: 50.0,
            y: 50.0,
            width: 30.0,
        }
    }
}

/// One garment image positioned on the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedItem {
    pub id: PlacementId,
    /// Weak reference into the wardrobe; the garment may be deleted later
    pub garment_id: GarmentId,
    /// Center position, percent of canvas width
    pub x: f32,
    /// Center position, percent of canvas height
    pub y: f32,
    /// Percent of canvas width
    pub width: f32,
    /// Degrees, clockwise
    pub rotation: f32,
    pub z_index: i32,
    /// What actually gets drawn. Starts as the garment's image and is
    /// replaced when a background filter runs on this placement.
    pub rendered: PixelData,
}

/// A partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct PlacementPatch {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub rotation: Option<f32>,
    pub z_index: Option<i32>,
    pub rendered: Option<PixelData>,
}

impl PlacementPatch {
    pub fn position(x: f32, y: f32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn width(width: f32) -> Self {
        Self {
            width: Some(width),
            ..Self::default()
        }
    }

    pub fn rotation(rotation: f32) -> Self {
        Self {
            rotation: Some(rotation),
            ..Self::default()
        }
    }

    pub fn z_index(z_index: i32) -> Self {
        Self {
            z_index: Some(z_index),
            ..Self::default()
        }
    }

    pub fn rendered(pixels: PixelData) -> Self {
        Self {
            rendered: Some(pixels),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_none()
            && self.y.is_none()
            && self.width.is_none()
            && self.rotation.is_none()
            && self.z_index.is_none()
            && self.rendered.is_none()
    }

    fn apply(self, item: &mut PlacedItem) {
        if let Some(x) = self.x {
            item.x = x;
        }
        if let Some(y) = self.y {
            item.y = y;
        }
        if let Some(width) = self.width {
            item.width = width;
        }
        if let Some(rotation) = self.rotation {
            item.rotation = rotation;
        }
        if let Some(z_index) = self.z_index {
            item.z_index = z_index;
        }
        if let Some(rendered) = self.rendered {
            item.rendered = rendered;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerDirection {
    Up,
    Down,
}

/// The placed-item collection of one fitting session
///
/// Items are kept in insertion order, which doubles as the tie-breaker
/// for equal z-index values when drawing.
#[derive(Debug, Default)]
pub struct Placements {
    items: Vec<PlacedItem>,
    selected: Option<PlacementId>,
    defaults: PlacementDefaults,
    /// Bumped on every mutation, including selection changes
    revision: u64,
}

impl Placements {
    pub fn new(defaults: PlacementDefaults) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    /// Place a garment with default geometry on top of everything else.
    /// The new placement becomes the selection.
    pub fn add(&mut self, garment_id: GarmentId, pixels: PixelData) -> PlacementId {
        let z_index = self.items.iter().map(|item| item.z_index).max().unwrap_or(0) + 1;
        let id = PlacementId::new();

        self.items.push(PlacedItem {
            id,
            garment_id,
            x: self.defaults.x,
            y: self.defaults.y,
            width: self.defaults.width,
            rotation: 0.0,
            z_index,
            rendered: pixels,
        });
        self.selected = Some(id);
        self.touch();

        log::debug!("Placed garment {} as {} (z={})", garment_id, id, z_index);
        id
    }

    /// Remove a placement. Other z-index values are left as they are.
    pub fn remove(&mut self, id: PlacementId) -> StudioResult<PlacedItem> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(StudioError::NotFound(id))?;

        let removed = self.items.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.touch();

        log::debug!("Removed placement {}", id);
        Ok(removed)
    }

    /// Merge the provided fields into one placement
    pub fn update(&mut self, id: PlacementId, patch: PlacementPatch) -> StudioResult<()> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(StudioError::NotFound(id))?;

        if patch.is_empty() {
            return Ok(());
        }

        patch.apply(item);
        self.touch();
        Ok(())
    }

    /// Move a placement one step up or down the stack.
    ///
    /// Only this item's z-index changes, so two items can end up sharing
    /// a value; insertion order then decides which one is drawn first.
    pub fn change_layer(&mut self, id: PlacementId, direction: LayerDirection) -> StudioResult<()> {
        let current = self.get(id).ok_or(StudioError::NotFound(id))?.z_index;
        let z_index = match direction {
            LayerDirection::Up => current + 1,
            LayerDirection::Down => current - 1,
        };
        self.update(id, PlacementPatch::z_index(z_index))
    }

    /// Set or clear the selection. Selecting a stale id clears it.
    pub fn select(&mut self, id: Option<PlacementId>) {
        let id = id.filter(|id| self.contains(*id));
        if self.selected != id {
            self.selected = id;
            self.touch();
        }
    }

    pub fn selected(&self) -> Option<PlacementId> {
        self.selected
    }

    pub fn selected_item(&self) -> Option<&PlacedItem> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: PlacementId) -> Option<&PlacedItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: PlacementId) -> bool {
        self.get(id).is_some()
    }

    /// Items in insertion order
    pub fn items(&self) -> &[PlacedItem] {
        &self.items
    }

    /// Items in draw order: ascending z-index, ties by insertion order
    pub fn in_draw_order(&self) -> Vec<&PlacedItem> {
        let mut ordered: Vec<&PlacedItem> = self.items.iter().collect();
        // sort_by_key is stable
        ordered.sort_by_key(|item| item.z_index);
        ordered
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
