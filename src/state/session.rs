/// A single visit to the fitting room
///
/// Owns the placed items, the interaction engine and a snapshot of the
/// wardrobe. Nothing here is persisted: entering the studio starts a
/// fresh session and leaving it drops everything.

use std::collections::HashSet;

use super::data::{GarmentId, GarmentRecord, PixelData, PlacementId};
use super::placement::{PlacementPatch, Placements};
use super::settings::Settings;
use crate::error::{ImageOrigin, StudioError, StudioResult};
use crate::imaging::filter;
use crate::interaction::{ControlInput, InteractionEngine, PointerEvent, PointerTarget};
use crate::render::{self, DrawInstruction};

/// Background removal work captured from a placement, ready to run off
/// the UI thread
#[derive(Debug, Clone)]
pub struct BackgroundJob {
    pub placement: PlacementId,
    pub pixels: PixelData,
    pub threshold: u8,
    pub origin: ImageOrigin,
}

impl BackgroundJob {
    pub async fn run(self) -> (PlacementId, StudioResult<PixelData>) {
        // Web links are drawn from a stand-in; their real pixels are out of reach
        if self.origin == ImageOrigin::External {
            return (
                self.placement,
                Err(StudioError::decode(ImageOrigin::External, "linked image pixels are not readable")),
            );
        }
        let result = filter::remove_light_background_async(self.pixels, self.threshold, self.origin).await;
        (self.placement, result)
    }
}

/// How a finished background job was merged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    Applied,
    /// The placement was deleted while the job ran
    Discarded,
}

#[derive(Debug)]
pub struct FittingSession {
    placements: Placements,
    engine: InteractionEngine,
    catalog: Vec<GarmentRecord>,
    threshold: u8,
    /// Placements with a background job in flight
    processing: HashSet<PlacementId>,
}

impl FittingSession {
    pub fn new(catalog: Vec<GarmentRecord>, settings: &Settings) -> Self {
        log::info!("Fitting session started with {} garments", catalog.len());
        Self {
            placements: Placements::new(settings.placement_defaults()),
            engine: InteractionEngine::new(settings.control_limits()),
            catalog,
            threshold: settings.background_threshold,
            processing: HashSet::new(),
        }
    }

    /// Refresh the wardrobe snapshot. Placements of deleted garments stay
    /// on the canvas as orphans.
    pub fn set_catalog(&mut self, catalog: Vec<GarmentRecord>) {
        self.catalog = catalog;
    }

    pub fn catalog(&self) -> &[GarmentRecord] {
        &self.catalog
    }

    /// Placing needs at least one garment
    pub fn can_place(&self) -> bool {
        !self.catalog.is_empty()
    }

    pub fn garment(&self, id: GarmentId) -> Option<&GarmentRecord> {
        self.catalog.iter().find(|g| g.id == id)
    }

    /// The garment behind a placement, if it still exists
    pub fn garment_for(&self, id: PlacementId) -> Option<&GarmentRecord> {
        self.placements.get(id).and_then(|item| self.garment(item.garment_id))
    }

    /// Put a loaded garment image on the canvas
    pub fn place(&mut self, garment_id: GarmentId, pixels: PixelData) -> StudioResult<PlacementId> {
        if self.garment(garment_id).is_none() {
            return Err(StudioError::UnknownGarment(garment_id));
        }
        Ok(self.placements.add(garment_id, pixels))
    }

    pub fn placements(&self) -> &Placements {
        &self.placements
    }

    pub fn engine(&self) -> &InteractionEngine {
        &self.engine
    }

    pub fn is_dragging(&self) -> bool {
        self.engine.is_dragging()
    }

    pub fn set_canvas_size(&mut self, width: f32, height: f32) {
        self.engine.set_canvas_size(width, height);
    }

    pub fn handle_pointer(&mut self, event: PointerEvent, target: Option<PointerTarget>) -> bool {
        self.engine.handle_pointer(&mut self.placements, event, target)
    }

    pub fn apply_control(&mut self, id: PlacementId, input: ControlInput) -> StudioResult<()> {
        self.engine.apply_control(&mut self.placements, id, input)
    }

    /// Apply a control to the current selection, if any
    pub fn apply_to_selected(&mut self, input: ControlInput) -> StudioResult<()> {
        match self.placements.selected() {
            Some(id) => self.apply_control(id, input),
            None => Ok(()),
        }
    }

    /// Snapshot what the filter needs. The placement stays fully
    /// editable while the job runs.
    pub fn begin_background_removal(&mut self, id: PlacementId) -> StudioResult<BackgroundJob> {
        let item = self.placements.get(id).ok_or(StudioError::NotFound(id))?;
        let origin = self
            .garment(item.garment_id)
            .map(|g| g.source.origin())
            .unwrap_or(ImageOrigin::Local);

        let job = BackgroundJob {
            placement: id,
            pixels: item.rendered.clone(),
            threshold: self.threshold,
            origin,
        };
        self.processing.insert(id);
        log::debug!("Background removal queued for {}", id);
        Ok(job)
    }

    /// Merge a finished job. Only the rendered image is replaced; any
    /// drag or slider change made meanwhile is kept.
    pub fn finish_background_removal(&mut self, id: PlacementId, pixels: PixelData) -> StudioResult<FilterOutcome> {
        self.processing.remove(&id);

        match self.placements.update(id, PlacementPatch::rendered(pixels)) {
            Ok(()) => {
                log::info!("Background removed for placement {}", id);
                Ok(FilterOutcome::Applied)
            }
            Err(StudioError::NotFound(_)) => {
                log::debug!("Placement {} deleted before its filter finished", id);
                Ok(FilterOutcome::Discarded)
            }
            Err(e) => Err(e),
        }
    }

    /// The filter failed; the placement is left exactly as it is
    pub fn abandon_background_removal(&mut self, id: PlacementId) {
        self.processing.remove(&id);
        log::debug!("Background removal abandoned for {}", id);
    }

    pub fn is_processing(&self, id: PlacementId) -> bool {
        self.processing.contains(&id)
    }

    /// Product link for a placement's garment
    pub fn buy(&self, id: PlacementId) -> StudioResult<String> {
        if !self.placements.contains(id) {
            return Err(StudioError::NotFound(id));
        }
        self.garment_for(id)
            .and_then(|g| g.purchase_link())
            .map(str::to_string)
            .ok_or(StudioError::MissingLink)
    }

    pub fn draw_list(&self) -> Vec<DrawInstruction> {
        render::draw_list(&self.placements)
    }
}

impl Drop for FittingSession {
    fn drop(&mut self) {
        log::info!("Fitting session ended with {} placements", self.placements.len());
    }
}
