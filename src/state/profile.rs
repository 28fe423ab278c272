/// Profile photos: at most one per role, one of them active
use super::data::{BasePhoto, PhotoId, PhotoRole};

#[derive(Debug, Default)]
pub struct Profile {
    photos: Vec<BasePhoto>,
    active: Option<PhotoId>,
}

impl Profile {
    pub fn new(photos: Vec<BasePhoto>) -> Self {
        let mut profile = Self::default();
        for photo in photos {
            profile.set(photo);
        }
        profile
    }

    /// Add a photo, replacing whatever was stored for its role.
    ///
    /// A front photo always becomes active; other roles only when
    /// nothing else is.
    pub fn set(&mut self, photo: BasePhoto) {
        let replaced = self.photos.iter().position(|p| p.role == photo.role);
        if let Some(index) = replaced {
            let old = self.photos.remove(index);
            if self.active == Some(old.id) {
                self.active = None;
            }
        }

        if photo.role == PhotoRole::Front || self.active.is_none() {
            self.active = Some(photo.id);
        }
        self.photos.push(photo);
    }

    /// Remove the photo for a role. If it was active, the first
    /// remaining photo takes over.
    pub fn remove(&mut self, role: PhotoRole) -> Option<BasePhoto> {
        let index = self.photos.iter().position(|p| p.role == role)?;
        let removed = self.photos.remove(index);

        if self.active == Some(removed.id) || self.photos.is_empty() {
            self.active = self.photos.first().map(|p| p.id);
        }
        Some(removed)
    }

    pub fn select(&mut self, id: PhotoId) {
        if self.photos.iter().any(|p| p.id == id) {
            self.active = Some(id);
        }
    }

    pub fn active(&self) -> Option<&BasePhoto> {
        self.active.and_then(|id| self.photos.iter().find(|p| p.id == id))
    }

    pub fn by_role(&self, role: PhotoRole) -> Option<&BasePhoto> {
        self.photos.iter().find(|p| p.role == role)
    }

    pub fn photos(&self) -> &[BasePhoto] {
        &self.photos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::PixelData;
    use image::{Rgba, RgbaImage};
    use std::path::PathBuf;

    fn photo(role: PhotoRole) -> BasePhoto {
        BasePhoto {
            id: PhotoId::new(),
            role,
            path: PathBuf::from(format!("{}.png", role.as_str())),
            pixels: PixelData::from_rgba(&RgbaImage::from_pixel(1, 2, Rgba([1, 2, 3, 255]))).unwrap(),
        }
    }

    #[test]
    fn test_one_photo_per_role() {
        let mut profile = Profile::default();
        profile.set(photo(PhotoRole::Side));
        let newer = photo(PhotoRole::Side);
        let newer_id = newer.id;
        profile.set(newer);

        assert_eq!(profile.photos().len(), 1);
        assert_eq!(profile.by_role(PhotoRole::Side).unwrap().id, newer_id);
        assert_eq!(profile.active().unwrap().id, newer_id);
    }

    #[test]
    fn test_front_photo_takes_over() {
        let mut profile = Profile::default();
        profile.set(photo(PhotoRole::Back));
        let front = photo(PhotoRole::Front);
        let front_id = front.id;
        profile.set(front);
        profile.set(photo(PhotoRole::Side));

        assert_eq!(profile.active().unwrap().id, front_id);
    }

    #[test]
    fn test_removing_active_falls_back_to_first_remaining() {
        let mut profile = Profile::default();
        let back = photo(PhotoRole::Back);
        let back_id = back.id;
        profile.set(back);
        profile.set(photo(PhotoRole::Front));

        profile.remove(PhotoRole::Front);
        assert_eq!(profile.active().unwrap().id, back_id);

        profile.remove(PhotoRole::Back);
        assert!(profile.active().is_none());
        assert!(profile.remove(PhotoRole::Back).is_none());
    }

    #[test]
    fn test_select_ignores_unknown_ids() {
        let mut profile = Profile::default();
        let side = photo(PhotoRole::Side);
        let side_id = side.id;
        profile.set(side);
        profile.select(PhotoId::new());
        assert_eq!(profile.active().unwrap().id, side_id);
    }
}
