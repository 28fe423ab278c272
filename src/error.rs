/// Error types for the fitting room
///
/// Nothing in here is fatal to a session. Stale ids are absorbed,
/// everything else becomes a dismissable notice in the UI.

use thiserror::Error;

use crate::state::data::{GarmentId, PlacementId};

/// Where an image that failed to decode came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageOrigin {
    /// A file in the application data directory
    Local,
    /// A link the user pasted; its pixels may not be readable at all
    External,
}

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("failed to decode image: {reason}")]
    ImageDecode { origin: ImageOrigin, reason: String },

    #[error("placement {0} not found")]
    NotFound(PlacementId),

    #[error("garment {0} is not in the wardrobe")]
    UnknownGarment(GarmentId),

    #[error("no product link available for this item")]
    MissingLink,

    #[error(transparent)]
    Storage(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Settings(#[from] serde_json::Error),

    #[error("background task failed: {0}")]
    Task(String),
}

impl StudioError {
    pub fn decode(origin: ImageOrigin, reason: impl ToString) -> Self {
        StudioError::ImageDecode {
            origin,
            reason: reason.to_string(),
        }
    }

    /// Stale references caused by a concurrent delete
    pub fn is_benign(&self) -> bool {
        matches!(self, StudioError::NotFound(_))
    }

    /// Text shown to the user in the notice bar
    pub fn notice(&self) -> String {
        match self {
            StudioError::ImageDecode {
                origin: ImageOrigin::External,
                ..
            } => "Could not process image. If this is an external link, try uploading the file instead."
                .to_string(),
            StudioError::ImageDecode { .. } => "Could not process image.".to_string(),
            StudioError::MissingLink => "No product link available for this item.".to_string(),
            StudioError::UnknownGarment(_) => "That item is no longer in your wardrobe.".to_string(),
            other => other.to_string(),
        }
    }
}

pub type StudioResult<T> = Result<T, StudioError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_external_decode_notice_mentions_link() {
        let err = StudioError::decode(ImageOrigin::External, "cross-origin");
        assert!(err.notice().contains("external link"));
        assert!(!err.is_benign());
    }

    #[test]
    fn test_not_found_is_benign() {
        let err = StudioError::NotFound(PlacementId(Uuid::new_v4()));
        assert!(err.is_benign());
    }
}
