/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the record store, the fitting session and the UI layer.

use std::fmt;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use image::{ImageFormat, ImageReader, RgbaImage};
use uuid::Uuid;

use crate::error::{ImageOrigin, StudioError, StudioResult};

/// Identifies one placement inside a fitting session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlacementId(pub Uuid);

/// Identifies a garment in the wardrobe catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GarmentId(pub Uuid);

/// Identifies a profile photo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhotoId(pub Uuid);

impl PlacementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlacementId {
    fn default() -> Self {
        Self::new()
    }
}

impl GarmentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GarmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotoId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PhotoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlacementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for GarmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Encoded image bytes plus their dimensions
///
/// Cloning is cheap: the bytes are shared. Every distinct image gets
/// its own `id`, which the UI uses to cache decoded handles.
#[derive(Clone)]
pub struct PixelData {
    id: Uuid,
    bytes: Arc<Vec<u8>>,
    width: u32,
    height: u32,
}

impl PixelData {
    /// Wrap encoded bytes (PNG, JPEG, ...) after probing their header
    pub fn from_bytes(bytes: Vec<u8>, origin: ImageOrigin) -> StudioResult<Self> {
        let (width, height) = ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(|e| StudioError::decode(origin, e))?
            .into_dimensions()
            .map_err(|e| StudioError::decode(origin, e))?;

        if width == 0 || height == 0 {
            return Err(StudioError::decode(origin, "image has no pixels"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            bytes: Arc::new(bytes),
            width,
            height,
        })
    }

    /// Encode an RGBA buffer as PNG so the alpha channel survives
    pub fn from_rgba(image: &RgbaImage) -> StudioResult<Self> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| StudioError::decode(ImageOrigin::Local, e))?;

        Ok(Self {
            id: Uuid::new_v4(),
            bytes: Arc::new(bytes),
            width: image.width(),
            height: image.height(),
        })
    }

    #[cfg(test)]
    pub(crate) fn unchecked(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            bytes: Arc::new(bytes),
            width,
            height,
        }
    }

    /// Fully decode into an RGBA buffer
    pub fn decode(&self, origin: ImageOrigin) -> StudioResult<RgbaImage> {
        let image = image::load_from_memory(&self.bytes).map_err(|e| StudioError::decode(origin, e))?;
        Ok(image.to_rgba8())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Height divided by width
    pub fn aspect(&self) -> f32 {
        self.height as f32 / self.width as f32
    }
}

impl PartialEq for PixelData {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for PixelData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelData")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Which side of the person a profile photo shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhotoRole {
    Front,
    Side,
    Back,
}

impl PhotoRole {
    pub const ALL: [PhotoRole; 3] = [PhotoRole::Front, PhotoRole::Side, PhotoRole::Back];

    /// Column value in the record store
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoRole::Front => "FRONT",
            PhotoRole::Side => "SIDE",
            PhotoRole::Back => "BACK",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "FRONT" => Some(PhotoRole::Front),
            "SIDE" => Some(PhotoRole::Side),
            "BACK" => Some(PhotoRole::Back),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PhotoRole::Front => "Front View",
            PhotoRole::Side => "Side View",
            PhotoRole::Back => "Back View",
        }
    }
}

/// A photo of the user that garments are placed over
#[derive(Debug, Clone)]
pub struct BasePhoto {
    pub id: PhotoId,
    pub role: PhotoRole,
    /// Copy of the uploaded file in the data directory
    pub path: PathBuf,
    pub pixels: PixelData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GarmentCategory {
    #[default]
    Top,
    Bottom,
    Shoes,
    Accessory,
    FullBody,
}

impl GarmentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            GarmentCategory::Top => "top",
            GarmentCategory::Bottom => "bottom",
            GarmentCategory::Shoes => "shoes",
            GarmentCategory::Accessory => "accessory",
            GarmentCategory::FullBody => "full-body",
        }
    }

    /// Unknown values fall back to `Top`
    pub fn parse(value: &str) -> Self {
        match value {
            "bottom" => GarmentCategory::Bottom,
            "shoes" => GarmentCategory::Shoes,
            "accessory" => GarmentCategory::Accessory,
            "full-body" => GarmentCategory::FullBody,
            _ => GarmentCategory::Top,
        }
    }
}

/// Where a garment's image lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A file on disk (uploads are copied into the data directory)
    File(PathBuf),
    /// A pasted link, stored as-is. `data:` links carry their bytes
    /// inline; web links are never fetched.
    Link(String),
}

impl ImageSource {
    /// Interpret text the user pasted into the link field
    pub fn from_link(link: &str) -> Self {
        let link = link.trim();
        if let Some(path) = link.strip_prefix("file://") {
            ImageSource::File(PathBuf::from(path))
        } else if link.starts_with("http://") || link.starts_with("https://") || link.starts_with("data:") {
            ImageSource::Link(link.to_string())
        } else {
            ImageSource::File(PathBuf::from(link))
        }
    }

    /// String form stored in the record store
    pub fn location(&self) -> String {
        match self {
            ImageSource::File(path) => path.to_string_lossy().to_string(),
            ImageSource::Link(url) => url.clone(),
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self, ImageSource::Link(_))
    }

    /// A `data:` link, decodable without leaving the machine
    pub fn is_inline(&self) -> bool {
        matches!(self, ImageSource::Link(url) if url.starts_with("data:"))
    }

    pub fn origin(&self) -> ImageOrigin {
        match self {
            ImageSource::Link(_) if !self.is_inline() => ImageOrigin::External,
            _ => ImageOrigin::Local,
        }
    }
}

/// A garment in the user's wardrobe
#[derive(Debug, Clone, PartialEq)]
pub struct GarmentRecord {
    pub id: GarmentId,
    pub source: ImageSource,
    pub display_name: String,
    pub category: GarmentCategory,
    /// Link to the product purchase page
    pub purchase_url: Option<String>,
    /// Unix timestamp of when the garment was added
    pub added_at: i64,
}

impl GarmentRecord {
    /// Product link, treating blank strings as absent
    pub fn purchase_link(&self) -> Option<&str> {
        self.purchase_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_pixel_data_from_rgba_keeps_dimensions() {
        let image = RgbaImage::from_pixel(4, 2, Rgba([10, 20, 30, 255]));
        let pixels = PixelData::from_rgba(&image).unwrap();

        assert_eq!(pixels.width(), 4);
        assert_eq!(pixels.height(), 2);
        assert!((pixels.aspect() - 0.5).abs() < f32::EPSILON);

        let decoded = pixels.decode(ImageOrigin::Local).unwrap();
        assert_eq!(decoded.get_pixel(3, 1), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let result = PixelData::from_bytes(b"not an image".to_vec(), ImageOrigin::External);
        assert!(matches!(
            result,
            Err(StudioError::ImageDecode {
                origin: ImageOrigin::External,
                ..
            })
        ));
    }

    #[test]
    fn test_link_parsing() {
        assert_eq!(
            ImageSource::from_link("file:///tmp/shirt.png"),
            ImageSource::File(PathBuf::from("/tmp/shirt.png"))
        );
        assert!(ImageSource::from_link("https://shop.example/shirt.jpg").is_link());
        assert!(!ImageSource::from_link("/home/me/shirt.png").is_link());

        let inline = ImageSource::from_link("data:image/png;base64,AAAA");
        assert!(inline.is_link() && inline.is_inline());
        assert_eq!(inline.origin(), ImageOrigin::Local);
        assert_eq!(ImageSource::from_link("https://shop.example/a.png").origin(), ImageOrigin::External);
    }

    #[test]
    fn test_default_ids_are_fresh() {
        assert_ne!(GarmentId::default(), GarmentId::default());
        assert_ne!(PlacementId::default(), PlacementId::default());
        assert_ne!(PhotoId::default(), PhotoId::default());
    }

    #[test]
    fn test_blank_purchase_link_is_absent() {
        let record = GarmentRecord {
            id: GarmentId::new(),
            source: ImageSource::Link("https://shop.example/a.png".into()),
            display_name: "Web Item".into(),
            category: GarmentCategory::Top,
            purchase_url: Some("   ".into()),
            added_at: 0,
        };
        assert_eq!(record.purchase_link(), None);
    }

    #[test]
    fn test_role_round_trips_through_column_value() {
        for role in PhotoRole::ALL {
            assert_eq!(PhotoRole::parse(role.as_str()), Some(role));
        }
    }
}
