use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult, Row};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::data::{GarmentCategory, GarmentId, GarmentRecord, ImageSource, PhotoId, PhotoRole};

/// A stored profile photo, before its pixels are loaded
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoRecord {
    pub id: PhotoId,
    pub role: PhotoRole,
    pub path: PathBuf,
}

/// The Library manages the SQLite record store.
/// It keeps the wardrobe catalog and the profile photos as flat records;
/// fitting sessions are never written here.
pub struct Library {
    conn: Connection,
    db_path: PathBuf,
}

impl Library {
    /// Open (or create) the library in the user's data directory:
    /// - Linux: ~/.local/share/style-studio/style_studio.db
    /// - macOS: ~/Library/Application Support/style-studio/style_studio.db
    /// - Windows: %APPDATA%\style-studio\style_studio.db
    pub fn open_default() -> crate::error::StudioResult<Self> {
        let db_path = data_dir().join("style_studio.db");

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Ok(Self::open(&db_path)?)
    }

    pub fn open(db_path: &Path) -> SqlResult<Self> {
        let conn = Connection::open(db_path)?;
        log::info!("Library opened at {}", db_path.display());

        let mut library = Library {
            conn,
            db_path: db_path.to_path_buf(),
        };
        library.init_schema()?;
        Ok(library)
    }

    /// In-memory library, used by tests
    pub fn open_in_memory() -> SqlResult<Self> {
        let mut library = Library {
            conn: Connection::open_in_memory()?,
            db_path: PathBuf::from(":memory:"),
        };
        library.init_schema()?;
        Ok(library)
    }

    /// Create all tables and indexes if they don't exist
    fn init_schema(&mut self) -> SqlResult<()> {
        // Wardrobe catalog
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS garments (
                id              TEXT PRIMARY KEY,
                location        TEXT NOT NULL,
                is_link         INTEGER NOT NULL DEFAULT 0,
                name            TEXT NOT NULL,
                category        TEXT NOT NULL DEFAULT 'top',
                product_url     TEXT,
                added_at        INTEGER NOT NULL
            )",
            [],
        )?;

        // Profile photos; UNIQUE role keeps one photo per role
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS photos (
                id              TEXT PRIMARY KEY,
                role            TEXT NOT NULL UNIQUE,
                path            TEXT NOT NULL,
                added_at        INTEGER NOT NULL
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_garments_added_at
             ON garments(added_at)",
            [],
        )?;

        log::debug!("Library schema initialized");
        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    // ========== Wardrobe ==========

    pub fn garment_count(&self) -> SqlResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM garments", [], |row| row.get(0))
    }

    /// Insert a garment and return the stored record
    pub fn add_garment(
        &self,
        source: ImageSource,
        name: &str,
        category: GarmentCategory,
        product_url: Option<&str>,
    ) -> SqlResult<GarmentRecord> {
        let record = GarmentRecord {
            id: GarmentId::new(),
            source,
            display_name: name.to_string(),
            category,
            purchase_url: normalize_url(product_url),
            added_at: chrono::Utc::now().timestamp(),
        };

        self.conn.execute(
            "INSERT INTO garments (id, location, is_link, name, category, product_url, added_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.id.0.to_string(),
                record.source.location(),
                record.source.is_link(),
                record.display_name,
                record.category.as_str(),
                record.purchase_url,
                record.added_at,
            ],
        )?;

        log::info!("Added garment '{}' ({})", record.display_name, record.id);
        Ok(record)
    }

    /// All garments, oldest first
    pub fn garments(&self) -> SqlResult<Vec<GarmentRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, location, is_link, name, category, product_url, added_at
             FROM garments ORDER BY added_at ASC, rowid ASC",
        )?;

        let rows = stmt.query_map([], garment_from_row)?;
        let mut garments = Vec::new();
        for garment in rows {
            match garment? {
                Some(garment) => garments.push(garment),
                None => log::warn!("Skipping garment row with a malformed id"),
            }
        }
        Ok(garments)
    }

    pub fn garment(&self, id: GarmentId) -> SqlResult<Option<GarmentRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, location, is_link, name, category, product_url, added_at
                 FROM garments WHERE id = ?1",
                params![id.0.to_string()],
                garment_from_row,
            )
            .optional()?;
        Ok(row.flatten())
    }

    /// Change the display name and product link. Returns false if the
    /// garment no longer exists.
    pub fn update_garment(&self, id: GarmentId, name: &str, product_url: Option<&str>) -> SqlResult<bool> {
        let changed = self.conn.execute(
            "UPDATE garments SET name = ?1, product_url = ?2 WHERE id = ?3",
            params![name, normalize_url(product_url), id.0.to_string()],
        )?;
        Ok(changed > 0)
    }

    pub fn delete_garment(&self, id: GarmentId) -> SqlResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM garments WHERE id = ?1", params![id.0.to_string()])?;
        if changed > 0 {
            log::info!("Deleted garment {}", id);
        }
        Ok(changed > 0)
    }

    // ========== Profile photos ==========

    /// Store the photo for a role, replacing any previous one.
    /// Returns the record that was replaced, so its file can be cleaned up.
    pub fn set_photo(&self, role: PhotoRole, path: &Path) -> SqlResult<(PhotoRecord, Option<PhotoRecord>)> {
        let previous = self.photo(role)?;
        let record = PhotoRecord {
            id: PhotoId::new(),
            role,
            path: path.to_path_buf(),
        };

        self.conn.execute(
            "INSERT INTO photos (id, role, path, added_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(role) DO UPDATE SET id = excluded.id, path = excluded.path, added_at = excluded.added_at",
            params![
                record.id.0.to_string(),
                role.as_str(),
                record.path.to_string_lossy().to_string(),
                chrono::Utc::now().timestamp(),
            ],
        )?;

        Ok((record, previous))
    }

    pub fn photo(&self, role: PhotoRole) -> SqlResult<Option<PhotoRecord>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, role, path FROM photos WHERE role = ?1",
                params![role.as_str()],
                photo_from_row,
            )
            .optional()?;
        Ok(row.flatten())
    }

    pub fn photos(&self) -> SqlResult<Vec<PhotoRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, role, path FROM photos ORDER BY added_at ASC, rowid ASC")?;
        let rows = stmt.query_map([], photo_from_row)?;

        let mut photos = Vec::new();
        for photo in rows {
            if let Some(photo) = photo? {
                photos.push(photo);
            }
        }
        Ok(photos)
    }

    pub fn remove_photo(&self, role: PhotoRole) -> SqlResult<Option<PhotoRecord>> {
        let previous = self.photo(role)?;
        self.conn
            .execute("DELETE FROM photos WHERE role = ?1", params![role.as_str()])?;
        Ok(previous)
    }
}

/// Root of the application's data directory
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir);
    path.push("style-studio");
    path
}

fn normalize_url(url: Option<&str>) -> Option<String> {
    url.map(str::trim).filter(|u| !u.is_empty()).map(str::to_string)
}

fn garment_from_row(row: &Row<'_>) -> SqlResult<Option<GarmentRecord>> {
    let id: String = row.get(0)?;
    let Ok(id) = Uuid::parse_str(&id) else {
        return Ok(None);
    };

    let location: String = row.get(1)?;
    let is_link: bool = row.get(2)?;
    let source = if is_link {
        ImageSource::Link(location)
    } else {
        ImageSource::File(PathBuf::from(location))
    };
    let category: String = row.get(4)?;

    Ok(Some(GarmentRecord {
        id: GarmentId(id),
        source,
        display_name: row.get(3)?,
        category: GarmentCategory::parse(&category),
        purchase_url: row.get(5)?,
        added_at: row.get(6)?,
    }))
}

fn photo_from_row(row: &Row<'_>) -> SqlResult<Option<PhotoRecord>> {
    let id: String = row.get(0)?;
    let role: String = row.get(1)?;
    let path: String = row.get(2)?;

    let (Ok(id), Some(role)) = (Uuid::parse_str(&id), PhotoRole::parse(&role)) else {
        return Ok(None);
    };

    Ok(Some(PhotoRecord {
        id: PhotoId(id),
        role,
        path: PathBuf::from(path),
    }))
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garment_lifecycle() {
        let library = Library::open_in_memory().unwrap();
        assert_eq!(library.garment_count().unwrap(), 0);

        let shirt = library
            .add_garment(
                ImageSource::File(PathBuf::from("/data/shirt.png")),
                "shirt.png",
                GarmentCategory::Top,
                None,
            )
            .unwrap();
        let jacket = library
            .add_garment(
                ImageSource::from_link("https://shop.example/jacket.jpg"),
                "Web Item",
                GarmentCategory::Top,
                Some("https://shop.example/jacket"),
            )
            .unwrap();

        let garments = library.garments().unwrap();
        assert_eq!(garments, vec![shirt.clone(), jacket.clone()]);
        assert!(garments[1].source.is_link());

        assert!(library
            .update_garment(shirt.id, "Blue shirt", Some("  https://shop.example/shirt "))
            .unwrap());
        let updated = library.garment(shirt.id).unwrap().unwrap();
        assert_eq!(updated.display_name, "Blue shirt");
        assert_eq!(updated.purchase_url.as_deref(), Some("https://shop.example/shirt"));

        assert!(library.update_garment(jacket.id, "Jacket", Some("")).unwrap());
        assert_eq!(library.garment(jacket.id).unwrap().unwrap().purchase_url, None);

        assert!(library.delete_garment(shirt.id).unwrap());
        assert!(!library.delete_garment(shirt.id).unwrap());
        assert!(library.garment(shirt.id).unwrap().is_none());
        assert_eq!(library.garment_count().unwrap(), 1);
    }

    #[test]
    fn test_update_missing_garment_reports_false() {
        let library = Library::open_in_memory().unwrap();
        assert!(!library.update_garment(GarmentId::new(), "x", None).unwrap());
    }

    #[test]
    fn test_one_photo_per_role() {
        let library = Library::open_in_memory().unwrap();

        let (first, replaced) = library.set_photo(PhotoRole::Front, Path::new("/a.jpg")).unwrap();
        assert!(replaced.is_none());

        let (second, replaced) = library.set_photo(PhotoRole::Front, Path::new("/b.jpg")).unwrap();
        assert_eq!(replaced, Some(first));

        library.set_photo(PhotoRole::Back, Path::new("/c.jpg")).unwrap();

        let photos = library.photos().unwrap();
        assert_eq!(photos.len(), 2);
        assert_eq!(library.photo(PhotoRole::Front).unwrap(), Some(second.clone()));

        assert_eq!(library.remove_photo(PhotoRole::Front).unwrap(), Some(second));
        assert!(library.photo(PhotoRole::Front).unwrap().is_none());
        assert_eq!(library.photos().unwrap().len(), 1);
    }
}
