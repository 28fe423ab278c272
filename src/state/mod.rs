/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - Placed items and their transforms (placement.rs)
/// - The transient fitting session (session.rs)
/// - Profile photo selection (profile.rs)
/// - The SQLite record store for wardrobe and photos (library.rs)
/// - User settings (settings.rs)

pub mod data;
pub mod library;
pub mod placement;
pub mod profile;
pub mod session;
pub mod settings;
