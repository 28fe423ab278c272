/// Image handling module
///
/// This module handles:
/// - The light-background removal filter (filter.rs)
/// - Loading garment and photo pixels off the UI thread (loader.rs)
/// - Copying uploads into the data directory (store.rs)

pub mod filter;
pub mod loader;
pub mod store;
