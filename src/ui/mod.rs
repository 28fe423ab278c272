/// User interface module
///
/// - The fitting room canvas and its image handle cache (canvas.rs)
/// - Mouse and touch normalization for drags (pointer.rs)
/// - One view per tab (profile.rs, wardrobe.rs, studio.rs)

pub mod canvas;
pub mod pointer;
pub mod profile;
pub mod studio;
pub mod wardrobe;
