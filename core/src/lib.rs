//! # Cinnabar Core
//!
//! CPU-side data model for the Cinnabar engine: the vertex attribute
//! model, mesh buffer records and generators, and the material model
//! with the scene-description material compiler.

pub mod material;
pub mod mesh;

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the core crate version.
///
/// Called by applications once during startup.
pub fn init() {
    log::info!("Cinnabar Core v{} initialized", VERSION);
}
