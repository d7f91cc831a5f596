//! CPU-side material model and the scene-description material compiler.
//!
//! - [`CpuMaterial`] and friends: a property-based material definition
//!   with semantic tags, the bridge between format-specific loaders and
//!   the renderer.
//! - [`compiler`]: translation of interchange-format BSDF trees into the
//!   intermediate shading representation, plus lowering of representable
//!   trees back onto [`CpuMaterial`] properties.

pub mod compiler;
mod types;

pub use types::{
    AlphaMode, CpuMaterial, MaterialProperty, MaterialSemantic, MaterialValue, TextureRef,
};
