//! Material compiler: BSDF trees to intermediate shading representation.
//!
//! The compiler has two halves:
//!
//! - [`ShadingIr`] / [`IrNode`] — the target representation: a flat node
//!   arena shared by all compiled materials of a scene.
//! - [`MaterialCompilerFrontend`] — the translation from scene-description
//!   [`BsdfElement`] trees into IR nodes.
//!
//! Shader-generation backends consume the IR; they are outside this
//! crate.

mod frontend;
mod ir;

pub use frontend::{BsdfElement, MaterialCompileError, MaterialCompilerFrontend, SpectrumValue};
pub use ir::{IrNode, IrValue, NodeHandle, ShadingIr, ShadingRoot};
