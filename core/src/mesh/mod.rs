//! CPU-side mesh types and generators.
//!
//! This module provides GPU-agnostic mesh data structures:
//!
//! - [`VertexAttributeSlot`] / [`VertexAttributeFormat`] /
//!   [`VertexAttributeDescriptor`] - The attribute model shared by the
//!   mesh packer and the vertex-binding layer
//! - [`MeshBufferRecord`] - One drawable object before packing (bound
//!   attribute slots, optional indices, vertex count)
//! - Generators for common shapes (quad, cube, sphere)
//!
//! These types are re-exported by `cinnabar-graphics` for convenience.

pub mod generators;
mod layout;
mod record;

pub use layout::{
    NumericInterpretation, VertexAttributeDescriptor, VertexAttributeFormat, VertexAttributeSlot,
    MAX_VERTEX_ATTRIBUTE_DIVISOR, VERTEX_ATTRIBUTE_DIVISOR_BITS,
};
pub use record::{AttributeData, IndexData, IndexFormat, MeshBufferRecord, PrimitiveTopology};
