//! Mesh types for the graphics engine.
//!
//! Re-exports the CPU-side attribute and record model from
//! `cinnabar-core` and adds the GPU-facing vertex-input state:
//!
//! - [`VertexBindingState`] - per-slot bindings with canonical
//!   equality/hashing, consumed by the rendering backend
//! - [`AttributeBinding`] - one bound slot (descriptor, offset, buffer)

mod binding;

pub use binding::{AttributeBinding, VertexBindingState};

// Re-export CPU-side types from core
pub use cinnabar_core::mesh::{
    AttributeData, IndexData, IndexFormat, MeshBufferRecord, NumericInterpretation,
    PrimitiveTopology, VertexAttributeDescriptor, VertexAttributeFormat, VertexAttributeSlot,
    MAX_VERTEX_ATTRIBUTE_DIVISOR, VERTEX_ATTRIBUTE_DIVISOR_BITS,
};
