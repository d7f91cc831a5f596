//! Mesh packing into shared GPU buffers.
//!
//! Batches of per-object [`MeshBufferRecord`]s go in; one merged
//! [`PackedMesh`] with per-record indirect-draw commands comes out. See
//! [`MeshPacker`] for the transaction and thread-model contracts.
//!
//! [`MeshBufferRecord`]: cinnabar_core::mesh::MeshBufferRecord

mod packer;

pub use packer::{
    MergeStrategy, MeshPacker, MeshPackerConfig, PackedIndexRegion, PackedMesh, PackedRegion,
};
