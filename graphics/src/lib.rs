//! # Cinnabar Graphics
//!
//! GPU-facing layer of the Cinnabar engine: resource descriptors and
//! bookkeeping, mesh packing into shared buffers, and vertex-input
//! binding state.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`MeshPacker`] - Repacks heterogeneous mesh buffer records into
//!   shared destination buffers with indirect-draw commands
//! - [`RangeAllocator`] - Free-range bookkeeping inside shared buffers
//! - [`VertexBindingState`] - Canonical, hashable vertex-input state for
//!   backend state-object caching
//! - [`GraphicsInstance`] / [`GraphicsDevice`] - Resource creation and
//!   tracking with software-backed buffer storage
//! - `backend` - Feature-gated translation tables to graphics APIs
//!
//! ## Example
//!
//! ```
//! use cinnabar_core::mesh::generators;
//! use cinnabar_graphics::pack::{MeshPacker, MeshPackerConfig};
//! use cinnabar_graphics::GraphicsInstance;
//!
//! let instance = GraphicsInstance::new().unwrap();
//! let device = instance.create_device().unwrap();
//!
//! let mut packer = MeshPacker::new(device, MeshPackerConfig::default());
//! let packed = packer
//!     .pack_meshes(&[generators::generate_cube(1.0), generators::generate_cube(0.5)])
//!     .unwrap();
//!
//! // One indirect-draw command per record, ready for GPU-driven draws.
//! assert_eq!(packed.commands().len(), 2);
//! packer.release(packed);
//! ```

pub mod backend;
pub mod device;
pub mod error;
pub mod instance;
pub mod mesh;
pub mod pack;
pub mod resources;
pub mod types;

// Re-export main types for convenience
pub use device::{DeviceCapabilities, GraphicsDevice};
pub use error::{GraphicsError, PackError};
pub use instance::{AdapterInfo, AdapterType, GraphicsInstance};
pub use mesh::{AttributeBinding, VertexBindingState};
pub use pack::{MergeStrategy, MeshPacker, MeshPackerConfig, PackedMesh};
pub use resources::{Buffer, BufferId, Extent, RangeAllocator, Texture};
pub use types::{
    BufferDescriptor, BufferUsage, DrawIndexedIndirectArgs, Extent3d, TextureDescriptor,
    TextureFormat, TextureUsage,
};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the graphics crate version.
///
/// Called by applications once during startup.
pub fn init() {
    log::info!("Cinnabar Graphics v{} initialized", VERSION);
}
