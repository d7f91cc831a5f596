//! GPU resources.
//!
//! This module contains the resource types created by [`GraphicsDevice`]
//! and the free-space bookkeeping used to share them:
//!
//! - [`Buffer`] - GPU memory buffer with software-backed storage
//! - [`Texture`] - GPU texture/image
//! - [`RangeAllocator`] / [`Extent`] - free-range bookkeeping inside a
//!   shared destination buffer
//!
//! Resources are reference-counted with [`Arc`] and can be shared across
//! threads. Buffers hold a weak reference back to their parent device.
//!
//! [`GraphicsDevice`]: crate::GraphicsDevice
//! [`Arc`]: std::sync::Arc

mod allocator;
mod buffer;
mod texture;

pub use allocator::{Extent, RangeAllocator};
pub use buffer::{Buffer, BufferId};
pub use texture::Texture;
