//! GPU buffer resource.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

use crate::device::GraphicsDevice;
use crate::error::GraphicsError;
use crate::types::BufferDescriptor;

/// Stable, process-unique identity of a buffer.
///
/// Binding descriptors hash and compare buffer identities rather than
/// pointers, so identity survives cloning `Arc`s and is stable across the
/// buffer's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(u64);

impl BufferId {
    /// Get the raw id value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

/// A GPU buffer resource with software-backed storage.
///
/// Buffers are created by [`GraphicsDevice::create_buffer`] and are
/// reference-counted. They hold a weak reference back to their parent
/// device; the storage itself lives with the buffer, so the last holder
/// of an `Arc<Buffer>` frees it.
///
/// # Example
///
/// ```ignore
/// let buffer = device.create_buffer(&BufferDescriptor::new(1024, BufferUsage::VERTEX))?;
/// buffer.write(0, &[1, 2, 3, 4])?;
/// assert_eq!(buffer.read(0, 4)?, vec![1, 2, 3, 4]);
/// ```
pub struct Buffer {
    id: BufferId,
    device: Weak<GraphicsDevice>,
    descriptor: BufferDescriptor,
    storage: RwLock<Vec<u8>>,
}

/// Buffers compare by their stable identity.
impl PartialEq for Buffer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Buffer {
    /// Create a new buffer (called by GraphicsDevice).
    pub(crate) fn new(device: Weak<GraphicsDevice>, descriptor: BufferDescriptor) -> Self {
        let storage = RwLock::new(vec![0u8; descriptor.size as usize]);
        Self {
            id: BufferId(NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed)),
            device,
            descriptor,
            storage,
        }
    }

    /// Get the stable identity of this buffer.
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// Get the parent device, if it still exists.
    pub fn device(&self) -> Option<Arc<GraphicsDevice>> {
        self.device.upgrade()
    }

    /// Get the buffer descriptor.
    pub fn descriptor(&self) -> &BufferDescriptor {
        &self.descriptor
    }

    /// Get the buffer size in bytes.
    pub fn size(&self) -> u64 {
        self.descriptor.size
    }

    /// Get the buffer label, if set.
    pub fn label(&self) -> Option<&str> {
        self.descriptor.label.as_deref()
    }

    /// Write bytes at the given offset.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::OutOfBounds`] if the write would exceed
    /// the buffer size.
    pub fn write(&self, offset: u64, data: &[u8]) -> Result<(), GraphicsError> {
        let end = self.bounds_check(offset, data.len() as u64)?;
        self.storage.write()[offset as usize..end as usize].copy_from_slice(data);
        Ok(())
    }

    /// Read `len` bytes at the given offset.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::OutOfBounds`] if the read would exceed
    /// the buffer size.
    pub fn read(&self, offset: u64, len: u64) -> Result<Vec<u8>, GraphicsError> {
        let end = self.bounds_check(offset, len)?;
        Ok(self.storage.read()[offset as usize..end as usize].to_vec())
    }

    fn bounds_check(&self, offset: u64, len: u64) -> Result<u64, GraphicsError> {
        let end = offset.checked_add(len).ok_or(GraphicsError::OutOfBounds {
            offset,
            len,
            size: self.descriptor.size,
        })?;
        if end > self.descriptor.size {
            return Err(GraphicsError::OutOfBounds {
                offset,
                len,
                size: self.descriptor.size,
            });
        }
        Ok(end)
    }
}

impl std::fmt::Debug for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Buffer")
            .field("id", &self.id.0)
            .field("size", &self.descriptor.size)
            .field("usage", &self.descriptor.usage)
            .field("label", &self.descriptor.label)
            .finish()
    }
}

// Ensure Buffer is Send + Sync
static_assertions::assert_impl_all!(Buffer: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BufferUsage;

    #[test]
    fn test_buffer_ids_are_unique() {
        let desc = BufferDescriptor::new(16, BufferUsage::VERTEX);
        let a = Buffer::new(Weak::new(), desc.clone());
        let b = Buffer::new(Weak::new(), desc);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_buffer_write_read_round_trip() {
        let desc = BufferDescriptor::new(16, BufferUsage::COPY_DST);
        let buffer = Buffer::new(Weak::new(), desc);

        buffer.write(4, &[9, 8, 7]).unwrap();
        assert_eq!(buffer.read(4, 3).unwrap(), vec![9, 8, 7]);
        assert_eq!(buffer.read(0, 4).unwrap(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_buffer_out_of_bounds() {
        let desc = BufferDescriptor::new(8, BufferUsage::COPY_DST);
        let buffer = Buffer::new(Weak::new(), desc);

        assert!(matches!(
            buffer.write(6, &[0, 0, 0]),
            Err(GraphicsError::OutOfBounds { .. })
        ));
        assert!(matches!(
            buffer.read(0, 9),
            Err(GraphicsError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_buffer_debug() {
        let desc = BufferDescriptor::new(1024, BufferUsage::VERTEX).with_label("positions");
        let buffer = Buffer::new(Weak::new(), desc);
        let debug = format!("{:?}", buffer);
        assert!(debug.contains("Buffer"));
        assert!(debug.contains("1024"));
        assert!(debug.contains("positions"));
    }
}
