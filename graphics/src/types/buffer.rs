//! Buffer types and descriptors.

use bitflags::bitflags;

bitflags! {
    /// Usage flags for buffers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        /// Buffer can be used as a vertex buffer.
        const VERTEX = 1 << 0;
        /// Buffer can be used as an index buffer.
        const INDEX = 1 << 1;
        /// Buffer can be used as a uniform buffer.
        const UNIFORM = 1 << 2;
        /// Buffer can be used as a storage buffer.
        const STORAGE = 1 << 3;
        /// Buffer can be used as an indirect-draw argument buffer.
        const INDIRECT = 1 << 4;
        /// Buffer can be copied from.
        const COPY_SRC = 1 << 5;
        /// Buffer can be copied to.
        const COPY_DST = 1 << 6;
        /// Buffer is mappable for CPU access.
        const MAP_READ = 1 << 7;
        /// Buffer is mappable for CPU write.
        const MAP_WRITE = 1 << 8;
    }
}

impl Default for BufferUsage {
    fn default() -> Self {
        Self::empty()
    }
}

/// Descriptor for creating a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BufferDescriptor {
    /// Debug label for the buffer.
    pub label: Option<String>,
    /// Size in bytes.
    pub size: u64,
    /// Usage flags.
    pub usage: BufferUsage,
}

impl BufferDescriptor {
    /// Create a new buffer descriptor.
    pub fn new(size: u64, usage: BufferUsage) -> Self {
        Self {
            label: None,
            size,
            usage,
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

// ============================================================================
// Indirect Drawing Arguments
// ============================================================================

/// Arguments for one indexed indirect draw.
///
/// Matches the GPU wire layout of `DrawElementsIndirectCommand` /
/// `VkDrawIndexedIndirectCommand`: five unsigned 32-bit fields in fixed
/// order, so an array of these is directly usable as an indirect-draw
/// argument buffer (the buffer needs [`BufferUsage::INDIRECT`]).
///
/// For non-indexed draws emitted by the packer, `count` holds the vertex
/// count and `first_index` is 0.
///
/// # Memory Layout
///
/// `#[repr(C)]`, total size 20 bytes, alignment 4 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawIndexedIndirectArgs {
    /// Number of elements (indices, or vertices when non-indexed) to draw.
    pub count: u32,
    /// Number of instances to draw.
    pub instance_count: u32,
    /// Offset of the first index in the shared index buffer, in indices.
    pub first_index: u32,
    /// Value added to each index before reading from the vertex buffers.
    pub base_vertex: u32,
    /// Instance ID of the first instance to draw.
    pub base_instance: u32,
}

impl DrawIndexedIndirectArgs {
    /// Size of the struct in bytes.
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    /// Create arguments drawing `count` elements as one instance.
    pub fn new(count: u32) -> Self {
        Self {
            count,
            instance_count: 1,
            first_index: 0,
            base_vertex: 0,
            base_instance: 0,
        }
    }

    /// Set the instance count.
    pub fn with_instance_count(mut self, instance_count: u32) -> Self {
        self.instance_count = instance_count;
        self
    }

    /// Set the first index.
    pub fn with_first_index(mut self, first_index: u32) -> Self {
        self.first_index = first_index;
        self
    }

    /// Set the base vertex offset.
    pub fn with_base_vertex(mut self, base_vertex: u32) -> Self {
        self.base_vertex = base_vertex;
        self
    }

    /// Set the first instance index.
    pub fn with_base_instance(mut self, base_instance: u32) -> Self {
        self.base_instance = base_instance;
        self
    }

    /// View as bytes for uploading to an indirect-argument buffer.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

// The GPU consumes these without CPU re-validation; the layout is load-bearing.
static_assertions::const_assert_eq!(std::mem::size_of::<DrawIndexedIndirectArgs>(), 20);
static_assertions::const_assert_eq!(std::mem::align_of::<DrawIndexedIndirectArgs>(), 4);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_descriptor_builder() {
        let desc = BufferDescriptor::new(1024, BufferUsage::VERTEX | BufferUsage::COPY_DST)
            .with_label("positions");
        assert_eq!(desc.size, 1024);
        assert!(desc.usage.contains(BufferUsage::VERTEX));
        assert_eq!(desc.label.as_deref(), Some("positions"));
    }

    #[test]
    fn test_indirect_args_layout() {
        let args = DrawIndexedIndirectArgs::new(36)
            .with_first_index(12)
            .with_base_vertex(8)
            .with_base_instance(2);

        let bytes = args.as_bytes();
        assert_eq!(bytes.len(), 20);

        let fields: &[u32] = bytemuck::cast_slice(bytes);
        assert_eq!(fields, &[36, 1, 12, 8, 2]);
    }

    #[test]
    fn test_indirect_args_array_is_contiguous() {
        let args = [
            DrawIndexedIndirectArgs::new(3),
            DrawIndexedIndirectArgs::new(6).with_base_vertex(10),
        ];
        let bytes: &[u8] = bytemuck::cast_slice(&args);
        assert_eq!(bytes.len(), 40);

        let fields: &[u32] = bytemuck::cast_slice(bytes);
        assert_eq!(fields[0], 3);
        assert_eq!(fields[5], 6);
        assert_eq!(fields[8], 10);
    }
}
