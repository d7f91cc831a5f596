//! Type conversions between Cinnabar types and wgpu types.
//!
//! Pure lookup functions with no hidden state. The backend that issues
//! draw calls consumes these together with [`VertexBindingState`] and the
//! packed indirect commands; command submission itself is outside this
//! crate.
//!
//! [`VertexBindingState`]: crate::mesh::VertexBindingState

use cinnabar_core::mesh::{
    IndexFormat, PrimitiveTopology, VertexAttributeFormat, VertexAttributeSlot,
};

use crate::types::{BufferUsage, DrawIndexedIndirectArgs, TextureFormat, TextureUsage};

/// Convert BufferUsage flags to wgpu buffer usages.
pub fn convert_buffer_usage(usage: BufferUsage) -> wgpu::BufferUsages {
    let mut result = wgpu::BufferUsages::empty();

    if usage.contains(BufferUsage::VERTEX) {
        result |= wgpu::BufferUsages::VERTEX;
    }
    if usage.contains(BufferUsage::INDEX) {
        result |= wgpu::BufferUsages::INDEX;
    }
    if usage.contains(BufferUsage::UNIFORM) {
        result |= wgpu::BufferUsages::UNIFORM;
    }
    if usage.contains(BufferUsage::STORAGE) {
        result |= wgpu::BufferUsages::STORAGE;
    }
    if usage.contains(BufferUsage::INDIRECT) {
        result |= wgpu::BufferUsages::INDIRECT;
    }
    if usage.contains(BufferUsage::COPY_SRC) {
        result |= wgpu::BufferUsages::COPY_SRC;
    }
    if usage.contains(BufferUsage::COPY_DST) {
        result |= wgpu::BufferUsages::COPY_DST;
    }
    if usage.contains(BufferUsage::MAP_READ) {
        result |= wgpu::BufferUsages::MAP_READ;
    }
    if usage.contains(BufferUsage::MAP_WRITE) {
        result |= wgpu::BufferUsages::MAP_WRITE;
    }

    result
}

/// Convert TextureUsage flags to wgpu texture usages.
pub fn convert_texture_usage(usage: TextureUsage) -> wgpu::TextureUsages {
    let mut result = wgpu::TextureUsages::empty();

    if usage.contains(TextureUsage::COPY_SRC) {
        result |= wgpu::TextureUsages::COPY_SRC;
    }
    if usage.contains(TextureUsage::COPY_DST) {
        result |= wgpu::TextureUsages::COPY_DST;
    }
    if usage.contains(TextureUsage::TEXTURE_BINDING) {
        result |= wgpu::TextureUsages::TEXTURE_BINDING;
    }
    if usage.contains(TextureUsage::STORAGE_BINDING) {
        result |= wgpu::TextureUsages::STORAGE_BINDING;
    }
    if usage.contains(TextureUsage::RENDER_ATTACHMENT) {
        result |= wgpu::TextureUsages::RENDER_ATTACHMENT;
    }

    result
}

/// Convert TextureFormat to wgpu format.
pub fn convert_texture_format(format: TextureFormat) -> wgpu::TextureFormat {
    match format {
        // 8-bit formats
        TextureFormat::R8Unorm => wgpu::TextureFormat::R8Unorm,
        TextureFormat::R8Snorm => wgpu::TextureFormat::R8Snorm,
        TextureFormat::R8Uint => wgpu::TextureFormat::R8Uint,
        TextureFormat::R8Sint => wgpu::TextureFormat::R8Sint,

        // 16-bit formats
        TextureFormat::R16Unorm => wgpu::TextureFormat::R16Unorm,
        TextureFormat::R16Float => wgpu::TextureFormat::R16Float,
        TextureFormat::Rg8Unorm => wgpu::TextureFormat::Rg8Unorm,

        // 32-bit formats
        TextureFormat::R32Float => wgpu::TextureFormat::R32Float,
        TextureFormat::R32Uint => wgpu::TextureFormat::R32Uint,
        TextureFormat::Rg16Float => wgpu::TextureFormat::Rg16Float,
        TextureFormat::Rgba8Unorm => wgpu::TextureFormat::Rgba8Unorm,
        TextureFormat::Rgba8UnormSrgb => wgpu::TextureFormat::Rgba8UnormSrgb,
        TextureFormat::Bgra8Unorm => wgpu::TextureFormat::Bgra8Unorm,
        TextureFormat::Bgra8UnormSrgb => wgpu::TextureFormat::Bgra8UnormSrgb,

        // 64-bit formats
        TextureFormat::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
        TextureFormat::Rg32Float => wgpu::TextureFormat::Rg32Float,

        // 128-bit formats
        TextureFormat::Rgba32Float => wgpu::TextureFormat::Rgba32Float,

        // Depth/stencil formats
        TextureFormat::Depth16Unorm => wgpu::TextureFormat::Depth16Unorm,
        TextureFormat::Depth24Plus => wgpu::TextureFormat::Depth24Plus,
        TextureFormat::Depth24PlusStencil8 => wgpu::TextureFormat::Depth24PlusStencil8,
        TextureFormat::Depth32Float => wgpu::TextureFormat::Depth32Float,
        TextureFormat::Depth32FloatStencil8 => wgpu::TextureFormat::Depth32FloatStencil8,
    }
}

/// Convert VertexAttributeFormat to wgpu vertex format.
pub fn convert_vertex_format(format: VertexAttributeFormat) -> wgpu::VertexFormat {
    match format {
        VertexAttributeFormat::Float => wgpu::VertexFormat::Float32,
        VertexAttributeFormat::Float2 => wgpu::VertexFormat::Float32x2,
        VertexAttributeFormat::Float3 => wgpu::VertexFormat::Float32x3,
        VertexAttributeFormat::Float4 => wgpu::VertexFormat::Float32x4,
        VertexAttributeFormat::Int => wgpu::VertexFormat::Sint32,
        VertexAttributeFormat::Int2 => wgpu::VertexFormat::Sint32x2,
        VertexAttributeFormat::Int3 => wgpu::VertexFormat::Sint32x3,
        VertexAttributeFormat::Int4 => wgpu::VertexFormat::Sint32x4,
        VertexAttributeFormat::Uint => wgpu::VertexFormat::Uint32,
        VertexAttributeFormat::Uint2 => wgpu::VertexFormat::Uint32x2,
        VertexAttributeFormat::Uint3 => wgpu::VertexFormat::Uint32x3,
        VertexAttributeFormat::Uint4 => wgpu::VertexFormat::Uint32x4,
        VertexAttributeFormat::Unorm8x4 => wgpu::VertexFormat::Unorm8x4,
        VertexAttributeFormat::Snorm8x4 => wgpu::VertexFormat::Snorm8x4,
    }
}

/// Convert IndexFormat to wgpu index format.
pub fn convert_index_format(format: IndexFormat) -> wgpu::IndexFormat {
    match format {
        IndexFormat::Uint16 => wgpu::IndexFormat::Uint16,
        IndexFormat::Uint32 => wgpu::IndexFormat::Uint32,
    }
}

/// Convert PrimitiveTopology to wgpu topology.
pub fn convert_topology(topology: PrimitiveTopology) -> wgpu::PrimitiveTopology {
    match topology {
        PrimitiveTopology::PointList => wgpu::PrimitiveTopology::PointList,
        PrimitiveTopology::LineList => wgpu::PrimitiveTopology::LineList,
        PrimitiveTopology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        PrimitiveTopology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
        PrimitiveTopology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
    }
}

/// Shader input location of an attribute slot.
pub fn shader_location(slot: VertexAttributeSlot) -> u32 {
    slot.index() as u32
}

/// Convert a packed indirect command to wgpu's argument struct.
///
/// wgpu models `base_vertex` as signed; packed base vertices are always
/// in range because batch totals are bounded by u32 vertex counts.
pub fn convert_indirect_args(args: DrawIndexedIndirectArgs) -> wgpu::util::DrawIndexedIndirectArgs {
    wgpu::util::DrawIndexedIndirectArgs {
        index_count: args.count,
        instance_count: args.instance_count,
        first_index: args.first_index,
        base_vertex: args.base_vertex as i32,
        first_instance: args.base_instance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_format_sizes_match_wgpu() {
        for format in [
            VertexAttributeFormat::Float,
            VertexAttributeFormat::Float3,
            VertexAttributeFormat::Int2,
            VertexAttributeFormat::Uint4,
            VertexAttributeFormat::Unorm8x4,
        ] {
            assert_eq!(
                format.size() as u64,
                convert_vertex_format(format).size(),
                "size mismatch for {format:?}"
            );
        }
    }

    #[test]
    fn test_buffer_usage_round_trip() {
        let usage = BufferUsage::VERTEX | BufferUsage::INDIRECT | BufferUsage::COPY_DST;
        let converted = convert_buffer_usage(usage);
        assert!(converted.contains(wgpu::BufferUsages::VERTEX));
        assert!(converted.contains(wgpu::BufferUsages::INDIRECT));
        assert!(converted.contains(wgpu::BufferUsages::COPY_DST));
        assert!(!converted.contains(wgpu::BufferUsages::UNIFORM));
    }

    #[test]
    fn test_indirect_args_field_mapping() {
        let args = DrawIndexedIndirectArgs::new(36)
            .with_first_index(6)
            .with_base_vertex(4);
        let converted = convert_indirect_args(args);
        assert_eq!(converted.index_count, 36);
        assert_eq!(converted.instance_count, 1);
        assert_eq!(converted.first_index, 6);
        assert_eq!(converted.base_vertex, 4);
    }
}
