//! Vertex attribute slots, formats, and descriptors.
//!
//! An attribute descriptor ties a [`VertexAttributeFormat`] to a source
//! stride and an instance divisor. Descriptors are consumed both by the
//! mesh packer (to size and lay out shared attribute buffers) and by the
//! vertex-binding layer (to configure vertex-input state).
//!
//! # Attribute Slots
//!
//! Vertex-input channels form a bounded enumeration
//! ([`VertexAttributeSlot`]); a mesh binds a subset of the
//! [`VertexAttributeSlot::COUNT`] slots. Slot identity is fixed — shaders
//! and the binding layer match attributes by slot, never by position in a
//! list.

/// One vertex-input channel in the fixed set of supported channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeSlot {
    /// Vertex position (typically float3).
    Position,
    /// Vertex normal (typically float3).
    Normal,
    /// Vertex tangent (typically float4, w = handedness).
    Tangent,
    /// Vertex color (typically float4 or unorm4).
    Color,
    /// Texture coordinates set 0 (typically float2).
    TexCoord0,
    /// Texture coordinates set 1 (typically float2).
    TexCoord1,
    /// Bone indices for skinning (typically uint4).
    Joints,
    /// Bone weights for skinning (typically float4).
    Weights,
}

impl VertexAttributeSlot {
    /// Number of attribute slots.
    pub const COUNT: usize = 8;

    /// All slots in fixed slot order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Position,
        Self::Normal,
        Self::Tangent,
        Self::Color,
        Self::TexCoord0,
        Self::TexCoord1,
        Self::Joints,
        Self::Weights,
    ];

    /// Get the fixed index of this slot.
    pub fn index(&self) -> usize {
        match self {
            Self::Position => 0,
            Self::Normal => 1,
            Self::Tangent => 2,
            Self::Color => 3,
            Self::TexCoord0 => 4,
            Self::TexCoord1 => 5,
            Self::Joints => 6,
            Self::Weights => 7,
        }
    }

    /// Get the slot for a raw index, or `None` if the index is outside
    /// the fixed range.
    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

/// Numeric interpretation of attribute components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericInterpretation {
    /// IEEE 754 floating point.
    Float,
    /// Signed integer.
    Int,
    /// Unsigned integer.
    Uint,
    /// Fixed-point integer normalized to a unit range.
    Normalized,
}

/// Format of a vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttributeFormat {
    /// Single 32-bit float.
    Float,
    /// Two 32-bit floats.
    Float2,
    /// Three 32-bit floats.
    Float3,
    /// Four 32-bit floats.
    Float4,
    /// Single 32-bit signed integer.
    Int,
    /// Two 32-bit signed integers.
    Int2,
    /// Three 32-bit signed integers.
    Int3,
    /// Four 32-bit signed integers.
    Int4,
    /// Single 32-bit unsigned integer.
    Uint,
    /// Two 32-bit unsigned integers.
    Uint2,
    /// Three 32-bit unsigned integers.
    Uint3,
    /// Four 32-bit unsigned integers.
    Uint4,
    /// Four 8-bit unsigned integers (normalized to 0.0-1.0).
    Unorm8x4,
    /// Four 8-bit signed integers (normalized to -1.0-1.0).
    Snorm8x4,
}

impl VertexAttributeFormat {
    /// Get the size in bytes of one attribute value.
    pub fn size(&self) -> u32 {
        self.component_count() * self.component_size()
    }

    /// Get the number of components.
    pub fn component_count(&self) -> u32 {
        match self {
            Self::Float | Self::Int | Self::Uint => 1,
            Self::Float2 | Self::Int2 | Self::Uint2 => 2,
            Self::Float3 | Self::Int3 | Self::Uint3 => 3,
            Self::Float4 | Self::Int4 | Self::Uint4 | Self::Unorm8x4 | Self::Snorm8x4 => 4,
        }
    }

    /// Get the size in bytes of one component.
    pub fn component_size(&self) -> u32 {
        match self {
            Self::Unorm8x4 | Self::Snorm8x4 => 1,
            _ => 4,
        }
    }

    /// Get the numeric interpretation of the components.
    pub fn interpretation(&self) -> NumericInterpretation {
        match self {
            Self::Float | Self::Float2 | Self::Float3 | Self::Float4 => {
                NumericInterpretation::Float
            }
            Self::Int | Self::Int2 | Self::Int3 | Self::Int4 => NumericInterpretation::Int,
            Self::Uint | Self::Uint2 | Self::Uint3 | Self::Uint4 => NumericInterpretation::Uint,
            Self::Unorm8x4 | Self::Snorm8x4 => NumericInterpretation::Normalized,
        }
    }
}

/// Bit width of the supported instance-divisor range.
///
/// Divisors are bounded by driver/hardware limits; values above
/// [`MAX_VERTEX_ATTRIBUTE_DIVISOR`] are clamped, not rejected.
pub const VERTEX_ATTRIBUTE_DIVISOR_BITS: u32 = 8;

/// Largest representable instance divisor.
pub const MAX_VERTEX_ATTRIBUTE_DIVISOR: u32 = 1 << VERTEX_ATTRIBUTE_DIVISOR_BITS;

/// Describes one vertex attribute: format, source stride, and divisor.
///
/// A stride of 0 derives the tight stride from the format. A divisor of 0
/// means the attribute advances per vertex; a divisor of N > 0 advances
/// once every N instances. Divisors are clamped to
/// [`MAX_VERTEX_ATTRIBUTE_DIVISOR`] on every construction path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttributeDescriptor {
    /// Data format of the attribute.
    pub format: VertexAttributeFormat,
    /// Stride in bytes between consecutive values (0 = derive from format).
    pub stride: u32,
    /// Instance divisor (0 = per-vertex).
    pub divisor: u32,
}

impl VertexAttributeDescriptor {
    /// Create a per-vertex descriptor with tight stride.
    pub fn new(format: VertexAttributeFormat) -> Self {
        Self {
            format,
            stride: 0,
            divisor: 0,
        }
    }

    /// Set the source stride in bytes.
    pub fn with_stride(mut self, stride: u32) -> Self {
        self.stride = stride;
        self
    }

    /// Set the instance divisor, clamping to [`MAX_VERTEX_ATTRIBUTE_DIVISOR`].
    pub fn with_divisor(mut self, divisor: u32) -> Self {
        self.divisor = divisor.min(MAX_VERTEX_ATTRIBUTE_DIVISOR);
        self
    }

    /// Get the effective stride: the explicit stride, or the format size
    /// when the stride is 0.
    pub fn effective_stride(&self) -> u32 {
        if self.stride != 0 {
            self.stride
        } else {
            self.format.size()
        }
    }

    /// Check whether this attribute advances per instance.
    pub fn is_per_instance(&self) -> bool {
        self.divisor != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_index_round_trip() {
        for slot in VertexAttributeSlot::ALL {
            assert_eq!(VertexAttributeSlot::from_index(slot.index() as u32), Some(slot));
        }
        assert_eq!(
            VertexAttributeSlot::from_index(VertexAttributeSlot::COUNT as u32),
            None
        );
    }

    #[test]
    fn test_format_sizes() {
        assert_eq!(VertexAttributeFormat::Float.size(), 4);
        assert_eq!(VertexAttributeFormat::Float3.size(), 12);
        assert_eq!(VertexAttributeFormat::Uint4.size(), 16);
        assert_eq!(VertexAttributeFormat::Unorm8x4.size(), 4);
        assert_eq!(VertexAttributeFormat::Snorm8x4.component_size(), 1);
    }

    #[test]
    fn test_format_interpretation() {
        assert_eq!(
            VertexAttributeFormat::Float2.interpretation(),
            NumericInterpretation::Float
        );
        assert_eq!(
            VertexAttributeFormat::Int3.interpretation(),
            NumericInterpretation::Int
        );
        assert_eq!(
            VertexAttributeFormat::Unorm8x4.interpretation(),
            NumericInterpretation::Normalized
        );
    }

    #[test]
    fn test_descriptor_effective_stride() {
        let tight = VertexAttributeDescriptor::new(VertexAttributeFormat::Float3);
        assert_eq!(tight.effective_stride(), 12);

        let interleaved =
            VertexAttributeDescriptor::new(VertexAttributeFormat::Float3).with_stride(32);
        assert_eq!(interleaved.effective_stride(), 32);
    }

    #[test]
    fn test_divisor_clamped_not_rejected() {
        let desc = VertexAttributeDescriptor::new(VertexAttributeFormat::Float4)
            .with_divisor(MAX_VERTEX_ATTRIBUTE_DIVISOR + 123);
        assert_eq!(desc.divisor, MAX_VERTEX_ATTRIBUTE_DIVISOR);

        let in_range = VertexAttributeDescriptor::new(VertexAttributeFormat::Float4)
            .with_divisor(3);
        assert_eq!(in_range.divisor, 3);
    }
}
