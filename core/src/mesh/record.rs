//! CPU-side mesh buffer records.
//!
//! A [`MeshBufferRecord`] describes one drawable object before packing:
//! a set of bound attribute slots (each a descriptor plus raw source
//! bytes), an optional index buffer, and a vertex count. Records are
//! read-only inputs to the mesh packer — the packer never mutates them,
//! and the caller keeps ownership.

use super::layout::{VertexAttributeDescriptor, VertexAttributeFormat, VertexAttributeSlot};

/// Primitive topology describing how vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Each vertex is a separate point.
    PointList,
    /// Every two vertices form a line.
    LineList,
    /// Vertices form a connected strip of lines.
    LineStrip,
    /// Every three vertices form a triangle.
    #[default]
    TriangleList,
    /// Vertices form a connected strip of triangles.
    TriangleStrip,
}

impl PrimitiveTopology {
    /// Get the number of vertices per primitive (for non-strip topologies).
    pub fn vertices_per_primitive(&self) -> Option<u32> {
        match self {
            Self::PointList => Some(1),
            Self::LineList => Some(2),
            Self::TriangleList => Some(3),
            Self::LineStrip | Self::TriangleStrip => None, // Variable
        }
    }
}

/// Index format for indexed drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexFormat {
    /// 16-bit unsigned integers (max 65535 vertices).
    #[default]
    Uint16,
    /// 32-bit unsigned integers (max ~4 billion vertices).
    Uint32,
}

impl IndexFormat {
    /// Get the size in bytes of each index.
    pub fn size(&self) -> u32 {
        match self {
            Self::Uint16 => 2,
            Self::Uint32 => 4,
        }
    }
}

/// One bound attribute slot inside a record: descriptor + source bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeData {
    /// Format, stride, and divisor of the source data.
    pub descriptor: VertexAttributeDescriptor,
    /// Raw source bytes, `vertex_count * effective_stride` long.
    pub bytes: Vec<u8>,
}

/// Index buffer of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexData {
    /// Index format.
    pub format: IndexFormat,
    /// Raw index bytes, a multiple of the index size long.
    pub bytes: Vec<u8>,
}

impl IndexData {
    /// Get the number of indices.
    pub fn count(&self) -> u32 {
        (self.bytes.len() / self.format.size() as usize) as u32
    }
}

/// One drawable object before packing.
///
/// # Example
///
/// ```
/// use cinnabar_core::mesh::{
///     MeshBufferRecord, VertexAttributeDescriptor, VertexAttributeFormat,
///     VertexAttributeSlot,
/// };
///
/// let positions: Vec<u8> = vec![0; 10 * 12]; // 10 x float3
/// let record = MeshBufferRecord::new(10)
///     .with_attribute(
///         VertexAttributeSlot::Position,
///         VertexAttributeDescriptor::new(VertexAttributeFormat::Float3),
///         positions,
///     )
///     .with_label("rock");
/// assert!(record.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MeshBufferRecord {
    attributes: [Option<AttributeData>; VertexAttributeSlot::COUNT],
    indices: Option<IndexData>,
    vertex_count: u32,
    topology: PrimitiveTopology,
    label: Option<String>,
}

impl MeshBufferRecord {
    /// Create a record with the given vertex count and no bound slots.
    pub fn new(vertex_count: u32) -> Self {
        Self {
            vertex_count,
            ..Self::default()
        }
    }

    /// Bind an attribute slot to a descriptor and source bytes.
    pub fn with_attribute(
        mut self,
        slot: VertexAttributeSlot,
        descriptor: VertexAttributeDescriptor,
        bytes: Vec<u8>,
    ) -> Self {
        self.attributes[slot.index()] = Some(AttributeData { descriptor, bytes });
        self
    }

    /// Attach an index buffer.
    pub fn with_indices(mut self, format: IndexFormat, bytes: Vec<u8>) -> Self {
        self.indices = Some(IndexData { format, bytes });
        self
    }

    /// Set the primitive topology.
    pub fn with_topology(mut self, topology: PrimitiveTopology) -> Self {
        self.topology = topology;
        self
    }

    /// Set a debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Get the vertex count.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Get the primitive topology.
    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    /// Get the record label, if set.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Get the data bound to a slot, if any.
    pub fn attribute(&self, slot: VertexAttributeSlot) -> Option<&AttributeData> {
        self.attributes[slot.index()].as_ref()
    }

    /// Iterate over the bound slots in fixed slot order.
    pub fn bound_attributes(
        &self,
    ) -> impl Iterator<Item = (VertexAttributeSlot, &AttributeData)> {
        VertexAttributeSlot::ALL
            .iter()
            .filter_map(move |slot| self.attribute(*slot).map(|data| (*slot, data)))
    }

    /// Get the set of bound slots as a bit mask (bit N = slot index N).
    pub fn bound_slot_mask(&self) -> u32 {
        let mut mask = 0;
        for (slot, _) in self.bound_attributes() {
            mask |= 1 << slot.index();
        }
        mask
    }

    /// Get the index buffer, if any.
    pub fn indices(&self) -> Option<&IndexData> {
        self.indices.as_ref()
    }

    /// Check if this record uses indexed drawing.
    pub fn is_indexed(&self) -> bool {
        self.indices.is_some()
    }

    /// Get the number of indices (0 for non-indexed records).
    pub fn index_count(&self) -> u32 {
        self.indices.as_ref().map(|i| i.count()).unwrap_or(0)
    }

    /// Get the number of elements one draw of this record consumes:
    /// the index count if indexed, the vertex count otherwise.
    pub fn element_count(&self) -> u32 {
        if self.is_indexed() {
            self.index_count()
        } else {
            self.vertex_count
        }
    }

    /// Validate the record.
    ///
    /// Checks that the vertex count is nonzero, at least one slot is
    /// bound, every bound slot's payload length matches
    /// `vertex_count * effective_stride`, and the index payload length is
    /// a multiple of the index size.
    pub fn validate(&self) -> Result<(), String> {
        if self.vertex_count == 0 {
            return Err("record has zero vertices".to_string());
        }

        if self.bound_attributes().next().is_none() {
            return Err("record binds no attribute slots".to_string());
        }

        for (slot, data) in self.bound_attributes() {
            let stride = data.descriptor.effective_stride();
            if stride < data.descriptor.format.size() {
                return Err(format!(
                    "slot {:?} stride {} is smaller than format size {}",
                    slot,
                    stride,
                    data.descriptor.format.size()
                ));
            }
            let expected = self.vertex_count as usize * stride as usize;
            if data.bytes.len() != expected {
                return Err(format!(
                    "slot {:?} payload is {} bytes, expected {} ({} vertices * stride {})",
                    slot,
                    data.bytes.len(),
                    expected,
                    self.vertex_count,
                    stride
                ));
            }
        }

        if let Some(indices) = &self.indices {
            if indices.bytes.is_empty() {
                return Err("index payload is empty".to_string());
            }
            if indices.bytes.len() % indices.format.size() as usize != 0 {
                return Err(format!(
                    "index payload of {} bytes is not a multiple of the index size {}",
                    indices.bytes.len(),
                    indices.format.size()
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float3() -> VertexAttributeDescriptor {
        VertexAttributeDescriptor::new(VertexAttributeFormat::Float3)
    }

    #[test]
    fn test_record_builder_and_accessors() {
        let record = MeshBufferRecord::new(4)
            .with_attribute(VertexAttributeSlot::Position, float3(), vec![0; 48])
            .with_indices(IndexFormat::Uint16, vec![0; 12])
            .with_label("quad");

        assert_eq!(record.vertex_count(), 4);
        assert_eq!(record.index_count(), 6);
        assert_eq!(record.element_count(), 6);
        assert!(record.is_indexed());
        assert_eq!(record.label(), Some("quad"));
        assert_eq!(record.bound_slot_mask(), 1);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_validate_payload_length() {
        let record =
            MeshBufferRecord::new(4).with_attribute(VertexAttributeSlot::Position, float3(), vec![0; 47]);
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_validate_zero_vertices() {
        let record =
            MeshBufferRecord::new(0).with_attribute(VertexAttributeSlot::Position, float3(), vec![]);
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_validate_no_attributes() {
        let record = MeshBufferRecord::new(3);
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_validate_ragged_indices() {
        let record = MeshBufferRecord::new(3)
            .with_attribute(VertexAttributeSlot::Position, float3(), vec![0; 36])
            .with_indices(IndexFormat::Uint32, vec![0; 6]);
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_non_indexed_element_count() {
        let record =
            MeshBufferRecord::new(9).with_attribute(VertexAttributeSlot::Position, float3(), vec![0; 108]);
        assert_eq!(record.element_count(), 9);
    }

    #[test]
    fn test_interleaved_stride_validates() {
        // Position embedded in a 32-byte interleaved vertex.
        let desc = float3().with_stride(32);
        let record =
            MeshBufferRecord::new(2).with_attribute(VertexAttributeSlot::Position, desc, vec![0; 64]);
        assert!(record.validate().is_ok());
    }
}
