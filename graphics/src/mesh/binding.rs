//! Vertex-input binding state.
//!
//! A [`VertexBindingState`] captures, per attribute slot: format, stride,
//! byte offset, instance divisor, and the identity of the bound source
//! buffer. The rendering backend consumes this to configure the graphics
//! API's vertex-input state and deduplicates equivalent configurations by
//! hashing the state, so equality and hashing are canonical: two states
//! describing the same bindings compare and hash identically regardless
//! of the order the bindings were made in or how the state is stored.

use std::hash::{Hash, Hasher};

use cinnabar_core::mesh::{
    VertexAttributeDescriptor, VertexAttributeSlot, MAX_VERTEX_ATTRIBUTE_DIVISOR,
};

use crate::resources::BufferId;

/// One bound attribute slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeBinding {
    /// Format, stride, and divisor of the attribute.
    pub descriptor: VertexAttributeDescriptor,
    /// Byte offset of the attribute data inside the source buffer.
    pub offset: u64,
    /// Identity of the source buffer.
    pub buffer: BufferId,
}

/// Vertex-input state across all attribute slots.
///
/// # Example
///
/// ```ignore
/// let mut state = VertexBindingState::new();
/// state.bind_attribute(
///     VertexAttributeSlot::Position,
///     AttributeBinding {
///         descriptor: VertexAttributeDescriptor::new(VertexAttributeFormat::Float3),
///         offset: 0,
///         buffer: positions.id(),
///     },
/// );
/// pipeline_cache.entry(state).or_insert_with(|| build_pipeline(&state));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexBindingState {
    slots: [Option<AttributeBinding>; VertexAttributeSlot::COUNT],
}

impl VertexBindingState {
    /// Create a state with no bound slots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind an attribute slot.
    ///
    /// Divisors above [`MAX_VERTEX_ATTRIBUTE_DIVISOR`] are clamped, not
    /// rejected.
    pub fn bind_attribute(&mut self, slot: VertexAttributeSlot, mut binding: AttributeBinding) {
        binding.descriptor.divisor = binding.descriptor.divisor.min(MAX_VERTEX_ATTRIBUTE_DIVISOR);
        self.slots[slot.index()] = Some(binding);
    }

    /// Unbind an attribute slot.
    pub fn unbind_attribute(&mut self, slot: VertexAttributeSlot) {
        self.slots[slot.index()] = None;
    }

    /// Get the binding of a slot, if any.
    pub fn attribute(&self, slot: VertexAttributeSlot) -> Option<&AttributeBinding> {
        self.slots[slot.index()].as_ref()
    }

    /// Iterate over the bound slots in fixed slot order.
    pub fn bound_attributes(
        &self,
    ) -> impl Iterator<Item = (VertexAttributeSlot, &AttributeBinding)> {
        VertexAttributeSlot::ALL
            .iter()
            .filter_map(move |slot| self.attribute(*slot).map(|b| (*slot, b)))
    }

    /// Get the set of bound slots as a bit mask (bit N = slot index N).
    pub fn enabled_mask(&self) -> u32 {
        let mut mask = 0;
        for (slot, _) in self.bound_attributes() {
            mask |= 1 << slot.index();
        }
        mask
    }

    /// Canonical serialization of the state.
    ///
    /// Bound slots are emitted in fixed slot order with a fixed field
    /// sequence (slot, format, stride, divisor, offset, buffer id), all
    /// integers little-endian. Two equal states always serialize to the
    /// same bytes, independent of binding order, so the serialization is
    /// usable as a cache key.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(VertexAttributeSlot::COUNT * 26);
        for (slot, binding) in self.bound_attributes() {
            bytes.push(slot.index() as u8);
            bytes.push(binding.descriptor.format as u8);
            bytes.extend_from_slice(&binding.descriptor.stride.to_le_bytes());
            bytes.extend_from_slice(&binding.descriptor.divisor.to_le_bytes());
            bytes.extend_from_slice(&binding.offset.to_le_bytes());
            bytes.extend_from_slice(&binding.buffer.raw().to_le_bytes());
        }
        bytes
    }
}

impl Hash for VertexBindingState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Same field walk as canonical_bytes, without the allocation.
        for (slot, binding) in self.bound_attributes() {
            state.write_u8(slot.index() as u8);
            state.write_u8(binding.descriptor.format as u8);
            state.write_u32(binding.descriptor.stride);
            state.write_u32(binding.descriptor.divisor);
            state.write_u64(binding.offset);
            state.write_u64(binding.buffer.raw());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::sync::Weak;

    use cinnabar_core::mesh::VertexAttributeFormat;

    use crate::resources::Buffer;
    use crate::types::{BufferDescriptor, BufferUsage};

    fn test_buffer() -> BufferId {
        Buffer::new(
            Weak::new(),
            BufferDescriptor::new(256, BufferUsage::VERTEX),
        )
        .id()
    }

    fn binding(format: VertexAttributeFormat, offset: u64, buffer: BufferId) -> AttributeBinding {
        AttributeBinding {
            descriptor: VertexAttributeDescriptor::new(format),
            offset,
            buffer,
        }
    }

    fn hash_of(state: &VertexBindingState) -> u64 {
        let mut hasher = DefaultHasher::new();
        state.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_binding_order_does_not_matter() {
        let buffer = test_buffer();

        let mut forward = VertexBindingState::new();
        forward.bind_attribute(
            VertexAttributeSlot::Position,
            binding(VertexAttributeFormat::Float3, 0, buffer),
        );
        forward.bind_attribute(
            VertexAttributeSlot::Normal,
            binding(VertexAttributeFormat::Float3, 1200, buffer),
        );

        let mut reverse = VertexBindingState::new();
        reverse.bind_attribute(
            VertexAttributeSlot::Normal,
            binding(VertexAttributeFormat::Float3, 1200, buffer),
        );
        reverse.bind_attribute(
            VertexAttributeSlot::Position,
            binding(VertexAttributeFormat::Float3, 0, buffer),
        );

        assert_eq!(forward, reverse);
        assert_eq!(forward.canonical_bytes(), reverse.canonical_bytes());
        assert_eq!(hash_of(&forward), hash_of(&reverse));
    }

    #[test]
    fn test_different_states_diverge() {
        let buffer = test_buffer();

        let mut a = VertexBindingState::new();
        a.bind_attribute(
            VertexAttributeSlot::Position,
            binding(VertexAttributeFormat::Float3, 0, buffer),
        );

        let mut b = a.clone();
        b.bind_attribute(
            VertexAttributeSlot::Position,
            binding(VertexAttributeFormat::Float3, 64, buffer),
        );

        assert_ne!(a, b);
        assert_ne!(a.canonical_bytes(), b.canonical_bytes());
    }

    #[test]
    fn test_divisor_clamped_on_bind() {
        let buffer = test_buffer();
        let mut state = VertexBindingState::new();

        let mut instanced = binding(VertexAttributeFormat::Float4, 0, buffer);
        instanced.descriptor.divisor = MAX_VERTEX_ATTRIBUTE_DIVISOR * 4;
        state.bind_attribute(VertexAttributeSlot::Color, instanced);

        assert_eq!(
            state
                .attribute(VertexAttributeSlot::Color)
                .unwrap()
                .descriptor
                .divisor,
            MAX_VERTEX_ATTRIBUTE_DIVISOR
        );
    }

    #[test]
    fn test_enabled_mask_and_unbind() {
        let buffer = test_buffer();
        let mut state = VertexBindingState::new();

        state.bind_attribute(
            VertexAttributeSlot::Position,
            binding(VertexAttributeFormat::Float3, 0, buffer),
        );
        state.bind_attribute(
            VertexAttributeSlot::TexCoord0,
            binding(VertexAttributeFormat::Float2, 0, buffer),
        );
        assert_eq!(state.enabled_mask(), 0b1_0001);

        state.unbind_attribute(VertexAttributeSlot::Position);
        assert_eq!(state.enabled_mask(), 0b1_0000);
        assert!(state.attribute(VertexAttributeSlot::Position).is_none());
    }

    #[test]
    fn test_state_usable_as_map_key() {
        use std::collections::HashMap;

        let buffer = test_buffer();
        let mut state = VertexBindingState::new();
        state.bind_attribute(
            VertexAttributeSlot::Position,
            binding(VertexAttributeFormat::Float3, 0, buffer),
        );

        let mut cache: HashMap<VertexBindingState, u32> = HashMap::new();
        cache.insert(state.clone(), 7);
        assert_eq!(cache.get(&state), Some(&7));
    }
}
