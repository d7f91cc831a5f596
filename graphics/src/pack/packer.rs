//! Mesh packing into shared destination buffers.
//!
//! The [`MeshPacker`] consumes batches of [`MeshBufferRecord`]s and
//! repacks them into a small set of shared, per-attribute destination
//! buffers, emitting one indirect-draw command per record. Packed
//! batches are GPU-driven-rendering ready: bind each slot's shared
//! buffer at the region offset, bind the shared index buffer, and feed
//! the command array to an indirect draw.
//!
//! # Transaction semantics
//!
//! `pack_meshes` is all-or-nothing: either every reservation for the
//! batch succeeds and one [`PackedMesh`] is returned, or every extent
//! reserved during the call is released before the error is returned and
//! the allocators are left byte-for-byte as they were. The packer holds
//! no other per-call state, so a failed call can be retried with a
//! smaller batch immediately.
//!
//! # Thread model
//!
//! A `MeshPacker` is single-threaded per call (`&mut self`); independent
//! packers never share state. To share one packer across threads, wrap
//! it in a mutex — allocation calls are infrequent relative to
//! rendering, so one critical section per packer is enough.

use std::sync::Arc;

use cinnabar_core::mesh::{
    AttributeData, IndexFormat, MeshBufferRecord, PrimitiveTopology, VertexAttributeDescriptor,
    VertexAttributeFormat, VertexAttributeSlot,
};

use crate::device::GraphicsDevice;
use crate::error::{GraphicsError, PackError};
use crate::mesh::{AttributeBinding, VertexBindingState};
use crate::resources::{Buffer, Extent, RangeAllocator};
use crate::types::{BufferDescriptor, BufferUsage, DrawIndexedIndirectArgs};

/// Alignment of vertex regions inside shared attribute buffers.
///
/// Attribute components are at most 4 bytes wide, so component alignment
/// is enough; indices align to their own size.
const VERTEX_REGION_ALIGNMENT: u64 = 4;

/// How the packer reconciles per-record attribute formats into the
/// batch's shared output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MergeStrategy {
    /// Every record must match the first record's format per slot.
    #[default]
    UseFirstRecordLayout,
    /// Per slot, the widest compatible format wins; narrower sources are
    /// zero-padded per vertex. Formats must agree in interpretation and
    /// component width.
    WidestFormatPerSlot,
}

/// Configuration of a [`MeshPacker`].
#[derive(Debug, Clone)]
pub struct MeshPackerConfig {
    /// Capacity in bytes of each per-slot shared vertex buffer.
    pub vertex_buffer_capacity: u64,
    /// Capacity in bytes of the shared index buffer.
    pub index_buffer_capacity: u64,
    /// Layout reconciliation strategy.
    pub merge_strategy: MergeStrategy,
    /// Debug label prefix for destination buffers.
    pub label: Option<String>,
}

impl Default for MeshPackerConfig {
    fn default() -> Self {
        Self {
            vertex_buffer_capacity: 16 << 20,
            index_buffer_capacity: 4 << 20,
            merge_strategy: MergeStrategy::default(),
            label: None,
        }
    }
}

impl MeshPackerConfig {
    /// Create a config with the given per-slot vertex and index
    /// capacities in bytes.
    pub fn new(vertex_buffer_capacity: u64, index_buffer_capacity: u64) -> Self {
        Self {
            vertex_buffer_capacity,
            index_buffer_capacity,
            ..Self::default()
        }
    }

    /// Set the merge strategy.
    pub fn with_merge_strategy(mut self, merge_strategy: MergeStrategy) -> Self {
        self.merge_strategy = merge_strategy;
        self
    }

    /// Set the destination buffer label prefix.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// One packed attribute region inside a shared destination buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedRegion {
    /// Shared output descriptor of the slot (tight stride, divisor 0).
    pub descriptor: VertexAttributeDescriptor,
    /// The shared destination buffer.
    pub buffer: Arc<Buffer>,
    /// The reserved byte range holding the batch's data for this slot.
    pub extent: Extent,
}

/// The packed index region inside the shared index buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedIndexRegion {
    /// Index format of the merged stream.
    pub format: IndexFormat,
    /// The shared index buffer.
    pub buffer: Arc<Buffer>,
    /// The reserved byte range holding the batch's concatenated indices.
    pub extent: Extent,
}

/// The result of one successful [`MeshPacker::pack_meshes`] call.
///
/// A `PackedMesh` is one merged mesh buffer: per-slot regions inside the
/// shared destination buffers, an optional index region, and one
/// indirect-draw command per input record, in input order. Command
/// `base_vertex` and `first_index` values are relative to the region
/// starts, so the backend binds each slot buffer (and the index buffer)
/// at the region offset.
///
/// Release the packed mesh back to its packer with
/// [`MeshPacker::release`] before the destination capacity is reused.
#[derive(Debug, PartialEq)]
pub struct PackedMesh {
    regions: Vec<(VertexAttributeSlot, PackedRegion)>,
    index_region: Option<PackedIndexRegion>,
    topology: PrimitiveTopology,
    vertex_count: u32,
    index_count: u32,
    commands: Vec<DrawIndexedIndirectArgs>,
}

impl PackedMesh {
    /// Get the total vertex count across all packed records.
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Get the total index count across all packed records.
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Get the primitive topology shared by the packed records.
    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    /// Get the packed regions in fixed slot order.
    pub fn regions(&self) -> &[(VertexAttributeSlot, PackedRegion)] {
        &self.regions
    }

    /// Get the packed region of a slot, if bound.
    pub fn region(&self, slot: VertexAttributeSlot) -> Option<&PackedRegion> {
        self.regions
            .iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, region)| region)
    }

    /// Get the index region, if the batch was indexed.
    pub fn index_region(&self) -> Option<&PackedIndexRegion> {
        self.index_region.as_ref()
    }

    /// Get the per-record indirect-draw commands, in input order.
    pub fn commands(&self) -> &[DrawIndexedIndirectArgs] {
        &self.commands
    }

    /// View the commands as bytes, laid out as a GPU indirect-argument
    /// buffer record array.
    pub fn commands_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.commands)
    }

    /// Build the vertex-input state for the rendering backend: each slot
    /// bound to its shared buffer at the region offset.
    pub fn binding_state(&self) -> VertexBindingState {
        let mut state = VertexBindingState::new();
        for (slot, region) in &self.regions {
            state.bind_attribute(
                *slot,
                AttributeBinding {
                    descriptor: region.descriptor,
                    offset: region.extent.offset,
                    buffer: region.buffer.id(),
                },
            );
        }
        state
    }
}

/// One shared destination buffer plus its free-space bookkeeping.
struct DestinationStream {
    buffer: Arc<Buffer>,
    allocator: RangeAllocator,
}

/// Packs batches of mesh buffer records into shared destination buffers.
///
/// # Example
///
/// ```
/// use cinnabar_core::mesh::generators;
/// use cinnabar_graphics::pack::{MeshPacker, MeshPackerConfig};
/// use cinnabar_graphics::GraphicsInstance;
///
/// let instance = GraphicsInstance::new().unwrap();
/// let device = instance.create_device().unwrap();
/// let mut packer = MeshPacker::new(device, MeshPackerConfig::default());
///
/// let batch = vec![generators::generate_cube(1.0), generators::generate_cube(0.5)];
/// let packed = packer.pack_meshes(&batch).unwrap();
/// assert_eq!(packed.commands().len(), 2);
///
/// packer.release(packed);
/// ```
pub struct MeshPacker {
    device: Arc<GraphicsDevice>,
    config: MeshPackerConfig,
    slots: [Option<DestinationStream>; VertexAttributeSlot::COUNT],
    indices: Option<DestinationStream>,
}

impl MeshPacker {
    /// Create a packer over the given device.
    ///
    /// Destination buffers are created lazily, per attribute slot, on
    /// first use; their capacities are fixed by the config.
    pub fn new(device: Arc<GraphicsDevice>, config: MeshPackerConfig) -> Self {
        Self {
            device,
            config,
            slots: std::array::from_fn(|_| None),
            indices: None,
        }
    }

    /// Get the parent device.
    pub fn device(&self) -> &Arc<GraphicsDevice> {
        &self.device
    }

    /// Get the packer configuration.
    pub fn config(&self) -> &MeshPackerConfig {
        &self.config
    }

    /// Get the bytes currently allocated in a slot's destination buffer.
    pub fn slot_used_bytes(&self, slot: VertexAttributeSlot) -> u64 {
        self.slots[slot.index()]
            .as_ref()
            .map(|s| s.allocator.used_bytes())
            .unwrap_or(0)
    }

    /// Get the bytes currently allocated across all destination buffers.
    pub fn used_bytes(&self) -> u64 {
        let vertex: u64 = self
            .slots
            .iter()
            .flatten()
            .map(|s| s.allocator.used_bytes())
            .sum();
        let index = self
            .indices
            .as_ref()
            .map(|s| s.allocator.used_bytes())
            .unwrap_or(0);
        vertex + index
    }

    /// Pack a batch of records into the shared destination buffers.
    ///
    /// On success the batch is superseded by the returned [`PackedMesh`];
    /// the input records are only read, never mutated. On failure no
    /// allocator state changes survive the call.
    ///
    /// # Errors
    ///
    /// - [`PackError::InvalidRecord`] — empty batch, malformed record, or
    ///   a record binding a per-instance (divisor > 0) slot.
    /// - [`PackError::BatchTooLarge`] — aggregate vertex or index count
    ///   overflows u32 (checked before any allocation).
    /// - [`PackError::IncompatibleLayout`] — records disagree on slot
    ///   set, topology, indexed-ness, index format, or per-slot format
    ///   under the configured [`MergeStrategy`].
    /// - [`PackError::OutOfSpace`] — a destination buffer cannot hold the
    ///   batch.
    pub fn pack_meshes(&mut self, batch: &[MeshBufferRecord]) -> Result<PackedMesh, PackError> {
        if batch.is_empty() {
            return Err(PackError::InvalidRecord("batch is empty".to_string()));
        }

        // Aggregate counts, before any validation or allocation work.
        let mut total_vertices: u32 = 0;
        let mut total_indices: u32 = 0;
        for record in batch {
            total_vertices = total_vertices
                .checked_add(record.vertex_count())
                .ok_or(PackError::BatchTooLarge)?;
            total_indices = total_indices
                .checked_add(record.index_count())
                .ok_or(PackError::BatchTooLarge)?;
        }

        for (i, record) in batch.iter().enumerate() {
            record
                .validate()
                .map_err(|reason| PackError::InvalidRecord(format!("record {i}: {reason}")))?;
            for (slot, data) in record.bound_attributes() {
                if data.descriptor.is_per_instance() {
                    return Err(PackError::InvalidRecord(format!(
                        "record {i}: slot {slot:?} is per-instance (divisor {}), not packable",
                        data.descriptor.divisor
                    )));
                }
            }
        }

        let layout = self.resolve_shared_layout(batch)?;
        let index_format = batch[0].indices().map(|i| i.format);

        // Make sure every destination stream exists before reserving
        // anything; a creation failure here leaves no reservations to
        // undo.
        for (slot, _) in &layout {
            self.ensure_slot_stream(*slot)?;
        }
        if index_format.is_some() {
            self.ensure_index_stream()?;
        }

        // Reserve one region per bound slot, in fixed slot order, then
        // one for the indices. Everything reserved so far is rolled back
        // on the first failure.
        let mut reserved: Vec<(VertexAttributeSlot, Extent)> = Vec::with_capacity(layout.len());
        let mut index_reserved: Option<Extent> = None;

        for (slot, descriptor) in &layout {
            let size = total_vertices as u64 * descriptor.effective_stride() as u64;
            let allocated = self.slots[slot.index()]
                .as_mut()
                .expect("stream created above")
                .allocator
                .allocate(size, VERTEX_REGION_ALIGNMENT);
            match allocated {
                Some(extent) => reserved.push((*slot, extent)),
                None => {
                    self.rollback(&reserved, index_reserved);
                    return Err(PackError::OutOfSpace {
                        needed: size,
                        stream: stream_name(Some(*slot)),
                    });
                }
            }
        }

        if let Some(format) = index_format {
            let size = total_indices as u64 * format.size() as u64;
            let allocated = self
                .indices
                .as_mut()
                .expect("stream created above")
                .allocator
                .allocate(size, format.size() as u64);
            match allocated {
                Some(extent) => index_reserved = Some(extent),
                None => {
                    self.rollback(&reserved, index_reserved);
                    return Err(PackError::OutOfSpace {
                        needed: size,
                        stream: stream_name(None),
                    });
                }
            }
        }

        // All reservations hold; copy record data in input order.
        if let Err(err) = self.copy_batch(batch, &layout, &reserved, index_reserved) {
            self.rollback(&reserved, index_reserved);
            return Err(err.into());
        }

        // Emit one command per record, bases as running sums.
        let mut commands = Vec::with_capacity(batch.len());
        let mut base_vertex: u32 = 0;
        let mut first_index: u32 = 0;
        for record in batch {
            commands.push(
                DrawIndexedIndirectArgs::new(record.element_count())
                    .with_first_index(if record.is_indexed() { first_index } else { 0 })
                    .with_base_vertex(base_vertex),
            );
            base_vertex += record.vertex_count();
            first_index += record.index_count();
        }

        let regions = reserved
            .into_iter()
            .zip(&layout)
            .map(|((slot, extent), (_, descriptor))| {
                let stream = self.slots[slot.index()]
                    .as_ref()
                    .expect("reserved slot has a stream");
                (
                    slot,
                    PackedRegion {
                        descriptor: *descriptor,
                        buffer: stream.buffer.clone(),
                        extent,
                    },
                )
            })
            .collect();

        let index_region = index_reserved.map(|extent| {
            let stream = self.indices.as_ref().expect("reserved index stream");
            PackedIndexRegion {
                format: index_format.expect("index format for indexed batch"),
                buffer: stream.buffer.clone(),
                extent,
            }
        });

        Ok(PackedMesh {
            regions,
            index_region,
            topology: batch[0].topology(),
            vertex_count: total_vertices,
            index_count: total_indices,
            commands,
        })
    }

    /// Release every region of a packed mesh back to the allocators.
    ///
    /// Must be called before the destination capacity is reused; the
    /// shared buffers themselves stay alive for other packed meshes.
    pub fn release(&mut self, packed: PackedMesh) {
        for (slot, region) in &packed.regions {
            if let Some(stream) = self.slots[slot.index()].as_mut() {
                stream.allocator.release(region.extent);
            }
        }
        if let (Some(region), Some(stream)) = (&packed.index_region, self.indices.as_mut()) {
            stream.allocator.release(region.extent);
        }
    }

    /// Decide the shared output layout of a batch.
    fn resolve_shared_layout(
        &self,
        batch: &[MeshBufferRecord],
    ) -> Result<Vec<(VertexAttributeSlot, VertexAttributeDescriptor)>, PackError> {
        let first = &batch[0];
        let slot_mask = first.bound_slot_mask();
        let topology = first.topology();
        let index_format = first.indices().map(|i| i.format);

        for (i, record) in batch.iter().enumerate().skip(1) {
            if record.bound_slot_mask() != slot_mask {
                return Err(PackError::IncompatibleLayout(format!(
                    "record {i} binds slot mask {:#x}, batch uses {:#x}",
                    record.bound_slot_mask(),
                    slot_mask
                )));
            }
            if record.topology() != topology {
                return Err(PackError::IncompatibleLayout(format!(
                    "record {i} topology {:?} differs from batch topology {topology:?}",
                    record.topology()
                )));
            }
            let record_format = record.indices().map(|idx| idx.format);
            if record_format != index_format {
                return Err(PackError::IncompatibleLayout(format!(
                    "record {i} index format {record_format:?} differs from batch {index_format:?}"
                )));
            }
        }

        let mut layout = Vec::new();
        for (slot, first_data) in first.bound_attributes() {
            let mut shared = first_data.descriptor.format;

            for (i, record) in batch.iter().enumerate().skip(1) {
                let format = record
                    .attribute(slot)
                    .expect("slot masks already matched")
                    .descriptor
                    .format;
                shared = merge_formats(shared, format, self.config.merge_strategy).ok_or_else(
                    || {
                        PackError::IncompatibleLayout(format!(
                            "record {i} slot {slot:?} format {format:?} \
                             incompatible with shared {shared:?}"
                        ))
                    },
                )?;
            }

            // Shared output is tightly packed and per-vertex.
            layout.push((slot, VertexAttributeDescriptor::new(shared)));
        }

        Ok(layout)
    }

    /// Copy every record's data into the reserved regions, in input order.
    fn copy_batch(
        &self,
        batch: &[MeshBufferRecord],
        layout: &[(VertexAttributeSlot, VertexAttributeDescriptor)],
        reserved: &[(VertexAttributeSlot, Extent)],
        index_reserved: Option<Extent>,
    ) -> Result<(), GraphicsError> {
        for ((slot, extent), (_, descriptor)) in reserved.iter().zip(layout) {
            let stream = self.slots[slot.index()]
                .as_ref()
                .expect("reserved slot has a stream");
            let stride = descriptor.effective_stride() as u64;

            let mut base_vertex: u64 = 0;
            for record in batch {
                let data = record.attribute(*slot).expect("slot masks already matched");
                let dst_offset = extent.offset + base_vertex * stride;
                write_region_slot(
                    &self.device,
                    &stream.buffer,
                    dst_offset,
                    data,
                    record.vertex_count(),
                    *descriptor,
                )?;
                base_vertex += record.vertex_count() as u64;
            }
        }

        if let Some(extent) = index_reserved {
            let stream = self.indices.as_ref().expect("reserved index stream");
            let mut offset = extent.offset;
            for record in batch {
                if let Some(indices) = record.indices() {
                    self.device.write_buffer(&stream.buffer, offset, &indices.bytes)?;
                    offset += indices.bytes.len() as u64;
                }
            }
        }

        Ok(())
    }

    /// Lazily create the destination stream of a slot.
    fn ensure_slot_stream(&mut self, slot: VertexAttributeSlot) -> Result<(), GraphicsError> {
        if self.slots[slot.index()].is_none() {
            let descriptor = BufferDescriptor::new(
                self.config.vertex_buffer_capacity,
                BufferUsage::VERTEX | BufferUsage::COPY_DST,
            )
            .with_label(self.stream_label(stream_name(Some(slot))));
            let buffer = self.device.create_buffer(&descriptor)?;
            self.slots[slot.index()] = Some(DestinationStream {
                buffer,
                allocator: RangeAllocator::new(self.config.vertex_buffer_capacity),
            });
        }
        Ok(())
    }

    /// Lazily create the shared index stream.
    fn ensure_index_stream(&mut self) -> Result<(), GraphicsError> {
        if self.indices.is_none() {
            let descriptor = BufferDescriptor::new(
                self.config.index_buffer_capacity,
                BufferUsage::INDEX | BufferUsage::COPY_DST,
            )
            .with_label(self.stream_label(stream_name(None)));
            let buffer = self.device.create_buffer(&descriptor)?;
            self.indices = Some(DestinationStream {
                buffer,
                allocator: RangeAllocator::new(self.config.index_buffer_capacity),
            });
        }
        Ok(())
    }

    fn stream_label(&self, stream: &str) -> String {
        match &self.config.label {
            Some(label) => format!("{label}/{stream}"),
            None => format!("mesh_packer/{stream}"),
        }
    }

    /// Undo every reservation made during a failed pack call.
    fn rollback(
        &mut self,
        reserved: &[(VertexAttributeSlot, Extent)],
        index_reserved: Option<Extent>,
    ) {
        for (slot, extent) in reserved {
            if let Some(stream) = self.slots[slot.index()].as_mut() {
                stream.allocator.release(*extent);
            }
        }
        if let (Some(extent), Some(stream)) = (index_reserved, self.indices.as_mut()) {
            stream.allocator.release(extent);
        }
    }
}

impl std::fmt::Debug for MeshPacker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshPacker")
            .field("label", &self.config.label)
            .field("used_bytes", &self.used_bytes())
            .finish()
    }
}

/// Merge two formats under the configured strategy.
///
/// Returns the shared format, or `None` when the formats cannot be
/// reconciled.
fn merge_formats(
    shared: VertexAttributeFormat,
    format: VertexAttributeFormat,
    strategy: MergeStrategy,
) -> Option<VertexAttributeFormat> {
    if shared == format {
        return Some(shared);
    }
    match strategy {
        MergeStrategy::UseFirstRecordLayout => None,
        MergeStrategy::WidestFormatPerSlot => {
            if shared.interpretation() != format.interpretation()
                || shared.component_size() != format.component_size()
                || shared.component_count() == format.component_count()
            {
                // Same component count but different formats cannot be
                // widened into each other.
                return None;
            }
            if format.component_count() > shared.component_count() {
                Some(format)
            } else {
                Some(shared)
            }
        }
    }
}

/// Copy one record's slot data into a region, re-striding to the shared
/// layout and zero-padding vertices narrower than the shared format.
fn write_region_slot(
    device: &GraphicsDevice,
    buffer: &Buffer,
    dst_offset: u64,
    data: &AttributeData,
    vertex_count: u32,
    shared: VertexAttributeDescriptor,
) -> Result<(), GraphicsError> {
    let src_stride = data.descriptor.effective_stride() as usize;
    let dst_stride = shared.effective_stride() as usize;
    let copy_len = data.descriptor.format.size() as usize;

    if src_stride == dst_stride && copy_len == dst_stride {
        return device.write_buffer(buffer, dst_offset, &data.bytes);
    }

    let mut staging = vec![0u8; vertex_count as usize * dst_stride];
    for v in 0..vertex_count as usize {
        let src = &data.bytes[v * src_stride..v * src_stride + copy_len];
        staging[v * dst_stride..v * dst_stride + copy_len].copy_from_slice(src);
    }
    device.write_buffer(buffer, dst_offset, &staging)
}

/// Stream name for labels and out-of-space errors.
fn stream_name(slot: Option<VertexAttributeSlot>) -> &'static str {
    match slot {
        Some(VertexAttributeSlot::Position) => "position",
        Some(VertexAttributeSlot::Normal) => "normal",
        Some(VertexAttributeSlot::Tangent) => "tangent",
        Some(VertexAttributeSlot::Color) => "color",
        Some(VertexAttributeSlot::TexCoord0) => "texcoord0",
        Some(VertexAttributeSlot::TexCoord1) => "texcoord1",
        Some(VertexAttributeSlot::Joints) => "joints",
        Some(VertexAttributeSlot::Weights) => "weights",
        None => "index",
    }
}
