//! Free-range bookkeeping for shared destination buffers.
//!
//! A [`RangeAllocator`] tracks the free and allocated byte ranges inside
//! one fixed-capacity buffer. The mesh packer uses one allocator per
//! shared destination buffer; anything that suballocates a large GPU
//! buffer (instance pools, transient geometry) can reuse it.
//!
//! # Placement policy
//!
//! Allocation is first-fit over a free list kept sorted by offset, so
//! identical request sequences against identical allocator states always
//! produce identical placements. When alignment forces a placement past
//! the start of a free range, the skipped prefix stays free and remains
//! allocatable.
//!
//! # Release discipline
//!
//! Every extent returned by [`allocate`] must be passed back to
//! [`release`] exactly once, on every exit path, before the underlying
//! buffer is reused or destroyed. Releasing coalesces the range with
//! adjacent free ranges, so the free list stays canonical: releasing
//! everything returns the allocator to its initial state, byte for byte.
//!
//! [`allocate`]: RangeAllocator::allocate
//! [`release`]: RangeAllocator::release

/// A contiguous byte range within a destination buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extent {
    /// Byte offset of the range start.
    pub offset: u64,
    /// Length of the range in bytes.
    pub size: u64,
}

impl Extent {
    /// Create a new extent.
    pub fn new(offset: u64, size: u64) -> Self {
        Self { offset, size }
    }

    /// Get the end offset (offset + size).
    pub fn end(&self) -> u64 {
        self.offset + self.size
    }

    /// Check whether the extent covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Free-space bookkeeping for one fixed-capacity buffer.
///
/// # Example
///
/// ```
/// use cinnabar_graphics::resources::RangeAllocator;
///
/// let mut allocator = RangeAllocator::new(1024);
/// let a = allocator.allocate(100, 4).unwrap();
/// let b = allocator.allocate(100, 4).unwrap();
/// assert_eq!((a.offset, b.offset), (0, 100));
///
/// allocator.release(a);
/// allocator.release(b);
/// assert_eq!(allocator.free_bytes(), 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeAllocator {
    capacity: u64,
    /// Free ranges, sorted by offset, never empty or adjacent.
    free: Vec<Extent>,
}

impl RangeAllocator {
    /// Create an allocator over `capacity` bytes, all free.
    pub fn new(capacity: u64) -> Self {
        let free = if capacity > 0 {
            vec![Extent::new(0, capacity)]
        } else {
            Vec::new()
        };
        Self { capacity, free }
    }

    /// Get the total capacity in bytes.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Get the number of free bytes.
    pub fn free_bytes(&self) -> u64 {
        self.free.iter().map(|r| r.size).sum()
    }

    /// Get the number of allocated bytes.
    pub fn used_bytes(&self) -> u64 {
        self.capacity - self.free_bytes()
    }

    /// Check whether no extents are live.
    pub fn is_unused(&self) -> bool {
        self.free_bytes() == self.capacity
    }

    /// Get the free ranges, sorted by offset.
    pub fn free_ranges(&self) -> &[Extent] {
        &self.free
    }

    /// Reserve `size` bytes whose start is a multiple of `alignment`.
    ///
    /// Returns `None` when no free range can hold the aligned request —
    /// the out-of-space signal; the allocator is unchanged in that case.
    /// A zero-size request trivially succeeds with an empty extent.
    ///
    /// `alignment` must be a nonzero power of two.
    pub fn allocate(&mut self, size: u64, alignment: u64) -> Option<Extent> {
        debug_assert!(
            alignment.is_power_of_two(),
            "alignment must be a power of 2, got {alignment}"
        );

        if size == 0 {
            return Some(Extent::new(0, 0));
        }

        // First fit in offset order.
        for i in 0..self.free.len() {
            let range = self.free[i];
            let start = align_up(range.offset, alignment);
            let end = match start.checked_add(size) {
                Some(end) => end,
                None => continue,
            };
            if end > range.end() {
                continue;
            }

            // Carve the allocation out, keeping the aligned-away prefix
            // and the tail free.
            let mut keep = Vec::with_capacity(2);
            if start > range.offset {
                keep.push(Extent::new(range.offset, start - range.offset));
            }
            if range.end() > end {
                keep.push(Extent::new(end, range.end() - end));
            }
            self.free.splice(i..=i, keep);

            return Some(Extent::new(start, size));
        }

        None
    }

    /// Return an extent to the free list, coalescing with adjacent free
    /// ranges.
    ///
    /// The extent must have been returned by [`allocate`](Self::allocate)
    /// on this allocator and not yet released. Releasing an empty extent
    /// is a no-op.
    pub fn release(&mut self, extent: Extent) {
        if extent.is_empty() {
            return;
        }
        debug_assert!(
            extent.end() <= self.capacity,
            "released extent {extent:?} exceeds capacity {}",
            self.capacity
        );

        let index = self.free.partition_point(|r| r.offset < extent.offset);
        debug_assert!(
            index == 0 || self.free[index - 1].end() <= extent.offset,
            "released extent {extent:?} overlaps a free range"
        );
        debug_assert!(
            index == self.free.len() || extent.end() <= self.free[index].offset,
            "released extent {extent:?} overlaps a free range"
        );

        let merges_prev = index > 0 && self.free[index - 1].end() == extent.offset;
        let merges_next = index < self.free.len() && self.free[index].offset == extent.end();

        match (merges_prev, merges_next) {
            (true, true) => {
                self.free[index - 1].size += extent.size + self.free[index].size;
                self.free.remove(index);
            }
            (true, false) => {
                self.free[index - 1].size += extent.size;
            }
            (false, true) => {
                self.free[index].offset = extent.offset;
                self.free[index].size += extent.size;
            }
            (false, false) => {
                self.free.insert(index, extent);
            }
        }
    }
}

/// Align a value up to the given power-of-two alignment.
#[inline]
fn align_up(value: u64, alignment: u64) -> u64 {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_allocations_are_first_fit_and_disjoint() {
        let mut allocator = RangeAllocator::new(1024);

        let a = allocator.allocate(100, 4).unwrap();
        let b = allocator.allocate(200, 4).unwrap();
        let c = allocator.allocate(50, 4).unwrap();

        assert_eq!(a, Extent::new(0, 100));
        assert_eq!(b, Extent::new(100, 200));
        assert_eq!(c, Extent::new(300, 50));
        assert_eq!(allocator.used_bytes(), 350);
    }

    #[test]
    fn test_alignment_prefix_stays_free() {
        let mut allocator = RangeAllocator::new(1024);

        let a = allocator.allocate(100, 4).unwrap();
        let b = allocator.allocate(64, 256).unwrap();
        assert_eq!(a.offset, 0);
        assert_eq!(b.offset, 256);

        // The 156 bytes skipped by alignment are still allocatable.
        let c = allocator.allocate(156, 4).unwrap();
        assert_eq!(c.offset, 100);
        assert_eq!(allocator.used_bytes(), 320);
    }

    #[test]
    fn test_out_of_space_leaves_state_unchanged() {
        let mut allocator = RangeAllocator::new(512);
        let _a = allocator.allocate(500, 4).unwrap();

        let before = allocator.clone();
        assert!(allocator.allocate(100, 4).is_none());
        assert_eq!(allocator, before);
    }

    #[rstest]
    #[case::forward(false)]
    #[case::reverse(true)]
    fn test_adjacent_release_coalesces(#[case] reverse: bool) {
        let mut allocator = RangeAllocator::new(512);
        let a = allocator.allocate(128, 4).unwrap();
        let b = allocator.allocate(128, 4).unwrap();

        if reverse {
            allocator.release(b);
            allocator.release(a);
        } else {
            allocator.release(a);
            allocator.release(b);
        }

        // The combined range must be allocatable as one block.
        let combined = allocator.allocate(256, 4).unwrap();
        assert_eq!(combined, Extent::new(0, 256));
    }

    #[test]
    fn test_release_middle_merges_both_neighbors() {
        let mut allocator = RangeAllocator::new(512);
        let a = allocator.allocate(100, 4).unwrap();
        let b = allocator.allocate(100, 4).unwrap();
        let c = allocator.allocate(100, 4).unwrap();

        allocator.release(a);
        allocator.release(c);
        assert_eq!(allocator.free_ranges().len(), 3); // a-hole, c-hole, tail

        allocator.release(b);
        assert_eq!(allocator.free_ranges(), &[Extent::new(0, 512)]);
        assert!(allocator.is_unused());
    }

    #[test]
    fn test_release_all_restores_initial_state() {
        let initial = RangeAllocator::new(4096);
        let mut allocator = initial.clone();

        let mut live = Vec::new();
        for size in [64, 128, 32, 256, 16] {
            live.push(allocator.allocate(size, 16).unwrap());
        }
        // Release in an order that exercises every merge case.
        for index in [2, 0, 4, 1, 3] {
            allocator.release(live[index]);
        }

        assert_eq!(allocator, initial);
    }

    #[test]
    fn test_freed_hole_is_reused_first_fit() {
        let mut allocator = RangeAllocator::new(1024);
        let a = allocator.allocate(128, 4).unwrap();
        let _b = allocator.allocate(128, 4).unwrap();

        allocator.release(a);

        // A fitting request lands in the hole, not after _b.
        let c = allocator.allocate(64, 4).unwrap();
        assert_eq!(c.offset, 0);

        // An oversized request skips the hole.
        let d = allocator.allocate(512, 4).unwrap();
        assert_eq!(d.offset, 256);
    }

    #[rstest]
    #[case(64, 1)]
    #[case(64, 2)]
    #[case(48, 16)]
    #[case(100, 64)]
    fn test_allocate_respects_alignment(#[case] size: u64, #[case] alignment: u64) {
        let mut allocator = RangeAllocator::new(4096);
        // Misalign the free list head first.
        let _pad = allocator.allocate(13, 1).unwrap();

        let extent = allocator.allocate(size, alignment).unwrap();
        assert_eq!(extent.offset % alignment, 0);
        assert_eq!(extent.size, size);
    }

    #[test]
    fn test_determinism_under_replay() {
        let run = || {
            let mut allocator = RangeAllocator::new(2048);
            let mut offsets = Vec::new();
            let a = allocator.allocate(100, 4).unwrap();
            let b = allocator.allocate(300, 4).unwrap();
            allocator.release(a);
            offsets.push(allocator.allocate(80, 4).unwrap().offset);
            offsets.push(allocator.allocate(40, 4).unwrap().offset);
            allocator.release(b);
            offsets.push(allocator.allocate(500, 4).unwrap().offset);
            offsets
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_no_live_overlap_across_sequence() {
        let mut allocator = RangeAllocator::new(4096);
        let mut live: Vec<Extent> = Vec::new();

        // Deterministic allocate/release interleaving.
        for step in 0..64u64 {
            if step % 3 == 2 && !live.is_empty() {
                let extent = live.remove((step as usize * 7) % live.len());
                allocator.release(extent);
            } else if let Some(extent) = allocator.allocate(16 + step % 48, 8) {
                live.push(extent);
            }

            for (i, a) in live.iter().enumerate() {
                for b in &live[i + 1..] {
                    assert!(
                        a.end() <= b.offset || b.end() <= a.offset,
                        "live extents {a:?} and {b:?} overlap"
                    );
                }
            }
        }
    }

    #[test]
    fn test_zero_size_allocation() {
        let mut allocator = RangeAllocator::new(64);
        let extent = allocator.allocate(0, 4).unwrap();
        assert!(extent.is_empty());

        allocator.release(extent);
        assert_eq!(allocator.free_bytes(), 64);
    }

    #[test]
    fn test_exhaustion_to_exact_capacity() {
        let mut allocator = RangeAllocator::new(256);
        let a = allocator.allocate(256, 4).unwrap();
        assert_eq!(a, Extent::new(0, 256));
        assert!(allocator.allocate(1, 1).is_none());

        allocator.release(a);
        assert!(allocator.is_unused());
    }
}
