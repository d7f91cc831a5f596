use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cinnabar_core::mesh::generators;
use cinnabar_graphics::pack::{MeshPacker, MeshPackerConfig};
use cinnabar_graphics::resources::RangeAllocator;
use cinnabar_graphics::GraphicsInstance;

// ---------------------------------------------------------------------------
// Mesh packing
// ---------------------------------------------------------------------------

fn bench_pack_single_record(c: &mut Criterion) {
    let instance = GraphicsInstance::new().unwrap();
    let device = instance.create_device().unwrap();
    let batch = vec![generators::generate_uv_sphere(1.0, 64, 32)];

    c.bench_function("pack_single_sphere", |b| {
        let mut packer = MeshPacker::new(device.clone(), MeshPackerConfig::default());
        b.iter(|| {
            let packed = packer.pack_meshes(black_box(&batch)).unwrap();
            packer.release(packed);
        });
    });
}

fn bench_pack_batch_of_64(c: &mut Criterion) {
    let instance = GraphicsInstance::new().unwrap();
    let device = instance.create_device().unwrap();
    let batch: Vec<_> = (0..64)
        .map(|i| generators::generate_cube(1.0 + i as f32 * 0.25))
        .collect();

    c.bench_function("pack_64_cubes", |b| {
        let mut packer = MeshPacker::new(device.clone(), MeshPackerConfig::default());
        b.iter(|| {
            let packed = packer.pack_meshes(black_box(&batch)).unwrap();
            packer.release(packed);
        });
    });
}

fn bench_pack_release_interleaved(c: &mut Criterion) {
    let instance = GraphicsInstance::new().unwrap();
    let device = instance.create_device().unwrap();
    let batches: Vec<Vec<_>> = (0..8)
        .map(|i| vec![generators::generate_cube(1.0 + i as f32)])
        .collect();

    c.bench_function("pack_release_interleaved_8", |b| {
        let mut packer = MeshPacker::new(device.clone(), MeshPackerConfig::default());
        b.iter(|| {
            let mut live = Vec::new();
            for batch in &batches {
                live.push(packer.pack_meshes(black_box(batch)).unwrap());
            }
            // Release out of order to exercise coalescing.
            for packed in live.drain(..).rev() {
                packer.release(packed);
            }
        });
    });
}

// ---------------------------------------------------------------------------
// Range allocator
// ---------------------------------------------------------------------------

fn bench_allocator_churn(c: &mut Criterion) {
    c.bench_function("range_allocator_churn_256", |b| {
        b.iter(|| {
            let mut allocator = RangeAllocator::new(1 << 20);
            let mut live = Vec::new();
            for i in 0..256u64 {
                if i % 3 == 2 && !live.is_empty() {
                    let extent = live.remove((i as usize * 7) % live.len());
                    allocator.release(extent);
                } else if let Some(extent) = allocator.allocate(64 + (i % 17) * 16, 16) {
                    live.push(extent);
                }
            }
            for extent in live {
                allocator.release(extent);
            }
            black_box(allocator.free_bytes())
        });
    });
}

criterion_group!(
    benches,
    bench_pack_single_record,
    bench_pack_batch_of_64,
    bench_pack_release_interleaved,
    bench_allocator_churn
);
criterion_main!(benches);
