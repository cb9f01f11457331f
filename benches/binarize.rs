use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use frame_binarizer::{Binarizer, FrameShape, FrameStack};

const ROWS: usize = 480;
const COLS: usize = 640;

/// Generate a moving-bar test pattern, roughly half the pixels lit
fn test_frames(count: usize) -> FrameStack<u8> {
    let mut pixels = Vec::with_capacity(count * ROWS * COLS);
    for frame in 0..count {
        for _row in 0..ROWS {
            for col in 0..COLS {
                pixels.push(if (col + frame * 8) % 64 < 32 { 255 } else { 0 });
            }
        }
    }
    FrameStack::from_flat(count, FrameShape::new(ROWS, COLS), pixels).unwrap()
}

/// Benchmark: per-pixel writes versus batched chunks
fn bench_chunk_sizes(c: &mut Criterion) {
    let stack = test_frames(8);
    let mut group = c.benchmark_group("binarize_chunk_size");
    group.throughput(Throughput::Elements(stack.pixel_count() as u64));

    for chunk_size in [1usize, 4096, 64 * 1024, ROWS * COLS] {
        let binarizer = Binarizer::new().with_chunk_size(chunk_size);
        group.bench_with_input(BenchmarkId::from_parameter(chunk_size), &binarizer, |b, binarizer| {
            b.iter(|| {
                let mut out = Vec::with_capacity(stack.pixel_count());
                binarizer.write_stack(black_box(&stack), &mut out).unwrap();
                black_box(out)
            })
        });
    }

    group.finish();
}

/// Benchmark: float frames, the other common storage type
fn bench_float_frames(c: &mut Criterion) {
    let source = test_frames(4);
    let pixels: Vec<f32> = source
        .frames()
        .flat_map(|f| f.pixels().iter().map(|&p| p as f32 / 255.0 - 0.5))
        .collect();
    let stack = FrameStack::from_flat(4, FrameShape::new(ROWS, COLS), pixels).unwrap();
    let binarizer = Binarizer::new();

    c.bench_function("binarize_f32_480p", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(stack.pixel_count());
            binarizer.write_stack(black_box(&stack), &mut out).unwrap();
            black_box(out)
        })
    });
}

criterion_group!(benches, bench_chunk_sizes, bench_float_frames);
criterion_main!(benches);
