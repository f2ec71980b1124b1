use barcode_scan::decode::{decode_first, RxingDecoder};
use barcode_scan::preprocess::Preprocessor;
use barcode_scan::Frame;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Gradient luminance frame with no symbol in it.
fn create_test_frame(width: u32, height: u32) -> Frame {
    let pixels = (0..height)
        .flat_map(|y| (0..width).map(move |x| ((x + y) % 256) as u8))
        .collect();
    Frame::new(pixels, width, height, 1)
}

fn benchmark_preprocess(c: &mut Criterion) {
    let mut group = c.benchmark_group("preprocess");
    let preprocessor = Preprocessor::default();

    for (width, height) in [(640, 480), (1280, 720), (1920, 1080)] {
        let frame = create_test_frame(width, height);
        let label = format!("{}x{}", width, height);

        group.bench_with_input(BenchmarkId::new("enhance", &label), &frame, |b, frame| {
            b.iter(|| preprocessor.enhance(black_box(frame)))
        });

        group.bench_with_input(
            BenchmarkId::new("center_strip", &label),
            &frame,
            |b, frame| b.iter(|| preprocessor.center_strip(black_box(frame))),
        );
    }

    group.finish();
}

fn benchmark_miss_path(c: &mut Criterion) {
    // A miss walks every candidate: the worst case of a tick
    let mut group = c.benchmark_group("decode_miss");
    group.sample_size(20);

    let preprocessor = Preprocessor::default();
    let mut decoder = RxingDecoder::default();

    for (width, height) in [(640, 480), (1280, 720)] {
        let frame = create_test_frame(width, height);
        group.bench_with_input(
            BenchmarkId::new("all_candidates", format!("{}x{}", width, height)),
            &frame,
            |b, frame| b.iter(|| decode_first(&mut decoder, preprocessor.candidates(black_box(frame)))),
        );
    }

    group.finish();
}

criterion_group!(benches, benchmark_preprocess, benchmark_miss_path);
criterion_main!(benches);
