use cogex_core::{media_type_of, VideoStimulus};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn sources(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| format!("media/clip_{i}.MP4?v={i}"))
        .collect()
}

fn bench_markup(c: &mut Criterion) {
    let many = sources(8);
    let stimulus = VideoStimulus {
        sources: &many,
        width: Some(1280),
        height: Some(720),
        autoplay: true,
        controls: false,
        prompt: Some("<p>Press F or J</p>"),
        source_tags: true,
    };
    c.bench_function("render_eight_sources", |b| {
        b.iter(|| black_box(&stimulus).render())
    });

    let preloaded = VideoStimulus {
        source_tags: false,
        ..stimulus.clone()
    };
    c.bench_function("render_preloaded", |b| {
        b.iter(|| black_box(&preloaded).render())
    });
}

fn bench_media_type(c: &mut Criterion) {
    c.bench_function("media_type_of", |b| {
        b.iter(|| media_type_of(black_box("https://cdn.example.org/a/b/clip.WebM?token=abc.def")))
    });
}

criterion_group!(benches, bench_markup, bench_media_type);
criterion_main!(benches);
