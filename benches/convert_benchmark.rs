//! Benchmarks for unwp conversion performance.
//!
//! Run with: cargo bench
//!
//! These benchmarks run the full HTML → markdown pipeline over synthetic
//! posts of various sizes and shapes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use unwp::Pipeline;

/// Creates a synthetic exported post with the given number of sections.
fn create_test_post(section_count: usize) -> String {
    let mut html = String::new();

    for i in 0..section_count {
        html.push_str(&format!(
            "<!-- wp:heading {{\"level\":2}} --><h2>Section {i}</h2><!-- /wp:heading -->"
        ));
        html.push_str(
            "<!-- wp:paragraph --><p>Some text with <strong>bold</strong>, \
             <em>italic</em>, and a <a href=\"https://example.com\">link</a>.</p>\
             <!-- /wp:paragraph -->",
        );
        html.push_str(
            "<pre lang=\"js\"><code>function demo() {\nreturn [1, 2, 3].map((n) =&gt; n * 2);\n}\n</code></pre>",
        );
        html.push_str(
            "<figure><img src=\"https://cdn.example/pic.png\" alt=\"a picture\">\
             <figcaption>A caption</figcaption></figure>",
        );
        html.push_str("<ul><li>first</li><li>second</li><li>third</li></ul>");
    }

    html
}

fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    let pipeline = Pipeline::new();

    for section_count in [1, 10, 100] {
        let html = create_test_post(section_count);
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(section_count),
            &html,
            |b, html| {
                b.iter(|| pipeline.convert(black_box(html)).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_stages(c: &mut Criterion) {
    let html = create_test_post(10);

    c.bench_function("repair", |b| {
        b.iter(|| unwp::repair::repair_html(black_box(&html)));
    });

    c.bench_function("parse_fragment", |b| {
        let repaired = unwp::repair::repair_html(&html);
        b.iter(|| unwp::dom::parse_fragment(black_box(&repaired)).unwrap());
    });
}

criterion_group!(benches, bench_convert, bench_stages);
criterion_main!(benches);
