use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use paranote::{Comment, Resolver, build_tree, counts, extract_fingerprint};
use std::hint::black_box;

/// Chapter with `size` distinct paragraphs.
fn chapter(size: usize) -> Vec<String> {
    (0..size)
        .map(|i| format!("Paragraph {i:05} opens on the harbour wall and keeps going for a while."))
        .collect()
}

/// One root per paragraph written against a shifted layout, plus two
/// replies per root and a handful of orphans.
fn comments_for(paragraphs: &[String]) -> Vec<Comment> {
    let n = paragraphs.len();
    let mut comments = Vec::with_capacity(n * 3 + 8);
    for (i, text) in paragraphs.iter().enumerate() {
        let fp = extract_fingerprint(text);
        let root = format!("c{i}");
        comments.push(Comment::new(root.clone(), (i + 5) % n, Some(fp.as_str()), "x"));
        comments.push(Comment::reply(format!("{root}-a"), root.clone(), 0, "y"));
        comments.push(Comment::reply(format!("{root}-b"), format!("{root}-a"), 0, "z"));
    }
    for i in 0..8 {
        comments.push(Comment::new(format!("orphan{i}"), i, Some("Deleted paragraph"), "x"));
    }
    comments
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    let resolver = Resolver::default();

    for size in [50, 500, 5000].iter() {
        let paragraphs = chapter(*size);
        let comments = comments_for(&paragraphs);

        group.throughput(Throughput::Elements(comments.len() as u64));
        group.bench_function(format!("detailed_{}", size), |b| {
            b.iter(|| resolver.resolve_detailed(black_box(&paragraphs), black_box(&comments)));
        });

        let fingerprints = resolver.fingerprints(&paragraphs);
        group.bench_function(format!("prefingerprinted_{}", size), |b| {
            b.iter(|| resolver.resolve_fingerprints(black_box(&fingerprints), black_box(&comments)));
        });
    }

    group.finish();
}

fn bench_tree_and_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree");
    let resolver = Resolver::default();

    for size in [50, 500, 5000].iter() {
        let paragraphs = chapter(*size);
        let comments = comments_for(&paragraphs);
        let mapping = resolver.resolve(&paragraphs, &comments);

        group.throughput(Throughput::Elements(comments.len() as u64));
        group.bench_function(format!("build_all_{}", size), |b| {
            b.iter(|| {
                for (_, bucket) in mapping.iter() {
                    black_box(build_tree(bucket));
                }
            });
        });
        group.bench_function(format!("counts_{}", size), |b| {
            b.iter(|| counts(black_box(&mapping)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_resolve, bench_tree_and_counts);
criterion_main!(benches);
