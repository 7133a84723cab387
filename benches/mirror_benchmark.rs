use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use recipehub::mirror::{LocalMirror, MirrorOrder};
use recipehub::models::recipe::build_keywords;
use recipehub::models::{Ingredient, Recipe, Timestamp};
use std::hint::black_box;

/// A snapshot of `n` recipes in scrambled creation order.
fn snapshot(n: usize) -> Vec<Recipe> {
    (0..n)
        .map(|i| {
            // Deterministic scramble so sorting has work to do.
            let millis = ((i * 7919) % n) as i64 * 1_000;
            let mut recipe = Recipe {
                id: format!("{:06}", i),
                title: format!("Recipe number {}", i),
                ingredients: vec![Ingredient::named("Flour"), Ingredient::named("Water")],
                owner_id: "bench".to_string(),
                created_at: Timestamp::from_millis(millis),
                ..Default::default()
            };
            recipe.keywords = build_keywords(&recipe);
            recipe
        })
        .collect()
}

fn benchmark_snapshot_replace(c: &mut Criterion) {
    let mut group = c.benchmark_group("snapshot_replace");

    for size in [50, 500, 5_000] {
        let items = snapshot(size);

        group.bench_function(format!("newest_first_{}", size), |b| {
            b.iter_batched(
                || items.clone(),
                |items| {
                    let mut mirror = LocalMirror::new(MirrorOrder::NewestFirst);
                    mirror.replace(black_box(items));
                    mirror
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("as_delivered_{}", size), |b| {
            b.iter_batched(
                || items.clone(),
                |items| {
                    let mut mirror = LocalMirror::new(MirrorOrder::AsDelivered);
                    mirror.replace(black_box(items));
                    mirror
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn benchmark_keywords(c: &mut Criterion) {
    let recipe = snapshot(1).remove(0);
    c.bench_function("build_keywords", |b| b.iter(|| build_keywords(black_box(&recipe))));
}

criterion_group!(benches, benchmark_snapshot_replace, benchmark_keywords);
criterion_main!(benches);
