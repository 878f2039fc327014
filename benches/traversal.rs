//! Performance benchmarks for reification and traversal.
//!
//! Run with: `cargo bench --bench traversal`
//!
//! ## Performance Targets
//!
//! | Operation | Target | Notes |
//! |-----------|--------|-------|
//! | Cold reification | <50µs | Full description walk and validation |
//! | Cached reification | <5µs | Description digest plus LRU hit |
//! | Traversal | Linear in nodes visited | In-memory tree, no links |
//! | Cache contention | Linear scaling | Multi-threaded access |

use criterion::{
    black_box, criterion_group, criterion_main,
    BenchmarkId, Criterion, Throughput,
};
use std::sync::Arc;
use std::thread;

use ipld_kernel::node::{basic, json::from_json};
use ipld_kernel::{
    reify_selector, CacheConfig, InMemoryLinkStore, NodeRef, ReifyOptions, SelectorCache,
    Traversal, TraversalConfig,
};
use serde_json::{json, Value};

/// Recursive "match everything" selector description.
fn match_all(depth: u64) -> Value {
    json!({"R": {"l": {"depth": depth}, ":>": {"|": [
        {".": {}},
        {"a": {">": {"@": {}}}}
    ]}}})
}

/// Complete tree with `fanout` children per map, `depth` levels deep.
fn make_tree(fanout: usize, depth: usize) -> NodeRef {
    if depth == 0 {
        return basic::int(depth as i64);
    }
    basic::map((0..fanout).map(|i| (format!("k{}", i), make_tree(fanout, depth - 1))))
}

/// Benchmark cold reification (no cache).
fn bench_cold_reification(c: &mut Criterion) {
    let mut group = c.benchmark_group("cold_reification");

    for width in [1, 10, 50] {
        let members: Vec<Value> = (0..width)
            .map(|i| json!({"f": {"f>": {format!("field{}", i): {".": {}}}}}))
            .collect();
        let desc = from_json(&json!({"|": members}));

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("union_members", width), &desc, |b, desc| {
            b.iter(|| reify_selector(black_box(desc.as_ref())).unwrap())
        });
    }

    group.finish();
}

/// Benchmark cached reification (cache hit).
fn bench_cached_reification(c: &mut Criterion) {
    let cache = SelectorCache::new(CacheConfig {
        max_entries: 10_000,
        enabled: true,
    });
    let opts = ReifyOptions::default();
    let desc = from_json(&match_all(8));

    // Warm the cache
    cache.reify(desc.as_ref(), &opts).unwrap();

    c.bench_function("cached_reification", |b| {
        b.iter(|| cache.reify(black_box(desc.as_ref()), &opts).unwrap())
    });
}

/// Benchmark traversal over in-memory trees of growing size.
fn bench_traversal(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let walker = Traversal::new(Arc::new(InMemoryLinkStore::new()), TraversalConfig::default());
    let selector = reify_selector(from_json(&match_all(16)).as_ref()).unwrap();

    let mut group = c.benchmark_group("traversal");

    for depth in [2, 4, 6] {
        let tree = make_tree(4, depth);
        let nodes: u64 = (0..=depth as u32).map(|d| 4u64.pow(d)).sum();

        group.throughput(Throughput::Elements(nodes));
        group.bench_with_input(BenchmarkId::new("fanout4_depth", depth), &tree, |b, tree| {
            b.iter(|| {
                let found = rt
                    .block_on(walker.select(Arc::clone(tree), black_box(&selector)))
                    .unwrap();
                assert_eq!(found.len() as u64, nodes);
                found
            })
        });
    }

    group.finish();
}

/// Benchmark cache under concurrent access.
fn bench_cache_contention(c: &mut Criterion) {
    let cache = Arc::new(SelectorCache::default());
    let descs: Arc<Vec<NodeRef>> = Arc::new((1..=64).map(|d| from_json(&match_all(d))).collect());
    for desc in descs.iter() {
        cache.reify(desc.as_ref(), &ReifyOptions::default()).unwrap();
    }

    let mut group = c.benchmark_group("cache_contention");

    for threads in [1, 2, 4, 8] {
        group.throughput(Throughput::Elements(threads as u64 * 64));
        group.bench_with_input(BenchmarkId::new("threads", threads), &threads, |b, &threads| {
            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let cache = Arc::clone(&cache);
                        let descs = Arc::clone(&descs);
                        thread::spawn(move || {
                            for desc in descs.iter() {
                                black_box(cache.reify(desc.as_ref(), &ReifyOptions::default()).unwrap());
                            }
                        })
                    })
                    .collect();
                for handle in handles {
                    handle.join().unwrap();
                }
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_cold_reification,
    bench_cached_reification,
    bench_traversal,
    bench_cache_contention,
);
criterion_main!(benches);
