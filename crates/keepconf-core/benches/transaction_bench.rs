//! Criterion benchmarks for `Config::transaction`.
//!
//! Measures the full snapshot → mutate → serialize → store cycle with an
//! in-memory storage, so the numbers reflect the core and the format
//! adapters rather than disk latency.
//!
//! Run with:
//! ```bash
//! cargo bench --package keepconf-core --bench transaction_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use keepconf_core::{
    Config, ConfigError, JsonSerializer, MemoryStorage, Serializer, TomlSerializer, YamlSerializer,
};
use serde::{Deserialize, Serialize};

// ── Fixtures ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Peer {
    name: String,
    host: String,
    port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AppConfig {
    name: String,
    counter: u64,
    verbose: bool,
    peers: Vec<Peer>,
}

fn make_config(peers: usize) -> AppConfig {
    AppConfig {
        name: "bench".to_string(),
        counter: 0,
        verbose: false,
        peers: (0..peers)
            .map(|i| Peer {
                name: format!("peer-{i}"),
                host: format!("10.0.0.{}", i % 250),
                port: 24800 + (i % 100) as u16,
            })
            .collect(),
    }
}

fn bench_commit<Z>(c: &mut Criterion, format: &str, serializer: fn() -> Z)
where
    Z: Serializer<AppConfig> + 'static,
{
    let mut group = c.benchmark_group(format!("transaction_commit_{format}"));
    for peers in [1_usize, 16, 256] {
        let config = Config::new(make_config(peers), MemoryStorage::new(), serializer());
        group.bench_with_input(BenchmarkId::from_parameter(peers), &peers, |b, _| {
            b.iter(|| {
                config
                    .transaction(|cfg| {
                        cfg.counter = black_box(cfg.counter + 1);
                        Ok::<_, ConfigError>(())
                    })
                    .unwrap();
            });
        });
    }
    group.finish();
}

fn bench_formats(c: &mut Criterion) {
    bench_commit(c, "yaml", || YamlSerializer);
    bench_commit(c, "json", JsonSerializer::compact);
    bench_commit(c, "toml", TomlSerializer::default);
}

fn bench_rollback(c: &mut Criterion) {
    let config = Config::new(make_config(256), MemoryStorage::new(), YamlSerializer);
    c.bench_function("transaction_rollback_256_peers", |b| {
        b.iter(|| {
            let result = config.transaction(|cfg| {
                cfg.peers.clear();
                Err("abort")
            });
            black_box(result).unwrap_err();
        });
    });
}

criterion_group!(benches, bench_formats, bench_rollback);
criterion_main!(benches);
