use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, PlotConfiguration};
use moka::sync::Cache as MokaCache;
use rand::Rng;
use shard_lru::ShardedLruCache;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const THREAD_COUNT: usize = 8;
const OPERATIONS_PER_THREAD: usize = 50_000;
const VALUE_SIZE: usize = 64;

#[derive(Clone)]
struct Workload {
    name: String,
    shards: usize,
    capacity_per_shard: usize,
    key_space: usize,
    write_ratio: usize, // Writes per 10 operations
    ttl: Option<Duration>,
}

impl Workload {
    fn new(name: &str, shards: usize, capacity_per_shard: usize, key_space: usize) -> Self {
        Self {
            name: name.to_string(),
            shards,
            capacity_per_shard,
            key_space,
            write_ratio: 3,
            ttl: None,
        }
    }

    fn writes(mut self, write_ratio: usize) -> Self {
        self.write_ratio = write_ratio;
        self
    }

    fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    fn total_capacity(&self) -> usize {
        self.shards * self.capacity_per_shard
    }
}

fn shard_count_workloads() -> Vec<Workload> {
    [1, 4, 16, 64]
        .into_iter()
        .map(|shards| Workload::new(&format!("{} shards", shards), shards, 16_384 / shards, 32_768))
        .collect()
}

fn write_ratio_workloads() -> Vec<Workload> {
    [1, 3, 5, 8]
        .into_iter()
        .map(|ratio| Workload::new(&format!("{}0% writes", ratio), 16, 1_024, 32_768).writes(ratio))
        .collect()
}

fn ttl_workloads() -> Vec<Workload> {
    vec![
        Workload::new("no ttl", 16, 1_024, 32_768),
        Workload::new("ttl 1ms", 16, 1_024, 32_768).ttl(Duration::from_millis(1)),
        Workload::new("ttl 100ms", 16, 1_024, 32_768).ttl(Duration::from_millis(100)),
    ]
}

// Runs the shared read/write mix against whatever `put`/`get` pair is given
fn run_threads<C>(cache: Arc<C>, workload: &Workload, op: fn(&C, String, bool)) -> Duration
where
    C: Send + Sync + 'static,
{
    let start = std::time::Instant::now();
    let handles: Vec<_> = (0..THREAD_COUNT)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let workload = workload.clone();
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                for i in 0..OPERATIONS_PER_THREAD {
                    let key = format!("key_{}", rng.gen_range(0..workload.key_space));
                    op(&cache, key, i % 10 < workload.write_ratio);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    start.elapsed()
}

fn sharded_op(cache: &ShardedLruCache<String, String>, key: String, write: bool) {
    if write {
        cache.put(key, "x".repeat(VALUE_SIZE));
    } else {
        let _ = cache.get(&key);
    }
}

fn moka_op(cache: &MokaCache<String, String>, key: String, write: bool) {
    if write {
        cache.insert(key, "x".repeat(VALUE_SIZE));
    } else {
        let _ = cache.get(&key);
    }
}

fn bench_sharded(workload: &Workload) -> Duration {
    let cache = match workload.ttl {
        Some(ttl) => ShardedLruCache::with_ttl(workload.shards, workload.capacity_per_shard, ttl),
        None => ShardedLruCache::new(workload.shards, workload.capacity_per_shard),
    }
    .unwrap();
    run_threads(Arc::new(cache), workload, sharded_op)
}

fn bench_moka(workload: &Workload) -> Duration {
    let mut builder = MokaCache::builder().max_capacity(workload.total_capacity() as u64);
    if let Some(ttl) = workload.ttl {
        builder = builder.time_to_live(ttl);
    }
    run_threads(Arc::new(builder.build()), workload, moka_op)
}

fn run_benchmark_group(c: &mut Criterion, name: &str, workloads: Vec<Workload>) {
    let plot_config = PlotConfiguration::default().summary_scale(criterion::AxisScale::Linear);

    let mut group = c.benchmark_group(name);
    group.plot_config(plot_config);
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(10);

    for workload in workloads.iter() {
        group.bench_with_input(
            BenchmarkId::new("Sharded LRU", &workload.name),
            workload,
            |b, workload| b.iter(|| bench_sharded(workload)),
        );

        group.bench_with_input(
            BenchmarkId::new("Moka Cache", &workload.name),
            workload,
            |b, workload| b.iter(|| bench_moka(workload)),
        );
    }
    group.finish();
}

fn concurrent_benchmark(c: &mut Criterion) {
    run_benchmark_group(c, "Shard Count Impact", shard_count_workloads());
    run_benchmark_group(c, "Write Ratio Impact", write_ratio_workloads());
    run_benchmark_group(c, "TTL Impact", ttl_workloads());
}

criterion_group!(benches, concurrent_benchmark);
criterion_main!(benches);
