use criterion::{criterion_group, criterion_main};


use batch_apply::register_benchmarks as register_batch_benchmarks;
use path_search::register_benchmarks as register_path_search_benchmarks;
use snapshot::register_benchmarks as register_snapshot_benchmarks;

criterion_group!(
    benches,
    register_batch_benchmarks,
    register_path_search_benchmarks,
    register_snapshot_benchmarks,
);

criterion_main!(benches);
