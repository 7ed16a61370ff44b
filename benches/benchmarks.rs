//! Performance benchmarks for podchaosmonkey
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::runtime::reflector;
use kube::runtime::watcher::Event as WatchEvent;

use podchaosmonkey::chaos::{CandidateKey, RandomSelector, VictimSelector};
use podchaosmonkey::k8s::{CandidateMirror, PodMirror};

fn pods(count: usize) -> Vec<Pod> {
    (0..count)
        .map(|i| Pod {
            metadata: ObjectMeta {
                name: Some(format!("pod-{}", i)),
                namespace: Some("workloads".to_string()),
                ..Default::default()
            },
            ..Default::default()
        })
        .collect()
}

/// Benchmark random victim selection over candidate sets of varying size
fn bench_random_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("random_selection");

    for count in [1, 10, 100, 1000].iter() {
        let keys: Vec<CandidateKey> = (0..*count)
            .map(|i| CandidateKey::new("workloads", &format!("pod-{}", i)))
            .collect();

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("select", count), &keys, |b, keys| {
            b.iter(|| RandomSelector.select(black_box(keys)));
        });
    }

    group.finish();
}

/// Benchmark the per-cycle reads against a populated mirror
fn bench_mirror_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("mirror_reads");

    for count in [10, 100, 1000].iter() {
        let (store, mut writer) = reflector::store::<Pod>();
        writer.apply_watcher_event(&WatchEvent::Restarted(pods(*count)));
        let mirror = PodMirror::new(store);
        let probe = CandidateKey::new("workloads", "pod-0");

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("list_keys", count), &mirror, |b, mirror| {
            b.iter(|| black_box(mirror.list_candidate_keys()));
        });
        group.bench_with_input(BenchmarkId::new("get_by_key", count), &mirror, |b, mirror| {
            b.iter(|| black_box(mirror.get_by_key(black_box(&probe))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_random_selection, bench_mirror_reads);

criterion_main!(benches);
