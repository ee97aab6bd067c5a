//! # Reaper Rule Benchmarks
//!
//! | Rule | Input | Target |
//! |------|-------|--------|
//! | `find_orphans` | metadata snapshot for a busy cluster | < 1ms at 10k records |
//! | `select_duplicates` | full runtime listing | < 1ms at 5k containers |

use std::collections::HashMap;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ha_01_reaper::{find_orphans, select_duplicates, ReaperConfig};
use shared_types::{ContainerState, MetadataContainer, RuntimeContainerSummary, SelfHost};

fn metadata_snapshot(size: usize, hosts: usize) -> Vec<MetadataContainer> {
    (0..size)
        .map(|i| {
            let uuid = format!("uuid-{}", i);
            // Every 10th record is stale.
            let label = if i % 10 == 0 {
                format!("uuid-{}-old", i)
            } else {
                uuid.clone()
            };
            MetadataContainer {
                external_id: format!("ext-{}", i),
                host_uuid: format!("host-{}", i % hosts),
                name: format!("container-{}", i),
                labels: HashMap::from([("io.rancher.container.uuid".to_string(), label)]),
                uuid,
            }
        })
        .collect()
}

fn runtime_listing(size: usize) -> Vec<RuntimeContainerSummary> {
    (0..size)
        .map(|i| {
            let mut labels =
                HashMap::from([("io.rancher.container.uuid".to_string(), format!("u{}", i))]);
            if i % 50 == 0 {
                labels.insert(
                    "io.rancher.stack_service.name".to_string(),
                    "network-services/metadata".to_string(),
                );
            }
            RuntimeContainerSummary {
                id: format!("id-{}", i),
                state: if i % 3 == 0 {
                    ContainerState::parse("exited")
                } else {
                    ContainerState::Running
                },
                labels,
                name: format!("/c-{}", i),
            }
        })
        .collect()
}

fn bench_find_orphans(c: &mut Criterion) {
    let mut group = c.benchmark_group("ha-01-find-orphans");
    group.measurement_time(Duration::from_secs(5));
    let config = ReaperConfig::default();

    for size in [100, 1_000, 10_000] {
        let snapshot = metadata_snapshot(size, 20);
        let host = SelfHost {
            uuid: "host-0".to_string(),
            name: "host-0".to_string(),
        };

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &snapshot, |b, snapshot| {
            b.iter(|| {
                black_box(find_orphans(
                    &host,
                    snapshot,
                    &config.uuid_label,
                    config.treat_missing_label_as_orphan,
                ))
            })
        });
    }
    group.finish();
}

fn bench_select_duplicates(c: &mut Criterion) {
    let mut group = c.benchmark_group("ha-01-select-duplicates");
    group.measurement_time(Duration::from_secs(5));
    let config = ReaperConfig::default();

    for size in [100, 1_000, 5_000] {
        let listing = runtime_listing(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &listing, |b, listing| {
            b.iter(|| {
                black_box(select_duplicates(
                    listing,
                    &config.uuid_label,
                    &config.service_name_label,
                    &config.singleton_services,
                ))
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_find_orphans, bench_select_duplicates);
criterion_main!(benches);
