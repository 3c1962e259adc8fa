use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use json_entities::{Client, ClientStore};
use std::hint::black_box;
use std::path::PathBuf;
use std::time::Duration;

fn bench_path(name: &str, size: usize) -> PathBuf {
    std::env::temp_dir().join(format!("json_entities_bench_{}_{}.json", name, size))
}

fn seeded(name: &str, size: usize) -> (ClientStore, PathBuf) {
    let path = bench_path(name, size);
    let _ = std::fs::remove_file(&path);
    let db = ClientStore::open(&path);
    for i in 0..size {
        db.create_client(format!("client-{i}"), format!("c{i}@bench.test")).unwrap();
    }
    (db, path)
}

fn bench_create(c: &mut Criterion) {
    let mut group = c.benchmark_group("create");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(8));
    for size in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("client", size), &size, |b, &size| {
            let (db, path) = seeded("create", size);
            let mut n = 0u64;
            b.iter(|| {
                n += 1;
                let created = db.create_client(format!("new-{n}"), format!("new{n}@bench.test")).unwrap();
                db.remove(created.id.unwrap());
            });
            let _ = std::fs::remove_file(&path);
        });
    }
}

fn bench_list_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_find");
    for size in [100, 1000] {
        group.bench_with_input(BenchmarkId::new("client", size), &size, |b, &size| {
            let (db, path) = seeded("list", size);
            b.iter(|| {
                black_box(db.list());
                black_box(db.find(size as i64 / 2));
            });
            let _ = std::fs::remove_file(&path);
        });
    }
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");
    group.sample_size(20);
    for size in [100, 1000] {
        group.bench_with_input(BenchmarkId::new("client", size), &size, |b, &size| {
            let (db, path) = seeded("update", size);
            let mut n = 0u64;
            b.iter(|| {
                n += 1;
                let patch = Client {
                    id: Some(1),
                    name: format!("renamed-{n}"),
                    ..Client::default()
                };
                db.update(patch).unwrap();
            });
            let _ = std::fs::remove_file(&path);
        });
    }
}

criterion_group!(benches, bench_create, bench_list_find, bench_update);
criterion_main!(benches);
