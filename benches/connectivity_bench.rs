use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use mesh_remap::connectivity::{Idx, IrregularConnectivity, MultiBlockConnectivity};

fn random_rows(n: usize, cols: usize, seed: u64) -> Vec<Idx> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..n * cols).map(|_| rng.gen_range(0..n as Idx)).collect()
}

fn bench_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");
    for &rows in &[1_000usize, 10_000, 100_000] {
        let values = random_rows(rows, 4, 42);
        group.bench_with_input(BenchmarkId::new("add_values", rows), &rows, |b, &rows| {
            b.iter(|| {
                let mut conn = IrregularConnectivity::new("bench");
                conn.add_values(rows, 4, &values).unwrap();
                conn
            })
        });
    }
    group.finish();
}

fn bench_splice(c: &mut Criterion) {
    let mut group = c.benchmark_group("splice");
    for &rows in &[1_000usize, 10_000] {
        let values = random_rows(rows, 4, 7);
        group.bench_with_input(
            BenchmarkId::new("insert_middle", rows),
            &rows,
            |b, &rows| {
                b.iter(|| {
                    let mut conn = IrregularConnectivity::new("bench");
                    conn.add_values(rows, 4, &values).unwrap();
                    conn.insert_uniform(rows / 2, 16, 4).unwrap();
                    conn
                })
            },
        );
    }
    group.finish();
}

fn bench_block_views(c: &mut Criterion) {
    let rows = 50_000usize;
    let tri = random_rows(rows, 3, 1);
    let quad = random_rows(rows, 4, 2);
    let mut conn = MultiBlockConnectivity::new("bench");
    conn.add_values(rows, 3, &tri).unwrap();
    conn.add_values(rows, 4, &quad).unwrap();

    c.bench_function("block_row_sum", |b| {
        b.iter(|| {
            let mut acc: i64 = 0;
            for blk in 0..conn.blocks() {
                let view = conn.block(blk);
                for r in 0..view.rows() {
                    acc += view.row(r).iter().map(|&v| v as i64).sum::<i64>();
                }
            }
            acc
        })
    });
}

criterion_group!(benches, bench_append, bench_splice, bench_block_views);
criterion_main!(benches);
