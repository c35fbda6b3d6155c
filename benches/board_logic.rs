use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tui_collapse::adapter::server::build_observation;
use tui_collapse::core::{find_cluster, partition, Board, BoardSnapshot, LevelConfig};

fn bench_new_board(c: &mut Criterion) {
    let level = LevelConfig::new(16, 16, 5, 2, 4, 5).unwrap();
    let mut seed = 0u32;
    c.bench_function("new_board_16x16", |b| {
        b.iter(|| {
            seed = seed.wrapping_add(1);
            black_box(Board::with_seed(level, seed))
        })
    });
}

fn bench_partition(c: &mut Criterion) {
    let board = Board::with_seed(LevelConfig::new(16, 16, 5, 2, 4, 5).unwrap(), 12345);
    c.bench_function("partition_16x16", |b| {
        b.iter(|| black_box(partition(black_box(board.grid()))))
    });

    let one_color = Board::with_seed(LevelConfig::new(32, 32, 1, 2, 4, 5).unwrap(), 1);
    c.bench_function("find_cluster_32x32_single_color", |b| {
        b.iter(|| black_box(find_cluster(one_color.grid(), black_box(0), black_box(0))))
    });
}

fn bench_select(c: &mut Criterion) {
    let mut board = Board::with_seed(LevelConfig::default(), 12345);
    let (columns, rows) = (board.grid().columns() as i32, board.grid().rows() as i32);
    let mut i = 0i32;

    c.bench_function("select_default_level", |b| {
        b.iter(|| {
            if board.is_deadlocked() {
                board.reset();
            }
            i = i.wrapping_add(7);
            let outcome = board.select(i.rem_euclid(columns), (i / columns).rem_euclid(rows));
            board.drain_events().for_each(drop);
            black_box(outcome)
        })
    });
}

fn bench_observation(c: &mut Criterion) {
    let board = Board::with_seed(LevelConfig::default(), 12345);
    let mut snap = BoardSnapshot::default();

    c.bench_function("snapshot_and_observation", |b| {
        b.iter(|| {
            board.snapshot_into(&mut snap);
            black_box(build_observation(&snap, 1))
        })
    });
}

criterion_group!(
    benches,
    bench_new_board,
    bench_partition,
    bench_select,
    bench_observation
);
criterion_main!(benches);
