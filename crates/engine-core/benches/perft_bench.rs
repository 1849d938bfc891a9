//! perftベンチマーク

use criterion::{criterion_group, criterion_main, Criterion};
use engine_core::position::Position;
use engine_core::search::{perft, perft_ordered};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

fn perft_startpos(c: &mut Criterion) {
    engine_core::init();
    c.bench_function("perft_startpos_d4", |b| {
        let mut pos = Position::new();
        b.iter(|| perft(&mut pos, 4))
    });
}

fn perft_kiwipete(c: &mut Criterion) {
    engine_core::init();
    c.bench_function("perft_kiwipete_d3", |b| {
        let mut pos = Position::from_fen(KIWIPETE).unwrap();
        b.iter(|| perft(&mut pos, 3))
    });
}

fn perft_ordered_startpos(c: &mut Criterion) {
    engine_core::init();
    c.bench_function("perft_ordered_startpos_d3", |b| {
        let mut pos = Position::new();
        b.iter(|| perft_ordered(&mut pos, 3))
    });
}

criterion_group!(
    benches,
    perft_startpos,
    perft_kiwipete,
    perft_ordered_startpos
);
criterion_main!(benches);
