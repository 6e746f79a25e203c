//! Benchmarks for move generation, evaluation and search.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chess_search::board::Position;
use chess_search::evaluation::{
    encode_position, Evaluator, LinearModel, MaterialEvaluator, ModelEvaluator, LINEAR_MODEL_WEIGHTS,
};
use chess_search::search::{EngineConfig, SearchEngine};

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const MIDDLEGAME: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4";

fn position(fen: &str) -> Position {
    Position::from_fen(fen).expect("benchmark FEN")
}

fn bench_perft(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");

    let mut start = Position::new();
    for depth in 1..=4 {
        group.bench_with_input(BenchmarkId::new("startpos", depth), &depth, |b, &depth| {
            b.iter(|| start.perft(black_box(depth)))
        });
    }

    let mut kiwipete = position(KIWIPETE);
    for depth in 1..=3 {
        group.bench_with_input(BenchmarkId::new("kiwipete", depth), &depth, |b, &depth| {
            b.iter(|| kiwipete.perft(black_box(depth)))
        });
    }

    group.finish();
}

fn bench_movegen(c: &mut Criterion) {
    let mut group = c.benchmark_group("movegen");

    for (name, fen) in [
        ("startpos", "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"),
        ("middlegame", MIDDLEGAME),
        ("kiwipete", KIWIPETE),
    ] {
        let mut board = position(fen);
        group.bench_function(BenchmarkId::new("legal", name), |b| {
            b.iter(|| black_box(board.generate_legal_moves()))
        });
        let board = position(fen);
        let side = board.side_to_move();
        group.bench_function(BenchmarkId::new("pseudo_legal", name), |b| {
            b.iter(|| black_box(board.generate_pseudo_legal_moves(side)))
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");
    group.sample_size(10);

    let config = EngineConfig {
        tt_entries: 1 << 18,
        ..EngineConfig::default()
    };

    for depth in [3, 4, 5] {
        group.bench_with_input(BenchmarkId::new("startpos_cold", depth), &depth, |b, &depth| {
            b.iter(|| {
                let engine = SearchEngine::new(MaterialEvaluator, config).expect("engine");
                let mut board = Position::new();
                engine.search(&mut board, depth)
            })
        });
    }

    // Same engine across iterations, so the table stays warm
    let engine = SearchEngine::new(MaterialEvaluator, config).expect("engine");
    for depth in [3, 4] {
        group.bench_with_input(BenchmarkId::new("middlegame_warm", depth), &depth, |b, &depth| {
            b.iter(|| {
                let mut board = position(MIDDLEGAME);
                engine.search(&mut board, depth)
            })
        });
    }

    group.finish();
}

fn bench_eval(c: &mut Criterion) {
    let mut group = c.benchmark_group("eval");

    let weights: Vec<f32> = (0..LINEAR_MODEL_WEIGHTS).map(|i| (i % 7) as f32 * 0.01).collect();
    let model = ModelEvaluator::new(LinearModel::from_weights(weights, 0.0).expect("weights"));

    for (name, fen) in [("middlegame", MIDDLEGAME), ("endgame", "8/5k2/8/8/8/8/5K2/4R3 w - - 0 1")] {
        let board = position(fen);
        group.bench_with_input(BenchmarkId::new("material", name), &board, |b, board| {
            b.iter(|| black_box(MaterialEvaluator.evaluate(board)))
        });
        group.bench_with_input(BenchmarkId::new("encode", name), &board, |b, board| {
            b.iter(|| black_box(encode_position(board)))
        });
        group.bench_with_input(BenchmarkId::new("linear_model", name), &board, |b, board| {
            b.iter(|| black_box(model.evaluate(board)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_perft, bench_movegen, bench_search, bench_eval);
criterion_main!(benches);
