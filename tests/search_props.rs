//! Property-based search tests over random playouts.

use proptest::prelude::*;
use rand::prelude::*;
use rand::Rng;

use chess_search::board::Position;
use chess_search::evaluation::MaterialEvaluator;
use chess_search::search::{EngineConfig, SearchEngine};

/// Random legal playout of up to `plies` moves from the start position
fn playout(seed: u64, plies: usize) -> Position {
    let mut position = Position::new();
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..plies {
        let moves = position.generate_legal_moves().unwrap();
        if moves.is_empty() {
            break;
        }
        let mv = moves.as_slice()[rng.gen_range(0..moves.len())];
        let _undo = position.apply_move(&mv).unwrap();
    }
    position
}

fn engine() -> SearchEngine<MaterialEvaluator> {
    let config = EngineConfig {
        tt_entries: 1 << 14,
        ..EngineConfig::default()
    };
    SearchEngine::new(MaterialEvaluator, config).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Property: the PV is a legal line no longer than the depth, and the search
    /// leaves the position untouched
    #[test]
    fn prop_pv_is_legal(seed in any::<u64>(), plies in 0..30usize, depth in 1..=3usize) {
        let mut position = playout(seed, plies);
        let before = position.clone();
        let result = engine().search(&mut position, depth).unwrap();

        prop_assert_eq!(&position, &before);
        prop_assert!(result.pv_length <= result.depth);
        prop_assert!(result.depth <= depth);
        prop_assert_eq!(result.pv().first().copied(), result.best_move);

        let mut line = position.clone();
        for mv in result.pv() {
            prop_assert!(line.play_legal(mv).is_ok(), "illegal pv move {} in {}", mv, line.to_fen());
        }
    }

    /// Property: a second search with the table already warm returns the same score.
    /// Ties may resolve to a different move once cached moves reorder the root.
    #[test]
    fn prop_warm_table_keeps_score(seed in any::<u64>(), plies in 0..30usize, depth in 2..=3usize) {
        let mut position = playout(seed, plies);
        let engine = engine();
        let cold = engine.search(&mut position, depth).unwrap();
        let warm = engine.search(&mut position, depth).unwrap();
        prop_assert_eq!(cold.score, warm.score);
        prop_assert_eq!(cold.best_move.is_some(), warm.best_move.is_some());
        if let Some(mv) = warm.best_move {
            prop_assert!(position.clone().play_legal(&mv).is_ok());
        }
    }
}
