//! Property-based tests using proptest.

use crate::board::{Position, UndoInfo};
use proptest::prelude::*;
use rand::prelude::*;
use rand::Rng;

/// Strategy to generate a random legal move sequence length
fn move_count_strategy() -> impl Strategy<Value = usize> {
    1..=20usize
}

/// Strategy to generate a random seed for move selection
fn seed_strategy() -> impl Strategy<Value = u64> {
    any::<u64>()
}

const START_FENS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "n1n5/PPPk4/8/8/8/8/4Kppp/5N1N b - - 0 1",
];

proptest! {
    /// Property: applying then undoing a move sequence restores the position exactly
    #[test]
    fn prop_apply_undo_restores_state(
        seed in seed_strategy(),
        num_moves in move_count_strategy(),
        fen_idx in 0..START_FENS.len(),
    ) {
        let mut position = Position::from_fen(START_FENS[fen_idx]).unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let initial = position.clone();

        let mut history: Vec<UndoInfo> = Vec::new();
        for _ in 0..num_moves {
            let moves = position.generate_legal_moves().unwrap();
            if moves.is_empty() {
                break;
            }
            let mv = moves.as_slice()[rng.gen_range(0..moves.len())];
            history.push(position.apply_move(&mv).unwrap());
        }

        while let Some(undo) = history.pop() {
            position.undo_move(undo);
        }

        prop_assert_eq!(position.hash(), initial.hash());
        prop_assert_eq!(position, initial);
    }

    /// Property: the incremental hash always matches the recomputed hash
    #[test]
    fn prop_hash_consistency(seed in seed_strategy(), num_moves in move_count_strategy()) {
        let mut position = Position::new();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..num_moves {
            let moves = position.generate_legal_moves().unwrap();
            if moves.is_empty() {
                break;
            }
            let mv = moves.as_slice()[rng.gen_range(0..moves.len())];
            let _undo = position.apply_move(&mv).unwrap();
            prop_assert_eq!(position.hash(), position.compute_hash());
        }
    }

    /// Property: FEN round-trip preserves position
    #[test]
    fn prop_fen_roundtrip(seed in seed_strategy(), num_moves in move_count_strategy()) {
        let mut position = Position::new();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..num_moves {
            let moves = position.generate_legal_moves().unwrap();
            if moves.is_empty() {
                break;
            }
            let mv = moves.as_slice()[rng.gen_range(0..moves.len())];
            let _undo = position.apply_move(&mv).unwrap();
        }

        let restored = Position::from_fen(&position.to_fen()).unwrap();
        prop_assert_eq!(restored, position);
    }

    /// Property: legal moves never leave the mover's king in check
    #[test]
    fn prop_legal_moves_are_legal(seed in seed_strategy()) {
        let mut position = Position::new();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..10 {
            let moves = position.generate_legal_moves().unwrap();
            if moves.is_empty() {
                break;
            }

            let mover = position.side_to_move();
            for mv in moves.iter() {
                let child = position.scoped(mv).unwrap();
                prop_assert!(!child.is_in_check(mover).unwrap(),
                    "Legal move left king in check: {:?}", mv);
            }

            let mv = moves.as_slice()[rng.gen_range(0..moves.len())];
            let _undo = position.apply_move(&mv).unwrap();
        }
    }
}
