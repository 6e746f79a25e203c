use serde::Deserialize;

use chess_search::board::Position;
use chess_search::evaluation::MaterialEvaluator;
use chess_search::search::{EngineConfig, SearchEngine, MATE_SCORE};

#[derive(Deserialize)]
struct ProblemSet {
    problems: Vec<Problem>,
}

#[derive(Deserialize)]
struct Problem {
    #[serde(rename = "type")]
    kind: String,
    fen: String,
    moves: String,
}

fn mate_in_one_problems() -> Vec<Problem> {
    let data = include_str!("data/mates.json");
    let set: ProblemSet = serde_json::from_str(data).expect("invalid mates.json");
    set.problems
        .into_iter()
        .filter(|p| p.kind == "Mate in One")
        .collect()
}

fn first_move(moves: &str) -> String {
    let first = moves.split(';').next().unwrap_or(moves);
    first.replace('-', "")
}

#[test]
fn listed_solutions_deliver_mate() {
    let problems = mate_in_one_problems();
    assert!(!problems.is_empty());

    for problem in &problems {
        let mut position = Position::from_fen(&problem.fen).unwrap();
        let mv = position.parse_move(&first_move(&problem.moves)).unwrap();
        let _ = position.play_legal(&mv).unwrap();
        assert!(
            position.is_checkmate().unwrap(),
            "mate in one failed for fen: {} move: {}",
            problem.fen,
            problem.moves
        );
    }
}

#[test]
fn engine_finds_every_mate_in_one() {
    let config = EngineConfig {
        tt_entries: 1 << 16,
        ..EngineConfig::default()
    };
    let engine = SearchEngine::new(MaterialEvaluator, config).unwrap();

    for problem in mate_in_one_problems() {
        let mut position = Position::from_fen(&problem.fen).unwrap();
        let result = engine.search(&mut position, 2).unwrap();
        assert!(result.score >= MATE_SCORE, "no mate score for {}", problem.fen);

        let best = result.best_move.expect("a mating move");
        let _ = position.play_legal(&best).unwrap();
        assert!(
            position.is_checkmate().unwrap(),
            "engine played {best} in {}",
            problem.fen
        );
    }
}
