use std::env;
use std::process::ExitCode;

use chess_search::board::Position;
use chess_search::evaluation::{Evaluator, LinearModel, MaterialEvaluator, ModelEvaluator};
use chess_search::search::{EngineConfig, SearchEngine};
use chess_search::Result;

const USAGE: &str = "usage: best_move <fen|startpos> [depth] [model-weights] [-- move1 move2 ...]";

fn run<E: Evaluator>(evaluator: E, position: &mut Position, depth: usize, line: &[String]) -> Result<()> {
    let engine = SearchEngine::new(evaluator, EngineConfig::default())?;

    // Moves are parsed against a scratch copy; search_line replays them itself
    let mut scratch = position.clone();
    let mut moves = Vec::with_capacity(line.len());
    for text in line {
        let mv = scratch.parse_move(text)?;
        let _ = scratch.play_legal(&mv)?;
        moves.push(mv);
    }

    let result = engine.search_line(position, &moves, depth)?;
    println!("fen: {}", scratch.to_fen());
    println!("{result}");
    println!(
        "nodes: {} evaluations: {} elapsed: {}ms",
        result.stats.nodes,
        result.stats.evaluations,
        result.stats.elapsed.as_millis()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let (options, line) = match args.iter().position(|arg| arg == "--") {
        Some(split) => (&args[..split], &args[split + 1..]),
        None => (&args[..], &args[args.len()..]),
    };
    let Some(fen) = options.first() else {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    };

    let depth = match options.get(1).map(|text| text.parse::<usize>()) {
        None => 6,
        Some(Ok(depth)) => depth,
        Some(Err(_)) => {
            eprintln!("invalid depth\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    let parsed = if fen == "startpos" {
        Ok(Position::new())
    } else {
        Position::from_fen(fen)
    };
    let mut position = match parsed {
        Ok(position) => position,
        Err(err) => {
            eprintln!("error [{}]: {err}", err.code());
            return ExitCode::FAILURE;
        }
    };

    let outcome = match options.get(2) {
        Some(path) => ModelEvaluator::<LinearModel>::load(path)
            .and_then(|evaluator| run(evaluator, &mut position, depth, line)),
        None => run(MaterialEvaluator, &mut position, depth, line),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error [{}]: {err}", err.code());
            ExitCode::FAILURE
        }
    }
}
