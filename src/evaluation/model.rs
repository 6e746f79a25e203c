//! Model-backed evaluation.
//!
//! The model runtime is a black box behind [`InferenceSession`]; this module only encodes
//! positions, serialises access to the session and turns runtime failures into engine
//! errors.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{error, info};
use parking_lot::Mutex;

use crate::board::Position;
use crate::error::{EngineError, Result};

use super::{encode_position, Evaluator, BOARD_INPUT_SIZE, EXTRA_FEATURES};

/// One loaded model, able to score encoded positions.
///
/// `board` holds [`BOARD_INPUT_SIZE`] values and `extra` holds [`EXTRA_FEATURES`] values,
/// as produced by [`encode_position`]. The output is read as the side to move's score.
pub trait InferenceSession: Send {
    fn run(&mut self, board: &[f32], extra: &[f32]) -> std::result::Result<f32, String>;
}

/// Evaluator that delegates to an [`InferenceSession`].
///
/// Sessions that need `&mut self` are serialised by a mutex so the evaluator stays `Sync`.
pub struct ModelEvaluator<S> {
    session: Mutex<S>,
}

impl<S: InferenceSession> ModelEvaluator<S> {
    #[must_use]
    pub fn new(session: S) -> Self {
        ModelEvaluator {
            session: Mutex::new(session),
        }
    }

    pub fn into_inner(self) -> S {
        self.session.into_inner()
    }
}

impl ModelEvaluator<LinearModel> {
    /// Load a [`LinearModel`] weight file and wrap it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        LinearModel::load(path).map(ModelEvaluator::new)
    }
}

impl<S: InferenceSession> Evaluator for ModelEvaluator<S> {
    fn evaluate(&self, position: &Position) -> Result<f32> {
        let encoded = encode_position(position);
        let output = self.session.lock().run(&encoded.board, &encoded.extra);
        match output {
            Ok(score) if score.is_finite() => Ok(score),
            Ok(score) => {
                error!("model returned non-finite score {score} for {}", position.to_fen());
                Err(EngineError::FailedInference {
                    reason: format!("model returned non-finite score {score}"),
                })
            }
            Err(reason) => {
                error!("inference failed for {}: {reason}", position.to_fen());
                Err(EngineError::FailedInference { reason })
            }
        }
    }
}

/// Number of weights in a [`LinearModel`] file, excluding the bias
pub const LINEAR_MODEL_WEIGHTS: usize = BOARD_INPUT_SIZE + EXTRA_FEATURES;

/// A single-layer model: a weighted sum of the encoded inputs plus a bias.
///
/// The file format is `LINEAR_MODEL_WEIGHTS + 1` little-endian `f32` values: board
/// weights, extra-feature weights, then the bias.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearModel {
    weights: Vec<f32>,
    bias: f32,
}

impl LinearModel {
    /// Build a model from in-memory weights.
    pub fn from_weights(weights: Vec<f32>, bias: f32) -> Result<Self> {
        if weights.len() != LINEAR_MODEL_WEIGHTS {
            return Err(EngineError::FailedToLoadModel {
                reason: format!(
                    "expected {LINEAR_MODEL_WEIGHTS} weights, found {}",
                    weights.len()
                ),
            });
        }
        if !bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return Err(EngineError::FailedToLoadModel {
                reason: "model contains non-finite weights".to_string(),
            });
        }
        Ok(LinearModel { weights, bias })
    }

    /// Load model weights from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let model = Self::read_weights(path).and_then(|(weights, bias)| {
            Self::from_weights(weights, bias).map_err(|err| match err {
                EngineError::FailedToLoadModel { reason } => reason,
                other => other.to_string(),
            })
        });
        match model {
            Ok(model) => {
                info!("loaded linear model from {}", path.display());
                Ok(model)
            }
            Err(reason) => {
                error!("failed to load model {}: {reason}", path.display());
                Err(EngineError::FailedToLoadModel { reason })
            }
        }
    }

    fn read_weights(path: &Path) -> std::result::Result<(Vec<f32>, f32), String> {
        let file = File::open(path).map_err(|err| err.to_string())?;
        let mut reader = BufReader::new(file);

        let mut weights = vec![0.0f32; LINEAR_MODEL_WEIGHTS];
        let mut buf = [0u8; 4];
        for weight in &mut weights {
            reader.read_exact(&mut buf).map_err(|err| err.to_string())?;
            *weight = f32::from_le_bytes(buf);
        }
        reader.read_exact(&mut buf).map_err(|err| err.to_string())?;
        let bias = f32::from_le_bytes(buf);

        // Trailing bytes mean the file was written for a different layout
        let mut rest = Vec::new();
        reader.read_to_end(&mut rest).map_err(|err| err.to_string())?;
        if !rest.is_empty() {
            return Err(format!("{} unexpected trailing bytes", rest.len()));
        }
        Ok((weights, bias))
    }
}

impl InferenceSession for LinearModel {
    fn run(&mut self, board: &[f32], extra: &[f32]) -> std::result::Result<f32, String> {
        if board.len() != BOARD_INPUT_SIZE || extra.len() != EXTRA_FEATURES {
            return Err(format!(
                "input shape mismatch: board {} extra {}",
                board.len(),
                extra.len()
            ));
        }
        let dot: f32 = board
            .iter()
            .chain(extra)
            .zip(&self.weights)
            .map(|(x, w)| x * w)
            .sum();
        Ok(dot + self.bias)
    }
}
