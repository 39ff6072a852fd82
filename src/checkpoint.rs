//! Checkpoint persistence for training runs.
//!
//! A checkpoint is a small JSON document carrying both weight vectors and
//! the cumulative episode count. Archives written before the panic-mode
//! split hold a single `weights` array; loading one duplicates that vector
//! into both slots so old runs keep resuming cleanly.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::eval::{WeightPair, Weights, NUM_FEATURES};

#[derive(thiserror::Error, Debug)]
pub enum CheckpointError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("checkpoint carries no weight vectors")]
    MissingWeights,
}

/// Persisted training state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Checkpoint {
    pub weights: WeightPair,
    pub episodes: u64,
}

#[derive(Serialize)]
struct FileRepr<'a> {
    weights_normal: &'a Weights,
    weights_panic: &'a Weights,
    episodes: u64,
}

#[derive(Deserialize)]
struct FileReprOwned {
    weights_normal: Option<[f64; NUM_FEATURES]>,
    weights_panic: Option<[f64; NUM_FEATURES]>,
    /// Legacy single-vector field, before the panic split.
    weights: Option<[f64; NUM_FEATURES]>,
    #[serde(default)]
    episodes: u64,
}

impl Checkpoint {
    /// Write the checkpoint as pretty-printed JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CheckpointError> {
        let repr = FileRepr {
            weights_normal: &self.weights.normal,
            weights_panic: &self.weights.panic,
            episodes: self.episodes,
        };
        let bytes = serde_json::to_vec_pretty(&repr)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Load a checkpoint, tolerating the legacy single-vector layout.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CheckpointError> {
        let bytes = fs::read(path)?;
        let raw: FileReprOwned = serde_json::from_slice(&bytes)?;
        let weights = match (raw.weights_normal, raw.weights_panic, raw.weights) {
            (Some(normal), Some(panic), _) => WeightPair {
                normal: Weights(normal),
                panic: Weights(panic),
            },
            // One of the split vectors present: splat it rather than invent
            // a zero vector for the missing mode.
            (Some(only), None, _) | (None, Some(only), _) => WeightPair::splat(Weights(only)),
            (None, None, Some(legacy)) => WeightPair::splat(Weights(legacy)),
            (None, None, None) => return Err(CheckpointError::MissingWeights),
        };
        Ok(Checkpoint {
            weights,
            episodes: raw.episodes,
        })
    }

    /// Load `path` if it exists, otherwise start fresh. IO or parse failures
    /// on an existing file still surface as errors.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, CheckpointError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Checkpoint::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::Weights;

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ckpt.json");
        let ckpt = Checkpoint {
            weights: WeightPair {
                normal: Weights([0.1, 0.2, 0.3, 0.4, 0.5, 0.6]),
                panic: Weights([1.0, 0.0, 2.0, 0.0, 3.0, 0.0]),
            },
            episodes: 4200,
        };
        ckpt.save(&path).unwrap();
        assert_eq!(Checkpoint::load(&path).unwrap(), ckpt);
    }

    #[test]
    fn legacy_single_vector_populates_both_modes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.json");
        std::fs::write(
            &path,
            r#"{"weights": [1.0, 2.0, 3.0, 4.0, 5.0, 6.0], "episodes": 17}"#,
        )
        .unwrap();
        let ckpt = Checkpoint::load(&path).unwrap();
        let expected = Weights([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(ckpt.weights.normal, expected);
        assert_eq!(ckpt.weights.panic, expected);
        assert_eq!(ckpt.episodes, 17);
    }

    #[test]
    fn missing_weights_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, r#"{"episodes": 3}"#).unwrap();
        assert!(matches!(
            Checkpoint::load(&path),
            Err(CheckpointError::MissingWeights)
        ));
    }

    #[test]
    fn load_or_default_on_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let ckpt = Checkpoint::load_or_default(dir.path().join("nope.json")).unwrap();
        assert_eq!(ckpt, Checkpoint::default());
        assert_eq!(ckpt.episodes, 0);
    }
}
