//! Failures of a `strata` invocation and the exit code each one ends with.
//!
//! | code | meaning                                              |
//! |------|------------------------------------------------------|
//! | 2    | bad arguments, reported by clap before `run` starts  |
//! | 10   | the scene's layer stack could not be built           |
//! | 11   | the scene file or the output image is unreachable    |
//! | 12   | the scene file or a flag value does not make sense   |
//! | 13   | JSON output could not be produced                    |
//! | 14   | the render was stopped before it finished            |

use std::path::{Path, PathBuf};
use strata_core::LayerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Unknown layer kind, bad parameter or invalid canvas in the scene.
    #[error(transparent)]
    Layer(LayerError),

    #[error("cannot read scene {}: {source}", path.display())]
    SceneRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scene {}: {source}", path.display())]
    SceneParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value for --{flag}: {value}")]
    Flag { flag: &'static str, value: String },

    /// The rendered image could not be encoded or saved.
    #[error("cannot write {}: {reason}", path.display())]
    Output { path: PathBuf, reason: String },

    #[error("cannot format output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("render cancelled")]
    Cancelled,
}

impl CliError {
    /// Wraps a failed image write with the path it was aimed at.
    pub fn output(path: &Path, err: LayerError) -> Self {
        match err {
            LayerError::Io(reason) => CliError::Output {
                path: path.to_path_buf(),
                reason,
            },
            other => CliError::from(other),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Layer(LayerError::Io(_)) => 11,
            CliError::Layer(_) => 10,
            CliError::SceneRead { .. } | CliError::Output { .. } => 11,
            CliError::SceneParse { .. } | CliError::Flag { .. } => 12,
            CliError::Json(_) => 13,
            CliError::Cancelled => 14,
        }
    }
}

impl From<LayerError> for CliError {
    fn from(e: LayerError) -> Self {
        match e {
            LayerError::Cancelled => CliError::Cancelled,
            other => CliError::Layer(other),
        }
    }
}
