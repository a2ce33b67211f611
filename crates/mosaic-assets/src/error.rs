use std::path::PathBuf;

use mosaic_process::ProcessError;

/// Failure reported by an importer while decoding a file.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors that can occur while loading a scene.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(PathBuf),

    #[error("I/O error loading '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("no importer can read '{0}'")]
    NoImporter(PathBuf),

    #[error("{importer} importer failed on '{path}': {source}")]
    Parse {
        importer: &'static str,
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Process(#[from] ProcessError),
}
