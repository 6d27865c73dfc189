//! Whole-file loading of the source to analyse.
//!
//! Failures are returned, never panicked on: the caller reports them and abandons
//! the current run.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error, info};

use crate::contract::SourceText;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path:?} is not valid UTF-8 text: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("{path:?} is empty, nothing to analyse")]
    Empty { path: PathBuf },
}

/// Read `path` fully and decode it as UTF-8.
pub fn load_source<P: AsRef<Path>>(path: P) -> Result<SourceText, LoadError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Reading source file");

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!(error = ?e, path = %path.display(), "Failed to read source file");
            return Err(LoadError::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };

    let content = String::from_utf8(bytes).map_err(|e| {
        error!(path = %path.display(), "Source file is not valid UTF-8");
        LoadError::Decode {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    if content.is_empty() {
        error!(path = %path.display(), "Source file is empty");
        return Err(LoadError::Empty {
            path: path.to_path_buf(),
        });
    }

    info!(path = %path.display(), bytes = content.len(), "Loaded source file");
    Ok(SourceText {
        path: path.to_path_buf(),
        content,
    })
}
