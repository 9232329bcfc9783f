use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_path_to_error::Segment;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentReadError {
    #[error("failed to read content file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed content in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed content in {path} at {field_path}: {source}")]
    MalformedField {
        path: PathBuf,
        field_path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub fn read_json_document<T: DeserializeOwned>(path: &Path) -> Result<T, ContentReadError> {
    let raw = fs::read_to_string(path).map_err(|source| ContentReadError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json_document(&raw, path)
}

/// `origin` only labels errors; nothing is read from it.
pub fn parse_json_document<T: DeserializeOwned>(
    raw: &str,
    origin: &Path,
) -> Result<T, ContentReadError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, T>(&mut deserializer).map_err(|error| {
        // Syntax errors before any field is entered report a path of `?`.
        let at_root = error
            .path()
            .iter()
            .all(|segment| matches!(segment, Segment::Unknown));
        let field_path = error.path().to_string();
        let source = error.into_inner();
        if at_root {
            ContentReadError::Malformed {
                path: origin.to_path_buf(),
                source,
            }
        } else {
            ContentReadError::MalformedField {
                path: origin.to_path_buf(),
                field_path,
                source,
            }
        }
    })
}
