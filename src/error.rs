use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while reading or writing an aquarium file.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("could not read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("could not write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("malformed aquarium XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed aquarium XML: {0}")]
    Structure(String),

    #[error("aquarium XML is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
}
