use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::tree::ConfigTree;

/// Errors that can occur while loading a [`ConfigTree`].
#[derive(Debug, Error)]
pub enum ParseError {
    /// Input was not a JSON object of resource path -> item.
    #[error("failed to parse configuration tree: {0}")]
    Json(#[from] serde_json::Error),
    /// Failed to read input file.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    /// A resource path did not start at a partition root.
    #[error("malformed resource path: {0}")]
    Malformed(String),
}

/// Parse JSON bytes into a [`ConfigTree`].
pub fn parse(input: &[u8]) -> Result<ConfigTree, ParseError> {
    let tree: ConfigTree = serde_json::from_slice(input)?;
    if let Some((path, _)) = tree.iter().find(|(path, _)| !path.starts_with('/')) {
        return Err(ParseError::Malformed(path.clone()));
    }
    Ok(tree)
}

/// Read and parse a configuration tree file.
pub fn parse_file(path: &Path) -> Result<ConfigTree, ParseError> {
    let bytes = fs::read(path)?;
    parse(&bytes)
}
