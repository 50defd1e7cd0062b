use thiserror::Error;

/// Errors that abort script generation for one operation.
///
/// These signal a broken invariant of the diff producer or tree normalizer;
/// missing cross-references are logged and skipped instead.
#[derive(Debug, Error)]
pub enum ScriptError {
    /// A diff entry arrived with no resource path.
    #[error("diff entry has an empty path")]
    EmptyPath,
    /// The entry did not name the resource type needed for dispatch.
    #[error("diff entry for {path} has no {side} command")]
    MissingCommand { path: String, side: &'static str },
    /// A create was requested for an item absent from the desired tree.
    #[error("desired tree has no item {0}")]
    MissingDesired(String),
    /// A nested property bag was expected but a scalar was found.
    #[error("{resource}: expected nested properties under '{key}'")]
    ExpectedBag { resource: String, key: String },
    /// A resource path could not be split into partition and name.
    #[error("malformed resource path: {0}")]
    MalformedPath(String),
    /// Target platform version could not be interpreted.
    #[error("invalid target version '{0}'")]
    Version(String),
}

pub type Result<T> = std::result::Result<T, ScriptError>;
