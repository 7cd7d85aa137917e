use thiserror::Error;

/// Errors from container backends.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// The container could not be opened at all.
    #[error("cannot open container {path}: {reason}")]
    Open { path: String, reason: String },

    /// I/O error from the underlying backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The named child does not exist at this location.
    #[error("no such child: {name}")]
    ChildNotFound { name: String },

    /// The named child exists but is not a group.
    #[error("not a group: {name}")]
    NotAGroup { name: String },

    /// The named child exists but is not a dataset.
    #[error("not a dataset: {name}")]
    NotADataset { name: String },

    /// The container's contents are malformed.
    #[error("corrupt container: {reason}")]
    Corrupt { reason: String },
}

/// Result alias for container operations.
pub type ContainerResult<T> = Result<T, ContainerError>;
