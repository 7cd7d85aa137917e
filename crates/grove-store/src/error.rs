use thiserror::Error;

use grove_container::ContainerError;
use grove_types::TypeClass;

/// Errors from constructing a single typed array.
#[derive(Debug, Error)]
pub enum ArrayError {
    /// The dataset's declared class has no in-memory representation.
    #[error("unsupported element type class: {class}")]
    UnsupportedType { class: TypeClass },

    /// Buffer allocation failed.
    #[error("failed to allocate {bytes} byte buffer")]
    Allocation { bytes: usize },

    /// The bulk read returned fewer bytes than the computed buffer size.
    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    /// The product of the extents overflows.
    #[error("element count overflows for extents {extents:?}")]
    ExtentOverflow { extents: Vec<u64> },

    /// The container reported an error during metadata or payload access.
    #[error("container error: {0}")]
    Container(#[from] ContainerError),
}

/// Errors from opening or querying a hierarchical store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The container could not be opened at all.
    #[error("cannot open container {path}: {source}")]
    Open {
        path: String,
        source: ContainerError,
    },

    /// A dataset failed to load; the whole open is aborted.
    #[error("failed to load dataset {path}: {source}")]
    Load { path: String, source: ArrayError },

    /// The container reported an error while enumerating the hierarchy.
    #[error("traversal failed at {path}: {source}")]
    Traverse {
        path: String,
        source: ContainerError,
    },

    /// The hierarchy nests deeper than the configured bound.
    #[error("hierarchy at {path} exceeds maximum depth {max}")]
    TooDeep { path: String, max: usize },

    /// A child of unknown kind was found and the policy says fail.
    #[error("child of unknown kind at {path}")]
    UnknownChild { path: String },

    /// Lookup miss; the only error handled locally after open.
    #[error("path not found: {path}")]
    NotFound { path: String },

    /// The path names a group where a dataset was requested.
    #[error("not a dataset: {path}")]
    NotADataset { path: String },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
