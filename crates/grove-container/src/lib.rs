//! Container access seam for Grove.
//!
//! A container is an external hierarchy of named groups and datasets,
//! analogous to a filesystem. This crate defines the read-only contract a
//! backend must satisfy to feed the store, and ships one backend: an
//! in-memory container used for tests, embedding, and document building.
//!
//! # Architecture
//!
//! - **[`GroupSource`]**: a location that can enumerate, classify, and open
//!   its named children
//! - **[`DatasetSource`]**: an open dataset exposing shape and type metadata
//!   plus a single bulk read
//! - **[`MemoryContainer`]**: `BTreeMap`-tree backend built through a
//!   path-based insert API

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{ContainerError, ContainerResult};
pub use memory::{MemoryContainer, MemoryDataset, MemoryGroup, MemoryNode};
pub use traits::{DatasetSource, GroupSource};
