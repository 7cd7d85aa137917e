//! Hierarchical typed-array store for Grove.
//!
//! Opens a container, recursively walks its group/dataset hierarchy, and
//! eagerly reads every dataset into an exclusively owned, typed buffer.
//! After open the tree is immutable: lookups are pure reads and safe from
//! any number of threads without locking.
//!
//! # Architecture
//!
//! - **[`TypedArray`]**: one dataset — shape, element kind, and a fully
//!   read contiguous buffer; no knowledge of the surrounding hierarchy
//! - **[`Node`]**: sum type of group mapping and dataset leaf
//! - **[`HierarchicalStore`]**: owns the root mapping, built all-or-nothing
//!   at open; exposes lookup by path
//! - **[`LoadOptions`]**: explicit skip/fail policy knobs and the recursion
//!   depth bound — the store has no ambient configuration

pub mod array;
pub mod error;
pub mod node;
pub mod options;
pub mod store;

pub use array::TypedArray;
pub use error::{ArrayError, StoreError, StoreResult};
pub use node::Node;
pub use options::{LoadOptions, UnsupportedPolicy};
pub use store::HierarchicalStore;
