//! Foundation types for Grove, the hierarchical typed-array container store.
//!
//! This crate provides the vocabulary shared by every other Grove crate.
//! Every other Grove crate depends on `grove-types`.
//!
//! # Key Types
//!
//! - [`TypeClass`] — Declared element type class of a dataset, as reported by a container
//! - [`ElementKind`] — In-memory numeric representation chosen for a dataset's values
//! - [`ChildKind`] — Classification of a named child during hierarchy traversal
//! - [`Shape`] — Rank and per-dimension extents of a dataset

pub mod element;
pub mod shape;

pub use element::{ChildKind, ElementKind, TypeClass};
pub use shape::Shape;
