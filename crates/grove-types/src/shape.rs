use serde::{Deserialize, Serialize};

use crate::element::ElementKind;

/// Rank and per-dimension extents of a dataset.
///
/// A rank-0 shape is a scalar: its element count is the empty product, 1.
/// A shape with any zero extent has element count 0, which is valid.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    extents: Vec<u64>,
}

impl Shape {
    /// Create a shape from per-dimension extents.
    pub fn new(extents: Vec<u64>) -> Self {
        Self { extents }
    }

    /// The rank-0 scalar shape.
    pub fn scalar() -> Self {
        Self {
            extents: Vec::new(),
        }
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.extents.len()
    }

    /// Per-dimension extents, in order.
    pub fn extents(&self) -> &[u64] {
        &self.extents
    }

    /// Total element count: the product of all extents.
    ///
    /// Returns `None` if the product overflows `u64`. The empty product
    /// (rank 0) is 1; any zero extent yields 0.
    pub fn element_count(&self) -> Option<u64> {
        self.extents
            .iter()
            .try_fold(1u64, |acc, &e| acc.checked_mul(e))
    }

    /// Total buffer size in bytes for elements of `kind`.
    ///
    /// Returns `None` if the size does not fit in `usize`.
    pub fn byte_len(&self, kind: ElementKind) -> Option<usize> {
        let count = usize::try_from(self.element_count()?).ok()?;
        count.checked_mul(kind.size())
    }

    /// Diagnostic `"d1 x d2 x ... x dN"` string; `"(scalar)"` for rank 0.
    ///
    /// Never parsed, only printed.
    pub fn dims_string(&self) -> String {
        if self.extents.is_empty() {
            return "(scalar)".to_string();
        }
        self.extents
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(" x ")
    }
}

impl From<Vec<u64>> for Shape {
    fn from(extents: Vec<u64>) -> Self {
        Self::new(extents)
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dims_string())
    }
}
