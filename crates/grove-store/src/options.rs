/// What to do when traversal meets something it cannot represent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnsupportedPolicy {
    /// Omit the offending child and continue.
    Skip,
    /// Abort the whole open.
    Fail,
}

/// Explicit configuration for one open call.
///
/// The store carries no ambient configuration; everything that varies is
/// in this value. The defaults preserve the long-observed behavior of this
/// kind of loader: children of unknown *object kind* are skipped silently,
/// while datasets with an unsupported *element type* fail the open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    /// Policy for children classified as neither group nor dataset.
    pub other_children: UnsupportedPolicy,
    /// Policy for datasets whose declared class has no in-memory kind.
    pub unsupported_types: UnsupportedPolicy,
    /// Maximum traversal depth; guards against pathological nesting.
    pub max_depth: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            other_children: UnsupportedPolicy::Skip,
            unsupported_types: UnsupportedPolicy::Fail,
            max_depth: 128,
        }
    }
}
