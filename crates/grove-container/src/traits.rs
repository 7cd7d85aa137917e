use grove_types::{ChildKind, ElementKind, TypeClass};

use crate::error::ContainerResult;

/// A container location that can enumerate and open its named children.
///
/// All implementations must satisfy these invariants:
/// - `child_names` returns each name exactly once; the order is the
///   backend's natural order and is not guaranteed stable across backends.
/// - The whole surface is read-only: opening a child never mutates the
///   container.
/// - All I/O errors are propagated, never silently ignored.
pub trait GroupSource: Sized {
    /// Dataset handle type produced by [`GroupSource::open_dataset`].
    type Dataset: DatasetSource;

    /// Names of all children of this location, in backend order.
    fn child_names(&self) -> ContainerResult<Vec<String>>;

    /// Classify a named child as group, dataset, or something else.
    fn classify_child(&self, name: &str) -> ContainerResult<ChildKind>;

    /// Open a child group.
    fn open_group(&self, name: &str) -> ContainerResult<Self>;

    /// Open a child dataset.
    fn open_dataset(&self, name: &str) -> ContainerResult<Self::Dataset>;
}

/// An open dataset: shape and type metadata plus one bulk read.
pub trait DatasetSource {
    /// Number of dimensions.
    fn rank(&self) -> ContainerResult<usize>;

    /// Per-dimension extents; length equals [`DatasetSource::rank`].
    fn extents(&self) -> ContainerResult<Vec<u64>>;

    /// Declared element type class.
    fn type_class(&self) -> ContainerResult<TypeClass>;

    /// Read the entire dataset into `buf` as native-endian elements of
    /// `kind`, returning the number of bytes written.
    ///
    /// A count smaller than `buf.len()` means the stored payload was
    /// truncated; callers treat a short count as corruption.
    fn read_into(&self, kind: ElementKind, buf: &mut [u8]) -> ContainerResult<usize>;
}

impl<D: DatasetSource + ?Sized> DatasetSource for &D {
    fn rank(&self) -> ContainerResult<usize> {
        (**self).rank()
    }

    fn extents(&self) -> ContainerResult<Vec<u64>> {
        (**self).extents()
    }

    fn type_class(&self) -> ContainerResult<TypeClass> {
        (**self).type_class()
    }

    fn read_into(&self, kind: ElementKind, buf: &mut [u8]) -> ContainerResult<usize> {
        (**self).read_into(kind, buf)
    }
}
