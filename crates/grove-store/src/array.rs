use grove_container::DatasetSource;
use grove_types::{ElementKind, Shape};

use crate::error::ArrayError;

/// One dataset, fully materialized: rank, per-dimension extents, inferred
/// element kind, and a contiguous buffer holding every element.
///
/// The buffer is exclusively owned and immutable after construction. A
/// `TypedArray` knows nothing about the hierarchy it came from.
pub struct TypedArray {
    shape: Shape,
    kind: ElementKind,
    buffer: Box<[u8]>,
}

impl TypedArray {
    /// Materialize a dataset from an open [`DatasetSource`].
    ///
    /// Resolves the shape, maps the declared class through the fixed
    /// dispatch table (unsupported classes fail before anything is
    /// allocated), allocates exactly `element_count * element_size` bytes,
    /// and performs a single bulk read. A short read fails construction;
    /// no half-populated array is ever returned.
    pub fn read_from<D: DatasetSource>(dataset: &D) -> Result<Self, ArrayError> {
        let shape = Shape::new(dataset.extents()?);
        let class = dataset.type_class()?;
        let kind =
            ElementKind::from_class(class).ok_or(ArrayError::UnsupportedType { class })?;
        let byte_len = shape.byte_len(kind).ok_or_else(|| ArrayError::ExtentOverflow {
            extents: shape.extents().to_vec(),
        })?;

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(byte_len)
            .map_err(|_| ArrayError::Allocation { bytes: byte_len })?;
        buffer.resize(byte_len, 0);

        let written = dataset.read_into(kind, &mut buffer)?;
        if written != byte_len {
            return Err(ArrayError::ShortRead {
                expected: byte_len,
                actual: written,
            });
        }

        Ok(Self {
            shape,
            kind,
            buffer: buffer.into_boxed_slice(),
        })
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    /// Per-dimension extents, in order.
    pub fn extents(&self) -> &[u64] {
        self.shape.extents()
    }

    /// The dataset's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The in-memory element representation.
    pub fn element_kind(&self) -> ElementKind {
        self.kind
    }

    /// Number of elements held in the buffer.
    pub fn element_count(&self) -> usize {
        self.buffer.len() / self.kind.size()
    }

    /// Read-only view of the raw native-endian buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Diagnostic description: rank, resolved type name, and extents.
    ///
    /// Only printed, never parsed.
    pub fn describe(&self) -> String {
        format!(
            "rank: {}, type: {}, dimensions: {}",
            self.rank(),
            self.kind.type_name(),
            self.shape.dims_string()
        )
    }

    /// Decode the buffer as `i32` values; `None` if the kind differs.
    pub fn to_i32(&self) -> Option<Vec<i32>> {
        if self.kind != ElementKind::Int32 {
            return None;
        }
        Some(
            self.buffer
                .chunks_exact(4)
                .map(|c| i32::from_ne_bytes(c.try_into().expect("chunk is 4 bytes")))
                .collect(),
        )
    }

    /// Decode the buffer as `f64` values; `None` if the kind differs.
    pub fn to_f64(&self) -> Option<Vec<f64>> {
        if self.kind != ElementKind::Float64 {
            return None;
        }
        Some(
            self.buffer
                .chunks_exact(8)
                .map(|c| f64::from_ne_bytes(c.try_into().expect("chunk is 8 bytes")))
                .collect(),
        )
    }
}

impl PartialEq for TypedArray {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape && self.kind == other.kind && self.buffer == other.buffer
    }
}

impl Eq for TypedArray {}

impl std::fmt::Debug for TypedArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedArray")
            .field("shape", &self.shape)
            .field("kind", &self.kind)
            .field("byte_len", &self.buffer.len())
            .finish()
    }
}
