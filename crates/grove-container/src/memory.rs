use std::collections::BTreeMap;

use grove_types::{ChildKind, ElementKind, Shape, TypeClass};

use crate::error::{ContainerError, ContainerResult};
use crate::traits::{DatasetSource, GroupSource};

/// One node of an in-memory container tree.
#[derive(Clone, Debug, PartialEq)]
pub enum MemoryNode {
    /// Interior node with named children.
    Group(BTreeMap<String, MemoryNode>),
    /// Leaf holding a typed array payload.
    Dataset(MemoryDataset),
    /// Uninterpreted bytes; classified [`ChildKind::Other`] by traversal.
    Opaque(Vec<u8>),
}

/// An in-memory dataset: declared class, shape, and a raw payload held in
/// native byte order.
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryDataset {
    class: TypeClass,
    shape: Shape,
    payload: Vec<u8>,
}

impl MemoryDataset {
    /// Integer-class dataset from native `i32` values.
    ///
    /// The value count is the caller's responsibility; fixtures may
    /// deliberately under- or over-fill relative to the extents.
    pub fn int32(extents: Vec<u64>, values: &[i32]) -> Self {
        let mut payload = Vec::with_capacity(values.len() * 4);
        for v in values {
            payload.extend_from_slice(&v.to_ne_bytes());
        }
        Self {
            class: TypeClass::Integer,
            shape: Shape::new(extents),
            payload,
        }
    }

    /// Float-class dataset from native `f64` values.
    pub fn float64(extents: Vec<u64>, values: &[f64]) -> Self {
        let mut payload = Vec::with_capacity(values.len() * 8);
        for v in values {
            payload.extend_from_slice(&v.to_ne_bytes());
        }
        Self {
            class: TypeClass::Float,
            shape: Shape::new(extents),
            payload,
        }
    }

    /// Dataset with an arbitrary declared class and raw payload.
    ///
    /// This is how unsupported-class and truncated-payload fixtures are
    /// built.
    pub fn from_raw(class: TypeClass, extents: Vec<u64>, payload: Vec<u8>) -> Self {
        Self {
            class,
            shape: Shape::new(extents),
            payload,
        }
    }

    /// Declared element type class.
    pub fn class(&self) -> TypeClass {
        self.class
    }

    /// Dataset shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Raw payload in native byte order.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

impl DatasetSource for MemoryDataset {
    fn rank(&self) -> ContainerResult<usize> {
        Ok(self.shape.rank())
    }

    fn extents(&self) -> ContainerResult<Vec<u64>> {
        Ok(self.shape.extents().to_vec())
    }

    fn type_class(&self) -> ContainerResult<TypeClass> {
        Ok(self.class)
    }

    fn read_into(&self, _kind: ElementKind, buf: &mut [u8]) -> ContainerResult<usize> {
        // Payload is already native-endian; a short payload yields a short
        // count and the caller decides what that means.
        let n = self.payload.len().min(buf.len());
        buf[..n].copy_from_slice(&self.payload[..n]);
        Ok(n)
    }
}

/// In-memory, `BTreeMap`-based container backend.
///
/// Intended for tests and embedding, and doubles as the document-building
/// API for the native format writer. Children are held in sorted order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryContainer {
    root: BTreeMap<String, MemoryNode>,
}

impl MemoryContainer {
    /// Create a new empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node at a path, creating intermediate groups as needed.
    ///
    /// Fails if the path is empty or an intermediate segment already exists
    /// and is not a group.
    pub fn insert(&mut self, path: &[&str], node: MemoryNode) -> ContainerResult<()> {
        let (name, dirs) = path.split_last().ok_or_else(|| ContainerError::Corrupt {
            reason: "empty insert path".into(),
        })?;
        let mut current = &mut self.root;
        for dir in dirs {
            let entry = current
                .entry((*dir).to_string())
                .or_insert_with(|| MemoryNode::Group(BTreeMap::new()));
            match entry {
                MemoryNode::Group(children) => current = children,
                _ => {
                    return Err(ContainerError::NotAGroup {
                        name: (*dir).to_string(),
                    })
                }
            }
        }
        current.insert((*name).to_string(), node);
        Ok(())
    }

    /// The root group as a [`GroupSource`].
    pub fn root(&self) -> MemoryGroup<'_> {
        MemoryGroup {
            children: &self.root,
        }
    }

    /// Direct access to the root children (used by the format writer).
    pub fn root_nodes(&self) -> &BTreeMap<String, MemoryNode> {
        &self.root
    }

    /// Returns `true` if the container has no children at all.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

/// A group within a [`MemoryContainer`].
#[derive(Clone, Copy, Debug)]
pub struct MemoryGroup<'a> {
    children: &'a BTreeMap<String, MemoryNode>,
}

impl<'a> GroupSource for MemoryGroup<'a> {
    type Dataset = &'a MemoryDataset;

    fn child_names(&self) -> ContainerResult<Vec<String>> {
        Ok(self.children.keys().cloned().collect())
    }

    fn classify_child(&self, name: &str) -> ContainerResult<ChildKind> {
        match self.children.get(name) {
            Some(MemoryNode::Group(_)) => Ok(ChildKind::Group),
            Some(MemoryNode::Dataset(_)) => Ok(ChildKind::Dataset),
            Some(MemoryNode::Opaque(_)) => Ok(ChildKind::Other),
            None => Err(ContainerError::ChildNotFound { name: name.into() }),
        }
    }

    fn open_group(&self, name: &str) -> ContainerResult<Self> {
        match self.children.get(name) {
            Some(MemoryNode::Group(children)) => Ok(MemoryGroup { children }),
            Some(_) => Err(ContainerError::NotAGroup { name: name.into() }),
            None => Err(ContainerError::ChildNotFound { name: name.into() }),
        }
    }

    fn open_dataset(&self, name: &str) -> ContainerResult<Self::Dataset> {
        match self.children.get(name) {
            Some(MemoryNode::Dataset(dataset)) => Ok(dataset),
            Some(_) => Err(ContainerError::NotADataset { name: name.into() }),
            None => Err(ContainerError::ChildNotFound { name: name.into() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemoryContainer {
        let mut container = MemoryContainer::new();
        container
            .insert(
                &["a"],
                MemoryNode::Dataset(MemoryDataset::float64(vec![3], &[1.0, 2.0, 3.0])),
            )
            .unwrap();
        container
            .insert(
                &["g", "b"],
                MemoryNode::Dataset(MemoryDataset::int32(vec![2, 2], &[1, 2, 3, 4])),
            )
            .unwrap();
        container
            .insert(&["note"], MemoryNode::Opaque(b"metadata".to_vec()))
            .unwrap();
        container
    }

    #[test]
    fn insert_creates_intermediate_groups() {
        let container = sample();
        let root = container.root();
        assert_eq!(root.child_names().unwrap(), vec!["a", "g", "note"]);
        assert_eq!(root.classify_child("g").unwrap(), ChildKind::Group);

        let g = root.open_group("g").unwrap();
        assert_eq!(g.child_names().unwrap(), vec!["b"]);
        assert_eq!(g.classify_child("b").unwrap(), ChildKind::Dataset);
    }

    #[test]
    fn insert_empty_path_fails() {
        let mut container = MemoryContainer::new();
        let err = container
            .insert(&[], MemoryNode::Opaque(vec![]))
            .unwrap_err();
        assert!(matches!(err, ContainerError::Corrupt { .. }));
    }

    #[test]
    fn insert_through_dataset_fails() {
        let mut container = MemoryContainer::new();
        container
            .insert(
                &["d"],
                MemoryNode::Dataset(MemoryDataset::int32(vec![1], &[7])),
            )
            .unwrap();
        let err = container
            .insert(&["d", "child"], MemoryNode::Opaque(vec![]))
            .unwrap_err();
        assert!(matches!(err, ContainerError::NotAGroup { .. }));
    }

    #[test]
    fn classify_reports_other_for_opaque() {
        let container = sample();
        assert_eq!(
            container.root().classify_child("note").unwrap(),
            ChildKind::Other
        );
    }

    #[test]
    fn classify_missing_child() {
        let container = sample();
        let err = container.root().classify_child("missing").unwrap_err();
        assert!(matches!(err, ContainerError::ChildNotFound { .. }));
    }

    #[test]
    fn open_group_on_dataset_fails() {
        let container = sample();
        let err = container.root().open_group("a").unwrap_err();
        assert!(matches!(err, ContainerError::NotAGroup { .. }));
    }

    #[test]
    fn open_dataset_on_group_fails() {
        let container = sample();
        let err = container.root().open_dataset("g").unwrap_err();
        assert!(matches!(err, ContainerError::NotADataset { .. }));
    }

    #[test]
    fn dataset_metadata_and_read() {
        let container = sample();
        let dataset = container.root().open_dataset("a").unwrap();
        assert_eq!(dataset.rank().unwrap(), 1);
        assert_eq!(dataset.extents().unwrap(), vec![3]);
        assert_eq!(dataset.type_class().unwrap(), TypeClass::Float);

        let mut buf = vec![0u8; 24];
        let n = dataset.read_into(ElementKind::Float64, &mut buf).unwrap();
        assert_eq!(n, 24);
        let values: Vec<f64> = buf
            .chunks_exact(8)
            .map(|c| f64::from_ne_bytes(c.try_into().unwrap()))
            .collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn truncated_payload_reports_short_count() {
        // 2x2 integer dataset should carry 16 bytes; give it 6.
        let dataset = MemoryDataset::from_raw(TypeClass::Integer, vec![2, 2], vec![0u8; 6]);
        let mut buf = vec![0u8; 16];
        let n = dataset.read_into(ElementKind::Int32, &mut buf).unwrap();
        assert_eq!(n, 6);
    }

    #[test]
    fn zero_extent_dataset_reads_nothing() {
        let dataset = MemoryDataset::int32(vec![0, 4], &[]);
        let mut buf = Vec::new();
        let n = dataset.read_into(ElementKind::Int32, &mut buf).unwrap();
        assert_eq!(n, 0);
    }
}
