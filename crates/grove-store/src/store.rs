use std::collections::BTreeMap;
use std::path::Path;

use grove_container::GroupSource;
use grove_format::NativeContainer;
use grove_types::ChildKind;

use crate::array::TypedArray;
use crate::error::{ArrayError, StoreError, StoreResult};
use crate::node::Node;
use crate::options::{LoadOptions, UnsupportedPolicy};

/// An immutable tree of groups and fully materialized datasets.
///
/// The store is built all-or-nothing at open time: the container is walked
/// depth-first, every dataset is read into memory, and the container handle
/// is released before the store is returned. Any failure aborts the whole
/// open; no partially built store is ever produced. After open, lookups are
/// pure reads and safe from any number of threads.
pub struct HierarchicalStore {
    root: BTreeMap<String, Node>,
}

impl HierarchicalStore {
    /// Open a native container file with default options.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with(path, &LoadOptions::default())
    }

    /// Open a native container file.
    ///
    /// The file handle lives only for the duration of the build; every
    /// dataset has been copied into process memory by the time this
    /// returns.
    pub fn open_with(path: impl AsRef<Path>, options: &LoadOptions) -> StoreResult<Self> {
        let path = path.as_ref();
        let container = NativeContainer::open(path).map_err(|e| StoreError::Open {
            path: path.display().to_string(),
            source: e.into(),
        })?;
        let store = Self::from_root_with(&container.root(), options)?;
        tracing::debug!(
            path = %path.display(),
            datasets = store.dataset_count(),
            "opened hierarchical store"
        );
        Ok(store)
    }

    /// Build a store from any container backend with default options.
    pub fn from_root<G: GroupSource>(root: &G) -> StoreResult<Self> {
        Self::from_root_with(root, &LoadOptions::default())
    }

    /// Build a store from any container backend.
    pub fn from_root_with<G: GroupSource>(root: &G, options: &LoadOptions) -> StoreResult<Self> {
        let mut path = Vec::new();
        let root = build_group(root, 0, &mut path, options)?;
        Ok(Self { root })
    }

    /// Resolve a path of keys to a node.
    ///
    /// Pure read; never mutates the tree. A missing key, an empty path, or
    /// an attempt to descend through a dataset all yield
    /// [`StoreError::NotFound`].
    pub fn lookup<S: AsRef<str>>(&self, path: &[S]) -> StoreResult<&Node> {
        let miss = || StoreError::NotFound {
            path: join_segments(path),
        };
        let (first, rest) = path.split_first().ok_or_else(miss)?;
        let mut node = self.root.get(first.as_ref()).ok_or_else(miss)?;
        for key in rest {
            node = node
                .as_group()
                .and_then(|children| children.get(key.as_ref()))
                .ok_or_else(miss)?;
        }
        Ok(node)
    }

    /// Resolve a path to a dataset leaf.
    pub fn dataset<S: AsRef<str>>(&self, path: &[S]) -> StoreResult<&TypedArray> {
        self.lookup(path)?
            .as_dataset()
            .ok_or_else(|| StoreError::NotADataset {
                path: join_segments(path),
            })
    }

    /// The root mapping, for iteration over the whole tree.
    pub fn root(&self) -> &BTreeMap<String, Node> {
        &self.root
    }

    /// Total number of dataset leaves in the tree.
    pub fn dataset_count(&self) -> usize {
        fn count(children: &BTreeMap<String, Node>) -> usize {
            children
                .values()
                .map(|node| match node {
                    Node::Group(sub) => count(sub),
                    Node::Dataset(_) => 1,
                })
                .sum()
        }
        count(&self.root)
    }
}

impl std::fmt::Debug for HierarchicalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchicalStore")
            .field("root_children", &self.root.len())
            .field("dataset_count", &self.dataset_count())
            .finish()
    }
}

/// Depth-first, pre-order, eager recursive build of one group's children.
fn build_group<G: GroupSource>(
    group: &G,
    depth: usize,
    path: &mut Vec<String>,
    options: &LoadOptions,
) -> StoreResult<BTreeMap<String, Node>> {
    if depth > options.max_depth {
        return Err(StoreError::TooDeep {
            path: path.join("/"),
            max: options.max_depth,
        });
    }

    let names = group.child_names().map_err(|e| StoreError::Traverse {
        path: path.join("/"),
        source: e,
    })?;

    let mut children = BTreeMap::new();
    for name in names {
        let child_path = || {
            let mut segments = path.clone();
            segments.push(name.clone());
            segments.join("/")
        };
        let kind = group
            .classify_child(&name)
            .map_err(|e| StoreError::Traverse {
                path: child_path(),
                source: e,
            })?;
        match kind {
            ChildKind::Group => {
                let sub = group.open_group(&name).map_err(|e| StoreError::Traverse {
                    path: child_path(),
                    source: e,
                })?;
                path.push(name.clone());
                let mapping = build_group(&sub, depth + 1, path, options)?;
                path.pop();
                children.insert(name, Node::Group(mapping));
            }
            ChildKind::Dataset => {
                let dataset = group
                    .open_dataset(&name)
                    .map_err(|e| StoreError::Traverse {
                        path: child_path(),
                        source: e,
                    })?;
                match TypedArray::read_from(&dataset) {
                    Ok(array) => {
                        tracing::debug!(path = %child_path(), "loaded dataset");
                        children.insert(name, Node::Dataset(array));
                    }
                    Err(ArrayError::UnsupportedType { class })
                        if options.unsupported_types == UnsupportedPolicy::Skip =>
                    {
                        tracing::debug!(
                            path = %child_path(),
                            %class,
                            "skipping dataset with unsupported element type"
                        );
                    }
                    Err(e) => {
                        return Err(StoreError::Load {
                            path: child_path(),
                            source: e,
                        })
                    }
                }
            }
            ChildKind::Other => {
                if options.other_children == UnsupportedPolicy::Fail {
                    return Err(StoreError::UnknownChild { path: child_path() });
                }
                tracing::debug!(path = %child_path(), "skipping child of unknown kind");
            }
        }
    }
    Ok(children)
}

fn join_segments<S: AsRef<str>>(path: &[S]) -> String {
    path.iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_container::{MemoryContainer, MemoryDataset, MemoryNode};
    use grove_format::ContainerWriter;
    use grove_types::{ElementKind, TypeClass};

    /// Root dataset "a" (float [3]), subgroup "g" with dataset "b"
    /// (int [2,2]), plus an opaque annotation.
    fn sample_container() -> MemoryContainer {
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
            .insert(&["note"], MemoryNode::Opaque(b"free text".to_vec()))
            .unwrap();
        container
    }

    // -----------------------------------------------------------------------
    // Build + lookup
    // -----------------------------------------------------------------------

    #[test]
    fn open_sample_and_lookup() {
        let container = sample_container();
        let store = HierarchicalStore::from_root(&container.root()).unwrap();

        let a = store.dataset(&["a"]).unwrap();
        assert_eq!(a.extents(), &[3]);
        assert_eq!(a.to_f64(), Some(vec![1.0, 2.0, 3.0]));

        let b = store.dataset(&["g", "b"]).unwrap();
        assert_eq!(b.extents(), &[2, 2]);
        assert_eq!(b.to_i32(), Some(vec![1, 2, 3, 4]));

        let err = store.lookup(&["g", "missing"]).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn every_leaf_satisfies_size_invariants() {
        let container = sample_container();
        let store = HierarchicalStore::from_root(&container.root()).unwrap();

        fn check(children: &BTreeMap<String, Node>) {
            for node in children.values() {
                match node {
                    Node::Group(sub) => check(sub),
                    Node::Dataset(array) => {
                        let product: u64 = array.extents().iter().product();
                        assert_eq!(array.element_count() as u64, product);
                        assert_eq!(
                            array.as_bytes().len(),
                            array.element_count() * array.element_kind().size()
                        );
                    }
                }
            }
        }
        check(store.root());
    }

    #[test]
    fn lookup_on_group_returns_group_node() {
        let container = sample_container();
        let store = HierarchicalStore::from_root(&container.root()).unwrap();
        let node = store.lookup(&["g"]).unwrap();
        assert!(node.is_group());

        let err = store.dataset(&["g"]).unwrap_err();
        assert!(matches!(err, StoreError::NotADataset { .. }));
    }

    #[test]
    fn lookup_empty_path_misses() {
        let container = sample_container();
        let store = HierarchicalStore::from_root(&container.root()).unwrap();
        let err = store.lookup(&[] as &[&str]).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn lookup_cannot_descend_through_dataset() {
        let container = sample_container();
        let store = HierarchicalStore::from_root(&container.root()).unwrap();
        let err = store.lookup(&["a", "x"]).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn lookup_is_idempotent() {
        let container = sample_container();
        let store = HierarchicalStore::from_root(&container.root()).unwrap();
        let first = store.dataset(&["g", "b"]).unwrap().to_i32();
        let second = store.dataset(&["g", "b"]).unwrap().to_i32();
        assert_eq!(first, second);
        // Sibling untouched
        assert_eq!(
            store.dataset(&["a"]).unwrap().to_f64(),
            Some(vec![1.0, 2.0, 3.0])
        );
    }

    #[test]
    fn building_twice_yields_identical_trees() {
        let container = sample_container();
        let one = HierarchicalStore::from_root(&container.root()).unwrap();
        let two = HierarchicalStore::from_root(&container.root()).unwrap();
        assert_eq!(one.root(), two.root());
    }

    #[test]
    fn dataset_count_and_debug() {
        let container = sample_container();
        let store = HierarchicalStore::from_root(&container.root()).unwrap();
        assert_eq!(store.dataset_count(), 2);
        let debug = format!("{store:?}");
        assert!(debug.contains("HierarchicalStore"));
        assert!(debug.contains("dataset_count"));
    }

    // -----------------------------------------------------------------------
    // Scalars and zero extents
    // -----------------------------------------------------------------------

    #[test]
    fn scalar_dataset_loads() {
        let mut container = MemoryContainer::new();
        container
            .insert(
                &["s"],
                MemoryNode::Dataset(MemoryDataset::float64(vec![], &[42.5])),
            )
            .unwrap();
        let store = HierarchicalStore::from_root(&container.root()).unwrap();
        let s = store.dataset(&["s"]).unwrap();
        assert_eq!(s.rank(), 0);
        assert_eq!(s.element_count(), 1);
        assert_eq!(s.to_f64(), Some(vec![42.5]));
    }

    #[test]
    fn zero_extent_dataset_loads_empty() {
        let mut container = MemoryContainer::new();
        container
            .insert(
                &["z"],
                MemoryNode::Dataset(MemoryDataset::int32(vec![0, 4], &[])),
            )
            .unwrap();
        let store = HierarchicalStore::from_root(&container.root()).unwrap();
        let z = store.dataset(&["z"]).unwrap();
        assert_eq!(z.element_count(), 0);
        assert!(z.as_bytes().is_empty());
    }

    // -----------------------------------------------------------------------
    // Failure policies
    // -----------------------------------------------------------------------

    #[test]
    fn unsupported_type_anywhere_fails_whole_open() {
        let mut container = sample_container();
        container
            .insert(
                &["g", "deep", "bad"],
                MemoryNode::Dataset(MemoryDataset::from_raw(
                    TypeClass::Compound,
                    vec![1],
                    vec![0u8; 4],
                )),
            )
            .unwrap();
        let err = HierarchicalStore::from_root(&container.root()).unwrap_err();
        match err {
            StoreError::Load { path, source } => {
                assert_eq!(path, "g/deep/bad");
                assert!(matches!(source, ArrayError::UnsupportedType { .. }));
            }
            other => panic!("expected Load, got {other:?}"),
        }
    }

    #[test]
    fn string_only_container_fails_not_empty_success() {
        let mut container = MemoryContainer::new();
        container
            .insert(
                &["s"],
                MemoryNode::Dataset(MemoryDataset::from_raw(
                    TypeClass::String,
                    vec![2],
                    b"hi".to_vec(),
                )),
            )
            .unwrap();
        let err = HierarchicalStore::from_root(&container.root()).unwrap_err();
        assert!(matches!(err, StoreError::Load { .. }));
    }

    #[test]
    fn unsupported_type_skip_mode_loads_the_rest() {
        let mut container = sample_container();
        container
            .insert(
                &["bad"],
                MemoryNode::Dataset(MemoryDataset::from_raw(
                    TypeClass::Enum,
                    vec![1],
                    vec![0u8; 4],
                )),
            )
            .unwrap();
        let options = LoadOptions {
            unsupported_types: UnsupportedPolicy::Skip,
            ..LoadOptions::default()
        };
        let store = HierarchicalStore::from_root_with(&container.root(), &options).unwrap();
        assert_eq!(store.dataset_count(), 2);
        assert!(matches!(
            store.lookup(&["bad"]).unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }

    #[test]
    fn opaque_children_skipped_by_default() {
        let container = sample_container();
        let store = HierarchicalStore::from_root(&container.root()).unwrap();
        assert!(matches!(
            store.lookup(&["note"]).unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }

    #[test]
    fn opaque_children_fail_when_policy_says_so() {
        let container = sample_container();
        let options = LoadOptions {
            other_children: UnsupportedPolicy::Fail,
            ..LoadOptions::default()
        };
        let err =
            HierarchicalStore::from_root_with(&container.root(), &options).unwrap_err();
        match err {
            StoreError::UnknownChild { path } => assert_eq!(path, "note"),
            other => panic!("expected UnknownChild, got {other:?}"),
        }
    }

    #[test]
    fn truncated_payload_fails_as_short_read() {
        let mut container = MemoryContainer::new();
        container
            .insert(
                &["t"],
                MemoryNode::Dataset(MemoryDataset::from_raw(
                    TypeClass::Integer,
                    vec![2, 2],
                    vec![0u8; 6],
                )),
            )
            .unwrap();
        let err = HierarchicalStore::from_root(&container.root()).unwrap_err();
        match err {
            StoreError::Load { source, .. } => {
                assert!(matches!(source, ArrayError::ShortRead { .. }))
            }
            other => panic!("expected Load, got {other:?}"),
        }
    }

    #[test]
    fn nesting_beyond_max_depth_fails() {
        let mut container = MemoryContainer::new();
        container
            .insert(
                &["1", "2", "3", "4", "5", "leaf"],
                MemoryNode::Dataset(MemoryDataset::int32(vec![1], &[1])),
            )
            .unwrap();
        let options = LoadOptions {
            max_depth: 3,
            ..LoadOptions::default()
        };
        let err =
            HierarchicalStore::from_root_with(&container.root(), &options).unwrap_err();
        assert!(matches!(err, StoreError::TooDeep { max: 3, .. }));

        // The same tree loads fine with the default bound.
        assert!(HierarchicalStore::from_root(&container.root()).is_ok());
    }

    // -----------------------------------------------------------------------
    // Concurrent readers
    // -----------------------------------------------------------------------

    #[test]
    fn concurrent_lookups_are_safe() {
        use std::sync::Arc;
        use std::thread;

        let container = sample_container();
        let store = Arc::new(HierarchicalStore::from_root(&container.root()).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..100 {
                        let b = store.dataset(&["g", "b"]).unwrap();
                        assert_eq!(b.to_i32(), Some(vec![1, 2, 3, 4]));
                        assert!(matches!(
                            store.lookup(&["g", "missing"]).unwrap_err(),
                            StoreError::NotFound { .. }
                        ));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("thread should not panic");
        }
    }

    // -----------------------------------------------------------------------
    // Opening by file path
    // -----------------------------------------------------------------------

    #[test]
    fn open_native_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.grvc");
        ContainerWriter::write_to(&path, &sample_container()).unwrap();

        let store = HierarchicalStore::open(&path).unwrap();
        assert_eq!(store.dataset_count(), 2);
        assert_eq!(
            store.dataset(&["a"]).unwrap().to_f64(),
            Some(vec![1.0, 2.0, 3.0])
        );
        assert_eq!(
            store.dataset(&["g", "b"]).unwrap().element_kind(),
            ElementKind::Int32
        );

        // The file handle is released once the build completes.
        std::fs::remove_file(&path).unwrap();
        assert_eq!(
            store.dataset(&["g", "b"]).unwrap().to_i32(),
            Some(vec![1, 2, 3, 4])
        );
    }

    #[test]
    fn open_missing_file_fails() {
        let err = HierarchicalStore::open("/nonexistent/f.grvc").unwrap_err();
        assert!(matches!(err, StoreError::Open { .. }));
    }

    #[test]
    fn open_malformed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.grvc");
        std::fs::write(&path, b"this is not a container").unwrap();
        let err = HierarchicalStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Open { .. }));
    }
}
