use std::collections::BTreeMap;

use crate::array::TypedArray;

/// One node of the loaded tree: a named mapping to children, or a dataset
/// leaf. Fixed at two shapes, so a sum type rather than dynamic dispatch.
#[derive(Debug, PartialEq)]
pub enum Node {
    /// Interior node; keys are unique within one mapping.
    Group(BTreeMap<String, Node>),
    /// Leaf holding a fully read typed array.
    Dataset(TypedArray),
}

impl Node {
    /// Returns `true` if this node is a group.
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }

    /// Returns `true` if this node is a dataset leaf.
    pub fn is_dataset(&self) -> bool {
        matches!(self, Self::Dataset(_))
    }

    /// The child mapping, if this node is a group.
    pub fn as_group(&self) -> Option<&BTreeMap<String, Node>> {
        match self {
            Self::Group(children) => Some(children),
            Self::Dataset(_) => None,
        }
    }

    /// The typed array, if this node is a dataset leaf.
    pub fn as_dataset(&self) -> Option<&TypedArray> {
        match self {
            Self::Group(_) => None,
            Self::Dataset(array) => Some(array),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_container::MemoryDataset;

    #[test]
    fn accessors_match_variant() {
        let group = Node::Group(BTreeMap::new());
        assert!(group.is_group());
        assert!(!group.is_dataset());
        assert!(group.as_group().is_some());
        assert!(group.as_dataset().is_none());

        let dataset = MemoryDataset::int32(vec![1], &[9]);
        let leaf = Node::Dataset(TypedArray::read_from(&dataset).unwrap());
        assert!(leaf.is_dataset());
        assert!(leaf.as_group().is_none());
        assert_eq!(leaf.as_dataset().unwrap().to_i32(), Some(vec![9]));
    }
}
