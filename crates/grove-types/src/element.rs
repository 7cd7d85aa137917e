use serde::{Deserialize, Serialize};

/// Declared element type class of a dataset, as reported by a container.
///
/// Only [`TypeClass::Integer`] and [`TypeClass::Float`] map to an in-memory
/// representation; the remaining classes exist so a container can report
/// what it actually holds and let the caller decide to skip or fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeClass {
    Integer,
    Float,
    Time,
    String,
    BitField,
    Opaque,
    Compound,
    Reference,
    Enum,
    VarLen,
    Array,
}

impl TypeClass {
    /// Stable wire code (for on-disk serialization).
    pub fn code(&self) -> u8 {
        match self {
            Self::Integer => 0,
            Self::Float => 1,
            Self::Time => 2,
            Self::String => 3,
            Self::BitField => 4,
            Self::Opaque => 5,
            Self::Compound => 6,
            Self::Reference => 7,
            Self::Enum => 8,
            Self::VarLen => 9,
            Self::Array => 10,
        }
    }

    /// Parse from a wire code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Integer),
            1 => Some(Self::Float),
            2 => Some(Self::Time),
            3 => Some(Self::String),
            4 => Some(Self::BitField),
            5 => Some(Self::Opaque),
            6 => Some(Self::Compound),
            7 => Some(Self::Reference),
            8 => Some(Self::Enum),
            9 => Some(Self::VarLen),
            10 => Some(Self::Array),
            _ => None,
        }
    }
}

impl std::fmt::Display for TypeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Time => "time",
            Self::String => "string",
            Self::BitField => "bitfield",
            Self::Opaque => "opaque",
            Self::Compound => "compound",
            Self::Reference => "reference",
            Self::Enum => "enum",
            Self::VarLen => "vlen",
            Self::Array => "array",
        };
        write!(f, "{name}")
    }
}

/// In-memory numeric representation chosen for a dataset's values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// Native signed 32-bit integer.
    Int32,
    /// Native 64-bit IEEE double.
    Float64,
}

impl ElementKind {
    /// Size of one element in bytes.
    pub fn size(&self) -> usize {
        match self {
            Self::Int32 => 4,
            Self::Float64 => 8,
        }
    }

    /// Diagnostic type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Int32 => "integer",
            Self::Float64 => "double",
        }
    }

    /// The fixed dispatch table from declared class to in-memory kind.
    ///
    /// Integer classes become [`ElementKind::Int32`], float classes become
    /// [`ElementKind::Float64`]. Every other class returns `None`: there is
    /// no silent fallback and no default type.
    pub fn from_class(class: TypeClass) -> Option<Self> {
        match class {
            TypeClass::Integer => Some(Self::Int32),
            TypeClass::Float => Some(Self::Float64),
            _ => None,
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Classification of a named child during hierarchy traversal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChildKind {
    /// An interior node with named children.
    Group,
    /// A leaf holding a typed multi-dimensional array.
    Dataset,
    /// Anything else (named datatypes, annotations, reserved kinds).
    Other,
}

impl std::fmt::Display for ChildKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Group => write!(f, "group"),
            Self::Dataset => write!(f, "dataset"),
            Self::Other => write!(f, "other"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_CLASSES: [TypeClass; 11] = [
        TypeClass::Integer,
        TypeClass::Float,
        TypeClass::Time,
        TypeClass::String,
        TypeClass::BitField,
        TypeClass::Opaque,
        TypeClass::Compound,
        TypeClass::Reference,
        TypeClass::Enum,
        TypeClass::VarLen,
        TypeClass::Array,
    ];

    #[test]
    fn dispatch_table_numeric_classes() {
        assert_eq!(
            ElementKind::from_class(TypeClass::Integer),
            Some(ElementKind::Int32)
        );
        assert_eq!(
            ElementKind::from_class(TypeClass::Float),
            Some(ElementKind::Float64)
        );
    }

    #[test]
    fn dispatch_table_rejects_everything_else() {
        for class in ALL_CLASSES {
            if class == TypeClass::Integer || class == TypeClass::Float {
                continue;
            }
            assert_eq!(ElementKind::from_class(class), None, "class {class}");
        }
    }

    #[test]
    fn type_class_code_roundtrip() {
        for class in ALL_CLASSES {
            let code = class.code();
            assert_eq!(TypeClass::from_code(code), Some(class));
        }
    }

    #[test]
    fn type_class_unknown_code() {
        assert!(TypeClass::from_code(11).is_none());
        assert!(TypeClass::from_code(255).is_none());
    }

    #[test]
    fn element_sizes() {
        assert_eq!(ElementKind::Int32.size(), 4);
        assert_eq!(ElementKind::Float64.size(), 8);
    }

    #[test]
    fn element_kind_names() {
        assert_eq!(ElementKind::Int32.type_name(), "integer");
        assert_eq!(ElementKind::Float64.type_name(), "double");
    }

    #[test]
    fn display_formats() {
        assert_eq!(format!("{}", TypeClass::Compound), "compound");
        assert_eq!(format!("{}", ElementKind::Float64), "double");
        assert_eq!(format!("{}", ChildKind::Dataset), "dataset");
    }

    #[test]
    fn serde_roundtrip() {
        let json = serde_json::to_string(&TypeClass::VarLen).unwrap();
        let back: TypeClass = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TypeClass::VarLen);
    }
}
