use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;

use grove_container::{ContainerError, ContainerResult, DatasetSource, GroupSource};
use grove_types::{ChildKind, ElementKind, TypeClass};

use crate::error::{FormatError, FormatResult};
use crate::writer::{decode_varint, MAGIC, TAG_ANNOTATION, TAG_DATASET, TAG_GROUP, VERSION};

/// Nesting bound for the structural parse; a container file deeper than
/// this is rejected as malformed.
const MAX_NODE_DEPTH: usize = 512;

/// Sanity bound on dataset rank during parsing.
const MAX_RANK: u64 = 255;

/// A fully validated native container file.
///
/// `from_bytes` reads the whole file, verifies magic, version, and the
/// BLAKE3 trailer, and parses the complete structural tree up front.
/// Dataset payloads stay compressed in the raw buffer; they are CRC-checked
/// and decompressed on [`DatasetSource::read_into`].
#[derive(Debug)]
pub struct NativeContainer {
    data: Vec<u8>,
    root: BTreeMap<String, ParsedNode>,
}

#[derive(Debug)]
enum ParsedNode {
    Group(BTreeMap<String, ParsedNode>),
    Dataset(ParsedDataset),
    Annotation(#[allow(dead_code)] Range<usize>),
}

#[derive(Debug)]
struct ParsedDataset {
    class: TypeClass,
    extents: Vec<u64>,
    uncompressed_len: u64,
    crc32: u32,
    payload: Range<usize>,
}

impl NativeContainer {
    /// Open and validate a container file.
    pub fn open(path: &Path) -> FormatResult<Self> {
        let data = std::fs::read(path)?;
        let container = Self::from_bytes(data)?;
        tracing::debug!(path = %path.display(), "opened native container");
        Ok(container)
    }

    /// Validate and parse raw container bytes.
    pub fn from_bytes(data: Vec<u8>) -> FormatResult<Self> {
        // magic + version + trailer
        if data.len() < 4 + 4 + 32 {
            return Err(FormatError::Truncated {
                offset: 0,
                reason: "file too short for header and trailer".into(),
            });
        }
        if &data[0..4] != MAGIC {
            return Err(FormatError::InvalidMagic {
                expected: String::from_utf8_lossy(MAGIC).into(),
                actual: String::from_utf8_lossy(&data[0..4]).into(),
            });
        }
        let version = u32::from_be_bytes(data[4..8].try_into().unwrap());
        if version != VERSION {
            return Err(FormatError::UnsupportedVersion(version));
        }

        let body_end = data.len() - 32;
        let checksum = *blake3::hash(&data[..body_end]).as_bytes();
        if checksum != data[body_end..] {
            return Err(FormatError::ChecksumMismatch);
        }

        let mut pos = 8;
        let root = match parse_node(&data, &mut pos, body_end, 0)? {
            ParsedNode::Group(children) => children,
            _ => {
                return Err(FormatError::CorruptNode {
                    offset: 8,
                    reason: "root node is not a group".into(),
                })
            }
        };
        if pos != body_end {
            return Err(FormatError::CorruptNode {
                offset: pos,
                reason: "trailing bytes after root group".into(),
            });
        }
        Ok(Self { data, root })
    }

    /// The root group as a [`GroupSource`].
    pub fn root(&self) -> NativeGroup<'_> {
        NativeGroup {
            children: &self.root,
            data: &self.data,
        }
    }
}

fn parse_node(
    data: &[u8],
    pos: &mut usize,
    end: usize,
    depth: usize,
) -> FormatResult<ParsedNode> {
    if depth > MAX_NODE_DEPTH {
        return Err(FormatError::CorruptNode {
            offset: *pos,
            reason: format!("nesting deeper than {MAX_NODE_DEPTH} levels"),
        });
    }
    let tag = read_byte(data, pos, end)?;
    match tag {
        TAG_GROUP => {
            let count = read_varint(data, pos, end)?;
            let mut children = BTreeMap::new();
            for _ in 0..count {
                let name = read_name(data, pos, end)?;
                let child = parse_node(data, pos, end, depth + 1)?;
                if children.insert(name.clone(), child).is_some() {
                    return Err(FormatError::CorruptNode {
                        offset: *pos,
                        reason: format!("duplicate child name: {name}"),
                    });
                }
            }
            Ok(ParsedNode::Group(children))
        }
        TAG_DATASET => {
            let code = read_byte(data, pos, end)?;
            let class =
                TypeClass::from_code(code).ok_or(FormatError::UnknownTypeClass(code))?;
            let rank = read_varint(data, pos, end)?;
            if rank > MAX_RANK {
                return Err(FormatError::CorruptNode {
                    offset: *pos,
                    reason: format!("rank {rank} exceeds limit"),
                });
            }
            let mut extents = Vec::with_capacity(rank as usize);
            for _ in 0..rank {
                extents.push(read_varint(data, pos, end)?);
            }
            let uncompressed_len = read_varint(data, pos, end)?;
            let compressed_len = read_varint(data, pos, end)?;
            let crc32 = u32::from_be_bytes([
                read_byte(data, pos, end)?,
                read_byte(data, pos, end)?,
                read_byte(data, pos, end)?,
                read_byte(data, pos, end)?,
            ]);
            let payload = take_range(data, pos, end, compressed_len)?;
            Ok(ParsedNode::Dataset(ParsedDataset {
                class,
                extents,
                uncompressed_len,
                crc32,
                payload,
            }))
        }
        TAG_ANNOTATION => {
            let len = read_varint(data, pos, end)?;
            let range = take_range(data, pos, end, len)?;
            Ok(ParsedNode::Annotation(range))
        }
        other => Err(FormatError::CorruptNode {
            offset: *pos - 1,
            reason: format!("unknown node tag: {other:#04x}"),
        }),
    }
}

fn read_byte(data: &[u8], pos: &mut usize, end: usize) -> FormatResult<u8> {
    if *pos >= end {
        return Err(FormatError::Truncated {
            offset: *pos,
            reason: "unexpected end of node tree".into(),
        });
    }
    let byte = data[*pos];
    *pos += 1;
    Ok(byte)
}

fn read_varint(data: &[u8], pos: &mut usize, end: usize) -> FormatResult<u64> {
    let (value, consumed) = decode_varint(&data[*pos..end]).map_err(|e| match e {
        FormatError::Truncated { reason, .. } | FormatError::CorruptNode { reason, .. } => {
            FormatError::Truncated {
                offset: *pos,
                reason,
            }
        }
        other => other,
    })?;
    *pos += consumed;
    Ok(value)
}

fn read_name(data: &[u8], pos: &mut usize, end: usize) -> FormatResult<String> {
    let len = read_varint(data, pos, end)?;
    let range = take_range(data, pos, end, len)?;
    String::from_utf8(data[range].to_vec()).map_err(|_| FormatError::CorruptNode {
        offset: *pos,
        reason: "child name is not valid UTF-8".into(),
    })
}

fn take_range(data: &[u8], pos: &mut usize, end: usize, len: u64) -> FormatResult<Range<usize>> {
    let len = usize::try_from(len).map_err(|_| FormatError::CorruptNode {
        offset: *pos,
        reason: "length does not fit in memory".into(),
    })?;
    let start = *pos;
    let stop = start.checked_add(len).filter(|&s| s <= end).ok_or_else(|| {
        FormatError::Truncated {
            offset: start,
            reason: format!("{len} byte region extends beyond node tree"),
        }
    })?;
    debug_assert!(stop <= data.len());
    *pos = stop;
    Ok(start..stop)
}

/// A group within a [`NativeContainer`].
#[derive(Clone, Copy, Debug)]
pub struct NativeGroup<'a> {
    children: &'a BTreeMap<String, ParsedNode>,
    data: &'a [u8],
}

impl<'a> GroupSource for NativeGroup<'a> {
    type Dataset = NativeDataset<'a>;

    fn child_names(&self) -> ContainerResult<Vec<String>> {
        Ok(self.children.keys().cloned().collect())
    }

    fn classify_child(&self, name: &str) -> ContainerResult<ChildKind> {
        match self.children.get(name) {
            Some(ParsedNode::Group(_)) => Ok(ChildKind::Group),
            Some(ParsedNode::Dataset(_)) => Ok(ChildKind::Dataset),
            Some(ParsedNode::Annotation(_)) => Ok(ChildKind::Other),
            None => Err(ContainerError::ChildNotFound { name: name.into() }),
        }
    }

    fn open_group(&self, name: &str) -> ContainerResult<Self> {
        match self.children.get(name) {
            Some(ParsedNode::Group(children)) => Ok(NativeGroup {
                children,
                data: self.data,
            }),
            Some(_) => Err(ContainerError::NotAGroup { name: name.into() }),
            None => Err(ContainerError::ChildNotFound { name: name.into() }),
        }
    }

    fn open_dataset(&self, name: &str) -> ContainerResult<Self::Dataset> {
        match self.children.get(name) {
            Some(ParsedNode::Dataset(meta)) => Ok(NativeDataset {
                meta,
                data: self.data,
            }),
            Some(_) => Err(ContainerError::NotADataset { name: name.into() }),
            None => Err(ContainerError::ChildNotFound { name: name.into() }),
        }
    }
}

/// A dataset within a [`NativeContainer`].
#[derive(Clone, Copy, Debug)]
pub struct NativeDataset<'a> {
    meta: &'a ParsedDataset,
    data: &'a [u8],
}

impl DatasetSource for NativeDataset<'_> {
    fn rank(&self) -> ContainerResult<usize> {
        Ok(self.meta.extents.len())
    }

    fn extents(&self) -> ContainerResult<Vec<u64>> {
        Ok(self.meta.extents.clone())
    }

    fn type_class(&self) -> ContainerResult<TypeClass> {
        Ok(self.meta.class)
    }

    fn read_into(&self, kind: ElementKind, buf: &mut [u8]) -> ContainerResult<usize> {
        let compressed = &self.data[self.meta.payload.clone()];
        if crc32fast::hash(compressed) != self.meta.crc32 {
            return Err(ContainerError::Corrupt {
                reason: "dataset payload CRC32 mismatch".into(),
            });
        }
        let raw = zstd::decode_all(compressed).map_err(|e| ContainerError::Corrupt {
            reason: format!("decompression failed: {e}"),
        })?;
        if raw.len() as u64 != self.meta.uncompressed_len {
            return Err(ContainerError::Corrupt {
                reason: format!(
                    "payload length mismatch: expected {}, got {}",
                    self.meta.uncompressed_len,
                    raw.len()
                ),
            });
        }

        // Convert little-endian storage to native-endian elements; write
        // only whole elements that fit in `buf`.
        let size = kind.size();
        let mut written = 0;
        for chunk in raw.chunks_exact(size) {
            if written + size > buf.len() {
                break;
            }
            match kind {
                ElementKind::Int32 => {
                    let v = i32::from_le_bytes(chunk.try_into().unwrap());
                    buf[written..written + size].copy_from_slice(&v.to_ne_bytes());
                }
                ElementKind::Float64 => {
                    let v = f64::from_le_bytes(chunk.try_into().unwrap());
                    buf[written..written + size].copy_from_slice(&v.to_ne_bytes());
                }
            }
            written += size;
        }
        Ok(written)
    }
}
