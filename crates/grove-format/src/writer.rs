use std::collections::BTreeMap;
use std::path::Path;

use grove_container::{MemoryContainer, MemoryDataset, MemoryNode};
use grove_types::{ElementKind, TypeClass};

use crate::error::{FormatError, FormatResult};

pub(crate) const MAGIC: &[u8; 4] = b"GRVC";
pub(crate) const VERSION: u32 = 1;

pub(crate) const TAG_GROUP: u8 = 0x01;
pub(crate) const TAG_DATASET: u8 = 0x02;
pub(crate) const TAG_ANNOTATION: u8 = 0x03;

/// Encodes a [`MemoryContainer`] into the native on-disk format.
pub struct ContainerWriter;

impl ContainerWriter {
    /// Encode the container to bytes (no disk I/O).
    pub fn encode(container: &MemoryContainer) -> FormatResult<Vec<u8>> {
        let mut buf = Vec::new();
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&VERSION.to_be_bytes());

        encode_group(&mut buf, container.root_nodes())?;

        // Trailer: BLAKE3 checksum of everything so far
        let checksum = *blake3::hash(&buf).as_bytes();
        buf.extend_from_slice(&checksum);
        Ok(buf)
    }

    /// Encode the container and write it to a file.
    pub fn write_to(path: &Path, container: &MemoryContainer) -> FormatResult<()> {
        let bytes = Self::encode(container)?;
        std::fs::write(path, &bytes)?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote container file");
        Ok(())
    }
}

fn encode_group(buf: &mut Vec<u8>, children: &BTreeMap<String, MemoryNode>) -> FormatResult<()> {
    buf.push(TAG_GROUP);
    encode_varint(buf, children.len() as u64);
    for (name, node) in children {
        encode_varint(buf, name.len() as u64);
        buf.extend_from_slice(name.as_bytes());
        match node {
            MemoryNode::Group(sub) => encode_group(buf, sub)?,
            MemoryNode::Dataset(dataset) => encode_dataset(buf, dataset)?,
            MemoryNode::Opaque(bytes) => {
                buf.push(TAG_ANNOTATION);
                encode_varint(buf, bytes.len() as u64);
                buf.extend_from_slice(bytes);
            }
        }
    }
    Ok(())
}

fn encode_dataset(buf: &mut Vec<u8>, dataset: &MemoryDataset) -> FormatResult<()> {
    buf.push(TAG_DATASET);
    buf.push(dataset.class().code());

    let shape = dataset.shape();
    encode_varint(buf, shape.rank() as u64);
    for &extent in shape.extents() {
        encode_varint(buf, extent);
    }

    let payload = payload_to_le(dataset.class(), dataset.payload());
    encode_varint(buf, payload.len() as u64);

    let compressed = zstd::encode_all(payload.as_slice(), 3)
        .map_err(|e| FormatError::CompressionFailed(e.to_string()))?;
    encode_varint(buf, compressed.len() as u64);
    buf.extend_from_slice(&crc32fast::hash(&compressed).to_be_bytes());
    buf.extend_from_slice(&compressed);
    Ok(())
}

/// Convert a native-endian payload to the little-endian storage encoding.
///
/// Non-numeric classes are carried as uninterpreted bytes. A trailing
/// partial element is preserved so truncated fixtures survive a roundtrip.
fn payload_to_le(class: TypeClass, payload: &[u8]) -> Vec<u8> {
    let kind = match ElementKind::from_class(class) {
        Some(kind) => kind,
        None => return payload.to_vec(),
    };
    let size = kind.size();
    let mut out = Vec::with_capacity(payload.len());
    let chunks = payload.chunks_exact(size);
    let remainder = chunks.remainder();
    for chunk in chunks {
        match kind {
            ElementKind::Int32 => {
                let v = i32::from_ne_bytes(chunk.try_into().unwrap());
                out.extend_from_slice(&v.to_le_bytes());
            }
            ElementKind::Float64 => {
                let v = f64::from_ne_bytes(chunk.try_into().unwrap());
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
    }
    out.extend_from_slice(remainder);
    out
}

/// Encode a u64 as a variable-length integer (LEB128).
pub(crate) fn encode_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value > 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Decode a variable-length integer. Returns (value, bytes_consumed).
pub(crate) fn decode_varint(data: &[u8]) -> FormatResult<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift = 0;
    for (i, &byte) in data.iter().enumerate() {
        value |= ((byte & 0x7F) as u64) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
        if shift >= 64 {
            return Err(FormatError::CorruptNode {
                offset: 0,
                reason: "varint overflow".into(),
            });
        }
    }
    Err(FormatError::Truncated {
        offset: 0,
        reason: "truncated varint".into(),
    })
}
