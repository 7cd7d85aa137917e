//! Native single-file container format for Grove.
//!
//! Provides a zstd-compressed, CRC-checked on-disk encoding of a
//! group/dataset tree, with a BLAKE3 trailer over the whole file.
//!
//! # On-disk layout
//!
//! ```text
//! [4 bytes  magic "GRVC"]
//! [4 bytes  format version (big-endian u32) = 1]
//! [node tree, root group first, depth-first]
//! [32 bytes BLAKE3 checksum of everything before it]
//! ```
//!
//! Node encodings (varints are LEB128):
//!
//! - group: `[tag 0x01] [varint child count]` then per child
//!   `[varint name length] [name bytes] [node]`
//! - dataset: `[tag 0x02] [type class code] [varint rank]
//!   [varint extent] x rank [varint uncompressed length]
//!   [varint compressed length] [4 bytes CRC32 of compressed payload]
//!   [compressed payload]`
//! - annotation: `[tag 0x03] [varint length] [payload bytes]`
//!
//! Dataset payloads are stored little-endian and converted to native
//! byte order on read.
//!
//! # Architecture
//!
//! - **[`NativeContainer`]**: reads and validates a whole file up front;
//!   implements the `grove-container` traits via [`NativeGroup`] and
//!   [`NativeDataset`]
//! - **[`ContainerWriter`]**: encodes a `MemoryContainer` to bytes or to a
//!   file

pub mod error;
pub mod reader;
pub mod writer;

pub use error::{FormatError, FormatResult};
pub use reader::{NativeContainer, NativeDataset, NativeGroup};
pub use writer::ContainerWriter;
