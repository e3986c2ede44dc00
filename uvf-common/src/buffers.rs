//! UVF binary buffer layout.
//!
//! A buffer file is a plain concatenation of little-endian sections with no
//! header. Section placement is described only by the manifest.
//!
//! # Layout
//! ```text
//! 0x00: indices   uint32 x index_count
//! var:  position  float32 x 3 x point_count
//! var:  <field>   float32 x components x tuple_count   (one per point array)
//! ```

use serde::{Deserialize, Serialize};

/// Element type of a buffer section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Uint32,
    Float32,
}

impl DataType {
    /// Size of one element in bytes.
    pub fn size(self) -> usize {
        match self {
            DataType::Uint32 | DataType::Float32 => 4,
        }
    }
}

/// One named section of a buffer file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferSection {
    pub d_type: DataType,
    pub dimension: u32,
    /// Section size in bytes
    pub length: u64,
    pub name: String,
    /// Byte offset from the start of the buffer file
    pub offset: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_min: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_max: Option<f32>,
}

impl BufferSection {
    /// Number of elements (not tuples) in the section.
    pub fn element_count(&self) -> u64 {
        self.length / self.d_type.size() as u64
    }
}

/// Accumulates sections into a single byte buffer.
#[derive(Debug, Default)]
pub struct BufferBuilder {
    bytes: Vec<u8>,
    sections: Vec<BufferSection>,
}

impl BufferBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a uint32 section.
    pub fn push_u32(&mut self, name: &str, dimension: u32, data: &[u32]) -> &mut Self {
        let offset = self.bytes.len() as u64;
        self.bytes.reserve(data.len() * 4);
        for v in data {
            self.bytes.extend_from_slice(&v.to_le_bytes());
        }
        self.sections.push(BufferSection {
            d_type: DataType::Uint32,
            dimension,
            length: self.bytes.len() as u64 - offset,
            name: name.to_string(),
            offset,
            range_min: None,
            range_max: None,
        });
        self
    }

    /// Append a float32 section.
    ///
    /// With `with_range`, the finite min/max of `data` is recorded on the
    /// section (omitted when `data` has no finite values).
    pub fn push_f32(
        &mut self,
        name: &str,
        dimension: u32,
        data: &[f32],
        with_range: bool,
    ) -> &mut Self {
        let offset = self.bytes.len() as u64;
        self.bytes.reserve(data.len() * 4);
        for v in data {
            self.bytes.extend_from_slice(&v.to_le_bytes());
        }
        let (range_min, range_max) = if with_range {
            match finite_range(data) {
                Some((lo, hi)) => (Some(lo), Some(hi)),
                None => (None, None),
            }
        } else {
            (None, None)
        };
        self.sections.push(BufferSection {
            d_type: DataType::Float32,
            dimension,
            length: self.bytes.len() as u64 - offset,
            name: name.to_string(),
            offset,
            range_min,
            range_max,
        });
        self
    }

    pub fn sections(&self) -> &[BufferSection] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consume the builder, returning the bytes and the section table.
    pub fn finish(self) -> (Vec<u8>, Vec<BufferSection>) {
        (self.bytes, self.sections)
    }
}

fn finite_range(data: &[f32]) -> Option<(f32, f32)> {
    data.iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Read a uint32 section back out of a buffer file.
///
/// Returns `None` if the section is not uint32 or lies outside `bytes`.
pub fn read_u32_section(bytes: &[u8], section: &BufferSection) -> Option<Vec<u32>> {
    if section.d_type != DataType::Uint32 {
        return None;
    }
    let data = section_bytes(bytes, section)?;
    Some(
        data.chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    )
}

/// Read a float32 section back out of a buffer file.
pub fn read_f32_section(bytes: &[u8], section: &BufferSection) -> Option<Vec<f32>> {
    if section.d_type != DataType::Float32 {
        return None;
    }
    let data = section_bytes(bytes, section)?;
    Some(
        data.chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
    )
}

fn section_bytes<'a>(bytes: &'a [u8], section: &BufferSection) -> Option<&'a [u8]> {
    let start = usize::try_from(section.offset).ok()?;
    let len = usize::try_from(section.length).ok()?;
    bytes.get(start..start.checked_add(len)?)
}
