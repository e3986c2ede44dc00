//! VTK XML PolyData reader (`.vtp`)
//!
//! Only the first `Piece` is read. DataArrays may be `ascii` or inline
//! `binary` (base64, uncompressed); appended data and compressed files are
//! rejected.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::FormatIssue;
use crate::mesh::topology::{triangulate_fan, triangulate_strip};
use crate::mesh::{Mesh, PointArray};

type Result<T> = std::result::Result<T, FormatIssue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Points,
    PointData,
    CellData,
    Verts,
    Lines,
    Strips,
    Polys,
}

impl Section {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        Some(match tag {
            b"Points" => Section::Points,
            b"PointData" => Section::PointData,
            b"CellData" => Section::CellData,
            b"Verts" => Section::Verts,
            b"Lines" => Section::Lines,
            b"Strips" => Section::Strips,
            b"Polys" => Section::Polys,
            _ => return None,
        })
    }

    fn is_cells(self) -> bool {
        matches!(
            self,
            Section::Verts | Section::Lines | Section::Strips | Section::Polys
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteOrder {
    Little,
    Big,
}

/// Width of the byte-count header preceding each binary block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderType {
    UInt32,
    UInt64,
}

impl HeaderType {
    fn size(self) -> usize {
        match self {
            HeaderType::UInt32 => 4,
            HeaderType::UInt64 => 8,
        }
    }
}

#[derive(Debug, Clone)]
struct ArrayHeader {
    name: Option<String>,
    data_type: String,
    components: u32,
    format: String,
}

/// Connectivity + offsets collected for one cell section.
#[derive(Debug, Default)]
struct CellArrays {
    connectivity: Vec<u32>,
    offsets: Vec<u32>,
}

impl CellArrays {
    fn cells(&self, what: &str) -> Result<Vec<&[u32]>> {
        let mut start = 0usize;
        let mut cells = Vec::with_capacity(self.offsets.len());
        for &end in &self.offsets {
            let end = end as usize;
            let cell = self.connectivity.get(start..end).ok_or_else(|| {
                FormatIssue::Malformed(format!(
                    "{what} offset {end} is outside connectivity of length {}",
                    self.connectivity.len()
                ))
            })?;
            cells.push(cell);
            start = end;
        }
        Ok(cells)
    }
}

struct VtpParser {
    byte_order: ByteOrder,
    header_type: HeaderType,
    seen_root: bool,
    pieces: usize,
    declared_points: Option<usize>,
    section: Section,
    current: Option<ArrayHeader>,
    text: String,
    points: Option<Vec<f32>>,
    point_data: Vec<PointArray>,
    verts: CellArrays,
    lines: CellArrays,
    strips: CellArrays,
    polys: CellArrays,
}

/// Parse a VTK XML PolyData document.
pub(crate) fn parse_vtp(text: &str) -> Result<Mesh> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut parser = VtpParser {
        byte_order: ByteOrder::Little,
        header_type: HeaderType::UInt32,
        seen_root: false,
        pieces: 0,
        declared_points: None,
        section: Section::None,
        current: None,
        text: String::new(),
        points: None,
        point_data: Vec::new(),
        verts: CellArrays::default(),
        lines: CellArrays::default(),
        strips: CellArrays::default(),
        polys: CellArrays::default(),
    };

    loop {
        let event = reader.read_event().map_err(|e| {
            FormatIssue::Malformed(format!(
                "XML error at byte {}: {e}",
                reader.error_position()
            ))
        })?;
        match event {
            Event::Start(e) => {
                if !parser.start(&e, false)? {
                    break;
                }
            }
            Event::Empty(e) => {
                if !parser.start(&e, true)? {
                    break;
                }
            }
            Event::Text(t) => {
                if parser.current.is_some() {
                    let text = t
                        .unescape()
                        .map_err(|e| FormatIssue::Malformed(format!("bad text: {e}")))?;
                    parser.text.push_str(&text);
                }
            }
            Event::End(e) => {
                let name = e.name();
                let tag = name.as_ref();
                if tag == b"DataArray" {
                    parser.finish_array()?;
                } else if Section::from_tag(tag).is_some() {
                    parser.section = Section::None;
                } else if tag == b"Piece" {
                    break;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    parser.into_mesh()
}

fn attributes(e: &BytesStart<'_>) -> Result<Vec<(Vec<u8>, String)>> {
    e.attributes()
        .map(|attr| -> Result<(Vec<u8>, String)> {
            let attr = attr.map_err(|err| FormatIssue::Malformed(format!("bad attribute: {err}")))?;
            let value = attr
                .unescape_value()
                .map_err(|err| FormatIssue::Malformed(format!("bad attribute value: {err}")))?;
            Ok((attr.key.as_ref().to_vec(), value.into_owned()))
        })
        .collect()
}

fn attribute<'a>(attrs: &'a [(Vec<u8>, String)], key: &[u8]) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k.as_slice() == key)
        .map(|(_, v)| v.as_str())
}

impl VtpParser {
    /// Handle an opening tag. Returns `false` once the first piece is complete.
    fn start(&mut self, e: &BytesStart<'_>, empty: bool) -> Result<bool> {
        let name = e.name();
        let tag = name.as_ref();
        match tag {
            b"VTKFile" => {
                let attrs = attributes(e)?;
                match attribute(&attrs, b"type") {
                    Some("PolyData") => {}
                    Some(other) => {
                        return Err(FormatIssue::Unsupported(format!(
                            "VTKFile type {other} (only PolyData)"
                        )));
                    }
                    None => {
                        return Err(FormatIssue::Malformed("VTKFile has no type".into()));
                    }
                }
                if attribute(&attrs, b"compressor").is_some_and(|c| !c.is_empty()) {
                    return Err(FormatIssue::Unsupported("compressed VTK XML data".into()));
                }
                self.byte_order = match attribute(&attrs, b"byte_order") {
                    None | Some("LittleEndian") => ByteOrder::Little,
                    Some("BigEndian") => ByteOrder::Big,
                    Some(other) => {
                        return Err(FormatIssue::Malformed(format!("byte_order {other}")));
                    }
                };
                self.header_type = match attribute(&attrs, b"header_type") {
                    None | Some("UInt32") => HeaderType::UInt32,
                    Some("UInt64") => HeaderType::UInt64,
                    Some(other) => {
                        return Err(FormatIssue::Unsupported(format!("header_type {other}")));
                    }
                };
                self.seen_root = true;
            }
            b"Piece" => {
                self.pieces += 1;
                if self.pieces > 1 {
                    tracing::warn!("Only the first Piece of a .vtp file is converted");
                    return Ok(false);
                }
                let attrs = attributes(e)?;
                self.declared_points = attribute(&attrs, b"NumberOfPoints")
                    .map(|n| {
                        n.trim().parse::<usize>().map_err(|_| {
                            FormatIssue::Malformed(format!("NumberOfPoints '{n}'"))
                        })
                    })
                    .transpose()?;
            }
            b"AppendedData" => {
                return Err(FormatIssue::Unsupported("appended VTK XML data".into()));
            }
            b"DataArray" => {
                let attrs = attributes(e)?;
                let format = attribute(&attrs, b"format").unwrap_or("ascii").to_string();
                if format == "appended" {
                    return Err(FormatIssue::Unsupported("appended VTK XML data".into()));
                }
                let components = match attribute(&attrs, b"NumberOfComponents") {
                    Some(n) => n.trim().parse().map_err(|_| {
                        FormatIssue::Malformed(format!("NumberOfComponents '{n}'"))
                    })?,
                    None => 1,
                };
                let header = ArrayHeader {
                    name: attribute(&attrs, b"Name").map(str::to_string),
                    data_type: attribute(&attrs, b"type").unwrap_or("Float32").to_string(),
                    components,
                    format,
                };
                self.current = Some(header);
                self.text.clear();
                if empty {
                    self.finish_array()?;
                }
            }
            _ => {
                if let Some(section) = Section::from_tag(tag) {
                    if !empty {
                        self.section = section;
                    }
                }
            }
        }
        Ok(true)
    }

    fn finish_array(&mut self) -> Result<()> {
        let Some(header) = self.current.take() else {
            return Ok(());
        };
        let text = std::mem::take(&mut self.text);
        let section = self.section;
        if section == Section::None || section == Section::CellData {
            return Ok(());
        }

        let values = decode_array(&header, &text, self.byte_order, self.header_type)?;
        match section {
            Section::Points => {
                if header.components != 3 {
                    return Err(FormatIssue::Malformed(format!(
                        "Points array has {} components",
                        header.components
                    )));
                }
                self.points = Some(values.into_iter().map(|v| v as f32).collect());
            }
            Section::PointData => {
                let name = header
                    .name
                    .unwrap_or_else(|| format!("point_array_{}", self.point_data.len()));
                let values = values.into_iter().map(|v| v as f32).collect();
                self.point_data
                    .push(PointArray::new(name, header.components, values));
            }
            cells if cells.is_cells() => {
                let target = match cells {
                    Section::Verts => &mut self.verts,
                    Section::Lines => &mut self.lines,
                    Section::Strips => &mut self.strips,
                    _ => &mut self.polys,
                };
                match header.name.as_deref() {
                    Some("connectivity") => target.connectivity = to_ids(&values, "connectivity")?,
                    Some("offsets") => target.offsets = to_ids(&values, "offsets")?,
                    _ => {}
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn into_mesh(self) -> Result<Mesh> {
        if !self.seen_root {
            return Err(FormatIssue::Malformed("not a VTKFile document".into()));
        }
        let flat = self.points.unwrap_or_default();
        if flat.len() % 3 != 0 {
            return Err(FormatIssue::Truncated("Points".into()));
        }
        let mut mesh = Mesh {
            points: flat.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect(),
            ..Default::default()
        };
        if let Some(declared) = self.declared_points {
            if declared != mesh.points.len() {
                return Err(FormatIssue::Malformed(format!(
                    "Piece declares {declared} points but Points holds {}",
                    mesh.points.len()
                )));
            }
        }

        for cell in self.polys.cells("Polys")? {
            triangulate_fan(cell, &mut mesh.triangles);
        }
        for cell in self.strips.cells("Strips")? {
            triangulate_strip(cell, &mut mesh.triangles);
        }
        mesh.lines = self
            .lines
            .cells("Lines")?
            .into_iter()
            .map(<[u32]>::to_vec)
            .collect();
        // Verts carry no surface; only validate their layout
        self.verts.cells("Verts")?;

        for array in self.point_data {
            if array.tuple_count() == mesh.points.len() {
                mesh.point_data.push(array);
            } else {
                tracing::warn!(
                    "Skipping point array '{}': {} tuples for {} points",
                    array.name,
                    array.tuple_count(),
                    mesh.points.len()
                );
            }
        }

        tracing::debug!(
            "VTP: {} points, {} triangles, {} lines, {} point arrays",
            mesh.points.len(),
            mesh.triangles.len(),
            mesh.lines.len(),
            mesh.point_data.len()
        );
        Ok(mesh)
    }
}

fn to_ids(values: &[f64], what: &str) -> Result<Vec<u32>> {
    values
        .iter()
        .map(|&v| {
            if v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) {
                Ok(v as u32)
            } else {
                Err(FormatIssue::Malformed(format!("invalid {what} value {v}")))
            }
        })
        .collect()
}

fn decode_array(
    header: &ArrayHeader,
    text: &str,
    order: ByteOrder,
    header_type: HeaderType,
) -> Result<Vec<f64>> {
    match header.format.as_str() {
        "ascii" => text
            .split_whitespace()
            .map(|tok| {
                tok.parse::<f64>()
                    .map_err(|_| FormatIssue::Malformed(format!("expected number, got '{tok}'")))
            })
            .collect(),
        "binary" => {
            let bytes = decode_binary_block(text, header_type, order)?;
            decode_numbers(&bytes, &header.data_type, order)
        }
        other => Err(FormatIssue::Unsupported(format!("DataArray format {other}"))),
    }
}

/// Strip the byte-count header from an inline base64 block.
///
/// Writers either encode header and payload as one base64 stream or as two
/// separately padded streams; both are accepted.
fn decode_binary_block(text: &str, header_type: HeaderType, order: ByteOrder) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let header_size = header_type.size();
    let header_chars = header_size.div_ceil(3) * 4;
    if compact.len() < header_chars {
        return Err(FormatIssue::Truncated("binary DataArray header".into()));
    }

    let b64 = |s: &str| {
        STANDARD
            .decode(s)
            .map_err(|e| FormatIssue::Malformed(format!("bad base64 data: {e}")))
    };

    let (header_part, rest) = compact.split_at(header_chars);
    let (header_bytes, payload) = if header_part.ends_with('=') && !rest.is_empty() {
        (b64(header_part)?, b64(rest)?)
    } else {
        let mut all = b64(&compact)?;
        let payload = all.split_off(header_size.min(all.len()));
        (all, payload)
    };
    if header_bytes.len() < header_size {
        return Err(FormatIssue::Truncated("binary DataArray header".into()));
    }

    let declared = match header_type {
        HeaderType::UInt32 => {
            let raw: [u8; 4] = [header_bytes[0], header_bytes[1], header_bytes[2], header_bytes[3]];
            u64::from(match order {
                ByteOrder::Little => u32::from_le_bytes(raw),
                ByteOrder::Big => u32::from_be_bytes(raw),
            })
        }
        HeaderType::UInt64 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(&header_bytes[..8]);
            match order {
                ByteOrder::Little => u64::from_le_bytes(raw),
                ByteOrder::Big => u64::from_be_bytes(raw),
            }
        }
    };
    let declared = usize::try_from(declared)
        .map_err(|_| FormatIssue::Malformed(format!("block size {declared}")))?;
    if payload.len() < declared {
        return Err(FormatIssue::Truncated(format!(
            "binary DataArray ({} of {declared} bytes)",
            payload.len()
        )));
    }
    Ok(payload[..declared].to_vec())
}

macro_rules! decode_as {
    ($bytes:expr, $ty:ty, $order:expr) => {{
        const N: usize = std::mem::size_of::<$ty>();
        if $bytes.len() % N != 0 {
            return Err(FormatIssue::Malformed(format!(
                "{} bytes is not a multiple of {}",
                $bytes.len(),
                N
            )));
        }
        $bytes
            .chunks_exact(N)
            .map(|chunk| {
                let mut raw = [0u8; N];
                raw.copy_from_slice(chunk);
                let v = match $order {
                    ByteOrder::Little => <$ty>::from_le_bytes(raw),
                    ByteOrder::Big => <$ty>::from_be_bytes(raw),
                };
                v as f64
            })
            .collect()
    }};
}

fn decode_numbers(bytes: &[u8], data_type: &str, order: ByteOrder) -> Result<Vec<f64>> {
    Ok(match data_type {
        "Int8" => decode_as!(bytes, i8, order),
        "UInt8" => decode_as!(bytes, u8, order),
        "Int16" => decode_as!(bytes, i16, order),
        "UInt16" => decode_as!(bytes, u16, order),
        "Int32" => decode_as!(bytes, i32, order),
        "UInt32" => decode_as!(bytes, u32, order),
        "Int64" => decode_as!(bytes, i64, order),
        "UInt64" => decode_as!(bytes, u64, order),
        "Float32" => decode_as!(bytes, f32, order),
        "Float64" => decode_as!(bytes, f64, order),
        other => return Err(FormatIssue::Unsupported(format!("DataArray type {other}"))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ASCII_VTP: &str = r#"<?xml version="1.0"?>
<VTKFile type="PolyData" version="0.1" byte_order="LittleEndian">
  <PolyData>
    <Piece NumberOfPoints="4" NumberOfPolys="1" NumberOfLines="1">
      <PointData Scalars="pressure">
        <DataArray type="Float32" Name="pressure" format="ascii">0 1 2 3</DataArray>
        <DataArray type="Float32" Name="velocity" NumberOfComponents="3" format="ascii">
          1 0 0 0 1 0 0 0 1 1 1 1
        </DataArray>
      </PointData>
      <CellData>
        <DataArray type="Int32" Name="region" format="ascii">7 8</DataArray>
      </CellData>
      <Points>
        <DataArray type="Float32" NumberOfComponents="3" format="ascii">
          0 0 0  1 0 0  1 1 0  0 1 0
        </DataArray>
      </Points>
      <Lines>
        <DataArray type="Int32" Name="connectivity" format="ascii">0 2</DataArray>
        <DataArray type="Int32" Name="offsets" format="ascii">2</DataArray>
      </Lines>
      <Polys>
        <DataArray type="Int64" Name="connectivity" format="ascii">0 1 2 3</DataArray>
        <DataArray type="Int64" Name="offsets" format="ascii">4</DataArray>
      </Polys>
    </Piece>
  </PolyData>
</VTKFile>
"#;

    #[test]
    fn test_ascii_polydata() {
        let mesh = parse_vtp(ASCII_VTP).unwrap();
        assert_eq!(mesh.points.len(), 4);
        assert_eq!(mesh.triangles, vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(mesh.lines, vec![vec![0, 2]]);
        let names: Vec<&str> = mesh.point_data.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["pressure", "velocity"]);
        assert_eq!(mesh.point_data[1].components, 3);
    }

    fn encode_block(payload: &[u8]) -> String {
        let mut header = (payload.len() as u32).to_le_bytes().to_vec();
        // single stream
        header.extend_from_slice(payload);
        STANDARD.encode(header)
    }

    #[test]
    fn test_binary_arrays() {
        let points: Vec<u8> = [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let connectivity: Vec<u8> = [0i64, 1, 2].iter().flat_map(|v| v.to_le_bytes()).collect();
        let offsets: Vec<u8> = 3i64.to_le_bytes().to_vec();
        // Separately encoded header and payload
        let separate = format!(
            "{}{}",
            STANDARD.encode((offsets.len() as u32).to_le_bytes()),
            STANDARD.encode(&offsets)
        );

        let doc = format!(
            r#"<VTKFile type="PolyData" byte_order="LittleEndian" header_type="UInt32">
<PolyData><Piece NumberOfPoints="3" NumberOfPolys="1">
<Points><DataArray type="Float32" NumberOfComponents="3" format="binary">{}</DataArray></Points>
<Polys>
<DataArray type="Int64" Name="connectivity" format="binary">{}</DataArray>
<DataArray type="Int64" Name="offsets" format="binary">{}</DataArray>
</Polys>
</Piece></PolyData></VTKFile>"#,
            encode_block(&points),
            encode_block(&connectivity),
            separate
        );
        let mesh = parse_vtp(&doc).unwrap();
        assert_eq!(mesh.points[1], [1.0, 0.0, 0.0]);
        assert_eq!(mesh.triangles, vec![[0, 1, 2]]);
    }

    #[test]
    fn test_uint64_header() {
        let payload: Vec<u8> = [2.5f64].iter().flat_map(|v| v.to_le_bytes()).collect();
        let mut block = (payload.len() as u64).to_le_bytes().to_vec();
        block.extend_from_slice(&payload);
        let bytes = decode_binary_block(
            &STANDARD.encode(&block),
            HeaderType::UInt64,
            ByteOrder::Little,
        )
        .unwrap();
        assert_eq!(decode_numbers(&bytes, "Float64", ByteOrder::Little).unwrap(), vec![2.5]);
    }

    #[test]
    fn test_big_endian_numbers() {
        let bytes = 7i32.to_be_bytes();
        assert_eq!(decode_numbers(&bytes, "Int32", ByteOrder::Big).unwrap(), vec![7.0]);
    }

    #[test]
    fn test_rejects_compressed() {
        let doc = r#"<VTKFile type="PolyData" compressor="vtkZLibDataCompressor"></VTKFile>"#;
        assert!(matches!(parse_vtp(doc), Err(FormatIssue::Unsupported(_))));
    }

    #[test]
    fn test_rejects_appended() {
        let doc = r#"<VTKFile type="PolyData"><PolyData><Piece NumberOfPoints="1">
<Points><DataArray type="Float32" NumberOfComponents="3" format="appended" offset="0"/></Points>
</Piece></PolyData></VTKFile>"#;
        assert!(matches!(parse_vtp(doc), Err(FormatIssue::Unsupported(_))));
    }

    #[test]
    fn test_rejects_other_dataset_types() {
        let doc = r#"<VTKFile type="ImageData"></VTKFile>"#;
        assert!(matches!(parse_vtp(doc), Err(FormatIssue::Unsupported(_))));
    }

    #[test]
    fn test_rejects_non_vtk_xml() {
        assert!(matches!(
            parse_vtp("<root><child/></root>"),
            Err(FormatIssue::Malformed(_))
        ));
    }

    #[test]
    fn test_offsets_past_connectivity() {
        let doc = r#"<VTKFile type="PolyData"><PolyData><Piece NumberOfPoints="3">
<Points><DataArray type="Float32" NumberOfComponents="3" format="ascii">0 0 0 1 0 0 0 1 0</DataArray></Points>
<Polys>
<DataArray type="Int32" Name="connectivity" format="ascii">0 1 2</DataArray>
<DataArray type="Int32" Name="offsets" format="ascii">5</DataArray>
</Polys>
</Piece></PolyData></VTKFile>"#;
        assert!(matches!(parse_vtp(doc), Err(FormatIssue::Malformed(_))));
    }

    #[test]
    fn test_point_count_mismatch() {
        let doc = r#"<VTKFile type="PolyData"><PolyData><Piece NumberOfPoints="2">
<Points><DataArray type="Float32" NumberOfComponents="3" format="ascii">0 0 0</DataArray></Points>
</Piece></PolyData></VTKFile>"#;
        assert!(parse_vtp(doc).is_err());
    }
}
