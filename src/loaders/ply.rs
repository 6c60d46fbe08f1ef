use anyhow::{anyhow, bail, Context, Result};
use glam::Vec3;
use std::path::Path;

/// Raw point cloud read from a PLY file
#[derive(Debug, Clone, Default)]
pub struct PointCloud {
    pub positions: Vec<Vec3>,
    /// Per-vertex RGB in [0, 1], when the file carries colors
    pub colors: Option<Vec<[f32; 3]>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scalar {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl Scalar {
    fn parse(name: &str) -> Result<Self> {
        Ok(match name {
            "char" | "int8" => Scalar::I8,
            "uchar" | "uint8" => Scalar::U8,
            "short" | "int16" => Scalar::I16,
            "ushort" | "uint16" => Scalar::U16,
            "int" | "int32" => Scalar::I32,
            "uint" | "uint32" => Scalar::U32,
            "float" | "float32" => Scalar::F32,
            "double" | "float64" => Scalar::F64,
            other => bail!("unknown PLY scalar type `{}`", other),
        })
    }

    fn size(self) -> usize {
        match self {
            Scalar::I8 | Scalar::U8 => 1,
            Scalar::I16 | Scalar::U16 => 2,
            Scalar::I32 | Scalar::U32 | Scalar::F32 => 4,
            Scalar::F64 => 8,
        }
    }

    fn read(self, bytes: &[u8], encoding: Encoding) -> f64 {
        macro_rules! decode {
            ($ty:ty, $n:expr) => {{
                let mut raw = [0u8; $n];
                raw.copy_from_slice(&bytes[..$n]);
                match encoding {
                    Encoding::BinaryBigEndian => <$ty>::from_be_bytes(raw) as f64,
                    _ => <$ty>::from_le_bytes(raw) as f64,
                }
            }};
        }

        match self {
            Scalar::I8 => bytes[0] as i8 as f64,
            Scalar::U8 => bytes[0] as f64,
            Scalar::I16 => decode!(i16, 2),
            Scalar::U16 => decode!(u16, 2),
            Scalar::I32 => decode!(i32, 4),
            Scalar::U32 => decode!(u32, 4),
            Scalar::F32 => decode!(f32, 4),
            Scalar::F64 => decode!(f64, 8),
        }
    }

    fn is_integer(self) -> bool {
        !matches!(self, Scalar::F32 | Scalar::F64)
    }
}

#[derive(Debug, Clone)]
enum Property {
    Scalar { name: String, ty: Scalar },
    List { count: Scalar, item: Scalar },
}

#[derive(Debug, Clone)]
struct Element {
    name: String,
    count: usize,
    properties: Vec<Property>,
}

impl Element {
    fn scalar_index(&self, wanted: &str) -> Option<(usize, Scalar)> {
        self.properties.iter().enumerate().find_map(|(i, p)| match p {
            Property::Scalar { name, ty } if name == wanted => Some((i, *ty)),
            _ => None,
        })
    }

    fn fixed_stride(&self) -> Option<usize> {
        self.properties
            .iter()
            .map(|p| match p {
                Property::Scalar { ty, .. } => Some(ty.size()),
                Property::List { .. } => None,
            })
            .sum()
    }

    /// Vertex rows are read as flat scalars; list properties would shift every column
    fn reject_lists(&self) -> Result<()> {
        for property in &self.properties {
            if let Property::List { count, item } = property {
                bail!(
                    "list property ({:?} count, {:?} items) on element `{}` is not supported",
                    count,
                    item,
                    self.name
                );
            }
        }
        Ok(())
    }

    /// Bytes taken by `count` fixed-size records
    fn byte_len(&self) -> Result<usize> {
        let stride = self.fixed_stride().with_context(|| {
            format!("element `{}` has list properties of unknown size", self.name)
        })?;
        stride
            .checked_mul(self.count)
            .with_context(|| format!("element `{}` count {} overflows", self.name, self.count))
    }
}

#[derive(Debug)]
struct Header {
    encoding: Encoding,
    elements: Vec<Element>,
    body_offset: usize,
}

pub fn load_ply_file(path: impl AsRef<Path>) -> Result<PointCloud> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).context(format!("Failed to read PLY file: {:?}", path))?;
    parse_ply(&bytes).context(format!("Failed to parse PLY file: {:?}", path))
}

/// Parses the vertex element of a PLY document; faces and other elements are ignored
pub fn parse_ply(bytes: &[u8]) -> Result<PointCloud> {
    let header = parse_header(bytes)?;

    let vertex_index = header
        .elements
        .iter()
        .position(|e| e.name == "vertex")
        .ok_or_else(|| anyhow!("PLY has no vertex element"))?;
    let vertex = &header.elements[vertex_index];

    let (x, _) = vertex.scalar_index("x").context("vertex element has no `x`")?;
    let (y, _) = vertex.scalar_index("y").context("vertex element has no `y`")?;
    let (z, _) = vertex.scalar_index("z").context("vertex element has no `z`")?;
    let color = match (
        vertex.scalar_index("red"),
        vertex.scalar_index("green"),
        vertex.scalar_index("blue"),
    ) {
        (Some(r), Some(g), Some(b)) => Some([r, g, b]),
        _ => None,
    };

    let body = &bytes[header.body_offset..];
    let rows = match header.encoding {
        Encoding::Ascii => read_ascii_rows(body, &header.elements, vertex_index)?,
        encoding => read_binary_rows(body, &header.elements, vertex_index, encoding)?,
    };

    let mut cloud = PointCloud {
        positions: Vec::with_capacity(rows.len()),
        colors: color.map(|_| Vec::with_capacity(rows.len())),
    };

    for row in &rows {
        cloud
            .positions
            .push(Vec3::new(row[x] as f32, row[y] as f32, row[z] as f32));

        if let (Some(channels), Some(colors)) = (color, cloud.colors.as_mut()) {
            colors.push(channels.map(|(i, ty)| {
                if ty.is_integer() {
                    (row[i] / 255.0) as f32
                } else {
                    row[i] as f32
                }
            }));
        }
    }

    Ok(cloud)
}

fn parse_header(bytes: &[u8]) -> Result<Header> {
    const END: &[u8] = b"end_header";

    let end = bytes
        .windows(END.len())
        .position(|w| w == END)
        .ok_or_else(|| anyhow!("missing end_header"))?;
    let mut body_offset = end + END.len();
    if bytes.get(body_offset) == Some(&b'\r') {
        body_offset += 1;
    }
    if bytes.get(body_offset) == Some(&b'\n') {
        body_offset += 1;
    }

    let text = std::str::from_utf8(&bytes[..end]).context("PLY header is not UTF-8")?;
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    if lines.next() != Some("ply") {
        bail!("not a PLY file");
    }

    let mut encoding = None;
    let mut elements: Vec<Element> = Vec::new();

    for line in lines {
        let mut words = line.split_whitespace();
        match words.next() {
            Some("format") => {
                encoding = Some(match words.next() {
                    Some("ascii") => Encoding::Ascii,
                    Some("binary_little_endian") => Encoding::BinaryLittleEndian,
                    Some("binary_big_endian") => Encoding::BinaryBigEndian,
                    other => bail!("unsupported PLY format {:?}", other),
                });
            }
            Some("element") => {
                let name = words.next().context("element without a name")?;
                let count = words
                    .next()
                    .context("element without a count")?
                    .parse()
                    .context("invalid element count")?;
                elements.push(Element {
                    name: name.to_string(),
                    count,
                    properties: Vec::new(),
                });
            }
            Some("property") => {
                let element = elements
                    .last_mut()
                    .context("property declared before any element")?;
                let property = match words.next() {
                    Some("list") => Property::List {
                        count: Scalar::parse(words.next().context("list without count type")?)?,
                        item: Scalar::parse(words.next().context("list without item type")?)?,
                    },
                    Some(ty) => Property::Scalar {
                        ty: Scalar::parse(ty)?,
                        name: words.next().context("property without a name")?.to_string(),
                    },
                    None => bail!("empty property declaration"),
                };
                element.properties.push(property);
            }
            Some("comment") | Some("obj_info") => {}
            Some(other) => bail!("unexpected PLY header keyword `{}`", other),
            None => {}
        }
    }

    Ok(Header {
        encoding: encoding.context("PLY header has no format line")?,
        elements,
        body_offset,
    })
}

fn read_ascii_rows(body: &[u8], elements: &[Element], target: usize) -> Result<Vec<Vec<f64>>> {
    let text = std::str::from_utf8(body).context("ASCII PLY body is not UTF-8")?;
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    // Elements before the vertex element occupy one line per item
    for element in &elements[..target] {
        for _ in 0..element.count {
            lines.next().context("PLY body ended early")?;
        }
    }

    let vertex = &elements[target];
    vertex.reject_lists()?;
    // Every ASCII row takes at least one byte
    if vertex.count > body.len() {
        bail!(
            "PLY header declares {} vertices but the body is only {} bytes",
            vertex.count,
            body.len()
        );
    }

    let mut rows = Vec::with_capacity(vertex.count);
    for i in 0..vertex.count {
        let line = lines
            .next()
            .with_context(|| format!("PLY body ended at vertex {}", i))?;
        let row = line
            .split_whitespace()
            .take(vertex.properties.len())
            .map(|v| v.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("invalid number in vertex {}", i))?;
        if row.len() < vertex.properties.len() {
            bail!("vertex {} has {} values, expected {}", i, row.len(), vertex.properties.len());
        }
        rows.push(row);
    }

    Ok(rows)
}

fn read_binary_rows(
    body: &[u8],
    elements: &[Element],
    target: usize,
    encoding: Encoding,
) -> Result<Vec<Vec<f64>>> {
    let mut offset: usize = 0;
    for element in &elements[..target] {
        let len = element
            .byte_len()
            .with_context(|| format!("cannot skip element `{}` before vertices", element.name))?;
        offset = offset
            .checked_add(len)
            .context("PLY element sizes overflow")?;
    }

    let vertex = &elements[target];
    vertex.reject_lists()?;
    let stride = vertex.fixed_stride().unwrap_or_default();
    if stride == 0 {
        bail!("vertex element has no properties");
    }
    let needed = vertex
        .byte_len()?
        .checked_add(offset)
        .context("PLY element sizes overflow")?;
    if body.len() < needed {
        bail!("PLY body is {} bytes, expected at least {}", body.len(), needed);
    }

    let rows = body[offset..needed]
        .chunks_exact(stride)
        .map(|record| {
            let mut cursor = 0;
            vertex
                .properties
                .iter()
                .map(|p| match p {
                    Property::Scalar { ty, .. } => {
                        let value = ty.read(&record[cursor..], encoding);
                        cursor += ty.size();
                        value
                    }
                    Property::List { .. } => 0.0,
                })
                .collect()
        })
        .collect();

    Ok(rows)
}
