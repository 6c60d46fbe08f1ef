use anyhow::{bail, Context, Result};
use bytemuck::{Pod, Zeroable};
use glam::{Quat, Vec3};
use std::io::Read;
use std::path::Path;

/// One packed `.splat` record as stored on disk (32 bytes, little endian)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct SplatRecord {
    pub position: [f32; 3],
    pub scale: [f32; 3],
    pub color: [u8; 4],
    pub rotation: [u8; 4],
}

pub const SPLAT_RECORD_SIZE: usize = std::mem::size_of::<SplatRecord>();

/// Records decoded per progress callback when streaming
const CHUNK_RECORDS: usize = 4096;

/// Decoded Gaussian
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Splat {
    pub position: Vec3,
    pub scale: Vec3,
    pub color: [f32; 4],
    pub rotation: Quat,
}

impl From<SplatRecord> for Splat {
    fn from(record: SplatRecord) -> Self {
        let [w, x, y, z] = record.rotation.map(|c| (c as f32 - 128.0) / 128.0);
        let rotation = Quat::from_xyzw(x, y, z, w);

        Self {
            position: Vec3::from_array(record.position),
            scale: Vec3::from_array(record.scale),
            color: record.color.map(|c| c as f32 / 255.0),
            rotation: if rotation.length_squared() > 0.0 {
                rotation.normalize()
            } else {
                Quat::IDENTITY
            },
        }
    }
}

/// Decodes a whole `.splat` buffer
pub fn parse_splats(bytes: &[u8]) -> Result<Vec<Splat>> {
    if bytes.len() % SPLAT_RECORD_SIZE != 0 {
        bail!(
            "splat data is {} bytes, not a multiple of the {}-byte record",
            bytes.len(),
            SPLAT_RECORD_SIZE
        );
    }

    Ok(bytes
        .chunks_exact(SPLAT_RECORD_SIZE)
        .map(|chunk| bytemuck::pod_read_unaligned::<SplatRecord>(chunk).into())
        .collect())
}

/// Streams a `.splat` file in chunks, reporting percentage progress after each one
pub fn stream_splat_file(
    path: impl AsRef<Path>,
    progress: &mut dyn FnMut(f32),
) -> Result<Vec<Splat>> {
    let path = path.as_ref();
    let mut file =
        std::fs::File::open(path).context(format!("Failed to open splat file: {:?}", path))?;
    let total = file
        .metadata()
        .context(format!("Failed to stat splat file: {:?}", path))?
        .len() as usize;

    if total % SPLAT_RECORD_SIZE != 0 {
        bail!("{:?} is {} bytes, not a whole number of splat records", path, total);
    }

    let mut splats = Vec::with_capacity(total / SPLAT_RECORD_SIZE);
    let mut buffer = vec![0u8; CHUNK_RECORDS * SPLAT_RECORD_SIZE];
    let mut loaded = 0;

    while loaded < total {
        let len = buffer.len().min(total - loaded);
        file.read_exact(&mut buffer[..len])
            .context(format!("Failed to read splat file: {:?}", path))?;
        splats.extend(parse_splats(&buffer[..len])?);
        loaded += len;
        progress(loaded as f32 / total as f32 * 100.0);
    }

    if total == 0 {
        progress(100.0);
    }

    Ok(splats)
}
