#![allow(dead_code)]

use std::path::{Path, PathBuf};

use fake_ar::composer::Composer;
use fake_ar::loaders::SplatRecord;
use fake_ar::renderer::HeadlessRenderer;
use fake_ar::sensors::{SimulatedConfig, SimulatedPlatform};
use fake_ar::telemetry::TelemetrySampler;
use tempfile::TempDir;

pub type TestComposer = Composer<SimulatedPlatform, HeadlessRenderer>;

pub fn composer(config: SimulatedConfig) -> TestComposer {
    Composer::new(SimulatedPlatform::new(config), HeadlessRenderer::new(800, 600))
        .with_telemetry(TelemetrySampler::new(false, false))
}

/// Per-test scratch directory of asset files
pub struct Fixtures {
    dir: TempDir,
}

impl Fixtures {
    pub fn new(label: &str) -> Self {
        let dir = tempfile::Builder::new()
            .prefix(&format!("fake-ar-{}-", label))
            .tempdir()
            .unwrap();
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn write(&self, name: &str, bytes: &[u8]) -> PathBuf {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, bytes).unwrap();
        path
    }

    /// ASCII point cloud with the given vertices
    pub fn ply(&self, name: &str, points: &[[f32; 3]]) -> PathBuf {
        let mut text = format!(
            "ply\nformat ascii 1.0\nelement vertex {}\nproperty float x\nproperty float y\nproperty float z\nend_header\n",
            points.len()
        );
        for p in points {
            text.push_str(&format!("{} {} {}\n", p[0], p[1], p[2]));
        }
        self.write(name, text.as_bytes())
    }

    /// Binary glTF holding one indexed triangle
    pub fn glb(&self, name: &str, triangle: [[f32; 3]; 3]) -> PathBuf {
        self.write(name, &glb_triangle(triangle))
    }

    pub fn splat(&self, name: &str, count: usize) -> PathBuf {
        let records: Vec<SplatRecord> = (0..count)
            .map(|i| SplatRecord {
                position: [i as f32, 0.0, 0.0],
                scale: [0.1; 3],
                color: [200, 100, 50, 255],
                rotation: [255, 128, 128, 128],
            })
            .collect();
        self.write(name, bytemuck::cast_slice(&records[..]))
    }
}

pub fn glb_triangle(triangle: [[f32; 3]; 3]) -> Vec<u8> {
    let mut bin: Vec<u8> = Vec::new();
    for p in &triangle {
        bin.extend_from_slice(bytemuck::cast_slice(&p[..]));
    }
    for i in 0u32..3 {
        bin.extend_from_slice(&i.to_le_bytes());
    }

    let min: Vec<f32> = (0..3)
        .map(|axis| triangle.iter().map(|p| p[axis]).fold(f32::INFINITY, f32::min))
        .collect();
    let max: Vec<f32> = (0..3)
        .map(|axis| triangle.iter().map(|p| p[axis]).fold(f32::NEG_INFINITY, f32::max))
        .collect();

    let json = serde_json::json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0 }],
        "meshes": [{
            "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }]
        }],
        "buffers": [{ "byteLength": bin.len() }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 12, "target": 34963 }
        ],
        "accessors": [
            {
                "bufferView": 0,
                "componentType": 5126,
                "count": 3,
                "type": "VEC3",
                "min": min,
                "max": max
            },
            { "bufferView": 1, "componentType": 5125, "count": 3, "type": "SCALAR" }
        ]
    });

    let mut json = serde_json::to_vec(&json).unwrap();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    while bin.len() % 4 != 0 {
        bin.push(0);
    }

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());
    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json);
    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(&bin);
    glb
}
