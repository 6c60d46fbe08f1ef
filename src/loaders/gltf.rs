use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use std::path::Path;

/// Triangle mesh flattened out of a glTF scene graph, in scene space
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub colors: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

/// Loads a glTF/GLB file and flattens every mesh primitive into one triangle list
pub fn load_gltf_mesh(path: impl AsRef<Path>) -> Result<MeshData> {
    let path = path.as_ref();
    log::debug!("Loading glTF file: {:?}", path);

    let (document, buffers, _images) =
        gltf::import(path).context(format!("Failed to load glTF file: {:?}", path))?;

    collect_mesh(&document, &buffers)
}

/// Same as [`load_gltf_mesh`] for a document already in memory
pub fn parse_gltf_mesh(bytes: &[u8]) -> Result<MeshData> {
    let (document, buffers, _images) =
        gltf::import_slice(bytes).context("Failed to parse glTF data")?;

    collect_mesh(&document, &buffers)
}

fn collect_mesh(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Result<MeshData> {
    log::debug!(
        "glTF: {} scenes, {} nodes, {} meshes",
        document.scenes().count(),
        document.nodes().count(),
        document.meshes().count()
    );

    let mut mesh = MeshData::default();

    for scene in document.scenes() {
        for node in scene.nodes() {
            process_node(&node, buffers, &Mat4::IDENTITY, &mut mesh)?;
        }
    }

    Ok(mesh)
}

/// Recursively processes glTF nodes
fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: &Mat4,
    mesh: &mut MeshData,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    if let Some(node_mesh) = node.mesh() {
        process_mesh(&node_mesh, buffers, &global_transform, mesh)?;
    }

    for child in node.children() {
        process_node(&child, buffers, &global_transform, mesh)?;
    }

    Ok(())
}

fn process_mesh(
    node_mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: &Mat4,
    mesh: &mut MeshData,
) -> Result<()> {
    for primitive in node_mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::debug!("Skipping non-triangle primitive in mesh {:?}", node_mesh.name());
            continue;
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions = reader
            .read_positions()
            .context("Mesh primitive has no positions")?;

        let base = mesh.positions.len() as u32;
        let start = mesh.positions.len();
        mesh.positions
            .extend(positions.map(|p| transform.transform_point3(Vec3::from_array(p))));
        let added = mesh.positions.len() - start;

        let factor = primitive
            .material()
            .pbr_metallic_roughness()
            .base_color_factor();
        let base_color = [factor[0], factor[1], factor[2]];

        match reader.read_colors(0) {
            Some(colors) => mesh.colors.extend(colors.into_rgb_f32().map(|c| {
                [c[0] * base_color[0], c[1] * base_color[1], c[2] * base_color[2]]
            })),
            None => mesh
                .colors
                .extend(std::iter::repeat(base_color).take(added)),
        }
        // Color accessors may be shorter than positions in malformed files
        mesh.colors.resize(mesh.positions.len(), base_color);

        match reader.read_indices() {
            Some(indices) => mesh
                .indices
                .extend(indices.into_u32().map(|i| base + i)),
            None => mesh.indices.extend(base..base + added as u32),
        }
    }

    Ok(())
}
