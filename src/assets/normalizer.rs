//! Brings every asset variant into one world convention: geometry centered
//! on the local origin and a uniform scale that maps the largest bounding-box
//! dimension to [`REFERENCE_SIZE`] world units.

use glam::Vec3;
use std::path::Path;

use super::splat_viewer::{SplatViewer, SplatViewerOptions};
use super::{AssetFormat, AssetRef};
use crate::error::AssetError;
use crate::loaders::{load_gltf_mesh, load_ply_file};
use crate::math::AABB;

/// Largest bounding-box dimension after normalization, in world units
pub const REFERENCE_SIZE: f32 = 2.0;

/// Below this extent a bounding box is treated as degenerate and left unscaled
const MIN_EXTENT: f32 = 1e-6;

const DEFAULT_POINT_COLOR: [f32; 3] = [0.85, 0.85, 0.85];

/// Centered vertex data
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Points {
        positions: Vec<Vec3>,
        colors: Vec<[f32; 3]>,
    },
    Mesh {
        positions: Vec<Vec3>,
        colors: Vec<[f32; 3]>,
        indices: Vec<u32>,
    },
}

impl Geometry {
    pub fn positions(&self) -> &[Vec3] {
        match self {
            Geometry::Points { positions, .. } | Geometry::Mesh { positions, .. } => positions,
        }
    }

    pub fn colors(&self) -> &[[f32; 3]] {
        match self {
            Geometry::Points { colors, .. } | Geometry::Mesh { colors, .. } => colors,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions().len()
    }
}

/// A point cloud or mesh ready to become a scene object
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedAsset {
    pub name: String,
    pub geometry: Geometry,
    /// Uniform scale for the object transform
    pub scale: f32,
    /// Bounds of the source geometry before centering
    pub source_bounds: AABB,
}

/// Result of loading one asset reference
pub enum LoadedAsset {
    Object(NormalizedAsset),
    Splat {
        name: String,
        viewer: Box<dyn SplatViewer>,
    },
}

impl LoadedAsset {
    pub fn name(&self) -> &str {
        match self {
            LoadedAsset::Object(asset) => &asset.name,
            LoadedAsset::Splat { name, .. } => name,
        }
    }
}

impl std::fmt::Debug for LoadedAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadedAsset::Object(asset) => f.debug_tuple("Object").field(&asset.name).finish(),
            LoadedAsset::Splat { name, .. } => f.debug_tuple("Splat").field(name).finish(),
        }
    }
}

pub type SplatViewerFactory = fn(SplatViewerOptions) -> Box<dyn SplatViewer>;

/// Loads an [`AssetRef`] into a [`LoadedAsset`], one function per variant
#[derive(Debug, Clone, Copy)]
pub struct AssetNormalizer {
    splat_factory: SplatViewerFactory,
    splat_options: SplatViewerOptions,
}

impl AssetNormalizer {
    pub fn new(splat_factory: SplatViewerFactory) -> Self {
        Self {
            splat_factory,
            splat_options: SplatViewerOptions::default(),
        }
    }

    pub fn load(
        &self,
        asset: &AssetRef,
        progress: &mut dyn FnMut(f32),
    ) -> Result<LoadedAsset, AssetError> {
        match asset.format {
            AssetFormat::PointCloud => self.load_point_cloud(asset).map(LoadedAsset::Object),
            AssetFormat::Mesh => self.load_mesh(asset).map(LoadedAsset::Object),
            AssetFormat::Splat => self.load_splat(asset, progress),
        }
    }

    fn load_point_cloud(&self, asset: &AssetRef) -> Result<NormalizedAsset, AssetError> {
        let cloud =
            load_ply_file(&asset.path).map_err(|e| AssetError::load_failure(&asset.path, format!("{:#}", e)))?;

        let colors = cloud
            .colors
            .unwrap_or_else(|| vec![DEFAULT_POINT_COLOR; cloud.positions.len()]);

        normalize(&asset.path, asset.name(), cloud.positions, |positions| {
            Geometry::Points { positions, colors }
        })
    }

    fn load_mesh(&self, asset: &AssetRef) -> Result<NormalizedAsset, AssetError> {
        let mesh = load_gltf_mesh(&asset.path)
            .map_err(|e| AssetError::load_failure(&asset.path, format!("{:#}", e)))?;

        let colors = mesh.colors;
        let indices = mesh.indices;
        normalize(&asset.path, asset.name(), mesh.positions, |positions| {
            Geometry::Mesh {
                positions,
                colors,
                indices,
            }
        })
    }

    fn load_splat(
        &self,
        asset: &AssetRef,
        progress: &mut dyn FnMut(f32),
    ) -> Result<LoadedAsset, AssetError> {
        let mut viewer = (self.splat_factory)(self.splat_options);

        let loaded = viewer
            .init()
            .and_then(|_| viewer.load_file(&asset.path, true, progress));

        match loaded {
            Ok(()) => Ok(LoadedAsset::Splat {
                name: asset.name(),
                viewer,
            }),
            Err(e) => {
                viewer.dispose();
                Err(AssetError::load_failure(&asset.path, format!("{:#}", e)))
            }
        }
    }
}

impl Default for AssetNormalizer {
    fn default() -> Self {
        Self::new(super::splat_viewer::DecodedSplatViewer::boxed)
    }
}

/// Centers `positions` on the origin and computes the uniform reference scale
pub fn center_and_scale(positions: &mut [Vec3]) -> Option<(AABB, f32)> {
    let bounds = AABB::from_points(positions.iter().copied())?;
    let center = bounds.center();

    for p in positions.iter_mut() {
        *p -= center;
    }

    let max_dimension = bounds.max_dimension();
    let scale = if max_dimension > MIN_EXTENT {
        REFERENCE_SIZE / max_dimension
    } else {
        1.0
    };

    Some((bounds, scale))
}

fn normalize(
    path: &Path,
    name: String,
    mut positions: Vec<Vec3>,
    build: impl FnOnce(Vec<Vec3>) -> Geometry,
) -> Result<NormalizedAsset, AssetError> {
    let (source_bounds, scale) = center_and_scale(&mut positions)
        .ok_or_else(|| AssetError::load_failure(path, "asset contains no vertices"))?;

    log::debug!(
        "{}: bounds {:?}..{:?}, scale {:.4}",
        name,
        source_bounds.min,
        source_bounds.max,
        scale
    );

    Ok(NormalizedAsset {
        name,
        geometry: build(positions),
        scale,
        source_bounds,
    })
}
