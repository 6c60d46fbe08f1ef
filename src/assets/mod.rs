//! Asset classification, normalization and background loading.

pub mod catalog;
pub mod loader;
pub mod normalizer;
pub mod splat_viewer;

use std::path::{Path, PathBuf};

use crate::error::AssetError;

pub use catalog::{list_assets, ALLOWED_EXTENSIONS};
pub use loader::{AssetLoader, LoadEvent};
pub use normalizer::{AssetNormalizer, Geometry, LoadedAsset, NormalizedAsset, REFERENCE_SIZE};
pub use splat_viewer::{DecodedSplatViewer, SplatViewer, SplatViewerOptions};

/// The closed set of asset variants the normalizer knows how to handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetFormat {
    PointCloud,
    Mesh,
    Splat,
}

impl AssetFormat {
    /// Dispatch on the (case-insensitive) file extension
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "ply" => Some(AssetFormat::PointCloud),
            "glb" => Some(AssetFormat::Mesh),
            "splat" => Some(AssetFormat::Splat),
            _ => None,
        }
    }
}

/// Extensions that are recognised but cannot be rendered, with a conversion hint
fn unsupported_hint(extension: &str) -> Option<&'static str> {
    match extension {
        "spz" => Some(
            "convert .spz files to .splat (e.g. with a splat editor), or rename to .ply if the file \
             is a plain point cloud",
        ),
        _ => None,
    }
}

/// A file to load plus its declared format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub path: PathBuf,
    pub format: AssetFormat,
}

impl AssetRef {
    pub fn new(path: impl Into<PathBuf>, format: AssetFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// Classifies a path by extension
    pub fn classify(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match AssetFormat::from_extension(&extension) {
            Some(format) => Ok(Self::new(path, format)),
            None => Err(AssetError::UnsupportedFormat {
                path: path.to_path_buf(),
                hint: unsupported_hint(&extension),
                extension,
            }),
        }
    }

    /// Stable scene name: the file name
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_extensions() {
        assert_eq!(
            AssetRef::classify("/models/room.ply").unwrap().format,
            AssetFormat::PointCloud
        );
        assert_eq!(
            AssetRef::classify("/models/obj.GLB").unwrap().format,
            AssetFormat::Mesh
        );
        assert_eq!(
            AssetRef::classify("bonsai.splat").unwrap().format,
            AssetFormat::Splat
        );
    }

    #[test]
    fn test_classify_spz_is_unsupported_with_hint() {
        match AssetRef::classify("/models/garden.spz") {
            Err(AssetError::UnsupportedFormat {
                extension, hint, ..
            }) => {
                assert_eq!(extension, "spz");
                assert!(hint.is_some());
            }
            other => panic!("expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_without_extension() {
        assert!(matches!(
            AssetRef::classify("/models/README"),
            Err(AssetError::UnsupportedFormat { hint: None, .. })
        ));
    }

    #[test]
    fn test_name_is_file_name() {
        let asset = AssetRef::classify("/models/scans/room.ply").unwrap();
        assert_eq!(asset.name(), "room.ply");
    }
}
