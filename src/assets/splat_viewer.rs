use anyhow::{bail, Result};
use glam::Vec3;
use std::path::Path;

use crate::loaders::splat::{stream_splat_file, Splat};

/// Construction parameters for a self-contained splat viewer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplatViewerOptions {
    pub camera_up: Vec3,
    pub initial_camera_position: Vec3,
    pub initial_camera_look_at: Vec3,
}

impl Default for SplatViewerOptions {
    fn default() -> Self {
        Self {
            camera_up: Vec3::Z,
            initial_camera_position: Vec3::new(0.0, 0.0, 5.0),
            initial_camera_look_at: Vec3::ZERO,
        }
    }
}

/// Boundary to a splat renderer that owns its own scene and camera.
///
/// The engine only constructs, initialises, streams a file into, and finally
/// disposes the viewer. Its camera does not follow the camera-mode machine.
pub trait SplatViewer: Send {
    fn init(&mut self) -> Result<()>;

    /// Load a file; `progress` receives percentages in [0, 100]
    fn load_file(&mut self, path: &Path, progressive: bool, progress: &mut dyn FnMut(f32))
        -> Result<()>;

    fn dispose(&mut self);

    fn is_disposed(&self) -> bool;
}

/// CPU-side viewer: decodes the splat file and keeps its own fixed camera
#[derive(Debug)]
pub struct DecodedSplatViewer {
    options: SplatViewerOptions,
    splats: Vec<Splat>,
    initialized: bool,
    disposed: bool,
}

impl DecodedSplatViewer {
    pub fn new(options: SplatViewerOptions) -> Self {
        Self {
            options,
            splats: Vec::new(),
            initialized: false,
            disposed: false,
        }
    }

    pub fn boxed(options: SplatViewerOptions) -> Box<dyn SplatViewer> {
        Box::new(Self::new(options))
    }

    pub fn options(&self) -> &SplatViewerOptions {
        &self.options
    }

    pub fn splats(&self) -> &[Splat] {
        &self.splats
    }
}

impl SplatViewer for DecodedSplatViewer {
    fn init(&mut self) -> Result<()> {
        if self.disposed {
            bail!("splat viewer already disposed");
        }
        self.initialized = true;
        Ok(())
    }

    fn load_file(
        &mut self,
        path: &Path,
        progressive: bool,
        progress: &mut dyn FnMut(f32),
    ) -> Result<()> {
        if !self.initialized {
            bail!("splat viewer used before init");
        }

        self.splats = if progressive {
            stream_splat_file(path, progress)?
        } else {
            let splats = stream_splat_file(path, &mut |_| {})?;
            progress(100.0);
            splats
        };

        log::info!("Splat viewer holds {} gaussians from {:?}", self.splats.len(), path);
        Ok(())
    }

    fn dispose(&mut self) {
        self.splats = Vec::new();
        self.initialized = false;
        self.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_z_up() {
        let options = SplatViewerOptions::default();
        assert_eq!(options.camera_up, Vec3::Z);
        assert_eq!(options.initial_camera_position, Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_load_before_init_fails() {
        let mut viewer = DecodedSplatViewer::new(SplatViewerOptions::default());
        let result = viewer.load_file(Path::new("missing.splat"), true, &mut |_| {});
        assert!(result.is_err());
    }

    #[test]
    fn test_dispose_is_terminal() {
        let mut viewer = DecodedSplatViewer::new(SplatViewerOptions::default());
        viewer.init().unwrap();
        viewer.dispose();
        assert!(viewer.is_disposed());
        assert!(viewer.init().is_err());
    }
}
