//! The scene composer: owns the object registry, both cameras and the mode
//! machine, and runs one update→render→telemetry iteration per frame.

use std::path::Path;

use anyhow::{bail, Result};
use glam::Vec3;

use crate::assets::{AssetFormat, AssetLoader, AssetRef, LoadEvent, LoadedAsset, NormalizedAsset, SplatViewer};
use crate::camera::{CameraKind, CameraRig, OrbitCamera};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{AssetError, CaptureError, SensorKind};
use crate::mode::{CameraMode, CameraModeMachine};
use crate::scene::{Axis, ObjectRegistry, SceneObject};
use crate::sensors::{CaptureStream, DevicePlatform, MotionSample, OrientationSample, SensorFusion};
use crate::telemetry::{TelemetrySampler, TelemetrySnapshot};
use crate::traits::{ClearMode, DrawItem, FrameView, SceneRenderer};

/// The single splat viewer of the current asset set
struct SplatSlot {
    name: String,
    viewer: Box<dyn SplatViewer>,
}

pub struct Composer<P: DevicePlatform, R: SceneRenderer> {
    renderer: R,
    mode: CameraModeMachine<P>,
    fusion: SensorFusion,
    rig: CameraRig,
    registry: ObjectRegistry,
    loader: AssetLoader,
    splat: Option<SplatSlot>,
    splat_claimed: bool,
    diagnostics: Diagnostics,
    sampler: TelemetrySampler,
    snapshot: TelemetrySnapshot,
    frame: u64,
    running: bool,
}

impl<P: DevicePlatform, R: SceneRenderer> Composer<P, R> {
    pub fn new(platform: P, renderer: R) -> Self {
        let (width, height) = renderer.output_size();
        let rig = CameraRig::new(aspect_of(width, height));
        let registry = ObjectRegistry::new();
        let snapshot = TelemetrySnapshot::derive(0, &rig, &registry, (width, height));

        Self {
            renderer,
            mode: CameraModeMachine::new(platform),
            fusion: SensorFusion::new(),
            rig,
            registry,
            loader: AssetLoader::default(),
            splat: None,
            splat_claimed: false,
            diagnostics: Diagnostics::default(),
            sampler: TelemetrySampler::default(),
            snapshot,
            frame: 0,
            running: true,
        }
    }

    pub fn with_loader(mut self, loader: AssetLoader) -> Self {
        self.loader = loader;
        self
    }

    pub fn with_telemetry(mut self, sampler: TelemetrySampler) -> Self {
        self.sampler = sampler;
        self
    }

    /// Replaces the current asset set and starts loading `paths` in the
    /// background. Returns how many loads were started.
    pub fn load_asset_set<I>(&mut self, paths: I) -> usize
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        self.clear_scene();

        let mut started = 0;
        for path in paths {
            let asset = match AssetRef::classify(path) {
                Ok(asset) => asset,
                Err(e) => {
                    self.report_asset_error(&e);
                    continue;
                }
            };

            if asset.format == AssetFormat::Splat {
                if self.splat_claimed {
                    self.diagnostics.emit(
                        DiagnosticKind::UnsupportedFormat,
                        format!("{}: only one splat file is shown per scene, skipping", asset.name()),
                    );
                    continue;
                }
                self.splat_claimed = true;
            }

            log::info!("Loading {}", asset.path.display());
            self.loader.spawn(asset);
            started += 1;
        }
        started
    }

    /// Moves finished background loads into the scene
    pub fn poll_loads(&mut self) {
        let events = self.loader.poll();
        self.apply_load_events(events);
    }

    /// Blocks until every started load has finished and inserts the results
    pub fn wait_for_loads(&mut self) {
        let events = self.loader.wait_all();
        self.apply_load_events(events);
    }

    pub fn pending_loads(&self) -> usize {
        self.loader.pending()
    }

    /// Adds a normalized asset as a scene object targeting the origin
    pub fn insert_asset(&mut self, asset: NormalizedAsset) -> bool {
        let name = asset.name.clone();
        let vertices = asset.geometry.vertex_count();

        match self.registry.insert(SceneObject::from_asset(asset)) {
            Ok(()) => {
                self.diagnostics.emit(
                    DiagnosticKind::LoadComplete,
                    format!("{}: loaded ({} vertices)", name, vertices),
                );
                true
            }
            Err(e) => {
                self.diagnostics
                    .emit(DiagnosticKind::LoadFailure, format!("{}: {}", name, e));
                false
            }
        }
    }

    pub fn on_orientation(&mut self, sample: OrientationSample) {
        if self.mode.listening(SensorKind::Orientation) {
            self.fusion.on_orientation(sample);
        }
    }

    pub fn on_motion(&mut self, sample: MotionSample) {
        if self.mode.listening(SensorKind::Motion) {
            self.fusion.on_motion(sample);
        }
    }

    /// Enters AR. On failure the orbit camera keeps rendering and the error is
    /// reported on the diagnostics channel.
    pub async fn start_sensor_mode(&mut self) -> Result<(), CaptureError> {
        if self.mode.mode().is_sensor_active() {
            return Ok(());
        }

        match self.mode.start().await {
            Ok(session) => {
                if session.used_fallback_constraints {
                    self.diagnostics.emit(
                        DiagnosticKind::Device,
                        "Camera rejected the preferred settings, using basic settings",
                    );
                }
                if let Some(e) = session.motion_error {
                    self.diagnostics.emit(e.kind(), e.user_message());
                }
                self.fusion.begin_session();
                self.rig.select(CameraKind::Sensor);
                Ok(())
            }
            Err(e) => {
                self.fusion.end_session();
                self.rig.select(CameraKind::Orbit);
                self.diagnostics.emit(e.kind(), e.user_message());
                Err(e)
            }
        }
    }

    /// Back to the orbit camera; safe to call in any state
    pub fn stop_sensor_mode(&mut self) {
        self.mode.stop();
        self.fusion.end_session();
        self.rig.select(CameraKind::Orbit);
    }

    pub async fn toggle_sensor_mode(&mut self) -> Result<(), CaptureError> {
        if self.mode.mode().is_sensor_active() {
            self.stop_sensor_mode();
            Ok(())
        } else {
            self.start_sensor_mode().await
        }
    }

    /// Window resize: orbit aspect and renderer output only
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.renderer.resize(width, height);
        self.rig.orbit.set_aspect(aspect_of(width, height));
    }

    pub fn set_target(&mut self, name: &str, axis: Axis, value: f32) -> Result<()> {
        self.registry.set_target(name, axis, value).inspect_err(|e| {
            log::warn!("{}", e);
        })
    }

    pub fn set_target_position(&mut self, name: &str, position: Vec3) -> Result<()> {
        self.registry
            .set_target_position(name, position)
            .inspect_err(|e| log::warn!("{}", e))
    }

    /// One loop iteration: fusion, camera update, render, telemetry
    pub fn frame(&mut self, delta: f32) -> Result<&TelemetrySnapshot> {
        if !self.running {
            bail!("composer has been shut down");
        }

        self.poll_loads();

        self.fusion.step(self.registry.iter_mut());

        let sensor_active = self.mode.mode().is_sensor_active();
        if sensor_active {
            self.update_sensor_camera();
        } else {
            self.rig.orbit.update();
        }
        self.rig.select(if sensor_active {
            CameraKind::Sensor
        } else {
            CameraKind::Orbit
        });

        let active = self.rig.active();
        let view = FrameView {
            view_projection: active.as_view().view_projection(),
            objects: self
                .registry
                .iter()
                .map(|object| DrawItem {
                    name: &object.name,
                    geometry: &object.geometry,
                    model: object.transform.matrix(),
                })
                .collect(),
            clear: match active.kind() {
                CameraKind::Orbit => ClearMode::Opaque,
                CameraKind::Sensor => ClearMode::Transparent,
            },
        };

        if let Err(e) = self.renderer.render(&view) {
            log::error!("Render failed: {:#}", e);
        }

        self.snapshot = TelemetrySnapshot::derive(
            self.frame,
            &self.rig,
            &self.registry,
            self.renderer.output_size(),
        );
        self.sampler.observe(delta, &self.snapshot);
        self.frame += 1;

        Ok(&self.snapshot)
    }

    fn update_sensor_camera(&mut self) {
        let Some((width, height)) = self.mode.stream().and_then(|s| s.dimensions()) else {
            return;
        };

        if self.rig.sensor.set_stream_aspect(width, height) {
            log::info!(
                "Sensor camera aspect set to {:.3} from {}x{} feed",
                self.rig.sensor.lens.aspect,
                width,
                height
            );
        }

        if let Some(sample) = self.fusion.latest_orientation() {
            self.rig.sensor.apply_orientation(sample);
        }
    }

    /// Stops everything and releases every resource. Idempotent.
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;

        self.stop_sensor_mode();
        self.clear_scene();
        self.renderer.release();
        log::info!("Composer shut down after {} frames", self.frame);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn orbit_mut(&mut self) -> &mut OrbitCamera {
        &mut self.rig.orbit
    }

    pub fn mode(&self) -> &CameraMode {
        self.mode.mode()
    }

    pub fn fusion(&self) -> &SensorFusion {
        &self.fusion
    }

    pub fn platform(&self) -> &P {
        self.mode.platform()
    }

    pub fn platform_mut(&mut self) -> &mut P {
        self.mode.platform_mut()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn snapshot(&self) -> &TelemetrySnapshot {
        &self.snapshot
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// Name of the loaded splat asset, if any
    pub fn splat_name(&self) -> Option<&str> {
        self.splat.as_ref().map(|slot| slot.name.as_str())
    }

    fn apply_load_events(&mut self, events: Vec<LoadEvent>) {
        for event in events {
            match event {
                LoadEvent::Progress { name, percent } => self.diagnostics.emit(
                    DiagnosticKind::LoadProgress,
                    format!("{}: {:.0}%", name, percent),
                ),
                LoadEvent::Loaded(LoadedAsset::Object(asset)) => {
                    self.insert_asset(asset);
                }
                LoadEvent::Loaded(LoadedAsset::Splat { name, mut viewer }) => {
                    if self.splat.is_some() {
                        viewer.dispose();
                        continue;
                    }
                    self.diagnostics
                        .emit(DiagnosticKind::LoadComplete, format!("{}: splat loaded", name));
                    self.splat = Some(SplatSlot { name, viewer });
                }
                LoadEvent::Failed(e) => self.report_asset_error(&e),
            }
        }
    }

    fn report_asset_error(&mut self, error: &AssetError) {
        let message = match error {
            AssetError::UnsupportedFormat {
                hint: Some(hint), ..
            } => format!("{} ({})", error, hint),
            _ => error.to_string(),
        };
        self.diagnostics.emit(error.kind(), message);
    }

    /// Asset-set teardown: in-flight loads, objects and the splat viewer
    fn clear_scene(&mut self) {
        self.loader.cancel_all();
        self.registry.clear();
        if let Some(mut slot) = self.splat.take() {
            slot.viewer.dispose();
        }
        self.splat_claimed = false;
    }
}

impl<P: DevicePlatform, R: SceneRenderer> Drop for Composer<P, R> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn aspect_of(width: u32, height: u32) -> f32 {
    if height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Geometry;
    use crate::math::AABB;
    use crate::renderer::HeadlessRenderer;
    use crate::sensors::{SimulatedConfig, SimulatedPlatform};

    fn composer() -> Composer<SimulatedPlatform, HeadlessRenderer> {
        Composer::new(
            SimulatedPlatform::new(SimulatedConfig::default()),
            HeadlessRenderer::new(800, 600),
        )
        .with_telemetry(TelemetrySampler::new(false, false))
    }

    fn asset(name: &str) -> NormalizedAsset {
        NormalizedAsset {
            name: name.to_string(),
            geometry: Geometry::Points {
                positions: vec![Vec3::ZERO, Vec3::ONE],
                colors: vec![[1.0; 3]; 2],
            },
            scale: 1.0,
            source_bounds: AABB::new(Vec3::ZERO, Vec3::ONE),
        }
    }

    #[test]
    fn test_orbit_frame_clears_opaque() {
        let mut composer = composer();
        composer.insert_asset(asset("a.ply"));
        composer.frame(0.016).unwrap();

        assert_eq!(composer.renderer().last_clear(), Some(ClearMode::Opaque));
        assert_eq!(composer.renderer().last_object_count(), 1);
        assert_eq!(composer.snapshot().objects.len(), 1);
    }

    #[test]
    fn test_sensor_frame_clears_transparent() {
        let mut composer = composer();
        pollster::block_on(composer.start_sensor_mode()).unwrap();
        composer.frame(0.016).unwrap();

        assert_eq!(composer.renderer().last_clear(), Some(ClearMode::Transparent));
        assert_eq!(composer.rig().active_kind(), CameraKind::Sensor);
        assert!((composer.rig().sensor.lens.aspect - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_samples_ignored_without_listener() {
        let mut composer = composer();
        composer.on_orientation(OrientationSample::new(10.0, 0.0, 0.0));
        assert!(composer.fusion().latest_orientation().is_none());
    }

    #[test]
    fn test_duplicate_insert_is_load_failure() {
        let mut composer = composer();
        assert!(composer.insert_asset(asset("a.ply")));
        assert!(!composer.insert_asset(asset("a.ply")));
        assert_eq!(composer.diagnostics().count(DiagnosticKind::LoadFailure), 1);
        assert_eq!(composer.registry().len(), 1);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let mut composer = composer();
        pollster::block_on(composer.start_sensor_mode()).unwrap();
        composer.shutdown();
        composer.shutdown();

        assert!(!composer.is_running());
        assert!(composer.renderer().is_released());
        assert_eq!(composer.platform().live_tracks(), 0);
        assert!(composer.frame(0.016).is_err());
    }
}
