//! Per-frame diagnostics derived from camera and object state.
//!
//! Snapshots are read-only views; nothing here feeds back into the
//! simulation.

use glam::Vec3;
use serde::Serialize;

use crate::camera::{CameraKind, CameraRig};
use crate::core::timer::Throttled;
use crate::math::round_to;
use crate::scene::ObjectRegistry;
use crate::traits::ViewCamera;

/// Seconds between telemetry log lines
pub const LOG_INTERVAL: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    fn rounded(v: Vec3, decimals: u32) -> Self {
        Self {
            x: round_to(v.x, decimals),
            y: round_to(v.y, decimals),
            z: round_to(v.z, decimals),
        }
    }

    fn degrees(radians: Vec3) -> Self {
        Self::rounded(
            Vec3::new(
                radians.x.to_degrees(),
                radians.y.to_degrees(),
                radians.z.to_degrees(),
            ),
            1,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewportInfo {
    pub width: u32,
    pub height: u32,
    pub aspect: f32,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub frustum_width: f32,
    pub frustum_height: f32,
    pub distance_to_origin: f32,
    pub visible_area: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectInfo {
    pub name: String,
    pub position: Point3,
    pub rotation: Point3,
}

/// Immutable record of one frame. Camera fields describe the orbit camera,
/// whichever camera rendered the frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub frame: u64,
    pub active_camera: CameraKind,
    pub camera: Point3,
    pub camera_rotation: Point3,
    pub look_at: Point3,
    pub viewport: ViewportInfo,
    pub objects: Vec<ObjectInfo>,
}

impl TelemetrySnapshot {
    pub fn derive(
        frame: u64,
        rig: &CameraRig,
        objects: &ObjectRegistry,
        output_size: (u32, u32),
    ) -> Self {
        let camera = &rig.orbit;
        let lens = camera.lens;

        let distance = round_to(camera.position().length(), 2);
        let (frustum_width, frustum_height) = frustum_at(lens.fov_y_degrees, distance, lens.aspect);

        Self {
            frame,
            active_camera: rig.active_kind(),
            camera: Point3::rounded(camera.position(), 2),
            camera_rotation: Point3::degrees(camera.rotation()),
            look_at: Point3::rounded(camera.look_at_point(), 2),
            viewport: ViewportInfo {
                width: output_size.0,
                height: output_size.1,
                aspect: round_to(lens.aspect, 3),
                fov: lens.fov_y_degrees,
                near: lens.near,
                far: lens.far,
                frustum_width: round_to(frustum_width, 2),
                frustum_height: round_to(frustum_height, 2),
                distance_to_origin: distance,
                visible_area: round_to(frustum_width * frustum_height, 2),
            },
            objects: objects
                .iter()
                .map(|object| ObjectInfo {
                    name: object.name.clone(),
                    position: Point3::rounded(object.transform.position, 2),
                    rotation: Point3::degrees(object.transform.rotation),
                })
                .collect(),
        }
    }
}

/// Frustum `(width, height)` at `distance` for a vertical FOV in degrees
pub fn frustum_at(fov_y_degrees: f32, distance: f32, aspect: f32) -> (f32, f32) {
    let height = 2.0 * (fov_y_degrees.to_radians() / 2.0).tan() * distance;
    (height * aspect, height)
}

/// Emits a throttled subset of the snapshots to the log
#[derive(Debug, Clone, Copy)]
pub struct TelemetrySampler {
    throttle: Throttled,
    enabled: bool,
    json: bool,
}

impl TelemetrySampler {
    pub fn new(enabled: bool, json: bool) -> Self {
        Self {
            throttle: Throttled::new(LOG_INTERVAL),
            enabled,
            json,
        }
    }

    /// Logs `snapshot` if the interval has elapsed, returning whether it did
    pub fn observe(&mut self, delta: f32, snapshot: &TelemetrySnapshot) -> bool {
        if !self.enabled || !self.throttle.try_tick(delta) {
            return false;
        }

        if self.json {
            match serde_json::to_string(snapshot) {
                Ok(json) => log::info!("{json}"),
                Err(e) => log::warn!("Telemetry serialization failed: {}", e),
            }
            return true;
        }

        let v = &snapshot.viewport;
        log::info!(
            "frame {} [{:?}] camera ({}, {}, {}) look-at ({}, {}, {})",
            snapshot.frame,
            snapshot.active_camera,
            snapshot.camera.x,
            snapshot.camera.y,
            snapshot.camera.z,
            snapshot.look_at.x,
            snapshot.look_at.y,
            snapshot.look_at.z,
        );
        log::info!(
            "viewport {}x{} aspect {} fov {}° frustum {}x{} distance {} area {}",
            v.width,
            v.height,
            v.aspect,
            v.fov,
            v.frustum_width,
            v.frustum_height,
            v.distance_to_origin,
            v.visible_area,
        );
        for object in &snapshot.objects {
            log::info!(
                "  {} pos ({}, {}, {}) rot ({}°, {}°, {}°)",
                object.name,
                object.position.x,
                object.position.y,
                object.position.z,
                object.rotation.x,
                object.rotation.y,
                object.rotation.z,
            );
        }
        true
    }
}

impl Default for TelemetrySampler {
    fn default() -> Self {
        Self::new(true, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frustum_at() {
        let (width, height) = frustum_at(90.0, 1.0, 2.0);
        assert!((height - 2.0).abs() < 1e-5);
        assert!((width - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_default_orbit_snapshot() {
        let rig = CameraRig::new(4.0 / 3.0);
        let snapshot = TelemetrySnapshot::derive(7, &rig, &ObjectRegistry::new(), (800, 600));

        assert_eq!(snapshot.frame, 7);
        assert_eq!(snapshot.active_camera, CameraKind::Orbit);
        assert_eq!(snapshot.camera, Point3 { x: 0.0, y: -8.0, z: 0.0 });
        assert_eq!(snapshot.look_at, Point3 { x: 0.0, y: -7.0, z: 0.0 });
        assert_eq!(snapshot.viewport.distance_to_origin, 8.0);
        assert_eq!(snapshot.viewport.aspect, 1.333);
        assert!(snapshot.objects.is_empty());
    }

    #[test]
    fn test_sampler_throttles() {
        let rig = CameraRig::new(1.0);
        let snapshot = TelemetrySnapshot::derive(0, &rig, &ObjectRegistry::new(), (1, 1));
        let mut sampler = TelemetrySampler::default();

        assert!(sampler.observe(0.016, &snapshot));
        assert!(!sampler.observe(0.5, &snapshot));
        assert!(sampler.observe(0.5, &snapshot));
    }

    #[test]
    fn test_disabled_sampler_is_silent() {
        let rig = CameraRig::new(1.0);
        let snapshot = TelemetrySnapshot::derive(0, &rig, &ObjectRegistry::new(), (1, 1));
        let mut sampler = TelemetrySampler::new(false, false);
        assert!(!sampler.observe(10.0, &snapshot));
    }

    #[test]
    fn test_snapshot_serializes() {
        let rig = CameraRig::new(1.0);
        let snapshot = TelemetrySnapshot::derive(3, &rig, &ObjectRegistry::new(), (640, 480));
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"active_camera\":\"orbit\""));
        assert!(json.contains("\"visible_area\""));
    }
}
