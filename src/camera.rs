use std::f32::consts::PI;

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::Serialize;

use crate::sensors::OrientationSample;
use crate::traits::ViewCamera;

/// Fraction of the pending orbit motion applied per update
pub const ORBIT_DAMPING: f32 = 0.05;

/// Per-notch dolly factor for the mouse wheel
const DOLLY_SCALE: f32 = 0.95;

const MIN_RADIUS: f32 = 0.01;

/// Keeps the polar angle off the poles so the up vector stays usable
const POLAR_EPSILON: f32 = 1e-6;

/// Landscape correction applied to device pitch
const SENSOR_PITCH_OFFSET_DEGREES: f32 = 90.0;

/// Perspective projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lens {
    pub fov_y_degrees: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Lens {
    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far)
    }
}

/// User-driven orbit camera around a target, +Z up, with damped controls
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitCamera {
    pub lens: Lens,
    pub target: Vec3,
    radius: f32,
    /// Azimuth around +Z
    theta: f32,
    /// Angle from +Z
    phi: f32,
    pending_theta: f32,
    pending_phi: f32,
    damping: f32,
}

impl OrbitCamera {
    pub fn new(aspect: f32) -> Self {
        let mut camera = Self {
            lens: Lens {
                fov_y_degrees: 75.0,
                aspect,
                near: 0.1,
                far: 1000.0,
            },
            target: Vec3::ZERO,
            radius: 1.0,
            theta: 0.0,
            phi: PI / 2.0,
            pending_theta: 0.0,
            pending_phi: 0.0,
            damping: ORBIT_DAMPING,
        };
        camera.set_position(Vec3::new(0.0, -8.0, 0.0));
        camera
    }

    /// Places the eye, keeping the current target
    pub fn set_position(&mut self, position: Vec3) {
        let offset = position - self.target;
        self.radius = offset.length().max(MIN_RADIUS);
        self.theta = offset.y.atan2(offset.x);
        self.phi = (offset.z / self.radius).clamp(-1.0, 1.0).acos();
        self.phi = self.phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.lens.aspect = aspect;
    }

    /// Queues a drag of `dx`,`dy` pixels; a full viewport height is one turn
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        self.pending_theta -= 2.0 * PI * dx / viewport_height;
        self.pending_phi -= 2.0 * PI * dy / viewport_height;
    }

    /// Positive steps move toward the target
    pub fn dolly(&mut self, steps: f32) {
        self.radius = (self.radius * DOLLY_SCALE.powf(steps)).max(MIN_RADIUS);
    }

    /// Advances the damped integrator by one frame
    pub fn update(&mut self) {
        self.theta += self.pending_theta * self.damping;
        self.phi = (self.phi + self.pending_phi * self.damping)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

        self.pending_theta *= 1.0 - self.damping;
        self.pending_phi *= 1.0 - self.damping;
    }

    pub fn is_settled(&self) -> bool {
        self.pending_theta.abs() < 1e-5 && self.pending_phi.abs() < 1e-5
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Euler XYZ rotation of the camera body, radians
    pub fn rotation(&self) -> Vec3 {
        let world = self.view_matrix().inverse();
        let (x, y, z) = Quat::from_mat4(&world).to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }
}

impl ViewCamera for OrbitCamera {
    fn lens(&self) -> &Lens {
        &self.lens
    }

    fn position(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        self.target
            + self.radius
                * Vec3::new(
                    sin_phi * self.theta.cos(),
                    sin_phi * self.theta.sin(),
                    self.phi.cos(),
                )
    }

    fn forward(&self) -> Vec3 {
        (self.target - self.position()).normalize_or_zero()
    }

    fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Z)
    }
}

/// Origin-fixed camera turned by device orientation. Its aspect follows the
/// capture feed only.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorCamera {
    pub lens: Lens,
    /// Euler YXZ, radians
    rotation: Vec3,
}

impl SensorCamera {
    pub fn new() -> Self {
        Self {
            lens: Lens {
                fov_y_degrees: 53.0,
                aspect: 4.0 / 3.0,
                near: 0.01,
                far: 100.0,
            },
            rotation: Vec3::ZERO,
        }
    }

    /// yaw → Y, pitch − 90° → X, roll → Z
    pub fn apply_orientation(&mut self, sample: OrientationSample) {
        self.rotation = Vec3::new(
            (sample.pitch - SENSOR_PITCH_OFFSET_DEGREES).to_radians(),
            sample.yaw.to_radians(),
            sample.roll.to_radians(),
        );
    }

    /// Updates the aspect from the feed size, returning whether it changed
    pub fn set_stream_aspect(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        let aspect = width as f32 / height as f32;
        if aspect == self.lens.aspect {
            return false;
        }
        self.lens.aspect = aspect;
        true
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.rotation.y, self.rotation.x, self.rotation.z)
    }
}

impl Default for SensorCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewCamera for SensorCamera {
    fn lens(&self) -> &Lens {
        &self.lens
    }

    fn position(&self) -> Vec3 {
        Vec3::ZERO
    }

    fn forward(&self) -> Vec3 {
        self.orientation() * Vec3::NEG_Z
    }

    fn view_matrix(&self) -> Mat4 {
        Mat4::from_quat(self.orientation()).inverse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraKind {
    Orbit,
    Sensor,
}

/// The camera chosen for this frame
#[derive(Debug, Clone, Copy)]
pub enum ActiveCamera<'a> {
    Orbit(&'a OrbitCamera),
    Sensor(&'a SensorCamera),
}

impl ActiveCamera<'_> {
    pub fn kind(&self) -> CameraKind {
        match self {
            ActiveCamera::Orbit(_) => CameraKind::Orbit,
            ActiveCamera::Sensor(_) => CameraKind::Sensor,
        }
    }

    pub fn as_view(&self) -> &dyn ViewCamera {
        match *self {
            ActiveCamera::Orbit(camera) => camera,
            ActiveCamera::Sensor(camera) => camera,
        }
    }
}

/// Both cameras, persistent across mode switches; exactly one is active
#[derive(Debug, Clone)]
pub struct CameraRig {
    pub orbit: OrbitCamera,
    pub sensor: SensorCamera,
    active: CameraKind,
}

impl CameraRig {
    pub fn new(viewport_aspect: f32) -> Self {
        Self {
            orbit: OrbitCamera::new(viewport_aspect),
            sensor: SensorCamera::new(),
            active: CameraKind::Orbit,
        }
    }

    pub fn select(&mut self, kind: CameraKind) {
        self.active = kind;
    }

    pub fn active_kind(&self) -> CameraKind {
        self.active
    }

    pub fn active(&self) -> ActiveCamera<'_> {
        match self.active {
            CameraKind::Orbit => ActiveCamera::Orbit(&self.orbit),
            CameraKind::Sensor => ActiveCamera::Sensor(&self.sensor),
        }
    }
}
