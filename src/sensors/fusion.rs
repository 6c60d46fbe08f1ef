use glam::Vec3;

use crate::math::approach;
use crate::scene::SceneObject;

/// Fraction of the orientation delta applied, negated, to object rotation
pub const ROTATION_DAMPING: f32 = 0.5;

/// Metres of parallax shift per radian of roll/pitch delta
pub const PARALLAX_SENSITIVITY: f32 = 0.05;

/// Fraction of the remaining distance covered each frame
pub const SMOOTHING: f32 = 0.1;

/// Device orientation in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientationSample {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl OrientationSample {
    pub fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }
}

/// Acceleration including gravity, m/s²
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MotionSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Single-writer, single-reader latest-value cell
#[derive(Debug, Clone, Copy)]
pub struct Latest<T> {
    value: Option<T>,
}

impl<T: Copy> Latest<T> {
    pub fn set(&mut self, value: T) {
        self.value = Some(value);
    }

    pub fn get(&self) -> Option<T> {
        self.value
    }

    pub fn clear(&mut self) {
        self.value = None;
    }
}

impl<T> Default for Latest<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

/// Orientation relative to the session baseline, in radians
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientationDelta {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

/// Per-frame rigid adjustment shared by every scene object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidAdjustment {
    /// Euler XYZ, radians, assigned directly
    pub rotation: Vec3,
    /// Added to each object's target before smoothing
    pub offset: Vec3,
}

impl RigidAdjustment {
    pub fn from_delta(delta: OrientationDelta) -> Self {
        Self {
            rotation: Vec3::new(
                -delta.pitch * ROTATION_DAMPING,
                -delta.roll * ROTATION_DAMPING,
                -delta.yaw * ROTATION_DAMPING,
            ),
            offset: Vec3::new(
                delta.roll * PARALLAX_SENSITIVITY,
                delta.pitch * PARALLAX_SENSITIVITY,
                0.0,
            ),
        }
    }
}

/// Turns orientation and motion streams into object adjustments.
///
/// The baseline is latched from the first orientation sample seen after
/// [`SensorFusion::begin_session`] and dropped by
/// [`SensorFusion::end_session`]; it never survives into the next session.
#[derive(Debug, Default)]
pub struct SensorFusion {
    orientation: Latest<OrientationSample>,
    motion: Latest<MotionSample>,
    baseline: Option<OrientationSample>,
    session_active: bool,
}

impl SensorFusion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_session(&mut self) {
        self.session_active = true;
        self.baseline = None;
        self.orientation.clear();
        self.motion.clear();
    }

    pub fn end_session(&mut self) {
        self.session_active = false;
        self.baseline = None;
    }

    pub fn on_orientation(&mut self, sample: OrientationSample) {
        if self.session_active && self.baseline.is_none() {
            log::debug!("Orientation baseline latched at {:?}", sample);
            self.baseline = Some(sample);
        }
        self.orientation.set(sample);
    }

    /// Kept for display; parallax is derived from orientation, not acceleration
    pub fn on_motion(&mut self, sample: MotionSample) {
        self.motion.set(sample);
    }

    pub fn latest_orientation(&self) -> Option<OrientationSample> {
        self.orientation.get()
    }

    pub fn latest_motion(&self) -> Option<MotionSample> {
        self.motion.get()
    }

    pub fn baseline(&self) -> Option<OrientationSample> {
        self.baseline
    }

    /// True once a session is active and its baseline has been latched
    pub fn is_engaged(&self) -> bool {
        self.session_active && self.baseline.is_some()
    }

    pub fn delta(&self) -> Option<OrientationDelta> {
        if !self.session_active {
            return None;
        }
        let baseline = self.baseline?;
        let current = self.orientation.get()?;

        Some(OrientationDelta {
            yaw: (current.yaw - baseline.yaw).to_radians(),
            pitch: (current.pitch - baseline.pitch).to_radians(),
            roll: (current.roll - baseline.roll).to_radians(),
        })
    }

    pub fn adjustment(&self) -> Option<RigidAdjustment> {
        self.delta().map(RigidAdjustment::from_delta)
    }

    /// Runs one fusion/interpolation step over every object.
    ///
    /// Without an engaged session objects only glide toward their targets and
    /// keep whatever rotation they last had.
    pub fn step<'a>(&self, objects: impl IntoIterator<Item = &'a mut SceneObject>) {
        let adjustment = self.adjustment();
        for object in objects {
            apply(object, adjustment.as_ref());
        }
    }
}

/// Applies an adjustment (or the plain fallback) to one object
pub fn apply(object: &mut SceneObject, adjustment: Option<&RigidAdjustment>) {
    let goal = match adjustment {
        Some(adjustment) => {
            object.transform.rotation = adjustment.rotation;
            object.target_position + adjustment.offset
        }
        None => object.target_position,
    };
    object.transform.position = approach(object.transform.position, goal, SMOOTHING);
}
