//! Desktop stand-in for a phone: a fake rear camera with fault injection and a
//! keyboard-tilted orientation/motion source.

use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

use clap::ValueEnum;
use futures::future::{self, FutureExt, LocalBoxFuture};

use super::fusion::{MotionSample, OrientationSample};
use super::platform::{
    CaptureConstraints, CaptureStream, DevicePlatform, PermissionModel, PermissionState,
};
use crate::error::{CaptureError, MissingCapability, SensorKind};

const GRAVITY: f32 = 9.81;

/// Failure to inject into the simulated capture path
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SimulatedFault {
    NoCamera,
    LegacyApi,
    Denied,
    NotFound,
    Busy,
    /// The preferred constraints are rejected, the unconstrained retry works
    Overconstrained,
    /// Both the preferred and the unconstrained request are rejected
    OverconstrainedTwice,
}

#[derive(Debug, Clone)]
pub struct SimulatedConfig {
    pub origin: String,
    pub feed_size: (u32, u32),
    pub permission_model: PermissionModel,
    pub deny_orientation: bool,
    pub deny_motion: bool,
    pub fault: Option<SimulatedFault>,
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            origin: "file://localhost".to_string(),
            feed_size: (1280, 960),
            permission_model: PermissionModel::Implicit,
            deny_orientation: false,
            deny_motion: false,
            fault: None,
        }
    }
}

pub struct SimulatedStream {
    feed_size: Rc<Cell<(u32, u32)>>,
    live_tracks: Rc<Cell<usize>>,
    live: bool,
}

impl CaptureStream for SimulatedStream {
    fn dimensions(&self) -> Option<(u32, u32)> {
        match self.feed_size.get() {
            (0, _) | (_, 0) => None,
            size => Some(size),
        }
    }

    fn stop_tracks(&mut self) {
        if self.live {
            self.live = false;
            self.live_tracks.set(self.live_tracks.get().saturating_sub(1));
        }
    }

    fn is_live(&self) -> bool {
        self.live
    }
}

impl Drop for SimulatedStream {
    fn drop(&mut self) {
        self.stop_tracks();
    }
}

pub struct SimulatedPlatform {
    config: SimulatedConfig,
    feed_size: Rc<Cell<(u32, u32)>>,
    live_tracks: Rc<Cell<usize>>,
    requests: Vec<CaptureConstraints>,
    permission_prompts: Vec<SensorKind>,
    listeners: HashSet<SensorKind>,
}

impl SimulatedPlatform {
    pub fn new(config: SimulatedConfig) -> Self {
        Self {
            feed_size: Rc::new(Cell::new(config.feed_size)),
            live_tracks: Rc::new(Cell::new(0)),
            config,
            requests: Vec::new(),
            permission_prompts: Vec::new(),
            listeners: HashSet::new(),
        }
    }

    /// Every constraint set passed to `request_stream`, in order
    pub fn requests(&self) -> &[CaptureConstraints] {
        &self.requests
    }

    pub fn permission_prompts(&self) -> &[SensorKind] {
        &self.permission_prompts
    }

    pub fn has_listener(&self, kind: SensorKind) -> bool {
        self.listeners.contains(&kind)
    }

    /// Streams opened and not yet stopped
    pub fn live_tracks(&self) -> usize {
        self.live_tracks.get()
    }

    /// Changes the feed resolution of the current and future streams
    pub fn set_feed_size(&mut self, width: u32, height: u32) {
        self.feed_size.set((width, height));
    }

    fn stream_result(&self, constraints: &CaptureConstraints) -> Result<SimulatedStream, CaptureError> {
        match self.config.fault {
            Some(SimulatedFault::Denied) => Err(CaptureError::PermissionDenied(SensorKind::Camera)),
            Some(SimulatedFault::NotFound) => Err(CaptureError::DeviceNotFound),
            Some(SimulatedFault::Busy) => Err(CaptureError::DeviceBusy),
            Some(SimulatedFault::Overconstrained) if constraints.video.is_some() => {
                Err(CaptureError::Overconstrained)
            }
            Some(SimulatedFault::OverconstrainedTwice) => Err(CaptureError::Overconstrained),
            _ => {
                self.live_tracks.set(self.live_tracks.get() + 1);
                Ok(SimulatedStream {
                    feed_size: Rc::clone(&self.feed_size),
                    live_tracks: Rc::clone(&self.live_tracks),
                    live: true,
                })
            }
        }
    }

    fn is_denied(&self, kind: SensorKind) -> bool {
        match kind {
            SensorKind::Orientation => self.config.deny_orientation,
            SensorKind::Motion => self.config.deny_motion,
            SensorKind::Camera => self.config.fault == Some(SimulatedFault::Denied),
        }
    }
}

impl DevicePlatform for SimulatedPlatform {
    type Stream = SimulatedStream;

    fn origin(&self) -> &str {
        &self.config.origin
    }

    fn capability(&self) -> Result<(), MissingCapability> {
        match self.config.fault {
            Some(SimulatedFault::NoCamera) => Err(MissingCapability::NoCaptureDevices),
            Some(SimulatedFault::LegacyApi) => Err(MissingCapability::LegacyApiOnly),
            _ => Ok(()),
        }
    }

    fn request_stream(
        &mut self,
        constraints: CaptureConstraints,
    ) -> LocalBoxFuture<'_, Result<SimulatedStream, CaptureError>> {
        self.requests.push(constraints);
        let result = self.stream_result(&constraints);
        future::ready(result).boxed_local()
    }

    fn permission_model(&self, _kind: SensorKind) -> PermissionModel {
        self.config.permission_model
    }

    fn request_permission(
        &mut self,
        kind: SensorKind,
    ) -> LocalBoxFuture<'_, Result<PermissionState, CaptureError>> {
        self.permission_prompts.push(kind);
        let state = if self.is_denied(kind) {
            PermissionState::Denied
        } else {
            PermissionState::Granted
        };
        future::ready(Ok(state)).boxed_local()
    }

    fn add_listener(&mut self, kind: SensorKind) {
        self.listeners.insert(kind);
    }

    fn remove_listener(&mut self, kind: SensorKind) {
        self.listeners.remove(&kind);
    }
}

/// Orientation/motion source tilted from the keyboard.
///
/// Starts upright (pitch 90°), which is how a phone is held to look through
/// its rear camera.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedImu {
    orientation: OrientationSample,
}

impl SimulatedImu {
    pub fn new() -> Self {
        Self {
            orientation: OrientationSample::new(0.0, 90.0, 0.0),
        }
    }

    /// Rotates the device by the given degrees and returns the new sample
    pub fn tilt(&mut self, yaw: f32, pitch: f32, roll: f32) -> OrientationSample {
        let o = &mut self.orientation;
        o.yaw = (o.yaw + yaw).rem_euclid(360.0);
        o.pitch = (o.pitch + pitch).clamp(-180.0, 180.0);
        o.roll = (o.roll + roll).clamp(-90.0, 90.0);
        *o
    }

    pub fn orientation(&self) -> OrientationSample {
        self.orientation
    }

    /// Gravity as seen by an accelerometer at the current tilt
    pub fn motion(&self) -> MotionSample {
        let pitch = self.orientation.pitch.to_radians();
        let roll = self.orientation.roll.to_radians();
        MotionSample {
            x: GRAVITY * roll.sin(),
            y: GRAVITY * pitch.sin() * roll.cos(),
            z: GRAVITY * pitch.cos() * roll.cos(),
        }
    }
}

impl Default for SimulatedImu {
    fn default() -> Self {
        Self::new()
    }
}
