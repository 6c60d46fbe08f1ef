//! Camera mode state machine: orbit camera versus sensor-driven AR.
//!
//! Entering AR is a chain of async steps (transport check, capability check,
//! stream request with one unconstrained retry, sensor permissions) that
//! short-circuits on the first failure. Every exit path, successful or not,
//! goes through the same teardown so no stream or listener is left behind.

use std::collections::HashSet;

use crate::error::{CaptureError, SensorKind};
use crate::sensors::{
    CaptureConstraints, CaptureStream, DevicePlatform, PermissionModel, PermissionState,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraMode {
    Orbit,
    RequestingSensor,
    SensorActive,
    /// Orbit camera keeps rendering; the error is kept for display
    SensorFailed(CaptureError),
}

impl CameraMode {
    pub fn is_sensor_active(&self) -> bool {
        matches!(self, CameraMode::SensorActive)
    }
}

/// What a successful start had to work around
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SensorSession {
    /// The preferred constraints were rejected and the unconstrained retry was used
    pub used_fallback_constraints: bool,
    /// Motion is best-effort; its failure does not block AR
    pub motion_error: Option<CaptureError>,
}

pub struct CameraModeMachine<P: DevicePlatform> {
    platform: P,
    mode: CameraMode,
    stream: Option<P::Stream>,
    listeners: HashSet<SensorKind>,
}

impl<P: DevicePlatform> CameraModeMachine<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            mode: CameraMode::Orbit,
            stream: None,
            listeners: HashSet::new(),
        }
    }

    pub fn mode(&self) -> &CameraMode {
        &self.mode
    }

    pub fn stream(&self) -> Option<&P::Stream> {
        self.stream.as_ref()
    }

    /// Whether events of `kind` should reach the fusion unit
    pub fn listening(&self, kind: SensorKind) -> bool {
        self.mode.is_sensor_active() && self.listeners.contains(&kind)
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Enters sensor-driven mode. Starting while already active is a no-op.
    pub async fn start(&mut self) -> Result<SensorSession, CaptureError> {
        if self.mode.is_sensor_active() {
            return Ok(SensorSession::default());
        }

        self.mode = CameraMode::RequestingSensor;

        match self.acquire().await {
            Ok(session) => {
                self.mode = CameraMode::SensorActive;
                log::info!("Sensor camera active");
                Ok(session)
            }
            Err(e) => {
                self.release();
                self.mode = CameraMode::SensorFailed(e.clone());
                Err(e)
            }
        }
    }

    /// Leaves sensor mode: stops the tracks, removes both listeners. Idempotent.
    pub fn stop(&mut self) {
        self.release();
        if self.mode != CameraMode::Orbit {
            log::info!("Back to orbit camera");
        }
        self.mode = CameraMode::Orbit;
    }

    async fn acquire(&mut self) -> Result<SensorSession, CaptureError> {
        if !self.platform.is_secure_context() {
            return Err(CaptureError::InsecureContext {
                origin: self.platform.origin().to_string(),
            });
        }

        self.platform
            .capability()
            .map_err(CaptureError::CapabilityUnavailable)?;

        let mut session = SensorSession::default();
        let stream = match self.open_stream(CaptureConstraints::preferred()).await {
            Err(CaptureError::Overconstrained) => {
                log::warn!("Preferred capture constraints rejected, retrying unconstrained");
                session.used_fallback_constraints = true;
                self.open_stream(CaptureConstraints::unconstrained()).await?
            }
            result => result?,
        };
        self.stream = Some(stream);

        self.subscribe(SensorKind::Orientation).await?;

        if let Err(e) = self.subscribe(SensorKind::Motion).await {
            log::warn!("Motion sensor unavailable: {}", e);
            session.motion_error = Some(e);
        }

        Ok(session)
    }

    async fn open_stream(
        &mut self,
        constraints: CaptureConstraints,
    ) -> Result<P::Stream, CaptureError> {
        log::debug!("Requesting capture stream with {:?}", constraints);
        self.platform.request_stream(constraints).await
    }

    async fn subscribe(&mut self, kind: SensorKind) -> Result<(), CaptureError> {
        if self.platform.permission_model(kind) == PermissionModel::Explicit {
            match self.platform.request_permission(kind).await? {
                PermissionState::Granted => {}
                PermissionState::Denied => return Err(CaptureError::PermissionDenied(kind)),
            }
        }

        self.platform.add_listener(kind);
        self.listeners.insert(kind);
        Ok(())
    }

    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_tracks();
        }
        for kind in self.listeners.drain() {
            self.platform.remove_listener(kind);
        }
    }
}
