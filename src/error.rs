//! Error taxonomy for camera/sensor acquisition and asset loading.
//!
//! Neither family is fatal to the process: capture failures fall back to the
//! orbit camera, asset failures drop only the offending asset.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::diagnostics::DiagnosticKind;

/// Device inputs that need a subscription or a permission grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SensorKind {
    Camera,
    Orientation,
    Motion,
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorKind::Camera => write!(f, "camera"),
            SensorKind::Orientation => write!(f, "orientation"),
            SensorKind::Motion => write!(f, "motion"),
        }
    }
}

/// Which part of the capture API is missing on this platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingCapability {
    /// No capture-device API at all
    NoCaptureDevices,
    /// Device API present but it cannot open streams
    NoStreamRequest,
    /// Only a deprecated, vendor-prefixed API exists
    LegacyApiOnly,
}

impl fmt::Display for MissingCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingCapability::NoCaptureDevices => write!(f, "no capture device API"),
            MissingCapability::NoStreamRequest => write!(f, "stream requests not supported"),
            MissingCapability::LegacyApiOnly => write!(f, "only a legacy capture API is available"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("camera capture requires a secure context, origin is {origin}")]
    InsecureContext { origin: String },

    #[error("camera capture unavailable: {0}")]
    CapabilityUnavailable(MissingCapability),

    #[error("{0} permission denied")]
    PermissionDenied(SensorKind),

    #[error("no camera device found")]
    DeviceNotFound,

    #[error("camera is in use by another application")]
    DeviceBusy,

    #[error("capture constraints cannot be satisfied")]
    Overconstrained,

    #[error("capture failed: {0}")]
    Other(String),
}

impl CaptureError {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            CaptureError::InsecureContext { .. } | CaptureError::CapabilityUnavailable(_) => {
                DiagnosticKind::Capability
            }
            CaptureError::PermissionDenied(_) => DiagnosticKind::Permission,
            CaptureError::DeviceNotFound
            | CaptureError::DeviceBusy
            | CaptureError::Overconstrained
            | CaptureError::Other(_) => DiagnosticKind::Device,
        }
    }

    /// Actionable text for the user, one message per category
    pub fn user_message(&self) -> String {
        match self {
            CaptureError::InsecureContext { origin } => format!(
                "Secure connection required. The camera only works over https:// or on localhost \
                 (current origin: {origin}). Serve the app through an HTTPS tunnel or use port \
                 forwarding to localhost."
            ),
            CaptureError::CapabilityUnavailable(MissingCapability::NoCaptureDevices) => {
                "Camera capture is not supported on this platform. Use a browser or runtime with \
                 media-device support."
                    .to_string()
            }
            CaptureError::CapabilityUnavailable(MissingCapability::NoStreamRequest) => {
                "This platform cannot open camera streams. Update to a recent version and try again."
                    .to_string()
            }
            CaptureError::CapabilityUnavailable(MissingCapability::LegacyApiOnly) => {
                "Only an outdated camera API is available. Please update your browser or runtime."
                    .to_string()
            }
            CaptureError::PermissionDenied(SensorKind::Camera) => {
                "Camera access was blocked. Allow camera access in the site or system settings, \
                 then reload."
                    .to_string()
            }
            CaptureError::PermissionDenied(kind) => format!(
                "Access to the {kind} sensor was denied. Allow motion and orientation access in the \
                 system settings to use the AR camera."
            ),
            CaptureError::DeviceNotFound => "No camera was detected on this device.".to_string(),
            CaptureError::DeviceBusy => {
                "The camera is being used by another application. Close other apps that may be \
                 using it and try again."
                    .to_string()
            }
            CaptureError::Overconstrained => {
                "The camera does not support the requested settings, even with basic settings."
                    .to_string()
            }
            CaptureError::Other(reason) => format!("Could not access the camera: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("unsupported asset format `.{extension}` for {}", .path.display())]
    UnsupportedFormat {
        path: PathBuf,
        extension: String,
        hint: Option<&'static str>,
    },

    #[error("failed to load {}: {reason}", .path.display())]
    LoadFailure { path: PathBuf, reason: String },
}

impl AssetError {
    pub fn load_failure(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        AssetError::LoadFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        match self {
            AssetError::UnsupportedFormat { .. } => DiagnosticKind::UnsupportedFormat,
            AssetError::LoadFailure { .. } => DiagnosticKind::LoadFailure,
        }
    }
}
