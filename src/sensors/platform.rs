//! The device seam: capture streams, sensor permissions and listeners.

use futures::future::LocalBoxFuture;

use crate::error::{CaptureError, MissingCapability, SensorKind};

/// Which physical camera to ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// Rear camera
    Environment,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConstraints {
    pub facing_mode: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

/// A capture request. `video: None` means "any video source".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub video: Option<VideoConstraints>,
    pub audio: bool,
}

impl CaptureConstraints {
    /// Rear camera at 1920x1440, no audio
    pub fn preferred() -> Self {
        Self {
            video: Some(VideoConstraints {
                facing_mode: FacingMode::Environment,
                ideal_width: 1920,
                ideal_height: 1440,
            }),
            audio: false,
        }
    }

    /// Fallback after the preferred set was rejected
    pub fn unconstrained() -> Self {
        Self {
            video: None,
            audio: false,
        }
    }
}

/// Whether the platform grants a sensor on subscription or needs an async prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionModel {
    Implicit,
    Explicit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
}

/// An attached live capture stream
pub trait CaptureStream {
    /// Pixel size of the feed, `None` until the first frame's metadata arrives
    fn dimensions(&self) -> Option<(u32, u32)>;

    /// Stops every media track; idempotent
    fn stop_tracks(&mut self);

    fn is_live(&self) -> bool;
}

pub trait DevicePlatform {
    type Stream: CaptureStream;

    /// Transport origin of the running app, e.g. `https://host:8443`
    fn origin(&self) -> &str;

    fn is_secure_context(&self) -> bool {
        is_secure_origin(self.origin())
    }

    /// Checks the capture API exists before any request is made
    fn capability(&self) -> Result<(), MissingCapability>;

    fn request_stream(
        &mut self,
        constraints: CaptureConstraints,
    ) -> LocalBoxFuture<'_, Result<Self::Stream, CaptureError>>;

    fn permission_model(&self, kind: SensorKind) -> PermissionModel;

    fn request_permission(
        &mut self,
        kind: SensorKind,
    ) -> LocalBoxFuture<'_, Result<PermissionState, CaptureError>>;

    fn add_listener(&mut self, kind: SensorKind);

    fn remove_listener(&mut self, kind: SensorKind);
}

/// https anywhere, or any scheme on a loopback host
pub fn is_secure_origin(origin: &str) -> bool {
    let (scheme, rest) = match origin.split_once("://") {
        Some(parts) => parts,
        None => return false,
    };

    if scheme.eq_ignore_ascii_case("https") {
        return true;
    }

    let authority = rest.split('/').next().unwrap_or_default();
    let host = if let Some(bracketed) = authority.strip_prefix('[') {
        bracketed.split(']').next().unwrap_or_default()
    } else {
        authority.split(':').next().unwrap_or_default()
    };

    matches!(
        host.to_ascii_lowercase().as_str(),
        "localhost" | "127.0.0.1" | "::1"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_origins() {
        assert!(is_secure_origin("https://192.168.0.4:3000"));
        assert!(is_secure_origin("http://localhost:3000"));
        assert!(is_secure_origin("http://127.0.0.1"));
        assert!(is_secure_origin("http://[::1]:8080/app"));
        assert!(is_secure_origin("file://localhost"));
    }

    #[test]
    fn test_insecure_origins() {
        assert!(!is_secure_origin("http://192.168.0.4:3000"));
        assert!(!is_secure_origin("http://localhost.example.com"));
        assert!(!is_secure_origin("localhost"));
    }

    #[test]
    fn test_preferred_constraints() {
        let preferred = CaptureConstraints::preferred();
        let video = preferred.video.unwrap();
        assert_eq!(video.facing_mode, FacingMode::Environment);
        assert_eq!((video.ideal_width, video.ideal_height), (1920, 1440));
        assert!(!preferred.audio);
        assert!(CaptureConstraints::unconstrained().video.is_none());
    }
}
