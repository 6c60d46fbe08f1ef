mod common;

use fake_ar::diagnostics::DiagnosticKind;
use fake_ar::error::{CaptureError, MissingCapability, SensorKind};
use fake_ar::mode::CameraMode;
use fake_ar::sensors::{PermissionModel, SimulatedConfig, SimulatedFault};
use fake_ar::traits::ViewCamera;
use glam::Vec3;

fn faulty(fault: SimulatedFault) -> SimulatedConfig {
    SimulatedConfig {
        fault: Some(fault),
        ..SimulatedConfig::default()
    }
}

#[cfg(test)]
mod mode_tests {
    use super::*;

    #[test]
    fn test_overconstrained_retries_once_unconstrained() {
        let mut composer = common::composer(faulty(SimulatedFault::Overconstrained));
        pollster::block_on(composer.start_sensor_mode()).unwrap();

        let requests = composer.platform().requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].video.is_some());
        assert!(requests[1].video.is_none());
        assert!(requests[1].audio == requests[0].audio);
        assert_eq!(composer.mode(), &CameraMode::SensorActive);
    }

    #[test]
    fn test_overconstrained_twice_fails() {
        let mut composer = common::composer(faulty(SimulatedFault::OverconstrainedTwice));
        let result = pollster::block_on(composer.start_sensor_mode());

        assert_eq!(result, Err(CaptureError::Overconstrained));
        assert_eq!(composer.platform().requests().len(), 2);
        assert!(matches!(composer.mode(), CameraMode::SensorFailed(_)));
        assert_eq!(composer.platform().live_tracks(), 0);
    }

    #[test]
    fn test_legacy_api_reports_capability() {
        let mut composer = common::composer(faulty(SimulatedFault::LegacyApi));
        let result = pollster::block_on(composer.start_sensor_mode());

        assert_eq!(
            result,
            Err(CaptureError::CapabilityUnavailable(MissingCapability::LegacyApiOnly))
        );
        assert!(composer.platform().requests().is_empty());
        assert_eq!(composer.diagnostics().count(DiagnosticKind::Capability), 1);

        composer.frame(0.016).unwrap();
        assert_eq!(
            composer.renderer().last_clear(),
            Some(fake_ar::traits::ClearMode::Opaque)
        );
    }

    #[test]
    fn test_device_faults_map_to_device_diagnostics() {
        for (fault, expected) in [
            (SimulatedFault::NotFound, CaptureError::DeviceNotFound),
            (SimulatedFault::Busy, CaptureError::DeviceBusy),
        ] {
            let mut composer = common::composer(faulty(fault));
            let result = pollster::block_on(composer.start_sensor_mode());
            assert_eq!(result, Err(expected));
            assert_eq!(composer.diagnostics().count(DiagnosticKind::Device), 1);
        }
    }

    #[test]
    fn test_explicit_permissions_are_prompted() {
        let mut composer = common::composer(SimulatedConfig {
            permission_model: PermissionModel::Explicit,
            ..SimulatedConfig::default()
        });
        pollster::block_on(composer.start_sensor_mode()).unwrap();

        assert_eq!(
            composer.platform().permission_prompts(),
            &[SensorKind::Orientation, SensorKind::Motion]
        );
    }

    #[test]
    fn test_orientation_denied_leaves_nothing_running() {
        let mut composer = common::composer(SimulatedConfig {
            permission_model: PermissionModel::Explicit,
            deny_orientation: true,
            ..SimulatedConfig::default()
        });
        let result = pollster::block_on(composer.start_sensor_mode());

        assert_eq!(
            result,
            Err(CaptureError::PermissionDenied(SensorKind::Orientation))
        );
        assert_eq!(composer.platform().live_tracks(), 0);
        assert!(!composer.platform().has_listener(SensorKind::Orientation));
        assert!(!composer.platform().has_listener(SensorKind::Motion));
        assert_eq!(composer.diagnostics().count(DiagnosticKind::Permission), 1);
    }

    #[test]
    fn test_motion_denied_is_not_fatal() {
        let mut composer = common::composer(SimulatedConfig {
            permission_model: PermissionModel::Explicit,
            deny_motion: true,
            ..SimulatedConfig::default()
        });
        pollster::block_on(composer.start_sensor_mode()).unwrap();

        assert_eq!(composer.mode(), &CameraMode::SensorActive);
        assert!(composer.platform().has_listener(SensorKind::Orientation));
        assert!(!composer.platform().has_listener(SensorKind::Motion));
        assert_eq!(composer.diagnostics().count(DiagnosticKind::Permission), 1);
    }

    #[test]
    fn test_insecure_origin_never_requests_stream() {
        let mut composer = common::composer(SimulatedConfig {
            origin: "http://10.0.0.5:8080".to_string(),
            ..SimulatedConfig::default()
        });
        let result = pollster::block_on(composer.start_sensor_mode());

        assert!(matches!(result, Err(CaptureError::InsecureContext { .. })));
        assert!(composer.platform().requests().is_empty());
    }

    #[test]
    fn test_toggle_twice_keeps_orbit_camera() {
        let mut composer = common::composer(SimulatedConfig::default());
        composer.orbit_mut().rotate(120.0, 40.0, 600.0);
        for _ in 0..5 {
            composer.frame(0.016).unwrap();
        }
        let before = composer.rig().orbit.position();

        pollster::block_on(composer.toggle_sensor_mode()).unwrap();
        assert_eq!(composer.mode(), &CameraMode::SensorActive);
        composer.frame(0.016).unwrap();
        pollster::block_on(composer.toggle_sensor_mode()).unwrap();

        assert_eq!(composer.mode(), &CameraMode::Orbit);
        assert_eq!(composer.platform().live_tracks(), 0);
        assert!((composer.rig().orbit.position() - before).length() < 1e-6);
        assert_ne!(before, Vec3::new(0.0, -8.0, 0.0));
    }
}
