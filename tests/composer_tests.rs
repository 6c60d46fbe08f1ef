mod common;

use common::{composer, Fixtures};
use fake_ar::camera::CameraKind;
use fake_ar::diagnostics::DiagnosticKind;
use fake_ar::scene::Axis;
use fake_ar::sensors::{OrientationSample, SimulatedConfig};
use fake_ar::traits::SceneRenderer;
use glam::Vec3;

#[cfg(test)]
mod composer_tests {
    use super::*;

    #[test]
    fn test_five_file_listing_loads_three_objects() {
        let fixtures = Fixtures::new("listing");
        let paths = vec![
            fixtures.ply("room.ply", &[[0.0, 0.0, 0.0], [4.0, 2.0, 1.0]]),
            fixtures.ply("statue.ply", &[[-1.0, -1.0, -1.0], [1.0, 1.0, 1.0], [0.0, 3.0, 0.0]]),
            fixtures.glb("chair.glb", [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
            fixtures.write("garden.spz", b"compressed"),
            fixtures.splat("bonsai.splat", 10),
        ];

        let mut composer = composer(SimulatedConfig::default());
        assert_eq!(composer.load_asset_set(&paths), 4);
        composer.wait_for_loads();

        let mut names = composer.registry().names();
        names.sort();
        assert_eq!(names, vec!["chair.glb", "room.ply", "statue.ply"]);
        assert_eq!(
            composer.diagnostics().count(DiagnosticKind::UnsupportedFormat),
            1
        );
        assert_eq!(composer.diagnostics().count(DiagnosticKind::LoadFailure), 0);
        assert_eq!(composer.splat_name(), Some("bonsai.splat"));

        composer.frame(0.016).unwrap();
        assert_eq!(composer.renderer().last_object_count(), 3);
    }

    #[test]
    fn test_failed_asset_does_not_block_others() {
        let fixtures = Fixtures::new("partial");
        let paths = vec![
            fixtures.ply("good.ply", &[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]),
            fixtures.write("broken.glb", b"not a gltf file"),
            fixtures.ply("empty.ply", &[]),
        ];

        let mut composer = composer(SimulatedConfig::default());
        composer.load_asset_set(&paths);
        composer.wait_for_loads();

        assert_eq!(composer.registry().names(), vec!["good.ply"]);
        assert_eq!(composer.diagnostics().count(DiagnosticKind::LoadFailure), 2);
        assert_eq!(composer.pending_loads(), 0);
    }

    #[test]
    fn test_hostile_ply_header_does_not_stall_loading() {
        let fixtures = Fixtures::new("hostile");
        let paths = vec![
            fixtures.ply("good.ply", &[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]),
            fixtures.write(
                "bad.ply",
                b"ply\nformat ascii 1.0\nelement vertex 18446744073709551615\n\
                  property float x\nproperty float y\nproperty float z\nend_header\n0 0 0\n",
            ),
        ];

        let mut composer = composer(SimulatedConfig::default());
        assert_eq!(composer.load_asset_set(&paths), 2);
        composer.wait_for_loads();

        assert_eq!(composer.registry().names(), vec!["good.ply"]);
        assert_eq!(composer.diagnostics().count(DiagnosticKind::LoadFailure), 1);
        assert_eq!(composer.pending_loads(), 0);
    }

    #[test]
    fn test_normalized_scale_reaches_scene() {
        let fixtures = Fixtures::new("scale");
        let path = fixtures.ply("wide.ply", &[[10.0, 0.0, 0.0], [18.0, 2.0, 1.0]]);

        let mut composer = composer(SimulatedConfig::default());
        composer.load_asset_set([path]);
        composer.wait_for_loads();

        let object = composer.registry().get("wide.ply").unwrap();
        assert!((object.transform.scale - Vec3::splat(0.25)).length() < 1e-6);
        assert_eq!(object.target_position, Vec3::ZERO);
        assert_eq!(object.geometry.positions()[0], Vec3::new(-4.0, -1.0, -0.5));
    }

    #[test]
    fn test_same_file_name_twice_is_rejected() {
        let fixtures = Fixtures::new("dupes");
        let paths = vec![
            fixtures.ply("a/scan.ply", &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]),
            fixtures.ply("b/scan.ply", &[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0]]),
        ];

        let mut composer = composer(SimulatedConfig::default());
        composer.load_asset_set(&paths);
        composer.wait_for_loads();

        assert_eq!(composer.registry().len(), 1);
        assert_eq!(composer.diagnostics().count(DiagnosticKind::LoadFailure), 1);
    }

    #[test]
    fn test_only_first_splat_is_loaded() {
        let fixtures = Fixtures::new("splats");
        let paths = vec![fixtures.splat("one.splat", 2), fixtures.splat("two.splat", 3)];

        let mut composer = composer(SimulatedConfig::default());
        assert_eq!(composer.load_asset_set(&paths), 1);
        composer.wait_for_loads();

        assert_eq!(composer.splat_name(), Some("one.splat"));
        assert!(composer.diagnostics().count(DiagnosticKind::LoadProgress) >= 1);
        assert_eq!(
            composer.diagnostics().count(DiagnosticKind::UnsupportedFormat),
            1
        );
    }

    #[test]
    fn test_new_asset_set_replaces_old() {
        let fixtures = Fixtures::new("replace");
        let first = fixtures.ply("first.ply", &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);
        let second = fixtures.ply("second.ply", &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]);

        let mut composer = composer(SimulatedConfig::default());
        composer.load_asset_set([&first]);
        composer.wait_for_loads();
        composer.load_asset_set([&second]);
        composer.wait_for_loads();

        assert_eq!(composer.registry().names(), vec!["second.ply"]);
    }

    #[test]
    fn test_target_change_is_interpolated() {
        let fixtures = Fixtures::new("target");
        let path = fixtures.ply("cube.ply", &[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]);

        let mut composer = composer(SimulatedConfig::default());
        composer.load_asset_set([path]);
        composer.wait_for_loads();

        composer.set_target("cube.ply", Axis::X, 2.0).unwrap();
        assert_eq!(
            composer.registry().get("cube.ply").unwrap().transform.position,
            Vec3::ZERO
        );

        composer.frame(0.016).unwrap();
        let x = composer.registry().get("cube.ply").unwrap().transform.position.x;
        assert!((x - 0.2).abs() < 1e-6);

        assert!(composer.set_target("missing.ply", Axis::X, 1.0).is_err());
    }

    #[test]
    fn test_sensor_aspect_follows_feed_not_window() {
        let mut composer = composer(SimulatedConfig::default());
        pollster::block_on(composer.start_sensor_mode()).unwrap();
        composer.frame(0.016).unwrap();
        assert!((composer.rig().sensor.lens.aspect - 4.0 / 3.0).abs() < 1e-6);

        composer.resize(1000, 500);
        composer.frame(0.016).unwrap();
        assert!((composer.rig().sensor.lens.aspect - 4.0 / 3.0).abs() < 1e-6);
        assert!((composer.rig().orbit.lens.aspect - 2.0).abs() < 1e-6);

        composer.platform_mut().set_feed_size(1920, 1080);
        composer.frame(0.016).unwrap();
        assert!((composer.rig().sensor.lens.aspect - 16.0 / 9.0).abs() < 1e-6);
        assert_eq!(composer.renderer().output_size(), (1000, 500));
    }

    #[test]
    fn test_sensor_camera_tracks_latest_orientation() {
        let mut composer = composer(SimulatedConfig::default());
        pollster::block_on(composer.start_sensor_mode()).unwrap();

        composer.on_orientation(OrientationSample::new(30.0, 90.0, 0.0));
        composer.frame(0.016).unwrap();

        let rotation = composer.rig().sensor.rotation();
        assert!((rotation.y - 30f32.to_radians()).abs() < 1e-6);
        assert!(rotation.x.abs() < 1e-6);
        assert_eq!(composer.snapshot().active_camera, CameraKind::Sensor);
    }

    #[test]
    fn test_drop_releases_stream_and_listeners() {
        let mut composer = composer(SimulatedConfig::default());
        pollster::block_on(composer.start_sensor_mode()).unwrap();
        assert_eq!(composer.platform().live_tracks(), 1);

        composer.shutdown();
        assert_eq!(composer.platform().live_tracks(), 0);
        assert!(!composer
            .platform()
            .has_listener(fake_ar::error::SensorKind::Orientation));
        assert!(!composer
            .platform()
            .has_listener(fake_ar::error::SensorKind::Motion));
        assert!(composer.renderer().is_released());
    }
}
