pub mod fusion;
pub mod platform;
pub mod simulated;

pub use fusion::{
    MotionSample, OrientationDelta, OrientationSample, RigidAdjustment, SensorFusion,
    PARALLAX_SENSITIVITY, ROTATION_DAMPING, SMOOTHING,
};
pub use platform::{
    is_secure_origin, CaptureConstraints, CaptureStream, DevicePlatform, FacingMode,
    PermissionModel, PermissionState, VideoConstraints,
};
pub use simulated::{SimulatedConfig, SimulatedFault, SimulatedImu, SimulatedPlatform};
