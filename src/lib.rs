pub mod assets;
pub mod camera;
pub mod cli;
pub mod composer;
pub mod core;
pub mod diagnostics;
pub mod error;
pub mod frame;
pub mod loaders;
pub mod math;
pub mod mode;
pub mod renderer;
pub mod scene;
pub mod sensors;
pub mod telemetry;
pub mod traits;

pub use composer::Composer;
pub use error::{AssetError, CaptureError};
