// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::sensors::{PermissionModel, SimulatedConfig, SimulatedFault};

#[derive(Parser, Debug, Clone)]
#[command(name = "fake-ar")]
#[command(about = "Point clouds, splats and meshes composited over a camera feed", long_about = None)]
pub struct Cli {
    /// Asset files to load; when empty, every asset in --asset-dir is loaded
    pub assets: Vec<PathBuf>,

    /// Directory listed for assets when none are given
    #[arg(long, default_value = "public/models")]
    pub asset_dir: PathBuf,

    #[arg(long, default_value_t = 800)]
    pub width: u32,

    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Transport origin used for the secure-context check
    #[arg(long, default_value = "file://localhost")]
    pub origin: String,

    /// Simulated capture feed width
    #[arg(long, default_value_t = 1280)]
    pub feed_width: u32,

    /// Simulated capture feed height
    #[arg(long, default_value_t = 960)]
    pub feed_height: u32,

    /// Sensor permissions need an explicit async grant
    #[arg(long)]
    pub explicit_permissions: bool,

    #[arg(long)]
    pub deny_orientation: bool,

    #[arg(long)]
    pub deny_motion: bool,

    /// Inject a capture failure
    #[arg(long, value_enum)]
    pub simulate_fault: Option<SimulatedFault>,

    /// Disable the once-per-second telemetry log
    #[arg(long)]
    pub no_telemetry: bool,

    /// Log telemetry snapshots as JSON
    #[arg(long)]
    pub telemetry_json: bool,

    /// Run this many frames without a window, then exit
    #[arg(long)]
    pub headless_frames: Option<u64>,
}

impl Cli {
    /// Explicit asset paths, or the catalog listing of `asset_dir`
    pub fn asset_paths(&self) -> Vec<PathBuf> {
        if self.assets.is_empty() {
            crate::assets::list_assets(&self.asset_dir)
        } else {
            self.assets.clone()
        }
    }

    pub fn simulated_config(&self) -> SimulatedConfig {
        SimulatedConfig {
            origin: self.origin.clone(),
            feed_size: (self.feed_width, self.feed_height),
            permission_model: if self.explicit_permissions {
                PermissionModel::Explicit
            } else {
                PermissionModel::Implicit
            },
            deny_orientation: self.deny_orientation,
            deny_motion: self.deny_motion,
            fault: self.simulate_fault,
        }
    }
}
