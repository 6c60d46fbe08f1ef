use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Window, WindowId},
};

use fake_ar::cli::Cli;
use fake_ar::composer::Composer;
use fake_ar::core::{Button, Controller, WinitController};
use fake_ar::frame::FrameIterator;
use fake_ar::renderer::{GpuRenderer, HeadlessRenderer};
use fake_ar::sensors::{SimulatedImu, SimulatedPlatform};
use fake_ar::telemetry::TelemetrySampler;
use fake_ar::traits::SceneRenderer;

// === Constants ===

const TILT_DEGREES_PER_SECOND: f32 = 45.0;
const NUDGE_STEP: f32 = 0.25;
const HEADLESS_DELTA: f32 = 1.0 / 60.0;

struct App {
    cli: Cli,
    window: Option<Arc<Window>>,
    composer: Option<Composer<SimulatedPlatform, GpuRenderer>>,
    input: WinitController,
    imu: SimulatedImu,
    frames: FrameIterator,
    selected: usize,
}

impl App {
    fn new(cli: Cli) -> Self {
        Self {
            cli,
            window: None,
            composer: None,
            input: WinitController::new(),
            imu: SimulatedImu::new(),
            frames: FrameIterator::new(),
            selected: 0,
        }
    }

    fn telemetry(cli: &Cli) -> TelemetrySampler {
        TelemetrySampler::new(!cli.no_telemetry, cli.telemetry_json)
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(composer) = &mut self.composer {
            composer.shutdown();
        }
        event_loop.exit();
    }

    fn handle_buttons(&mut self, event_loop: &ActiveEventLoop) {
        let Some(composer) = &mut self.composer else {
            return;
        };

        for button in self.input.take_pressed() {
            match button {
                Button::Escape => {
                    composer.shutdown();
                    event_loop.exit();
                    return;
                }
                Button::ToggleAr => {
                    if let Err(e) = pollster::block_on(composer.toggle_sensor_mode()) {
                        log::warn!("AR unavailable, staying in orbit view: {}", e);
                    }
                }
                Button::NextObject => {
                    let names = composer.registry().names();
                    if !names.is_empty() {
                        self.selected = (self.selected + 1) % names.len();
                        log::info!("Selected {}", names[self.selected]);
                    }
                }
                other => {
                    let Some(direction) = other.nudge() else {
                        continue;
                    };
                    let selected = composer
                        .registry()
                        .iter()
                        .nth(self.selected)
                        .map(|o| (o.name.clone(), o.target_position));
                    if let Some((name, target)) = selected {
                        let _ = composer.set_target_position(&name, target + direction * NUDGE_STEP);
                    }
                }
            }
        }
    }

    fn update(&mut self, event_loop: &ActiveEventLoop) {
        let Some(frame) = self.frames.next() else {
            return;
        };

        self.handle_buttons(event_loop);

        let Some(composer) = &mut self.composer else {
            return;
        };

        let rate = TILT_DEGREES_PER_SECOND * frame.delta;
        let input = &self.input;
        let sample = self.imu.tilt(
            input.axis(Button::TurnLeft, Button::TurnRight) * rate,
            input.axis(Button::TiltUp, Button::TiltDown) * rate,
            input.axis(Button::RollRight, Button::RollLeft) * rate,
        );
        composer.on_orientation(sample);
        composer.on_motion(self.imu.motion());

        let (dx, dy) = self.input.drag_delta();
        let (_, height) = composer.renderer().output_size();
        composer.orbit_mut().rotate(dx, dy, height as f32);
        composer.orbit_mut().dolly(self.input.scroll_delta());
        self.input.reset_deltas();

        if let Err(e) = composer.frame(frame.delta) {
            log::error!("Frame {} failed: {:#}", frame.number, e);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title("Fake AR")
                .with_transparent(true)
                .with_inner_size(winit::dpi::LogicalSize::new(self.cli.width, self.cli.height)),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let renderer = match pollster::block_on(GpuRenderer::new(window.clone())) {
            Ok(renderer) => renderer,
            Err(e) => {
                log::error!("Failed to initialize renderer: {:#}", e);
                event_loop.exit();
                return;
            }
        };

        let platform = SimulatedPlatform::new(self.cli.simulated_config());
        let mut composer =
            Composer::new(platform, renderer).with_telemetry(Self::telemetry(&self.cli));
        composer.load_asset_set(self.cli.asset_paths());

        self.window = Some(window);
        self.composer = Some(composer);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        self.input.process_event(&event);

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(size) => {
                if let Some(composer) = &mut self.composer {
                    composer.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => self.update(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn run_headless(cli: &Cli, frames: u64) -> Result<()> {
    let platform = SimulatedPlatform::new(cli.simulated_config());
    let renderer = HeadlessRenderer::new(cli.width, cli.height);
    let mut composer = Composer::new(platform, renderer).with_telemetry(App::telemetry(cli));

    composer.load_asset_set(cli.asset_paths());
    composer.wait_for_loads();

    for frame in FrameIterator::fixed(HEADLESS_DELTA).take(frames as usize) {
        composer.frame(frame.delta)?;
    }

    println!("{}", serde_json::to_string_pretty(composer.snapshot())?);
    composer.shutdown();
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Some(frames) = cli.headless_frames {
        return run_headless(&cli, frames);
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(cli);

    log::info!("Fake AR - Controls: drag/wheel orbit, C toggles AR, arrows/IJKL/Q/E tilt, Tab + WASDRF move, Escape quits");
    event_loop.run_app(&mut app)?;

    Ok(())
}
