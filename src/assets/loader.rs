use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, Receiver, SendError, Sender};
use std::thread::JoinHandle;

use super::normalizer::{AssetNormalizer, LoadedAsset};
use super::AssetRef;
use crate::error::AssetError;

/// Messages sent from loader threads back to the frame loop
#[derive(Debug)]
pub enum LoadEvent {
    Progress { name: String, percent: f32 },
    Loaded(LoadedAsset),
    Failed(AssetError),
}

/// Decodes assets off the frame loop, one thread per asset.
///
/// Results are collected with [`AssetLoader::poll`], so scene mutation stays on
/// the thread that owns the scene.
pub struct AssetLoader {
    normalizer: AssetNormalizer,
    sender: Sender<LoadEvent>,
    receiver: Receiver<LoadEvent>,
    workers: Vec<JoinHandle<()>>,
    in_flight: usize,
}

impl AssetLoader {
    pub fn new(normalizer: AssetNormalizer) -> Self {
        let (sender, receiver) = channel();
        Self {
            normalizer,
            sender,
            receiver,
            workers: Vec::new(),
            in_flight: 0,
        }
    }

    /// Starts decoding `asset` in the background
    pub fn spawn(&mut self, asset: AssetRef) {
        let normalizer = self.normalizer;
        let sender = self.sender.clone();
        let path = asset.path.clone();

        let spawned = std::thread::Builder::new()
            .name(format!("load-{}", asset.name()))
            .spawn(move || {
                let name = asset.name();
                let progress_sender = sender.clone();
                let mut progress = |percent: f32| {
                    let _ = progress_sender.send(LoadEvent::Progress {
                        name: name.clone(),
                        percent,
                    });
                };

                // A decoder panic still has to produce the asset's final event
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    normalizer.load(&asset, &mut progress)
                }));
                let event = match outcome {
                    Ok(Ok(loaded)) => LoadEvent::Loaded(loaded),
                    Ok(Err(e)) => LoadEvent::Failed(e),
                    Err(payload) => LoadEvent::Failed(AssetError::load_failure(
                        &asset.path,
                        format!("decoder panicked: {}", panic_message(payload.as_ref())),
                    )),
                };

                // Receiver gone means the load was cancelled
                if let Err(SendError(LoadEvent::Loaded(LoadedAsset::Splat { mut viewer, name }))) =
                    sender.send(event)
                {
                    log::debug!("Disposing splat viewer for cancelled load {}", name);
                    viewer.dispose();
                }
            });

        match spawned {
            Ok(handle) => {
                self.workers.push(handle);
                self.in_flight += 1;
            }
            Err(e) => {
                let _ = self.sender.send(LoadEvent::Failed(AssetError::load_failure(
                    &path,
                    format!("could not start loader thread: {}", e),
                )));
                self.in_flight += 1;
            }
        }
    }

    /// Drains every event that has arrived since the last poll
    pub fn poll(&mut self) -> Vec<LoadEvent> {
        let events: Vec<LoadEvent> = self.receiver.try_iter().collect();

        for event in &events {
            if matches!(event, LoadEvent::Loaded(_) | LoadEvent::Failed(_)) {
                self.in_flight = self.in_flight.saturating_sub(1);
            }
        }

        self.workers.retain(|handle| !handle.is_finished());
        events
    }

    /// Assets spawned whose final event has not been polled yet
    pub fn pending(&self) -> usize {
        self.in_flight
    }

    /// Abandons in-flight loads; their results are dropped when they finish
    pub fn cancel_all(&mut self) {
        let (sender, receiver) = channel();
        self.sender = sender;
        self.receiver = receiver;
        self.workers.clear();
        self.in_flight = 0;
    }

    /// Blocks until every spawned asset has finished, then drains the channel
    pub fn wait_all(&mut self) -> Vec<LoadEvent> {
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                log::error!("Asset loader thread panicked");
            }
        }
        self.poll()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new(AssetNormalizer::default())
    }
}
