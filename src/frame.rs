use std::time::Instant;

/// Frame metadata - carries frame number and timing info
#[derive(Debug, Clone, Copy)]
pub struct FrameInfo {
    pub number: u64,
    pub time: f32,
    pub delta: f32,
}

impl FrameInfo {
    pub fn new(number: u64, time: f32, delta: f32) -> Self {
        Self { number, time, delta }
    }
}

/// Infinite iterator of frames, timed by the wall clock or by a fixed step
pub struct FrameIterator {
    frame_number: u64,
    clock: FrameClock,
}

enum FrameClock {
    Wall { start: Instant, last: Instant },
    Fixed { delta: f32 },
}

impl FrameIterator {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            frame_number: 0,
            clock: FrameClock::Wall {
                start: now,
                last: now,
            },
        }
    }

    /// Deterministic frames `delta` seconds apart, for headless runs
    pub fn fixed(delta: f32) -> Self {
        Self {
            frame_number: 0,
            clock: FrameClock::Fixed { delta },
        }
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }
}

impl Default for FrameIterator {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for FrameIterator {
    type Item = FrameInfo;

    fn next(&mut self) -> Option<FrameInfo> {
        let (time, delta) = match &mut self.clock {
            FrameClock::Wall { start, last } => {
                let now = Instant::now();
                let delta = now.duration_since(*last).as_secs_f32();
                *last = now;
                (now.duration_since(*start).as_secs_f32(), delta)
            }
            FrameClock::Fixed { delta } => (self.frame_number as f32 * *delta, *delta),
        };

        let info = FrameInfo::new(self.frame_number, time, delta);
        self.frame_number += 1;
        Some(info)
    }
}
