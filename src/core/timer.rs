/// Rate limiter fed with frame deltas in seconds.
///
/// Fires at most once per interval. Leftover time carries into the next
/// interval (capped at one interval) so a 1 Hz log stays at 1 Hz under
/// uneven frame times.
#[derive(Debug, Clone, Copy)]
pub struct Throttled {
    interval: f32,
    elapsed: f32,
}

impl Throttled {
    /// The first `try_tick` fires immediately
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            elapsed: interval,
        }
    }

    pub fn try_tick(&mut self, delta: f32) -> bool {
        self.elapsed += delta.max(0.0);
        if self.elapsed < self.interval {
            return false;
        }
        self.elapsed = (self.elapsed - self.interval).min(self.interval);
        true
    }

    /// Next `try_tick` fires regardless of elapsed time
    pub fn reset(&mut self) {
        self.elapsed = self.interval;
    }
}
