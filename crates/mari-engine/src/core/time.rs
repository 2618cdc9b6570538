use serde::{Deserialize, Serialize};

/// Frame timing handed to systems each tick. Timestamps are the host's
/// animation-frame clock in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameTime {
    pub current: f64,
    /// Timestamp of the previous tick, `None` on the first tick after a reset.
    pub previous: Option<f64>,
    /// `current - previous`, or zero on the first tick after a reset.
    pub delta: f64,
    pub previous_delta: Option<f64>,
}

impl FrameTime {
    pub fn new(current: f64, previous: Option<f64>, previous_delta: Option<f64>) -> Self {
        Self {
            current,
            previous,
            delta: current - previous.unwrap_or(current),
            previous_delta,
        }
    }

    /// Elapsed time in seconds.
    pub fn delta_secs(&self) -> f32 {
        (self.delta / 1000.0) as f32
    }
}

/// Fixed timestep accumulator.
/// Turns variable frame deltas into a whole number of fixed simulation steps.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// The fixed delta time per step, in seconds.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
    /// Cap on steps per frame, so a long stall does not spiral.
    max_steps: u32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_steps: 10,
        }
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps.max(1);
        self
    }

    /// Add frame time (seconds) to the accumulator. Returns the number of
    /// fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0);
        self.accumulator = self.accumulator.min(self.dt * self.max_steps as f32);
        // Epsilon absorbs float error so a capped accumulator yields exactly max_steps.
        let steps = ((self.accumulator / self.dt) + 1e-4) as u32;
        self.accumulator = (self.accumulator - steps as f32 * self.dt).max(0.0);
        steps
    }

    /// Drop any partial step.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f32 {
        self.dt
    }
}
