//! Cosmetic progress shown while an extraction request is in flight.
//!
//! Nothing here measures bytes on the wire. The value is advanced by a host
//! timer with bounded random increments and only reaches 100 when the caller
//! completes it.

/// Upper bound of a single tick increment.
pub const MAX_TICK_INCREMENT: f32 = 15.0;
/// Simulated progress never passes this value on its own.
pub const SIMULATED_CEILING: f32 = 95.0;
/// Interval between simulated progress ticks.
pub const TICK_INTERVAL_MS: u64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SimulatedProgress {
    value: f32,
}

impl SimulatedProgress {
    pub fn start() -> Self {
        Self { value: 0.0 }
    }

    /// Adds a bounded increment, holding at the simulated ceiling.
    pub fn advance(&mut self, increment: f32) {
        if self.value >= SIMULATED_CEILING {
            return;
        }
        let step = if increment.is_finite() {
            increment.clamp(0.0, MAX_TICK_INCREMENT)
        } else {
            0.0
        };
        self.value = (self.value + step).min(SIMULATED_CEILING);
    }

    pub fn complete(&mut self) {
        self.value = 100.0;
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    pub fn percent(&self) -> u8 {
        self.value.round().clamp(0.0, 100.0) as u8
    }

    pub fn phase_label(&self) -> &'static str {
        match self.value {
            v if v < 30.0 => "Uploading file...",
            v if v < 60.0 => "Analyzing document...",
            v if v < 90.0 => "Extracting text...",
            _ => "Finalizing results...",
        }
    }
}
