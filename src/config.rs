use std::time::Duration;

use crate::consts;
use crate::error::{CaptureError, Result};

pub const APP_VERSION: &str = "v0.1.0";

#[derive(Clone, PartialEq, Debug)]
pub struct PipelineConfig {
    /// Sample rate in Hz requested from the input device.
    pub sample_rate: u32,

    /// Bytes read from the source per iteration. Must be even.
    pub window_bytes: usize,

    /// Full scale of the scaled signal and of the meter.
    pub bar_max: i32,

    /// Peak intensity at or below which the signal is forced to 0.
    /// Higher = more hiss is ignored, quiet sounds stop registering
    pub noise_floor: f64,

    /// Scaled signal above which a palette change fires once.
    pub palette_trigger_level: i32,

    /// Reference the rotation/contrast band percentages are taken against.
    /// Lower = bands further up the tables become reachable
    pub band_reference: f64,

    /// Pause between iterations in milliseconds.
    pub yield_interval_ms: u64,

    /// How long a read may wait for audio before the loop re-checks for stop.
    pub read_poll_ms: u64,

    /// Time without any audio after which the session is ended as stalled.
    /// 0 = wait forever
    pub stall_timeout_ms: u64,

    /// Read failures tolerated in a row before the session is ended.
    /// 0 = fail on the first error
    pub max_read_retries: u32,

    /// Converted audio chunks buffered between the device and the loop.
    pub stream_queue_depth: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: consts::SAMPLE_RATE,
            window_bytes: consts::WINDOW_BYTES,
            bar_max: consts::BAR_MAX,
            noise_floor: consts::INTENSITY_THRESHOLD,
            palette_trigger_level: consts::PALETTE_TRIGGER_LEVEL,
            band_reference: consts::BAND_REFERENCE,
            yield_interval_ms: consts::YIELD_MS,
            read_poll_ms: consts::READ_POLL_MS,
            stall_timeout_ms: consts::STALL_TIMEOUT_MS,
            max_read_retries: 0,
            stream_queue_depth: consts::STREAM_QUEUE_DEPTH,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_bytes < 2 || self.window_bytes % 2 != 0 {
            return Err(CaptureError::InvalidConfig(format!(
                "window_bytes must be even and at least 2 (got {})",
                self.window_bytes
            )));
        }
        if self.bar_max <= 0 {
            return Err(CaptureError::InvalidConfig(format!(
                "bar_max must be positive (got {})",
                self.bar_max
            )));
        }
        if !(0.0..1.0).contains(&self.noise_floor) {
            return Err(CaptureError::InvalidConfig(format!(
                "noise_floor must lie in [0, 1) (got {})",
                self.noise_floor
            )));
        }
        if !(0..=self.bar_max).contains(&self.palette_trigger_level) {
            return Err(CaptureError::InvalidConfig(format!(
                "palette_trigger_level must lie in [0, {}] (got {})",
                self.bar_max, self.palette_trigger_level
            )));
        }
        if !(self.band_reference.is_finite() && self.band_reference > 0.0) {
            return Err(CaptureError::InvalidConfig(format!(
                "band_reference must be positive (got {})",
                self.band_reference
            )));
        }
        if self.stall_timeout_ms != 0 && self.stall_timeout_ms < self.read_poll_ms {
            return Err(CaptureError::InvalidConfig(format!(
                "stall_timeout_ms must be 0 or at least read_poll_ms (got {} < {})",
                self.stall_timeout_ms, self.read_poll_ms
            )));
        }
        if self.stream_queue_depth == 0 {
            return Err(CaptureError::InvalidConfig(
                "stream_queue_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn yield_interval(&self) -> Duration {
        Duration::from_millis(self.yield_interval_ms)
    }

    pub fn read_poll(&self) -> Duration {
        Duration::from_millis(self.read_poll_ms)
    }

    /// `None` when stall detection is off.
    pub fn stall_timeout(&self) -> Option<Duration> {
        (self.stall_timeout_ms > 0).then(|| Duration::from_millis(self.stall_timeout_ms))
    }
}
