use crate::consts;

/// Turns a window's peak intensity into the integer control signal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntensityScaler {
    noise_floor: f64,
}

impl Default for IntensityScaler {
    fn default() -> Self {
        Self::new(consts::INTENSITY_THRESHOLD)
    }
}

impl IntensityScaler {
    pub fn new(noise_floor: f64) -> Self {
        Self { noise_floor }
    }

    pub fn noise_floor(&self) -> f64 {
        self.noise_floor
    }

    /// `round(intensity * bar_max * sensitivity / 100)`, or 0 at or below the
    /// noise floor. The result is not clamped; see [`clamp_signal`].
    pub fn scale(&self, intensity: f64, sensitivity: i32, bar_max: i32) -> i32 {
        if !intensity.is_finite() || intensity <= self.noise_floor {
            return 0;
        }

        let sensitivity = f64::from(sensitivity.max(0));
        let raw = (intensity * f64::from(bar_max) * sensitivity / 100.0).round();

        // `as` saturates, so an absurd product cannot wrap negative
        raw as i32
    }
}

/// Bounds a raw scaled value to the meter range.
pub fn clamp_signal(raw: i32, bar_max: i32) -> i32 {
    raw.clamp(0, bar_max.max(0))
}

/// Colour band of the level meter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MeterZone {
    #[default]
    Idle,
    Normal,
    Warm,
    Hot,
}

impl MeterZone {
    pub fn for_signal(signal: i32) -> Self {
        match signal {
            i32::MIN..=9 => MeterZone::Idle,
            10..=700 => MeterZone::Normal,
            701..=900 => MeterZone::Warm,
            _ => MeterZone::Hot,
        }
    }
}
