//! Runtime controls shared between the control surface and the capture loop.
//!
//! The loop only ever reads these. Each value is an independent atomic, so a
//! write from the UI thread lands in whichever iteration reads it next.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use crate::consts;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    Rotation,
    Contrast,
    Color,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Rotation, Channel::Contrast, Channel::Color];

    pub fn label(self) -> &'static str {
        match self {
            Channel::Rotation => "Rotate",
            Channel::Contrast => "Contrast",
            Channel::Color => "Palette",
        }
    }
}

/// Values read once per iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlSnapshot {
    pub sensitivity: i32,
    pub rotation: bool,
    pub contrast: bool,
    pub color: bool,
}

impl ControlSnapshot {
    pub fn is_enabled(&self, channel: Channel) -> bool {
        match channel {
            Channel::Rotation => self.rotation,
            Channel::Contrast => self.contrast,
            Channel::Color => self.color,
        }
    }
}

impl Default for ControlSnapshot {
    fn default() -> Self {
        Self {
            sensitivity: consts::DEFAULT_SENSITIVITY,
            rotation: false,
            contrast: false,
            color: false,
        }
    }
}

#[derive(Debug)]
pub struct ControlSurface {
    sensitivity: AtomicI32,
    rotation: AtomicBool,
    contrast: AtomicBool,
    color: AtomicBool,
}

impl Default for ControlSurface {
    fn default() -> Self {
        Self::new(consts::DEFAULT_SENSITIVITY)
    }
}

impl ControlSurface {
    pub fn new(sensitivity: i32) -> Self {
        Self {
            sensitivity: AtomicI32::new(clamp_sensitivity(sensitivity)),
            rotation: AtomicBool::new(false),
            contrast: AtomicBool::new(false),
            color: AtomicBool::new(false),
        }
    }

    pub fn sensitivity(&self) -> i32 {
        self.sensitivity.load(Ordering::Relaxed)
    }

    pub fn set_sensitivity(&self, value: i32) {
        self.sensitivity
            .store(clamp_sensitivity(value), Ordering::Relaxed);
    }

    /// Moves sensitivity by `steps` scroll notches and returns the new value.
    pub fn nudge_sensitivity(&self, steps: i32) -> i32 {
        let delta = steps.saturating_mul(consts::SENSITIVITY_STEP);
        let update = |current: i32| Some(clamp_sensitivity(current.saturating_add(delta)));
        let previous = self
            .sensitivity
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, update)
            .unwrap_or_else(|prev| prev);
        clamp_sensitivity(previous.saturating_add(delta))
    }

    fn flag(&self, channel: Channel) -> &AtomicBool {
        match channel {
            Channel::Rotation => &self.rotation,
            Channel::Contrast => &self.contrast,
            Channel::Color => &self.color,
        }
    }

    pub fn is_channel_enabled(&self, channel: Channel) -> bool {
        self.flag(channel).load(Ordering::Relaxed)
    }

    pub fn set_channel_enabled(&self, channel: Channel, enabled: bool) {
        self.flag(channel).store(enabled, Ordering::Relaxed);
    }

    /// Switches every channel off, e.g. when the target goes away.
    pub fn disable_all_channels(&self) {
        for channel in Channel::ALL {
            self.set_channel_enabled(channel, false);
        }
    }

    pub fn snapshot(&self) -> ControlSnapshot {
        ControlSnapshot {
            sensitivity: self.sensitivity(),
            rotation: self.is_channel_enabled(Channel::Rotation),
            contrast: self.is_channel_enabled(Channel::Contrast),
            color: self.is_channel_enabled(Channel::Color),
        }
    }
}

fn clamp_sensitivity(value: i32) -> i32 {
    value.clamp(consts::SENSITIVITY_MIN, consts::SENSITIVITY_MAX)
}
