use crate::analyzer::{IntensityScaler, MeterZone, clamp_signal};
use crate::bands::BandClassifier;
use crate::command::Command;
use crate::config::PipelineConfig;
use crate::control::{Channel, ControlSnapshot};
use crate::hysteresis::HysteresisGate;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ControllerOutput {
    /// Clamped scaled signal.
    pub signal: i32,
    pub zone: MeterZone,
    /// Display first, then rotation, contrast and palette as enabled.
    pub commands: Vec<Command>,
}

/// One iteration of intensity → commands. Owns the palette gate.
pub struct SignalController {
    scaler: IntensityScaler,
    classifier: BandClassifier,
    gate: HysteresisGate,
    bar_max: i32,
}

impl SignalController {
    pub fn new(config: &PipelineConfig) -> Self {
        Self::with_classifier(config, BandClassifier::new(config))
    }

    pub fn with_classifier(config: &PipelineConfig, classifier: BandClassifier) -> Self {
        Self {
            scaler: IntensityScaler::new(config.noise_floor),
            gate: HysteresisGate::new(classifier.trigger_level()),
            classifier,
            bar_max: config.bar_max,
        }
    }

    pub fn classifier(&self) -> &BandClassifier {
        &self.classifier
    }

    pub fn gate(&self) -> &HysteresisGate {
        &self.gate
    }

    pub fn reset(&mut self) {
        self.gate.reset();
    }

    pub fn signal_for(&self, intensity: f64, sensitivity: i32) -> i32 {
        let raw = self.scaler.scale(intensity, sensitivity, self.bar_max);
        clamp_signal(raw, self.bar_max)
    }

    pub fn process(&mut self, intensity: f64, controls: &ControlSnapshot) -> ControllerOutput {
        let signal = self.signal_for(intensity, controls.sensitivity);
        let mut commands = Vec::with_capacity(4);

        commands.push(Command::SetDisplaySignal(signal));

        if controls.rotation {
            commands.push(Command::ApplyRotation(
                self.classifier.classify_rotation(signal),
            ));
        }

        if controls.contrast {
            if let Some(multiplier) = self.classifier.classify_contrast(signal) {
                commands.push(Command::ApplyContrast(multiplier));
            }
        }

        if controls.color {
            if self.gate.update(signal) {
                commands.push(Command::TriggerPaletteChange);
            }
        } else {
            self.gate.reset();
        }

        ControllerOutput {
            signal,
            zone: MeterZone::for_signal(signal),
            commands,
        }
    }

    /// Command applied once when `channel` is switched on while capture is idle,
    /// using the last signal shown on the meter.
    pub fn preview(&self, channel: Channel, signal: i32) -> Option<Command> {
        let signal = clamp_signal(signal, self.bar_max);
        match channel {
            Channel::Rotation => Some(Command::ApplyRotation(
                self.classifier.classify_rotation(signal),
            )),
            Channel::Contrast => self
                .classifier
                .classify_contrast(signal)
                .map(Command::ApplyContrast),
            Channel::Color => self
                .classifier
                .color_triggered(signal)
                .then_some(Command::TriggerPaletteChange),
        }
    }
}
