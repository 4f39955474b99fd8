//! Audio level to actuator commands: sample windows are reduced to a peak
//! intensity, scaled by a sensitivity into a bounded signal, and mapped through
//! threshold bands onto rotation, contrast and palette commands.

pub mod analyzer;
pub mod audio;
pub mod bands;
pub mod capture;
pub mod command;
pub mod config;
pub mod consts;
pub mod control;
pub mod controller;
pub mod error;
pub mod hysteresis;
pub mod palette;

pub use analyzer::{IntensityScaler, MeterZone};
pub use bands::{Band, BandClassifier, BandTable, MissPolicy};
pub use capture::{CaptureLoop, CaptureState};
pub use command::{Actuator, Command, CommandDispatcher, CommandSink, SignalDisplay, StopReason};
pub use config::PipelineConfig;
pub use control::{Channel, ControlSnapshot, ControlSurface};
pub use controller::{ControllerOutput, SignalController};
pub use error::{CaptureError, Result};
pub use hysteresis::{GateState, HysteresisGate};
