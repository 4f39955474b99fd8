//! Commands emitted by the capture loop and the seams they leave through.

use crossbeam_channel::{Receiver, Sender, TrySendError, unbounded};
use log::{trace, warn};

/// Why a capture session ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    Requested,
    EndOfStream,
    ReadFailed(String),
    /// No audio arrived within the configured stall timeout.
    Stalled,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Meter value in `0..=bar_max`.
    SetDisplaySignal(i32),
    /// Rotate the target by this many degrees.
    ApplyRotation(i32),
    /// Display range multiplier in `0.0..=1.0`.
    ApplyContrast(f64),
    TriggerPaletteChange,
    /// Last command of every session.
    SessionEnded(StopReason),
}

/// Destination of emitted commands. Implementations must not block.
pub trait CommandSink: Send + Sync {
    fn emit(&self, command: Command);
}

impl CommandSink for Sender<Command> {
    fn emit(&self, command: Command) {
        match self.try_send(command) {
            Ok(()) => {}
            Err(TrySendError::Full(command)) => {
                warn!("Command queue full, dropping {command:?}");
            }
            Err(TrySendError::Disconnected(command)) => {
                trace!("No receiver for {command:?}");
            }
        }
    }
}

/// Whatever the rotation, contrast and palette commands are applied to.
pub trait Actuator {
    fn apply_rotation(&mut self, degrees: i32);
    fn apply_contrast(&mut self, multiplier: f64);
    fn trigger_palette_change(&mut self);
}

/// Consumer of the meter value and session lifecycle.
pub trait SignalDisplay {
    fn set_display_signal(&mut self, value: i32);
    fn session_ended(&mut self, reason: &StopReason);
}

/// Routes one command. Actuator commands are dropped when no actuator is bound.
pub fn dispatch(
    command: Command,
    display: &mut dyn SignalDisplay,
    actuator: Option<&mut dyn Actuator>,
) {
    match command {
        Command::SetDisplaySignal(value) => display.set_display_signal(value),
        Command::SessionEnded(reason) => display.session_ended(&reason),
        command => match actuator {
            Some(actuator) => match command {
                Command::ApplyRotation(degrees) => actuator.apply_rotation(degrees),
                Command::ApplyContrast(multiplier) => actuator.apply_contrast(multiplier),
                Command::TriggerPaletteChange => actuator.trigger_palette_change(),
                Command::SetDisplaySignal(_) | Command::SessionEnded(_) => {}
            },
            None => trace!("No actuator bound, dropping {command:?}"),
        },
    }
}

/// Receiving end of the command queue, drained from the UI thread.
pub struct CommandDispatcher {
    receiver: Receiver<Command>,
}

impl CommandDispatcher {
    pub fn new(receiver: Receiver<Command>) -> Self {
        Self { receiver }
    }

    /// Unbounded queue: the loop never waits on a slow consumer.
    pub fn channel() -> (Sender<Command>, Self) {
        let (sender, receiver) = unbounded();
        (sender, Self::new(receiver))
    }

    /// Applies every queued command in emission order without blocking.
    /// Returns how many were handled.
    pub fn dispatch_pending(
        &self,
        display: &mut dyn SignalDisplay,
        mut actuator: Option<&mut dyn Actuator>,
    ) -> usize {
        let mut handled = 0;
        while let Ok(command) = self.receiver.try_recv() {
            let actuator = actuator.as_mut().map(|a| &mut **a as &mut dyn Actuator);
            dispatch(command, display, actuator);
            handled += 1;
        }
        handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Meter {
        value: i32,
        ended: Option<StopReason>,
    }

    impl SignalDisplay for Meter {
        fn set_display_signal(&mut self, value: i32) {
            self.value = value;
        }

        fn session_ended(&mut self, reason: &StopReason) {
            self.ended = Some(reason.clone());
        }
    }

    #[derive(Default)]
    struct Target {
        angle: i32,
        contrast: Option<f64>,
        palette_changes: usize,
    }

    impl Actuator for Target {
        fn apply_rotation(&mut self, degrees: i32) {
            self.angle += degrees;
        }

        fn apply_contrast(&mut self, multiplier: f64) {
            self.contrast = Some(multiplier);
        }

        fn trigger_palette_change(&mut self) {
            self.palette_changes += 1;
        }
    }

    #[test]
    fn routes_commands_in_order() {
        let (sender, dispatcher) = CommandDispatcher::channel();
        for command in [
            Command::SetDisplaySignal(650),
            Command::ApplyRotation(5),
            Command::ApplyContrast(0.65),
            Command::ApplyRotation(6),
            Command::TriggerPaletteChange,
            Command::SetDisplaySignal(0),
            Command::SessionEnded(StopReason::EndOfStream),
        ] {
            sender.emit(command);
        }

        let mut meter = Meter::default();
        let mut target = Target::default();
        let handled = dispatcher.dispatch_pending(&mut meter, Some(&mut target));

        assert_eq!(handled, 7);
        assert_eq!(meter.value, 0);
        assert_eq!(meter.ended, Some(StopReason::EndOfStream));
        assert_eq!(target.angle, 11);
        assert_eq!(target.contrast, Some(0.65));
        assert_eq!(target.palette_changes, 1);
    }

    #[test]
    fn absent_actuator_only_drops_actuator_commands() {
        let (sender, dispatcher) = CommandDispatcher::channel();
        sender.emit(Command::SetDisplaySignal(420));
        sender.emit(Command::ApplyRotation(4));
        sender.emit(Command::TriggerPaletteChange);

        let mut meter = Meter::default();
        assert_eq!(dispatcher.dispatch_pending(&mut meter, None), 3);
        assert_eq!(meter.value, 420);
    }

    #[test]
    fn emitting_without_receiver_does_not_panic() {
        let (sender, dispatcher) = CommandDispatcher::channel();
        drop(dispatcher);
        sender.emit(Command::SetDisplaySignal(1));
    }

    #[test]
    fn full_bounded_queue_drops_newest() {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        sender.emit(Command::SetDisplaySignal(1));
        sender.emit(Command::SetDisplaySignal(2));
        assert_eq!(receiver.try_recv(), Ok(Command::SetDisplaySignal(1)));
        assert!(receiver.try_recv().is_err());
    }
}
