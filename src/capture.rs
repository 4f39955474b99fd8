//! The capture loop: a dedicated worker pulling sample windows from a source
//! and emitting commands for every one of them.

use std::io::{ErrorKind, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use log::{debug, error, info, trace, warn};

use crate::audio::SampleWindow;
use crate::command::{Command, CommandSink, StopReason};
use crate::config::PipelineConfig;
use crate::control::ControlSurface;
use crate::controller::SignalController;
use crate::error::{CaptureError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureState {
    Stopped,
    Running,
}

type Sinks = Arc<Vec<Box<dyn CommandSink>>>;

struct Session {
    stop: Arc<AtomicBool>,
    worker: JoinHandle<StopReason>,
}

pub struct CaptureLoop {
    config: PipelineConfig,
    controls: Arc<ControlSurface>,
    sinks: Sinks,
    running: Arc<AtomicBool>,
    session: Option<Session>,
}

impl CaptureLoop {
    pub fn new(
        config: PipelineConfig,
        controls: Arc<ControlSurface>,
        sinks: Vec<Box<dyn CommandSink>>,
    ) -> Self {
        Self {
            config,
            controls,
            sinks: Arc::new(sinks),
            running: Arc::new(AtomicBool::new(false)),
            session: None,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn controls(&self) -> &Arc<ControlSurface> {
        &self.controls
    }

    pub fn state(&self) -> CaptureState {
        if self.running.load(Ordering::Acquire) {
            CaptureState::Running
        } else {
            CaptureState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == CaptureState::Running
    }

    /// Opens a source with `open` and starts a session on it.
    ///
    /// Any failure to open is reported as [`CaptureError::SourceUnavailable`]
    /// and leaves the loop stopped.
    pub fn start<S, F>(&mut self, open: F) -> Result<()>
    where
        S: Read + Send + 'static,
        F: FnOnce() -> Result<S>,
    {
        if self.is_running() {
            return Err(CaptureError::AlreadyRunning);
        }
        // a session that ended on its own still has a worker to join
        if let Some(reason) = self.reap() {
            debug!("Previous session had ended: {reason:?}");
        }

        self.config.validate()?;

        let source = open().map_err(|err| match err {
            CaptureError::SourceUnavailable(reason) => CaptureError::SourceUnavailable(reason),
            other => CaptureError::SourceUnavailable(other.to_string()),
        })?;

        let stop = Arc::new(AtomicBool::new(false));
        self.running.store(true, Ordering::Release);

        let worker = {
            let config = self.config.clone();
            let controls = self.controls.clone();
            let sinks = self.sinks.clone();
            let stop = stop.clone();
            let running = self.running.clone();

            thread::Builder::new()
                .name("deejfx-capture".to_string())
                .spawn(move || run_session(source, &config, &controls, &sinks, &stop, &running))
        };

        match worker {
            Ok(worker) => {
                info!("Capture started");
                self.session = Some(Session { stop, worker });
                Ok(())
            }
            Err(err) => {
                self.running.store(false, Ordering::Release);
                Err(CaptureError::Io(err))
            }
        }
    }

    /// Requests stop and waits for the worker. Returns why the session ended,
    /// or `None` when there was no session.
    pub fn stop(&mut self) -> Option<StopReason> {
        let session = self.session.as_ref()?;
        debug!("Signaling capture worker to stop...");
        session.stop.store(true, Ordering::Release);
        let reason = self.reap();
        info!("Capture stopped: {reason:?}");
        reason
    }

    /// Waits for the session to end on its own (end of stream or read failure).
    pub fn wait(&mut self) -> Option<StopReason> {
        self.reap()
    }

    fn reap(&mut self) -> Option<StopReason> {
        let session = self.session.take()?;
        let reason = match session.worker.join() {
            Ok(reason) => reason,
            Err(_) => {
                error!("Capture worker panicked");
                self.running.store(false, Ordering::Release);
                StopReason::ReadFailed("capture worker panicked".to_string())
            }
        };
        Some(reason)
    }
}

impl Drop for CaptureLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn emit_all(sinks: &Sinks, command: Command) {
    if let Some((last, rest)) = sinks.split_last() {
        for sink in rest {
            sink.emit(command.clone());
        }
        last.emit(command);
    }
}

/// Counts one more consecutive read failure.
fn retries_exhausted(failures: &mut u32, limit: u32) -> bool {
    *failures = failures.saturating_add(1);
    *failures > limit
}

fn run_session<S: Read>(
    mut source: S,
    config: &PipelineConfig,
    controls: &ControlSurface,
    sinks: &Sinks,
    stop: &AtomicBool,
    running: &AtomicBool,
) -> StopReason {
    debug!("Capture worker started");
    let mut window = SampleWindow::new(config.window_bytes);
    let mut controller = SignalController::new(config);
    let pause = config.yield_interval();
    let stall_timeout = config.stall_timeout();
    let mut failures = 0u32;
    let mut shown = 0;
    let mut last_audio = Instant::now();

    let reason = loop {
        if stop.load(Ordering::Acquire) {
            break StopReason::Requested;
        }

        match window.read(&mut source) {
            Ok(reading) if reading.is_end_of_stream() => {
                info!("Sample source exhausted");
                break StopReason::EndOfStream;
            }
            Ok(reading) => {
                failures = 0;
                last_audio = Instant::now();
                let output = controller.process(reading.intensity, &controls.snapshot());
                shown = output.signal;
                trace!(
                    "intensity={:.4} signal={} commands={}",
                    reading.intensity,
                    output.signal,
                    output.commands.len()
                );
                for command in output.commands {
                    emit_all(sinks, command);
                }
            }
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                trace!("No audio within poll window");
                // meter drops to 0 while no audio arrives
                if shown != 0 {
                    shown = 0;
                    emit_all(sinks, Command::SetDisplaySignal(0));
                }
                if stall_timeout.is_some_and(|timeout| last_audio.elapsed() >= timeout) {
                    warn!("No audio for {:?}, ending capture", last_audio.elapsed());
                    break StopReason::Stalled;
                }
                continue;
            }
            Err(err) => {
                if retries_exhausted(&mut failures, config.max_read_retries) {
                    error!("Read failed, ending capture: {err}");
                    break StopReason::ReadFailed(err.to_string());
                }
                warn!(
                    "Read failed ({failures}/{}), retrying: {err}",
                    config.max_read_retries
                );
            }
        }

        if !pause.is_zero() {
            thread::sleep(pause);
        }
    };

    drop(source);
    running.store(false, Ordering::Release);
    emit_all(sinks, Command::SetDisplaySignal(0));
    emit_all(sinks, Command::SessionEnded(reason.clone()));
    debug!("Capture worker shutting down");
    reason
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandDispatcher;
    use std::io::{self, Cursor};
    use std::time::Duration;

    fn pcm(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    fn fast_config() -> PipelineConfig {
        PipelineConfig {
            window_bytes: 4,
            yield_interval_ms: 0,
            ..PipelineConfig::default()
        }
    }

    struct Quiet;

    impl Read for Quiet {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            thread::sleep(Duration::from_millis(1));
            Err(ErrorKind::WouldBlock.into())
        }
    }

    #[test]
    fn open_failure_leaves_loop_stopped() {
        let mut capture = CaptureLoop::new(
            fast_config(),
            Arc::new(ControlSurface::default()),
            Vec::new(),
        );
        let result = capture.start(|| -> Result<Cursor<Vec<u8>>> {
            Err(CaptureError::SourceUnavailable("no microphone".to_string()))
        });
        assert!(matches!(result, Err(CaptureError::SourceUnavailable(_))));
        assert_eq!(capture.state(), CaptureState::Stopped);
        assert_eq!(capture.stop(), None);
    }

    #[test]
    fn second_start_is_rejected() {
        let mut capture = CaptureLoop::new(
            fast_config(),
            Arc::new(ControlSurface::default()),
            Vec::new(),
        );
        capture.start(|| Ok(Quiet)).unwrap();
        assert!(matches!(
            capture.start(|| Ok(Quiet)),
            Err(CaptureError::AlreadyRunning)
        ));
        assert_eq!(capture.stop(), Some(StopReason::Requested));
        assert_eq!(capture.state(), CaptureState::Stopped);
    }

    #[test]
    fn end_of_stream_stops_and_resets_display() {
        let (sender, dispatcher) = CommandDispatcher::channel();
        let mut capture = CaptureLoop::new(
            fast_config(),
            Arc::new(ControlSurface::new(100)),
            vec![Box::new(sender)],
        );
        let source = Cursor::new(pcm(&[16384, 0, 8192, 0]));
        capture.start(move || Ok(source)).unwrap();

        assert_eq!(capture.wait(), Some(StopReason::EndOfStream));
        assert_eq!(capture.state(), CaptureState::Stopped);
        let commands: Vec<Command> = dispatcher_commands(&dispatcher);
        assert_eq!(
            commands,
            vec![
                Command::SetDisplaySignal(500),
                Command::SetDisplaySignal(250),
                Command::SetDisplaySignal(0),
                Command::SessionEnded(StopReason::EndOfStream),
            ]
        );
    }

    fn dispatcher_commands(dispatcher: &CommandDispatcher) -> Vec<Command> {
        #[derive(Default)]
        struct Recorder(Vec<Command>);
        impl crate::command::SignalDisplay for Recorder {
            fn set_display_signal(&mut self, value: i32) {
                self.0.push(Command::SetDisplaySignal(value));
            }
            fn session_ended(&mut self, reason: &StopReason) {
                self.0.push(Command::SessionEnded(reason.clone()));
            }
        }
        let mut recorder = Recorder::default();
        dispatcher.dispatch_pending(&mut recorder, None);
        recorder.0
    }

    #[test]
    fn failure_count_saturates_at_the_retry_ceiling() {
        let mut failures = u32::MAX - 1;
        assert!(!retries_exhausted(&mut failures, u32::MAX));
        assert!(!retries_exhausted(&mut failures, u32::MAX));
        assert_eq!(failures, u32::MAX);

        let mut failures = 0;
        assert!(!retries_exhausted(&mut failures, 1));
        assert!(retries_exhausted(&mut failures, 1));
    }

    #[test]
    fn read_error_ends_session() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::other("device unplugged"))
            }
        }

        let mut capture = CaptureLoop::new(
            fast_config(),
            Arc::new(ControlSurface::default()),
            Vec::new(),
        );
        capture.start(|| Ok(Broken)).unwrap();
        assert_eq!(
            capture.wait(),
            Some(StopReason::ReadFailed("device unplugged".to_string()))
        );
        assert_eq!(capture.state(), CaptureState::Stopped);
    }
}
