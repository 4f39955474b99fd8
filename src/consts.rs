/// Sample rate in Hz the input stream is negotiated at.
/// Only used to size the byte feed; the pipeline itself is rate agnostic.
pub const SAMPLE_RATE: u32 = 44100;

/// Bytes pulled from the source per iteration. Two bytes per sample,
/// so 2048 bytes at 44.1kHz mono = 1024 samples = ~23ms of audio
pub const WINDOW_BYTES: usize = 2048;

/// Full scale of the meter. Scaled signals are clamped to 0..=BAR_MAX.
pub const BAR_MAX: i32 = 1000;

/// Peak intensity (0.0 - 1.0) at or below which a window counts as silence.
/// Keeps constant low-level hiss from moving the meter.
pub const INTENSITY_THRESHOLD: f64 = 0.01;

/// Scaled signal above which the palette trigger fires.
pub const PALETTE_TRIGGER_LEVEL: i32 = 700;

/// Reference the band percentages are taken against.
/// At 100 the band key equals the scaled signal.
pub const BAND_REFERENCE: f64 = 100.0;

/// Pause between iterations, in milliseconds.
pub const YIELD_MS: u64 = 2;

/// How long a read waits for audio before reporting an idle iteration.
pub const READ_POLL_MS: u64 = 50;

/// How long the loop may go without any audio before the session is ended.
pub const STALL_TIMEOUT_MS: u64 = 2000;

/// Sensitivity range as exposed on the control surface.
pub const SENSITIVITY_MIN: i32 = 0;
pub const SENSITIVITY_MAX: i32 = 10000;
pub const DEFAULT_SENSITIVITY: i32 = 50;

/// Sensitivity change per scroll notch.
pub const SENSITIVITY_STEP: i32 = 100;

/// Chunks of converted audio buffered between the device callback and the loop.
/// Older audio is never dropped; new chunks are discarded once this fills up.
pub const STREAM_QUEUE_DEPTH: usize = 64;
