pub mod audio_stream;
pub mod sample_window;

pub use audio_stream::{AudioStream, StreamReader};
pub use sample_window::{SampleWindow, WindowReading, peak_intensity};
