use std::io::{self, Read};

const FULL_SCALE: f64 = 32768.0;

/// Outcome of one window read.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WindowReading {
    /// Peak absolute sample magnitude in the window, 0.0 - 1.0
    pub intensity: f64,
    pub bytes_read: usize,
}

impl WindowReading {
    pub fn is_end_of_stream(&self) -> bool {
        self.bytes_read == 0
    }
}

/// Reusable byte buffer the capture loop reads 16-bit LE mono audio into.
pub struct SampleWindow {
    buffer: Vec<u8>,
}

impl SampleWindow {
    /// Capacity is rounded down to a whole number of samples.
    pub fn new(capacity: usize) -> Self {
        let capacity = (capacity & !1).max(2);
        Self {
            buffer: vec![0; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Performs a single read from `source` and reduces whatever arrived to its
    /// peak intensity. Zero bytes means the source is exhausted.
    pub fn read<R: Read + ?Sized>(&mut self, source: &mut R) -> io::Result<WindowReading> {
        let bytes_read = loop {
            match source.read(&mut self.buffer) {
                Ok(n) => break n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        };

        Ok(WindowReading {
            intensity: peak_intensity(&self.buffer[..bytes_read]),
            bytes_read,
        })
    }
}

/// Peak of `|sample| / 32768` over little-endian i16 pairs.
/// An odd trailing byte is not part of any sample and is skipped.
pub fn peak_intensity(bytes: &[u8]) -> f64 {
    bytes
        .chunks_exact(2)
        .map(|pair| f64::from(i16::from_le_bytes([pair[0], pair[1]])).abs() / FULL_SCALE)
        .fold(0.0, f64::max)
}
