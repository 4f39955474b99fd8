use std::io::{self, Read};
use std::time::Duration;

use anyhow::anyhow;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded, never};
use log::{debug, error, info, trace, warn};

use crate::config::PipelineConfig;

/// Live input stream on the default device. Audio keeps flowing into the
/// paired [`StreamReader`] until this is dropped.
pub struct AudioStream {
    _stream: cpal::Stream,
    device_name: String,
}

impl AudioStream {
    pub fn open(config: &PipelineConfig) -> Result<(Self, StreamReader), anyhow::Error> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow!("No audio input device available"))?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let supported_config = device.default_input_config()?;
        let sample_format = supported_config.sample_format();
        let mut stream_config: cpal::StreamConfig = supported_config.into();

        if supports_rate(&device, &stream_config, sample_format, config.sample_rate) {
            stream_config.sample_rate = cpal::SampleRate(config.sample_rate);
        } else {
            warn!(
                "{device_name} cannot capture at {} Hz, using {} Hz",
                config.sample_rate, stream_config.sample_rate.0
            );
        }

        debug!(
            "Opening {device_name}: {:?}, {} channel(s), {} Hz",
            sample_format, stream_config.channels, stream_config.sample_rate.0
        );

        let (sender, receiver) = bounded(config.stream_queue_depth);
        let (fault_sender, faults) = bounded(1);
        let stream = match sample_format {
            SampleFormat::F32 => {
                build_stream::<f32>(&device, &stream_config, sender, fault_sender)?
            }
            SampleFormat::I16 => {
                build_stream::<i16>(&device, &stream_config, sender, fault_sender)?
            }
            SampleFormat::U16 => {
                build_stream::<u16>(&device, &stream_config, sender, fault_sender)?
            }
            _ => return Err(anyhow!("Unsupported sample format {sample_format:?}")),
        };

        stream.play()?;
        info!("Listening on {device_name}");

        Ok((
            Self {
                _stream: stream,
                device_name,
            },
            StreamReader::new(receiver, config.read_poll()).with_faults(faults),
        ))
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }
}

fn supports_rate(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    sample_format: SampleFormat,
    rate: u32,
) -> bool {
    device
        .supported_input_configs()
        .map(|mut ranges| {
            ranges.any(|range| {
                range.channels() == config.channels
                    && range.sample_format() == sample_format
                    && range.min_sample_rate().0 <= rate
                    && rate <= range.max_sample_rate().0
            })
        })
        .unwrap_or(false)
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    sender: Sender<Vec<u8>>,
    faults: Sender<String>,
) -> Result<cpal::Stream, anyhow::Error>
where
    T: Sample + cpal::SizedSample,
    i16: FromSample<T>,
{
    // first channel only: the pipeline is mono
    let channels = usize::from(config.channels.max(1));

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            let bytes: Vec<u8> = data
                .iter()
                .step_by(channels)
                .flat_map(|&s| s.to_sample::<i16>().to_le_bytes())
                .collect();
            if bytes.is_empty() {
                return;
            }
            // the callback must not block, so a full queue drops this chunk
            match sender.try_send(bytes) {
                Ok(()) => {}
                Err(TrySendError::Full(bytes)) => {
                    trace!("Audio queue full, dropped {} bytes", bytes.len())
                }
                Err(TrySendError::Disconnected(_)) => {}
            }
        },
        move |err| {
            error!("Stream error: {err}");
            // only the first fault matters to the reader
            let _ = faults.try_send(err.to_string());
        },
        None,
    )?;

    Ok(stream)
}

/// Blocking byte source over the device feed, 16-bit LE mono.
///
/// Waits at most one poll interval per read and then reports
/// [`io::ErrorKind::WouldBlock`], so a reader can notice a stop request while
/// the device is quiet. Returns `Ok(0)` once the stream is gone, and an
/// [`io::ErrorKind::Other`] error once the device reports a fault.
pub struct StreamReader {
    receiver: Receiver<Vec<u8>>,
    faults: Receiver<String>,
    pending: Vec<u8>,
    offset: usize,
    poll: Duration,
}

impl StreamReader {
    pub fn new(receiver: Receiver<Vec<u8>>, poll: Duration) -> Self {
        Self {
            receiver,
            faults: never(),
            pending: Vec::new(),
            offset: 0,
            poll,
        }
    }

    /// Device faults arriving on `faults` fail the next read.
    pub fn with_faults(mut self, faults: Receiver<String>) -> Self {
        self.faults = faults;
        self
    }
}

impl Read for StreamReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if let Ok(fault) = self.faults.try_recv() {
            return Err(io::Error::other(fault));
        }

        while self.offset >= self.pending.len() {
            match self.receiver.recv_timeout(self.poll) {
                Ok(chunk) => {
                    self.pending = chunk;
                    self.offset = 0;
                }
                Err(RecvTimeoutError::Timeout) => return Err(io::ErrorKind::WouldBlock.into()),
                Err(RecvTimeoutError::Disconnected) => return Ok(0),
            }
        }

        let available = &self.pending[self.offset..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.offset += n;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_across_chunks() {
        let (sender, receiver) = bounded(4);
        let mut reader = StreamReader::new(receiver, Duration::from_millis(10));
        sender.send(vec![1, 2, 3]).unwrap();
        sender.send(vec![4, 5]).unwrap();

        let mut buf = [0u8; 2];
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
        assert_eq!(buf, [1, 2]);
        assert_eq!(reader.read(&mut buf).unwrap(), 1);
        assert_eq!(buf[0], 3);
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
        assert_eq!(buf, [4, 5]);
    }

    #[test]
    fn quiet_feed_would_block() {
        let (_sender, receiver) = bounded::<Vec<u8>>(1);
        let mut reader = StreamReader::new(receiver, Duration::from_millis(5));
        let err = reader.read(&mut [0u8; 4]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WouldBlock);
    }

    #[test]
    fn closed_feed_is_end_of_stream() {
        let (sender, receiver) = bounded(1);
        let mut reader = StreamReader::new(receiver, Duration::from_millis(5));
        sender.send(vec![9, 9]).unwrap();
        drop(sender);

        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
        assert_eq!(reader.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn device_fault_fails_the_read() {
        let (sender, receiver) = bounded(2);
        let (fault_sender, faults) = bounded(1);
        let mut reader =
            StreamReader::new(receiver, Duration::from_millis(5)).with_faults(faults);
        sender.send(vec![1, 0]).unwrap();
        fault_sender.send("device unplugged".to_string()).unwrap();

        let err = reader.read(&mut [0u8; 4]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert_eq!(err.to_string(), "device unplugged");
    }

    #[test]
    fn empty_chunks_are_skipped() {
        let (sender, receiver) = bounded(2);
        let mut reader = StreamReader::new(receiver, Duration::from_millis(5));
        sender.send(Vec::new()).unwrap();
        sender.send(vec![7, 0]).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf).unwrap(), 2);
    }
}
