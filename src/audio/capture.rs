// Capture - fixed-length microphone recording
//
// The cpal callback runs on the audio thread and only pushes the first
// channel of every frame into a lock-free ring buffer. The recording thread
// drains the ring until the requested number of samples has arrived, then
// converts the clip to the analysis rate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};

use crate::audio::resample::resample_mono;
use crate::error::AudioError;

/// Longest recording accepted, in seconds
pub const MAX_RECORD_SECONDS: f32 = 600.0;

/// Poll interval while draining the ring buffer
const DRAIN_INTERVAL: Duration = Duration::from_millis(20);

/// Extra wall-clock time allowed past the requested duration
const STALL_GRACE: Duration = Duration::from_secs(2);

/// Number of samples in `seconds` of audio at `sample_rate`
pub fn expected_samples(seconds: f32, sample_rate: u32) -> usize {
    (seconds as f64 * sample_rate as f64).round() as usize
}

/// Push the first channel of an interleaved block into the ring
///
/// # Returns
/// Number of samples dropped because the ring was full
pub fn push_first_channel<T>(data: &[T], channels: usize, producer: &mut rtrb::Producer<f32>) -> usize
where
    T: Sample,
    f32: FromSample<T>,
{
    let channels = channels.max(1);
    let mut dropped = 0;
    for frame in data.chunks(channels) {
        let value = frame.first().map_or(0.0, |&s| f32::from_sample(s));
        if producer.push(value).is_err() {
            dropped += 1;
        }
    }
    dropped
}

/// Blocking microphone recorder
#[derive(Debug, Clone)]
pub struct Recorder {
    seconds: f32,
    target_rate: u32,
}

impl Recorder {
    /// Create a recorder
    ///
    /// # Arguments
    /// * `seconds` - Recording length, in (0, MAX_RECORD_SECONDS]
    /// * `target_rate` - Rate of the returned clip
    pub fn new(seconds: f32, target_rate: u32) -> Result<Self, AudioError> {
        if !(seconds > 0.0 && seconds <= MAX_RECORD_SECONDS) {
            return Err(AudioError::InvalidDuration { seconds });
        }
        if target_rate == 0 {
            return Err(AudioError::InvalidSampleRate {
                sample_rate: target_rate,
            });
        }
        Ok(Self {
            seconds,
            target_rate,
        })
    }

    pub fn seconds(&self) -> f32 {
        self.seconds
    }

    pub fn target_rate(&self) -> u32 {
        self.target_rate
    }

    /// Record from the default input device
    ///
    /// Blocks for roughly `seconds`. The returned clip is mono at
    /// `target_rate`.
    pub fn record(&self) -> Result<Vec<f32>, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| AudioError::StreamOpenFailed {
                reason: "No default input device found".to_string(),
            })?;

        let config = device
            .default_input_config()
            .map_err(|e| AudioError::StreamOpenFailed {
                reason: format!("Failed to get default input config: {:?}", e),
            })?;

        let stream_config: cpal::StreamConfig = config.clone().into();
        let device_rate = stream_config.sample_rate.0;
        let expected = expected_samples(self.seconds, device_rate);

        log::info!(
            "[Recorder] Recording {:.1}s @ {}Hz ({} channels, {:?})",
            self.seconds,
            device_rate,
            stream_config.channels,
            config.sample_format()
        );

        let capacity = (device_rate as usize).max(expected.min(device_rate as usize * 4));
        let (producer, mut consumer) = rtrb::RingBuffer::<f32>::new(capacity);
        let failed = Arc::new(AtomicBool::new(false));

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                build_input_stream::<f32>(&device, &stream_config, producer, failed.clone())
            }
            cpal::SampleFormat::I16 => {
                build_input_stream::<i16>(&device, &stream_config, producer, failed.clone())
            }
            cpal::SampleFormat::U16 => {
                build_input_stream::<u16>(&device, &stream_config, producer, failed.clone())
            }
            other => {
                return Err(AudioError::StreamOpenFailed {
                    reason: format!("Unsupported input sample format {:?}", other),
                })
            }
        }?;

        stream.play().map_err(|e| AudioError::StreamOpenFailed {
            reason: format!("{:?}", e),
        })?;

        let deadline = Duration::from_secs_f32(self.seconds) + STALL_GRACE;
        let started = Instant::now();
        let mut samples = Vec::with_capacity(expected);

        while samples.len() < expected {
            while let Ok(sample) = consumer.pop() {
                samples.push(sample);
            }
            if samples.len() >= expected || started.elapsed() > deadline {
                break;
            }
            thread::sleep(DRAIN_INTERVAL);
        }
        drop(stream);

        if samples.len() < expected {
            log::warn!(
                "[Recorder] Capture stalled: {} of {} samples",
                samples.len(),
                expected
            );
        }
        samples.truncate(expected);

        if samples.is_empty() {
            if failed.load(Ordering::Acquire) {
                return Err(AudioError::HardwareError {
                    details: "input stream reported an error before any audio arrived".to_string(),
                });
            }
            return Err(AudioError::NoAudioCaptured);
        }

        resample_mono(&samples, device_rate, self.target_rate)
    }
}

fn build_input_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut producer: rtrb::Producer<f32>,
    failed: Arc<AtomicBool>,
) -> Result<cpal::Stream, AudioError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = config.channels as usize;
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                push_first_channel(data, channels, &mut producer);
            },
            move |err| {
                tracing::error!("[Recorder] Input stream error: {}", err);
                failed.store(true, Ordering::Release);
            },
            None,
        )
        .map_err(|e| AudioError::StreamOpenFailed {
            reason: format!("{:?}", e),
        })
}
