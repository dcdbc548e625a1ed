// MelExtractor - log-mel feature extraction for confidence classification
//
// Turns a mono waveform into the fixed-shape log-mel matrix the classifier
// was trained on. Every analysis parameter is a constant matched to the
// trained model.
//
// Module organization:
// - types: FeatureMatrix and shape constants
// - fft: Centered STFT with periodic Hann window
// - mel: Slaney mel filterbank
// - db: Max-referenced power to dB conversion
// - mod.rs: Coordinator (MelExtractor)
//
// Pipeline:
// 1. Power spectrogram (n_fft 2048, hop 512, centered, zero padded)
// 2. 128-band mel projection (0 Hz to Nyquist)
// 3. dB relative to the clip's own peak, 80 dB floor
// 4. Right-pad with PAD_VALUE or keep only the first max_frames frames

mod db;
mod fft;
mod mel;
mod types;

pub use db::{power_to_db, AMIN, TOP_DB};
pub use fft::{HOP_LENGTH, N_FFT};
pub use mel::{hz_to_mel, mel_to_hz};
pub use types::{FeatureMatrix, DEFAULT_MAX_FRAMES, N_MELS, PAD_VALUE};

use crate::error::FeatureError;
use fft::StftProcessor;
use mel::MelFilterbank;

/// MelExtractor coordinates the log-mel pipeline for one sample rate
///
/// Construction precomputes the FFT plan, window and filterbank. `extract`
/// only reads them, so one extractor can be shared across threads and
/// called concurrently.
pub struct MelExtractor {
    sample_rate: u32,
    stft: StftProcessor,
    filterbank: MelFilterbank,
}

impl MelExtractor {
    /// Create a new MelExtractor for the given sample rate
    ///
    /// # Errors
    /// `FeatureError::InvalidSampleRate` when `sample_rate` is 0
    pub fn new(sample_rate: u32) -> Result<Self, FeatureError> {
        if sample_rate == 0 {
            return Err(FeatureError::InvalidSampleRate { sample_rate });
        }

        Ok(Self {
            sample_rate,
            stft: StftProcessor::new(N_FFT, HOP_LENGTH),
            filterbank: MelFilterbank::new(sample_rate, N_FFT, N_MELS),
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of analysis frames a waveform of `n_samples` produces
    pub fn frame_count(&self, n_samples: usize) -> usize {
        self.stft.frame_count(n_samples)
    }

    /// Full log-mel spectrogram, before pad/truncate
    ///
    /// # Returns
    /// (values, frames): `N_MELS × frames` dB values, row-major by mel band
    pub fn log_mel_spectrogram(&self, samples: &[f32]) -> (Vec<f32>, usize) {
        let power_frames = self.stft.power_spectrogram(samples);
        let n_frames = power_frames.len();

        let mut mel_frame = vec![0.0f32; N_MELS];
        let mut mel_power = vec![0.0f32; N_MELS * n_frames];
        for (t, power) in power_frames.iter().enumerate() {
            self.filterbank.apply(power, &mut mel_frame);
            for (m, &value) in mel_frame.iter().enumerate() {
                mel_power[m * n_frames + t] = value;
            }
        }

        (power_to_db(&mel_power), n_frames)
    }

    /// Extract the fixed-shape feature matrix
    ///
    /// # Arguments
    /// * `samples` - Mono waveform (any length, including empty)
    /// * `max_frames` - Width of the output matrix
    ///
    /// # Returns
    /// `N_MELS × max_frames` matrix. Shorter clips are right-padded with
    /// `PAD_VALUE`; longer clips keep only their first `max_frames` frames.
    ///
    /// # Errors
    /// `FeatureError::InvalidFrameCount` when `max_frames` is 0,
    /// `FeatureError::NonFiniteSample` when any sample is NaN or infinite
    pub fn extract(&self, samples: &[f32], max_frames: usize) -> Result<FeatureMatrix, FeatureError> {
        if max_frames == 0 {
            return Err(FeatureError::InvalidFrameCount { max_frames });
        }
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(FeatureError::NonFiniteSample { index });
        }

        let (log_mel, n_frames) = self.log_mel_spectrogram(samples);

        // Padding after dB conversion: PAD_VALUE is peak level, not silence.
        let mut data = vec![PAD_VALUE; N_MELS * max_frames];
        let kept = n_frames.min(max_frames);
        for m in 0..N_MELS {
            let src = &log_mel[m * n_frames..m * n_frames + kept];
            data[m * max_frames..m * max_frames + kept].copy_from_slice(src);
        }

        tracing::debug!(
            samples = samples.len(),
            frames = n_frames,
            max_frames,
            "[MelExtractor] Extracted log-mel features"
        );

        Ok(FeatureMatrix::new(N_MELS, max_frames, n_frames, data))
    }
}

/// Extract a feature matrix in one call
///
/// Builds a throwaway `MelExtractor`; prefer keeping one around when
/// processing many clips at the same sample rate.
pub fn extract_features(
    samples: &[f32],
    sample_rate: u32,
    max_frames: usize,
) -> Result<FeatureMatrix, FeatureError> {
    MelExtractor::new(sample_rate)?.extract(samples, max_frames)
}
