// FFT module - Short-time Fourier transform
//
// Frames the waveform with a periodic Hann window and returns the power
// spectrum of every frame. Framing is centered: the signal is padded with
// n_fft / 2 zeros on both sides, so frame t is centered on sample t * hop.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// FFT window size used for the mel spectrogram
pub const N_FFT: usize = 2048;

/// Hop between successive frames in samples
pub const HOP_LENGTH: usize = 512;

/// STFT processor producing power spectra.
///
/// The FFT plan and window are computed once; processing only borrows
/// `&self`, so one processor can serve any number of threads.
pub struct StftProcessor {
    fft: Arc<dyn Fft<f32>>,
    n_fft: usize,
    hop_length: usize,
    /// Periodic Hann window (pre-computed)
    window: Vec<f32>,
}

impl StftProcessor {
    /// Create a new STFT processor
    ///
    /// # Arguments
    /// * `n_fft` - FFT window size
    /// * `hop_length` - Samples between frame starts
    pub fn new(n_fft: usize, hop_length: usize) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(n_fft);

        // Periodic (not symmetric) Hann, as used for spectral analysis
        let window = (0..n_fft)
            .map(|i| {
                0.5 - 0.5 * ((2.0 * std::f64::consts::PI * i as f64) / n_fft as f64).cos()
            })
            .map(|w| w as f32)
            .collect();

        Self {
            fft,
            n_fft,
            hop_length,
            window,
        }
    }

    pub fn n_fft(&self) -> usize {
        self.n_fft
    }

    /// Number of frequency bins per frame (n_fft / 2 + 1)
    pub fn n_bins(&self) -> usize {
        self.n_fft / 2 + 1
    }

    /// Number of centered frames for a signal of `n_samples`
    pub fn frame_count(&self, n_samples: usize) -> usize {
        1 + n_samples / self.hop_length
    }

    /// Compute the power spectrogram |X|²
    ///
    /// # Returns
    /// One vector of `n_bins()` powers per frame, in time order
    pub fn power_spectrogram(&self, samples: &[f32]) -> Vec<Vec<f32>> {
        let n_frames = self.frame_count(samples.len());
        let half = (self.n_fft / 2) as isize;

        let mut buffer = vec![Complex::new(0.0f32, 0.0); self.n_fft];
        let mut scratch = vec![Complex::new(0.0f32, 0.0); self.fft.get_inplace_scratch_len()];
        let mut frames = Vec::with_capacity(n_frames);

        for t in 0..n_frames {
            let start = (t * self.hop_length) as isize - half;
            for (j, slot) in buffer.iter_mut().enumerate() {
                let idx = start + j as isize;
                let sample = if idx >= 0 && (idx as usize) < samples.len() {
                    samples[idx as usize]
                } else {
                    0.0
                };
                *slot = Complex::new(sample * self.window[j], 0.0);
            }

            self.fft.process_with_scratch(&mut buffer, &mut scratch);

            frames.push(buffer[..self.n_bins()].iter().map(|c| c.norm_sqr()).collect());
        }

        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count_is_centered() {
        let stft = StftProcessor::new(N_FFT, HOP_LENGTH);
        assert_eq!(stft.frame_count(0), 1);
        assert_eq!(stft.frame_count(511), 1);
        assert_eq!(stft.frame_count(512), 2);
        assert_eq!(stft.frame_count(22050), 44);
        assert_eq!(stft.frame_count(220500), 431);
    }

    #[test]
    fn test_window_is_periodic_hann() {
        let stft = StftProcessor::new(8, 2);
        assert_eq!(stft.window[0], 0.0);
        assert!((stft.window[4] - 1.0).abs() < 1e-6);
        // Periodic window: w[1] == w[7], and no trailing zero
        assert!((stft.window[1] - stft.window[7]).abs() < 1e-6);
        assert!(stft.window[7] > 0.0);
    }

    #[test]
    fn test_sine_peak_bin() {
        let sample_rate = 22050.0;
        let frequency = 1000.0;
        let signal: Vec<f32> = (0..8192)
            .map(|i| (2.0 * std::f32::consts::PI * frequency * i as f32 / sample_rate).sin())
            .collect();

        let stft = StftProcessor::new(N_FFT, HOP_LENGTH);
        let frames = stft.power_spectrogram(&signal);
        assert_eq!(frames.len(), stft.frame_count(signal.len()));
        assert_eq!(frames[0].len(), N_FFT / 2 + 1);

        // Middle frame is fully inside the signal
        let frame = &frames[frames.len() / 2];
        let (peak, _) = frame
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, &p)| if p > best.1 { (i, p) } else { best });

        // 1000 Hz * 2048 / 22050 ≈ 92.9
        assert!((92..=94).contains(&peak), "peak bin {}", peak);
    }

    #[test]
    fn test_silence_has_zero_power() {
        let stft = StftProcessor::new(N_FFT, HOP_LENGTH);
        let frames = stft.power_spectrogram(&[]);
        assert_eq!(frames.len(), 1);
        assert!(frames[0].iter().all(|&p| p == 0.0));
    }
}
