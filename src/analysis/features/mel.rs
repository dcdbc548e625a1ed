// Mel module - Mel filterbank construction
//
// Triangular filters on the Slaney mel scale (linear below 1 kHz,
// logarithmic above), each normalized to unit area so that wide
// high-frequency bands do not dominate.
//
// References:
// - Slaney, M. (1998). Auditory Toolbox, Technical Report #1998-010

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;
const MIN_LOG_MEL: f64 = MIN_LOG_HZ / F_SP;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Convert Hz to mels (Slaney scale)
pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

/// Convert mels to Hz (Slaney scale)
pub fn mel_to_hz(mel: f64) -> f64 {
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (log_step() * (mel - MIN_LOG_MEL)).exp()
    } else {
        mel * F_SP
    }
}

/// Mel filterbank mapping a power spectrum onto mel bands
pub struct MelFilterbank {
    n_mels: usize,
    n_bins: usize,
    /// n_mels × n_bins weights, row-major
    weights: Vec<f32>,
    /// Non-zero bin range of each filter
    support: Vec<(usize, usize)>,
}

impl MelFilterbank {
    /// Build filters covering 0 Hz to Nyquist
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `n_fft` - FFT size the spectra were computed with
    /// * `n_mels` - Number of mel bands
    pub fn new(sample_rate: u32, n_fft: usize, n_mels: usize) -> Self {
        let n_bins = n_fft / 2 + 1;
        let sr = sample_rate as f64;

        let fft_freqs: Vec<f64> = (0..n_bins).map(|k| k as f64 * sr / n_fft as f64).collect();

        let mel_min = hz_to_mel(0.0);
        let mel_max = hz_to_mel(sr / 2.0);
        let mel_freqs: Vec<f64> = (0..n_mels + 2)
            .map(|i| mel_min + (mel_max - mel_min) * i as f64 / (n_mels + 1) as f64)
            .map(mel_to_hz)
            .collect();

        let mut weights = vec![0.0f32; n_mels * n_bins];
        let mut support = Vec::with_capacity(n_mels);

        for m in 0..n_mels {
            let (left, center, right) = (mel_freqs[m], mel_freqs[m + 1], mel_freqs[m + 2]);
            let enorm = 2.0 / (right - left);

            let mut first = n_bins;
            let mut last = 0;
            for (k, &f) in fft_freqs.iter().enumerate() {
                let lower = (f - left) / (center - left);
                let upper = (right - f) / (right - center);
                let w = lower.min(upper).max(0.0);
                if w > 0.0 {
                    weights[m * n_bins + k] = (w * enorm) as f32;
                    first = first.min(k);
                    last = k + 1;
                }
            }

            if first >= last {
                log::warn!("[MelFilterbank] Band {} has no FFT bins; try fewer mels", m);
                support.push((0, 0));
            } else {
                support.push((first, last));
            }
        }

        Self {
            n_mels,
            n_bins,
            weights,
            support,
        }
    }

    pub fn n_mels(&self) -> usize {
        self.n_mels
    }

    /// Weights of one filter across all FFT bins
    pub fn filter(&self, mel: usize) -> &[f32] {
        &self.weights[mel * self.n_bins..(mel + 1) * self.n_bins]
    }

    /// Project one power spectrum frame onto the mel bands
    ///
    /// # Arguments
    /// * `power` - Power spectrum (n_fft / 2 + 1 bins)
    /// * `out` - Destination, one value per mel band
    pub fn apply(&self, power: &[f32], out: &mut [f32]) {
        for (m, slot) in out.iter_mut().enumerate().take(self.n_mels) {
            let (first, last) = self.support[m];
            let filter = self.filter(m);
            *slot = (first..last).map(|k| filter[k] * power[k]).sum();
        }
    }
}
