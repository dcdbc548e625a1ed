// Resample - sample rate conversion to the analysis rate
//
// Microphones and files come at whatever rate they like (44.1/48 kHz are
// typical); the classifier expects 22050 Hz. Conversion uses a windowed
// sinc interpolator over the whole clip in one pass.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use crate::error::AudioError;

/// Convert a mono clip from `from_hz` to `to_hz`
///
/// Identity when the rates match; empty input stays empty.
///
/// # Errors
/// `AudioError::InvalidSampleRate` if either rate is 0,
/// `AudioError::ResampleFailed` if the resampler cannot be built or run
pub fn resample_mono(samples: &[f32], from_hz: u32, to_hz: u32) -> Result<Vec<f32>, AudioError> {
    if from_hz == 0 {
        return Err(AudioError::InvalidSampleRate { sample_rate: from_hz });
    }
    if to_hz == 0 {
        return Err(AudioError::InvalidSampleRate { sample_rate: to_hz });
    }
    if from_hz == to_hz || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let ratio = to_hz as f64 / from_hz as f64;
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, samples.len(), 1)
        .map_err(|err| AudioError::ResampleFailed {
            reason: format!("{} Hz -> {} Hz: {}", from_hz, to_hz, err),
        })?;

    let waves_in = vec![samples.to_vec()];
    let mut waves_out =
        resampler
            .process(&waves_in, None)
            .map_err(|err| AudioError::ResampleFailed {
                reason: err.to_string(),
            })?;

    let output = waves_out.pop().ok_or_else(|| AudioError::ResampleFailed {
        reason: "resampler returned no output channels".to_string(),
    })?;

    tracing::debug!(
        from_hz,
        to_hz,
        input = samples.len(),
        output = output.len(),
        "[Resample] Converted clip"
    );

    Ok(output)
}
