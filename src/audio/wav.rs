// WAV helpers - saving recordings and reading stored clips

use std::path::Path;

use crate::error::AudioError;

/// Write a mono clip as 32-bit float WAV
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], sample_rate: u32) -> Result<(), AudioError> {
    let path = path.as_ref();
    if sample_rate == 0 {
        return Err(AudioError::InvalidSampleRate { sample_rate });
    }

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let io_error = |err: hound::Error| AudioError::FileIo {
        reason: format!("{}: {err}", path.display()),
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(io_error)?;
    for &sample in samples {
        writer.write_sample(sample).map_err(io_error)?;
    }
    writer.finalize().map_err(io_error)?;

    log::info!(
        "[Wav] Saved {} samples @ {}Hz to {}",
        samples.len(),
        sample_rate,
        path.display()
    );
    Ok(())
}

/// Read a WAV file as mono f32, averaging channels
///
/// Integer samples are scaled by 2^(bits-1), so full-scale negative is -1.0.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, u32), AudioError> {
    let path = path.as_ref();
    let mut reader = hound::WavReader::open(path).map_err(|err| AudioError::FileIo {
        reason: format!("failed to open {}: {err}", path.display()),
    })?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(AudioError::DecodeFailed {
            reason: format!("{} has zero channels", path.display()),
        });
    }

    let read_error = |err: hound::Error| AudioError::DecodeFailed {
        reason: format!("error reading {}: {err}", path.display()),
    };

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|sample| sample.map_err(read_error))
            .collect::<Result<Vec<f32>, _>>()?,
        hound::SampleFormat::Int => match spec.bits_per_sample {
            16 => reader
                .samples::<i16>()
                .map(|sample| sample.map(|v| v as f32 / 32768.0).map_err(read_error))
                .collect::<Result<Vec<f32>, _>>()?,
            24 | 32 => {
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|sample| sample.map(|v| v as f32 / max).map_err(read_error))
                    .collect::<Result<Vec<f32>, _>>()?
            }
            bits => {
                return Err(AudioError::DecodeFailed {
                    reason: format!(
                        "unsupported bits_per_sample={} for {}",
                        bits,
                        path.display()
                    ),
                })
            }
        },
    };

    if spec.channels == 1 {
        return Ok((samples, spec.sample_rate));
    }

    let mut mono = Vec::with_capacity(samples.len() / spec.channels as usize);
    for chunk in samples.chunks(spec.channels as usize) {
        let sum: f32 = chunk.iter().copied().sum();
        mono.push(sum / spec.channels as f32);
    }

    Ok((mono, spec.sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        let clip: Vec<f32> = (0..1000).map(|i| (i as f32 / 1000.0) - 0.5).collect();

        write_wav(&path, &clip, 22050).unwrap();
        let (samples, rate) = read_wav(&path).unwrap();

        assert_eq!(rate, 22050);
        assert_eq!(samples, clip);
    }

    #[test]
    fn test_stereo_int_is_downmixed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..10 {
            writer.write_sample(i16::MAX).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let (samples, rate) = read_wav(&path).unwrap();
        assert_eq!(rate, 44100);
        assert_eq!(samples.len(), 10);
        assert!(samples.iter().all(|&s| (s - 0.5).abs() < 1e-4));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_wav("/nonexistent/clip.wav"),
            Err(AudioError::FileIo { .. })
        ));
    }

    #[test]
    fn test_write_rejects_zero_rate() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            write_wav(dir.path().join("x.wav"), &[0.0], 0),
            Err(AudioError::InvalidSampleRate { sample_rate: 0 })
        );
    }
}
