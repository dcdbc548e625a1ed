// Decode - compressed/uncompressed audio files to mono f32
//
// Uploads may be WAV, MP3, OGG/Vorbis or FLAC. WAV files on disk are read
// with hound when possible. Everything else goes through symphonia: probe
// the container, decode the default track packet by packet, and downmix
// every frame by averaging its channels.

use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::audio::resample::resample_mono;
use crate::audio::wav::read_wav;
use crate::error::AudioError;

/// Decode an audio file into mono f32 samples at its native rate
///
/// # Returns
/// (samples, sample_rate)
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, u32), AudioError> {
    let path = path.as_ref();
    let extension = path.extension().and_then(|e| e.to_str());

    // PCM/float WAV goes through hound; other WAV codecs fall back to symphonia
    if extension.is_some_and(|ext| ext.eq_ignore_ascii_case("wav")) {
        match read_wav(path) {
            Ok(decoded) => return Ok(decoded),
            Err(err) => log::debug!("[Decode] hound could not read {}: {}", path.display(), err),
        }
    }

    let file = File::open(path).map_err(|err| AudioError::FileIo {
        reason: format!("cannot open {}: {err}", path.display()),
    })?;
    decode_source(Box::new(file), extension)
}

/// Decode in-memory audio (e.g. an HTTP upload)
///
/// # Arguments
/// * `bytes` - Complete file contents
/// * `extension` - Optional format hint ("wav", "mp3", "ogg", ...)
pub fn decode_bytes(bytes: Vec<u8>, extension: Option<&str>) -> Result<(Vec<f32>, u32), AudioError> {
    if bytes.is_empty() {
        return Err(AudioError::DecodeFailed {
            reason: "empty input".to_string(),
        });
    }
    decode_source(Box::new(Cursor::new(bytes)), extension)
}

/// Decode a file and convert it to `target_rate`
pub fn load_file<P: AsRef<Path>>(path: P, target_rate: u32) -> Result<Vec<f32>, AudioError> {
    let (samples, rate) = decode_file(path)?;
    resample_mono(&samples, rate, target_rate)
}

/// Decode in-memory audio and convert it to `target_rate`
pub fn load_bytes(
    bytes: Vec<u8>,
    extension: Option<&str>,
    target_rate: u32,
) -> Result<Vec<f32>, AudioError> {
    let (samples, rate) = decode_bytes(bytes, extension)?;
    resample_mono(&samples, rate, target_rate)
}

fn decode_failed(context: &str, err: SymphoniaError) -> AudioError {
    AudioError::DecodeFailed {
        reason: format!("{}: {}", context, err),
    }
}

fn decode_source(
    source: Box<dyn MediaSource>,
    extension: Option<&str>,
) -> Result<(Vec<f32>, u32), AudioError> {
    let mss = MediaSourceStream::new(source, MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|err| decode_failed("unrecognized format", err))?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| AudioError::DecodeFailed {
            reason: "no default audio track".to_string(),
        })?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioError::DecodeFailed {
            reason: "unknown sample rate".to_string(),
        })?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|err| decode_failed("unsupported codec", err))?;

    let mut mono: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(err) => return Err(decode_failed("reading packet", err)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(err)) => {
                log::warn!("[Decode] Skipping corrupt frame: {}", err);
                continue;
            }
            Err(err) => return Err(decode_failed("decoding packet", err)),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);
        let capacity = decoded.capacity() as u64;
        let needs_alloc = sample_buf
            .as_ref()
            .map_or(true, |buf| buf.capacity() < decoded.capacity() * channels);
        if needs_alloc {
            sample_buf = Some(SampleBuffer::<f32>::new(capacity, spec));
        }
        let Some(buf) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);

        for frame in buf.samples().chunks(channels) {
            mono.push(frame.iter().sum::<f32>() / channels as f32);
        }
    }

    log::info!("[Decode] Decoded {} samples @ {}Hz", mono.len(), sample_rate);

    Ok((mono, sample_rate))
}
