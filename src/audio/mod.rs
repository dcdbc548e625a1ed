// Audio module - everything that turns a source into a mono waveform
//
// Sources: microphone (capture), uploaded/stored files (decode, wav).
// Every path ends at the analysis sample rate via resample.

pub mod capture;
pub mod decode;
pub mod resample;
pub mod wav;

pub use capture::{expected_samples, Recorder};
pub use decode::{decode_bytes, decode_file, load_bytes, load_file};
pub use resample::resample_mono;
pub use wav::{read_wav, write_wav};
