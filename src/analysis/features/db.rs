// Decibel module - Power to dB conversion
//
// Converts a power spectrogram to decibels referenced to its own maximum,
// so the loudest bin lands on exactly 0 dB and everything else is negative.

/// Floor applied to powers before taking the logarithm
pub const AMIN: f32 = 1e-10;

/// Dynamic range kept below the peak, in dB
pub const TOP_DB: f32 = 80.0;

/// Convert powers to dB relative to the maximum power.
///
/// `10 * log10(max(AMIN, p)) - 10 * log10(max(AMIN, max_p))`, then clamped
/// to at most `TOP_DB` below the peak. An all-zero input maps to all zeros.
pub fn power_to_db(power: &[f32]) -> Vec<f32> {
    let reference = power.iter().copied().fold(0.0f32, f32::max);
    let ref_db = 10.0 * reference.max(AMIN).log10();

    let mut db: Vec<f32> = power
        .iter()
        .map(|&p| 10.0 * p.max(AMIN).log10() - ref_db)
        .collect();

    let peak = db.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let floor = peak - TOP_DB;
    for value in db.iter_mut() {
        if *value < floor {
            *value = floor;
        }
    }

    db
}
