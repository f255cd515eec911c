/// Sample size at which the single lowest and single highest shot are dropped.
pub const TRIM_THRESHOLD: usize = 5;

/// Representative carry for one swing length.
///
/// Empty input yields 0, which callers treat as "no data". With
/// [`TRIM_THRESHOLD`] or more shots exactly one lowest and one highest value
/// are discarded before averaging. The mean is rounded to the nearest yard,
/// ties away from zero (`84.5` becomes `85`). The input is never mutated.
///
/// The live per-stage preview and the final commit both go through this
/// function so what the user sees is what gets saved.
#[must_use]
pub fn trimmed_mean(shots: &[u32]) -> u32 {
    if shots.is_empty() {
        return 0;
    }

    let mut sorted = shots.to_vec();
    sorted.sort_unstable();

    let kept = if sorted.len() >= TRIM_THRESHOLD {
        &sorted[1..sorted.len() - 1]
    } else {
        &sorted[..]
    };

    let sum: u64 = kept.iter().map(|d| u64::from(*d)).sum();
    let n = kept.len() as u64;
    // (sum / n) + 0.5, floored, in integers
    let rounded = (2 * sum + n) / (2 * n);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}
