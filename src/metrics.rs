//! Pure scoring helpers shared by the session engine and history.

/// Conventional word length used for words-per-minute.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Percentage of typed characters that were not mistakes, clamped to 0..=100.
pub fn accuracy(typed_length: usize, errors: usize) -> f64 {
    if typed_length == 0 {
        return 100.0;
    }
    let correct = typed_length.saturating_sub(errors);
    ((correct as f64 / typed_length as f64) * 100.0).clamp(0.0, 100.0)
}

pub fn words_per_minute(char_count: usize, elapsed_seconds: f64) -> u32 {
    if elapsed_seconds <= 0.0 {
        return 0;
    }
    let words = char_count as f64 / CHARS_PER_WORD;
    let wpm = words / (elapsed_seconds / 60.0);
    wpm.max(0.0).floor() as u32
}

/// Full positional diff between `typed` and `target`, plus any excess typed length.
///
/// The engine does not use this; its error count is the running tally kept by
/// `typing_policy::InputGate`, which also remembers mistakes later corrected.
pub fn count_errors(typed: &str, target: &str) -> usize {
    let typed: Vec<char> = typed.chars().collect();
    let target: Vec<char> = target.chars().collect();

    let mismatched = typed
        .iter()
        .zip(target.iter())
        .filter(|(a, b)| a != b)
        .count();
    mismatched + typed.len().saturating_sub(target.len())
}
