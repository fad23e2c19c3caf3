//! Multiple-choice answer parsing
//!
//! Participants answer round 1 questions either by letter (A-D) or by
//! number (1-4). Both forms map onto the same zero-based option index.

/// Option letters in display order
pub const OPTION_LETTERS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Parse free-form answer text into a zero-based option index.
///
/// Returns `None` when the text is neither a known letter nor an integer
/// in `1..=4`.
pub fn parse_answer(text: &str) -> Option<usize> {
    let normalized = text.trim().to_uppercase();

    let mut chars = normalized.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if let Some(index) = OPTION_LETTERS.iter().position(|&l| l == c) {
            return Some(index);
        }
    }

    match normalized.parse::<usize>() {
        Ok(n) if (1..=OPTION_LETTERS.len()).contains(&n) => Some(n - 1),
        _ => None,
    }
}

/// Letter shown to participants for an option index
pub fn option_letter(index: usize) -> Option<char> {
    OPTION_LETTERS.get(index).copied()
}
