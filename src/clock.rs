//! Clock readouts for timer cards.
//!
//! Durations are shown as `M : SS`: minutes without padding, seconds padded to
//! two digits. Large cards draw the same text with a five-row block font.

/// Formats `seconds` as `M : SS`.
///
/// ```rust
/// use timer_grid::clock::format_clock;
///
/// assert_eq!(format_clock(125), "2 : 05");
/// assert_eq!(format_clock(59), "0 : 59");
/// assert_eq!(format_clock(3600), "60 : 00");
/// ```
pub fn format_clock(seconds: u64) -> String {
    format!("{} : {:02}", seconds / 60, seconds % 60)
}

/// Rendering hint for a timer card, derived from how many cards share a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeClass {
    /// One or two per row: block digits.
    #[default]
    Large,
    /// Three per row: letter-spaced digits.
    Medium,
    /// Four or five per row.
    Small,
    /// Six or more per row.
    Compact,
}

impl SizeClass {
    /// Picks the size class for a row of `timers_per_row` cards.
    pub fn for_timers_per_row(timers_per_row: usize) -> Self {
        match timers_per_row {
            0..=2 => SizeClass::Large,
            3 => SizeClass::Medium,
            4 | 5 => SizeClass::Small,
            _ => SizeClass::Compact,
        }
    }

    /// Width of the primary readout for `text` in this size class.
    pub fn readout_width(self, text: &str) -> usize {
        match self {
            SizeClass::Large => text
                .chars()
                .map(|c| glyph(c)[0].chars().count() + 1)
                .sum::<usize>()
                .saturating_sub(1),
            SizeClass::Medium => (text.chars().count() * 2).saturating_sub(1),
            SizeClass::Small | SizeClass::Compact => text.chars().count(),
        }
    }
}

const BLOCK_ROWS: usize = 5;

fn glyph(c: char) -> [&'static str; BLOCK_ROWS] {
    match c {
        '0' => ["███", "█ █", "█ █", "█ █", "███"],
        '1' => ["  █", "  █", "  █", "  █", "  █"],
        '2' => ["███", "  █", "███", "█  ", "███"],
        '3' => ["███", "  █", "███", "  █", "███"],
        '4' => ["█ █", "█ █", "███", "  █", "  █"],
        '5' => ["███", "█  ", "███", "  █", "███"],
        '6' => ["███", "█  ", "███", "█ █", "███"],
        '7' => ["███", "  █", "  █", "  █", "  █"],
        '8' => ["███", "█ █", "███", "█ █", "███"],
        '9' => ["███", "█ █", "███", "  █", "███"],
        ':' => [" ", "▪", " ", "▪", " "],
        _ => [" ", " ", " ", " ", " "],
    }
}

/// Draws `text` in the block font, one glyph column apart.
pub fn block_digits(text: &str) -> String {
    (0..BLOCK_ROWS)
        .map(|row| {
            text.chars()
                .map(|c| glyph(c)[row])
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Puts a space between every character of `text`.
pub fn letter_spaced(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for (i, c) in text.chars().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push(c);
    }
    out
}
