//! Customer code generation: `C` + UTC date (YYYYMMDD) + zero-padded sequence.

use chrono::NaiveDate;

/// Minimum width of the sequence part.
pub const SEQUENCE_WIDTH: usize = 4;

/// Attempts before a generated code that keeps colliding is reported as a conflict.
pub const MAX_CODE_ATTEMPTS: usize = 10;

pub fn format_code(date: NaiveDate, sequence: i64) -> String {
    format!(
        "C{}{:0width$}",
        date.format("%Y%m%d"),
        sequence,
        width = SEQUENCE_WIDTH
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn pads_sequence_to_four_digits() {
        assert_eq!(format_code(day(), 1), "C202403050001");
        assert_eq!(format_code(day(), 987), "C202403050987");
    }

    #[test]
    fn longer_sequences_are_not_truncated() {
        assert_eq!(format_code(day(), 12345), "C2024030512345");
    }
}
