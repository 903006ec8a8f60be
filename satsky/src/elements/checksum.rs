//! Check digit computation for element set lines.

use std::fmt;

/// Column holding the check digit (0-based).
pub(crate) const CHECKSUM_COLUMN: usize = 68;

/// Computes the expected check digit of an element set line.
///
/// Digits contribute their value, `-` contributes 1 and every other
/// character contributes 0. Only the columns before the check digit count.
pub fn compute_checksum(line: &str) -> u8 {
    let sum: u32 = line
        .bytes()
        .take(CHECKSUM_COLUMN)
        .map(|b| match b {
            b'0'..=b'9' => u32::from(b - b'0'),
            b'-' => 1,
            _ => 0,
        })
        .sum();
    (sum % 10) as u8
}

/// A line whose trailing check digit disagrees with its contents.
///
/// Non-fatal: the record is still parsed and usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecksumWarning {
    /// Name of the record (usually the source file name).
    pub name: String,
    /// Line number within the record (1 or 2).
    pub line: u8,
    /// Check digit found in the line.
    pub found: u8,
    /// Check digit computed from the line.
    pub expected: u8,
}

impl fmt::Display for ChecksumWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "element set {} line {} does not have correct check digit. Found {} expected {}",
            self.name, self.line, self.found, self.expected
        )
    }
}

/// Returns a warning if the line's check digit does not match.
///
/// The caller guarantees the line passed the grammar, so the check digit
/// column exists and holds a digit.
pub(crate) fn verify(name: &str, line_number: u8, line: &str) -> Option<ChecksumWarning> {
    let found = line.as_bytes()[CHECKSUM_COLUMN] - b'0';
    let expected = compute_checksum(line);
    (found != expected).then(|| ChecksumWarning {
        name: name.to_string(),
        line: line_number,
        found,
        expected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISS_LINE1: &str =
        "1 25544U 98067A   25185.47485775  .00005492  00000+0  10282-3 0  9993";
    const ISS_LINE2: &str =
        "2 25544  51.6344 221.3901 0002450 331.8120  28.2736 15.50368910517843";

    #[test]
    fn test_checksum_of_valid_lines() {
        assert_eq!(compute_checksum(ISS_LINE1), 3);
        assert_eq!(compute_checksum(ISS_LINE2), 3);
    }

    #[test]
    fn test_minus_counts_as_one() {
        // Ten minus signs sum to 10, so the digit wraps to 0
        assert_eq!(compute_checksum("----------"), 0);
        assert_eq!(compute_checksum("-"), 1);
        assert_eq!(compute_checksum("+. ABC"), 0);
    }

    #[test]
    fn test_check_digit_column_ignored() {
        let mut altered = ISS_LINE1.to_string();
        altered.replace_range(68..69, "7");
        assert_eq!(compute_checksum(&altered), 3);
    }

    #[test]
    fn test_verify_reports_mismatch() {
        let mut altered = ISS_LINE2.to_string();
        altered.replace_range(68..69, "0");

        assert!(verify("iss", 2, ISS_LINE2).is_none());

        let warning = verify("iss", 2, &altered).unwrap();
        assert_eq!(warning.found, 0);
        assert_eq!(warning.expected, 3);
        assert_eq!(
            warning.to_string(),
            "element set iss line 2 does not have correct check digit. Found 0 expected 3"
        );
    }
}
