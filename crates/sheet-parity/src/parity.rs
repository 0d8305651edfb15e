//! Parity comparison between two rendered sheets.
//!
//! Both texts are fingerprinted with SHA-256. When the fingerprints differ the texts are
//! split into lines and scanned in lockstep to find the first line that disagrees.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Lines in a divergence record are cut to this many characters.
pub const MAX_LINE_PREVIEW_CHARS: usize = 160;

/// Marker printed in place of a line when one side has run out of lines.
pub const END_OF_INPUT: &str = "<EOF>";

/// One side of a divergence: either a (truncated) line or the end of that text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineSide {
    Line(String),
    EndOfInput,
}

impl LineSide {
    fn preview(line: &str) -> Self {
        LineSide::Line(line.chars().take(MAX_LINE_PREVIEW_CHARS).collect())
    }

    fn at(lines: &[&str], index: usize) -> Self {
        lines.get(index).map_or(LineSide::EndOfInput, |line| Self::preview(line))
    }
}

impl fmt::Display for LineSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineSide::Line(line) => f.write_str(line),
            LineSide::EndOfInput => f.write_str(END_OF_INPUT),
        }
    }
}

/// First position where the two texts disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Divergence {
    /// 1-based line number
    pub line_number: usize,
    pub left: LineSide,
    pub right: LineSide,
}

/// Outcome of comparing two rendered sheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParityResult {
    pub left_digest: String,
    pub right_digest: String,
    pub left_bytes: usize,
    pub right_bytes: usize,
    pub matches: bool,
    pub divergence: Option<Divergence>,
}

/// Lowercase hex SHA-256 of the UTF-8 bytes of `text`.
pub fn sha256_hex(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Compare two texts for byte-exact parity.
///
/// A divergence record is present exactly when the digests differ.
pub fn compare(left: &str, right: &str) -> ParityResult {
    let left_digest = sha256_hex(left);
    let right_digest = sha256_hex(right);
    let matches = left_digest == right_digest;

    let divergence = if matches {
        None
    } else {
        // `lines()` drops `\r` before `\n` and a final newline; texts that differ only there
        // are located by an exact split on `\n`
        first_divergence(left, right).or_else(|| first_raw_divergence(left, right))
    };

    if let Some(ref d) = divergence {
        tracing::debug!(line = d.line_number, "Texts diverge");
    }

    ParityResult {
        left_digest,
        right_digest,
        left_bytes: left.len(),
        right_bytes: right.len(),
        matches,
        divergence,
    }
}

/// First differing line of `left` and `right`, or `None` if every line agrees.
///
/// When one text is a strict line-prefix of the other, the divergence sits one past the
/// shorter text's last line and that side is [`LineSide::EndOfInput`].
pub fn first_divergence(left: &str, right: &str) -> Option<Divergence> {
    let left_lines: Vec<&str> = left.lines().collect();
    let right_lines: Vec<&str> = right.lines().collect();
    scan(&left_lines, &right_lines)
}

fn first_raw_divergence(left: &str, right: &str) -> Option<Divergence> {
    let left_lines: Vec<&str> = left.split('\n').collect();
    let right_lines: Vec<&str> = right.split('\n').collect();
    scan(&left_lines, &right_lines)
}

fn scan(left: &[&str], right: &[&str]) -> Option<Divergence> {
    let common = left.len().min(right.len());

    if let Some(index) = (0..common).find(|&i| left[i] != right[i]) {
        return Some(Divergence {
            line_number: index + 1,
            left: LineSide::preview(left[index]),
            right: LineSide::preview(right[index]),
        });
    }

    if left.len() != right.len() {
        return Some(Divergence {
            line_number: common + 1,
            left: LineSide::at(left, common),
            right: LineSide::at(right, common),
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sha256_known_value() {
        assert_eq!(
            sha256_hex(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(sha256_hex("abc").len(), 64);
    }

    #[test]
    fn test_identical_texts() {
        let text = "1,\"a,b\",TRUE\n2,c,FALSE\n";
        let result = compare(text, text);
        assert!(result.matches);
        assert_eq!(result.left_digest, result.right_digest);
        assert_eq!(result.left_bytes, text.len());
        assert!(result.divergence.is_none());
    }

    #[test]
    fn test_single_line_difference() {
        let left = "a\nb\nc\nd\n";
        let right = "a\nb\nX\nd\n";
        let result = compare(left, right);
        assert!(!result.matches);
        assert_ne!(result.left_digest, result.right_digest);
        let d = result.divergence.unwrap();
        assert_eq!(d.line_number, 3);
        assert_eq!(d.left, LineSide::Line("c".to_owned()));
        assert_eq!(d.right, LineSide::Line("X".to_owned()));
    }

    #[test]
    fn test_strict_prefix_marks_shorter_side() {
        let result = compare("a\nb\n", "a\nb\nc\n");
        let d = result.divergence.unwrap();
        assert_eq!(d.line_number, 3);
        assert_eq!(d.left, LineSide::EndOfInput);
        assert_eq!(d.right, LineSide::Line("c".to_owned()));

        let reversed = compare("a\nb\nc\n", "a\nb\n").divergence.unwrap();
        assert_eq!(reversed.line_number, 3);
        assert_eq!(reversed.left, LineSide::Line("c".to_owned()));
        assert_eq!(reversed.right, LineSide::EndOfInput);
    }

    #[test]
    fn test_empty_against_content() {
        let d = compare("", "x\n").divergence.unwrap();
        assert_eq!(d.line_number, 1);
        assert_eq!(d.left, LineSide::EndOfInput);
        assert_eq!(d.left.to_string(), "<EOF>");
    }

    #[test]
    fn test_long_lines_are_truncated() {
        let left = "a".repeat(500);
        let right = "b".repeat(500);
        let d = compare(&left, &right).divergence.unwrap();
        match d.left {
            LineSide::Line(ref s) => assert_eq!(s.chars().count(), MAX_LINE_PREVIEW_CHARS),
            LineSide::EndOfInput => panic!("expected a line"),
        }
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let left = "é".repeat(200);
        let d = compare(&left, "").divergence.unwrap();
        assert_eq!(d.left, LineSide::Line("é".repeat(MAX_LINE_PREVIEW_CHARS)));
    }

    #[test]
    fn test_trailing_newline_only_difference_is_located() {
        let result = compare("a\nb", "a\nb\n");
        assert!(!result.matches);
        let d = result.divergence.unwrap();
        assert_eq!(d.line_number, 3);
        assert_eq!(d.left, LineSide::EndOfInput);
        assert_eq!(d.right, LineSide::Line(String::new()));
    }

    #[test]
    fn test_crlf_only_difference_is_located() {
        let d = compare("a\r\nb\r\n", "a\nb\n").divergence.unwrap();
        assert_eq!(d.line_number, 1);
        assert_eq!(d.left, LineSide::Line("a\r".to_owned()));
        assert_eq!(d.right, LineSide::Line("a".to_owned()));
    }

    #[test]
    fn test_first_divergence_none_for_equal_lines() {
        assert!(first_divergence("a\nb\n", "a\nb\n").is_none());
    }
}
