//! Parser for fan-out ping output.
//!
//! `fping -C 1 -q` reports one line per destination:
//!
//! ```text
//! 172.17.0.6 : 0.36
//! 172.17.0.7 : 0.48
//! 172.17.0.8 : -
//! ```
//!
//! A value of exactly `-` means the destination did not answer. Any other value
//! counts as reachable and is not interpreted further.

use thiserror::Error;

use super::result::ProbeResult;

/// Separator between destination and value on each line.
pub const FIELD_DELIMITER: &str = " : ";

/// Value reported for a destination that did not answer.
pub const UNREACHABLE_MARKER: &str = "-";

/// Errors raised on output that does not follow the per-line format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Line has no `" : "` separator.
    #[error("line {line}: missing ' : ' delimiter in {content:?}")]
    MissingDelimiter {
        /// 1-based line number within the trimmed output.
        line: usize,
        /// Offending line.
        content: String,
    },

    /// Separator present but nothing before it.
    #[error("line {line}: empty destination in {content:?}")]
    EmptyDestination {
        /// 1-based line number within the trimmed output.
        line: usize,
        /// Offending line.
        content: String,
    },
}

/// Parse the raw output of one probe run from `from` into per-link results.
///
/// The output is trimmed, then every non-empty line yields exactly one record,
/// in line order. Any malformed line fails the whole output.
///
/// # Errors
/// Returns [`ParseError`] for the first line that does not match
/// `<destination> : <value>`.
pub fn parse_probe_output(from: &str, output: &str) -> Result<Vec<ProbeResult>, ParseError> {
    output
        .trim()
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| parse_line(from, idx + 1, line))
        .collect()
}

fn parse_line(from: &str, line_no: usize, line: &str) -> Result<ProbeResult, ParseError> {
    let (to, value) = line
        .split_once(FIELD_DELIMITER)
        .ok_or_else(|| ParseError::MissingDelimiter {
            line: line_no,
            content: line.to_string(),
        })?;

    // fping pads destinations to align the value column
    let to = to.trim();
    if to.is_empty() {
        return Err(ParseError::EmptyDestination {
            line: line_no,
            content: line.to_string(),
        });
    }

    let link_failed = value.trim() == UNREACHABLE_MARKER;
    Ok(ProbeResult::link(from, to, link_failed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_output() {
        let results = parse_probe_output("h1", "h1 : 0.30\nh2 : -").unwrap();
        assert_eq!(
            results,
            vec![
                ProbeResult::link("h1", "h1", false),
                ProbeResult::link("h1", "h2", true),
            ]
        );
    }

    #[test]
    fn test_parse_one_record_per_line() {
        let output = "172.17.0.6 : 0.36\n172.17.0.7 : 0.48\n172.17.0.8 : -\n";
        let results = parse_probe_output("172.17.0.6", output).unwrap();
        assert_eq!(results.len(), 3);
        let to: Vec<_> = results.iter().filter_map(|r| r.to()).collect();
        assert_eq!(to, ["172.17.0.6", "172.17.0.7", "172.17.0.8"]);
        let failed: Vec<_> = results.iter().map(|r| r.link_failed()).collect();
        assert_eq!(failed, [false, false, true]);
    }

    #[test]
    fn test_any_non_dash_value_is_reachable() {
        for value in ["0.36", "timeout", "9999", "--", "- 0.4"] {
            let results = parse_probe_output("a", &format!("b : {value}")).unwrap();
            assert!(!results[0].link_failed(), "value {value:?} should be OK");
        }
    }

    #[test]
    fn test_preserves_reported_order() {
        let results = parse_probe_output("a", "c : 1.0\na : 1.0\nb : -").unwrap();
        let to: Vec<_> = results.iter().filter_map(|r| r.to()).collect();
        assert_eq!(to, ["c", "a", "b"]);
    }

    #[test]
    fn test_padded_destination_and_surrounding_whitespace() {
        let output = "\n\n  10.0.0.1     : 0.12\n10.0.0.22    : -  \n\n";
        let results = parse_probe_output("src", output).unwrap();
        assert_eq!(
            results,
            vec![
                ProbeResult::link("src", "10.0.0.1", false),
                ProbeResult::link("src", "10.0.0.22", true),
            ]
        );
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let results = parse_probe_output("a", "b : 1\n\n   \nc : -").unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_empty_output() {
        assert!(parse_probe_output("a", "").unwrap().is_empty());
        assert!(parse_probe_output("a", " \n\t\n").unwrap().is_empty());
    }

    #[test]
    fn test_missing_delimiter() {
        let err = parse_probe_output("a", "b : 1\nssh: connect to host c port 22").unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingDelimiter {
                line: 2,
                content: "ssh: connect to host c port 22".to_string(),
            }
        );
        assert!(err.to_string().contains("missing ' : ' delimiter"));
    }

    #[test]
    fn test_colon_without_spaces_is_malformed() {
        let err = parse_probe_output("a", "b:1.0").unwrap_err();
        assert!(matches!(err, ParseError::MissingDelimiter { line: 1, .. }));
    }

    #[test]
    fn test_empty_destination() {
        let err = parse_probe_output("a", "b : 1\n    : -").unwrap_err();
        assert!(matches!(err, ParseError::EmptyDestination { line: 2, .. }));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let output = "h1 : 0.30\nh2 : -\nh3 : 1.5";
        let first = parse_probe_output("h1", output).unwrap();
        let second = parse_probe_output("h1", output).unwrap();
        assert_eq!(first, second);
    }
}
