//! Probe result records.
//!
//! A [`ProbeResult`] is either a transport failure for a whole source host or
//! the outcome of a single source → destination link. The enum layout makes a
//! transport failure carrying a destination unrepresentable.

use std::fmt;

use serde::{Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};

/// Label rendered when the remote probe could not be executed at all.
pub const TRANSPORT_FAILURE_LABEL: &str = "ERROR_SSHING_TO_HOST";

/// Reachability of a single link as rendered in the status feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
pub enum LinkStatus {
    /// Destination answered.
    #[strum(serialize = "OK")]
    Ok,
    /// Destination did not answer.
    #[strum(serialize = "FAILED")]
    Failed,
}

/// What a probe run observed for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The remote execution itself could not be completed.
    TransportFailed,
    /// The remote execution succeeded and reported on one destination.
    Link {
        /// Destination host as reported by the remote tool.
        to: String,
        /// The destination did not respond.
        link_failed: bool,
    },
}

/// Outcome of probing from one source host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// Source host the probe ran on.
    pub from: String,
    /// Transport failure or per-link outcome.
    pub outcome: ProbeOutcome,
}

impl ProbeResult {
    /// Record a transport-level failure for `from`.
    pub fn transport_failure(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            outcome: ProbeOutcome::TransportFailed,
        }
    }

    /// Record the outcome of the `from` → `to` link.
    pub fn link(from: impl Into<String>, to: impl Into<String>, link_failed: bool) -> Self {
        Self {
            from: from.into(),
            outcome: ProbeOutcome::Link {
                to: to.into(),
                link_failed,
            },
        }
    }

    /// Destination host, unset for transport failures.
    pub fn to(&self) -> Option<&str> {
        match &self.outcome {
            ProbeOutcome::TransportFailed => None,
            ProbeOutcome::Link { to, .. } => Some(to),
        }
    }

    pub fn transport_failed(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::TransportFailed)
    }

    /// Always `false` for transport failures.
    pub fn link_failed(&self) -> bool {
        matches!(
            self.outcome,
            ProbeOutcome::Link {
                link_failed: true,
                ..
            }
        )
    }

    /// Link status, `None` for transport failures.
    pub fn status(&self) -> Option<LinkStatus> {
        match &self.outcome {
            ProbeOutcome::TransportFailed => None,
            ProbeOutcome::Link { link_failed, .. } => Some(if *link_failed {
                LinkStatus::Failed
            } else {
                LinkStatus::Ok
            }),
        }
    }
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.outcome, self.status()) {
            (ProbeOutcome::Link { to, .. }, Some(status)) => {
                write!(f, "{} => {}: {}", self.from, to, status)
            }
            _ => write!(f, "{}: {}", self.from, TRANSPORT_FAILURE_LABEL),
        }
    }
}

/// Flat wire view used for JSON output.
#[derive(Serialize)]
struct ProbeRecord<'a> {
    from: &'a str,
    to: Option<&'a str>,
    transport_failed: bool,
    link_failed: bool,
}

impl Serialize for ProbeResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ProbeRecord {
            from: &self.from,
            to: self.to(),
            transport_failed: self.transport_failed(),
            link_failed: self.link_failed(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_link_ok() {
        let result = ProbeResult::link("h1", "h1", false);
        assert_eq!(result.to_string(), "h1 => h1: OK");
    }

    #[test]
    fn test_render_link_failed() {
        let result = ProbeResult::link("h1", "h2", true);
        assert_eq!(result.to_string(), "h1 => h2: FAILED");
    }

    #[test]
    fn test_render_transport_failure() {
        let result = ProbeResult::transport_failure("h2");
        assert_eq!(result.to_string(), "h2: ERROR_SSHING_TO_HOST");
    }

    #[test]
    fn test_render_is_stable() {
        let result = ProbeResult::link("10.0.0.1", "10.0.0.9", true);
        assert_eq!(result.to_string(), result.clone().to_string());
    }

    #[test]
    fn test_transport_failure_fields() {
        let result = ProbeResult::transport_failure("h2");
        assert!(result.transport_failed());
        assert!(!result.link_failed());
        assert_eq!(result.to(), None);
        assert_eq!(result.status(), None);
    }

    #[test]
    fn test_link_fields() {
        let result = ProbeResult::link("h1", "h2", true);
        assert!(!result.transport_failed());
        assert!(result.link_failed());
        assert_eq!(result.to(), Some("h2"));
        assert_eq!(result.status(), Some(LinkStatus::Failed));
    }

    #[test]
    fn test_link_status_strings() {
        assert_eq!(LinkStatus::Ok.as_ref(), "OK");
        assert_eq!("FAILED".parse::<LinkStatus>().unwrap(), LinkStatus::Failed);
    }

    #[test]
    fn test_serialize_json() {
        let link = serde_json::to_value(ProbeResult::link("h1", "h2", false)).unwrap();
        assert_eq!(
            link,
            serde_json::json!({
                "from": "h1",
                "to": "h2",
                "transport_failed": false,
                "link_failed": false,
            })
        );

        let failure = serde_json::to_value(ProbeResult::transport_failure("h2")).unwrap();
        assert_eq!(failure["to"], serde_json::Value::Null);
        assert_eq!(failure["transport_failed"], true);
    }
}
