//! Round schedule and scheduler errors.

use std::time::Duration;

use thiserror::Error;

/// Minimum allowed interval (1 second).
pub const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// Errors raised while driving probe rounds.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Invalid schedule definition.
    #[error("config error: {0}")]
    Config(String),

    /// Underlying job scheduler failure.
    #[error("scheduler error: {0}")]
    Scheduler(String),
}

/// Cadence of probe rounds.
///
/// Validation of cron expressions happens at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    /// Fixed interval between rounds, the first one firing after one interval.
    ///
    /// Interval is clamped to a minimum of 1 second.
    Interval(Duration),

    /// Cron expression, 6-field `sec min hour day month weekday`.
    /// Example: `"0 */5 * * * *"` = every 5 minutes at second 0
    Cron(String),
}

impl Schedule {
    /// Create an interval schedule.
    ///
    /// Interval is clamped to a minimum of 1 second.
    pub fn interval(duration: Duration) -> Self {
        if duration < MIN_INTERVAL {
            tracing::warn!(min_interval = ?MIN_INTERVAL,
                "Interval duration is less than minimum allowed. Using minimum duration."
            );
            Self::Interval(MIN_INTERVAL)
        } else {
            Self::Interval(duration)
        }
    }

    /// Create a cron schedule with immediate validation.
    ///
    /// # Errors
    /// Returns `SchedulerError::Config` if the cron expression is invalid.
    pub fn cron(expr: impl AsRef<str>) -> Result<Self, SchedulerError> {
        use std::str::FromStr;

        let expr = expr.as_ref().trim();
        cron::Schedule::from_str(expr)
            .map_err(|e| SchedulerError::Config(format!("invalid cron expression: {e}")))?;

        Ok(Self::Cron(expr.to_string()))
    }
}

impl std::fmt::Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interval(d) => write!(f, "every {}", humantime::format_duration(*d)),
            Self::Cron(expr) => write!(f, "cron: {}", expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_interval_minimum() {
        let schedule = Schedule::interval(Duration::from_millis(100));
        assert_eq!(schedule, Schedule::Interval(MIN_INTERVAL));
    }

    #[test]
    fn test_schedule_interval_valid() {
        let schedule = Schedule::interval(Duration::from_secs(30));
        assert_eq!(schedule, Schedule::Interval(Duration::from_secs(30)));
        assert_eq!(schedule.to_string(), "every 30s");
    }

    #[test]
    fn test_schedule_cron_valid() {
        let schedule = Schedule::cron("0 */5 * * * *").unwrap();
        assert_eq!(schedule, Schedule::Cron("0 */5 * * * *".to_string()));
        assert_eq!(schedule.to_string(), "cron: 0 */5 * * * *");
    }

    #[test]
    fn test_schedule_cron_invalid() {
        let err = Schedule::cron("not a cron").unwrap_err();
        assert!(err.to_string().contains("invalid cron"));
    }
}
