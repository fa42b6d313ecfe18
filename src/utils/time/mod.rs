// Clock time utilities
// "HH:MM" parsing and minute-of-day arithmetic shared by the grid, classifier and linker

use thiserror::Error;

/// Minutes in one day; every minute-of-day value wraps modulo this.
pub const MINUTES_PER_DAY: u32 = 1440;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("time value is empty")]
    Empty,
    #[error("time '{0}' is not in HH:MM format")]
    Malformed(String),
    #[error("time '{0}' is outside 00:00-23:59")]
    OutOfRange(String),
}

/// Parse a zero-padded 24-hour "HH:MM" value into minutes since midnight.
///
/// # Examples
/// ```
/// use dashboard_gantt::utils::time::time_to_minutes;
///
/// assert_eq!(time_to_minutes("13:30").unwrap(), 810);
/// assert!(time_to_minutes("25:00").is_err());
/// ```
pub fn time_to_minutes(value: &str) -> Result<u32, TimeParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TimeParseError::Empty);
    }

    let (hours, minutes) = trimmed
        .split_once(':')
        .ok_or_else(|| TimeParseError::Malformed(trimmed.to_string()))?;

    if hours.len() != 2 || minutes.len() != 2 {
        return Err(TimeParseError::Malformed(trimmed.to_string()));
    }

    let hours: u32 = hours
        .parse()
        .map_err(|_| TimeParseError::Malformed(trimmed.to_string()))?;
    let minutes: u32 = minutes
        .parse()
        .map_err(|_| TimeParseError::Malformed(trimmed.to_string()))?;

    if hours > 23 || minutes > 59 {
        return Err(TimeParseError::OutOfRange(trimmed.to_string()));
    }

    Ok(hours * 60 + minutes)
}

/// Lenient variant of [`time_to_minutes`]: malformed input maps to 0.
///
/// Midnight and garbage are indistinguishable here, so only use this where the
/// legacy dashboard behaviour is wanted.
pub fn time_to_minutes_or_zero(value: &str) -> u32 {
    time_to_minutes(value).unwrap_or(0)
}

/// Parse an optional time field, treating blank values as absent.
pub fn parse_optional(value: Option<&str>) -> Option<u32> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| time_to_minutes(v).ok())
}

/// Format a minute-of-day value as "HH:MM", wrapping past midnight.
pub fn format_minutes(minutes: u32) -> String {
    let wrapped = minutes % MINUTES_PER_DAY;
    format!("{:02}:{:02}", wrapped / 60, wrapped % 60)
}

/// Add a (possibly negative) offset to a clock time with 24-hour wraparound.
pub fn add_minutes(value: &str, offset: i64) -> Result<String, TimeParseError> {
    let base = time_to_minutes(value)? as i64;
    let total = (base + offset).rem_euclid(MINUTES_PER_DAY as i64);
    Ok(format_minutes(total as u32))
}
