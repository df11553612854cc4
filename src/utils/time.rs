//! Countdown formatting and custom-duration parsing

use crate::error::{Result, TimerError};

/// Upper bound for a user-supplied duration (30 minutes)
pub const MAX_CUSTOM_DURATION_SECS: u32 = 1800;

/// Format seconds as `mm:ss`
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Parse a custom duration given as `mm:ss` or a bare number of seconds.
///
/// The seconds part of `mm:ss` must be in 0..=59 and the total must be in
/// 1..=1800.
pub fn parse_duration(input: &str) -> Result<u32> {
    let input = input.trim();
    let invalid = || TimerError::InvalidInput(format!("invalid duration: {:?}", input));

    let total = match input.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
            let seconds: u32 = seconds.parse().map_err(|_| invalid())?;
            if seconds >= 60 {
                return Err(TimerError::InvalidInput("seconds must be 0-59".to_string()));
            }
            minutes.checked_mul(60).and_then(|m| m.checked_add(seconds)).ok_or_else(invalid)?
        }
        None => input.parse().map_err(|_| invalid())?,
    };

    if total == 0 || total > MAX_CUSTOM_DURATION_SECS {
        return Err(TimerError::InvalidInput(format!(
            "duration must be between 1 and {} seconds",
            MAX_CUSTOM_DURATION_SECS
        )));
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(90), "01:30");
        assert_eq!(format_time(1800), "30:00");
    }

    #[test]
    fn test_parse_accepted_forms() {
        assert_eq!(parse_duration("1:30").unwrap(), 90);
        assert_eq!(parse_duration("0:59").unwrap(), 59);
        assert_eq!(parse_duration("30:00").unwrap(), 1800);
        assert_eq!(parse_duration("45").unwrap(), 45);
        assert_eq!(parse_duration(" 1800 ").unwrap(), 1800);
    }

    #[test]
    fn test_parse_rejected_forms() {
        for input in ["0", "1801", "abc", "", "1:60", "1:2:3", "-5", "0:00", "30:01", ":30", "1:"] {
            assert!(
                matches!(parse_duration(input), Err(TimerError::InvalidInput(_))),
                "{:?} should be rejected",
                input
            );
        }
    }
}
