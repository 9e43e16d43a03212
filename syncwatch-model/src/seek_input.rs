//! Admin seek input: a bare number of seconds, or `mm:ss`.

use crate::error::{ModelError, Result};

/// Parses admin seek input into a controller timestamp in milliseconds.
///
/// `"90"` and `"1:30"` both resolve to `90_000`. Input that does not parse,
/// or that resolves to zero, is an error so callers drop it without issuing
/// a command. Seconds in `mm:ss` are not range-checked: `"1:75"` is 135 s.
pub fn parse_seek_input(raw: &str) -> Result<u64> {
    let trimmed = raw.trim();
    let parts: Vec<&str> = trimmed.split(':').collect();

    let millis = match parts.as_slice() {
        [secs] => parse_component(secs, trimmed)?.saturating_mul(1000),
        [mins, secs] => {
            let mins = parse_component(mins, trimmed)?;
            let secs = parse_component(secs, trimmed)?;
            mins.saturating_mul(60_000)
                .saturating_add(secs.saturating_mul(1000))
        }
        _ => return Err(ModelError::InvalidSeekInput(trimmed.to_string())),
    };

    if millis == 0 {
        return Err(ModelError::ZeroSeek);
    }
    Ok(millis)
}

fn parse_component(component: &str, whole: &str) -> Result<u64> {
    component
        .trim()
        .parse::<u64>()
        .map_err(|_| ModelError::InvalidSeekInput(whole.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_seconds() {
        assert_eq!(parse_seek_input("90"), Ok(90_000));
        assert_eq!(parse_seek_input(" 5 "), Ok(5_000));
    }

    #[test]
    fn minutes_and_seconds() {
        assert_eq!(parse_seek_input("1:30"), Ok(90_000));
        assert_eq!(parse_seek_input("0:07"), Ok(7_000));
        assert_eq!(parse_seek_input("1:75"), Ok(135_000));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            parse_seek_input("abc"),
            Err(ModelError::InvalidSeekInput(_))
        ));
        assert!(parse_seek_input("").is_err());
        assert!(parse_seek_input("1:2:3").is_err());
        assert!(parse_seek_input("-5").is_err());
        assert!(parse_seek_input("1:").is_err());
    }

    #[test]
    fn zero_is_dropped() {
        assert_eq!(parse_seek_input("0"), Err(ModelError::ZeroSeek));
        assert_eq!(parse_seek_input("0:00"), Err(ModelError::ZeroSeek));
    }
}
