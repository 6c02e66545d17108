//! Validation for user-supplied crawl and import parameters.

use crate::error::DisclosuresError;

/// Validate a crawl delay in seconds: finite and non-negative.
pub fn validate_delay(delay: f64) -> Result<f64, DisclosuresError> {
    if delay.is_finite() && delay >= 0.0 {
        Ok(delay)
    } else {
        Err(DisclosuresError::InvalidInput(format!(
            "delay must be a non-negative number of seconds, got {}",
            delay
        )))
    }
}

/// Validate the consecutive-failure limit: at least 1.
pub fn validate_max_failures(max_failures: u32) -> Result<u32, DisclosuresError> {
    if max_failures >= 1 {
        Ok(max_failures)
    } else {
        Err(DisclosuresError::InvalidInput(
            "max-failures must be at least 1".to_string(),
        ))
    }
}

/// Validate an ID range: start at least 1 and end (when given) not before
/// start.
pub fn validate_range(start: u64, end: Option<u64>) -> Result<(), DisclosuresError> {
    if start < 1 {
        return Err(DisclosuresError::InvalidInput(
            "start ID must be at least 1".to_string(),
        ));
    }
    if let Some(end) = end {
        if end < start {
            return Err(DisclosuresError::InvalidInput(format!(
                "end ID {} is before start ID {}",
                end, start
            )));
        }
    }
    Ok(())
}

/// Resolve an import argument to a numeric ID. Accepts either a bare ID
/// (`198820`) or a full page URL whose last path segment is the ID.
pub fn parse_item_ref(input: &str) -> Result<String, DisclosuresError> {
    let trimmed = input.trim().trim_end_matches('/');
    let candidate = match trimmed.rsplit_once('/') {
        Some((_, last)) => last,
        None => trimmed,
    };
    if !candidate.is_empty() && candidate.chars().all(|c| c.is_ascii_digit()) {
        Ok(candidate.to_string())
    } else {
        Err(DisclosuresError::InvalidInput(format!(
            "could not extract a numeric ID from '{}'",
            input
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_accepts_zero_and_fractions() {
        assert_eq!(validate_delay(0.0).unwrap(), 0.0);
        assert_eq!(validate_delay(1.5).unwrap(), 1.5);
    }

    #[test]
    fn delay_rejects_negative_and_nan() {
        assert!(validate_delay(-0.1).is_err());
        assert!(validate_delay(f64::NAN).is_err());
        assert!(validate_delay(f64::INFINITY).is_err());
    }

    #[test]
    fn max_failures_bounds() {
        assert_eq!(validate_max_failures(1).unwrap(), 1);
        assert!(validate_max_failures(0).is_err());
    }

    #[test]
    fn range_bounds() {
        assert!(validate_range(1, None).is_ok());
        assert!(validate_range(5, Some(5)).is_ok());
        assert!(validate_range(0, None).is_err());
        assert!(validate_range(10, Some(9)).is_err());
    }

    #[test]
    fn item_ref_accepts_id_and_url() {
        assert_eq!(parse_item_ref("198820").unwrap(), "198820");
        assert_eq!(
            parse_item_ref("https://disclosures.utah.gov/Search/PublicSearch/Report/198820")
                .unwrap(),
            "198820"
        );
        assert_eq!(
            parse_item_ref("https://lobbyist.utah.gov/Registration/EntityDetails/1410867/")
                .unwrap(),
            "1410867"
        );
    }

    #[test]
    fn item_ref_rejects_non_numeric() {
        assert!(parse_item_ref("").is_err());
        assert!(parse_item_ref("https://disclosures.utah.gov/Search/PublicSearch").is_err());
        assert!(parse_item_ref("abc123").is_err());
    }
}
