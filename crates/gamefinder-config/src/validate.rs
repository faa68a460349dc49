//! Parsing helpers shared by the environment loader and CLI overrides.

use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;

use url::Url;

use crate::error::{ConfigError, ConfigResult};

/// Parse `raw` as an integer inside `range`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when `raw` is not an integer or falls
/// outside `range`.
pub fn parse_bounded<T>(field: &'static str, raw: &str, range: &RangeInclusive<T>) -> ConfigResult<T>
where
    T: FromStr + PartialOrd + Copy + Display,
{
    let value = raw
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidField {
            field,
            value: Some(raw.to_string()),
            reason: "must be an integer",
        })?;
    check_bounds(field, value, range)
}

/// Ensure an already-typed value falls inside `range`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] when `value` is out of range.
pub fn check_bounds<T>(field: &'static str, value: T, range: &RangeInclusive<T>) -> ConfigResult<T>
where
    T: PartialOrd + Copy + Display,
{
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidField {
            field,
            value: Some(value.to_string()),
            reason: "out of range",
        })
    }
}

/// Parse an absolute http(s) base URL and make sure it ends with `/`.
///
/// Without the trailing slash `Url::join` would replace the last path segment
/// (`/api` + `games` = `/games`).
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] for relative URLs or non-http schemes.
pub fn parse_base_url(field: &'static str, raw: &str) -> ConfigResult<Url> {
    let invalid = |reason| ConfigError::InvalidField {
        field,
        value: Some(raw.to_string()),
        reason,
    };
    let mut url = Url::parse(raw.trim()).map_err(|_| invalid("must be an absolute url"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_values_are_checked() {
        assert_eq!(parse_bounded("page_size", " 40 ", &(1..=40)).ok(), Some(40));
        let err = parse_bounded("page_size", "41", &(1_u32..=40)).expect_err("too large");
        assert!(matches!(
            err,
            ConfigError::InvalidField {
                field: "page_size",
                reason: "out of range",
                ..
            }
        ));
        let err = parse_bounded("page_size", "ten", &(1_u32..=40)).expect_err("not numeric");
        assert!(matches!(
            err,
            ConfigError::InvalidField {
                reason: "must be an integer",
                ..
            }
        ));
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let url = parse_base_url("api_url", "https://example.test/api").expect("valid url");
        assert_eq!(url.as_str(), "https://example.test/api/");
        assert_eq!(
            url.join("games").expect("join").as_str(),
            "https://example.test/api/games"
        );
        assert!(parse_base_url("api_url", "ftp://example.test/").is_err());
        assert!(parse_base_url("api_url", "/relative").is_err());
    }
}
