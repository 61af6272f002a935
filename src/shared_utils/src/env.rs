use std::{fmt::Display, str::FromStr};

use thiserror::Error;

/// An environment variable required by the application is not set.
#[derive(Debug, Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVarError(pub String);

/// An environment variable is set but its value could not be parsed.
#[derive(Debug, Error)]
#[error("Invalid value for environment variable {name}: {message}")]
pub struct InvalidEnvVarError {
    pub name: String,
    pub message: String,
}

/// Reads an environment variable, returning a structured error if it's missing.
///
/// Values that are empty after trimming count as missing.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
pub fn get_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    optional_env_var(name).ok_or_else(|| MissingEnvVarError(name.to_string()))
}

/// Reads an environment variable that may legitimately be absent.
pub fn optional_env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Reads and parses an optional environment variable.
///
/// Returns `Ok(None)` when the variable is unset, and an error when it is set
/// to something `T` cannot parse.
pub fn parse_env_var<T>(name: &str) -> Result<Option<T>, InvalidEnvVarError>
where
    T: FromStr,
    T::Err: Display,
{
    match optional_env_var(name) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|e| InvalidEnvVarError {
            name: name.to_string(),
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Variable names are unique per test so they can run in parallel.

    #[test]
    fn missing_var_reports_name() {
        let err = get_env_var("SHARED_UTILS_TEST_DEFINITELY_UNSET").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing environment variable: SHARED_UTILS_TEST_DEFINITELY_UNSET"
        );
    }

    #[test]
    fn blank_value_counts_as_missing() {
        unsafe { std::env::set_var("SHARED_UTILS_TEST_BLANK", "   ") };
        assert!(optional_env_var("SHARED_UTILS_TEST_BLANK").is_none());
        assert!(get_env_var("SHARED_UTILS_TEST_BLANK").is_err());
    }

    #[test]
    fn parses_present_value() {
        unsafe { std::env::set_var("SHARED_UTILS_TEST_NUMBER", " 42 ") };
        let v: Option<u64> = parse_env_var("SHARED_UTILS_TEST_NUMBER").unwrap();
        assert_eq!(v, Some(42));
    }

    #[test]
    fn rejects_unparseable_value() {
        unsafe { std::env::set_var("SHARED_UTILS_TEST_BAD_NUMBER", "forty-two") };
        let err = parse_env_var::<u64>("SHARED_UTILS_TEST_BAD_NUMBER").unwrap_err();
        assert_eq!(err.name, "SHARED_UTILS_TEST_BAD_NUMBER");
    }
}
