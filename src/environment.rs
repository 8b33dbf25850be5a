use std::env;
use std::fmt::Display;
use std::str::FromStr;
use tracing::warn;

/// Retrieves an environment variable and splits it into a vector of strings based on a delimiter.
///
/// Empty segments are dropped, so an unset variable yields an empty vector.
pub fn get_env_var_as_vec(var: &str, delimiter: char) -> Vec<String> {
    env::var(var)
        .unwrap_or_default()
        .split(delimiter)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Returns the trimmed value of a set, non-empty environment variable.
pub fn get_env_var(var: &str) -> Option<String> {
    env::var(var)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses an environment variable, logging and ignoring unparseable values.
pub fn get_env_var_parsed<T>(var: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = get_env_var(var)?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring invalid value '{}' for {}: {}", raw, var, e);
            None
        }
    }
}

/// Parses an environment variable, falling back to `default` when it is unset or invalid.
pub fn get_env_var_or<T>(var: &str, default: T) -> T
where
    T: FromStr,
    T::Err: Display,
{
    get_env_var_parsed(var).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable names; the process environment is shared.

    #[test]
    fn test_get_env_var_as_vec() {
        env::set_var("OVERVIEW_GAP_TEST_LIST", " uno; due ;;tre ");
        assert_eq!(
            get_env_var_as_vec("OVERVIEW_GAP_TEST_LIST", ';'),
            vec!["uno", "due", "tre"]
        );
        assert!(get_env_var_as_vec("OVERVIEW_GAP_TEST_UNSET_LIST", ';').is_empty());
    }

    #[test]
    fn test_parsed_values() {
        env::set_var("OVERVIEW_GAP_TEST_FLOAT", "0.75");
        env::set_var("OVERVIEW_GAP_TEST_BAD", "molto");
        env::set_var("OVERVIEW_GAP_TEST_BLANK", "   ");
        assert_eq!(get_env_var_parsed::<f64>("OVERVIEW_GAP_TEST_FLOAT"), Some(0.75));
        assert_eq!(get_env_var_or("OVERVIEW_GAP_TEST_BAD", 6usize), 6);
        assert_eq!(get_env_var("OVERVIEW_GAP_TEST_BLANK"), None);
    }
}
