use std::env;
use std::io::{self, BufRead, IsTerminal, Write};

use crate::core::errors::ApiError;

/// Resolves an API key: explicit config value first, then the environment,
/// then an interactive prompt when stdin is a terminal. Returns `Ok(None)`
/// for optional keys that stay unset.
pub fn resolve_api_key(
    configured: Option<&str>,
    env_var: &str,
    required: bool,
) -> Result<Option<String>, ApiError> {
    if let Some(value) = configured {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Ok(Some(trimmed.to_string()));
        }
    }

    if let Ok(value) = env::var(env_var) {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Ok(Some(trimmed.to_string()));
        }
    }

    if !required {
        return Ok(None);
    }

    if io::stdin().is_terminal() {
        return prompt_for_key(env_var).map(Some);
    }

    Err(ApiError::BadRequest(format!(
        "{} is not set; add it to secrets.yml or the environment",
        env_var
    )))
}

fn prompt_for_key(env_var: &str) -> Result<String, ApiError> {
    let mut stderr = io::stderr();
    write!(stderr, "{}: ", env_var).map_err(ApiError::internal)?;
    stderr.flush().map_err(ApiError::internal)?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(ApiError::internal)?;

    let key = line.trim().to_string();
    if key.is_empty() {
        return Err(ApiError::BadRequest(format!("{} cannot be empty", env_var)));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_value_wins_over_environment() {
        env::set_var("CORRAG_TEST_KEY_A", "from-env");
        let resolved = resolve_api_key(Some("from-config"), "CORRAG_TEST_KEY_A", true).unwrap();
        assert_eq!(resolved.as_deref(), Some("from-config"));
        env::remove_var("CORRAG_TEST_KEY_A");
    }

    #[test]
    fn falls_back_to_environment() {
        env::set_var("CORRAG_TEST_KEY_B", "from-env");
        let resolved = resolve_api_key(None, "CORRAG_TEST_KEY_B", true).unwrap();
        assert_eq!(resolved.as_deref(), Some("from-env"));
        env::remove_var("CORRAG_TEST_KEY_B");
    }

    #[test]
    fn optional_key_resolves_to_none() {
        let resolved = resolve_api_key(None, "CORRAG_TEST_KEY_C", false).unwrap();
        assert!(resolved.is_none());
    }

    #[test]
    fn blank_config_value_is_ignored() {
        let resolved = resolve_api_key(Some("   "), "CORRAG_TEST_KEY_D", false).unwrap();
        assert!(resolved.is_none());
    }
}
