//! Host environment utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::env;
use std::path::PathBuf;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur while reading paths from the host environment.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("The environment variable {0} is not set")]
    VarNotSet(String),

    #[error("The environment variable {0} does not contain valid unicode")]
    VarNotUnicode(String),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get a path from the given environment variable.
///
/// A leading `~` is expanded to the user's home directory when `HOME` is
/// available. Empty values are treated as not set.
pub fn get_env_path(var: &str) -> Result<PathBuf, HostError> {
    let value = match env::var(var) {
        Ok(v) => v,
        Err(env::VarError::NotPresent) => return Err(HostError::VarNotSet(var.into())),
        Err(env::VarError::NotUnicode(_)) => {
            return Err(HostError::VarNotUnicode(var.into()))
        }
    };

    if value.trim().is_empty() {
        return Err(HostError::VarNotSet(var.into()));
    }

    Ok(expand_home(&value))
}

/// Expand a leading `~` in the given path string.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Ok(home) = env::var("HOME") {
            let mut expanded = PathBuf::from(home);
            let rest = rest.trim_start_matches('/');
            if !rest.is_empty() {
                expanded.push(rest);
            }
            return expanded;
        }
    }

    PathBuf::from(path)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_env_path() {
        env::set_var("UTIL_HOST_TEST_PATH", "/tmp/menu");
        assert_eq!(
            get_env_path("UTIL_HOST_TEST_PATH").unwrap(),
            PathBuf::from("/tmp/menu")
        );

        env::set_var("UTIL_HOST_TEST_EMPTY", "  ");
        assert!(matches!(
            get_env_path("UTIL_HOST_TEST_EMPTY"),
            Err(HostError::VarNotSet(_))
        ));

        assert!(matches!(
            get_env_path("UTIL_HOST_TEST_DEFINITELY_UNSET"),
            Err(HostError::VarNotSet(_))
        ));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));

        if let Ok(home) = env::var("HOME") {
            assert_eq!(expand_home("~/menu"), PathBuf::from(home).join("menu"));
        }
    }
}
