//! # Menu configuration
//!
//! The paths to the menu and the default parameter source are resolved once, at the command line
//! boundary, and then passed explicitly to the loader and resolver. An explicit argument always
//! takes priority over the environment.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use std::path::{Path, PathBuf};
use thiserror::Error;

use util::host::{get_env_path, HostError};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Environment variable holding the menu root folder.
pub const MENU_PATH_VAR: &str = "CHEF_MENU_PATH";

/// Environment variable holding the default parameter source.
pub const DEFAULTS_VAR: &str = "CHEF_DEFAULTS";

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Locations of the menu and of the global default parameter source.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuPaths {
    /// The menu root folder
    pub root: PathBuf,

    /// Default parameter source used by meals which don't give their own `defaults`.
    pub default_params: Option<PathBuf>,
}

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "No menu path given, pass one on the command line or set the {} environment variable",
        MENU_PATH_VAR
    )]
    MenuPathNotSet,

    #[error("The menu path {0:?} is not a directory")]
    NotADirectory(PathBuf),

    #[error("Cannot read the environment: {0}")]
    HostError(HostError),
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl MenuPaths {
    /// Resolve the paths from the explicit arguments, falling back on the environment.
    pub fn from_env(
        explicit_menu: Option<&Path>,
        explicit_defaults: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let env_menu = env_path(MENU_PATH_VAR)?;
        let env_defaults = env_path(DEFAULTS_VAR)?;

        let paths = Self::resolve(
            explicit_menu,
            explicit_defaults,
            env_menu.as_deref(),
            env_defaults.as_deref(),
        )?;

        if !paths.root.is_dir() {
            return Err(ConfigError::NotADirectory(paths.root));
        }

        debug!("Menu paths: {:?}", paths);

        Ok(paths)
    }

    /// Apply the precedence rule: explicit argument, then environment, then nothing.
    pub fn resolve(
        explicit_menu: Option<&Path>,
        explicit_defaults: Option<&Path>,
        env_menu: Option<&Path>,
        env_defaults: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        let root = match explicit_menu.or(env_menu) {
            Some(p) => p.to_path_buf(),
            None => return Err(ConfigError::MenuPathNotSet),
        };

        Ok(MenuPaths {
            root,
            default_params: explicit_defaults.or(env_defaults).map(Path::to_path_buf),
        })
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Read an optional path from the environment.
fn env_path(var: &str) -> Result<Option<PathBuf>, ConfigError> {
    match get_env_path(var) {
        Ok(p) => Ok(Some(p)),
        Err(HostError::VarNotSet(_)) => Ok(None),
        Err(e) => Err(ConfigError::HostError(e)),
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
