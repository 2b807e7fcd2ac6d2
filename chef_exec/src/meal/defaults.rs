//! Default parameter set loading

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

use params_if::format::{read_params, ParseError};
use params_if::ParameterList;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Provides the default parameter set a meal is built on.
pub trait DefaultsLoader {
    fn load(&self, path: &Path) -> Result<ParameterList, DefaultsError>;
}

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Loads default parameters from a parameter file on disk, in any readable format.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileDefaultsLoader;

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum DefaultsError {
    #[error("Default parameter file {0:?} does not exist")]
    NotFound(PathBuf),

    #[error("Default parameter file {path:?} cannot be read: {source}")]
    Unreadable { path: PathBuf, source: ParseError },
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl DefaultsLoader for FileDefaultsLoader {
    fn load(&self, path: &Path) -> Result<ParameterList, DefaultsError> {
        debug!("Loading default parameters from {:?}", path);

        match read_params(path) {
            Ok(list) => Ok(list),
            Err(ParseError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                Err(DefaultsError::NotFound(path.to_path_buf()))
            }
            Err(e) => Err(DefaultsError::Unreadable {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use params_if::ParamValue;

    #[test]
    fn test_file_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("defaults.params");
        std::fs::write(&path, "1\t1\tMC_ROLL_P\t6.5\t9\n1\t1\tSYS_AUTOSTART\t4001\t6\n").unwrap();

        let list = FileDefaultsLoader.load(&path).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(
            list.get("SYS_AUTOSTART").unwrap().value,
            ParamValue::Int(4001)
        );
    }

    #[test]
    fn test_file_loader_errors() {
        let dir = tempfile::tempdir().unwrap();

        assert!(matches!(
            FileDefaultsLoader.load(&dir.path().join("missing.params")),
            Err(DefaultsError::NotFound(_))
        ));

        let path = dir.path().join("garbage.params");
        std::fs::write(&path, "this is not a parameter file").unwrap();
        assert!(matches!(
            FileDefaultsLoader.load(&path),
            Err(DefaultsError::Unreadable { .. })
        ));
    }
}
