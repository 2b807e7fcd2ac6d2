//! Generic YAML document loading

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::fs::read_to_string;
use std::path::Path;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a YAML document.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Cannot load the file: {0}")]
    FileLoadError(std::io::Error),

    #[error("Cannot read the file: {0}")]
    DeserialiseError(serde_yaml::Error),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Load a YAML document into the given type.
///
/// An empty document is loaded as YAML `null`, so types which accept `null`
/// (such as `Option<T>` or structs where every field is optional) can be
/// loaded from empty files.
pub fn load<P, D>(path: P) -> Result<D, LoadError>
where
    P: AsRef<Path>,
    D: DeserializeOwned,
{
    // Load the file into a string
    let doc_str = match read_to_string(path.as_ref()) {
        Ok(s) => s,
        Err(e) => return Err(LoadError::FileLoadError(e)),
    };

    from_str(&doc_str)
}

/// Parse a YAML document from a string.
pub fn from_str<D>(doc_str: &str) -> Result<D, LoadError>
where
    D: DeserializeOwned,
{
    let doc_str = if doc_str.trim().is_empty() { "~" } else { doc_str };

    match serde_yaml::from_str(doc_str) {
        Ok(d) => Ok(d),
        Err(e) => Err(LoadError::DeserialiseError(e)),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(deny_unknown_fields)]
    struct Doc {
        name: Option<String>,
        values: Option<Vec<i64>>,
    }

    #[test]
    fn test_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.yaml");
        std::fs::write(&path, "name: apple\nvalues: [1, 2]\n").unwrap();

        let doc: Doc = load(&path).unwrap();
        assert_eq!(doc.name.as_deref(), Some("apple"));
        assert_eq!(doc.values, Some(vec![1, 2]));

        assert!(matches!(
            load::<_, Doc>(dir.path().join("missing.yaml")),
            Err(LoadError::FileLoadError(_))
        ));
    }

    #[test]
    fn test_from_str() {
        let doc: Option<Doc> = from_str("").unwrap();
        assert!(doc.is_none());

        let err = from_str::<Doc>("nmae: apple\n").unwrap_err();
        assert!(format!("{}", err).contains("nmae"));
    }
}
