//! # Parameter matchers
//!
//! Calibration, operator and allergen entries may either name a single parameter or give a
//! regular expression selecting a group of parameters. Entries are classified once, when they are
//! parsed, so that every "does this entry match this name" question is answered the same way.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// Selects parameters either by exact name or by a regular expression.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// A literal parameter name, stored normalised to upper case.
    Exact(String),

    /// A regular expression which must match the whole name, case insensitive.
    Pattern {
        /// The expression as written in the menu.
        source: String,
        regex: Regex,
    },
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Matcher {
    /// Parse an entry into a matcher.
    ///
    /// Entries made only of ASCII letters, digits and underscores are exact names, anything else
    /// is compiled as a regular expression.
    pub fn parse(entry: &str) -> Result<Self, regex::Error> {
        let entry = entry.trim();

        if is_identifier(entry) {
            return Ok(Matcher::Exact(entry.to_ascii_uppercase()));
        }

        let regex = RegexBuilder::new(&format!("^(?:{})$", entry))
            .case_insensitive(true)
            .build()?;

        Ok(Matcher::Pattern {
            source: entry.to_string(),
            regex,
        })
    }

    /// Build an exact name matcher.
    pub fn exact(name: &str) -> Self {
        Matcher::Exact(normalise_name(name))
    }

    /// Returns true if the given name is selected by this matcher.
    pub fn is_match(&self, name: &str) -> bool {
        match self {
            Matcher::Exact(n) => n.eq_ignore_ascii_case(name),
            Matcher::Pattern { regex, .. } => regex.is_match(name),
        }
    }

    /// The entry this matcher was built from.
    pub fn as_str(&self) -> &str {
        match self {
            Matcher::Exact(n) => n,
            Matcher::Pattern { source, .. } => source,
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, Matcher::Pattern { .. })
    }
}

impl PartialEq for Matcher {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Matcher {}

impl PartialOrd for Matcher {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Matcher {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl Hash for Matcher {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state)
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Returns true if the name is a plain parameter identifier.
pub fn is_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Normalise a literal parameter name.
///
/// Parameter names are case insensitive on the autopilots, they are stored upper case.
pub fn normalise_name(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_exact() {
        let m = Matcher::parse("cal_acc0_id").unwrap();
        assert_eq!(m, Matcher::Exact("CAL_ACC0_ID".into()));
        assert!(!m.is_pattern());
        assert!(m.is_match("CAL_ACC0_ID"));
        assert!(m.is_match("cal_acc0_id"));
        assert!(!m.is_match("CAL_ACC0_IDX"));
    }

    #[test]
    fn test_parse_pattern() {
        let m = Matcher::parse(r"CAL_ACC\d_.*").unwrap();
        assert!(m.is_pattern());
        assert_eq!(m.as_str(), r"CAL_ACC\d_.*");
        assert!(m.is_match("CAL_ACC0_XOFF"));
        assert!(m.is_match("cal_acc1_yoff"));
        assert!(!m.is_match("CAL_GYRO0_XOFF"));

        // Patterns are anchored to the whole name
        let m = Matcher::parse("ACC.*").unwrap();
        assert!(!m.is_match("CAL_ACC0_XOFF"));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Matcher::parse("CAL_(").is_err());
    }
}
