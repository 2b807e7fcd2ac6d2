//! # Parameters
//!
//! A parameter set is a flat mapping from parameter name to a scalar value, with optional
//! annotations. This module provides the `Parameter` record and the `ParameterList` mapping used
//! by both the menu resolution and the comparison of parameter files.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use serde::Deserialize;
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::iter::FromIterator;
use thiserror::Error;

use crate::matcher::{normalise_name, Matcher};
use util::maths::zeros_post_decimal;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of significant decimals shown by `Parameter::pretty_value`.
pub const PRETTY_PRECISION: i32 = 3;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// The MAVLink addressing of a parameter: vehicle ID and component ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId {
    pub vid: u8,
    pub cid: u8,
}

/// A single parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Upper case parameter name
    pub name: String,

    pub value: ParamValue,

    /// The declared type of the parameter, if known from the source.
    pub param_type: Option<ParamType>,

    /// Reasoning given for the value of this parameter.
    pub justification: Option<String>,

    /// Set when the parameter is marked as read only.
    pub readonly: bool,

    /// Catalog group this parameter belongs to, if known.
    pub group: Option<String>,

    pub component: ComponentId,
}

/// A flat list of parameters, keyed by name.
///
/// Iteration is always in name order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterList {
    params: BTreeMap<String, Parameter>,

    /// Name of the file this list was read from, if any.
    pub source_file: Option<String>,
}

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// A scalar parameter value.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
}

/// Parameter types supported by the autopilots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Int32,
    Float,
}

/// Errors which can occur when manipulating parameter lists.
#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("Parameter {0} does not exist in the base parameter set")]
    UnknownParameter(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Default for ComponentId {
    fn default() -> Self {
        ComponentId { vid: 1, cid: 1 }
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.vid, self.cid)
    }
}

impl ParamValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            ParamValue::Int(i) => i as f64,
            ParamValue::Float(f) => f,
        }
    }

    /// Convert the value to the given type. Floats are truncated towards zero.
    pub fn cast(self, param_type: ParamType) -> Self {
        match (self, param_type) {
            (ParamValue::Float(f), ParamType::Int32) => ParamValue::Int(f as i64),
            (ParamValue::Int(i), ParamType::Float) => ParamValue::Float(i as f64),
            (v, _) => v,
        }
    }

    /// The type naturally holding this value.
    pub fn natural_type(&self) -> ParamType {
        match self {
            ParamValue::Int(_) => ParamType::Int32,
            ParamValue::Float(_) => ParamType::Float,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(i) => write!(f, "{}", i),
            ParamValue::Float(v) => write!(f, "{}", v),
        }
    }
}

impl ParamType {
    /// Get the type from a MAVLink parameter type code.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            6 => Some(ParamType::Int32),
            9 => Some(ParamType::Float),
            _ => None,
        }
    }

    /// The MAVLink parameter type code.
    pub fn code(&self) -> i32 {
        match self {
            ParamType::Int32 => 6,
            ParamType::Float => 9,
        }
    }
}

impl Parameter {
    /// Create a new untyped parameter with default addressing.
    pub fn new(name: &str, value: ParamValue) -> Self {
        Parameter {
            name: normalise_name(name),
            value,
            param_type: None,
            justification: None,
            readonly: false,
            group: None,
            component: ComponentId::default(),
        }
    }

    /// Create a new parameter with a declared type, casting the value to it.
    pub fn typed(name: &str, value: ParamValue, param_type: ParamType) -> Self {
        let mut param = Parameter::new(name, value.cast(param_type));
        param.param_type = Some(param_type);
        param
    }

    /// The declared type, or the type inferred from the value.
    pub fn effective_type(&self) -> ParamType {
        match self.param_type {
            Some(t) => t,
            None => self.value.natural_type(),
        }
    }

    /// Set the value, casting it to the declared type if there is one.
    pub fn set_value(&mut self, value: ParamValue) {
        self.value = match self.param_type {
            Some(t) => value.cast(t),
            None => value,
        };
    }

    /// Get a printable string of the value.
    ///
    /// Integers are printed as-is, floats are printed with `PRETTY_PRECISION` significant decimals
    /// past any leading zeros, with trailing zeros removed but at least one decimal kept. Untyped
    /// floats with no fractional part are printed as integers.
    pub fn pretty_value(&self) -> String {
        match (self.value, self.param_type) {
            (ParamValue::Int(i), _) => i.to_string(),
            (ParamValue::Float(f), Some(ParamType::Int32)) => (f as i64).to_string(),
            (ParamValue::Float(f), None) if f.is_finite() && f.fract() == 0.0 => {
                (f as i64).to_string()
            }
            (ParamValue::Float(f), _) => pretty_float(f, PRETTY_PRECISION),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let type_str = match self.param_type {
            Some(ParamType::Int32) => "I",
            Some(ParamType::Float) => "F",
            None => "",
        };
        write!(f, "{:16} ({}):\t{}", self.name, type_str, self.pretty_value())
    }
}

impl ParameterList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Get a parameter by name.
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.get(&normalise_name(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.params.get_mut(&normalise_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(&normalise_name(name))
    }

    /// Iterate over the parameters in name order.
    pub fn iter(&self) -> btree_map::Values<'_, String, Parameter> {
        self.params.values()
    }

    pub fn iter_mut(&mut self) -> btree_map::ValuesMut<'_, String, Parameter> {
        self.params.values_mut()
    }

    /// Iterate over the parameter names in order.
    pub fn names(&self) -> btree_map::Keys<'_, String, Parameter> {
        self.params.keys()
    }

    /// Insert a whole parameter, replacing any existing parameter of the same name.
    pub fn insert(&mut self, param: Parameter) -> Option<Parameter> {
        self.params.insert(param.name.clone(), param)
    }

    /// Set the value of a parameter.
    ///
    /// If the parameter exists its value is overwritten (cast to its declared type) and the
    /// justification is replaced if one is given. Otherwise a new untyped parameter is inserted.
    pub fn set(&mut self, name: &str, value: ParamValue, justification: Option<String>) {
        let name = normalise_name(name);

        match self.params.get_mut(&name) {
            Some(param) => {
                param.set_value(value);
                if justification.is_some() {
                    param.justification = justification;
                }
            }
            None => {
                let mut param = Parameter::new(&name, value);
                param.justification = justification;
                self.params.insert(name, param);
            }
        }
    }

    /// Remove every parameter whose name is matched, returning the removed parameters.
    pub fn remove(&mut self, matcher: &Matcher) -> Vec<Parameter> {
        match matcher {
            Matcher::Exact(name) => self.params.remove(name).into_iter().collect(),
            Matcher::Pattern { .. } => self.remove_where(|p| matcher.is_match(&p.name)),
        }
    }

    /// Remove every parameter whose catalog group is matched, returning the removed parameters.
    pub fn remove_group(&mut self, matcher: &Matcher) -> Vec<Parameter> {
        self.remove_where(|p| match p.group {
            Some(ref g) => matcher.is_match(g),
            None => false,
        })
    }

    /// Apply every parameter of `other` onto this list.
    ///
    /// Values in `other` overwrite existing values, keeping the existing parameter's type and
    /// addressing. If `allow_new` is false and `other` contains a parameter which doesn't exist in
    /// this list nothing is applied and `ParamError::UnknownParameter` is returned, naming the
    /// first such parameter.
    pub fn merge(&mut self, other: &ParameterList, allow_new: bool) -> Result<(), ParamError> {
        if !allow_new {
            if let Some(name) = other.names().find(|n| !self.params.contains_key(*n)) {
                return Err(ParamError::UnknownParameter(name.clone()));
            }
        }

        for param in other.iter() {
            match self.params.get_mut(&param.name) {
                Some(existing) => {
                    trace!("Overwriting {} with {}", existing, param.pretty_value());
                    existing.set_value(param.value);
                    if param.justification.is_some() {
                        existing.justification = param.justification.clone();
                    }
                    existing.readonly |= param.readonly;
                }
                None => {
                    trace!("Adding new parameter {}", param);
                    self.params.insert(param.name.clone(), param.clone());
                }
            }
        }

        Ok(())
    }

    fn remove_where<F>(&mut self, pred: F) -> Vec<Parameter>
    where
        F: Fn(&Parameter) -> bool,
    {
        let names: Vec<String> = self
            .params
            .values()
            .filter(|p| pred(p))
            .map(|p| p.name.clone())
            .collect();

        names
            .iter()
            .filter_map(|n| self.params.remove(n))
            .collect()
    }
}

impl FromIterator<Parameter> for ParameterList {
    fn from_iter<I: IntoIterator<Item = Parameter>>(iter: I) -> Self {
        let mut list = ParameterList::new();
        for param in iter {
            list.insert(param);
        }
        list
    }
}

impl<'a> IntoIterator for &'a ParameterList {
    type Item = &'a Parameter;
    type IntoIter = btree_map::Values<'a, String, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for ParameterList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<String> = self.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn pretty_float(value: f64, precision: i32) -> String {
    if value == 0.0 {
        return "0.0".into();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    let digits = (precision + zeros_post_decimal(value)).max(1) as usize;
    let mut string = format!("{:.*}", digits, value);

    // Delete trailing decimal zeroes, keeping at least one
    if string.contains('.') {
        while string.ends_with('0') {
            string.pop();
        }
        if string.ends_with('.') {
            string.push('0');
        }
    }

    string
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn list(entries: &[(&str, f64)]) -> ParameterList {
        entries
            .iter()
            .map(|(n, v)| Parameter::new(n, ParamValue::Float(*v)))
            .collect()
    }

    #[test]
    fn test_pretty_value() {
        let p = Parameter::typed("P", ParamValue::Int(5), ParamType::Int32);
        assert_eq!(p.pretty_value(), "5");

        let p = Parameter::typed("P", ParamValue::Int(5), ParamType::Float);
        assert_eq!(p.pretty_value(), "5.0");

        let p = Parameter::new("P", ParamValue::Float(5.0));
        assert_eq!(p.pretty_value(), "5");

        let p = Parameter::typed("P", ParamValue::Float(0.0), ParamType::Float);
        assert_eq!(p.pretty_value(), "0.0");

        let p = Parameter::new("P", ParamValue::Float(0.123456));
        assert_eq!(p.pretty_value(), "0.123");

        let p = Parameter::new("P", ParamValue::Float(0.00123456));
        assert_eq!(p.pretty_value(), "0.00123");

        let p = Parameter::new("P", ParamValue::Float(2.5));
        assert_eq!(p.pretty_value(), "2.5");

        let p = Parameter::new("P", ParamValue::Float(-1234.5));
        assert_eq!(p.pretty_value(), "-1234.5");
    }

    #[test]
    fn test_set() {
        let mut params = ParameterList::new();
        params.insert(Parameter::typed("A", ParamValue::Int(1), ParamType::Int32));

        // Existing typed parameter keeps its type
        params.set("a", ParamValue::Float(2.7), Some("why".into()));
        let a = params.get("A").unwrap();
        assert_eq!(a.value, ParamValue::Int(2));
        assert_eq!(a.justification.as_deref(), Some("why"));

        // Justification is kept if none is given
        params.set("A", ParamValue::Int(3), None);
        assert_eq!(params.get("A").unwrap().justification.as_deref(), Some("why"));

        // New parameters are inserted
        params.set("b", ParamValue::Float(0.5), None);
        assert_eq!(params.get("B").unwrap().value, ParamValue::Float(0.5));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut params = list(&[("CAL_ACC0_X", 1.0), ("CAL_ACC1_X", 2.0), ("MC_ROLL_P", 3.0)]);

        let removed = params.remove(&Matcher::parse("MC_ROLL_P").unwrap());
        assert_eq!(removed.len(), 1);
        assert!(!params.contains("MC_ROLL_P"));

        // Removing something absent is not an error
        assert!(params.remove(&Matcher::parse("MC_ROLL_P").unwrap()).is_empty());

        let removed = params.remove(&Matcher::parse(r"CAL_ACC\d_X").unwrap());
        assert_eq!(removed.len(), 2);
        assert!(params.is_empty());
    }

    #[test]
    fn test_remove_group() {
        let mut params = list(&[("BAT_V", 1.0), ("BAT_A", 2.0), ("MC_P", 3.0)]);
        params.get_mut("BAT_V").unwrap().group = Some("Battery Calibration".into());
        params.get_mut("BAT_A").unwrap().group = Some("Battery".into());

        let removed = params.remove_group(&Matcher::parse("Battery.*").unwrap());
        assert_eq!(removed.len(), 2);
        assert_eq!(params.names().collect::<Vec<_>>(), vec!["MC_P"]);
    }

    #[test]
    fn test_merge() {
        let mut base = list(&[("A", 1.0), ("B", 2.0)]);

        // Only existing parameters
        base.merge(&list(&[("B", 3.0)]), false).unwrap();
        assert_eq!(base.get("B").unwrap().value, ParamValue::Float(3.0));

        // New parameter without permission fails and leaves the list untouched
        let before = base.clone();
        let err = base.merge(&list(&[("A", 7.0), ("C", 4.0)]), false).unwrap_err();
        assert_eq!(err, ParamError::UnknownParameter("C".into()));
        assert_eq!(base, before);

        // New parameter with permission
        base.merge(&list(&[("C", 4.0)]), true).unwrap();
        assert_eq!(base.len(), 3);
    }
}
