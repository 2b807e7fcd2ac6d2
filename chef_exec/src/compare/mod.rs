//! # Comparator
//!
//! Structural diff of two parameter lists. Values are compared numerically with a relative
//! tolerance, so that different renderings of the same value (`5` and `5.000000`) are equal.
//! Differences are grouped by the component addressing carried by the input files.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod report;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, trace};
use std::collections::{BTreeMap, BTreeSet};

use params_if::{ComponentId, Matcher, ParamValue, Parameter, ParameterList};
use util::maths::rel_diff_exceeds;

pub use report::render;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Relative tolerance between two values, allowing a displayed precision of three digits.
pub const PARAM_EPS_PCT: f64 = 0.006;

/// Added to the denominator of the relative difference so that zeros can be compared.
pub const EPS: f64 = 1e-6;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// The differences between two parameter lists, grouped by component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffResult {
    components: BTreeMap<ComponentId, Vec<ParamDiff>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// A single differing parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamDiff {
    /// Only present in the second list
    Added(Parameter),

    /// Only present in the first list
    Removed(Parameter),

    /// Present in both lists with different values
    Changed { old: Parameter, new: Parameter },
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl ParamDiff {
    pub fn name(&self) -> &str {
        match self {
            ParamDiff::Added(p) | ParamDiff::Removed(p) => &p.name,
            ParamDiff::Changed { old, .. } => &old.name,
        }
    }

    /// The parameter in the first list, if any.
    pub fn old(&self) -> Option<&Parameter> {
        match self {
            ParamDiff::Added(_) => None,
            ParamDiff::Removed(p) | ParamDiff::Changed { old: p, .. } => Some(p),
        }
    }

    /// The parameter in the second list, if any.
    pub fn new(&self) -> Option<&Parameter> {
        match self {
            ParamDiff::Removed(_) => None,
            ParamDiff::Added(p) | ParamDiff::Changed { new: p, .. } => Some(p),
        }
    }

    fn component(&self) -> ComponentId {
        match self.old() {
            Some(p) => p.component,
            None => self.new().map(|p| p.component).unwrap_or_default(),
        }
    }
}

impl DiffResult {
    /// Number of differing parameters.
    pub fn count(&self) -> usize {
        self.components.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Iterate over the components and their differences, in addressing order.
    pub fn components(&self) -> impl Iterator<Item = (&ComponentId, &Vec<ParamDiff>)> {
        self.components.iter()
    }

    /// Iterate over every difference.
    pub fn iter(&self) -> impl Iterator<Item = &ParamDiff> {
        self.components.values().flatten()
    }

    /// Names of the parameters only present in the second list.
    pub fn added(&self) -> BTreeSet<&str> {
        self.names_where(|d| matches!(d, ParamDiff::Added(_)))
    }

    /// Names of the parameters only present in the first list.
    pub fn removed(&self) -> BTreeSet<&str> {
        self.names_where(|d| matches!(d, ParamDiff::Removed(_)))
    }

    /// Names of the parameters present in both lists with different values.
    pub fn changed(&self) -> BTreeSet<&str> {
        self.names_where(|d| matches!(d, ParamDiff::Changed { .. }))
    }

    /// Keep only the differences of the given component ID.
    pub fn only_component(mut self, cid: u8) -> Self {
        self.components.retain(|id, _| id.cid == cid);
        self
    }

    fn push(&mut self, diff: ParamDiff) {
        self.components
            .entry(diff.component())
            .or_insert_with(Vec::new)
            .push(diff);
    }

    fn names_where<F>(&self, pred: F) -> BTreeSet<&str>
    where
        F: Fn(&ParamDiff) -> bool,
    {
        self.iter().filter(|d| pred(d)).map(ParamDiff::name).collect()
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Compare two parameter lists.
///
/// Parameters matched by any of the `exclude` matchers are ignored entirely.
pub fn diff(a: &ParameterList, b: &ParameterList, exclude: &[Matcher]) -> DiffResult {
    let names: BTreeSet<&String> = a.names().chain(b.names()).collect();
    let mut result = DiffResult::default();

    for name in names {
        if exclude.iter().any(|m| m.is_match(name)) {
            trace!("Parameter {} is excluded from the comparison", name);
            continue;
        }

        let entry = match (a.get(name), b.get(name)) {
            (Some(pa), None) => ParamDiff::Removed(pa.clone()),
            (None, Some(pb)) => ParamDiff::Added(pb.clone()),
            (Some(pa), Some(pb)) if values_differ(pa.value, pb.value) => ParamDiff::Changed {
                old: pa.clone(),
                new: pb.clone(),
            },
            _ => continue,
        };

        result.push(entry);
    }

    debug!("{} parameters differ", result.count());

    result
}

/// Returns true if the two values differ by more than the comparison tolerance.
///
/// Integers and floats are compared alike, only the numeric value matters.
pub fn values_differ(a: ParamValue, b: ParamValue) -> bool {
    rel_diff_exceeds(a.as_f64(), b.as_f64(), PARAM_EPS_PCT, EPS)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::list;

    #[test]
    fn test_tolerant_equality() {
        let a = list(&[("X", ParamValue::Int(5)), ("Y", ParamValue::Int(1))]);
        let b = list(&[("X", ParamValue::Float(5.0)), ("Y", ParamValue::Int(2))]);

        let result = diff(&a, &b, &[]);
        assert_eq!(result.count(), 1);
        assert_eq!(result.changed().into_iter().collect::<Vec<_>>(), vec!["Y"]);
        assert!(result.added().is_empty());
        assert!(result.removed().is_empty());
    }

    #[test]
    fn test_values_differ() {
        assert!(!values_differ(ParamValue::Float(0.0), ParamValue::Int(0)));
        assert!(!values_differ(ParamValue::Float(1.0), ParamValue::Float(1.004)));
        assert!(values_differ(ParamValue::Float(1.0), ParamValue::Float(1.1)));
        assert!(values_differ(ParamValue::Int(100), ParamValue::Int(101)));
    }

    #[test]
    fn test_integers_use_tolerance() {
        assert!(!values_differ(ParamValue::Int(1000), ParamValue::Int(1004)));
        assert!(values_differ(ParamValue::Int(1000), ParamValue::Int(1007)));

        // The written type of the value makes no difference
        let a = list(&[("X", ParamValue::Int(1000))]);
        let as_int = list(&[("X", ParamValue::Int(1004))]);
        let as_float = list(&[("X", ParamValue::Float(1004.0))]);
        assert!(diff(&a, &as_int, &[]).is_empty());
        assert!(diff(&a, &as_float, &[]).is_empty());
    }

    #[test]
    fn test_symmetry() {
        let a = list(&[
            ("A", ParamValue::Int(1)),
            ("B", ParamValue::Int(2)),
            ("C", ParamValue::Float(0.5)),
        ]);
        let b = list(&[
            ("B", ParamValue::Int(3)),
            ("C", ParamValue::Float(0.5)),
            ("D", ParamValue::Int(4)),
        ]);

        let ab = diff(&a, &b, &[]);
        let ba = diff(&b, &a, &[]);

        assert_eq!(ab.added(), ba.removed());
        assert_eq!(ab.removed(), ba.added());
        assert_eq!(ab.changed(), ba.changed());
        assert_eq!(ab.added().into_iter().collect::<Vec<_>>(), vec!["D"]);
        assert_eq!(ab.removed().into_iter().collect::<Vec<_>>(), vec!["A"]);
        assert_eq!(ab.count(), 3);
    }

    #[test]
    fn test_exclusion() {
        let a = list(&[
            ("CAL_ACC0_XOFF", ParamValue::Float(0.1)),
            ("CAL_GYRO0_XOFF", ParamValue::Float(0.1)),
            ("MC_ROLL_P", ParamValue::Float(6.5)),
        ]);
        let b = list(&[
            ("CAL_ACC0_XOFF", ParamValue::Float(0.3)),
            ("CAL_ACC1_XOFF", ParamValue::Float(0.3)),
            ("MC_ROLL_P", ParamValue::Float(7.0)),
        ]);
        let exclude = vec![
            Matcher::parse(r"CAL_ACC\d_.*").unwrap(),
            Matcher::exact("CAL_GYRO0_XOFF"),
        ];

        let result = diff(&a, &b, &exclude);
        let names: Vec<&str> = result.iter().map(ParamDiff::name).collect();
        assert_eq!(names, vec!["MC_ROLL_P"]);
    }

    #[test]
    fn test_component_grouping() {
        let mut a = list(&[("CAM_MODE", ParamValue::Int(1)), ("MC_ROLL_P", ParamValue::Float(6.5))]);
        a.get_mut("CAM_MODE").unwrap().component = ComponentId { vid: 1, cid: 100 };
        let mut b = list(&[("CAM_MODE", ParamValue::Int(2)), ("MC_ROLL_P", ParamValue::Float(7.0))]);
        b.get_mut("CAM_MODE").unwrap().component = ComponentId { vid: 1, cid: 100 };

        let result = diff(&a, &b, &[]);
        let ids: Vec<ComponentId> = result.components().map(|(id, _)| *id).collect();
        assert_eq!(
            ids,
            vec![ComponentId { vid: 1, cid: 1 }, ComponentId { vid: 1, cid: 100 }]
        );

        let camera = result.only_component(100);
        assert_eq!(camera.count(), 1);
        assert_eq!(camera.iter().next().unwrap().name(), "CAM_MODE");
    }

    #[test]
    fn test_identical() {
        let a = list(&[("A", ParamValue::Int(1))]);
        assert!(diff(&a, &a, &[]).is_empty());
        assert!(diff(&ParameterList::new(), &ParameterList::new(), &[]).is_empty());
    }
}
