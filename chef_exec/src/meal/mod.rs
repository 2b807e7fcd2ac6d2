//! # Meals
//!
//! A meal is one named target configuration: a list of dish orders composed onto a base
//! parameter set, plus control keys selecting the base set, the removals to apply and the output
//! metadata.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod defaults;
mod resolver;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::PathBuf;
use thiserror::Error;

use crate::dish::DishError;

pub use defaults::{DefaultsError, DefaultsLoader, FileDefaultsLoader};
pub use resolver::{MealResolver, ResolvedMeal, READONLY_MARKER};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A request for one dish, with an optional variant path.
#[derive(Debug, Clone, PartialEq)]
pub struct DishOrder {
    pub dish: String,

    /// `None` selects only the dish's common recipe.
    pub variant: Option<String>,
}

/// One entry of the meal manifest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Meal {
    pub name: String,

    /// Dish orders, in manifest order
    pub dishes: Vec<DishOrder>,

    /// Default parameter source, relative to the menu root
    pub defaults: Option<PathBuf>,

    /// Meal whose resolved parameters are used as the base set
    pub parent: Option<String>,

    pub sitl: bool,
    pub hitl: bool,
    pub remove_calibration: bool,
    pub remove_operator: bool,

    /// Allow the dishes to add parameters missing from the base set. When not given this is
    /// false if there is a base set, true otherwise.
    pub add_new: Option<bool>,

    /// Passed through to the output format. Inherited from the parent if not given.
    pub frame_id: Option<String>,

    /// Variant paths of the staple dishes. The header and footer are inherited from the parent
    /// if not given.
    pub header: Option<String>,
    pub footer: Option<String>,
    pub calibration: Option<String>,
    pub operator: Option<String>,
}

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur while resolving a meal. Each is attributed to the meal being resolved.
#[derive(Debug, Error)]
pub enum MealError {
    #[error("Meal {0} is not on the menu")]
    UnknownMeal(String),

    #[error("Meal {meal} orders the unknown dish {dish}")]
    UnknownDish { meal: String, dish: String },

    #[error("Meal {meal}: {source}")]
    VariantNotFound { meal: String, source: DishError },

    #[error(
        "Meal {meal}: parameter {param} does not exist in the base parameter set \
        (set add_new to allow new parameters from the default parameter set)"
    )]
    UnknownParameter { meal: String, param: String },

    #[error("Meal {meal}: parameter {param} has no value and does not exist in the base parameter set")]
    MissingValue { meal: String, param: String },

    #[error("Meal {meal}: cannot load the default parameters: {source}")]
    DefaultsNotFound {
        meal: String,
        source: DefaultsError,
    },

    #[error("Meal {meal} has a cyclic parent chain: {}", .chain.join(" -> "))]
    CyclicParent { meal: String, chain: Vec<String> },

    #[error("Meal {meal}: parent meal {parent} failed: {source}")]
    Parent {
        meal: String,
        parent: String,
        source: Box<MealError>,
    },
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Meal {
    pub fn new(name: &str) -> Self {
        Meal {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

impl MealError {
    /// The name of the meal this error is attributed to.
    pub fn meal(&self) -> &str {
        match self {
            MealError::UnknownMeal(meal) => meal,
            MealError::UnknownDish { meal, .. }
            | MealError::VariantNotFound { meal, .. }
            | MealError::UnknownParameter { meal, .. }
            | MealError::MissingValue { meal, .. }
            | MealError::DefaultsNotFound { meal, .. }
            | MealError::CyclicParent { meal, .. }
            | MealError::Parent { meal, .. } => meal,
        }
    }
}
