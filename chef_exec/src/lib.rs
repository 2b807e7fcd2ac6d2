//! # Parameter chef library.
//!
//! Resolves the meals of a menu into flat parameter lists, and compares parameter files.
//!
//! A menu is a folder holding:
//!
//! - `custom_dishes/*.yaml`: reusable groups of parameters (dishes), with optional variants,
//! - `staple_dishes/{calibration,operator,header,footer}.yaml`: reserved dishes used to strip
//!   calibration and operator parameters, and boilerplate text for the output files,
//! - `meals.yaml`: the meals, each composing dishes onto a default parameter set or a parent
//!   meal.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Build driver - resolves the requested meals and writes them out
pub mod build;

/// Comparator - structural diff of two parameter lists
pub mod compare;

/// Menu and default parameter paths
pub mod config;

/// Dish resolver - flattens a dish variant into one set of ingredients and allergens
pub mod dish;

/// Meal resolver - composes dishes onto a base parameter set
pub mod meal;

/// Menu loader - reads and validates the menu folder
pub mod menu;

#[cfg(test)]
pub(crate) mod test_utils;
