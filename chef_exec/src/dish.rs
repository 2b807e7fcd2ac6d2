//! # Dishes
//!
//! A dish is a named group of parameter ingredients and allergens. Dishes form a tree of
//! variants, addressed by `/` separated paths. Resolving a variant path walks the tree from the
//! root, overlaying the ingredients of each level onto the previous ones and accumulating the
//! allergens of every level.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use params_if::{Matcher, ParamValue};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// One parameter declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingredient {
    /// The parameter selected by this ingredient. Only staple dishes may use patterns.
    pub key: Matcher,

    /// The value to set, or `None` to keep the base value.
    pub value: Option<ParamValue>,

    /// Reasoning for the value, which may contain the `@READONLY` marker.
    pub justification: Option<String>,
}

/// The ingredients and allergens declared at one level of a dish.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recipe {
    pub ingredients: Vec<Ingredient>,

    /// Parameters to remove, by name
    pub allergens: Vec<Matcher>,

    /// Parameters to remove, by catalog group
    pub allergen_groups: Vec<Matcher>,
}

/// A dish, or one variant of a dish.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dish {
    pub name: String,
    pub common: Recipe,
    pub variants: BTreeMap<String, Dish>,
}

/// The effective ingredients and allergens of a dish variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedDish {
    /// Ingredients keyed by parameter name (or pattern)
    pub ingredients: BTreeMap<String, Ingredient>,
    pub allergens: BTreeSet<Matcher>,
    pub allergen_groups: BTreeSet<Matcher>,
}

/// Boilerplate text (header or footer) for the output files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Boilerplate {
    pub name: String,

    /// Lines used in every format
    pub common: Vec<String>,

    /// Lines for each format, keyed by format name
    pub formats: BTreeMap<String, TextNode>,
}

/// A node in the variant tree of a boilerplate format.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextNode {
    pub common: Vec<String>,
    pub variants: BTreeMap<String, TextNode>,
}

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// Errors which can occur while resolving a dish.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DishError {
    #[error("Dish {dish} has no variant {path} (no variant named {segment})")]
    VariantNotFound {
        dish: String,
        path: String,
        segment: String,
    },
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Ingredient {
    /// The parameter name (or pattern) of this ingredient.
    pub fn name(&self) -> &str {
        self.key.as_str()
    }
}

impl Dish {
    /// Create an empty dish.
    pub fn new(name: &str) -> Self {
        Dish {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Get the chain of nodes from this dish down to the variant at `variant_path`.
    ///
    /// The first element is always the dish itself. `None` or an empty path selects only the
    /// dish itself.
    pub fn variant_chain(&self, variant_path: Option<&str>) -> Result<Vec<&Dish>, DishError> {
        let mut chain = vec![self];
        let mut node = self;

        for segment in path_segments(variant_path) {
            node = match node.variants.get(segment) {
                Some(v) => v,
                None => {
                    return Err(DishError::VariantNotFound {
                        dish: self.name.clone(),
                        path: variant_path.unwrap_or_default().to_string(),
                        segment: segment.to_string(),
                    })
                }
            };
            chain.push(node);
        }

        Ok(chain)
    }

    /// Resolve the requested variant into a single set of ingredients and allergens.
    ///
    /// Deeper levels override the ingredients of their ancestors by name. Allergens are
    /// accumulated, a variant cannot retract an allergen of one of its ancestors.
    pub fn resolve(&self, variant_path: Option<&str>) -> Result<ResolvedDish, DishError> {
        let mut resolved = ResolvedDish::default();

        for node in self.variant_chain(variant_path)? {
            resolved.apply(&node.common);
        }

        trace!(
            "Resolved dish {}/{}: {} ingredients, {} allergens, {} allergen groups",
            self.name,
            variant_path.unwrap_or_default(),
            resolved.ingredients.len(),
            resolved.allergens.len(),
            resolved.allergen_groups.len()
        );

        Ok(resolved)
    }
}

impl ResolvedDish {
    /// Overlay a recipe onto this set.
    pub fn apply(&mut self, recipe: &Recipe) {
        for ingredient in &recipe.ingredients {
            self.ingredients
                .insert(ingredient.name().to_string(), ingredient.clone());
        }
        self.allergens.extend(recipe.allergens.iter().cloned());
        self.allergen_groups
            .extend(recipe.allergen_groups.iter().cloned());
    }

    /// Every parameter selector in this set: ingredient keys and allergens.
    ///
    /// Used for staple dishes, which only ever remove parameters.
    pub fn matchers(&self) -> Vec<Matcher> {
        let mut matchers: BTreeSet<Matcher> =
            self.ingredients.values().map(|i| i.key.clone()).collect();
        matchers.extend(self.allergens.iter().cloned());
        matchers.into_iter().collect()
    }
}

impl Boilerplate {
    pub fn new(name: &str) -> Self {
        Boilerplate {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Assemble the lines for the given format and variant.
    ///
    /// Lines are ordered: common lines, then the format's common lines, then the lines of each
    /// level of the variant path. A format without any text gives only the common lines, whatever
    /// the variant.
    pub fn lines(&self, format: &str, variant_path: Option<&str>) -> Result<Vec<String>, DishError> {
        let mut lines = self.common.clone();

        let mut node = match self.formats.get(format) {
            Some(n) => n,
            None => return Ok(lines),
        };
        lines.extend(node.common.iter().cloned());

        for segment in path_segments(variant_path) {
            node = match node.variants.get(segment) {
                Some(n) => n,
                None => {
                    return Err(DishError::VariantNotFound {
                        dish: format!("{}.{}", self.name, format),
                        path: variant_path.unwrap_or_default().to_string(),
                        segment: segment.to_string(),
                    })
                }
            };
            lines.extend(node.common.iter().cloned());
        }

        Ok(lines)
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Split a variant path into its non-empty segments.
fn path_segments(variant_path: Option<&str>) -> impl Iterator<Item = &str> {
    variant_path
        .unwrap_or_default()
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
