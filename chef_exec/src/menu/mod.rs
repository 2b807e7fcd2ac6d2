//! # Menu loader
//!
//! Reads a menu folder into memory and validates it. The loaded `Menu` is never modified, every
//! meal is resolved from this read-only projection of the files.
//!
//! ```text
//! <root>/
//!   meals.yaml
//!   custom_dishes/<dish>.yaml
//!   staple_dishes/{calibration,operator,header,footer}.yaml
//! ```

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod model;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

use params_if::Matcher;
use util::params::{self as doc, LoadError};

use crate::dish::{Boilerplate, Dish, DishError, Ingredient, Recipe, TextNode};
use crate::meal::{DishOrder, Meal};
use model::{BoilerplateDoc, DishDoc, RecipeDoc, SubstanceDoc, TextDoc};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

pub const MEALS_FILE: &str = "meals.yaml";
pub const CUSTOM_DISHES_DIR: &str = "custom_dishes";
pub const STAPLE_DISHES_DIR: &str = "staple_dishes";

pub const CALIBRATION: &str = "calibration";
pub const OPERATOR: &str = "operator";
pub const HEADER: &str = "header";
pub const FOOTER: &str = "footer";

/// Names reserved for the staple dishes.
pub const STAPLE_NAMES: [&str; 4] = [CALIBRATION, OPERATOR, HEADER, FOOTER];

/// Meal keys which are control options rather than dish orders.
pub const RESERVED_KEYS: [&str; 8] = [
    "defaults",
    "sitl",
    "hitl",
    "parent",
    "remove_calibration",
    "remove_operator",
    "add_new",
    "frame_id",
];

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A loaded menu.
#[derive(Debug, Clone, Default)]
pub struct Menu {
    pub root: PathBuf,

    /// Custom dishes by name
    pub dishes: BTreeMap<String, Dish>,

    pub calibration: Dish,
    pub operator: Dish,
    pub header: Boilerplate,
    pub footer: Boilerplate,

    /// Meals in manifest order
    pub meals: Vec<Meal>,
}

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// Errors which make the whole menu unusable.
#[derive(Debug, Error)]
pub enum MenuError {
    #[error("The menu path {0:?} is not a directory")]
    NotADirectory(PathBuf),

    #[error("Cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid menu file {file:?}: {detail}")]
    Schema { file: PathBuf, detail: String },
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl Menu {
    /// Load and validate the menu found in `root`.
    pub fn load<P: AsRef<Path>>(root: P) -> Result<Self, MenuError> {
        let root = root.as_ref().to_path_buf();

        if !root.is_dir() {
            return Err(MenuError::NotADirectory(root));
        }

        info!("Loading menu from {:?}", root);

        let dishes = load_custom_dishes(&root.join(CUSTOM_DISHES_DIR))?;

        let staples = root.join(STAPLE_DISHES_DIR);
        let calibration = load_staple_dish(&staples, CALIBRATION)?;
        let operator = load_staple_dish(&staples, OPERATOR)?;
        let header = load_boilerplate(&staples, HEADER)?;
        let footer = load_boilerplate(&staples, FOOTER)?;

        let meals_path = root.join(MEALS_FILE);
        let manifest: Option<Mapping> = load_doc(&meals_path)?;
        let meals = parse_manifest(&meals_path, manifest.unwrap_or_default(), &dishes)?;

        info!(
            "Menu loaded: {} custom dishes, {} meals",
            dishes.len(),
            meals.len()
        );

        Ok(Menu {
            root,
            dishes,
            calibration,
            operator,
            header,
            footer,
            meals,
        })
    }

    /// Get the meals in manifest order.
    pub fn meals(&self) -> impl Iterator<Item = &Meal> {
        self.meals.iter()
    }

    /// Get a meal by name.
    pub fn meal(&self, name: &str) -> Option<&Meal> {
        self.meals.iter().find(|m| m.name == name)
    }

    /// Get the parameter selectors of the calibration and/or operator staples, using their common
    /// recipes.
    pub fn exclusions(&self, calibration: bool, operator: bool) -> Result<Vec<Matcher>, DishError> {
        let mut matchers = Vec::new();

        if calibration {
            matchers.extend(self.calibration.resolve(None)?.matchers());
        }
        if operator {
            matchers.extend(self.operator.resolve(None)?.matchers());
        }

        Ok(matchers)
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Load a YAML document, mapping the errors onto the menu taxonomy.
fn load_doc<D: DeserializeOwned>(path: &Path) -> Result<D, MenuError> {
    doc::load(path).map_err(|e| match e {
        LoadError::FileLoadError(source) => MenuError::Io {
            path: path.to_path_buf(),
            source,
        },
        LoadError::DeserialiseError(e) => schema(path, e.to_string()),
    })
}

fn schema<S: Into<String>>(file: &Path, detail: S) -> MenuError {
    MenuError::Schema {
        file: file.to_path_buf(),
        detail: detail.into(),
    }
}

/// Load every `*.yaml` file of the custom dishes folder.
fn load_custom_dishes(dir: &Path) -> Result<BTreeMap<String, Dish>, MenuError> {
    let mut dishes = BTreeMap::new();

    if !dir.is_dir() {
        warn!("The menu has no {} folder", CUSTOM_DISHES_DIR);
        return Ok(dishes);
    }

    let io_err = |source| MenuError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().map_or(false, |e| e == "yaml") {
            paths.push(path);
        }
    }
    paths.sort();

    for path in paths {
        let name = match path.file_stem().and_then(|s| s.to_str()) {
            Some(n) => n.to_string(),
            None => return Err(schema(&path, "dish file name is not valid unicode")),
        };

        if STAPLE_NAMES.contains(&name.as_str()) || RESERVED_KEYS.contains(&name.as_str()) {
            return Err(schema(
                &path,
                format!("custom dish {} uses a reserved name", name),
            ));
        }

        let dish_doc: Option<DishDoc> = load_doc(&path)?;
        let dish = dish_from_doc(&path, &name, dish_doc.unwrap_or_default(), false)?;

        debug!("Loaded custom dish {}", name);
        dishes.insert(name, dish);
    }

    Ok(dishes)
}

/// Load a calibration or operator staple. A missing file gives an empty dish.
fn load_staple_dish(dir: &Path, name: &str) -> Result<Dish, MenuError> {
    let path = dir.join(format!("{}.yaml", name));

    if !path.is_file() {
        debug!("No {} staple dish", name);
        return Ok(Dish::new(name));
    }

    let dish_doc: Option<DishDoc> = load_doc(&path)?;
    dish_from_doc(&path, name, dish_doc.unwrap_or_default(), true)
}

/// Load a header or footer staple. A missing file gives empty boilerplate.
fn load_boilerplate(dir: &Path, name: &str) -> Result<Boilerplate, MenuError> {
    let path = dir.join(format!("{}.yaml", name));
    let mut boilerplate = Boilerplate::new(name);

    if !path.is_file() {
        debug!("No {} staple", name);
        return Ok(boilerplate);
    }

    let bp_doc: Option<BoilerplateDoc> = load_doc(&path)?;
    let bp_doc = bp_doc.unwrap_or_default();

    boilerplate.common = bp_doc.common.unwrap_or_default();
    boilerplate.formats = bp_doc
        .formats
        .unwrap_or_default()
        .into_iter()
        .map(|(format, text)| (format, text_from_doc(text)))
        .collect();

    Ok(boilerplate)
}

fn text_from_doc(text: TextDoc) -> TextNode {
    TextNode {
        common: text.common.unwrap_or_default(),
        variants: text
            .variants
            .unwrap_or_default()
            .into_iter()
            .map(|(name, t)| (name, text_from_doc(t)))
            .collect(),
    }
}

/// Convert a dish document and its variants.
///
/// Ingredients of custom dishes must be parameter names, staple dishes may also use patterns.
fn dish_from_doc(
    file: &Path,
    name: &str,
    dish_doc: DishDoc,
    allow_patterns: bool,
) -> Result<Dish, MenuError> {
    let mut dish = Dish::new(name);

    if let Some(recipe) = dish_doc.common {
        dish.common = recipe_from_doc(file, recipe, allow_patterns)?;
    }

    for (variant_name, variant_doc) in dish_doc.variants.unwrap_or_default() {
        let variant = dish_from_doc(file, &variant_name, variant_doc, allow_patterns)?;
        dish.variants.insert(variant_name, variant);
    }

    Ok(dish)
}

fn recipe_from_doc(
    file: &Path,
    recipe_doc: RecipeDoc,
    allow_patterns: bool,
) -> Result<Recipe, MenuError> {
    let mut recipe = Recipe::default();

    for substance in recipe_doc.ingredients.unwrap_or_default() {
        let (name, value, justification) = substance.into_parts();
        let key = parse_matcher(file, &name)?;

        if key.is_pattern() && !allow_patterns {
            return Err(schema(
                file,
                format!("ingredient {} is not a parameter name", name),
            ));
        }

        recipe.ingredients.push(Ingredient {
            key,
            value,
            justification,
        });
    }

    if let Some(allergens) = recipe_doc.allergens {
        recipe.allergens = parse_matchers(file, allergens.substances)?;
        recipe.allergen_groups = parse_matchers(file, allergens.groups)?;
    }

    Ok(recipe)
}

fn parse_matcher(file: &Path, entry: &str) -> Result<Matcher, MenuError> {
    Matcher::parse(entry).map_err(|e| schema(file, format!("invalid entry {}: {}", entry, e)))
}

fn parse_matchers(
    file: &Path,
    substances: Option<Vec<SubstanceDoc>>,
) -> Result<Vec<Matcher>, MenuError> {
    substances
        .unwrap_or_default()
        .into_iter()
        .map(|s| parse_matcher(file, &s.into_parts().0))
        .collect()
}

/// Parse the meal manifest, keeping the manifest order.
fn parse_manifest(
    file: &Path,
    manifest: Mapping,
    dishes: &BTreeMap<String, Dish>,
) -> Result<Vec<Meal>, MenuError> {
    let mut meals = Vec::new();

    for (key, value) in manifest {
        let name = match key {
            Value::String(s) => s,
            other => return Err(schema(file, format!("invalid meal name {:?}", other))),
        };

        let entries = match value {
            Value::Mapping(m) => m,
            Value::Null => Mapping::new(),
            _ => return Err(schema(file, format!("meal {} is not a mapping", name))),
        };

        let meal = parse_meal(&name, entries, dishes).map_err(|detail| schema(file, detail))?;
        meals.push(meal);
    }

    let names: HashSet<&str> = meals.iter().map(|m| m.name.as_str()).collect();
    for meal in &meals {
        if let Some(ref parent) = meal.parent {
            if !names.contains(parent.as_str()) {
                return Err(schema(
                    file,
                    format!("meal {} has unknown parent {}", meal.name, parent),
                ));
            }
        }
    }

    Ok(meals)
}

/// Parse one meal, returning a description of the problem on failure.
fn parse_meal(
    name: &str,
    entries: Mapping,
    dishes: &BTreeMap<String, Dish>,
) -> Result<Meal, String> {
    let mut meal = Meal::new(name);

    for (key, value) in entries {
        let key = match key {
            Value::String(s) => s,
            other => return Err(format!("meal {} has an invalid key {:?}", name, other)),
        };
        let bad_value = || format!("meal {} has an invalid value for {}", name, key);

        match key.as_str() {
            "defaults" => meal.defaults = text(&value).ok_or_else(bad_value)?.map(PathBuf::from),
            "parent" => meal.parent = text(&value).ok_or_else(bad_value)?,
            "frame_id" => meal.frame_id = text(&value).ok_or_else(bad_value)?,
            "sitl" => meal.sitl = flag(&value).ok_or_else(bad_value)?.unwrap_or(false),
            "hitl" => meal.hitl = flag(&value).ok_or_else(bad_value)?.unwrap_or(false),
            "remove_calibration" => {
                meal.remove_calibration = flag(&value).ok_or_else(bad_value)?.unwrap_or(false)
            }
            "remove_operator" => {
                meal.remove_operator = flag(&value).ok_or_else(bad_value)?.unwrap_or(false)
            }
            "add_new" => meal.add_new = flag(&value).ok_or_else(bad_value)?,
            HEADER => meal.header = text(&value).ok_or_else(bad_value)?,
            FOOTER => meal.footer = text(&value).ok_or_else(bad_value)?,
            CALIBRATION => meal.calibration = text(&value).ok_or_else(bad_value)?,
            OPERATOR => meal.operator = text(&value).ok_or_else(bad_value)?,
            dish if dishes.contains_key(dish) => meal.dishes.push(DishOrder {
                dish: key.clone(),
                variant: text(&value).ok_or_else(bad_value)?,
            }),
            _ => return Err(format!("meal {} contains invalid field/dish {}", name, key)),
        }
    }

    Ok(meal)
}

/// Read a scalar as text. `Some(None)` for null, `None` if the value is not a scalar.
fn text(value: &Value) -> Option<Option<String>> {
    match value {
        Value::Null => Some(None),
        Value::String(s) => Some(Some(s.clone())),
        Value::Number(n) => Some(Some(n.to_string())),
        _ => None,
    }
}

/// Read a boolean. `Some(None)` for null, `None` if the value is not a boolean.
fn flag(value: &Value) -> Option<Option<bool>> {
    match value {
        Value::Null => Some(None),
        Value::Bool(b) => Some(Some(*b)),
        _ => None,
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
