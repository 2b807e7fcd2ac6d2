//! Meal resolution
//!
//! Resolving a meal runs the following steps, in order:
//!
//! 1. Determine the base set: the resolved parent meal, else the meal's or the global default
//!    parameters, else an empty set.
//! 2. Resolve every dish order of the meal.
//! 3. Union the ingredients of all dishes, later dishes override earlier ones.
//! 4. Merge the ingredients onto the base set, refusing new parameters unless `add_new` is set.
//!    New parameters must then exist in the default parameter set, whose type they take.
//! 5. Remove the allergens and allergen groups.
//! 6. Remove the calibration and operator parameters if requested.
//! 7. Flag the parameters whose justification carries the `@READONLY` marker.
//! 8. Assemble the header and footer for the output format.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, trace, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use params_if::{Format, MealMetadata, Matcher, ParamError, Parameter, ParameterList};

use super::{DefaultsLoader, Meal, MealError};
use crate::dish::{DishError, Ingredient};
use crate::menu::Menu;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Marker in a justification which flags the parameter as read only.
pub const READONLY_MARKER: &str = "@READONLY";

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// Resolves meals of one menu.
pub struct MealResolver<'a> {
    menu: &'a Menu,
    loader: &'a dyn DefaultsLoader,

    /// Default parameter source for meals without a parent or their own `defaults`
    default_params: Option<&'a Path>,
}

/// A fully resolved meal, ready to be written out.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMeal {
    pub name: String,
    pub params: ParameterList,
    pub metadata: MealMetadata,
    pub header: Vec<String>,
    pub footer: Vec<String>,
}

/// The result of steps 1 to 7, which is what a child meal inherits.
struct Cooked {
    params: ParameterList,
    header: Option<String>,
    footer: Option<String>,
    frame_id: Option<String>,
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl<'a> MealResolver<'a> {
    pub fn new(
        menu: &'a Menu,
        loader: &'a dyn DefaultsLoader,
        default_params: Option<&'a Path>,
    ) -> Self {
        MealResolver {
            menu,
            loader,
            default_params,
        }
    }

    /// Resolve the named meal for the given output format.
    pub fn resolve(&self, name: &str, format: Format) -> Result<ResolvedMeal, MealError> {
        debug!("Resolving meal {} for format {}", name, format);

        let meal = self.find(name)?;
        let cooked = self.cook(name, &mut Vec::new())?;

        // Step 8
        let header = self
            .menu
            .header
            .lines(format.name(), cooked.header.as_deref())
            .map_err(|e| variant_not_found(name, e))?;
        let footer = self
            .menu
            .footer
            .lines(format.name(), cooked.footer.as_deref())
            .map_err(|e| variant_not_found(name, e))?;

        debug!(
            "Meal {} resolved to {} parameters",
            name,
            cooked.params.len()
        );

        Ok(ResolvedMeal {
            name: name.to_string(),
            params: cooked.params,
            metadata: MealMetadata {
                frame_id: cooked.frame_id,
                sitl: meal.sitl,
                hitl: meal.hitl,
            },
            header,
            footer,
        })
    }

    fn find(&self, name: &str) -> Result<&'a Meal, MealError> {
        self.menu
            .meal(name)
            .ok_or_else(|| MealError::UnknownMeal(name.to_string()))
    }

    /// Run steps 1 to 7 for the named meal.
    ///
    /// `chain` holds the meals currently being resolved, from the requested meal down to this
    /// one's child.
    fn cook(&self, name: &str, chain: &mut Vec<String>) -> Result<Cooked, MealError> {
        if chain.iter().any(|n| n == name) {
            let mut cycle = chain.clone();
            cycle.push(name.to_string());
            return Err(MealError::CyclicParent {
                meal: name.to_string(),
                chain: cycle,
            });
        }

        let meal = self.find(name)?;
        chain.push(name.to_string());
        let cooked = self.cook_meal(meal, chain);
        chain.pop();

        cooked
    }

    fn cook_meal(&self, meal: &Meal, chain: &mut Vec<String>) -> Result<Cooked, MealError> {
        // Step 1
        let (mut params, mut cooked, has_base) = match meal.parent {
            Some(ref parent) => {
                debug!("Meal {} is based on parent {}", meal.name, parent);
                let mut parent_cooked = match self.cook(parent, chain) {
                    Ok(c) => c,
                    Err(MealError::CyclicParent { chain, .. }) => {
                        return Err(MealError::CyclicParent {
                            meal: meal.name.clone(),
                            chain,
                        })
                    }
                    Err(e) => {
                        return Err(MealError::Parent {
                            meal: meal.name.clone(),
                            parent: parent.clone(),
                            source: Box::new(e),
                        })
                    }
                };
                let params = std::mem::take(&mut parent_cooked.params);
                (params, parent_cooked, true)
            }
            None => {
                let defaults = self.load_defaults(meal)?;
                let has_base = defaults.is_some();
                let cooked = Cooked {
                    params: ParameterList::new(),
                    header: None,
                    footer: None,
                    frame_id: None,
                };
                (defaults.unwrap_or_default(), cooked, has_base)
            }
        };

        let add_new = meal.add_new.unwrap_or(!has_base);

        // New parameters are checked against the default set, which a child meal loads itself
        let catalog = match (add_new, &meal.parent) {
            (false, _) => None,
            (true, Some(_)) => self.load_defaults(meal)?,
            (true, None) if has_base => Some(params.clone()),
            (true, None) => None,
        };

        // Steps 2 and 3
        let mut ingredients: BTreeMap<String, Ingredient> = BTreeMap::new();
        let mut allergens: BTreeSet<Matcher> = BTreeSet::new();
        let mut allergen_groups: BTreeSet<Matcher> = BTreeSet::new();

        for order in &meal.dishes {
            let dish = match self.menu.dishes.get(&order.dish) {
                Some(d) => d,
                None => {
                    return Err(MealError::UnknownDish {
                        meal: meal.name.clone(),
                        dish: order.dish.clone(),
                    })
                }
            };

            let resolved = dish
                .resolve(order.variant.as_deref())
                .map_err(|e| variant_not_found(&meal.name, e))?;

            for (name, ingredient) in resolved.ingredients {
                if let Some(previous) = ingredients.get(&name) {
                    warn!(
                        "Meal {}: dish {} overrides ingredient {} (was {:?}, now {:?})",
                        meal.name, order.dish, name, previous.value, ingredient.value
                    );
                }
                ingredients.insert(name, ingredient);
            }
            allergens.extend(resolved.allergens);
            allergen_groups.extend(resolved.allergen_groups);
        }

        // Step 4
        apply_ingredients(
            &meal.name,
            &mut params,
            ingredients.values(),
            add_new,
            catalog.as_ref(),
        )?;

        // Step 5
        for allergen in &allergens {
            log_removed(&meal.name, "allergen", params.remove(allergen));
        }
        for group in &allergen_groups {
            log_removed(&meal.name, "allergen group", params.remove_group(group));
        }

        // Step 6
        if meal.remove_calibration {
            let cal = self
                .menu
                .calibration
                .resolve(meal.calibration.as_deref())
                .map_err(|e| variant_not_found(&meal.name, e))?;
            for matcher in cal.matchers() {
                log_removed(&meal.name, "calibration", params.remove(&matcher));
            }
        }
        if meal.remove_operator {
            let op = self
                .menu
                .operator
                .resolve(meal.operator.as_deref())
                .map_err(|e| variant_not_found(&meal.name, e))?;
            for matcher in op.matchers() {
                log_removed(&meal.name, "operator", params.remove(&matcher));
            }
        }

        // Step 7
        for param in params.iter_mut() {
            mark_readonly(param);
        }

        cooked.params = params;
        if meal.header.is_some() {
            cooked.header = meal.header.clone();
        }
        if meal.footer.is_some() {
            cooked.footer = meal.footer.clone();
        }
        if meal.frame_id.is_some() {
            cooked.frame_id = meal.frame_id.clone();
        }

        Ok(cooked)
    }

    /// Load the default set of a meal: its own `defaults`, else the global default parameters.
    ///
    /// Returns `None` if there is no default source.
    fn load_defaults(&self, meal: &Meal) -> Result<Option<ParameterList>, MealError> {
        let path = match (&meal.defaults, self.default_params) {
            (Some(p), _) => self.menu.root.join(p),
            (None, Some(p)) => p.to_path_buf(),
            (None, None) => {
                debug!("Meal {} has no default parameters", meal.name);
                return Ok(None);
            }
        };

        match self.loader.load(&path) {
            Ok(list) => Ok(Some(list)),
            Err(e) => Err(MealError::DefaultsNotFound {
                meal: meal.name.clone(),
                source: e,
            }),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn variant_not_found(meal: &str, source: DishError) -> MealError {
    MealError::VariantNotFound {
        meal: meal.to_string(),
        source,
    }
}

/// Merge the ingredients onto the base set.
///
/// Ingredients without a value only update the justification of an existing parameter. When a
/// `catalog` is given every ingredient must exist in it, and takes its type and addressing.
fn apply_ingredients<'i, I>(
    meal: &str,
    params: &mut ParameterList,
    ingredients: I,
    add_new: bool,
    catalog: Option<&ParameterList>,
) -> Result<(), MealError>
where
    I: Iterator<Item = &'i Ingredient>,
{
    let unknown = |param: &str| MealError::UnknownParameter {
        meal: meal.to_string(),
        param: param.to_string(),
    };

    let mut overlay = ParameterList::new();

    for ingredient in ingredients {
        match ingredient.value {
            Some(value) => {
                let mut param = match catalog {
                    Some(catalog) => {
                        let mut param = catalog
                            .get(ingredient.name())
                            .cloned()
                            .ok_or_else(|| unknown(ingredient.name()))?;
                        param.set_value(value);
                        param.readonly = false;
                        param
                    }
                    None => Parameter::new(ingredient.name(), value),
                };
                param.justification = ingredient.justification.clone();
                overlay.insert(param);
            }
            None => match params.get_mut(ingredient.name()) {
                Some(existing) => {
                    if ingredient.justification.is_some() {
                        existing.justification = ingredient.justification.clone();
                    }
                }
                None if add_new => {
                    return Err(MealError::MissingValue {
                        meal: meal.to_string(),
                        param: ingredient.name().to_string(),
                    })
                }
                None => return Err(unknown(ingredient.name())),
            },
        }
    }

    params
        .merge(&overlay, add_new)
        .map_err(|ParamError::UnknownParameter(param)| unknown(&param))
}

/// Flag the parameter as read only if its justification carries the marker, removing the marker.
fn mark_readonly(param: &mut Parameter) {
    let justification = match param.justification {
        Some(ref j) if j.contains(READONLY_MARKER) => j.replace(READONLY_MARKER, ""),
        _ => return,
    };

    trace!("Parameter {} is read only", param.name);

    let cleaned = justification.trim();
    param.readonly = true;
    param.justification = if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    };
}

fn log_removed(meal: &str, reason: &str, removed: Vec<Parameter>) {
    for param in removed {
        debug!("Meal {}: removing {} parameter {}", meal, reason, param.name);
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
