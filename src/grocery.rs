//! # Grocery List Aggregation
//!
//! Combines the ingredients of several recipes into one shopping list.
//!
//! Ingredients are grouped by their normalized `(name, unit)` key: names and
//! units are trimmed and lowercased, and a missing unit counts as `""`. Amounts
//! within a group are parsed with [`parse_amount`] and summed; the sum is
//! formatted once per group with [`format_amount`]. Ingredients with the same
//! name but different units stay on separate lines.
//!
//! ## Usage
//!
//! ```rust
//! use recipe_manager::grocery::build_grocery_list;
//! use recipe_manager::models::{Ingredient, Recipe};
//!
//! let recipes = vec![
//!     Recipe::new(1, "Recipe A")
//!         .with_ingredient(Ingredient::new("Butter").with_amount("1").with_unit("cup")),
//!     Recipe::new(2, "Recipe B")
//!         .with_ingredient(Ingredient::new("butter").with_amount("1/2").with_unit("Cup ")),
//! ];
//!
//! let list = build_grocery_list(&recipes);
//! assert_eq!(list.items.len(), 1);
//! assert_eq!(list.items[0].amount, "1 1/2");
//! assert_eq!(list.items[0].recipe_count, 2);
//! ```

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::amount::{format_amount, parse_optional_amount};
use crate::errors::{ApiError, ApiResult};
use crate::models::Recipe;
use crate::store::RecipeStore;

/// Message returned when a request names no recipes
pub const EMPTY_RECIPE_IDS_MESSAGE: &str = "recipe_ids must contain at least one recipe id";

/// Request body for generating a grocery list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroceryListRequest {
    pub recipe_ids: Vec<i64>,
}

impl GroceryListRequest {
    /// Reject requests that name no recipes
    pub fn validate(&self) -> ApiResult<&[i64]> {
        if self.recipe_ids.is_empty() {
            return Err(ApiError::Validation(EMPTY_RECIPE_IDS_MESSAGE.to_string()));
        }
        Ok(&self.recipe_ids)
    }
}

/// One line of the grocery list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroceryItem {
    /// Title-cased ingredient name
    pub name: String,
    /// Formatted total amount (e.g., "1 1/2", "3", "0.2")
    pub amount: String,
    /// Normalized, lowercase unit; empty when the ingredients had none
    pub unit: String,
    /// Number of distinct recipes that use this ingredient
    pub recipe_count: usize,
    /// Titles of those recipes, in the order they were first seen
    pub recipes: Vec<String>,
}

/// A complete grocery list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroceryListResult {
    /// Items sorted by (name, unit)
    pub items: Vec<GroceryItem>,
    pub total_items: usize,
    /// Number of recipes the list was built from
    pub recipe_count: usize,
    /// Titles of those recipes, in request order
    pub recipe_titles: Vec<String>,
}

/// Running total for one (name, unit) key
#[derive(Debug, Default)]
struct Accumulator {
    amount: f64,
    recipes: Vec<String>,
}

impl Accumulator {
    fn add(&mut self, amount: f64, recipe_title: &str) {
        self.amount += amount;
        if !self.recipes.iter().any(|title| title == recipe_title) {
            self.recipes.push(recipe_title.to_string());
        }
    }
}

/// Trim and lowercase a name or unit
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Capitalize every cased letter that follows an uncased character and
/// lowercase the rest.
///
/// This matches naive title casing, so `"don't"` becomes `"Don'T"`. Letters
/// without case (CJK, for instance) count as word boundaries.
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_is_cased = false;

    for c in text.chars() {
        let is_cased = c.is_lowercase() || c.is_uppercase();
        if is_cased {
            if previous_is_cased {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
        } else {
            result.push(c);
        }
        previous_is_cased = is_cased;
    }

    result
}

/// Aggregate the ingredients of already-resolved recipes.
///
/// Recipes are processed in the order given; that order determines
/// `recipe_titles` and the order of each item's `recipes`.
pub fn build_grocery_list(recipes: &[Recipe]) -> GroceryListResult {
    let mut groups: BTreeMap<(String, String), Accumulator> = BTreeMap::new();

    for recipe in recipes {
        for ingredient in &recipe.ingredients {
            let name = normalize(&ingredient.name);
            let unit = normalize(ingredient.unit.as_deref().unwrap_or(""));
            let amount = parse_optional_amount(ingredient.amount.as_deref());

            groups
                .entry((name, unit))
                .or_default()
                .add(amount, &recipe.title);
        }
    }

    let items: Vec<GroceryItem> = groups
        .into_iter()
        .map(|((name, unit), accumulator)| GroceryItem {
            name: title_case(&name),
            amount: format_amount(accumulator.amount),
            unit,
            recipe_count: accumulator.recipes.len(),
            recipes: accumulator.recipes,
        })
        .collect();

    debug!(
        "Aggregated {} recipes into {} grocery items",
        recipes.len(),
        items.len()
    );

    GroceryListResult {
        total_items: items.len(),
        items,
        recipe_count: recipes.len(),
        recipe_titles: recipes.iter().map(|recipe| recipe.title.clone()).collect(),
    }
}

/// Resolve `recipe_ids` through the store and build their grocery list.
///
/// Fails with [`ApiError::Validation`] for an empty id list and with
/// [`ApiError::RecipesNotFound`] when any id does not resolve; no partial list
/// is produced. Repeated ids are counted once.
pub async fn generate_grocery_list(
    recipe_ids: &[i64],
    store: &dyn RecipeStore,
) -> ApiResult<GroceryListResult> {
    if recipe_ids.is_empty() {
        return Err(ApiError::Validation(EMPTY_RECIPE_IDS_MESSAGE.to_string()));
    }

    let mut requested: Vec<i64> = Vec::with_capacity(recipe_ids.len());
    for id in recipe_ids {
        if !requested.contains(id) {
            requested.push(*id);
        }
    }

    info!("Generating grocery list for {} recipes", requested.len());

    let mut found: HashMap<i64, Recipe> = store
        .fetch_recipes(&requested)
        .await?
        .into_iter()
        .map(|recipe| (recipe.id, recipe))
        .collect();

    let mut missing_ids: Vec<i64> = requested
        .iter()
        .filter(|id| !found.contains_key(id))
        .copied()
        .collect();

    if !missing_ids.is_empty() {
        missing_ids.sort_unstable();
        warn!("Grocery list requested unknown recipes: {:?}", missing_ids);
        return Err(ApiError::RecipesNotFound { missing_ids });
    }

    let recipes: Vec<Recipe> = requested
        .iter()
        .filter_map(|id| found.remove(id))
        .collect();

    let list = build_grocery_list(&recipes);
    info!(
        "Generated grocery list with {} items from {} recipes",
        list.total_items, list.recipe_count
    );

    Ok(list)
}

impl fmt::Display for GroceryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.amount)?;
        if !self.unit.is_empty() {
            write!(f, "{} ", self.unit)?;
        }
        write!(f, "{} ({})", self.name, self.recipes.join(", "))
    }
}

impl fmt::Display for GroceryListResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Grocery List ({} items from {} recipes: {}):",
            self.total_items,
            self.recipe_count,
            self.recipe_titles.join(", ")
        )?;

        for item in &self.items {
            writeln!(f, "- {}", item)?;
        }

        Ok(())
    }
}
