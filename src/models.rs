//! # Recipe and Ingredient Data Model
//!
//! This module defines the recipe records the grocery list is computed from.
//! Ingredient amounts and units are kept exactly as the user typed them; all
//! interpretation (parsing, unit normalization) happens at aggregation time.
//!
//! ## Usage
//!
//! ```rust
//! use recipe_manager::models::{Ingredient, NewRecipe};
//!
//! let pancakes = NewRecipe::new("Pancakes")
//!     .with_ingredient(Ingredient::new("Flour").with_amount("2").with_unit("cups"))
//!     .with_ingredient(Ingredient::new("Eggs").with_amount("2"));
//!
//! assert_eq!(pancakes.ingredients.len(), 2);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{ApiError, ApiResult};

/// Maximum recipe title length, in characters
pub const MAX_TITLE_LEN: usize = 200;

/// Maximum ingredient name length, in characters
pub const MAX_NAME_LEN: usize = 200;

/// Maximum ingredient amount length, in characters
pub const MAX_AMOUNT_LEN: usize = 50;

/// Maximum ingredient unit length, in characters
pub const MAX_UNIT_LEN: usize = 50;

/// A single ingredient line of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// The name of the ingredient (e.g., "Flour", "olive oil")
    pub name: String,

    /// Free-form quantity text (e.g., "2", "1/2", "1 1/2", "2-3")
    pub amount: Option<String>,

    /// Free-form unit text (e.g., "cups", "Tbsp ")
    pub unit: Option<String>,
}

/// A stored recipe with its ordered ingredient list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub ingredients: Vec<Ingredient>,
    pub created_at: DateTime<Utc>,
}

/// A recipe that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecipe {
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

impl Ingredient {
    /// Create a new ingredient with just a name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            amount: None,
            unit: None,
        }
    }

    /// Set the quantity text
    pub fn with_amount(mut self, amount: &str) -> Self {
        self.amount = Some(amount.to_string());
        self
    }

    /// Set the unit text
    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }
}

impl Recipe {
    /// Create an empty recipe stamped with the current time
    pub fn new(id: i64, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            ingredients: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Append an ingredient line
    pub fn with_ingredient(mut self, ingredient: Ingredient) -> Self {
        self.ingredients.push(ingredient);
        self
    }
}

impl NewRecipe {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ingredients: Vec::new(),
        }
    }

    /// Append an ingredient line
    pub fn with_ingredient(mut self, ingredient: Ingredient) -> Self {
        self.ingredients.push(ingredient);
        self
    }

    /// Check field lengths before the recipe is stored.
    ///
    /// Titles and ingredient names must be non-empty; every field has an
    /// upper bound counted in characters.
    pub fn validate(&self) -> ApiResult<()> {
        check_length("title", &self.title, 1, MAX_TITLE_LEN)?;

        for (index, ingredient) in self.ingredients.iter().enumerate() {
            let field = |name: &str| format!("ingredients[{}].{}", index, name);

            check_length(&field("name"), &ingredient.name, 1, MAX_NAME_LEN)?;
            if let Some(amount) = &ingredient.amount {
                check_length(&field("amount"), amount, 0, MAX_AMOUNT_LEN)?;
            }
            if let Some(unit) = &ingredient.unit {
                check_length(&field("unit"), unit, 0, MAX_UNIT_LEN)?;
            }
        }

        Ok(())
    }

    /// Turn this draft into a stored record under the given id
    pub fn into_recipe(self, id: i64) -> Recipe {
        Recipe {
            id,
            title: self.title,
            ingredients: self.ingredients,
            created_at: Utc::now(),
        }
    }
}

fn check_length(field: &str, value: &str, min: usize, max: usize) -> ApiResult<()> {
    let length = value.chars().count();
    if length < min || length > max {
        return Err(ApiError::Validation(format!(
            "{} must be between {} and {} characters (got {})",
            field, min, max, length
        )));
    }
    Ok(())
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amount = self.amount.as_deref().map(str::trim).unwrap_or("");
        let unit = self.unit.as_deref().map(str::trim).unwrap_or("");

        for part in [amount, unit] {
            if !part.is_empty() {
                write!(f, "{} ", part)?;
            }
        }

        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingredient_creation() {
        let ingredient = Ingredient::new("flour").with_amount("2").with_unit("cups");

        assert_eq!(ingredient.name, "flour");
        assert_eq!(ingredient.amount, Some("2".to_string()));
        assert_eq!(ingredient.unit, Some("cups".to_string()));
    }

    #[test]
    fn test_ingredient_display() {
        let butter = Ingredient::new("butter").with_amount("1 1/2").with_unit(" cup ");
        assert_eq!(format!("{}", butter), "1 1/2 cup butter");

        let eggs = Ingredient::new("eggs").with_amount("2");
        assert_eq!(format!("{}", eggs), "2 eggs");

        let salt = Ingredient::new("salt");
        assert_eq!(format!("{}", salt), "salt");
    }

    #[test]
    fn test_new_recipe_into_recipe() {
        let recipe = NewRecipe::new("Crêpes")
            .with_ingredient(Ingredient::new("farine").with_amount("125").with_unit("g"))
            .into_recipe(7);

        assert_eq!(recipe.id, 7);
        assert_eq!(recipe.title, "Crêpes");
        assert_eq!(recipe.ingredients.len(), 1);
    }

    #[test]
    fn test_new_recipe_validation_accepts_limits() {
        let recipe = NewRecipe::new(&"t".repeat(MAX_TITLE_LEN)).with_ingredient(
            Ingredient::new(&"n".repeat(MAX_NAME_LEN))
                .with_amount(&"1".repeat(MAX_AMOUNT_LEN))
                .with_unit(&"é".repeat(MAX_UNIT_LEN)),
        );

        assert!(recipe.validate().is_ok());
    }

    #[test]
    fn test_new_recipe_validation_rejects_bad_fields() {
        let cases = vec![
            NewRecipe::new(""),
            NewRecipe::new(&"t".repeat(MAX_TITLE_LEN + 1)),
            NewRecipe::new("Soup").with_ingredient(Ingredient::new("")),
            NewRecipe::new("Soup").with_ingredient(Ingredient::new(&"n".repeat(MAX_NAME_LEN + 1))),
            NewRecipe::new("Soup")
                .with_ingredient(Ingredient::new("Leek").with_amount(&"1".repeat(MAX_AMOUNT_LEN + 1))),
            NewRecipe::new("Soup")
                .with_ingredient(Ingredient::new("Leek").with_unit(&"g".repeat(MAX_UNIT_LEN + 1))),
        ];

        for recipe in cases {
            assert!(
                matches!(recipe.validate(), Err(ApiError::Validation(_))),
                "{:?} should be rejected",
                recipe
            );
        }
    }

    #[test]
    fn test_new_recipe_deserializes_without_ingredients() {
        let recipe: NewRecipe = serde_json::from_str(r#"{"title": "Toast"}"#).unwrap();
        assert_eq!(recipe.title, "Toast");
        assert!(recipe.ingredients.is_empty());
    }

    #[test]
    fn test_ingredient_null_fields_deserialize() {
        let ingredient: Ingredient =
            serde_json::from_str(r#"{"name": "Salt", "amount": null, "unit": null}"#).unwrap();
        assert_eq!(ingredient, Ingredient::new("Salt"));
    }
}
