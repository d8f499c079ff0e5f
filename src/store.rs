//! # Recipe Store
//!
//! The grocery list aggregator reads recipes through [`RecipeStore`]. The
//! Postgres implementation lives in [`crate::db`]; [`InMemoryRecipeStore`] backs
//! tests and local experiments.

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::models::{NewRecipe, Recipe};

/// Resolves recipe ids to full recipe records
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Fetch every recipe whose id is in `ids`, with its ingredients.
    ///
    /// Ids that do not exist are silently left out; callers compare the
    /// result against what they asked for.
    async fn fetch_recipes(&self, ids: &[i64]) -> Result<Vec<Recipe>>;

    /// Persist a new recipe and return the stored record
    async fn create_recipe(&self, recipe: &NewRecipe) -> Result<Recipe>;

    /// Delete a recipe, returning whether it existed
    async fn delete_recipe(&self, id: i64) -> Result<bool>;
}

/// Recipe store kept entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryRecipeStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    recipes: BTreeMap<i64, Recipe>,
    next_id: i64,
}

impl InMemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with the given recipes
    pub fn with_recipes(recipes: impl IntoIterator<Item = Recipe>) -> Self {
        let mut inner = Inner::default();
        for recipe in recipes {
            inner.next_id = inner.next_id.max(recipe.id);
            inner.recipes.insert(recipe.id, recipe);
        }

        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Store a new recipe and return its id
    pub async fn insert(&self, recipe: NewRecipe) -> i64 {
        self.store(recipe).await.id
    }

    async fn store(&self, recipe: NewRecipe) -> Recipe {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let id = inner.next_id;
        let recipe = recipe.into_recipe(id);
        inner.recipes.insert(id, recipe.clone());
        debug!("Stored in-memory recipe with ID: {}", id);
        recipe
    }
}

#[async_trait]
impl RecipeStore for InMemoryRecipeStore {
    async fn fetch_recipes(&self, ids: &[i64]) -> Result<Vec<Recipe>> {
        let inner = self.inner.read().await;
        let mut seen = Vec::with_capacity(ids.len());
        let mut recipes = Vec::with_capacity(ids.len());

        for id in ids {
            if seen.contains(id) {
                continue;
            }
            seen.push(*id);

            if let Some(recipe) = inner.recipes.get(id) {
                recipes.push(recipe.clone());
            }
        }

        debug!("Resolved {} of {} requested recipes", recipes.len(), seen.len());
        Ok(recipes)
    }

    async fn create_recipe(&self, recipe: &NewRecipe) -> Result<Recipe> {
        Ok(self.store(recipe.clone()).await)
    }

    async fn delete_recipe(&self, id: i64) -> Result<bool> {
        let removed = self.inner.write().await.recipes.remove(&id).is_some();
        debug!("In-memory delete of recipe {}: {}", id, removed);
        Ok(removed)
    }
}
