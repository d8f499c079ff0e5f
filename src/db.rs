use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use sqlx::postgres::PgPool;
use sqlx::Row;
use std::collections::HashMap;

use crate::models::{Ingredient, NewRecipe, Recipe};
use crate::store::RecipeStore;

/// Initialize the database schema
pub async fn init_database_schema(pool: &PgPool) -> Result<()> {
    info!("Initializing database schema...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS recipes (
            id BIGSERIAL PRIMARY KEY,
            title TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create recipes table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS ingredients (
            id BIGSERIAL PRIMARY KEY,
            recipe_id BIGINT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            name VARCHAR(200) NOT NULL,
            amount VARCHAR(50),
            unit VARCHAR(50)
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create ingredients table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS ingredients_recipe_id_idx ON ingredients(recipe_id)")
        .execute(pool)
        .await
        .context("Failed to create ingredients index")?;

    info!("Database schema initialized successfully");
    Ok(())
}

/// Store a recipe and its ingredients in one transaction
pub async fn create_recipe(pool: &PgPool, recipe: &NewRecipe) -> Result<Recipe> {
    info!(
        "Creating recipe '{}' with {} ingredients",
        recipe.title,
        recipe.ingredients.len()
    );

    let mut tx = pool.begin().await.context("Failed to start transaction")?;

    let row = sqlx::query("INSERT INTO recipes (title) VALUES ($1) RETURNING id, created_at")
        .bind(&recipe.title)
        .fetch_one(&mut *tx)
        .await
        .context("Failed to insert recipe")?;
    let recipe_id: i64 = row.try_get("id")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;

    for ingredient in &recipe.ingredients {
        debug!("Adding ingredient to recipe {}: {}", recipe_id, ingredient);
        sqlx::query(
            "INSERT INTO ingredients (recipe_id, name, amount, unit) VALUES ($1, $2, $3, $4)",
        )
        .bind(recipe_id)
        .bind(&ingredient.name)
        .bind(&ingredient.amount)
        .bind(&ingredient.unit)
        .execute(&mut *tx)
        .await
        .context("Failed to insert ingredient")?;
    }

    tx.commit().await.context("Failed to commit recipe")?;

    info!("Recipe created with ID: {}", recipe_id);
    Ok(Recipe {
        id: recipe_id,
        title: recipe.title.clone(),
        ingredients: recipe.ingredients.clone(),
        created_at,
    })
}

/// Load the recipes with the given ids, ingredients in insertion order.
///
/// Unknown ids are skipped; the result is ordered by recipe id.
pub async fn fetch_recipes_by_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<Recipe>> {
    info!("Fetching {} recipes", ids.len());

    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let recipe_rows = sqlx::query(
        "SELECT id, title, created_at FROM recipes WHERE id = ANY($1) ORDER BY id",
    )
    .bind(ids.to_vec())
    .fetch_all(pool)
    .await
    .context("Failed to fetch recipes")?;

    let ingredient_rows = sqlx::query(
        "SELECT recipe_id, name, amount, unit FROM ingredients
         WHERE recipe_id = ANY($1)
         ORDER BY recipe_id, id",
    )
    .bind(ids.to_vec())
    .fetch_all(pool)
    .await
    .context("Failed to fetch ingredients")?;

    let mut ingredients_by_recipe: HashMap<i64, Vec<Ingredient>> = HashMap::new();
    for row in ingredient_rows {
        let recipe_id: i64 = row.try_get("recipe_id")?;
        ingredients_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(Ingredient {
                name: row.try_get("name")?,
                amount: row.try_get("amount")?,
                unit: row.try_get("unit")?,
            });
    }

    let mut recipes = Vec::with_capacity(recipe_rows.len());
    for row in recipe_rows {
        let id: i64 = row.try_get("id")?;
        let created_at: DateTime<Utc> = row.try_get("created_at")?;
        recipes.push(Recipe {
            id,
            title: row.try_get("title")?,
            ingredients: ingredients_by_recipe.remove(&id).unwrap_or_default(),
            created_at,
        });
    }

    info!("Found {} of {} requested recipes", recipes.len(), ids.len());
    Ok(recipes)
}

/// Delete a recipe and, through the cascade, its ingredients
pub async fn delete_recipe(pool: &PgPool, recipe_id: i64) -> Result<bool> {
    info!("Deleting recipe with ID: {}", recipe_id);

    let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(recipe_id)
        .execute(pool)
        .await
        .context("Failed to delete recipe")?;

    if result.rows_affected() > 0 {
        info!("Recipe deleted successfully with ID: {}", recipe_id);
        Ok(true)
    } else {
        info!("No recipe found with ID: {}", recipe_id);
        Ok(false)
    }
}

/// [`RecipeStore`] backed by a Postgres pool
#[derive(Debug, Clone)]
pub struct PgRecipeStore {
    pool: PgPool,
}

impl PgRecipeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecipeStore for PgRecipeStore {
    async fn fetch_recipes(&self, ids: &[i64]) -> Result<Vec<Recipe>> {
        fetch_recipes_by_ids(&self.pool, ids).await
    }

    async fn create_recipe(&self, recipe: &NewRecipe) -> Result<Recipe> {
        create_recipe(&self.pool, recipe).await
    }

    async fn delete_recipe(&self, id: i64) -> Result<bool> {
        delete_recipe(&self.pool, id).await
    }
}
