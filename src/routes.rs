//! # HTTP Routes
//!
//! - `POST /api/grocery-list` with `{"recipe_ids": [..]}` returns a
//!   [`GroceryListResult`]
//! - `POST /api/recipes` stores a recipe with its ingredients
//! - `DELETE /api/recipes/:id` removes a recipe
//! - `GET /health` reports liveness

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::errors::{ApiError, ApiResult};
use crate::grocery::{generate_grocery_list, GroceryListRequest, GroceryListResult};
use crate::models::{NewRecipe, Recipe};
use crate::store::RecipeStore;

/// Name reported by the health check
pub const SERVICE_NAME: &str = "recipe-manager-api";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecipeStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecipeStore>) -> Self {
        Self { store }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": SERVICE_NAME }))
}

async fn grocery_list(
    State(state): State<AppState>,
    payload: Result<Json<GroceryListRequest>, JsonRejection>,
) -> ApiResult<Json<GroceryListResult>> {
    let Json(request) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    let recipe_ids = request.validate()?;

    info!(recipe_ids = ?recipe_ids, "Grocery list requested");

    let list = generate_grocery_list(recipe_ids, state.store.as_ref()).await?;
    Ok(Json(list))
}

async fn create_recipe(
    State(state): State<AppState>,
    payload: Result<Json<NewRecipe>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Recipe>)> {
    let Json(recipe) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    recipe.validate()?;

    let created = state.store.create_recipe(&recipe).await?;
    info!(recipe_id = created.id, "Recipe created");

    Ok((StatusCode::CREATED, Json(created)))
}

async fn delete_recipe(
    State(state): State<AppState>,
    Path(recipe_id): Path<i64>,
) -> ApiResult<StatusCode> {
    if !state.store.delete_recipe(recipe_id).await? {
        return Err(ApiError::RecipesNotFound {
            missing_ids: vec![recipe_id],
        });
    }

    info!(recipe_id, "Recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Routes without middleware
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/grocery-list", post(grocery_list))
        .route("/api/recipes", post(create_recipe))
        .route("/api/recipes/:id", delete(delete_recipe))
        .with_state(state)
}

/// CORS policy from a comma-separated origin list; empty or `*` allows any origin
pub fn setup_cors(allowed_origins: &str) -> CorsLayer {
    let allowed_origins = allowed_origins.trim();

    let allow_origin = if allowed_origins.is_empty() || allowed_origins == "*" {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect();

        if origins.is_empty() {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(origins)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

/// Full application: routes plus CORS and request tracing
pub fn app(state: AppState, allowed_origins: &str) -> Router {
    router(state)
        .layer(setup_cors(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
