use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use recipe_manager::models::{Ingredient, Recipe};
use recipe_manager::routes::{app, router, AppState};
use recipe_manager::store::InMemoryRecipeStore;

fn test_router() -> Router {
    let store = InMemoryRecipeStore::with_recipes(vec![
        Recipe::new(1, "Recipe A")
            .with_ingredient(Ingredient::new("Butter").with_amount("1").with_unit("cup")),
        Recipe::new(2, "Recipe B")
            .with_ingredient(Ingredient::new("butter").with_amount("1/2").with_unit("cup"))
            .with_ingredient(Ingredient::new("Eggs").with_amount("2")),
    ]);

    router(AppState::new(Arc::new(store)))
}

async fn post_json(router: Router, body: &str) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method("POST")
        .uri("/api/grocery-list")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?;

    let response = router.oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;

    Ok((status, serde_json::from_slice(&bytes)?))
}

#[tokio::test]
async fn test_health() -> Result<()> {
    let request = Request::builder().uri("/health").body(Body::empty())?;

    let response = test_router().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body, json!({"status": "healthy", "service": "recipe-manager-api"}));

    Ok(())
}

#[tokio::test]
async fn test_grocery_list_success() -> Result<()> {
    let (status, body) = post_json(test_router(), r#"{"recipe_ids": [1, 2]}"#).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_items"], 2);
    assert_eq!(body["recipe_count"], 2);
    assert_eq!(body["recipe_titles"], json!(["Recipe A", "Recipe B"]));

    let butter = &body["items"][0];
    assert_eq!(butter["name"], "Butter");
    assert_eq!(butter["amount"], "1 1/2");
    assert_eq!(butter["unit"], "cup");
    assert_eq!(butter["recipe_count"], 2);
    assert_eq!(butter["recipes"], json!(["Recipe A", "Recipe B"]));

    let eggs = &body["items"][1];
    assert_eq!(eggs["name"], "Eggs");
    assert_eq!(eggs["unit"], "");

    Ok(())
}

#[tokio::test]
async fn test_grocery_list_empty_ids() -> Result<()> {
    let (status, body) = post_json(test_router(), r#"{"recipe_ids": []}"#).await?;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    Ok(())
}

#[tokio::test]
async fn test_grocery_list_missing_recipe() -> Result<()> {
    let (status, body) = post_json(test_router(), r#"{"recipe_ids": [1, 99999]}"#).await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["error"]["details"]["missing_ids"], json!([99999]));
    assert!(body["error"]["message"]
        .as_str()
        .unwrap_or_default()
        .contains("99999"));
    assert!(body.get("items").is_none());

    Ok(())
}

#[tokio::test]
async fn test_grocery_list_malformed_body() -> Result<()> {
    let (status, body) = post_json(test_router(), r#"{"recipe_ids": "one"}"#).await?;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    Ok(())
}

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin() -> Result<()> {
    let store = InMemoryRecipeStore::new();
    let router = app(AppState::new(Arc::new(store)), "http://localhost:3000");

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/grocery-list")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())?;

    let response = router.oneshot(request).await?;

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|value| value.as_bytes()),
        Some("http://localhost:3000".as_bytes())
    );

    Ok(())
}

async fn send(router: Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = router.oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };

    Ok((status, body))
}

fn create_request(body: &str) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri("/api/recipes")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?)
}

#[tokio::test]
async fn test_create_recipe_then_build_grocery_list() -> Result<()> {
    let router = router(AppState::new(Arc::new(InMemoryRecipeStore::new())));

    let (status, created) = send(
        router.clone(),
        create_request(
            r#"{"title": "Soup", "ingredients": [
                {"name": "Leek", "amount": "2", "unit": null},
                {"name": "Stock", "amount": "1 1/2", "unit": "cups"}
            ]}"#,
        )?,
    )
    .await?;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["title"], "Soup");
    assert_eq!(created["ingredients"].as_array().map(Vec::len), Some(2));

    let id = created["id"].as_i64().unwrap_or_default();
    assert!(id > 0);

    let (status, list) = post_json(router, &format!(r#"{{"recipe_ids": [{}]}}"#, id)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["recipe_titles"], json!(["Soup"]));
    assert_eq!(list["total_items"], 2);

    Ok(())
}

#[tokio::test]
async fn test_create_recipe_rejects_oversized_fields() -> Result<()> {
    let router = router(AppState::new(Arc::new(InMemoryRecipeStore::new())));

    let long_name = "n".repeat(201);
    let long_amount = "1".repeat(51);
    let long_unit = "g".repeat(51);
    let bodies = vec![
        r#"{"title": "", "ingredients": []}"#.to_string(),
        r#"{"title": "Soup", "ingredients": [{"name": ""}]}"#.to_string(),
        format!(r#"{{"title": "Soup", "ingredients": [{{"name": "{}"}}]}}"#, long_name),
        format!(
            r#"{{"title": "Soup", "ingredients": [{{"name": "Leek", "amount": "{}"}}]}}"#,
            long_amount
        ),
        format!(
            r#"{{"title": "Soup", "ingredients": [{{"name": "Leek", "unit": "{}"}}]}}"#,
            long_unit
        ),
    ];

    for body in bodies {
        let (status, response) = send(router.clone(), create_request(&body)?).await?;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "body: {}", body);
        assert_eq!(response["error"]["code"], "VALIDATION_ERROR");
    }

    Ok(())
}

#[tokio::test]
async fn test_delete_recipe() -> Result<()> {
    let router = test_router();

    let delete = |id: i64| -> Result<Request<Body>> {
        Ok(Request::builder()
            .method("DELETE")
            .uri(format!("/api/recipes/{}", id))
            .body(Body::empty())?)
    };

    let (status, _) = send(router.clone(), delete(1)?).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(router.clone(), delete(1)?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["details"]["missing_ids"], json!([1]));

    // The deleted recipe can no longer be used in a grocery list
    let (status, body) = post_json(router, r#"{"recipe_ids": [1, 2]}"#).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["details"]["missing_ids"], json!([1]));

    Ok(())
}
