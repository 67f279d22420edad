mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;

#[tokio::test]
async fn labels_require_authentication() -> Result<()> {
    let server = TestServer::spawn().await?;

    for path in ["/api/recipe/tags", "/api/recipe/ingredients"] {
        let res = server.client.get(server.url(path)).send().await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = res.json().await?;
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
    Ok(())
}

#[tokio::test]
async fn tags_are_listed_by_name_descending_and_scoped_to_owner() -> Result<()> {
    let server = TestServer::spawn().await?;
    let alice = server.register("alice@example.com", "password1").await?;
    let bob = server.register("bob@example.com", "password1").await?;

    server.create_label(&alice, "tags", "Dessert").await?;
    server.create_label(&alice, "tags", "Vegan").await?;
    server.create_label(&bob, "tags", "Fruity").await?;

    let res = server.get("/api/recipe/tags", &alice).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tag| tag["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Vegan", "Dessert"]);
    Ok(())
}

#[tokio::test]
async fn ingredient_crud_round_trip() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("cook@example.com", "password1").await?;

    let id = server.create_label(&token, "ingredients", "Kale").await?;
    let path = format!("/api/recipe/ingredients/{}", id);

    let res = server.patch(&path, &token, json!({"name": "Cabbage"})).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"], json!({"id": id, "name": "Cabbage"}));

    let res = server.put(&path, &token, json!({})).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server.get(&path, &token).send().await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["name"], "Cabbage");

    let res = server.delete(&path, &token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = server.get(&path, &token).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn other_users_labels_are_not_found() -> Result<()> {
    let server = TestServer::spawn().await?;
    let alice = server.register("alice@example.com", "password1").await?;
    let bob = server.register("bob@example.com", "password1").await?;

    let id = server.create_label(&alice, "tags", "Private").await?;
    let path = format!("/api/recipe/tags/{}", id);

    let res = server.get(&path, &bob).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = server.patch(&path, &bob, json!({"name": "Stolen"})).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = server.delete(&path, &bob).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn assigned_only_returns_labels_in_use() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("cook@example.com", "password1").await?;

    let eggs = server.create_label(&token, "ingredients", "Eggs").await?;
    server.create_label(&token, "ingredients", "Turkey").await?;
    server.create_recipe(&token, "Omelette", json!({"ingredients": [eggs]})).await?;
    server.create_recipe(&token, "Scramble", json!({"ingredients": [eggs]})).await?;

    let res = server.get("/api/recipe/ingredients?assigned_only=1", &token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"], json!([{"id": eggs, "name": "Eggs"}]));

    let res = server.get("/api/recipe/ingredients?assigned_only=maybe", &token).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = server.get("/api/recipe/tags?assigned_only=1&assigned_only=0", &token).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["error"], true);
    assert_eq!(body["code"], "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn deleting_a_tag_detaches_it_from_recipes() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("cook@example.com", "password1").await?;

    let tag = server.create_label(&token, "tags", "Spicy").await?;
    let recipe = server.create_recipe(&token, "Curry", json!({"tags": [tag]})).await?;

    let res = server.delete(&format!("/api/recipe/tags/{}", tag), &token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = server.get(&format!("/api/recipe/recipes/{}", recipe), &token).send().await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["tags"], json!([]));
    Ok(())
}
