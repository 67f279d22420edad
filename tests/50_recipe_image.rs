mod common;

use anyhow::Result;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::{json, Value};

use common::TestServer;

fn image_form(file_name: &str, bytes: &[u8]) -> Form {
    Form::new().part("image", Part::bytes(bytes.to_vec()).file_name(file_name.to_string()))
}

#[tokio::test]
async fn upload_stores_file_and_serves_it() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("cook@example.com", "password1").await?;
    let id = server.create_recipe(&token, "Photogenic", json!({})).await?;

    let res = server
        .client
        .post(server.url(&format!("/api/recipe/recipes/{}/upload-image", id)))
        .bearer_auth(&token)
        .multipart(image_form("dish.png", b"\x89PNG\r\n\x1a\nfake"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["id"], id);

    let image = body["data"]["image"].as_str().unwrap().to_string();
    assert!(image.starts_with("/media/uploads/recipe/"));
    assert!(image.ends_with(".png"));

    let relative = image.trim_start_matches("/media/");
    assert!(server.media.path().join(relative).exists());

    let res = server.client.get(server.url(&image)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.bytes().await?.as_ref(), b"\x89PNG\r\n\x1a\nfake");
    Ok(())
}

#[tokio::test]
async fn replacing_and_deleting_release_old_files() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("cook@example.com", "password1").await?;
    let id = server.create_recipe(&token, "Photogenic", json!({})).await?;
    let upload_url = server.url(&format!("/api/recipe/recipes/{}/upload-image", id));

    let mut paths = Vec::new();
    for name in ["first.jpg", "second.jpg"] {
        let res = server
            .client
            .post(&upload_url)
            .bearer_auth(&token)
            .multipart(image_form(name, b"\xff\xd8\xff\xe0jpeg"))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await?;
        let image = body["data"]["image"].as_str().unwrap().trim_start_matches("/media/").to_string();
        paths.push(server.media.path().join(image));
    }
    assert!(!paths[0].exists());
    assert!(paths[1].exists());

    let res = server.delete(&format!("/api/recipe/recipes/{}", id), &token).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(!paths[1].exists());
    Ok(())
}

#[tokio::test]
async fn non_image_upload_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("cook@example.com", "password1").await?;
    let id = server.create_recipe(&token, "Photogenic", json!({})).await?;

    let res = server
        .client
        .post(server.url(&format!("/api/recipe/recipes/{}/upload-image", id)))
        .bearer_auth(&token)
        .multipart(image_form("notimage", b"just text"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert!(body["field_errors"]["image"].is_string());

    let res = server
        .client
        .post(server.url(&format!("/api/recipe/recipes/{}/upload-image", id)))
        .bearer_auth(&token)
        .multipart(Form::new().text("caption", "no file"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn text_disguised_as_png_is_rejected() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("cook@example.com", "password1").await?;
    let id = server.create_recipe(&token, "Photogenic", json!({})).await?;

    let res = server
        .client
        .post(server.url(&format!("/api/recipe/recipes/{}/upload-image", id)))
        .bearer_auth(&token)
        .multipart(image_form("evil.png", b"#!/bin/sh\nrm -rf /\n"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert!(body["field_errors"]["image"].is_string());
    assert!(!server.media.path().join("uploads").exists());

    let res = server.get(&format!("/api/recipe/recipes/{}", id), &token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn stored_extension_follows_content() -> Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.register("cook@example.com", "password1").await?;
    let id = server.create_recipe(&token, "Photogenic", json!({})).await?;

    let res = server
        .client
        .post(server.url(&format!("/api/recipe/recipes/{}/upload-image", id)))
        .bearer_auth(&token)
        .multipart(image_form("mislabelled.jpg", b"GIF89a\x01\x00\x01\x00"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert!(body["data"]["image"].as_str().unwrap().ends_with(".gif"));
    Ok(())
}

#[tokio::test]
async fn upload_to_foreign_recipe_is_not_found() -> Result<()> {
    let server = TestServer::spawn().await?;
    let alice = server.register("alice@example.com", "password1").await?;
    let bob = server.register("bob@example.com", "password1").await?;
    let id = server.create_recipe(&alice, "Alice's", json!({})).await?;

    let res = server
        .client
        .post(server.url(&format!("/api/recipe/recipes/{}/upload-image", id)))
        .bearer_auth(&bob)
        .multipart(image_form("dish.png", b"\x89PNG\r\n\x1a\n"))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}
