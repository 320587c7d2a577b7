mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use cat_api::models::Role;
use serde_json::json;

use common::TestApp;

const FORM: &[(&str, &str)] = &[
    ("cat_name", "Fluffy"),
    ("weight", "4.5"),
    ("birthdate", "2020-01-01"),
    ("owner", "99"),
    ("lat", "0"),
];

#[tokio::test]
async fn create_with_image_is_owned_by_caller() -> Result<()> {
    let app = TestApp::spawn()?;
    let id = app.register("a").await?;
    let token = app.token(id, Role::User);

    let (status, body) = app
        .multipart("/api/v1/cats", Some(&token), FORM, Some(("kitty.JPG", &b"not really a jpeg"[..])))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "cat added", "id": 1 }));

    let (status, cat) = app.get("/api/v1/cats/1").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cat["owner"]["user_id"], id);
    assert_eq!(cat["owner"]["user_name"], "a");
    assert_eq!(cat["weight"], 4.5);
    assert_eq!(cat["birthdate"], "2020-01-01");
    assert_eq!(cat["lat"], 60.24);
    assert_eq!(cat["lng"], 24.74);

    let filename = cat["filename"].as_str().unwrap_or_default();
    assert!(filename.ends_with(".jpg"), "{}", filename);
    assert!(app.uploads.path().join(filename).exists());
    Ok(())
}

#[tokio::test]
async fn create_without_image_uses_placeholder() -> Result<()> {
    let app = TestApp::spawn()?;
    let id = app.register("a").await?;

    let (status, _) = app
        .multipart("/api/v1/cats", Some(&app.token(id, Role::User)), FORM, None)
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (_, cat) = app.get("/api/v1/cats/1").await?;
    assert_eq!(cat["filename"], "moro");
    Ok(())
}

#[tokio::test]
async fn create_without_token_is_forbidden() -> Result<()> {
    let app = TestApp::spawn()?;
    app.register("a").await?;

    let (status, body) = app.multipart("/api/v1/cats", None, FORM, None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "token not valid");
    Ok(())
}

#[tokio::test]
async fn create_with_missing_field_stores_nothing() -> Result<()> {
    let app = TestApp::spawn()?;
    let id = app.register("a").await?;

    let (status, body) = app
        .multipart(
            "/api/v1/cats",
            Some(&app.token(id, Role::User)),
            &[("cat_name", "Fluffy"), ("weight", "4")],
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "is required: birthdate", "status": 400 }));

    let (_, cats) = app.get("/api/v1/cats").await?;
    assert_eq!(cats, json!([]));
    Ok(())
}

#[tokio::test]
async fn create_for_unknown_owner_inserts_nothing() -> Result<()> {
    let app = TestApp::spawn()?;

    let (status, body) = app
        .multipart("/api/v1/cats", Some(&app.token(7, Role::User)), FORM, None)
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "no cat inserted");
    Ok(())
}

#[tokio::test]
async fn non_owner_cannot_update_or_delete() -> Result<()> {
    let app = TestApp::spawn()?;
    let owner = app.register("owner").await?;
    let other = app.register("other").await?;
    let cat = app.cat_for(&app.token(owner, Role::User)).await?;
    let path = format!("/api/v1/cats/{}", cat);
    let token = app.token(other, Role::User);

    let (status, _) = app
        .json(Method::PUT, &path, Some(&token), Some(json!({ "weight": 9 })))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.json(Method::DELETE, &path, Some(&token), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get(&path).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weight"], 4.5);
    Ok(())
}

#[tokio::test]
async fn owner_update_merges_present_fields() -> Result<()> {
    let app = TestApp::spawn()?;
    let owner = app.register("owner").await?;
    let token = app.token(owner, Role::User);
    let cat = app.cat_for(&token).await?;
    let path = format!("/api/v1/cats/{}", cat);

    let (status, body) = app
        .json(Method::PUT, &path, Some(&token), Some(json!({ "weight": 5, "owner": 42 })))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "cat updated", "id": cat }));

    let (_, body) = app.get(&path).await?;
    assert_eq!(body["weight"], 5.0);
    assert_eq!(body["cat_name"], "Fluffy");
    assert_eq!(body["owner"]["user_id"], owner);
    Ok(())
}

#[tokio::test]
async fn invalid_update_is_rejected() -> Result<()> {
    let app = TestApp::spawn()?;
    let owner = app.register("owner").await?;
    let token = app.token(owner, Role::User);
    let cat = app.cat_for(&token).await?;

    let (status, body) = app
        .json(
            Method::PUT,
            &format!("/api/v1/cats/{}", cat),
            Some(&token),
            Some(json!({ "birthdate": "yesterday" })),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "must be a date (YYYY-MM-DD): birthdate");
    Ok(())
}

#[tokio::test]
async fn admin_deletes_any_cat() -> Result<()> {
    let app = TestApp::spawn()?;
    let owner = app.register("owner").await?;
    let cat = app.cat_for(&app.token(owner, Role::User)).await?;
    let path = format!("/api/v1/cats/{}", cat);

    let (status, body) = app
        .json(Method::DELETE, &path, Some(&app.token(99, Role::Admin)), None)
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "cat deleted", "id": cat }));

    let (status, _) = app.get(&path).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn cats_by_user_lists_owned_cats_only() -> Result<()> {
    let app = TestApp::spawn()?;
    let a = app.register("a").await?;
    let b = app.register("b").await?;
    app.cat_for(&app.token(a, Role::User)).await?;

    let (status, cats) = app.get(&format!("/api/v1/users/{}/cats", a)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cats.as_array().map(Vec::len), Some(1));
    assert_eq!(cats[0]["owner"], a);

    let (status, cats) = app.get(&format!("/api/v1/users/{}/cats", b)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cats, json!([]));
    Ok(())
}

#[tokio::test]
async fn array_update_body_is_rejected() -> Result<()> {
    let app = TestApp::spawn()?;
    let owner = app.register("owner").await?;
    let token = app.token(owner, Role::User);
    let cat = app.cat_for(&token).await?;
    let path = format!("/api/v1/cats/{}", cat);

    let (status, body) = app
        .json(Method::PUT, &path, Some(&token), Some(json!(["", -5, null])))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "request body must be a JSON object");

    let (_, body) = app.get(&path).await?;
    assert_eq!(body["weight"], 4.5);
    assert_eq!(body["cat_name"], "Fluffy");
    Ok(())
}

#[tokio::test]
async fn failed_create_leaves_no_upload_behind() -> Result<()> {
    let app = TestApp::spawn()?;

    let (status, body) = app
        .multipart(
            "/api/v1/cats",
            Some(&app.token(42, Role::User)),
            FORM,
            Some(("kitty.jpg", &b"jpeg bytes"[..])),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "no cat inserted");

    let leftover = std::fs::read_dir(app.uploads.path())?.count();
    assert_eq!(leftover, 0);
    Ok(())
}
