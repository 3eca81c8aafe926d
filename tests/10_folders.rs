mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};

use noteful_api::database::Relation;

#[tokio::test]
async fn list_folders_empty() -> Result<()> {
    let app = common::spawn_app();

    let res = app.get("/folders").await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!([]));
    Ok(())
}

#[tokio::test]
async fn list_folders_returns_all_in_id_order() -> Result<()> {
    let app = common::spawn_app();
    app.seed_folders().await?;

    let res = app.get("/folders").await?;

    assert_eq!(res.status, StatusCode::OK);
    let expected: Vec<Value> = common::make_folders().iter().map(common::folder_json).collect();
    assert_eq!(res.body, Value::Array(expected));
    Ok(())
}

#[tokio::test]
async fn list_folders_sanitizes_names() -> Result<()> {
    let app = common::spawn_app();
    let (folder, expected) = common::make_malicious_folder();
    app.store.seed(Relation::Folders, vec![folder]).await?;

    let res = app.get("/folders").await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body[0], expected);
    Ok(())
}

#[tokio::test]
async fn get_folder_by_id() -> Result<()> {
    let app = common::spawn_app();
    app.seed_folders().await?;

    let res = app.get("/folders/2").await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!({ "id": 2, "folderName": "Second test folder!" }));
    Ok(())
}

#[tokio::test]
async fn get_missing_folder_is_404() -> Result<()> {
    let app = common::spawn_app();
    app.seed_folders().await?;

    let res = app.get("/folders/123456").await?;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body, json!({ "error": { "message": "Folder does not exist" } }));
    Ok(())
}

#[tokio::test]
async fn get_folder_with_non_canonical_id_is_404() -> Result<()> {
    let app = common::spawn_app();
    app.seed_folders().await?;

    for uri in ["/folders/+1", "/folders/-1", "/folders/01x"] {
        let res = app.get(uri).await?;
        assert_eq!(res.status, StatusCode::NOT_FOUND, "{}", uri);
        assert_eq!(res.error_message(), "Folder does not exist");
    }
    Ok(())
}

#[tokio::test]
async fn get_malicious_folder_is_sanitized() -> Result<()> {
    let app = common::spawn_app();
    let (folder, expected) = common::make_malicious_folder();
    app.store.seed(Relation::Folders, vec![folder]).await?;

    let res = app.get("/folders/911").await?;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["folderName"], expected["folderName"]);
    Ok(())
}

#[tokio::test]
async fn create_folder_responds_201_with_location() -> Result<()> {
    let app = common::spawn_app();

    let res = app.post("/folders", json!({ "folderName": "Test new folder" })).await?;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["folderName"], json!("Test new folder"));
    let id = res.body["id"].as_i64().expect("numeric id");
    assert_eq!(res.location(), Some(format!("/folders/{}", id).as_str()));

    let fetched = app.get(&format!("/folders/{}", id)).await?;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body, res.body);
    Ok(())
}

#[tokio::test]
async fn create_folder_continues_after_seeded_ids() -> Result<()> {
    let app = common::spawn_app();
    app.seed_folders().await?;

    let res = app.post("/folders", json!({ "folderName": "Sixth" })).await?;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body, json!({ "id": 6, "folderName": "Sixth" }));
    assert_eq!(res.location(), Some("/folders/6"));
    Ok(())
}

#[tokio::test]
async fn create_folder_without_name_is_400() -> Result<()> {
    let app = common::spawn_app();

    let res = app.post("/folders", json!({ "name": "wrong key" })).await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.body,
        json!({ "error": { "message": "Required properties are missing: folderName" } })
    );
    Ok(())
}

#[tokio::test]
async fn create_folder_with_null_name_counts_as_missing() -> Result<()> {
    let app = common::spawn_app();

    let res = app.post("/folders", json!({ "folderName": null })).await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_message(), "Required properties are missing: folderName");
    Ok(())
}

#[tokio::test]
async fn create_folder_with_empty_or_non_string_name_is_invalid() -> Result<()> {
    let app = common::spawn_app();

    for name in [json!(""), json!(42), json!(["a"])] {
        let res = app.post("/folders", json!({ "folderName": name })).await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.error_message(), "Invalid property provided: folderName");
    }
    assert_eq!(app.get("/folders").await?.body, json!([]));
    Ok(())
}

#[tokio::test]
async fn create_folder_sanitizes_response() -> Result<()> {
    let app = common::spawn_app();

    let res = app.post("/folders", json!({ "folderName": common::NAUGHTY_NAME })).await?;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["folderName"], json!(common::NAUGHTY_NAME_ESCAPED));
    Ok(())
}

#[tokio::test]
async fn create_folder_ignores_unknown_and_storage_fields() -> Result<()> {
    let app = common::spawn_app();

    let res = app
        .post("/folders", json!({ "id": 77, "folderName": "Pinned", "color": "red" }))
        .await?;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body, json!({ "id": 1, "folderName": "Pinned" }));
    Ok(())
}

#[tokio::test]
async fn delete_folder_removes_it_from_list() -> Result<()> {
    let app = common::spawn_app();
    app.seed_folders().await?;

    let res = app.delete("/folders/2").await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert!(res.text.is_empty());

    let list = app.get("/folders").await?;
    let expected: Vec<Value> = common::make_folders()
        .iter()
        .filter(|folder| folder["id"] != json!(2))
        .map(common::folder_json)
        .collect();
    assert_eq!(list.body, Value::Array(expected));
    Ok(())
}

#[tokio::test]
async fn delete_folder_cascades_to_its_notes() -> Result<()> {
    let app = common::spawn_app();
    app.seed_folders_and_notes().await?;

    let res = app.delete("/folders/1").await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let notes = app.get("/notes").await?;
    let folder_ids: Vec<i64> = notes
        .body
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|note| note["folderId"].as_i64())
        .collect();
    assert_eq!(folder_ids, vec![2, 3]);
    Ok(())
}

#[tokio::test]
async fn delete_missing_folder_is_404() -> Result<()> {
    let app = common::spawn_app();

    let res = app.delete("/folders/123456").await?;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error_message(), "Folder does not exist");
    Ok(())
}

#[tokio::test]
async fn patch_missing_folder_is_404() -> Result<()> {
    let app = common::spawn_app();

    let res = app.patch("/folders/123456", json!({ "folderName": "x" })).await?;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error_message(), "Folder does not exist");
    Ok(())
}

#[tokio::test]
async fn patch_folder_updates_name() -> Result<()> {
    let app = common::spawn_app();
    app.seed_folders().await?;

    let res = app
        .patch("/folders/2", json!({ "folderName": "Updated folder", "fieldToIgnore": true }))
        .await?;
    assert_eq!(res.status, StatusCode::NO_CONTENT);

    let fetched = app.get("/folders/2").await?;
    assert_eq!(fetched.body, json!({ "id": 2, "folderName": "Updated folder" }));
    Ok(())
}

#[tokio::test]
async fn patch_folder_without_relevant_fields_is_400() -> Result<()> {
    let app = common::spawn_app();
    app.seed_folders().await?;

    let res = app.patch("/folders/2", json!({ "irrelevantField": "foo" })).await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        res.body,
        json!({ "error": { "message": "Request body must contain: folderName" } })
    );
    Ok(())
}

#[tokio::test]
async fn patch_folder_with_empty_name_is_400() -> Result<()> {
    let app = common::spawn_app();
    app.seed_folders().await?;

    let res = app.patch("/folders/2", json!({ "folderName": "" })).await?;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_message(), "Invalid property provided: folderName");
    assert_eq!(app.get("/folders/2").await?.body["folderName"], json!("Second test folder!"));
    Ok(())
}
