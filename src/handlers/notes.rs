use axum::extract::{OriginalUri, Path, State};
use serde_json::{Map, Value};

use crate::api::{WireBody, NOTE_FIELDS};
use crate::app::AppState;
use crate::database::Relation;
use crate::middleware::ApiResult;
use crate::validation::rules::{CUSTOM_INVALID_MESSAGES, NOTE_RULES};

use super::resource::{Reference, Resource};

pub const NOTES: Resource = Resource {
    label: "Note",
    relation: Relation::Notes,
    fields: NOTE_FIELDS,
    rules: NOTE_RULES,
    messages: CUSTOM_INVALID_MESSAGES,
    empty_patch_message: "Request body must contain either: noteName, content or folderId",
    reference: Some(Reference {
        property: "folderId",
        target: Relation::Folders,
        message: "Invalid property provided: folderId -- folder does not exist",
    }),
};

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Map<String, Value>>> {
    NOTES.list(state.store.as_ref()).await
}

pub async fn create(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    WireBody(body): WireBody,
) -> ApiResult<Map<String, Value>> {
    NOTES.create(state.store.as_ref(), body, uri.path()).await
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Map<String, Value>> {
    NOTES.get(state.store.as_ref(), &id).await
}

pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    WireBody(body): WireBody,
) -> ApiResult<()> {
    NOTES.patch(state.store.as_ref(), &id, body).await
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    NOTES.delete(state.store.as_ref(), &id).await
}
