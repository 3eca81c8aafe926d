use axum::extract::{OriginalUri, Path, State};
use serde_json::{Map, Value};

use crate::api::{WireBody, FOLDER_FIELDS};
use crate::app::AppState;
use crate::database::Relation;
use crate::middleware::ApiResult;
use crate::validation::rules::{CUSTOM_INVALID_MESSAGES, FOLDER_RULES};

use super::resource::Resource;

pub const FOLDERS: Resource = Resource {
    label: "Folder",
    relation: Relation::Folders,
    fields: FOLDER_FIELDS,
    rules: FOLDER_RULES,
    messages: CUSTOM_INVALID_MESSAGES,
    empty_patch_message: "Request body must contain: folderName",
    reference: None,
};

/// GET /folders
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Map<String, Value>>> {
    FOLDERS.list(state.store.as_ref()).await
}

/// POST /folders
pub async fn create(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    WireBody(body): WireBody,
) -> ApiResult<Map<String, Value>> {
    FOLDERS.create(state.store.as_ref(), body, uri.path()).await
}

/// GET /folders/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Map<String, Value>> {
    FOLDERS.get(state.store.as_ref(), &id).await
}

/// PATCH /folders/:id
pub async fn patch(
    State(state): State<AppState>,
    Path(id): Path<String>,
    WireBody(body): WireBody,
) -> ApiResult<()> {
    FOLDERS.patch(state.store.as_ref(), &id, body).await
}

/// DELETE /folders/:id - also removes the folder's notes
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    FOLDERS.delete(state.store.as_ref(), &id).await
}
