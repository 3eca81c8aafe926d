use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::api::FieldMap;
use crate::database::{Relation, Row, Store};
use crate::error::{ApiError, ErrorBody};
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::{
    count_present, create_validation_error_object, validate_present, validate_properties, MessageTable,
    RuleSet, ValidationReport,
};

/// A wire property that must name an existing row in another relation.
#[derive(Debug, Clone, Copy)]
pub struct Reference {
    pub property: &'static str,
    pub target: Relation,
    pub message: &'static str,
}

/// Everything the shared CRUD pipeline needs to know about one resource.
#[derive(Debug, Clone, Copy)]
pub struct Resource {
    /// Human name used in messages, e.g. "Folder"
    pub label: &'static str,
    pub relation: Relation,
    pub fields: FieldMap,
    pub rules: RuleSet,
    pub messages: MessageTable,
    /// 400 message for a patch carrying none of the rule-set properties
    pub empty_patch_message: &'static str,
    pub reference: Option<Reference>,
}

impl Resource {
    fn not_found(&self) -> ApiError {
        ApiError::not_found(format!("{} does not exist", self.label))
    }

    /// Only plain decimal digits name a row; "+1" or " 1" do not.
    fn parse_id(&self, raw: &str) -> Result<i64, ApiError> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(self.not_found());
        }
        raw.parse::<i64>().map_err(|_| self.not_found())
    }

    fn reject(&self, report: &ValidationReport) -> ApiError {
        let body = create_validation_error_object(report, &self.messages);
        error!("{} validation failed: {}", self.label, body.error.message);
        ApiError::validation_error(body)
    }

    /// Existence probe: resolves the id to its stored row or 404.
    pub async fn find(&self, store: &dyn Store, raw_id: &str) -> Result<(i64, Row), ApiError> {
        let id = self.parse_id(raw_id)?;
        match store.get_by_id(self.relation, id).await? {
            Some(row) => Ok((id, row)),
            None => {
                warn!("{} with id {} not found", self.label, raw_id);
                Err(self.not_found())
            }
        }
    }

    async fn check_reference(&self, store: &dyn Store, body: &Map<String, Value>) -> Result<(), ApiError> {
        let Some(reference) = self.reference else {
            return Ok(());
        };
        let Some(target_id) = body.get(reference.property).and_then(Value::as_i64) else {
            return Ok(());
        };
        if store.get_by_id(reference.target, target_id).await?.is_none() {
            error!("{}", reference.message);
            return Err(ApiError::validation_error(ErrorBody::new(reference.message)));
        }
        Ok(())
    }

    pub async fn list(&self, store: &dyn Store) -> ApiResult<Vec<Map<String, Value>>> {
        let rows = store.list(self.relation).await?;
        Ok(ApiResponse::success(
            rows.iter().map(|row| self.fields.to_external(row)).collect(),
        ))
    }

    pub async fn get(&self, store: &dyn Store, raw_id: &str) -> ApiResult<Map<String, Value>> {
        let (_, row) = self.find(store, raw_id).await?;
        Ok(ApiResponse::success(self.fields.to_external(&row)))
    }

    /// Validate, persist, and echo the new row. `collection_path` is the
    /// request path the resource was posted to; the new id is appended to
    /// form the `Location` header.
    pub async fn create(
        &self,
        store: &dyn Store,
        body: Map<String, Value>,
        collection_path: &str,
    ) -> ApiResult<Map<String, Value>> {
        let report = validate_properties(&body, &self.rules);
        if !report.is_valid() {
            return Err(self.reject(&report));
        }
        self.check_reference(store, &body).await?;

        let created = store.insert(self.relation, self.fields.to_storage(&body)).await?;
        let id = created.get("id").cloned().unwrap_or(Value::Null);
        info!("{} with the id {} created", self.label, id);

        let location = format!("{}/{}", collection_path.trim_end_matches('/'), id);
        Ok(ApiResponse::created(self.fields.to_external(&created), location))
    }

    /// Partial update. Only rule-set properties present in the body are
    /// validated and written; at least one must be present.
    pub async fn patch(&self, store: &dyn Store, raw_id: &str, body: Map<String, Value>) -> ApiResult<()> {
        let (id, _) = self.find(store, raw_id).await?;

        if count_present(&body, &self.rules) == 0 {
            error!("{} patch rejected: {}", self.label, self.empty_patch_message);
            return Err(ApiError::validation_error(ErrorBody::new(self.empty_patch_message)));
        }
        let report = validate_present(&body, &self.rules);
        if !report.is_valid() {
            return Err(self.reject(&report));
        }
        self.check_reference(store, &body).await?;

        if store.update(self.relation, id, self.fields.to_storage(&body)).await? == 0 {
            return Err(self.not_found());
        }
        info!("{} with the id {} updated", self.label, id);
        Ok(ApiResponse::<()>::no_content())
    }

    pub async fn delete(&self, store: &dyn Store, raw_id: &str) -> ApiResult<()> {
        let (id, _) = self.find(store, raw_id).await?;

        if store.delete(self.relation, id).await? == 0 {
            return Err(self.not_found());
        }
        info!("{} with the id {} deleted", self.label, id);
        Ok(ApiResponse::<()>::no_content())
    }
}
