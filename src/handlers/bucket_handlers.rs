//! HTTP handlers for buckets and the category table.
//! Category ids are resolved to labels here; the repository only sees labels.

use crate::{
    errors::AppError,
    handlers::account_handlers::CurrentOwner,
    models::{
        bucket::{CreateBucketRequest, UpdateBucketRequest},
        category::Category,
    },
    services::{
        bucket_list_service::BucketListService,
        record_repository::{CreateRequest, ReadScope, RecordSelector, UpdateRequest},
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Body of `POST /buckets` and `PUT /buckets/{key}`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BucketReq {
    pub name: String,
    pub description: String,
    /// Category id, `"1"` through `"7"`.
    pub category: Option<String>,
}

impl BucketReq {
    fn category(&self) -> Category {
        self.category
            .as_deref()
            .and_then(Category::from_id)
            .unwrap_or_default()
    }

    fn ensure_complete(&self) -> Result<(), AppError> {
        if self.description.trim().is_empty() {
            return Err(AppError::bad_request("Please enter a description"));
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct CategoryEntry {
    id: &'static str,
    name: &'static str,
}

/// `GET /categories`
pub async fn list_categories() -> impl IntoResponse {
    let entries: Vec<_> = Category::ALL
        .into_iter()
        .map(|c| CategoryEntry {
            id: c.id(),
            name: c.label(),
        })
        .collect();
    Json(entries)
}

/// `GET /buckets`: the caller's buckets in creation order.
pub async fn list_buckets(
    State(service): State<BucketListService>,
    current: CurrentOwner,
) -> Result<impl IntoResponse, AppError> {
    let buckets = service.read(&current.owner, ReadScope::Buckets)?;
    Ok(Json(buckets))
}

/// `POST /buckets`
pub async fn create_bucket(
    State(service): State<BucketListService>,
    current: CurrentOwner,
    Json(req): Json<BucketReq>,
) -> Result<impl IntoResponse, AppError> {
    req.ensure_complete()?;
    let category = req.category();

    let bucket = service
        .create(CreateRequest::Bucket(CreateBucketRequest {
            owner: current.owner,
            name: req.name,
            description: req.description,
            category,
        }))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": "Bucket created successfully",
            "bucket": bucket,
        })),
    ))
}

/// `GET /buckets/{key}`
pub async fn get_bucket(
    State(service): State<BucketListService>,
    current: CurrentOwner,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let bucket = service
        .get_specific(&current.owner, &RecordSelector::Bucket { key: key.clone() })?
        .ok_or_else(|| AppError::not_found(format!("bucket `{}` not found", key)))?;
    Ok(Json(bucket))
}

/// `PUT /buckets/{key}`: replace name, description and category.
///
/// Updating a bucket that does not exist succeeds with `affected: 0`.
pub async fn update_bucket(
    State(service): State<BucketListService>,
    current: CurrentOwner,
    Path(key): Path<String>,
    Json(req): Json<BucketReq>,
) -> Result<impl IntoResponse, AppError> {
    req.ensure_complete()?;
    let category = req.category();

    let outcome = service
        .update(UpdateRequest::Bucket(UpdateBucketRequest {
            owner: current.owner,
            key,
            name: req.name,
            description: req.description,
            category,
        }))
        .await?;
    Ok(Json(outcome))
}

/// `DELETE /buckets/{key}`: removes the bucket and all of its activities.
pub async fn delete_bucket(
    State(service): State<BucketListService>,
    current: CurrentOwner,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = service
        .delete(&current.owner, &RecordSelector::Bucket { key })
        .await?;
    Ok(Json(outcome))
}
