//! HTTP handlers for activities nested under `/buckets/{key}/activities`.

use crate::{
    errors::AppError,
    handlers::account_handlers::CurrentOwner,
    models::activity::{CreateActivityRequest, UpdateActivityRequest},
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
use serde::Deserialize;
use serde_json::json;

/// Body of `POST` and `PUT` on activities.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ActivityReq {
    #[serde(alias = "text")]
    pub description: String,
}

impl ActivityReq {
    fn ensure_complete(&self) -> Result<(), AppError> {
        if self.description.trim().is_empty() {
            return Err(AppError::bad_request("Please enter your activities"));
        }
        Ok(())
    }
}

/// `GET /buckets/{key}/activities`: activities plus the parent bucket name.
pub async fn list_activities(
    State(service): State<BucketListService>,
    current: CurrentOwner,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let listing = service.read(&current.owner, ReadScope::Activities { key })?;
    Ok(Json(listing))
}

/// `POST /buckets/{key}/activities`
pub async fn create_activity(
    State(service): State<BucketListService>,
    current: CurrentOwner,
    Path(key): Path<String>,
    Json(req): Json<ActivityReq>,
) -> Result<impl IntoResponse, AppError> {
    req.ensure_complete()?;

    let activity = service
        .create(CreateRequest::Activity(CreateActivityRequest {
            owner: current.owner,
            key,
            description: req.description,
        }))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": "Activity added successfully",
            "activity": activity,
        })),
    ))
}

/// `GET /buckets/{key}/activities/{activity_key}`
pub async fn get_activity(
    State(service): State<BucketListService>,
    current: CurrentOwner,
    Path((key, activity_key)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let selector = RecordSelector::Activity {
        key,
        activity_key,
    };
    let activity = service
        .get_specific(&current.owner, &selector)?
        .ok_or_else(|| AppError::not_found("activity not found"))?;
    Ok(Json(activity))
}

/// `PUT /buckets/{key}/activities/{activity_key}`: replace the description.
pub async fn update_activity(
    State(service): State<BucketListService>,
    current: CurrentOwner,
    Path((key, activity_key)): Path<(String, String)>,
    Json(req): Json<ActivityReq>,
) -> Result<impl IntoResponse, AppError> {
    req.ensure_complete()?;

    let outcome = service
        .update(UpdateRequest::Activity(UpdateActivityRequest {
            owner: current.owner,
            key,
            activity_key,
            description: req.description,
        }))
        .await?;
    Ok(Json(outcome))
}

/// `DELETE /buckets/{key}/activities/{activity_key}`
pub async fn delete_activity(
    State(service): State<BucketListService>,
    current: CurrentOwner,
    Path((key, activity_key)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let selector = RecordSelector::Activity {
        key,
        activity_key,
    };
    let outcome = service.delete(&current.owner, &selector).await?;
    Ok(Json(outcome))
}
