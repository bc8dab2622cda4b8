//! Bucket list tracker: accounts own buckets (life goals) and each bucket
//! collects activities (progress notes). State lives in memory behind
//! `services::record_repository` and is optionally mirrored into SQLite.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

use axum::Router;
use services::bucket_list_service::BucketListService;

/// Build the full application router around `service`.
pub fn app(service: BucketListService) -> Router {
    routes::routes::routes().with_state(service)
}
