//! Defines routes for accounts, buckets and activities.
//!
//! ## Structure
//! - **Account endpoints**
//!   - `POST /register`, `POST /login`, `POST /logout`
//!   - `GET  /categories`: fixed category table
//!
//! - **Bucket endpoints**
//!   - `GET    /buckets`: list the caller's buckets
//!   - `POST   /buckets`: create bucket
//!   - `GET    /buckets/{key}`: fetch one bucket
//!   - `PUT    /buckets/{key}`: update bucket
//!   - `DELETE /buckets/{key}`: delete bucket and its activities
//!
//! - **Activity endpoints**
//!   - `GET    /buckets/{key}/activities`: list activities + bucket name
//!   - `POST   /buckets/{key}/activities`: add activity
//!   - `GET    /buckets/{key}/activities/{activity_key}`: fetch one activity
//!   - `PUT    /buckets/{key}/activities/{activity_key}`: update activity
//!   - `DELETE /buckets/{key}/activities/{activity_key}`: delete activity

use crate::{
    handlers::{
        account_handlers::{login, logout, register},
        activity_handlers::{
            create_activity, delete_activity, get_activity, list_activities, update_activity,
        },
        bucket_handlers::{
            create_bucket, delete_bucket, get_bucket, list_buckets, list_categories,
            update_bucket,
        },
        health_handlers::{healthz, readyz},
    },
    services::bucket_list_service::BucketListService,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build and return the router for the whole service.
///
/// The router carries shared state (`BucketListService`) to all handlers.
pub fn routes() -> Router<BucketListService> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Account routes
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/categories", get(list_categories))
        // Bucket routes
        .route("/buckets", get(list_buckets).post(create_bucket))
        .route(
            "/buckets/{key}",
            get(get_bucket).put(update_bucket).delete(delete_bucket),
        )
        // Activity routes
        .route(
            "/buckets/{key}/activities",
            get(list_activities).post(create_activity),
        )
        .route(
            "/buckets/{key}/activities/{activity_key}",
            get(get_activity)
                .put(update_activity)
                .delete(delete_activity),
        )
}
