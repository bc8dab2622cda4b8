//! HTTP handlers. Each delegates to `BucketListService` and renders JSON.

pub mod account_handlers;
pub mod activity_handlers;
pub mod bucket_handlers;
pub mod health_handlers;
