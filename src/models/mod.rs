//! Core data models for the bucket list service.
//!
//! Buckets are top-level goals owned by an account; activities are progress
//! notes attached to a bucket through its `key`. Both serialize as JSON via
//! `serde` and map onto the persistence tables in `services::persistence`.

pub mod account;
pub mod activity;
pub mod bucket;
pub mod category;
