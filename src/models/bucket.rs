//! Represents a bucket, a life goal owned by a single account.

use crate::models::category::Category;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A bucket list goal.
///
/// The `key` is the external 8-character identifier used in URLs and is the
/// back-reference carried by every activity attached to this bucket.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Bucket {
    /// Account identifier that owns this bucket.
    pub owner: String,

    /// Short title of the goal.
    pub name: String,

    /// Free-form description.
    pub description: String,

    /// Resolved category label.
    pub category: Category,

    /// Day the bucket was created. Never changes.
    pub created: NaiveDate,

    /// Generated 8-character identifier. Never changes.
    pub key: String,
}

/// Fields supplied when creating a bucket.
#[derive(Debug, Clone)]
pub struct CreateBucketRequest {
    pub owner: String,
    pub name: String,
    pub description: String,
    pub category: Category,
}

/// Replacement values for the mutable fields of a bucket.
#[derive(Debug, Clone)]
pub struct UpdateBucketRequest {
    pub owner: String,
    pub key: String,
    pub name: String,
    pub description: String,
    pub category: Category,
}
