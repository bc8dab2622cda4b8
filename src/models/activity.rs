//! Represents an activity, a progress note attached to a bucket.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A progress note on a bucket.
///
/// `key` points at the parent bucket's key; `activity_key` distinguishes the
/// activities sharing that parent.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Activity {
    /// Account identifier that owns this activity.
    pub owner: String,

    /// The note itself.
    pub description: String,

    /// Day the activity was recorded.
    pub created: NaiveDate,

    /// Generated 8-character identifier, unique under `key`.
    pub activity_key: String,

    /// Key of the parent bucket.
    pub key: String,
}

/// Fields supplied when adding an activity to a bucket.
#[derive(Debug, Clone)]
pub struct CreateActivityRequest {
    pub owner: String,
    pub key: String,
    pub description: String,
}

/// Replacement description for an existing activity.
#[derive(Debug, Clone)]
pub struct UpdateActivityRequest {
    pub owner: String,
    pub key: String,
    pub activity_key: String,
    pub description: String,
}
