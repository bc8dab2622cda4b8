//! src/services/record_repository.rs
//!
//! RecordRepository is the in-memory home of buckets and activities. It owns
//! both collections behind a single lock so a bucket delete and its activity
//! cascade are applied atomically. Every lookup is scoped to an owner.

use crate::models::{
    activity::{Activity, CreateActivityRequest, UpdateActivityRequest},
    bucket::{Bucket, CreateBucketRequest, UpdateBucketRequest},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Length of every generated bucket and activity key.
pub const KEY_LEN: usize = 8;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("bucket `{0}` not found")]
    BucketNotFound(String),
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("repository lock poisoned during {0}")]
    LockPoisoned(&'static str),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// The two kinds of record the repository manages.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Bucket,
    Activity,
}

/// A stored record of either kind.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum Record {
    Bucket(Bucket),
    Activity(Activity),
}

#[derive(Clone, Debug)]
pub enum CreateRequest {
    Bucket(CreateBucketRequest),
    Activity(CreateActivityRequest),
}

#[derive(Clone, Debug)]
pub enum UpdateRequest {
    Bucket(UpdateBucketRequest),
    Activity(UpdateActivityRequest),
}

/// Which collection a read walks.
#[derive(Clone, Debug)]
pub enum ReadScope {
    Buckets,
    /// Activities under the bucket with this key.
    Activities { key: String },
}

/// Points at a single record for lookups and deletes.
#[derive(Clone, Debug)]
pub enum RecordSelector {
    Bucket { key: String },
    Activity { key: String, activity_key: String },
}

/// Activities of one bucket together with that bucket's name.
///
/// `bucket_name` is `None` when the parent bucket is not visible to the owner.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ActivityListing {
    pub bucket_name: Option<String>,
    pub activities: Vec<Activity>,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum ReadResult {
    Buckets(Vec<Bucket>),
    Activities(ActivityListing),
}

/// Success marker returned by updates and deletes.
///
/// `affected` counts records of `kind` that were touched; `cascaded` counts
/// activities removed alongside a deleted bucket.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub kind: RecordKind,
    pub message: &'static str,
    pub affected: usize,
    pub cascaded: usize,
}

/// Both collections, in insertion order.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Collections {
    pub buckets: Vec<Bucket>,
    pub activities: Vec<Activity>,
}

/// Owner-scoped CRUD over buckets and activities.
///
/// Reads share the lock; creates, updates and deletes hold it exclusively,
/// which also makes key generation collision checks race free.
#[derive(Debug, Default)]
pub struct RecordRepository {
    collections: RwLock<Collections>,
}

impl RecordRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously persisted collections.
    pub fn from_collections(collections: Collections) -> Self {
        Self {
            collections: RwLock::new(collections),
        }
    }

    fn read_guard(&self) -> RepositoryResult<RwLockReadGuard<'_, Collections>> {
        self.collections
            .read()
            .map_err(|_| RepositoryError::LockPoisoned("read"))
    }

    fn write_guard(&self) -> RepositoryResult<RwLockWriteGuard<'_, Collections>> {
        self.collections
            .write()
            .map_err(|_| RepositoryError::LockPoisoned("write"))
    }

    /// Number of stored (buckets, activities).
    pub fn counts(&self) -> RepositoryResult<(usize, usize)> {
        let guard = self.read_guard()?;
        Ok((guard.buckets.len(), guard.activities.len()))
    }

    // --- kind dispatch ---

    pub fn create(&self, request: CreateRequest) -> RepositoryResult<Record> {
        match request {
            CreateRequest::Bucket(req) => self.create_bucket(req).map(Record::Bucket),
            CreateRequest::Activity(req) => self.create_activity(req).map(Record::Activity),
        }
    }

    /// Build the record `create` would append, without appending it.
    ///
    /// The drawn key is only guaranteed free until the next write, so callers
    /// must serialize `prepare` and [`RecordRepository::insert`] against
    /// every other writer.
    pub fn prepare(&self, request: CreateRequest) -> RepositoryResult<Record> {
        let guard = self.read_guard()?;
        match request {
            CreateRequest::Bucket(req) => Ok(Record::Bucket(new_bucket(&guard, req))),
            CreateRequest::Activity(req) => new_activity(&guard, req).map(Record::Activity),
        }
    }

    /// Append a record built by [`RecordRepository::prepare`].
    pub fn insert(&self, record: Record) -> RepositoryResult<()> {
        let mut guard = self.write_guard()?;
        match record {
            Record::Bucket(bucket) => guard.buckets.push(bucket),
            Record::Activity(activity) => guard.activities.push(activity),
        }
        Ok(())
    }

    pub fn read(&self, owner: &str, scope: ReadScope) -> RepositoryResult<ReadResult> {
        match scope {
            ReadScope::Buckets => self.read_buckets(owner).map(ReadResult::Buckets),
            ReadScope::Activities { key } => self
                .read_activities(owner, &key)
                .map(ReadResult::Activities),
        }
    }

    pub fn get_specific(
        &self,
        owner: &str,
        selector: &RecordSelector,
    ) -> RepositoryResult<Option<Record>> {
        match selector {
            RecordSelector::Bucket { key } => {
                Ok(self.get_bucket(owner, key)?.map(Record::Bucket))
            }
            RecordSelector::Activity { key, activity_key } => Ok(self
                .get_activity(owner, key, activity_key)?
                .map(Record::Activity)),
        }
    }

    pub fn update(&self, request: UpdateRequest) -> RepositoryResult<Outcome> {
        match request {
            UpdateRequest::Bucket(req) => self.update_bucket(req),
            UpdateRequest::Activity(req) => self.update_activity(req),
        }
    }

    pub fn delete(&self, owner: &str, selector: &RecordSelector) -> RepositoryResult<Outcome> {
        match selector {
            RecordSelector::Bucket { key } => self.delete_bucket(owner, key),
            RecordSelector::Activity { key, activity_key } => {
                self.delete_activity(owner, key, activity_key)
            }
        }
    }

    // --- buckets ---

    /// Append a new bucket with a fresh key and today's date.
    ///
    /// Field validation is the caller's job.
    pub fn create_bucket(&self, req: CreateBucketRequest) -> RepositoryResult<Bucket> {
        let mut guard = self.write_guard()?;
        let bucket = new_bucket(&guard, req);
        guard.buckets.push(bucket.clone());
        debug!(owner = %bucket.owner, key = %bucket.key, "bucket created");
        Ok(bucket)
    }

    /// Every bucket of `owner`, in insertion order.
    pub fn read_buckets(&self, owner: &str) -> RepositoryResult<Vec<Bucket>> {
        let guard = self.read_guard()?;
        Ok(guard
            .buckets
            .iter()
            .filter(|b| b.owner == owner)
            .cloned()
            .collect())
    }

    pub fn get_bucket(&self, owner: &str, key: &str) -> RepositoryResult<Option<Bucket>> {
        let guard = self.read_guard()?;
        Ok(find_bucket(&guard, owner, key).cloned())
    }

    /// Overwrite name, description and category of the owner's bucket.
    ///
    /// A missing bucket is not an error: the outcome reports zero affected.
    pub fn update_bucket(&self, req: UpdateBucketRequest) -> RepositoryResult<Outcome> {
        let mut guard = self.write_guard()?;
        let mut affected = 0;
        for bucket in guard
            .buckets
            .iter_mut()
            .filter(|b| b.owner == req.owner && b.key == req.key)
        {
            bucket.name = req.name.clone();
            bucket.description = req.description.clone();
            bucket.category = req.category;
            affected += 1;
        }
        debug!(owner = %req.owner, key = %req.key, affected, "bucket update");
        Ok(Outcome {
            kind: RecordKind::Bucket,
            message: "Bucket updated successfully",
            affected,
            cascaded: 0,
        })
    }

    /// Remove the owner's bucket and every activity filed under its key.
    pub fn delete_bucket(&self, owner: &str, key: &str) -> RepositoryResult<Outcome> {
        let mut guard = self.write_guard()?;

        let before = guard.buckets.len();
        guard.buckets.retain(|b| !(b.owner == owner && b.key == key));
        let affected = before - guard.buckets.len();

        let before = guard.activities.len();
        guard
            .activities
            .retain(|a| !(a.owner == owner && a.key == key));
        let cascaded = before - guard.activities.len();

        debug!(owner, key, affected, cascaded, "bucket delete");
        Ok(Outcome {
            kind: RecordKind::Bucket,
            message: "Bucket deleted successfully",
            affected,
            cascaded,
        })
    }

    // --- activities ---

    /// Append an activity under an existing bucket of the same owner.
    pub fn create_activity(&self, req: CreateActivityRequest) -> RepositoryResult<Activity> {
        let mut guard = self.write_guard()?;
        let activity = new_activity(&guard, req)?;
        guard.activities.push(activity.clone());
        debug!(
            owner = %activity.owner,
            key = %activity.key,
            activity_key = %activity.activity_key,
            "activity created"
        );
        Ok(activity)
    }

    /// Activities of the owner under `key`, joined with the parent bucket's name.
    ///
    /// The join is attempted even when no activity matches.
    pub fn read_activities(&self, owner: &str, key: &str) -> RepositoryResult<ActivityListing> {
        if key.trim().is_empty() {
            return Err(RepositoryError::MissingField("key"));
        }

        let guard = self.read_guard()?;
        let activities = guard
            .activities
            .iter()
            .filter(|a| a.owner == owner && a.key == key)
            .cloned()
            .collect();
        let bucket_name = find_bucket(&guard, owner, key).map(|b| b.name.clone());

        Ok(ActivityListing {
            bucket_name,
            activities,
        })
    }

    pub fn get_activity(
        &self,
        owner: &str,
        key: &str,
        activity_key: &str,
    ) -> RepositoryResult<Option<Activity>> {
        let guard = self.read_guard()?;
        Ok(guard
            .activities
            .iter()
            .find(|a| a.owner == owner && a.key == key && a.activity_key == activity_key)
            .cloned())
    }

    /// Overwrite the description of one activity. Missing activities are a no-op.
    pub fn update_activity(&self, req: UpdateActivityRequest) -> RepositoryResult<Outcome> {
        let mut guard = self.write_guard()?;
        let mut affected = 0;
        for activity in guard.activities.iter_mut().filter(|a| {
            a.owner == req.owner && a.key == req.key && a.activity_key == req.activity_key
        }) {
            activity.description = req.description.clone();
            affected += 1;
        }
        debug!(
            owner = %req.owner,
            key = %req.key,
            activity_key = %req.activity_key,
            affected,
            "activity update"
        );
        Ok(Outcome {
            kind: RecordKind::Activity,
            message: "Activity updated successfully",
            affected,
            cascaded: 0,
        })
    }

    /// Remove the activity matching both `key` and `activity_key`.
    pub fn delete_activity(
        &self,
        owner: &str,
        key: &str,
        activity_key: &str,
    ) -> RepositoryResult<Outcome> {
        let mut guard = self.write_guard()?;
        let before = guard.activities.len();
        guard.activities.retain(|a| {
            !(a.owner == owner && a.key == key && a.activity_key == activity_key)
        });
        let affected = before - guard.activities.len();

        debug!(owner, key, activity_key, affected, "activity delete");
        Ok(Outcome {
            kind: RecordKind::Activity,
            message: "Activity successfully deleted",
            affected,
            cascaded: 0,
        })
    }
}

fn new_bucket(collections: &Collections, req: CreateBucketRequest) -> Bucket {
    let key = generate_key(|candidate| collections.buckets.iter().any(|b| b.key == candidate));
    Bucket {
        owner: req.owner,
        name: req.name,
        description: req.description,
        category: req.category,
        created: Utc::now().date_naive(),
        key,
    }
}

fn new_activity(
    collections: &Collections,
    req: CreateActivityRequest,
) -> RepositoryResult<Activity> {
    if req.key.trim().is_empty() {
        return Err(RepositoryError::MissingField("key"));
    }
    if find_bucket(collections, &req.owner, &req.key).is_none() {
        return Err(RepositoryError::BucketNotFound(req.key));
    }

    let activity_key = generate_key(|candidate| {
        collections
            .activities
            .iter()
            .any(|a| a.key == req.key && a.activity_key == candidate)
    });
    Ok(Activity {
        owner: req.owner,
        description: req.description,
        created: Utc::now().date_naive(),
        activity_key,
        key: req.key,
    })
}

fn find_bucket<'a>(collections: &'a Collections, owner: &str, key: &str) -> Option<&'a Bucket> {
    collections
        .buckets
        .iter()
        .find(|b| b.owner == owner && b.key == key)
}

/// Draw 8-hex-character keys from random v4 UUIDs until one is not `taken`.
///
/// The keyspace is only 32 bits, so the caller must check candidates against
/// the collection they will live in.
pub fn generate_key(taken: impl Fn(&str) -> bool) -> String {
    loop {
        let mut candidate = Uuid::new_v4().simple().to_string();
        candidate.truncate(KEY_LEN);
        if !taken(&candidate) {
            return candidate;
        }
        debug!(candidate = %candidate, "generated key collided, redrawing");
    }
}
