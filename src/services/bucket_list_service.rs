//! src/services/bucket_list_service.rs
//!
//! BucketListService is the router state. It fronts the record repository, the
//! identity store and the session registry. When persistence is enabled every
//! mutation is written to SQLite first and applied in memory only once that
//! write succeeds, so a failed write leaves both sides untouched.

use crate::{
    models::account::Account,
    services::{
        identity_store::{IdentityError, IdentityStore},
        persistence::{Persistence, PersistenceError},
        record_repository::{
            CreateRequest, Outcome, ReadResult, ReadScope, Record, RecordRepository,
            RecordSelector, RepositoryError, UpdateRequest,
        },
        session_registry::SessionRegistry,
    },
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Clone)]
pub struct BucketListService {
    pub records: Arc<RecordRepository>,
    pub identities: Arc<IdentityStore>,
    pub sessions: Arc<SessionRegistry>,

    /// SQLite mirror; `None` when running purely in memory.
    pub persistence: Option<Persistence>,

    /// Held across "write to SQLite, then apply in memory" so both see one order.
    write_gate: Arc<Mutex<()>>,
}

impl BucketListService {
    /// A service with empty stores and no persistence.
    pub fn in_memory() -> Self {
        Self::from_parts(RecordRepository::new(), IdentityStore::new(), None)
    }

    /// Load everything stored in `persistence` and keep mirroring into it.
    pub async fn with_persistence(persistence: Persistence) -> ServiceResult<Self> {
        persistence.migrate().await?;
        let snapshot = persistence.load().await?;
        info!(
            accounts = snapshot.accounts.len(),
            buckets = snapshot.collections.buckets.len(),
            activities = snapshot.collections.activities.len(),
            "Loaded persisted state"
        );

        Ok(Self::from_parts(
            RecordRepository::from_collections(snapshot.collections),
            IdentityStore::from_accounts(snapshot.accounts),
            Some(persistence),
        ))
    }

    fn from_parts(
        records: RecordRepository,
        identities: IdentityStore,
        persistence: Option<Persistence>,
    ) -> Self {
        Self {
            records: Arc::new(records),
            identities: Arc::new(identities),
            sessions: Arc::new(SessionRegistry::new()),
            persistence,
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Surface a failed SQLite write. Nothing has been applied in memory.
    fn mirror_failed(err: PersistenceError) -> ServiceError {
        error!("Failed to write mutation to SQLite, discarding it: {}", err);
        ServiceError::Persistence(err)
    }

    // --- accounts & sessions ---

    /// Register an account and open a session for it.
    pub async fn register(
        &self,
        identifier: &str,
        password: &str,
    ) -> ServiceResult<(Account, Uuid)> {
        let _gate = self.write_gate.lock().await;
        let account = match &self.persistence {
            None => self.identities.register(identifier, password)?,
            Some(persistence) => {
                let account = self.identities.prepare(identifier, password)?;
                persistence
                    .insert_account(&account)
                    .await
                    .map_err(Self::mirror_failed)?;
                self.identities.insert(account.clone())?;
                account
            }
        };
        let session = self.sessions.open(&account.identifier);
        info!(identifier = %account.identifier, "Account registered");
        Ok((account, session))
    }

    /// Check credentials and open a session.
    pub fn login(&self, identifier: &str, password: &str) -> ServiceResult<(String, Uuid)> {
        let owner = self.identities.verify(identifier, password)?;
        let session = self.sessions.open(&owner);
        Ok((owner, session))
    }

    pub fn logout(&self, session: &Uuid) -> Option<String> {
        self.sessions.close(session)
    }

    pub fn owner_for_session(&self, session: &Uuid) -> Option<String> {
        self.sessions.resolve(session)
    }

    // --- records ---

    pub async fn create(&self, request: CreateRequest) -> ServiceResult<Record> {
        let _gate = self.write_gate.lock().await;
        let Some(persistence) = &self.persistence else {
            return Ok(self.records.create(request)?);
        };

        let record = self.records.prepare(request)?;
        let mirrored = match &record {
            Record::Bucket(bucket) => persistence.insert_bucket(bucket).await,
            Record::Activity(activity) => persistence.insert_activity(activity).await,
        };
        mirrored.map_err(Self::mirror_failed)?;
        self.records.insert(record.clone())?;
        Ok(record)
    }

    pub fn read(&self, owner: &str, scope: ReadScope) -> ServiceResult<ReadResult> {
        Ok(self.records.read(owner, scope)?)
    }

    pub fn get_specific(
        &self,
        owner: &str,
        selector: &RecordSelector,
    ) -> ServiceResult<Option<Record>> {
        Ok(self.records.get_specific(owner, selector)?)
    }

    pub async fn update(&self, request: UpdateRequest) -> ServiceResult<Outcome> {
        let _gate = self.write_gate.lock().await;
        if let Some(persistence) = &self.persistence {
            let mirrored = match &request {
                UpdateRequest::Bucket(req) => persistence.update_bucket(req).await,
                UpdateRequest::Activity(req) => persistence.update_activity(req).await,
            };
            mirrored.map_err(Self::mirror_failed)?;
        }
        Ok(self.records.update(request)?)
    }

    pub async fn delete(&self, owner: &str, selector: &RecordSelector) -> ServiceResult<Outcome> {
        let _gate = self.write_gate.lock().await;
        if let Some(persistence) = &self.persistence {
            let mirrored = match selector {
                RecordSelector::Bucket { key } => persistence.delete_bucket(owner, key).await,
                RecordSelector::Activity { key, activity_key } => {
                    persistence.delete_activity(owner, key, activity_key).await
                }
            };
            mirrored.map_err(Self::mirror_failed)?;
        }
        Ok(self.records.delete(owner, selector)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        activity::CreateActivityRequest,
        bucket::{CreateBucketRequest, UpdateBucketRequest},
        category::Category,
    };

    async fn persistent_service(dir: &tempfile::TempDir) -> BucketListService {
        let url = format!("sqlite://{}", dir.path().join("bucket_list.db").display());
        let persistence = Persistence::connect(&url).await.unwrap();
        BucketListService::with_persistence(persistence).await.unwrap()
    }

    fn bucket(owner: &str, name: &str) -> CreateRequest {
        CreateRequest::Bucket(CreateBucketRequest {
            owner: owner.into(),
            name: name.into(),
            description: "desc".into(),
            category: Category::Health,
        })
    }

    #[tokio::test]
    async fn state_survives_restart_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let (first_key, second_key) = {
            let service = persistent_service(&dir).await;
            service.register("a@x.com", "long_password").await.unwrap();
            let Record::Bucket(first) = service.create(bucket("a@x.com", "Run")).await.unwrap()
            else {
                panic!("expected a bucket");
            };
            let Record::Bucket(second) = service.create(bucket("a@x.com", "Swim")).await.unwrap()
            else {
                panic!("expected a bucket");
            };
            service
                .create(CreateRequest::Activity(CreateActivityRequest {
                    owner: "a@x.com".into(),
                    key: first.key.clone(),
                    description: "5k done".into(),
                }))
                .await
                .unwrap();
            service
                .update(UpdateRequest::Bucket(UpdateBucketRequest {
                    owner: "a@x.com".into(),
                    key: second.key.clone(),
                    name: "Swim a mile".into(),
                    description: "open water".into(),
                    category: Category::SelfGrowth,
                }))
                .await
                .unwrap();
            (first.key, second.key)
        };

        let service = persistent_service(&dir).await;
        assert!(service.login("a@x.com", "long_password").is_ok());

        let buckets = service.records.read_buckets("a@x.com").unwrap();
        let keys: Vec<_> = buckets.iter().map(|b| b.key.clone()).collect();
        assert_eq!(keys, vec![first_key.clone(), second_key]);
        assert_eq!(buckets[1].name, "Swim a mile");
        assert_eq!(buckets[1].category, Category::SelfGrowth);

        let listing = service.records.read_activities("a@x.com", &first_key).unwrap();
        assert_eq!(listing.activities.len(), 1);
        assert_eq!(listing.bucket_name.as_deref(), Some("Run"));
    }

    #[tokio::test]
    async fn bucket_delete_cascade_is_mirrored() {
        let dir = tempfile::tempdir().unwrap();
        let key = {
            let service = persistent_service(&dir).await;
            let Record::Bucket(bucket) = service.create(bucket("a@x.com", "Run")).await.unwrap()
            else {
                panic!("expected a bucket");
            };
            service
                .create(CreateRequest::Activity(CreateActivityRequest {
                    owner: "a@x.com".into(),
                    key: bucket.key.clone(),
                    description: "5k done".into(),
                }))
                .await
                .unwrap();
            let outcome = service
                .delete("a@x.com", &RecordSelector::Bucket { key: bucket.key.clone() })
                .await
                .unwrap();
            assert_eq!((outcome.affected, outcome.cascaded), (1, 1));
            bucket.key
        };

        let service = persistent_service(&dir).await;
        assert_eq!(service.records.counts().unwrap(), (0, 0));
        assert!(service.records.get_bucket("a@x.com", &key).unwrap().is_none());
    }

    async fn drop_table(service: &BucketListService, table: &str) {
        let persistence = service.persistence.as_ref().unwrap();
        sqlx::query(&format!("DROP TABLE {table}"))
            .execute(&*persistence.db)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn failed_sqlite_write_leaves_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let service = persistent_service(&dir).await;
        let Record::Bucket(kept) = service.create(bucket("a@x.com", "Run")).await.unwrap() else {
            panic!("expected a bucket");
        };
        service
            .create(CreateRequest::Activity(CreateActivityRequest {
                owner: "a@x.com".into(),
                key: kept.key.clone(),
                description: "5k done".into(),
            }))
            .await
            .unwrap();

        drop_table(&service, "activities").await;
        let err = service
            .create(CreateRequest::Activity(CreateActivityRequest {
                owner: "a@x.com".into(),
                key: kept.key.clone(),
                description: "10k done".into(),
            }))
            .await;
        assert!(matches!(err, Err(ServiceError::Persistence(_))));
        assert_eq!(service.records.counts().unwrap(), (1, 1));

        let err = service
            .delete("a@x.com", &RecordSelector::Bucket { key: kept.key.clone() })
            .await;
        assert!(matches!(err, Err(ServiceError::Persistence(_))));
        assert_eq!(service.records.counts().unwrap(), (1, 1));

        drop_table(&service, "buckets").await;
        let err = service.create(bucket("a@x.com", "Swim")).await;
        assert!(matches!(err, Err(ServiceError::Persistence(_))));

        let err = service
            .update(UpdateRequest::Bucket(UpdateBucketRequest {
                owner: "a@x.com".into(),
                key: kept.key.clone(),
                name: "Run a marathon".into(),
                description: "42k".into(),
                category: Category::Career,
            }))
            .await;
        assert!(matches!(err, Err(ServiceError::Persistence(_))));
        assert_eq!(service.records.read_buckets("a@x.com").unwrap(), vec![kept]);
    }

    #[tokio::test]
    async fn failed_registration_can_be_retried() {
        let dir = tempfile::tempdir().unwrap();
        let service = persistent_service(&dir).await;
        drop_table(&service, "accounts").await;

        for _ in 0..2 {
            let err = service.register("a@x.com", "long_password").await;
            assert!(matches!(err, Err(ServiceError::Persistence(_))));
        }
        assert!(matches!(
            service.login("a@x.com", "long_password"),
            Err(ServiceError::Identity(IdentityError::UnknownAccount))
        ));
    }

    #[tokio::test]
    async fn sessions_resolve_to_owner() {
        let service = BucketListService::in_memory();
        let (_, session) = service.register("a@x.com", "long_password").await.unwrap();
        assert_eq!(service.owner_for_session(&session).as_deref(), Some("a@x.com"));

        let (_, second) = service.login("a@x.com", "long_password").unwrap();
        assert_ne!(session, second);
        assert_eq!(service.logout(&session).as_deref(), Some("a@x.com"));
        assert!(service.owner_for_session(&session).is_none());
        assert!(service.owner_for_session(&second).is_some());
    }
}
