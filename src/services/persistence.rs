//! src/services/persistence.rs
//!
//! Optional SQLite mirror of the in-memory stores. Rows are written as the
//! repository mutates and read back in insertion order (`seq`) at startup.
//! SQLite is never queried to answer requests.

use crate::{
    models::{
        account::Account,
        activity::{Activity, UpdateActivityRequest},
        bucket::{Bucket, UpdateBucketRequest},
        category::Category,
    },
    services::record_repository::Collections,
};
use chrono::NaiveDate;
use sqlx::{
    FromRow, SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use std::{path::Path, str::FromStr, sync::Arc};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("stored row is invalid: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Everything read back from SQLite at startup.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub accounts: Vec<Account>,
    pub collections: Collections,
}

#[derive(FromRow)]
struct AccountRow {
    identifier: String,
    salt: String,
    secret: String,
}

#[derive(FromRow)]
struct BucketRow {
    owner: String,
    key: String,
    name: String,
    description: String,
    category: String,
    created: NaiveDate,
}

#[derive(FromRow)]
struct ActivityRow {
    owner: String,
    key: String,
    activity_key: String,
    description: String,
    created: NaiveDate,
}

impl TryFrom<BucketRow> for Bucket {
    type Error = PersistenceError;

    fn try_from(row: BucketRow) -> PersistenceResult<Self> {
        let category = Category::from_str(&row.category)
            .map_err(|err| PersistenceError::Corrupt(format!("bucket `{}`: {}", row.key, err)))?;
        Ok(Bucket {
            owner: row.owner,
            name: row.name,
            description: row.description,
            category,
            created: row.created,
            key: row.key,
        })
    }
}

impl From<ActivityRow> for Activity {
    fn from(row: ActivityRow) -> Self {
        Activity {
            owner: row.owner,
            description: row.description,
            created: row.created,
            activity_key: row.activity_key,
            key: row.key,
        }
    }
}

/// Handle on the SQLite database mirroring accounts, buckets and activities.
#[derive(Clone)]
pub struct Persistence {
    /// Shared SQLite connection pool.
    pub db: Arc<SqlitePool>,
}

impl Persistence {
    /// Open (creating if needed) the database behind `database_url`.
    pub async fn connect(database_url: &str) -> PersistenceResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        if let Some(parent) = Path::new(options.get_filename()).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
                info!("Created missing directory {:?}", parent);
            }
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Ok(Self { db: Arc::new(pool) })
    }

    /// Apply every pending migration under `migrations/`.
    pub async fn migrate(&self) -> PersistenceResult<()> {
        let migrator = sqlx::migrate!("./migrations");
        debug!("Checking {} embedded migrations", migrator.iter().count());
        migrator.run(&*self.db).await?;
        Ok(())
    }

    /// Cheap connectivity probe for readiness checks.
    pub async fn ping(&self) -> PersistenceResult<()> {
        let value: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&*self.db).await?;
        if value == 1 {
            Ok(())
        } else {
            Err(PersistenceError::Corrupt(format!(
                "unexpected probe result: {}",
                value
            )))
        }
    }

    /// Read every stored row in insertion order.
    pub async fn load(&self) -> PersistenceResult<Snapshot> {
        let accounts = sqlx::query_as::<_, AccountRow>(
            "SELECT identifier, salt, secret FROM accounts ORDER BY seq",
        )
        .fetch_all(&*self.db)
        .await?
        .into_iter()
        .map(|row| Account {
            identifier: row.identifier,
            salt: row.salt,
            secret: row.secret,
        })
        .collect();

        let buckets = sqlx::query_as::<_, BucketRow>(
            "SELECT owner, key, name, description, category, created FROM buckets ORDER BY seq",
        )
        .fetch_all(&*self.db)
        .await?
        .into_iter()
        .map(Bucket::try_from)
        .collect::<PersistenceResult<Vec<_>>>()?;

        let activities = sqlx::query_as::<_, ActivityRow>(
            "SELECT owner, key, activity_key, description, created
             FROM activities ORDER BY seq",
        )
        .fetch_all(&*self.db)
        .await?
        .into_iter()
        .map(Activity::from)
        .collect();

        Ok(Snapshot {
            accounts,
            collections: Collections {
                buckets,
                activities,
            },
        })
    }

    pub async fn insert_account(&self, account: &Account) -> PersistenceResult<()> {
        sqlx::query("INSERT INTO accounts (identifier, salt, secret) VALUES (?, ?, ?)")
            .bind(&account.identifier)
            .bind(&account.salt)
            .bind(&account.secret)
            .execute(&*self.db)
            .await?;
        Ok(())
    }

    pub async fn insert_bucket(&self, bucket: &Bucket) -> PersistenceResult<()> {
        sqlx::query(
            "INSERT INTO buckets (owner, key, name, description, category, created)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&bucket.owner)
        .bind(&bucket.key)
        .bind(&bucket.name)
        .bind(&bucket.description)
        .bind(bucket.category.label())
        .bind(bucket.created)
        .execute(&*self.db)
        .await?;
        Ok(())
    }

    pub async fn update_bucket(&self, req: &UpdateBucketRequest) -> PersistenceResult<u64> {
        let result = sqlx::query(
            "UPDATE buckets SET name = ?, description = ?, category = ?
             WHERE owner = ? AND key = ?",
        )
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.category.label())
        .bind(&req.owner)
        .bind(&req.key)
        .execute(&*self.db)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete a bucket and its activities in one transaction.
    pub async fn delete_bucket(&self, owner: &str, key: &str) -> PersistenceResult<()> {
        let mut tx = self.db.begin().await?;
        sqlx::query("DELETE FROM buckets WHERE owner = ? AND key = ?")
            .bind(owner)
            .bind(key)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM activities WHERE owner = ? AND key = ?")
            .bind(owner)
            .bind(key)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn insert_activity(&self, activity: &Activity) -> PersistenceResult<()> {
        sqlx::query(
            "INSERT INTO activities (owner, key, activity_key, description, created)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&activity.owner)
        .bind(&activity.key)
        .bind(&activity.activity_key)
        .bind(&activity.description)
        .bind(activity.created)
        .execute(&*self.db)
        .await?;
        Ok(())
    }

    pub async fn update_activity(&self, req: &UpdateActivityRequest) -> PersistenceResult<u64> {
        let result = sqlx::query(
            "UPDATE activities SET description = ?
             WHERE owner = ? AND key = ? AND activity_key = ?",
        )
        .bind(&req.description)
        .bind(&req.owner)
        .bind(&req.key)
        .bind(&req.activity_key)
        .execute(&*self.db)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_activity(
        &self,
        owner: &str,
        key: &str,
        activity_key: &str,
    ) -> PersistenceResult<()> {
        sqlx::query("DELETE FROM activities WHERE owner = ? AND key = ? AND activity_key = ?")
            .bind(owner)
            .bind(key)
            .bind(activity_key)
            .execute(&*self.db)
            .await?;
        Ok(())
    }
}
