//! Database Module
//!
//! Owns the embedded SurrealDB handle used by the repository layer.

pub mod repository;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

use repository::{RepoError, RepoResult};

const NAMESPACE: &str = "orders";
const DATABASE: &str = "orders";

/// Database service — owns the embedded database connection
#[derive(Clone, Debug)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk database under `data_dir`
    pub async fn new(data_dir: &str) -> RepoResult<Self> {
        let db = Surreal::new::<RocksDb>(data_dir).await?;
        db.use_ns(NAMESPACE).use_db(DATABASE).await?;
        tracing::info!(path = %data_dir, "Database connection established (SurrealDB RocksDB)");
        Ok(Self { db })
    }

    /// In-memory database, used by tests and local experiments
    pub async fn memory() -> RepoResult<Self> {
        let db = Surreal::new::<Mem>(()).await?;
        db.use_ns(NAMESPACE).use_db(DATABASE).await?;
        Ok(Self { db })
    }

    /// Liveness check for the health endpoint
    pub async fn ping(&self) -> RepoResult<()> {
        self.db
            .health()
            .await
            .map_err(|e| RepoError::Database(e.to_string()))
    }
}
