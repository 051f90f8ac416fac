//! Order Repository (SurrealDB)
//!
//! Orders are stored one record per order, keyed by the order id.
//! The payload is opaque bytes and is returned verbatim.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use surrealdb::sql::Bytes;

use super::{OrderRecord, OrderStore, RepoError, RepoResult};

const TABLE: &str = "orders";

#[derive(Debug, Serialize, Deserialize)]
struct OrderRow {
    data: Bytes,
}

#[derive(Debug, Deserialize)]
struct OrderRowWithId {
    id: String,
    data: Bytes,
}

/// SurrealDB-backed implementation of [`OrderStore`]
#[derive(Clone, Debug)]
pub struct SurrealOrderStore {
    db: Surreal<Db>,
}

impl SurrealOrderStore {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderStore for SurrealOrderStore {
    async fn add(&self, id: &str, payload: &[u8]) -> RepoResult<()> {
        // record id 即订单号，唯一性由引擎的 record-exists 检查保证
        let _created: Option<OrderRow> = self
            .db
            .create((TABLE, id))
            .content(OrderRow {
                data: Bytes::from(payload.to_vec()),
            })
            .await
            .map_err(|e| match e {
                surrealdb::Error::Db(surrealdb::error::Db::RecordExists { .. }) => {
                    RepoError::Duplicate(id.to_string())
                }
                other => RepoError::Database(other.to_string()),
            })?;
        Ok(())
    }

    async fn get(&self, id: &str) -> RepoResult<Vec<u8>> {
        let row: Option<OrderRow> = self.db.select((TABLE, id)).await?;
        row.map(|r| r.data.into_inner())
            .ok_or_else(|| RepoError::NotFound(id.to_string()))
    }

    async fn get_all(&self) -> RepoResult<Vec<OrderRecord>> {
        let mut result = self
            .db
            .query("SELECT record::id(id) AS id, data FROM type::table($tb)")
            .bind(("tb", TABLE))
            .await?;
        let rows: Vec<OrderRowWithId> = result.take(0)?;
        Ok(rows
            .into_iter()
            .map(|row| OrderRecord {
                id: row.id,
                payload: row.data.into_inner(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn store() -> SurrealOrderStore {
        let db = DbService::memory().await.unwrap();
        SurrealOrderStore::new(db.db)
    }

    #[tokio::test]
    async fn add_then_get_returns_payload_verbatim() {
        let store = store().await;
        store.add("A1", b"{\"order_uid\":\"A1\"}").await.unwrap();

        let payload = store.get("A1").await.unwrap();
        assert_eq!(payload, b"{\"order_uid\":\"A1\"}");
    }

    #[tokio::test]
    async fn get_missing_order_is_not_found() {
        let store = store().await;
        let err = store.get("missing").await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn duplicate_add_is_rejected_without_overwrite() {
        let store = store().await;
        store.add("A1", b"first").await.unwrap();

        let err = store.add("A1", b"second").await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(id) if id == "A1"));

        // 原始载荷保持不变
        assert_eq!(store.get("A1").await.unwrap(), b"first");
    }

    #[tokio::test]
    async fn get_all_returns_every_stored_record() {
        let store = store().await;
        store.add("A1", b"p1").await.unwrap();
        store.add("A2", b"p2").await.unwrap();

        let mut records = store.get_all().await.unwrap();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(
            records,
            vec![
                OrderRecord {
                    id: "A1".into(),
                    payload: b"p1".to_vec()
                },
                OrderRecord {
                    id: "A2".into(),
                    payload: b"p2".to_vec()
                },
            ]
        );
    }
}
