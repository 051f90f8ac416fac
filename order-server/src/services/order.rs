//! 订单服务
//!
//! 编排写路径 (落库 → 进缓存) 和读路径 (缓存优先，回落数据库)，
//! 以及启动时的缓存预热。数据库是权威存储，缓存只是加速视图，
//! 允许短暂落后。

use std::sync::Arc;

use thiserror::Error;

use crate::cache::OrderCache;
use crate::db::repository::{OrderStore, RepoError};

/// 订单服务错误
#[derive(Debug, Error)]
pub enum OrderError {
    /// 订单号已存在。摄取视角下等价于成功 (数据已在库里)
    #[error("order already exists: {0}")]
    AlreadyExists(String),

    /// 缓存和数据库都没有这条订单
    #[error("order not found: {0}")]
    NotFound(String),

    /// 落库成功但缓存写入失败；记录已视为保存，缓存暂时落后
    #[error("order stored but cache write failed: {0}")]
    CacheWrite(String),

    /// 数据库读写失败
    #[error("store error: {0}")]
    Store(RepoError),
}

/// 订单服务
///
/// 持有存储和缓存两个能力句柄，被摄取循环和读请求分发器共享。
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    cache: Arc<dyn OrderCache>,
}

impl OrderService {
    pub fn new(store: Arc<dyn OrderStore>, cache: Arc<dyn OrderCache>) -> Self {
        Self { store, cache }
    }

    /// 保存一条订单：先落库，成功后提升进缓存
    ///
    /// 缓存写入失败不回滚数据库写入，以 [`OrderError::CacheWrite`]
    /// 上报；读路径会经由数据库回落补偿。
    pub async fn save_order(&self, id: &str, payload: &[u8]) -> Result<(), OrderError> {
        match self.store.add(id, payload).await {
            Ok(()) => {}
            Err(RepoError::Duplicate(_)) => {
                tracing::warn!(order_id = %id, "Order already exists");
                return Err(OrderError::AlreadyExists(id.to_string()));
            }
            Err(e) => {
                tracing::error!(order_id = %id, error = %e, "Failed to save order to database");
                return Err(OrderError::Store(e));
            }
        }

        if let Err(e) = self.cache.set(id, payload.to_vec()) {
            tracing::warn!(order_id = %id, error = %e, "Failed to promote order into cache");
            return Err(OrderError::CacheWrite(e.to_string()));
        }

        tracing::debug!(order_id = %id, "Order saved and promoted into cache");
        Ok(())
    }

    /// 查询订单：缓存命中直接返回，未命中回落数据库
    ///
    /// 订单不可变，缓存条目一经写入即可无限期信任。
    pub async fn get_order(&self, id: &str) -> Result<Vec<u8>, OrderError> {
        if let Some(payload) = self.cache.get(id) {
            tracing::debug!(order_id = %id, "Cache hit");
            return Ok(payload);
        }

        // TODO: 决定回落命中后是否回填缓存。现状是冷 key 每次读都
        // 走数据库，回填会改变缓存命中率的可观测行为，待产品拍板。
        match self.store.get(id).await {
            Ok(payload) => {
                tracing::debug!(order_id = %id, "Cache miss, served from database");
                Ok(payload)
            }
            Err(RepoError::NotFound(_)) => Err(OrderError::NotFound(id.to_string())),
            Err(e) => {
                tracing::error!(order_id = %id, error = %e, "Failed to get order");
                Err(OrderError::Store(e))
            }
        }
    }

    /// 缓存预热：全量拉取数据库记录写入缓存，返回成功条数
    ///
    /// 单条写入失败跳过不致命；只有全量拉取失败才向上传播，
    /// 调用方将其当作启动警告处理。
    pub async fn load_orders_to_cache(&self) -> Result<usize, OrderError> {
        let records = self.store.get_all().await.map_err(OrderError::Store)?;
        let total = records.len();

        let mut loaded = 0usize;
        for record in records {
            match self.cache.set(&record.id, record.payload) {
                Ok(()) => loaded += 1,
                Err(e) => {
                    tracing::warn!(order_id = %record.id, error = %e, "Skipping order during cache warm-up")
                }
            }
        }

        tracing::info!(loaded, total, "Cache warm-up finished");
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheError, MemoryCache};
    use crate::db::DbService;
    use crate::db::repository::{OrderRecord, RepoResult, SurrealOrderStore};
    use async_trait::async_trait;

    async fn service() -> (OrderService, Arc<MemoryCache>) {
        let db = DbService::memory().await.unwrap();
        let cache = Arc::new(MemoryCache::new());
        let store = Arc::new(SurrealOrderStore::new(db.db));
        (
            OrderService::new(store, cache.clone() as Arc<dyn OrderCache>),
            cache,
        )
    }

    /// set 永远失败、get 永远未命中的缓存
    struct BrokenCache;

    impl OrderCache for BrokenCache {
        fn get(&self, _id: &str) -> Option<Vec<u8>> {
            None
        }

        fn set(&self, _id: &str, _payload: Vec<u8>) -> Result<(), CacheError> {
            Err(CacheError::Write("injected failure".into()))
        }

        fn delete(&self, _id: &str) {}
    }

    /// 所有操作都报数据库错误的存储
    struct BrokenStore;

    #[async_trait]
    impl OrderStore for BrokenStore {
        async fn add(&self, _id: &str, _payload: &[u8]) -> RepoResult<()> {
            Err(RepoError::Database("store down".into()))
        }

        async fn get(&self, _id: &str) -> RepoResult<Vec<u8>> {
            Err(RepoError::Database("store down".into()))
        }

        async fn get_all(&self) -> RepoResult<Vec<OrderRecord>> {
            Err(RepoError::Database("store down".into()))
        }
    }

    #[tokio::test]
    async fn save_then_get_roundtrip() {
        let (service, _) = service().await;
        service.save_order("A1", b"p1").await.unwrap();
        assert_eq!(service.get_order("A1").await.unwrap(), b"p1");
    }

    #[tokio::test]
    async fn get_unknown_order_is_not_found() {
        let (service, _) = service().await;
        let err = service.get_order("A2").await.unwrap_err();
        assert!(matches!(err, OrderError::NotFound(id) if id == "A2"));
    }

    #[tokio::test]
    async fn second_save_reports_already_exists_and_keeps_first_payload() {
        let (service, _) = service().await;
        service.save_order("A1", b"p1").await.unwrap();

        let err = service.save_order("A1", b"p2").await.unwrap_err();
        assert!(matches!(err, OrderError::AlreadyExists(id) if id == "A1"));
        assert_eq!(service.get_order("A1").await.unwrap(), b"p1");
    }

    #[tokio::test]
    async fn cache_write_failure_still_serves_reads_from_the_store() {
        let db = DbService::memory().await.unwrap();
        let store = Arc::new(SurrealOrderStore::new(db.db));
        let service = OrderService::new(store, Arc::new(BrokenCache));

        let err = service.save_order("A1", b"p1").await.unwrap_err();
        assert!(matches!(err, OrderError::CacheWrite(_)));

        // 落库已经成功，读路径经数据库回落仍然可用
        assert_eq!(service.get_order("A1").await.unwrap(), b"p1");
    }

    #[tokio::test]
    async fn store_failure_is_surfaced_not_swallowed() {
        let service = OrderService::new(Arc::new(BrokenStore), Arc::new(MemoryCache::new()));
        assert!(matches!(
            service.save_order("A1", b"p1").await.unwrap_err(),
            OrderError::Store(_)
        ));
        assert!(matches!(
            service.get_order("A1").await.unwrap_err(),
            OrderError::Store(_)
        ));
        assert!(matches!(
            service.load_orders_to_cache().await.unwrap_err(),
            OrderError::Store(_)
        ));
    }

    #[tokio::test]
    async fn warm_up_promotes_every_stored_record() {
        let (service, cache) = service().await;
        service.save_order("A1", b"p1").await.unwrap();
        service.save_order("A2", b"p2").await.unwrap();

        // 清空缓存模拟重启后冷启动
        cache.delete("A1");
        cache.delete("A2");
        assert!(cache.is_empty());

        let loaded = service.load_orders_to_cache().await.unwrap();
        assert_eq!(loaded, 2);
        assert_eq!(cache.get("A1").as_deref(), Some(b"p1".as_slice()));
        assert_eq!(cache.get("A2").as_deref(), Some(b"p2".as_slice()));
    }
}
