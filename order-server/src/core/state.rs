use std::sync::Arc;

use crate::cache::{MemoryCache, OrderCache};
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{OrderStore, SurrealOrderStore};
use crate::services::OrderService;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 进程启动时构造一次，此后以句柄形式传给摄取循环和每个
/// HTTP 处理器；没有全局单例。Arc 浅拷贝，克隆成本极低。
///
/// # 组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | DbService | 嵌入式数据库 |
/// | cache | Arc<MemoryCache> | 订单内存缓存 |
/// | orders | Arc<OrderService> | 订单读写服务 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库
    pub db: DbService,
    /// 订单内存缓存
    pub cache: Arc<MemoryCache>,
    /// 订单服务
    pub orders: Arc<OrderService>,
}

impl ServerState {
    /// 初始化状态：打开数据库并装配服务
    pub async fn initialize(config: &Config) -> anyhow::Result<Self> {
        let db = DbService::new(&config.data_dir)
            .await
            .map_err(|e| anyhow::anyhow!("database initialization failed: {e}"))?;
        Ok(Self::with_db(config.clone(), db))
    }

    /// 用现成的数据库句柄装配状态 (测试用内存库)
    pub fn with_db(config: Config, db: DbService) -> Self {
        let cache = Arc::new(MemoryCache::new());
        let store: Arc<dyn OrderStore> = Arc::new(SurrealOrderStore::new(db.db.clone()));
        let orders = Arc::new(OrderService::new(
            store,
            Arc::clone(&cache) as Arc<dyn OrderCache>,
        ));

        Self {
            config,
            db,
            cache,
            orders,
        }
    }

    /// 缓存预热：失败只告警，服务照常启动 (读路径经数据库回落)
    pub async fn warm_cache(&self) {
        tracing::info!("Restoring cache...");
        match self.orders.load_orders_to_cache().await {
            Ok(loaded) => tracing::info!(loaded, "Cache restored"),
            Err(e) => tracing::warn!(error = %e, "Failed to restore cache"),
        }
    }
}
