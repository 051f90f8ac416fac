//! Repository Module
//!
//! Durable persistence capability for order records. The rest of the
//! service depends only on [`OrderStore`]; the SurrealDB adapter lives
//! in [`order`].

pub mod order;

// Re-exports
pub use order::SurrealOrderStore;

use async_trait::async_trait;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// 一条已落库的订单记录
///
/// `payload` 是摄取时收到的原始字节，入库后不再变更。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub id: String,
    pub payload: Vec<u8>,
}

/// 订单持久化能力
///
/// 数据库是唯一权威存储；订单号唯一性由存储层约束保证。
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// 新增一条订单记录；订单号已存在时返回 [`RepoError::Duplicate`]
    async fn add(&self, id: &str, payload: &[u8]) -> RepoResult<()>;

    /// 按订单号读取载荷；不存在时返回 [`RepoError::NotFound`]
    async fn get(&self, id: &str) -> RepoResult<Vec<u8>>;

    /// 读取全部订单记录 (缓存预热用)
    async fn get_all(&self) -> RepoResult<Vec<OrderRecord>>;
}
