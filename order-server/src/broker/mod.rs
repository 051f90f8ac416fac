//! 消息源模块
//!
//! 订单消息的来源抽象。摄取循环只依赖 [`MessageSource`] 能力，
//! 具体传输由适配器提供：
//!
//! - [`KafkaSource`] — 生产环境的 Kafka consumer (手动提交 offset)
//! - [`MemorySource`] — 进程内 channel，测试和本地联调用

pub mod kafka;
pub mod memory;

// Re-exports
pub use kafka::KafkaSource;
pub use memory::{CommitLog, MemorySender, MemorySource};

use async_trait::async_trait;
use thiserror::Error;

/// 消息源错误
///
/// 摄取循环依赖这三类的区分：取消是正常终止，瞬时错误重试，
/// 致命错误停止消费。
#[derive(Debug, Error)]
pub enum SourceError {
    /// 消费被取消 (正常关闭路径)
    #[error("source cancelled")]
    Cancelled,

    /// 瞬时传输错误，下一轮可恢复
    #[error("transient source error: {0}")]
    Transient(String),

    /// 不可恢复错误 (配置错误、连接无法建立等)
    #[error("fatal source error: {0}")]
    Fatal(String),
}

/// 消息在源内的位置
///
/// Kafka 语义下是 topic + partition + offset；提交该位置即确认
/// 这条消息不再投递。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

/// 一条待处理的原始消息
#[derive(Debug, Clone)]
pub struct Delivery {
    pub key: Option<String>,
    pub payload: Vec<u8>,
    pub position: Position,
}

/// 消息源能力
#[async_trait]
pub trait MessageSource: Send {
    /// 阻塞等待下一条消息
    ///
    /// 这是摄取循环唯一的挂起点；源被关闭时必须及时返回
    /// [`SourceError::Cancelled`]。
    async fn receive(&mut self) -> Result<Delivery, SourceError>;

    /// 确认一条消息已处理完毕 (提交 offset)
    async fn commit(&mut self, delivery: &Delivery) -> Result<(), SourceError>;

    /// 释放底层连接
    async fn close(&mut self) -> Result<(), SourceError>;
}
