//! 摄取循环
//!
//! 单消费者、严格串行的订单摄取：逐条从消息源取消息，
//! 反序列化 → 校验 → 落库 → 进缓存，全部成功后才提交 offset。
//!
//! 失败处理原则：单条消息的失败永远不终止循环。
//!
//! - 反序列化/校验失败 → 丢弃 (记日志，继续)
//! - 订单号重复 → 等价于成功，照常提交 (数据已在库里)
//! - 落库或缓存失败 → 不提交，交给 broker 的重投递策略
//! - 瞬时接收错误 → 退避后重试
//! - 取消信号或源关闭 → 正常退出

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use validator::Validate;

use crate::broker::{Delivery, MessageSource, SourceError};
use crate::services::{OrderError, OrderService};
use shared::OrderDocument;

/// 瞬时接收错误后的默认退避，避免故障源上的紧密重试
const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// 订单摄取循环
///
/// 作为后台任务运行；`receive` 是唯一的挂起点，
/// 与取消令牌竞争以保证关闭及时生效。
pub struct IngestionLoop<S: MessageSource> {
    source: S,
    orders: Arc<OrderService>,
    cancel: CancellationToken,
    retry_backoff: Duration,
}

impl<S: MessageSource> IngestionLoop<S> {
    pub fn new(source: S, orders: Arc<OrderService>, cancel: CancellationToken) -> Self {
        Self {
            source,
            orders,
            cancel,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    /// 覆盖瞬时错误退避时间 (测试用短值)
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// 运行循环直到取消或源关闭
    pub async fn run(mut self) {
        tracing::info!("Ingestion loop started");

        loop {
            let delivery = tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("Ingestion loop cancelled");
                    break;
                }
                received = self.source.receive() => match received {
                    Ok(delivery) => delivery,
                    Err(SourceError::Cancelled) => {
                        tracing::info!("Message source closed");
                        break;
                    }
                    Err(SourceError::Transient(e)) => {
                        tracing::warn!(error = %e, "Transient receive error, backing off");
                        // 退避期间仍然响应取消
                        tokio::select! {
                            _ = self.cancel.cancelled() => break,
                            _ = tokio::time::sleep(self.retry_backoff) => {}
                        }
                        continue;
                    }
                    Err(SourceError::Fatal(e)) => {
                        tracing::error!(error = %e, "Fatal source error, ingestion loop terminating");
                        break;
                    }
                },
            };

            self.handle(delivery).await;
        }

        if let Err(e) = self.source.close().await {
            tracing::warn!(error = %e, "Failed to close message source");
        }
        tracing::info!("Ingestion loop stopped");
    }

    /// 处理单条消息：Deserialized → Validated → Persisted → Acknowledged
    async fn handle(&mut self, delivery: Delivery) {
        tracing::debug!(
            partition = delivery.position.partition,
            offset = delivery.position.offset,
            "Message received"
        );

        let document: OrderDocument = match serde_json::from_slice(&delivery.payload) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(
                    offset = delivery.position.offset,
                    error = %e,
                    "Dropping malformed message"
                );
                return;
            }
        };

        if let Err(e) = document.validate() {
            tracing::warn!(
                offset = delivery.position.offset,
                error = %e,
                "Dropping invalid order document"
            );
            return;
        }

        match self
            .orders
            .save_order(&document.order_uid, &delivery.payload)
            .await
        {
            Ok(()) => self.acknowledge(&delivery).await,
            Err(OrderError::AlreadyExists(id)) => {
                // 重复投递：数据已持久化，提交避免毒消息循环
                tracing::info!(order_id = %id, "Duplicate delivery, order already stored");
                self.acknowledge(&delivery).await;
            }
            Err(e) => {
                tracing::error!(
                    order_id = %document.order_uid,
                    error = %e,
                    "Failed to save order, leaving message unacknowledged"
                );
            }
        }
    }

    async fn acknowledge(&mut self, delivery: &Delivery) {
        if let Err(e) = self.source.commit(delivery).await {
            tracing::warn!(
                offset = delivery.position.offset,
                error = %e,
                "Failed to commit offset"
            );
        }
    }
}
