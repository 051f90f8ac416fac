//! Server Implementation
//!
//! HTTP 服务器启动、后台任务编排和 graceful shutdown。

use std::net::SocketAddr;
use std::time::Duration;

use crate::api;
use crate::broker::KafkaSource;
use crate::core::tasks::BackgroundTasks;
use crate::core::{Config, Result, ServerError, ServerState};
use crate::ingest::IngestionLoop;

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (测试注入内存数据库用)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> Result<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        // 缓存预热先于对外服务；失败不致命
        state.warm_cache().await;

        // 摄取循环作为后台任务启动
        let mut tasks = BackgroundTasks::new();
        let cancel = tasks.shutdown_token();

        let source = KafkaSource::new(
            &state.config.kafka_brokers,
            &state.config.kafka_group_id,
            &state.config.kafka_topic,
        )
        .map_err(|e| ServerError::Internal(anyhow::anyhow!(e)))?;

        let ingestion = IngestionLoop::new(source, state.orders.clone(), cancel.clone())
            .with_retry_backoff(Duration::from_millis(state.config.ingest_retry_backoff_ms));
        tasks.spawn("order_ingestion", ingestion.run());

        let app = api::router(state.clone());
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        tracing::info!("📦 Order server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(e.into()))?;

        // 关闭顺序：收到信号 → cancel 令牌 → 停止接收新请求 →
        // join 摄取任务 → 释放句柄
        let shutdown_cancel = cancel.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_signal().await;
                tracing::info!("Shutdown signal received");
                shutdown_cancel.cancel();
            })
            .await
            .map_err(|e| ServerError::Internal(e.into()))?;

        tasks.shutdown().await;
        tracing::info!("Gracefully stopped");
        Ok(())
    }
}

/// 等待 ctrl-c 或 SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
