//! Order Server - 订单摄取与查询服务
//!
//! # 架构概述
//!
//! 从 Kafka 消费订单消息，逐条落库 (exactly-once，靠订单号唯一约束
//! 去重)，提升进内存缓存，并通过 HTTP 提供按订单号的点查。
//!
//! 数据流：
//!
//! ```text
//! Kafka → IngestionLoop → OrderService.save_order
//!                            ├── OrderStore  (权威写入)
//!                            └── OrderCache  (尽力提升)
//!
//! HTTP GET /api/v1/orders/{id} → OrderService.get_order
//!                                   ├── 缓存命中 → 直接返回
//!                                   └── 未命中 → 数据库回落
//! ```
//!
//! # 模块结构
//!
//! ```text
//! order-server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── cache/         # 内存缓存
//! ├── db/            # 嵌入式数据库与订单仓储
//! ├── broker/        # 消息源 (Kafka / 内存)
//! ├── ingest/        # 摄取循环
//! ├── services/      # 订单服务
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 日志
//! ```

pub mod api;
pub mod broker;
pub mod cache;
pub mod core;
pub mod db;
pub mod ingest;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use broker::{KafkaSource, MemorySender, MemorySource, MessageSource};
pub use cache::{MemoryCache, OrderCache};
pub use crate::core::{Config, Server, ServerError, ServerState};
pub use db::DbService;
pub use db::repository::{OrderRecord, OrderStore};
pub use ingest::IngestionLoop;
pub use services::{OrderError, OrderService};

// Re-export logger functions
pub use utils::init_logger;
