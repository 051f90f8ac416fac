//! Shared types for the order platform
//!
//! 订单服务与周边工具 (sender, 测试) 共用的消息类型。

pub mod order;

// Re-exports
pub use order::{Delivery, Item, OrderDocument, Payment};
pub use serde::{Deserialize, Serialize};
