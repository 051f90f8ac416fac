//! 业务服务模块
//!
//! - [`OrderService`] — 订单写入/查询/缓存预热

pub mod order;

pub use order::{OrderError, OrderService};
