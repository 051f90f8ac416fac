//! 订单消息结构
//!
//! Kafka 上的订单文档。服务端只关心 `order_uid` (路由键)，
//! 其余字段原样入库，不做二次解析。

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 入站订单文档
///
/// 除 `order_uid` 外的字段都是透传数据：反序列化只用于结构检查，
/// 持久化的是原始字节。
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderDocument {
    /// 全局唯一订单号 (必填，非空)
    #[validate(length(min = 1, message = "order_uid must not be empty"))]
    pub order_uid: String,
    #[serde(default)]
    pub track_number: String,
    #[serde(default)]
    pub entry: String,
    #[serde(default)]
    pub delivery: Delivery,
    #[serde(default)]
    pub payment: Payment,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub locale: String,
    #[serde(default)]
    pub internal_signature: String,
    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub delivery_service: String,
    #[serde(default)]
    pub shardkey: String,
    #[serde(default)]
    pub sm_id: i64,
    #[serde(default)]
    pub date_created: String,
    #[serde(default)]
    pub oof_shard: String,
}

/// 收货信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delivery {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub email: String,
}

/// 支付信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default)]
    pub transaction: String,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub payment_dt: i64,
    #[serde(default)]
    pub bank: String,
    #[serde(default)]
    pub delivery_cost: i64,
    #[serde(default)]
    pub goods_total: i64,
    #[serde(default)]
    pub custom_fee: i64,
}

/// 订单明细行
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub chrt_id: i64,
    #[serde(default)]
    pub track_number: String,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub rid: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sale: i64,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub total_price: i64,
    #[serde(default)]
    pub nm_id: i64,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub status: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_document() {
        let raw = r#"{
            "order_uid": "b563feb7b2b84b6test",
            "track_number": "WBILMTESTTRACK",
            "entry": "WBIL",
            "delivery": { "name": "Test Testov", "phone": "+9720000000" },
            "payment": { "transaction": "b563feb7b2b84b6test", "amount": 1817 },
            "items": [ { "chrt_id": 9934930, "name": "Mascaras", "price": 453 } ],
            "locale": "en",
            "customer_id": "test",
            "sm_id": 99
        }"#;

        let doc: OrderDocument = serde_json::from_str(raw).unwrap();
        assert_eq!(doc.order_uid, "b563feb7b2b84b6test");
        assert_eq!(doc.items.len(), 1);
        assert_eq!(doc.payment.amount, 1817);
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn empty_order_uid_fails_validation() {
        let doc: OrderDocument = serde_json::from_str(r#"{ "order_uid": "" }"#).unwrap();
        assert!(doc.validate().is_err());
    }

    #[test]
    fn missing_order_uid_is_a_deserialize_error() {
        let err = serde_json::from_str::<OrderDocument>(r#"{ "locale": "en" }"#);
        assert!(err.is_err());
    }
}
