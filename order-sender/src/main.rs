//! Order Sender - 测试订单生成器
//!
//! 生成随机订单文档并发到 Kafka，用于本地联调和压测。
//!
//! # 环境变量
//!
//! | 环境变量 | 默认值 | 说明 |
//! |----------|--------|------|
//! | KAFKA_BROKERS | localhost:9092 | Kafka broker 列表 |
//! | KAFKA_TOPIC | orders | 目标 topic |
//! | ORDER_COUNT | 10 | 生成订单数量 |

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use rand::Rng;
use rand::distributions::Alphanumeric;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;

use shared::{Delivery, Item, OrderDocument, Payment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt().with_target(false).init();

    let brokers = std::env::var("KAFKA_BROKERS").unwrap_or_else(|_| "localhost:9092".into());
    let topic = std::env::var("KAFKA_TOPIC").unwrap_or_else(|_| "orders".into());
    let count: usize = std::env::var("ORDER_COUNT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    let producer: FutureProducer = ClientConfig::new()
        .set("bootstrap.servers", &brokers)
        .set("message.timeout.ms", "5000")
        .create()
        .context("failed to create Kafka producer")?;

    tracing::info!(%brokers, %topic, count, "Sending test orders");

    for _ in 0..count {
        let order = generate_order();
        let payload = serde_json::to_vec(&order)?;

        producer
            .send(
                FutureRecord::to(&topic)
                    .key(&order.order_uid)
                    .payload(&payload),
                Timeout::After(Duration::from_secs(5)),
            )
            .await
            .map_err(|(e, _)| anyhow::anyhow!("failed to send order: {e}"))?;

        tracing::info!(order_uid = %order.order_uid, "Order sent");
    }

    tracing::info!("Done");
    Ok(())
}

fn generate_order() -> OrderDocument {
    let mut rng = rand::thread_rng();
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;

    OrderDocument {
        order_uid: format!("{}test", random_string(10)),
        track_number: "WBILMTESTTRACK".into(),
        entry: "WBIL".into(),
        delivery: Delivery {
            name: format!("Test User {}", random_string(4)),
            phone: "+1234567890".into(),
            zip: "00000".into(),
            city: "Sample City".into(),
            address: format!("Sample Address {}", random_string(4)),
            region: "Sample Region".into(),
            email: format!("test{}@example.com", random_string(5)),
        },
        payment: Payment {
            transaction: random_string(15),
            request_id: String::new(),
            currency: "USD".into(),
            provider: "wbpay".into(),
            amount: rng.gen_range(100..1100),
            payment_dt: now,
            bank: "TestBank".into(),
            delivery_cost: rng.gen_range(50..250),
            goods_total: rng.gen_range(50..550),
            custom_fee: 0,
        },
        items: vec![Item {
            chrt_id: rng.gen_range(0..100_000),
            track_number: format!("TRACK{}", random_string(3)),
            price: rng.gen_range(0..100),
            rid: random_string(10),
            name: "Test Item".into(),
            sale: 10,
            size: "L".into(),
            total_price: rng.gen_range(0..100),
            nm_id: rng.gen_range(0..10_000),
            brand: "TestBrand".into(),
            status: 202,
        }],
        locale: "en".into(),
        internal_signature: String::new(),
        customer_id: format!("customer {}", random_string(5)),
        delivery_service: "meest".into(),
        shardkey: "123".into(),
        sm_id: 91,
        date_created: format!("{now}"),
        oof_shard: "A1234".into(),
    }
}

fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
