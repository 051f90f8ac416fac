//! Kafka Message Source
//!
//! rdkafka `StreamConsumer` adapter. Auto-commit is disabled: offsets are
//! committed one message at a time, only after the order is durably stored,
//! so a crash before commit leads to redelivery instead of loss.

use async_trait::async_trait;
use rdkafka::Message;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::topic_partition_list::{Offset, TopicPartitionList};
use rdkafka::types::RDKafkaErrorCode;

use super::{Delivery, MessageSource, Position, SourceError};

/// 按 librdkafka 错误码区分可重试与不可恢复的消费错误。
/// 鉴权失败、topic 不存在这类错误重试不会好转，归为 Fatal。
fn classify_receive_error(e: KafkaError) -> SourceError {
    match e.rdkafka_error_code() {
        Some(
            RDKafkaErrorCode::Fatal
            | RDKafkaErrorCode::UnknownTopic
            | RDKafkaErrorCode::UnknownPartition
            | RDKafkaErrorCode::UnknownTopicOrPartition
            | RDKafkaErrorCode::TopicAuthorizationFailed
            | RDKafkaErrorCode::GroupAuthorizationFailed
            | RDKafkaErrorCode::ClusterAuthorizationFailed
            | RDKafkaErrorCode::SaslAuthenticationFailed
            | RDKafkaErrorCode::Authentication,
        ) => SourceError::Fatal(e.to_string()),
        _ => SourceError::Transient(e.to_string()),
    }
}

/// Kafka-backed implementation of [`MessageSource`]
pub struct KafkaSource {
    consumer: StreamConsumer,
}

impl KafkaSource {
    /// Create a consumer and subscribe to `topic`
    pub fn new(brokers: &str, group_id: &str, topic: &str) -> Result<Self, SourceError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "6000")
            .create()
            .map_err(|e| SourceError::Fatal(e.to_string()))?;

        consumer
            .subscribe(&[topic])
            .map_err(|e| SourceError::Fatal(e.to_string()))?;

        tracing::info!(brokers, group_id, topic, "Kafka consumer subscribed");
        Ok(Self { consumer })
    }
}

#[async_trait]
impl MessageSource for KafkaSource {
    async fn receive(&mut self) -> Result<Delivery, SourceError> {
        // recv() 是 cancel-safe 的，取消由摄取循环的 select 负责
        let message = self.consumer.recv().await.map_err(classify_receive_error)?;

        Ok(Delivery {
            key: message
                .key()
                .map(|k| String::from_utf8_lossy(k).into_owned()),
            payload: message.payload().unwrap_or_default().to_vec(),
            position: Position {
                topic: message.topic().to_string(),
                partition: message.partition(),
                offset: message.offset(),
            },
        })
    }

    async fn commit(&mut self, delivery: &Delivery) -> Result<(), SourceError> {
        let mut offsets = TopicPartitionList::new();
        offsets
            .add_partition_offset(
                &delivery.position.topic,
                delivery.position.partition,
                // Kafka 提交的是下一条要读的 offset
                Offset::Offset(delivery.position.offset + 1),
            )
            .map_err(|e| SourceError::Transient(e.to_string()))?;

        self.consumer
            .commit(&offsets, CommitMode::Async)
            .map_err(|e| SourceError::Transient(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), SourceError> {
        self.consumer.unsubscribe();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecoverable_broker_errors_are_fatal() {
        for code in [
            RDKafkaErrorCode::UnknownTopicOrPartition,
            RDKafkaErrorCode::SaslAuthenticationFailed,
            RDKafkaErrorCode::GroupAuthorizationFailed,
        ] {
            let err = classify_receive_error(KafkaError::MessageConsumption(code));
            assert!(matches!(err, SourceError::Fatal(_)), "{code:?} 应为 Fatal");
        }
    }

    #[test]
    fn broker_hiccups_stay_transient() {
        for code in [
            RDKafkaErrorCode::BrokerTransportFailure,
            RDKafkaErrorCode::AllBrokersDown,
            RDKafkaErrorCode::RequestTimedOut,
        ] {
            let err = classify_receive_error(KafkaError::MessageConsumption(code));
            assert!(
                matches!(err, SourceError::Transient(_)),
                "{code:?} 应为 Transient"
            );
        }
    }
}
