//! External storage collaborator.
//!
//! The core does not own database access; it emits scored transaction
//! records through this seam and reads aggregate stats back as a pure
//! pass-through. Calls are independent per request, so implementations
//! need no shared mutable state between concurrent scoring calls.

use crate::error::StorageError;
use crate::types::response::AggregateStats;
use crate::types::transaction::ScoredTransaction;
use async_nats::Client;
use async_trait::async_trait;
use std::sync::RwLock;
use tracing::debug;

/// The two operations the core consumes from its storage collaborator.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Hand a scored transaction record over for storage.
    async fn persist_transaction(&self, record: &ScoredTransaction) -> Result<(), StorageError>;

    /// Read aggregate counters over all stored transactions.
    async fn read_aggregate_stats(&self) -> Result<AggregateStats, StorageError>;
}

/// NATS-backed store: records are published for a downstream writer,
/// stats come back over request/reply.
pub struct NatsTransactionStore {
    client: Client,
    record_subject: String,
    stats_subject: String,
}

impl NatsTransactionStore {
    pub fn new(client: Client, record_subject: &str, stats_subject: &str) -> Self {
        Self {
            client,
            record_subject: record_subject.to_string(),
            stats_subject: stats_subject.to_string(),
        }
    }

    pub fn record_subject(&self) -> &str {
        &self.record_subject
    }
}

#[async_trait]
impl TransactionStore for NatsTransactionStore {
    async fn persist_transaction(&self, record: &ScoredTransaction) -> Result<(), StorageError> {
        let payload =
            serde_json::to_vec(record).map_err(|e| StorageError::Persist(e.to_string()))?;

        self.client
            .publish(self.record_subject.clone(), payload.into())
            .await
            .map_err(|e| StorageError::Persist(e.to_string()))?;

        debug!(
            transaction_id = %record.transaction_id,
            risk_level = ?record.risk_level,
            "Published scored transaction record"
        );
        Ok(())
    }

    async fn read_aggregate_stats(&self) -> Result<AggregateStats, StorageError> {
        let reply = self
            .client
            .request(self.stats_subject.clone(), "".into())
            .await
            .map_err(|e| StorageError::Stats(e.to_string()))?;

        serde_json::from_slice(&reply.payload).map_err(|e| StorageError::Stats(e.to_string()))
    }
}

/// In-memory store for tests and local runs without a broker.
#[derive(Default)]
pub struct InMemoryTransactionStore {
    records: RwLock<Vec<ScoredTransaction>>,
}

impl InMemoryTransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ScoredTransaction> {
        self.records.read().unwrap().clone()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn persist_transaction(&self, record: &ScoredTransaction) -> Result<(), StorageError> {
        self.records.write().unwrap().push(record.clone());
        Ok(())
    }

    async fn read_aggregate_stats(&self) -> Result<AggregateStats, StorageError> {
        let records = self.records.read().unwrap();
        let fraud_count = records.iter().filter(|r| r.prediction.is_fraud()).count() as u64;
        let total = records.len() as u64;

        Ok(AggregateStats {
            total,
            fraud_count,
            legitimate_count: total - fraud_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureVector;
    use crate::types::response::{Prediction, RiskLevel};
    use serde_json::json;

    fn record(prediction: Prediction) -> ScoredTransaction {
        ScoredTransaction::from_request(
            &json!({}),
            FeatureVector {
                amount: 10.0,
                merchant_category: 1.0,
                hour: 9.0,
                day_of_week: 2.0,
                is_weekend: 0.0,
                transaction_count_1h: 1.0,
                avg_amount_1h: 10.0,
            },
            prediction,
            0.9,
            RiskLevel::High,
        )
    }

    #[tokio::test]
    async fn test_in_memory_persist_and_stats() {
        let store = InMemoryTransactionStore::new();

        store
            .persist_transaction(&record(Prediction::Fraudulent))
            .await
            .unwrap();
        store
            .persist_transaction(&record(Prediction::Legitimate))
            .await
            .unwrap();
        store
            .persist_transaction(&record(Prediction::Legitimate))
            .await
            .unwrap();

        let stats = store.read_aggregate_stats().await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.fraud_count, 1);
        assert_eq!(stats.legitimate_count, 2);
    }

    #[tokio::test]
    async fn test_empty_store_stats() {
        let store = InMemoryTransactionStore::new();
        let stats = store.read_aggregate_stats().await.unwrap();

        assert_eq!(stats.total, 0);
        assert_eq!(stats.fraud_rate(), 0.0);
    }
}
