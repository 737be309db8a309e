//! Fraud Scoring Service - Main Entry Point
//!
//! Consumes scoring requests from NATS, scores them with the trained
//! model, replies to requesters, and hands scored records to the storage
//! collaborator. Supports parallel request processing.

use anyhow::Result;
use fraud_scoring_service::{
    config::AppConfig,
    consumer::ScoreRequestConsumer,
    metrics::{MetricsReporter, ScoringMetrics},
    service::ScoringService,
    storage::{NatsTransactionStore, TransactionStore},
};
use futures::StreamExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fraud_scoring_service=info".parse()?),
        )
        .init();

    info!("Starting Fraud Scoring Service");

    // Load configuration
    let config = AppConfig::load()?;
    info!("Configuration loaded successfully");
    info!(
        "Risk tiers: high>{:.2}, medium>{:.2}; model: {} trees, depth {}",
        config.detection.risk_levels.high,
        config.detection.risk_levels.medium,
        config.model.trees,
        config.model.max_depth
    );

    // Initialize metrics
    let metrics = Arc::new(ScoringMetrics::new());

    // Connect to NATS
    let client = async_nats::connect(&config.nats.url).await?;
    info!("Connected to NATS at {}", config.nats.url);

    // Storage collaborator and scoring service
    let storage: Arc<dyn TransactionStore> = Arc::new(NatsTransactionStore::new(
        client.clone(),
        &config.nats.record_subject,
        &config.nats.stats_subject,
    ));
    let service = Arc::new(ScoringService::new(&config, storage));

    // One-time blocking phase: load the persisted model or train a fresh
    // one. No request is served before this completes.
    service.initialize()?;
    info!(state = service.state_name(), "Scoring service initialized");

    // Initialize consumer
    let consumer = ScoreRequestConsumer::new(client.clone(), &config.nats.request_subject);

    // Parallel processing configuration
    let num_workers = config.pipeline.workers;
    info!(
        "Starting request processing loop with {} parallel workers",
        num_workers
    );
    info!("Listening on subject: {}", config.nats.request_subject);
    info!("Publishing records to: {}", config.nats.record_subject);

    // Semaphore to limit concurrent processing
    let semaphore = Arc::new(Semaphore::new(num_workers));
    let processed_count = Arc::new(AtomicU64::new(0));

    // Start metrics reporter (prints summary every 30 seconds)
    let metrics_clone = metrics.clone();
    tokio::spawn(async move {
        let reporter = MetricsReporter::new(metrics_clone, 30);
        reporter.start().await;
    });

    // Periodically log aggregate stats from the storage collaborator
    let stats_service = service.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            match stats_service.aggregate_stats().await {
                Ok(stats) => info!(
                    total = stats.total,
                    fraud = stats.fraud_count,
                    legitimate = stats.legitimate_count,
                    fraud_rate = format!("{:.1}%", stats.fraud_rate()),
                    "Aggregate transaction stats"
                ),
                Err(e) => debug!(error = %e, "Aggregate stats unavailable"),
            }
        }
    });

    // Process scoring requests in parallel
    let mut subscription = consumer.subscribe().await?;

    while let Some(message) = subscription.next().await {
        // Acquire permit (limits concurrent tasks)
        let permit = semaphore.clone().acquire_owned().await.unwrap();

        // Clone shared resources for the spawned task
        let service = service.clone();
        let client = client.clone();
        let metrics = metrics.clone();
        let processed_count = processed_count.clone();

        // Spawn task to process this request
        tokio::spawn(async move {
            let start_time = Instant::now();

            match serde_json::from_slice::<serde_json::Value>(&message.payload) {
                Ok(payload) => match service.score(&payload).await {
                    Ok(outcome) => {
                        let processing_time = start_time.elapsed();

                        metrics.record_score(
                            processing_time,
                            outcome.response.probability,
                            outcome.response.prediction.is_fraud(),
                            &format!("{:?}", outcome.response.risk_level),
                        );

                        if !outcome.persisted {
                            warn!(
                                transaction_id = %outcome.record.transaction_id,
                                "Scored transaction was not persisted"
                            );
                        }

                        // Reply to the requester when a reply subject is set
                        if let Some(reply) = message.reply {
                            match serde_json::to_vec(&outcome.response) {
                                Ok(body) => {
                                    if let Err(e) = client.publish(reply, body.into()).await {
                                        error!(error = %e, "Failed to send scoring reply");
                                    }
                                }
                                Err(e) => {
                                    error!(error = %e, "Failed to serialize scoring response")
                                }
                            }
                        }

                        debug!(
                            transaction_id = %outcome.record.transaction_id,
                            prediction = ?outcome.response.prediction,
                            risk_level = ?outcome.response.risk_level,
                            processing_time_us = processing_time.as_micros(),
                            "Request scored"
                        );

                        let count = processed_count.fetch_add(1, Ordering::Relaxed) + 1;

                        // Log progress every 100 requests
                        if count % 100 == 0 {
                            let throughput = metrics.get_throughput();
                            let processing_stats = metrics.get_processing_stats();
                            info!(
                                processed = count,
                                throughput = format!("{:.1} req/s", throughput),
                                avg_latency_us = processing_stats.mean_us,
                                "Processing milestone"
                            );
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "Scoring failed");
                    }
                },
                Err(e) => {
                    warn!(error = %e, "Failed to deserialize scoring request");
                }
            }

            // Release permit when done
            drop(permit);
        });
    }

    // Print final summary
    info!("Scoring service shutting down...");
    metrics.print_summary();

    Ok(())
}
