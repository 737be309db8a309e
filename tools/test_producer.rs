//! Test Scoring Request Producer
//!
//! Generates and publishes test scoring requests to NATS for pipeline
//! testing.

use rand::Rng;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};

/// Scoring request generator for testing
struct RequestGenerator {
    rng: rand::rngs::ThreadRng,
    request_counter: u64,
}

impl RequestGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            request_counter: 0,
        }
    }

    /// Generate a random legitimate scoring request
    fn generate_legitimate(&mut self) -> Value {
        self.request_counter += 1;
        let amount = self.rng.gen_range(5.0..400.0);

        json!({
            "amount": amount,
            "merchant_category": self.rng.gen_range(1..20),
            "hour": self.rng.gen_range(8..22),
            "day_of_week": self.rng.gen_range(1..8),
            "is_weekend": if self.rng.gen_bool(0.3) { 1 } else { 0 },
            "transaction_count_1h": self.rng.gen_range(0..3),
            "avg_amount_1h": amount * self.rng.gen_range(0.5..1.5),
            "card_number": format!("4{:015}", self.rng.gen_range(0u64..1_000_000_000)),
            "merchant": self.random_choice(&["Grocery Mart", "Coffee Corner", "Gas & Go", "Book Nook"]),
            "location": self.random_choice(&["Austin", "Berlin", "Toronto", "Lyon"]),
        })
    }

    /// Generate a suspicious scoring request
    fn generate_suspicious(&mut self) -> Value {
        self.request_counter += 1;

        json!({
            "amount": self.rng.gen_range(1200.0..9000.0), // High amount
            "merchant_category": self.rng.gen_range(15..20),
            "hour": self.rng.gen_range(2..5), // Night time
            "day_of_week": self.rng.gen_range(1..8),
            "is_weekend": if self.rng.gen_bool(0.5) { 1 } else { 0 },
            "transaction_count_1h": self.rng.gen_range(6..15), // Burst of transactions
            "avg_amount_1h": self.rng.gen_range(800.0..5000.0),
            "card_number": format!("5{:015}", self.rng.gen_range(0u64..1_000_000_000)),
            "merchant": self.random_choice(&["Wire Express", "Digital Goods Ltd", "Unknown Vendor"]),
            "location": self.random_choice(&["Online", "Unknown"]),
        })
    }

    fn random_choice<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("test_producer=info".parse()?),
        )
        .init();

    info!("Starting Test Scoring Request Producer");

    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let nats_url = args.get(1).map(|s| s.as_str()).unwrap_or("nats://localhost:4222");
    let subject = args
        .get(2)
        .map(|s| s.as_str())
        .unwrap_or("fraud.score.requests");
    let count: u64 = args.get(3).and_then(|s| s.parse().ok()).unwrap_or(100);
    let fraud_rate: f64 = args.get(4).and_then(|s| s.parse().ok()).unwrap_or(0.1);
    let delay_ms: u64 = args.get(5).and_then(|s| s.parse().ok()).unwrap_or(100);

    info!(
        nats_url = %nats_url,
        subject = %subject,
        count = count,
        fraud_rate = fraud_rate,
        delay_ms = delay_ms,
        "Configuration loaded"
    );

    // Connect to NATS
    let client = match async_nats::connect(nats_url).await {
        Ok(c) => {
            info!("Connected to NATS");
            c
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to NATS. Running in dry-run mode.");
            // Continue in dry-run mode
            return run_dry_mode(count, fraud_rate, delay_ms).await;
        }
    };

    // Generate and publish requests
    let mut generator = RequestGenerator::new();
    let mut rng = rand::thread_rng();

    info!("Starting to publish {} scoring requests...", count);

    let mut legitimate_count = 0;
    let mut suspicious_count = 0;

    for i in 0..count {
        let request = if rng.gen_bool(fraud_rate) {
            suspicious_count += 1;
            generator.generate_suspicious()
        } else {
            legitimate_count += 1;
            generator.generate_legitimate()
        };

        let payload = serde_json::to_vec(&request)?;

        client.publish(subject.to_string(), payload.into()).await?;

        if (i + 1) % 10 == 0 {
            info!(
                "Published {}/{} requests ({} legitimate, {} suspicious)",
                i + 1,
                count,
                legitimate_count,
                suspicious_count
            );
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    info!(
        "Completed! Published {} requests ({} legitimate, {} suspicious)",
        count, legitimate_count, suspicious_count
    );

    Ok(())
}

async fn run_dry_mode(count: u64, fraud_rate: f64, delay_ms: u64) -> anyhow::Result<()> {
    info!("Running in dry-run mode (no NATS connection)");

    let mut generator = RequestGenerator::new();
    let mut rng = rand::thread_rng();

    for i in 0..count {
        let request = if rng.gen_bool(fraud_rate) {
            generator.generate_suspicious()
        } else {
            generator.generate_legitimate()
        };

        let json = serde_json::to_string_pretty(&request)?;

        if (i + 1) % 10 == 0 || i == 0 {
            info!("Sample request {}:\n{}", i + 1, json);
        }

        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    Ok(())
}
