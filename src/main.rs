//! Command-line entry point for flowgen
//!
//! # Usage Examples
//!
//! ```bash
//! # Print mode: JSON records and "Tasks generated this second: N" on stdout
//! flowgen
//!
//! # Publish to Kafka
//! SEND_TO_KAFKA=true KAFKA_BROKER=localhost:9092 KAFKA_TOPIC=l7_flow_log flowgen
//!
//! # Tune rate and producer buffering
//! flowgen --send-to-kafka --kafka-topic l7_flow_log --rate 2000 \
//!   --queue-buffering-max-messages 10000 --flush-timeout 50ms
//! ```

use anyhow::Context;
use clap::Parser;
use flowgen::{Config, Generator, IntervalTriggers, REPORT_INTERVAL};
use flowgen_sink::{spawn_delivery_drain, DeliveryStats, KafkaSink, PrintSink, Sink};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for records and reports
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    config.validate()?;

    let mut delivery = None;
    let sink: Arc<dyn Sink> = if config.send_to_kafka {
        let sink_config = config.kafka.sink_config()?;
        let (sink, reports) =
            KafkaSink::new(&sink_config).context("Failed to create Kafka producer")?;
        let stats = Arc::new(DeliveryStats::new());
        let drain = spawn_delivery_drain(reports, Arc::clone(&stats));
        delivery = Some((stats, drain));
        Arc::new(sink)
    } else {
        info!("SEND_TO_KAFKA is not set; printing records to stdout");
        Arc::new(PrintSink::stdout())
    };

    info!(
        "Starting generator: sink={}, rate={}/s, flush_timeout={:?}, pool_capacity={}",
        sink.name(),
        config.rate,
        config.flush_timeout,
        config.pool_capacity
    );

    let mut generator = Generator::new(Arc::clone(&sink))
        .with_pool_capacity(config.pool_capacity)
        .with_flush_timeout(config.flush_timeout);
    let mut triggers = IntervalTriggers::new(config.pace_interval(), REPORT_INTERVAL);

    tokio::select! {
        _ = generator.run(&mut triggers) => {}
        _ = shutdown_signal() => info!("Received shutdown signal, stopping generator"),
    }

    let summary = generator.summary();
    let pool = generator.factory().pool().metrics().snapshot();
    info!(
        "Generator stopped: pacer_ticks={}, dispatched={}, encode_failures={}, submit_failures={}",
        summary.pacer_ticks, summary.dispatched, summary.encode_failures, summary.submit_failures
    );
    info!(
        "Record pool: hits={}, misses={}, returns={}, drops={}, hit_rate={:.3}",
        pool.hits,
        pool.misses,
        pool.returns,
        pool.drops,
        pool.hit_rate()
    );

    sink.shutdown(config.shutdown_timeout);

    // Dropping the last sink handle closes the delivery channel.
    drop(generator);
    drop(sink);

    if let Some((stats, drain)) = delivery {
        drain.await.context("Delivery report task failed")?;
        let stats = stats.snapshot();
        info!(
            "Delivery reports: delivered={}, failed={}",
            stats.delivered, stats.failed
        );
    }

    Ok(())
}

/// Resolve on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
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
