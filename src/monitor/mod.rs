//! Polling loop driving fetch -> ingest -> alert cycles
//!
//! One logical thread of control: cycles run sequentially with no overlap,
//! and the next fetch does not begin until the previous cycle's persistence
//! has completed. Transport failures skip the cycle; persistence failures
//! abort the loop because the durability guarantee cannot be honored
//! silently.

use crate::error::Result;
use crate::event::EventRecord;
use crate::ingest::Ingestor;
use crate::transport::DeviceClient;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Side-effecting sink for newly accepted critical events
///
/// Display is best-effort: implementations must not fail the cycle.
pub trait AlertSink {
    fn critical(&self, record: &EventRecord);
}

/// Console sink printing one alert block per critical event
pub struct ConsoleAlertSink;

impl AlertSink for ConsoleAlertSink {
    fn critical(&self, record: &EventRecord) {
        println!("CRITICAL EVENT");
        println!("  Time: {}", record.time.format("%Y-%m-%d %H:%M:%S UTC"));
        println!("  Message: {}", record.message);
        println!("{}", "-".repeat(72));
    }
}

/// The polling loop
pub struct Monitor<S: AlertSink> {
    client: DeviceClient,
    ingestor: Ingestor,
    interval: Duration,
    sink: S,
}

impl<S: AlertSink> Monitor<S> {
    pub fn new(client: DeviceClient, ingestor: Ingestor, interval: Duration, sink: S) -> Self {
        Self {
            client,
            ingestor,
            interval,
            sink,
        }
    }

    /// Run fetch -> ingest -> alert cycles until Ctrl-C
    ///
    /// The first cycle runs immediately; subsequent cycles follow the
    /// configured interval. On termination mid-cycle, already-flushed
    /// records are durable and the unflushed remainder is simply lost.
    pub async fn run(mut self) -> Result<()> {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!(
                        "Shutting down; {} distinct events on record",
                        self.ingestor.seen_count()
                    );
                    return Ok(());
                }
                _ = ticker.tick() => {
                    self.cycle().await?;
                }
            }
        }
    }

    /// One fetch -> ingest -> alert pass
    ///
    /// Transport errors are reported and the cycle skipped; the next tick
    /// retries independently. Persistence errors propagate.
    async fn cycle(&mut self) -> Result<()> {
        let batch = match self.client.fetch_raw_batch().await {
            Ok(batch) => batch,
            Err(e) => {
                tracing::warn!("Skipping cycle: {}", e);
                return Ok(());
            }
        };

        let outcome = self.ingestor.ingest(&batch)?;
        for record in &outcome.critical {
            self.sink.critical(record);
        }

        Ok(())
    }
}
