//! The publish loop.
//!
//! A [`Generator`] reacts to two triggers. On every pacer tick it produces one
//! record, encodes it into a reused payload buffer, hands the slot back to the
//! pool and submits the payload. On every reporter tick it writes how many
//! records were dispatched since the previous report and asks the sink to
//! flush for a short, bounded time.
//!
//! Failures never stop the loop: a record that cannot be encoded or submitted
//! is logged and dropped.

use crate::throughput::ThroughputCounter;
use crate::trigger::{Tick, TriggerSource};
use flowgen_record::{JsonEncoder, RecordEncoder, RecordFactory, DEFAULT_POOL_CAPACITY};
use flowgen_sink::Sink;
use std::io::{Stdout, Write};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Default bound on the once-per-second flush.
pub const DEFAULT_FLUSH_TIMEOUT: Duration = Duration::from_millis(10);

/// What a run did, tick by tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pacer_ticks: u64,
    pub reports: u64,
    /// Records accepted by the sink
    pub dispatched: u64,
    /// Records dropped because they could not be encoded
    pub encode_failures: u64,
    /// Records dropped because the sink refused them
    pub submit_failures: u64,
}

/// Drives record production, dispatch and reporting.
pub struct Generator<S, E = JsonEncoder, W = Stdout> {
    factory: RecordFactory,
    encoder: E,
    sink: S,
    console: W,
    counter: ThroughputCounter,
    flush_timeout: Duration,
    payload: Vec<u8>,
    summary: RunSummary,
}

impl<S: Sink> Generator<S> {
    /// JSON encoding, reports on stdout.
    pub fn new(sink: S) -> Self {
        Self {
            factory: RecordFactory::new(DEFAULT_POOL_CAPACITY),
            encoder: JsonEncoder,
            sink,
            console: std::io::stdout(),
            counter: ThroughputCounter::new(),
            flush_timeout: DEFAULT_FLUSH_TIMEOUT,
            payload: Vec::new(),
            summary: RunSummary::default(),
        }
    }
}

impl<S, E, W> Generator<S, E, W>
where
    S: Sink,
    E: RecordEncoder,
    W: Write,
{
    pub fn with_encoder<E2: RecordEncoder>(self, encoder: E2) -> Generator<S, E2, W> {
        Generator {
            factory: self.factory,
            encoder,
            sink: self.sink,
            console: self.console,
            counter: self.counter,
            flush_timeout: self.flush_timeout,
            payload: self.payload,
            summary: self.summary,
        }
    }

    /// Write throughput reports to `console` instead of stdout.
    pub fn with_console<W2: Write>(self, console: W2) -> Generator<S, E, W2> {
        Generator {
            factory: self.factory,
            encoder: self.encoder,
            sink: self.sink,
            console,
            counter: self.counter,
            flush_timeout: self.flush_timeout,
            payload: self.payload,
            summary: self.summary,
        }
    }

    pub fn with_flush_timeout(mut self, flush_timeout: Duration) -> Self {
        self.flush_timeout = flush_timeout;
        self
    }

    /// Replace the record factory with one retaining `capacity` idle slots.
    ///
    /// Identities are process-wide, so the sequence carries on unchanged.
    pub fn with_pool_capacity(mut self, capacity: usize) -> Self {
        self.factory = RecordFactory::new(capacity);
        self
    }

    /// Handle ticks until the source is exhausted.
    ///
    /// Sources backed by real timers never run out; cancel the returned
    /// future to stop. Totals so far stay available through
    /// [`Generator::summary`] either way.
    pub async fn run<T>(&mut self, triggers: &mut T) -> RunSummary
    where
        T: TriggerSource + ?Sized,
    {
        while let Some(tick) = triggers.next().await {
            self.handle(tick);
        }
        self.summary
    }

    /// Handle a single tick.
    pub fn handle(&mut self, tick: Tick) {
        match tick {
            Tick::Pace => self.on_pace(),
            Tick::Report => self.on_report(),
        }
    }

    fn on_pace(&mut self) {
        self.summary.pacer_ticks += 1;

        let record = self.factory.produce();
        if let Err(e) = self.encoder.encode(&record, &mut self.payload) {
            self.summary.encode_failures += 1;
            error!(msg_id = %record.msg_id, "Error encoding record: {e}");
            return;
        }
        // The payload is an independent copy; the slot can go back now.
        record.release();

        match self.sink.submit(&self.payload) {
            Ok(()) => {
                self.summary.dispatched += 1;
                self.counter.increment();
                debug!(
                    sink = self.sink.name(),
                    bytes = self.payload.len(),
                    "Record dispatched"
                );
            }
            Err(e) => {
                self.summary.submit_failures += 1;
                error!(sink = self.sink.name(), "Failed to send record: {e}");
            }
        }
    }

    fn on_report(&mut self) {
        self.summary.reports += 1;

        let count = self.counter.take();
        if let Err(e) = writeln!(self.console, "Tasks generated this second: {count}") {
            warn!("Failed to write throughput report: {e}");
        }

        if !self.sink.flush(self.flush_timeout) {
            debug!(
                sink = self.sink.name(),
                "Flush did not complete within {:?}", self.flush_timeout
            );
        }
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Handle on the counter the reporter drains.
    pub fn counter(&self) -> &ThroughputCounter {
        &self.counter
    }

    pub fn factory(&self) -> &RecordFactory {
        &self.factory
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn console(&self) -> &W {
        &self.console
    }

    pub fn into_parts(self) -> (S, W) {
        (self.sink, self.console)
    }
}
