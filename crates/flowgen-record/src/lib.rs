//! Synthetic L7 flow-log records for flowgen.
//!
//! This crate owns everything about the record itself: its fixed 55-field
//! shape, the lock-free pool its storage is recycled through, the factory
//! that fills pooled slots with fresh synthetic values, and the encoder that
//! turns a record into a wire payload.
//!
//! # Architecture
//!
//! ```text
//! RecordFactory::produce()
//!        │  checkout
//!        ▼
//! ┌─────────────────┐      ┌──────────────────────┐
//! │   RecordPool    │◀─────│ PooledRecord (guard) │
//! │ ArrayQueue<Box> │ drop │ exclusive slot owner │
//! └─────────────────┘      └──────────┬───────────┘
//!                                     │ &FlowLogRecord
//!                                     ▼
//!                           RecordEncoder (JSON)
//!                                     │
//!                                     ▼
//!                               Vec<u8> payload
//! ```
//!
//! # Example
//!
//! ```rust
//! use flowgen_record::{JsonEncoder, RecordEncoder, RecordFactory};
//!
//! let factory = RecordFactory::new(16);
//! let mut payload = Vec::new();
//!
//! let record = factory.produce();
//! JsonEncoder.encode(&record, &mut payload).unwrap();
//! record.release();
//!
//! assert!(payload.starts_with(b"{\"msg_id\":\""));
//! ```

pub mod encoder;
pub mod factory;
pub mod pool;
pub mod random;
pub mod record;

// Re-exports for convenience
pub use encoder::{EncodeError, JsonEncoder, RecordEncoder};
pub use factory::{fill_record, message_ids, MessageIdGenerator, RecordFactory};
pub use pool::{
    PoolMetrics, PoolMetricsSnapshot, PooledRecord, RecordPool, DEFAULT_POOL_CAPACITY,
};
pub use record::{FlowLogRecord, FIELD_COUNT, FIELD_NAMES, NUMERIC_FIELD};
