//! Durable state and the debounced flush scheduler.
//!
//! The engine never writes on every mutation. Each mutation restarts a single
//! quiescence deadline held by [`FlushScheduler`]; only when the deadline
//! passes uninterrupted is the whole store serialized and handed to a
//! [`StateSink`]. A process that stops before the deadline loses the last
//! burst; everything flushed earlier is kept.

mod scheduler;
mod sink;

use serde::{Deserialize, Serialize};

use crate::store::StoreData;

pub use scheduler::{sleep_until_deadline, FlushScheduler};
pub use sink::{JsonFileSink, MemorySink, StateSink};

/// Shape written to durable storage: `{ enabled, data }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub enabled: bool,
    /// origin -> record key -> record
    pub data: StoreData,
}
