//! Status server data structures.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::engine::EngineHandle;

/// Shared state for the status server
#[derive(Clone)]
pub struct ServerState {
    pub engine: EngineHandle,
    pub start_time: Arc<Instant>,
}

impl ServerState {
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            engine,
            start_time: Arc::new(Instant::now()),
        }
    }
}

/// JSON response for `/status` endpoint
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub enabled: bool,
    pub origins: usize,
    pub records: usize,
    pub tested_records: usize,
    pub uptime_seconds: f64,
    pub dropped: DropCounts,
}

#[derive(Debug, Serialize)]
pub struct DropCounts {
    pub total: usize,
    #[serde(flatten)]
    pub by_reason: BTreeMap<&'static str, usize>,
}
