//! Storage sinks for the persisted engine state.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tokio::sync::watch;

use super::PersistedState;
use crate::error_handling::PersistenceError;

/// Durable storage for the engine state.
///
/// `persist` always receives the entire state, never a delta.
pub trait StateSink: Send + Sync {
    /// Reads the last persisted state, or `None` if nothing was persisted yet.
    fn load(&self) -> Result<Option<PersistedState>, PersistenceError>;

    /// Replaces the persisted state.
    fn persist(&self, state: &PersistedState) -> Result<(), PersistenceError>;
}

/// Stores the state as a JSON file.
///
/// Writes go to a temporary file in the same directory which is then renamed
/// over the target, so readers never see a half-written file.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateSink for JsonFileSink {
    fn load(&self) -> Result<Option<PersistedState>, PersistenceError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(&self.path)?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn persist(&self, state: &PersistedState) -> Result<(), PersistenceError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let tmp = NamedTempFile::new_in(&dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file());
            serde_json::to_writer(&mut writer, state)?;
            writer.flush()?;
        }
        tmp.persist(&self.path)?;
        log::debug!(
            "Persisted {} origin(s) to {}",
            state.data.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Keeps the last persisted state in memory and counts writes.
#[derive(Debug)]
pub struct MemorySink {
    state: Mutex<Option<PersistedState>>,
    writes: watch::Sender<usize>,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(None),
            writes: watch::Sender::new(0),
        }
    }

    /// Starts with an already-persisted state.
    pub fn with_state(state: PersistedState) -> Self {
        let sink = Self::new();
        *sink.lock() = Some(state);
        sink
    }

    /// Number of `persist` calls so far.
    pub fn writes(&self) -> usize {
        *self.writes.borrow()
    }

    /// Resolves once at least `count` writes have happened.
    pub async fn wait_for_writes(&self, count: usize) {
        let mut rx = self.writes.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|writes| *writes >= count).await;
    }

    /// The last persisted state.
    pub fn last(&self) -> Option<PersistedState> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<PersistedState>> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl StateSink for MemorySink {
    fn load(&self) -> Result<Option<PersistedState>, PersistenceError> {
        Ok(self.last())
    }

    fn persist(&self, state: &PersistedState) -> Result<(), PersistenceError> {
        *self.lock() = Some(state.clone());
        self.writes.send_modify(|writes| *writes += 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EndpointStore;
    use tempfile::TempDir;

    fn sample_state() -> PersistedState {
        let mut store = EndpointStore::new();
        store.upsert("https://a.com/users/42", "GET", Some(200), Some("document"), 10);
        PersistedState {
            enabled: true,
            data: store.to_data(),
        }
    }

    #[test]
    fn test_json_file_sink_missing_file_loads_none() {
        let dir = TempDir::new().expect("temp dir");
        let sink = JsonFileSink::new(dir.path().join("state.json"));
        assert!(sink.load().expect("load succeeds").is_none());
    }

    #[test]
    fn test_json_file_sink_round_trip() {
        let dir = TempDir::new().expect("temp dir");
        let sink = JsonFileSink::new(dir.path().join("nested").join("state.json"));
        let state = sample_state();
        sink.persist(&state).expect("persist succeeds");
        assert_eq!(sink.load().expect("load succeeds"), Some(state));
    }

    #[test]
    fn test_json_file_sink_overwrites_previous_state() {
        let dir = TempDir::new().expect("temp dir");
        let sink = JsonFileSink::new(dir.path().join("state.json"));
        sink.persist(&sample_state()).expect("first persist");
        sink.persist(&PersistedState::default()).expect("second persist");
        assert_eq!(
            sink.load().expect("load succeeds"),
            Some(PersistedState::default())
        );
    }

    #[test]
    fn test_json_file_sink_corrupt_file_is_an_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("state.json");
        fs::write(&path, "{ definitely not json").expect("write");
        let sink = JsonFileSink::new(&path);
        assert!(matches!(sink.load(), Err(PersistenceError::Json(_))));
    }

    #[test]
    fn test_persisted_shape_uses_arrays_and_objects() {
        let json = serde_json::to_value(sample_state()).expect("serializes");
        let record = &json["data"]["https://a.com"]["GET /users/:id"];
        assert_eq!(json["enabled"], true);
        assert_eq!(record["types"], serde_json::json!(["document"]));
        assert_eq!(record["statusCounts"]["200"], 1);
    }

    #[test]
    fn test_memory_sink_counts_writes() {
        let sink = MemorySink::new();
        assert!(sink.load().expect("load").is_none());
        sink.persist(&sample_state()).expect("persist");
        sink.persist(&sample_state()).expect("persist");
        assert_eq!(sink.writes(), 2);
        assert_eq!(sink.last(), Some(sample_state()));
    }
}
