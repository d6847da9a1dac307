//! The inventory engine: the single writer over the endpoint store.
//!
//! [`Engine`] owns the enabled flag, the [`EndpointStore`] and the debounce
//! [`FlushScheduler`]. Every mutation runs to completion before the next one
//! starts; in a running service that is guaranteed by [`run_engine`], which
//! owns the engine inside one task and feeds it messages one at a time.
//!
//! Observations (network events, form scans) only apply while the engine is
//! enabled. User edits always apply.

mod messages;
mod runner;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::error_handling::{CsvError, DropReason, DropStats, PersistenceError};
use crate::export::{self, ExportFilter, ImportedEntry};
use crate::forms::{self, FieldState, ScanPayload};
use crate::models::{EndpointRecord, Snapshot, TestName};
use crate::persistence::{FlushScheduler, PersistedState, StateSink};
use crate::store::{EndpointStore, RecordRef};
use crate::utils::{now_millis, truncate_note};

pub use messages::{Message, RecordTarget, Reply};
pub use runner::{run_engine, EngineHandle};

/// Endpoint inventory engine.
#[derive(Debug)]
pub struct Engine {
    enabled: bool,
    store: EndpointStore,
    scheduler: FlushScheduler,
    stats: Arc<DropStats>,
}

impl Engine {
    /// Empty, disabled engine.
    pub fn new(flush_interval: Duration) -> Self {
        Self {
            enabled: false,
            store: EndpointStore::new(),
            scheduler: FlushScheduler::new(flush_interval),
            stats: Arc::new(DropStats::new()),
        }
    }

    /// Rebuilds an engine from persisted state.
    pub fn from_persisted(state: PersistedState, flush_interval: Duration) -> Self {
        let mut engine = Self::new(flush_interval);
        engine.enabled = state.enabled;
        engine.store = EndpointStore::from_data(state.data, now_millis());
        engine
    }

    /// Loads the engine from `sink`, or starts empty and disabled if nothing
    /// was persisted yet.
    pub fn load(sink: &dyn StateSink, flush_interval: Duration) -> Result<Self, PersistenceError> {
        Ok(match sink.load()? {
            Some(state) => {
                let engine = Self::from_persisted(state, flush_interval);
                log::info!(
                    "Loaded {} record(s) across {} origin(s), capture {}",
                    engine.store.record_count(),
                    engine.store.origin_count(),
                    if engine.enabled { "enabled" } else { "disabled" }
                );
                engine
            }
            None => {
                log::info!("No persisted state found, starting empty");
                Self::new(flush_interval)
            }
        })
    }

    pub fn stats(&self) -> &Arc<DropStats> {
        &self.stats
    }

    pub fn store(&self) -> &EndpointStore {
        &self.store
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            log::info!("Capture {}", if enabled { "enabled" } else { "disabled" });
        }
        self.enabled = enabled;
        self.scheduler.schedule_flush();
    }

    /// Records one network observation.
    ///
    /// Returns false without touching the store while disabled or when the
    /// URL is malformed.
    pub fn upsert(
        &mut self,
        url: &str,
        method: &str,
        status: Option<u16>,
        resource_type: Option<&str>,
    ) -> bool {
        if !self.enabled {
            self.stats.increment(DropReason::Disabled);
            return false;
        }
        match self
            .store
            .upsert(url, method, status, resource_type, now_millis())
        {
            Some(_) => {
                self.scheduler.schedule_flush();
                true
            }
            None => {
                log::debug!("Dropping observation with malformed URL: {:.120}", url);
                self.stats.increment(DropReason::MalformedUrl);
                false
            }
        }
    }

    /// Merges a page form scan into the page's record.
    pub fn merge_form_scan(&mut self, payload: &ScanPayload) -> Option<RecordRef> {
        if !self.enabled {
            self.stats.increment(DropReason::Disabled);
            return None;
        }
        let at = forms::merge_form_scan(&mut self.store, payload, now_millis());
        match at {
            Some(_) => self.scheduler.schedule_flush(),
            None => {
                log::debug!("Dropping form scan with malformed page URL: {:.120}", payload.url);
                self.stats.increment(DropReason::MalformedUrl);
            }
        }
        at
    }

    /// Empties the store. The enabled flag is kept.
    pub fn reset(&mut self) {
        log::info!("Resetting {} record(s)", self.store.record_count());
        self.store.clear();
        self.scheduler.schedule_flush();
    }

    pub fn set_tested(&mut self, origin: &str, key: &str, tested: bool) -> bool {
        self.edit(origin, key, |record| record.tested = tested)
    }

    /// Applies `tested` to every addressed record that exists; returns how
    /// many were updated.
    pub fn set_many_tested(&mut self, items: &[RecordRef], tested: bool) -> usize {
        let updated = items
            .iter()
            .filter(|at| self.edit(&at.origin, &at.key, |record| record.tested = tested))
            .count();
        log::debug!("Marked {}/{} record(s) tested={}", updated, items.len(), tested);
        updated
    }

    pub fn set_note(&mut self, origin: &str, key: &str, note: &str) -> bool {
        let note = truncate_note(note);
        self.edit(origin, key, move |record| record.note = note)
    }

    pub fn set_field_test(
        &mut self,
        origin: &str,
        key: &str,
        field_key: &str,
        test: TestName,
        value: bool,
    ) -> bool {
        self.edit(origin, key, |record| {
            forms::set_field_test(record, field_key, test, value)
        })
    }

    /// Sets or clears the "fields checked" confirmation.
    ///
    /// Returns whether the request was honored: checking a record whose field
    /// tests are not complete is rejected and counted.
    pub fn set_fields_checked(&mut self, origin: &str, key: &str, checked: bool) -> bool {
        let Some(record) = self.store.get_mut(origin, key) else {
            self.unknown_record(origin, key);
            return false;
        };
        let was_checked = record.fields_checked;
        if forms::set_fields_checked(record, checked) {
            self.scheduler.schedule_flush();
            true
        } else {
            log::debug!("Rejected fieldsChecked on incomplete record {} {}", origin, key);
            self.stats.increment(DropReason::RejectedFieldsChecked);
            if was_checked {
                // The latch was cleared.
                self.scheduler.schedule_flush();
            }
            false
        }
    }

    pub fn field_state(&self, origin: &str, key: &str) -> Option<FieldState> {
        self.store.get(origin, key).map(forms::field_state)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    pub fn export_csv(&self, filter: &ExportFilter) -> Result<String, CsvError> {
        export::export_csv(&self.store, filter)
    }

    /// Replaces the whole store with the records parsed from `text`.
    ///
    /// Returns the number of imported records. Malformed rows are dropped; a
    /// text with no usable rows empties the store.
    pub fn import_csv(&mut self, text: &str) -> Result<usize, CsvError> {
        let entries = export::import_csv(text, &self.stats, now_millis())?;
        Ok(self.replace_entries(entries))
    }

    /// Full replace with already-parsed entries.
    pub fn replace_entries(&mut self, entries: Vec<ImportedEntry>) -> usize {
        let parsed = entries.len();
        self.store
            .replace_all(entries.into_iter().map(|e| (e.origin, e.record)));
        self.scheduler.schedule_flush();
        log::info!(
            "Imported {} row(s) into {} record(s)",
            parsed,
            self.store.record_count()
        );
        self.store.record_count()
    }

    pub fn persisted_state(&self) -> PersistedState {
        PersistedState {
            enabled: self.enabled,
            data: self.store.to_data(),
        }
    }

    /// Pending debounce deadline, if a flush is scheduled.
    pub fn flush_deadline(&self) -> Option<Instant> {
        self.scheduler.deadline()
    }

    pub fn flush_pending(&self) -> bool {
        self.scheduler.is_pending()
    }

    /// Clears a due deadline and returns the state to write, if any.
    pub fn take_due_flush(&mut self) -> Option<PersistedState> {
        self.scheduler
            .take_due()
            .then(|| self.persisted_state())
    }

    /// Re-arms the debounce deadline after a due write failed.
    pub fn retry_flush(&mut self) {
        self.scheduler.schedule_flush();
    }

    /// Writes the whole state to `sink` immediately, cancelling any pending
    /// deadline.
    pub fn flush_now(&mut self, sink: &dyn StateSink) -> Result<(), PersistenceError> {
        self.scheduler.cancel();
        sink.persist(&self.persisted_state())
    }

    /// Applies one control-surface message.
    pub fn handle(&mut self, message: Message) -> Reply {
        log::trace!("Handling {}", message.kind());
        match message {
            Message::GetState => Reply::State {
                enabled: self.enabled,
            },
            Message::GetStatus => Reply::Status {
                enabled: self.enabled,
                origins: self.store.origin_count(),
                records: self.store.record_count(),
                tested_records: self.store.iter().filter(|(_, r)| r.tested).count(),
            },
            Message::SetEnabled { enabled } => {
                self.set_enabled(enabled);
                Reply::ok()
            }
            Message::GetData => Reply::Data {
                data: self.snapshot(),
            },
            Message::ResetData => {
                self.reset();
                Reply::ok()
            }
            Message::SetTested {
                origin,
                rec_key,
                tested,
            } => {
                self.set_tested(&origin, &rec_key, tested);
                Reply::ok()
            }
            Message::SetManyTested { items, tested } => {
                let items: Vec<RecordRef> = items.into_iter().map(RecordRef::from).collect();
                self.set_many_tested(&items, tested);
                Reply::ok()
            }
            Message::SetNote {
                origin,
                rec_key,
                note,
            } => {
                self.set_note(&origin, &rec_key, &note);
                Reply::ok()
            }
            Message::SetFieldTest {
                origin,
                rec_key,
                field_key,
                test,
                value,
            } => {
                self.set_field_test(&origin, &rec_key, &field_key, test, value);
                Reply::ok()
            }
            Message::SetFieldsChecked {
                origin,
                rec_key,
                checked,
            } => Reply::Ok {
                ok: self.set_fields_checked(&origin, &rec_key, checked),
            },
            Message::Observe {
                url,
                method,
                status_code,
                resource_type,
            } => {
                self.upsert(&url, &method, status_code, resource_type.as_deref());
                Reply::ok()
            }
            Message::ReportForms { payload } => {
                self.merge_form_scan(&payload);
                Reply::ok()
            }
            Message::ImportCsv { csv } => match self.import_csv(&csv) {
                Ok(imported) => Reply::Imported { ok: true, imported },
                Err(e) => {
                    log::warn!("CSV import failed: {}", e);
                    Reply::failed(e)
                }
            },
            Message::ExportCsv { filter } => match self.export_csv(&filter) {
                Ok(csv) => Reply::Csv { csv },
                Err(e) => {
                    log::warn!("CSV export failed: {}", e);
                    Reply::failed(e)
                }
            },
            Message::Unknown => {
                log::debug!("Ignoring message of unknown type");
                self.stats.increment(DropReason::UnknownMessage);
                Reply::ok()
            }
        }
    }

    /// Runs `apply` on an existing record and schedules a flush; counts and
    /// ignores unknown records.
    fn edit(&mut self, origin: &str, key: &str, apply: impl FnOnce(&mut EndpointRecord)) -> bool {
        match self.store.get_mut(origin, key) {
            Some(record) => {
                apply(record);
                self.scheduler.schedule_flush();
                true
            }
            None => {
                self.unknown_record(origin, key);
                false
            }
        }
    }

    fn unknown_record(&self, origin: &str, key: &str) {
        log::debug!("Ignoring edit of unknown record {} {}", origin, key);
        self.stats.increment(DropReason::UnknownRecord);
    }
}

#[cfg(test)]
mod tests;
