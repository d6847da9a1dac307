//! Tests for engine operations and message dispatch.

use super::*;
use crate::config::{DEFAULT_FLUSH_INTERVAL, MAX_NOTE_CHARS};
use crate::forms::{summary_field_keys, ScannedField, ScannedForm};
use crate::persistence::MemorySink;
use serde_json::json;
use strum::IntoEnumIterator;

fn enabled_engine() -> Engine {
    let mut engine = Engine::new(DEFAULT_FLUSH_INTERVAL);
    engine.set_enabled(true);
    engine
}

fn message(value: serde_json::Value) -> Message {
    serde_json::from_value(value).expect("message parses")
}

fn login_scan() -> ScanPayload {
    ScanPayload {
        url: "https://a.com/login".to_string(),
        title: "Sign in".to_string(),
        forms: vec![ScannedForm {
            action: "/session".to_string(),
            method: "post".to_string(),
            fields: vec![
                ScannedField {
                    name: "user".to_string(),
                    ..Default::default()
                },
                ScannedField {
                    name: "pass".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }],
        loose_fields: vec![],
    }
}

#[test]
fn test_disabled_engine_drops_observations() {
    let mut engine = Engine::new(DEFAULT_FLUSH_INTERVAL);
    assert!(!engine.is_enabled());
    assert!(!engine.upsert("https://a.com/x", "GET", Some(200), None));
    assert!(engine.merge_form_scan(&login_scan()).is_none());
    assert!(engine.store().is_empty());
    assert!(!engine.flush_pending());
    assert_eq!(engine.stats().get_count(DropReason::Disabled), 2);
}

#[test]
fn test_upsert_schedules_flush() {
    let mut engine = enabled_engine();
    let mut sink = MemorySink::new();
    engine.flush_now(&sink).expect("flush");
    assert!(!engine.flush_pending());

    assert!(engine.upsert("https://a.com/users/1", "get", Some(200), Some("xhr")));
    assert!(engine.upsert("https://a.com/users/2", "GET", Some(404), Some("xhr")));
    assert!(engine.flush_pending());

    let record = engine
        .store()
        .get("https://a.com", "GET /users/:id")
        .expect("record exists");
    assert_eq!(record.hits, 2);

    sink = MemorySink::new();
    engine.flush_now(&sink).expect("flush");
    assert!(!engine.flush_pending());
    assert_eq!(sink.writes(), 1);
    assert_eq!(sink.last(), Some(engine.persisted_state()));
}

#[test]
fn test_malformed_url_is_counted() {
    let mut engine = enabled_engine();
    engine.flush_now(&MemorySink::new()).expect("flush");
    assert!(!engine.upsert("not a url", "GET", None, None));
    assert!(!engine.upsert("/relative/only", "GET", None, None));
    assert!(engine.store().is_empty());
    assert!(!engine.flush_pending());
    assert_eq!(engine.stats().get_count(DropReason::MalformedUrl), 2);
}

#[test]
fn test_user_edits_apply_while_disabled() {
    let mut engine = enabled_engine();
    engine.upsert("https://a.com/", "GET", Some(200), None);
    engine.set_enabled(false);

    assert!(engine.set_tested("https://a.com", "GET /", true));
    assert!(engine.set_note("https://a.com", "GET /", "checked the index"));
    let record = engine.store().get("https://a.com", "GET /").expect("exists");
    assert!(record.tested);
    assert_eq!(record.note, "checked the index");
}

#[test]
fn test_edits_of_unknown_records_are_noops() {
    let mut engine = enabled_engine();
    engine.upsert("https://a.com/", "GET", None, None);
    let before = engine.snapshot();

    assert!(!engine.set_tested("https://a.com", "POST /", true));
    assert!(!engine.set_note("https://b.com", "GET /", "x"));
    assert!(!engine.set_field_test("https://a.com", "GET /nope", "loose|q", TestName::Xss, true));
    assert!(!engine.set_fields_checked("https://a.com", "GET /nope", true));

    assert_eq!(engine.snapshot(), before);
    assert_eq!(engine.stats().get_count(DropReason::UnknownRecord), 4);
}

#[test]
fn test_set_many_tested_counts_existing_records() {
    let mut engine = enabled_engine();
    engine.upsert("https://a.com/a", "GET", None, None);
    engine.upsert("https://a.com/b", "GET", None, None);
    let items = vec![
        RecordRef {
            origin: "https://a.com".into(),
            key: "GET /a".into(),
        },
        RecordRef {
            origin: "https://a.com".into(),
            key: "GET /b".into(),
        },
        RecordRef {
            origin: "https://a.com".into(),
            key: "GET /c".into(),
        },
    ];
    assert_eq!(engine.set_many_tested(&items, true), 2);
    assert!(engine.store().iter().all(|(_, r)| r.tested));
}

#[test]
fn test_set_note_truncates() {
    let mut engine = enabled_engine();
    engine.upsert("https://a.com/", "GET", None, None);
    let long = "é".repeat(MAX_NOTE_CHARS + 50);
    engine.set_note("https://a.com", "GET /", &long);
    let record = engine.store().get("https://a.com", "GET /").expect("exists");
    assert_eq!(record.note.chars().count(), MAX_NOTE_CHARS);
}

#[test]
fn test_fields_checked_requires_complete_matrix() {
    let mut engine = enabled_engine();
    let at = engine.merge_form_scan(&login_scan()).expect("valid page");
    assert_eq!(engine.field_state(&at.origin, &at.key), Some(FieldState::Incomplete));

    assert!(!engine.set_fields_checked(&at.origin, &at.key, true));
    assert_eq!(engine.stats().get_count(DropReason::RejectedFieldsChecked), 1);

    let summary = engine
        .store()
        .get(&at.origin, &at.key)
        .and_then(|r| r.form_summary.clone())
        .expect("summary stored");
    for key in summary_field_keys(&summary) {
        for test in TestName::iter() {
            assert!(engine.set_field_test(&at.origin, &at.key, &key, test, true));
        }
    }
    assert_eq!(engine.field_state(&at.origin, &at.key), Some(FieldState::Complete));
    assert!(engine.set_fields_checked(&at.origin, &at.key, true));
    assert_eq!(engine.field_state(&at.origin, &at.key), Some(FieldState::Checked));

    engine.set_field_test(&at.origin, &at.key, "form:0|user", TestName::Auth, false);
    assert_eq!(engine.field_state(&at.origin, &at.key), Some(FieldState::Incomplete));
    let record = engine.store().get(&at.origin, &at.key).expect("exists");
    assert!(!record.fields_checked);
}

#[test]
fn test_reset_keeps_enabled_flag() {
    let mut engine = enabled_engine();
    engine.upsert("https://a.com/", "GET", None, None);
    engine.reset();
    assert!(engine.store().is_empty());
    assert!(engine.is_enabled());
    assert!(engine.flush_pending());
}

#[test]
fn test_persisted_state_round_trip() {
    let mut engine = enabled_engine();
    engine.upsert("https://a.com/users/7", "DELETE", Some(204), None);
    engine.merge_form_scan(&login_scan());
    let state = engine.persisted_state();

    let restored = Engine::from_persisted(state.clone(), DEFAULT_FLUSH_INTERVAL);
    assert!(restored.is_enabled());
    assert_eq!(restored.persisted_state(), state);
    assert!(!restored.flush_pending());
}

#[test]
fn test_load_from_empty_sink_is_disabled() {
    let engine = Engine::load(&MemorySink::new(), DEFAULT_FLUSH_INTERVAL).expect("loads");
    assert!(!engine.is_enabled());
    assert!(engine.store().is_empty());
}

#[test]
fn test_handle_state_and_observe_messages() {
    let mut engine = Engine::new(DEFAULT_FLUSH_INTERVAL);
    assert_eq!(
        engine.handle(message(json!({"type": "getState"}))),
        Reply::State { enabled: false }
    );
    assert_eq!(
        engine.handle(message(json!({"type": "setEnabled", "enabled": true}))),
        Reply::ok()
    );
    engine.handle(message(json!({
        "type": "observe",
        "url": "https://a.com/api/items/99?sort=asc&utm_campaign=x",
        "method": "GET",
        "statusCode": 200,
        "resourceType": "xmlhttprequest"
    })));

    let Reply::Data { data } = engine.handle(message(json!({"type": "getData"}))) else {
        panic!("expected data reply");
    };
    let records = data.get("https://a.com").expect("origin present");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].key(), "GET /api/items/:id?sort=:param");
}

#[test]
fn test_handle_unknown_message() {
    let mut engine = enabled_engine();
    let reply = engine.handle(message(json!({"type": "launchMissiles"})));
    assert_eq!(reply, Reply::ok());
    assert_eq!(engine.stats().get_count(DropReason::UnknownMessage), 1);
    assert!(engine.store().is_empty());
}

#[test]
fn test_handle_import_replaces_store() {
    let mut engine = enabled_engine();
    engine.upsert("https://old.com/", "GET", None, None);

    let csv = "origin,method,path,query,hits\nhttps://new.com,POST,/api,,3\n";
    let reply = engine.handle(Message::ImportCsv {
        csv: csv.to_string(),
    });
    assert_eq!(reply, Reply::Imported { ok: true, imported: 1 });
    assert!(engine.store().get("https://old.com", "GET /").is_none());
    let record = engine
        .store()
        .get("https://new.com", "POST /api")
        .expect("imported");
    assert_eq!(record.hits, 3);
}

#[test]
fn test_handle_set_fields_checked_reports_rejection() {
    let mut engine = enabled_engine();
    let at = engine.merge_form_scan(&login_scan()).expect("valid page");
    let reply = engine.handle(message(json!({
        "type": "setFieldsChecked",
        "origin": at.origin,
        "recKey": at.key,
        "checked": true
    })));
    assert_eq!(reply, Reply::Ok { ok: false });
}

#[test]
fn test_handle_export_with_filter() {
    let mut engine = enabled_engine();
    engine.upsert("https://a.com/x", "GET", None, None);
    engine.upsert("https://a.com/y", "POST", None, None);
    let Reply::Csv { csv } = engine.handle(message(json!({
        "type": "exportCsv",
        "filter": {"method": "post"}
    }))) else {
        panic!("expected csv reply");
    };
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.contains("POST,/y"));
}

#[test]
fn test_handle_status_reads_counts_in_one_step() {
    let mut engine = enabled_engine();
    engine.upsert("https://a.com/x", "GET", Some(200), None);
    engine.upsert("https://a.com/y", "GET", Some(200), None);
    engine.upsert("https://b.com/", "GET", Some(200), None);
    engine.set_tested("https://a.com", "GET /y", true);

    assert_eq!(
        engine.handle(message(json!({"type": "getStatus"}))),
        Reply::Status {
            enabled: true,
            origins: 2,
            records: 3,
            tested_records: 1,
        }
    );
}

#[test]
fn test_load_restores_persisted_state() {
    let mut source = enabled_engine();
    source.upsert("https://a.com/items/5", "PUT", Some(204), None);
    source.set_note("https://a.com", "PUT /items/:id", "mass assignment?");
    let sink = MemorySink::with_state(source.persisted_state());

    let engine = Engine::load(&sink, DEFAULT_FLUSH_INTERVAL).expect("loads");
    assert!(engine.is_enabled());
    assert_eq!(engine.persisted_state(), source.persisted_state());
    assert!(!engine.flush_pending());
    assert_eq!(sink.writes(), 0);
}

#[test]
fn test_retry_flush_rearms_deadline() {
    let mut engine = enabled_engine();
    engine.flush_now(&MemorySink::new()).expect("flush");
    assert!(!engine.flush_pending());
    engine.retry_flush();
    assert!(engine.flush_pending());
}
