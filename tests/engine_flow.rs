//! Tests for the engine event loop, debounced persistence and message flow.

use std::sync::Arc;
use std::time::Duration;

use endpoint_inventory::{run_engine, Engine, MemorySink, Message, Reply, TestName};
use serde_json::json;
use tokio_util::sync::CancellationToken;

const WINDOW: Duration = Duration::from_millis(300);

fn message(value: serde_json::Value) -> Message {
    serde_json::from_value(value).expect("message parses")
}

fn observe(url: &str) -> Message {
    message(json!({"type": "observe", "url": url, "method": "GET", "statusCode": 200}))
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_mutations_flushes_once() {
    let sink = Arc::new(MemorySink::new());
    let shutdown = CancellationToken::new();
    let (handle, _task) = run_engine(Engine::new(WINDOW), sink.clone(), shutdown.clone());

    handle
        .send(message(json!({"type": "setEnabled", "enabled": true})))
        .await
        .expect("engine running");
    for i in 0..10 {
        tokio::time::advance(Duration::from_millis(100)).await;
        handle
            .send(observe(&format!("https://a.com/items/{i}")))
            .await
            .expect("engine running");
    }
    // Each mutation restarted the window, so nothing was written yet.
    assert_eq!(sink.writes(), 0);

    tokio::time::advance(WINDOW).await;
    sink.wait_for_writes(1).await;
    assert_eq!(sink.writes(), 1);

    let state = sink.last().expect("state persisted");
    assert!(state.enabled);
    assert_eq!(state.data["https://a.com"]["GET /items/:id"].hits, 10);
    shutdown.cancel();
}

#[tokio::test(start_paused = true)]
async fn test_disabled_engine_neither_records_nor_flushes() {
    let sink = Arc::new(MemorySink::new());
    let shutdown = CancellationToken::new();
    let (handle, task) = run_engine(Engine::new(WINDOW), sink.clone(), shutdown.clone());

    for i in 0..5 {
        handle
            .send(observe(&format!("https://a.com/{i}")))
            .await
            .expect("engine running");
    }
    tokio::time::advance(WINDOW * 10).await;

    let reply = handle
        .send(Message::GetData)
        .await
        .expect("engine running");
    assert_eq!(
        reply,
        Reply::Data {
            data: Default::default()
        }
    );
    assert_eq!(handle.stats().total(), 5);

    shutdown.cancel();
    let engine = task.await.expect("engine task completes");
    assert!(engine.store().is_empty());
    assert_eq!(sink.writes(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_pending_flush_is_written_on_shutdown() {
    let sink = Arc::new(MemorySink::new());
    let shutdown = CancellationToken::new();
    let (handle, task) = run_engine(Engine::new(WINDOW), sink.clone(), shutdown.clone());

    handle
        .send(message(json!({"type": "setEnabled", "enabled": true})))
        .await
        .expect("engine running");
    handle
        .send(observe("https://a.com/orders/1"))
        .await
        .expect("engine running");

    shutdown.cancel();
    task.await.expect("engine task completes");
    assert_eq!(sink.writes(), 1);
    assert_eq!(
        sink.last().map(|s| s.data["https://a.com"].len()),
        Some(1)
    );
    assert!(handle.send(Message::GetState).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_form_scan_and_field_tests_over_messages() {
    let sink = Arc::new(MemorySink::new());
    let shutdown = CancellationToken::new();
    let (handle, task) = run_engine(Engine::new(WINDOW), sink.clone(), shutdown.clone());

    handle
        .send(message(json!({"type": "setEnabled", "enabled": true})))
        .await
        .expect("engine running");
    handle
        .send(message(json!({
            "type": "reportForms",
            "payload": {
                "url": "https://a.com/search",
                "title": "Search",
                "forms": [],
                "looseFields": [{"name": "q", "type": "text"}]
            }
        })))
        .await
        .expect("engine running");

    let check = json!({
        "type": "setFieldsChecked",
        "origin": "https://a.com",
        "recKey": "GET /search",
        "checked": true
    });
    assert_eq!(
        handle.send(message(check.clone())).await,
        Some(Reply::Ok { ok: false })
    );

    for test in ["xss", "sqli", "ssrf", "file", "auth"] {
        handle
            .send(message(json!({
                "type": "setFieldTest",
                "origin": "https://a.com",
                "recKey": "GET /search",
                "fieldKey": "loose|q",
                "test": test,
                "value": true
            })))
            .await
            .expect("engine running");
    }
    assert_eq!(
        handle.send(message(check)).await,
        Some(Reply::Ok { ok: true })
    );

    shutdown.cancel();
    let engine = task.await.expect("engine task completes");
    let record = engine
        .store()
        .get("https://a.com", "GET /search")
        .expect("page record");
    assert!(record.fields_checked);
    assert_eq!(record.note, "Detected form fields: q");
    assert_eq!(record.field_tests["loose|q"].len(), 5);
    assert_eq!(record.field_tests["loose|q"].get(&TestName::Auth), Some(&true));
    assert_eq!(sink.writes(), 1);
}
