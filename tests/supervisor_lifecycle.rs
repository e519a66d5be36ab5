// tests/supervisor_lifecycle.rs
#![cfg(unix)]

mod common;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use samlocal::errors::SamLocalError;
use samlocal::events::Topic;
use samlocal::exec::{spawn_process, OutputSink, ProcessState, SpawnRequest};

use common::{init_tracing, with_timeout};

#[derive(Default)]
struct Collected {
    data: Mutex<Vec<u8>>,
    error: Mutex<Vec<u8>>,
}

impl Collected {
    fn text(&self, topic: Topic) -> String {
        let buf = match topic {
            Topic::Data => self.data.lock().unwrap(),
            Topic::Error => self.error.lock().unwrap(),
        };
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl OutputSink for Collected {
    fn emit(&self, topic: Topic, chunk: &[u8]) {
        match topic {
            Topic::Data => self.data.lock().unwrap().extend_from_slice(chunk),
            Topic::Error => self.error.lock().unwrap().extend_from_slice(chunk),
        }
    }
}

fn sh(script: &str) -> SpawnRequest {
    SpawnRequest::new(
        "sh",
        vec!["-c".to_string(), script.to_string()],
        std::env::temp_dir(),
    )
}

#[tokio::test]
async fn ready_process_streams_output_and_stops_on_kill() {
    init_tracing();
    let sink = Arc::new(Collected::default());

    let handle = with_timeout(spawn_process(
        sh("echo hello; echo 'Press CTRL+C to quit'; exec sleep 30"),
        sink.clone(),
    ))
    .await
    .expect("process should become ready");

    assert!(handle.is_ready());
    assert!(!handle.has_exited());
    assert_eq!(handle.state(), ProcessState::Running);
    assert!(sink.text(Topic::Data).contains("hello"));

    let status = with_timeout(handle.kill()).await.unwrap();
    let status = status.expect("exit status recorded");
    assert!(!status.success());
}

#[tokio::test]
async fn start_waits_for_the_marker() {
    init_tracing();
    let sink = Arc::new(Collected::default());
    let started = Instant::now();

    let handle = with_timeout(spawn_process(
        sh("sleep 0.5; echo 'Press CTRL+C to quit'; exec sleep 30"),
        sink,
    ))
    .await
    .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(400));
    with_timeout(handle.kill()).await.unwrap();
}

#[tokio::test]
async fn marker_split_across_writes_is_detected() {
    init_tracing();
    let sink = Arc::new(Collected::default());

    let handle = with_timeout(spawn_process(
        sh("printf 'Press CTRL'; sleep 0.3; printf '+C to quit\\n'; exec sleep 30"),
        sink,
    ))
    .await
    .expect("split marker should still count");

    assert!(handle.is_ready());
    with_timeout(handle.kill()).await.unwrap();
}

#[tokio::test]
async fn marker_on_stderr_counts_and_goes_to_error_topic() {
    init_tracing();
    let sink = Arc::new(Collected::default());

    let handle = with_timeout(spawn_process(
        sh("echo 'Running on http://127.0.0.1:3000/ (Press CTRL+C to quit)' >&2; exec sleep 30"),
        sink.clone(),
    ))
    .await
    .unwrap();

    assert!(sink.text(Topic::Error).contains("Press CTRL+C to quit"));
    assert!(sink.text(Topic::Data).is_empty());
    with_timeout(handle.kill()).await.unwrap();
}

#[tokio::test]
async fn exit_before_marker_is_startup_failure() {
    init_tracing();
    let sink = Arc::new(Collected::default());

    let err = with_timeout(spawn_process(sh("echo boom >&2; exit 3"), sink.clone()))
        .await
        .expect_err("process never became ready");

    match err {
        SamLocalError::StartupFailed { program, status } => {
            assert_eq!(program, "sh");
            assert_eq!(status.and_then(|s| s.code()), Some(3));
        }
        other => panic!("expected StartupFailed, got {other:?}"),
    }
    assert!(sink.text(Topic::Error).contains("boom"));
}

#[tokio::test]
async fn missing_binary_is_spawn_error() {
    init_tracing();
    let sink = Arc::new(Collected::default());

    let err = spawn_process(
        SpawnRequest::new("definitely-not-a-sam-binary", vec![], std::env::temp_dir()),
        sink,
    )
    .await
    .expect_err("binary does not exist");

    assert!(matches!(err, SamLocalError::Spawn { .. }), "got {err:?}");
}

#[tokio::test]
async fn unexpected_exit_after_ready_is_reported_on_error_topic() {
    init_tracing();
    let sink = Arc::new(Collected::default());

    let handle = with_timeout(spawn_process(
        sh("echo 'Press CTRL+C to quit'; sleep 0.2; exit 4"),
        sink.clone(),
    ))
    .await
    .unwrap();

    let status = with_timeout(handle.wait()).await;
    assert_eq!(status.and_then(|s| s.code()), Some(4));
    assert_eq!(handle.state(), ProcessState::Exited);
    assert!(sink.text(Topic::Error).contains("exited unexpectedly"));

    // Killing an already exited process still resolves.
    let status = with_timeout(handle.kill()).await.unwrap();
    assert_eq!(status.and_then(|s| s.code()), Some(4));
}

#[tokio::test]
async fn custom_ready_marker() {
    init_tracing();
    let sink = Arc::new(Collected::default());

    let handle = with_timeout(spawn_process(
        sh("echo 'listening'; exec sleep 30").with_ready_marker("listening"),
        sink,
    ))
    .await
    .unwrap();

    assert!(handle.is_ready());
    with_timeout(handle.kill()).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn exit_right_after_marker_is_always_reported() {
    init_tracing();

    for attempt in 0..30 {
        let sink = Arc::new(Collected::default());

        let handle = with_timeout(spawn_process(
            sh("echo 'Press CTRL+C to quit'; exit 4"),
            sink.clone(),
        ))
        .await
        .unwrap_or_else(|e| panic!("attempt {attempt}: {e:?}"));

        let status = with_timeout(handle.wait()).await;
        assert_eq!(status.and_then(|s| s.code()), Some(4), "attempt {attempt}");
        assert!(
            sink.text(Topic::Error).contains("exited unexpectedly"),
            "attempt {attempt}: exit was not reported"
        );
    }
}
