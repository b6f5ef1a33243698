//! Stress tests for concurrent handler use
//!
//! These tests verify:
//! - Concurrent writers to one rotating file never interleave partial lines
//! - Derived handlers used from many threads keep their own attributes
//! - Rotation under concurrent load keeps every record intact

use mango_logger::appenders::{ConsoleStreams, MemoryWriter};
use mango_logger::core::{
    CliConfig, ContextKey, FileOutputConfig, Handler, LogConfig, LogContext, LogEvent, LogLevel,
};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const THREADS: usize = 8;
const PER_THREAD: usize = 250;

fn context() -> LogContext {
    LogContext::new()
        .with_key(ContextKey::Operation, "stress")
        .with_key(ContextKey::Type, "Performance")
        .with_key(ContextKey::Application, "bench")
}

fn read_records(dir: &Path) -> Vec<Value> {
    let mut records = Vec::new();
    for entry in fs::read_dir(dir).expect("Failed to read dir") {
        let path = entry.expect("Failed to read dir entry").path();
        let content = fs::read_to_string(path).expect("Failed to read log file");
        for line in content.lines() {
            let record = serde_json::from_str::<Value>(line).expect("every line is a whole record");
            records.push(record);
        }
    }
    records
}

/// Test that concurrent writes each land as one complete JSON line
#[test]
fn test_concurrent_file_writes_are_whole_lines() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("concurrent.log");
    let handler = Arc::new(
        Handler::new(
            LogConfig::new()
                .with_output(true)
                .with_file(FileOutputConfig::new(&log_file)),
        )
        .expect("handler should build"),
    );

    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let handler = Arc::clone(&handler);
            thread::spawn(move || {
                let ctx = context();
                for i in 0..PER_THREAD {
                    let event = LogEvent::new(LogLevel::INFO, format!("thread {} message {}", t, i))
                        .with_attr("thread", t);
                    handler.handle(&ctx, &event).expect("write should succeed");
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker panicked");
    }

    let records = read_records(temp_dir.path());
    assert_eq!(records.len(), THREADS * PER_THREAD);

    let ids: HashSet<&str> = records.iter().filter_map(|r| r["logId"].as_str()).collect();
    assert_eq!(ids.len(), THREADS * PER_THREAD, "log ids must be unique");
    assert_eq!(handler.metrics().dispatched(), (THREADS * PER_THREAD) as u64);
}

/// Test that handlers derived per thread keep independent attribute sets
#[test]
fn test_derived_handlers_stay_independent() {
    let out = MemoryWriter::new();
    let base = Handler::builder(
        LogConfig::new()
            .with_output(true)
            .with_console(CliConfig::new()),
    )
    .console_streams(ConsoleStreams::new(out.clone(), MemoryWriter::new()))
    .build()
    .expect("handler should build");

    let workers: Vec<_> = (0..THREADS)
        .map(|t| {
            let derived = base.with_attrs([("worker", json!(t))]).with_group("job");
            thread::spawn(move || {
                let ctx = context();
                for i in 0..50 {
                    let event = LogEvent::new(LogLevel::INFO, "tick").with_attr("step", i);
                    derived.handle(&ctx, &event).expect("console write should succeed");
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker panicked");
    }

    let lines = out.lines();
    assert_eq!(lines.len(), THREADS * 50);
    for line in &lines {
        let record: Value = serde_json::from_str(line).expect("whole line");
        let attributes = record["attributes"].as_object().unwrap();
        assert_eq!(attributes.len(), 2);
        assert!(attributes.contains_key("worker"));
        assert!(attributes.contains_key("job.step"));
    }
    assert!(base.attrs().is_empty());
}

/// Test that rotation under concurrent load loses or splits no records
#[test]
fn test_rotation_under_load() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_file = temp_dir.path().join("rotating.log");
    let mut file = FileOutputConfig::new(&log_file);
    // one megabyte per file
    file.max_size = 1;
    let handler = Handler::new(LogConfig::new().with_output(true).with_file(file))
        .expect("handler should build");

    let padding = "x".repeat(512);
    let workers: Vec<_> = (0..4)
        .map(|_| {
            let handler = handler.clone();
            let padding = padding.clone();
            thread::spawn(move || {
                let ctx = context();
                for _ in 0..1000 {
                    let event = LogEvent::new(LogLevel::WARN, padding.as_str());
                    handler.handle(&ctx, &event).expect("write should succeed");
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker panicked");
    }

    let files = fs::read_dir(temp_dir.path()).unwrap().count();
    assert!(files > 1, "expected at least one rotation");
    assert_eq!(read_records(temp_dir.path()).len(), 4000);
}
