#![allow(dead_code)]
//! Shared integration test utilities.
//!
//! Import with:
//! ```
//! #[macro_use]
//! mod common;
//! use common::*;
//! ```
//!
//! Provides consistent tracing-based logging initialization, the capture
//! shapes the scenario tests share (a text logger and a value logger, each
//! with an accumulating sink), and a small mutex+condvar callback queue for
//! the worker-reuse scenario.

use crosscap::{current, CrossCall};
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, Once};

static INIT_LOGGING: Once = Once::new();

/// Initialize test logging with trace-level output.
///
/// Safe to call multiple times; only initializes once.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(true)
            .with_ansi(false)
            .try_init();
    });
}

/// Log a test phase transition with a visual separator.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "========================================");
        tracing::info!(phase = %$name, "TEST PHASE: {}", $name);
        tracing::info!(phase = %$name, "========================================");
    };
}

/// Log test completion with summary.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed successfully: {}", $name);
    };
}

// ============================================================================
// Capture shapes
// ============================================================================

/// Text logging capability.
pub trait TextLog: Send + Sync {
    fn log_line(&self, line: &str);
}

/// Capture-site dispatcher for text lines: no-op without an active capture.
pub fn log_text(line: &str) {
    if let Some(capture) = current::<dyn TextLog>() {
        capture.log_line(line);
    }
}

/// Accumulating text sink; serializes itself so it can be crossed.
#[derive(Default)]
pub struct TextSink {
    lines: Mutex<Vec<String>>,
}

impl TextSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("text sink lock poisoned").clone()
    }
}

impl TextLog for TextSink {
    fn log_line(&self, line: &str) {
        self.lines
            .lock()
            .expect("text sink lock poisoned")
            .push(line.to_owned());
    }
}

/// Value counting capability.
pub trait ValueLog: Send + Sync {
    fn log_count(&self, value: i64);
}

/// Capture-site dispatcher for counts: no-op without an active capture.
pub fn log_count(value: i64) {
    if let Some(capture) = current::<dyn ValueLog>() {
        capture.log_count(value);
    }
}

/// Accumulating value sink; serializes itself so it can be crossed.
#[derive(Default)]
pub struct ValueSink {
    counts: Mutex<Vec<i64>>,
}

impl ValueSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn counts(&self) -> Vec<i64> {
        self.counts
            .lock()
            .expect("value sink lock poisoned")
            .clone()
    }
}

impl ValueLog for ValueSink {
    fn log_count(&self, value: i64) {
        self.counts
            .lock()
            .expect("value sink lock poisoned")
            .push(value);
    }
}

// ============================================================================
// CallbackQueue
// ============================================================================

/// Blocking queue of wrapped callbacks for a reusable worker thread.
///
/// The worker loops on [`pop_and_call`](Self::pop_and_call) until the queue
/// is terminated; producers push wrapped callbacks and can wait for the queue
/// to drain, including the callback currently in flight.
#[derive(Default)]
pub struct CallbackQueue {
    state: Mutex<QueueState>,
    ready: Condvar,
    idle: Condvar,
}

#[derive(Default)]
struct QueueState {
    calls: VecDeque<CrossCall>,
    in_flight: usize,
    terminated: bool,
}

impl CallbackQueue {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push(&self, call: CrossCall) {
        let mut state = self.state.lock().expect("queue lock poisoned");
        state.calls.push_back(call);
        drop(state);
        self.ready.notify_one();
    }

    /// Blocks for the next callback and invokes it; returns `false` once the
    /// queue is terminated and drained.
    pub fn pop_and_call(&self) -> bool {
        let mut state = self.state.lock().expect("queue lock poisoned");
        loop {
            if let Some(call) = state.calls.pop_front() {
                state.in_flight += 1;
                drop(state);
                call.call();
                let mut state = self.state.lock().expect("queue lock poisoned");
                state.in_flight -= 1;
                if state.calls.is_empty() && state.in_flight == 0 {
                    self.idle.notify_all();
                }
                return true;
            }
            if state.terminated {
                return false;
            }
            state = self.ready.wait(state).expect("queue lock poisoned");
        }
    }

    /// Waits until no callback is queued or in flight.
    pub fn wait_until_empty(&self) {
        let mut state = self.state.lock().expect("queue lock poisoned");
        while !state.calls.is_empty() || state.in_flight > 0 {
            state = self.idle.wait(state).expect("queue lock poisoned");
        }
    }

    pub fn terminate(&self) {
        let mut state = self.state.lock().expect("queue lock poisoned");
        state.terminated = true;
        drop(state);
        self.ready.notify_all();
    }
}
