#![allow(dead_code)]
//! Shared fixtures for integration tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use focuspresso::kv::{KeyValueStore, KvError, MemoryKv};
use focuspresso::{NewTask, Priority, Task};
use tracing_subscriber::EnvFilter;

/// Tracing is opt-in via RUST_LOG; safe to call from every test.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn at(day: NaiveDate, hour: u32, minute: u32) -> NaiveDateTime {
    day.and_hms_opt(hour, minute, 0).expect("valid time")
}

pub fn task(title: &str, due: NaiveDateTime) -> Task {
    NewTask::new(title, due).build().expect("valid task")
}

pub fn repeating(title: &str, due: NaiveDateTime, days: &[&str]) -> Task {
    NewTask::new(title, due)
        .priority(Priority::High)
        .repeating(days.iter().map(|day| day.to_string()).collect())
        .build()
        .expect("valid task")
}

/// KV wrapper whose reads and writes can be made to fail on demand.
#[derive(Default)]
pub struct FlakyKv {
    inner: MemoryKv,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl FlakyKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_reads(&self, on: bool) {
        self.fail_reads.store(on, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, on: bool) {
        self.fail_writes.store(on, Ordering::SeqCst);
    }
}

/// KV wrapper recording the order in which keys are written.
#[derive(Default)]
pub struct RecordingKv {
    inner: MemoryKv,
    writes: Mutex<Vec<String>>,
}

impl RecordingKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl KeyValueStore for RecordingKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.writes.lock().unwrap().push(key.to_string());
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), KvError> {
        self.writes.lock().unwrap().push(key.to_string());
        self.inner.remove(key).await
    }
}

#[async_trait]
impl KeyValueStore for FlakyKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(KvError::Unavailable("injected read failure".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KvError::Unavailable("injected write failure".to_string()));
        }
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), KvError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(KvError::Unavailable("injected write failure".to_string()));
        }
        self.inner.remove(key).await
    }
}
