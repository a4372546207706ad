//! Test doubles and common utilities for synchronization contract tests
//!
//! The doubles are cheap to clone; clones share state, so a test can hand
//! one copy to the synchronizer and inspect the other afterwards.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ddns_core::error::{Error, Result};
use ddns_core::scheduler::Sleeper;
use ddns_core::traits::{AddressSource, MetricsSink, RecordAddressMapping, RecordStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// An AddressSource returning a fixed address, or failing on demand
#[derive(Clone)]
pub struct MockAddressSource {
    address: Arc<Mutex<Option<String>>>,
    call_count: Arc<AtomicUsize>,
}

impl MockAddressSource {
    pub fn new(address: &str) -> Self {
        Self {
            address: Arc::new(Mutex::new(Some(address.to_string()))),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source whose every lookup fails
    pub fn failing() -> Self {
        Self {
            address: Arc::new(Mutex::new(None)),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_address(&self, address: &str) {
        *self.address.lock().unwrap() = Some(address.to_string());
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AddressSource for MockAddressSource {
    async fn current(&self) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.address
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::transport("discovery endpoint unreachable"))
    }

    fn source_name(&self) -> &'static str {
        "mock"
    }
}

/// One recorded update call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCall {
    pub address: String,
    pub id: String,
    pub name: String,
}

/// A RecordStore backed by an in-memory listing
///
/// Successful updates are applied to the listing, so a second pass sees
/// the new address.
#[derive(Clone)]
pub struct MockRecordStore {
    listing: Arc<Mutex<Vec<RecordAddressMapping>>>,
    updates: Arc<Mutex<Vec<UpdateCall>>>,
    list_call_count: Arc<AtomicUsize>,
    fail_list: Arc<Mutex<bool>>,
    fail_update_for: Arc<Mutex<Option<String>>>,
}

impl MockRecordStore {
    pub fn new(listing: Vec<RecordAddressMapping>) -> Self {
        Self {
            listing: Arc::new(Mutex::new(listing)),
            updates: Arc::new(Mutex::new(Vec::new())),
            list_call_count: Arc::new(AtomicUsize::new(0)),
            fail_list: Arc::new(Mutex::new(false)),
            fail_update_for: Arc::new(Mutex::new(None)),
        }
    }

    /// Make every listing call fail
    pub fn fail_listing(&self) {
        *self.fail_list.lock().unwrap() = true;
    }

    /// Make updates of the record with `name` fail
    pub fn fail_update_for(&self, name: &str) {
        *self.fail_update_for.lock().unwrap() = Some(name.to_string());
    }

    pub fn updates(&self) -> Vec<UpdateCall> {
        self.updates.lock().unwrap().clone()
    }

    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }

    pub fn published(&self, name: &str) -> Option<String> {
        self.listing
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.address.clone())
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn list_record_addresses(&self) -> Result<Vec<RecordAddressMapping>> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        if *self.fail_list.lock().unwrap() {
            return Err(Error::resolution("no record with name missing.example.com was found"));
        }
        Ok(self.listing.lock().unwrap().clone())
    }

    async fn set_record_address(&self, address: &str, mapping: &RecordAddressMapping) -> Result<()> {
        if self.fail_update_for.lock().unwrap().as_deref() == Some(mapping.name.as_str()) {
            return Err(Error::protocol("response status code was 500 Internal Server Error"));
        }

        self.updates.lock().unwrap().push(UpdateCall {
            address: address.to_string(),
            id: mapping.id.clone(),
            name: mapping.name.clone(),
        });

        for record in self.listing.lock().unwrap().iter_mut() {
            if record.id == mapping.id {
                record.address = address.to_string();
            }
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A signal received by the RecordingSink
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Address { address: String, name: String },
    Updated { address: String, name: String },
}

/// A MetricsSink that records every signal
#[derive(Clone, Default)]
pub struct RecordingSink {
    signals: Arc<Mutex<Vec<Signal>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signals(&self) -> Vec<Signal> {
        self.signals.lock().unwrap().clone()
    }
}

impl MetricsSink for RecordingSink {
    fn record_address(&self, address: &str, record_name: &str) {
        self.signals.lock().unwrap().push(Signal::Address {
            address: address.to_string(),
            name: record_name.to_string(),
        });
    }

    fn record_update(&self, address: &str, record_name: &str, _at: DateTime<Utc>) {
        self.signals.lock().unwrap().push(Signal::Updated {
            address: address.to_string(),
            name: record_name.to_string(),
        });
    }
}

/// A Sleeper that records requested durations without waiting
///
/// After `limit` sleeps it notifies the test and parks forever, which
/// freezes the scheduler so its history can be inspected.
#[derive(Clone)]
pub struct RecordingSleeper {
    durations: Arc<Mutex<Vec<Duration>>>,
    limit: usize,
    done: Arc<Notify>,
}

impl RecordingSleeper {
    pub fn new(limit: usize) -> Self {
        Self {
            durations: Arc::new(Mutex::new(Vec::new())),
            limit,
            done: Arc::new(Notify::new()),
        }
    }

    pub fn durations(&self) -> Vec<Duration> {
        self.durations.lock().unwrap().clone()
    }

    /// Wait until `limit` sleeps have been requested
    pub async fn wait_for_limit(&self) {
        self.done.notified().await;
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        let reached = {
            let mut durations = self.durations.lock().unwrap();
            durations.push(duration);
            durations.len() >= self.limit
        };

        if reached {
            self.done.notify_one();
            std::future::pending::<()>().await;
        }
        tokio::task::yield_now().await;
    }
}

/// Build a mapping
pub fn mapping(id: &str, name: &str, address: &str) -> RecordAddressMapping {
    RecordAddressMapping::new(id, name, address)
}
