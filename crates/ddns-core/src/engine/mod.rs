//! Record synchronizer
//!
//! The Synchronizer is responsible for one pass of:
//! - Discovering the current address via AddressSource
//! - Listing the published addresses via RecordStore
//! - Updating every record whose address differs
//! - Reporting each record to the MetricsSink
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐                      ┌──────────────┐
//! │ AddressSource │── current() ───┐     │  Scheduler   │
//! └───────────────┘                │     └──────────────┘
//!                                  ▼            │ attempt()
//!                           ┌──────────────┐    │
//!                           │ Synchronizer │◀───┘
//!                           └──────────────┘
//!                                  │
//!              ┌───────────────────┴───────────────────┐
//!              ▼                                       ▼
//!      ┌──────────────┐                        ┌─────────────┐
//!      │ RecordStore  │                        │ MetricsSink │
//!      │ (list, set)  │                        │  (signals)  │
//!      └──────────────┘                        └─────────────┘
//! ```
//!
//! ## Pass Flow
//!
//! 1. Discover the address; abort on error
//! 2. List record addresses; abort on error
//! 3. For each mapping in listing order, update on mismatch; abort the rest
//!    of the pass on the first failed update
//! 4. Report success once every record was inspected

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info};

use crate::error::Result;
use crate::scheduler::Retryable;
use crate::traits::{AddressSource, MetricsSink, RecordStore};

/// Outcome for one record within a pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    /// The record name
    pub name: String,
    /// Provider record ID
    pub id: String,
    /// Address published before the pass
    pub previous_address: String,
    /// Whether an update was issued
    pub updated: bool,
}

/// Post-sync state of a successful pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Address every record now points to
    pub address: String,
    /// Per-record outcomes, in listing order
    pub records: Vec<RecordOutcome>,
}

impl SyncReport {
    /// Number of records that were updated in this pass
    pub fn updated_count(&self) -> usize {
        self.records.iter().filter(|r| r.updated).count()
    }
}

/// Synchronizes A records with the discovered address
///
/// Built once at startup from the selected address source and record
/// store. Every call to [`Synchronizer::sync_once()`] is an independent
/// pass: nothing is carried over between passes.
pub struct Synchronizer {
    /// Address discovery strategy
    source: Box<dyn AddressSource>,

    /// DNS provider client
    store: Box<dyn RecordStore>,

    /// Observability output
    sink: Arc<dyn MetricsSink>,
}

impl Synchronizer {
    /// Create a new synchronizer
    pub fn new(
        source: Box<dyn AddressSource>,
        store: Box<dyn RecordStore>,
        sink: Arc<dyn MetricsSink>,
    ) -> Self {
        Self {
            source,
            store,
            sink,
        }
    }

    /// Run one synchronization pass
    ///
    /// # Returns
    ///
    /// - `Ok(SyncReport)`: Every record was inspected and updated where needed
    /// - `Err(Error)`: The first error hit; records updated before it stay updated
    pub async fn sync_once(&self) -> Result<SyncReport> {
        let address = self.source.current().await?;
        info!(
            "Obtained address {} from {} source",
            address,
            self.source.source_name()
        );

        let mappings = self.store.list_record_addresses().await?;

        let mut records = Vec::with_capacity(mappings.len());
        for mapping in mappings {
            info!(
                "A record for {} is currently set to {}",
                mapping.name, mapping.address
            );

            let updated = if mapping.address != address {
                info!(
                    "Address of A record {} did not match obtained address, updating via {}",
                    mapping.name,
                    self.store.provider_name()
                );
                self.store.set_record_address(&address, &mapping).await?;
                self.sink.record_update(&address, &mapping.name, Utc::now());
                true
            } else {
                debug!(
                    "Address of A record {} matched obtained address, no update required",
                    mapping.name
                );
                false
            };

            self.sink.record_address(&address, &mapping.name);

            records.push(RecordOutcome {
                name: mapping.name,
                id: mapping.id,
                previous_address: mapping.address,
                updated,
            });
        }

        Ok(SyncReport { address, records })
    }
}

#[async_trait]
impl Retryable for Synchronizer {
    async fn attempt(&self) -> Result<()> {
        let report = self.sync_once().await?;
        info!(
            "Synchronized {} record(s) to {}, {} updated",
            report.records.len(),
            report.address,
            report.updated_count()
        );
        Ok(())
    }
}
