// --- File: crates/citaflow_scheduling/src/ledger.rs ---
//! Capacity ledger: occupancy and pending-load counts over the store.
//!
//! The counts are only trustworthy while the caller holds the booking lock
//! for the window being checked; the engine acquires it before consulting
//! the ledger.

use crate::models::Client;
use crate::store::{SchedulingStore, StoreError};
use chrono::NaiveDateTime;
use std::sync::Arc;
use uuid::Uuid;

pub struct CapacityLedger {
    store: Arc<dyn SchedulingStore>,
}

impl CapacityLedger {
    pub fn new(store: Arc<dyn SchedulingStore>) -> Self {
        Self { store }
    }

    /// Active, non-cancelled appointments at the office intersecting
    /// [start, end).
    pub async fn office_occupancy(
        &self,
        office_id: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<u32, StoreError> {
        self.store
            .count_office_occupancy(office_id, start, end)
            .await
    }

    /// The client's active PENDING appointments.
    pub async fn client_pending(&self, client_id: Uuid) -> Result<u32, StoreError> {
        self.store.count_client_pending(client_id).await
    }

    /// The effective per-client limit: the client override counts only when
    /// it raises the system default.
    pub fn effective_pending_limit(client: &Client, system_default: u32) -> u32 {
        client.pending_limit.max(system_default)
    }

    /// How many more appointments the client may book right now.
    pub async fn remaining_bookable(
        &self,
        client: &Client,
        system_default: u32,
    ) -> Result<u32, StoreError> {
        let limit = Self::effective_pending_limit(client, system_default);
        let pending = self.client_pending(client.id).await?;
        Ok(limit.saturating_sub(pending))
    }
}
