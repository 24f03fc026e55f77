use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel quantity meaning "more than the provider enumerates".
///
/// The provider caps reported quantities; this value stands in for any
/// count above the cap and is rendered as `3+` in user-facing output.
pub const UNCAPPED_QUANTITY: u32 = 9999;

/// Per-store availability for one product.
///
/// A quantity of `None` means that channel (pickup or in-store) reported
/// nothing for the location; present quantities are always positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreAvailability {
    pub location_id: String,
    pub location_name: String,
    pub pickup_quantity: Option<u32>,
    pub in_store_quantity: Option<u32>,
}

/// Snapshot of a product's availability at one check.
///
/// Invariants: `stores` holds only locations with positive stock on at
/// least one channel, each location at most once; `locations_checked`
/// covers every location the provider reported, stocked or not, so
/// `stores.len() <= total_locations_checked` always holds; `available`
/// is exactly `!stores.is_empty()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRecord {
    pub available: bool,
    pub stores: Vec<StoreAvailability>,
    pub total_locations_checked: usize,
    pub locations_checked: Vec<String>,
    pub checked_at: DateTime<Utc>,
}

/// Latest known availability per monitored `(sku, zip_code)` pair.
///
/// Absence of an entry means the pair has never completed a check; the
/// restock detector treats that the same as "was out of stock".
#[derive(Debug, Default)]
pub struct StatusStore {
    records: HashMap<(String, String), AvailabilityRecord>,
}

impl StatusStore {
    #[must_use]
    pub fn get(&self, sku: &str, zip_code: &str) -> Option<&AvailabilityRecord> {
        self.records.get(&(sku.to_owned(), zip_code.to_owned()))
    }

    /// Replaces the stored record for the pair. Records are whole-snapshot
    /// values, never merged across checks.
    pub fn update(&mut self, sku: &str, zip_code: &str, record: AvailabilityRecord) {
        self.records
            .insert((sku.to_owned(), zip_code.to_owned()), record);
    }

    /// Drops the record for the pair, returning it if one was present.
    /// Used when a product is removed so a later re-add starts unknown.
    pub fn evict(&mut self, sku: &str, zip_code: &str) -> Option<AvailabilityRecord> {
        self.records.remove(&(sku.to_owned(), zip_code.to_owned()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }
}
