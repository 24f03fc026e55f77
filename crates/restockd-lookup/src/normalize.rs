//! Turns raw provider stock payloads into [`AvailabilityRecord`]s.
//!
//! The payload shape is only loosely guaranteed: an object with an
//! `items` array, each item carrying a `locations` array of per-store
//! entries, plus a top-level `locations` array naming the stores.
//! Everything here walks the JSON defensively and never panics on a
//! missing or oddly-typed field.

use std::collections::HashMap;

use chrono::Utc;
use serde_json::Value;

use restockd_core::{AvailabilityRecord, StoreAvailability};

use crate::error::NormalizeError;

/// Browser-facing lookup page for a sku at a zip code, used in alert links.
#[must_use]
pub fn lookup_page_url(sku: &str, zip_code: &str) -> String {
    format!("https://www.snormax.com/lookup/bestbuy/{sku}?title=&image=&zipcode={zip_code}")
}

/// Normalize a raw stock payload for one sku.
///
/// Only positive integer quantities count as stock: zero, negative, and
/// non-numeric quantities are ignored. Pickup and in-store quantities for
/// the same location merge into one entry, pickup taking precedence for
/// its own field. `locations_checked` lists every reported location,
/// stocked or not, in provider order.
///
/// # Errors
///
/// Returns `EmptyResponse` when the payload has no `items`, and
/// `MalformedLocation` when the first item has no `locations` array.
pub fn normalize_stock_response(
    data: &Value,
    sku: &str,
) -> Result<AvailabilityRecord, NormalizeError> {
    let item = data
        .get("items")
        .and_then(Value::as_array)
        .and_then(|items| items.first())
        .ok_or_else(|| NormalizeError::EmptyResponse {
            sku: sku.to_string(),
        })?;

    let entries = item
        .get("locations")
        .and_then(Value::as_array)
        .ok_or_else(|| NormalizeError::MalformedLocation {
            sku: sku.to_string(),
        })?;

    let names = location_display_names(data);

    let mut stores: Vec<StoreAvailability> = Vec::new();
    let mut locations_checked: Vec<String> = Vec::with_capacity(entries.len());

    for entry in entries {
        let location_id = entry.get("locationId").and_then(value_as_string);
        locations_checked.push(resolve_name(&names, location_id.as_deref()));

        // Entries without an id still count as checked but cannot carry stock.
        let Some(id) = location_id else { continue };

        let pickup = positive_quantity(
            entry
                .get("availability")
                .and_then(|a| a.get("availablePickupQuantity")),
        );
        let in_store = positive_quantity(
            entry
                .get("inStoreAvailability")
                .and_then(|a| a.get("availableInStoreQuantity")),
        );
        record_availability(&mut stores, &names, &id, pickup, in_store);
    }

    Ok(AvailabilityRecord {
        available: !stores.is_empty(),
        total_locations_checked: locations_checked.len(),
        locations_checked,
        stores,
        checked_at: Utc::now(),
    })
}

/// Display names keyed by location id, from the top-level `locations`
/// array. Entries without an id are dropped.
fn location_display_names(data: &Value) -> HashMap<String, String> {
    let mut names = HashMap::new();
    let Some(locations) = data.get("locations").and_then(Value::as_array) else {
        return names;
    };
    for location in locations {
        let Some(id) = location.get("id").and_then(value_as_string) else {
            continue;
        };
        let name = location
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("Unknown");
        let city = location
            .get("city")
            .and_then(Value::as_str)
            .unwrap_or("Unknown");
        names.insert(id, format!("{name} - {city}"));
    }
    names
}

fn resolve_name(names: &HashMap<String, String>, location_id: Option<&str>) -> String {
    match location_id {
        Some(id) => names
            .get(id)
            .cloned()
            .unwrap_or_else(|| format!("Location {id}")),
        None => "Location unknown".to_string(),
    }
}

/// Upserts stock for a location. Only called with at least one positive
/// quantity channel; an existing entry keeps fields the new sighting does
/// not carry, so an in-store-only sighting never clears a pickup quantity.
fn record_availability(
    stores: &mut Vec<StoreAvailability>,
    names: &HashMap<String, String>,
    location_id: &str,
    pickup: Option<u32>,
    in_store: Option<u32>,
) {
    if pickup.is_none() && in_store.is_none() {
        return;
    }
    if let Some(existing) = stores.iter_mut().find(|s| s.location_id == location_id) {
        if pickup.is_some() {
            existing.pickup_quantity = pickup;
        }
        if in_store.is_some() {
            existing.in_store_quantity = in_store;
        }
        return;
    }
    stores.push(StoreAvailability {
        location_id: location_id.to_string(),
        location_name: resolve_name(names, Some(location_id)),
        pickup_quantity: pickup,
        in_store_quantity: in_store,
    });
}

/// Ids arrive as JSON numbers or strings depending on the endpoint.
fn value_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn positive_quantity(value: Option<&Value>) -> Option<u32> {
    value
        .and_then(Value::as_u64)
        .and_then(|q| u32::try_from(q).ok())
        .filter(|q| *q > 0)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
