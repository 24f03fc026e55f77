use std::future::Future;

use futures::stream::{self, StreamExt};
use tokio::sync::RwLock;

use restockd_core::{AvailabilityRecord, Catalog, ProductSpec, StatusStore};
use restockd_lookup::{LookupError, StockClient};

/// Capability to fetch current availability for one sku/zip pair.
///
/// The returned future must be `Send` so cycles can run inside spawned
/// scheduler jobs.
pub trait StockFetcher: Send + Sync {
    fn check(
        &self,
        sku: &str,
        zip_code: &str,
    ) -> impl Future<Output = Result<AvailabilityRecord, LookupError>> + Send;
}

impl StockFetcher for StockClient {
    async fn check(&self, sku: &str, zip_code: &str) -> Result<AvailabilityRecord, LookupError> {
        self.check_stock(sku, zip_code).await
    }
}

/// Result of comparing a fresh record against the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The pair was out of stock (or never checked) and is now in stock.
    Restocked,
    NoChange,
}

/// Applies a fresh record to the store and reports the transition.
///
/// The store is updated with the whole record as the last step, whether
/// or not a transition fired. A missing previous record counts as "was
/// out of stock", so the very first in-stock sighting alerts.
pub fn apply_check(
    store: &mut StatusStore,
    sku: &str,
    zip_code: &str,
    record: AvailabilityRecord,
) -> Transition {
    let was_available = store
        .get(sku, zip_code)
        .is_some_and(|previous| previous.available);
    let transition = if record.available && !was_available {
        Transition::Restocked
    } else {
        Transition::NoChange
    };
    store.update(sku, zip_code, record);
    transition
}

/// Per-product result of one monitoring cycle.
#[derive(Debug)]
pub enum CheckOutcome {
    Restocked(AvailabilityRecord),
    NoChange(AvailabilityRecord),
    /// The lookup failed; the stored record was left untouched.
    Skipped(LookupError),
}

#[derive(Debug)]
pub struct ProductOutcome {
    pub product: ProductSpec,
    pub outcome: CheckOutcome,
}

/// Runs one monitoring cycle over the whole catalog.
///
/// Lookups run with a bounded fan-out of `max_concurrent` (floored at 1);
/// results are applied to the store one product at a time, in catalog
/// order, each record as a whole value. A failed lookup skips that
/// product and never aborts the cycle.
pub async fn run_cycle<F: StockFetcher>(
    catalog: &RwLock<Catalog>,
    store: &RwLock<StatusStore>,
    fetcher: &F,
    max_concurrent: usize,
) -> Vec<ProductOutcome> {
    let products = catalog.read().await.snapshot();
    let mut outcomes = Vec::with_capacity(products.len());

    let mut checks = stream::iter(products)
        .map(|product| async move {
            let result = fetcher.check(&product.sku, &product.zip_code).await;
            (product, result)
        })
        .buffered(max_concurrent.max(1));

    while let Some((product, result)) = checks.next().await {
        let outcome = match result {
            Ok(record) => {
                let transition = {
                    let mut store = store.write().await;
                    apply_check(&mut store, &product.sku, &product.zip_code, record.clone())
                };
                tracing::debug!(
                    sku = %product.sku,
                    zip_code = %product.zip_code,
                    available = record.available,
                    stores = record.stores.len(),
                    transition = ?transition,
                    "stock check applied"
                );
                match transition {
                    Transition::Restocked => CheckOutcome::Restocked(record),
                    Transition::NoChange => CheckOutcome::NoChange(record),
                }
            }
            Err(error) => {
                tracing::warn!(
                    sku = %product.sku,
                    zip_code = %product.zip_code,
                    error = %error,
                    "stock check failed; keeping previous status"
                );
                CheckOutcome::Skipped(error)
            }
        };
        outcomes.push(ProductOutcome { product, outcome });
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;

    use restockd_core::{Priority, StoreAvailability};

    use super::*;

    fn spec(sku: &str, zip: &str) -> ProductSpec {
        ProductSpec {
            sku: sku.to_string(),
            zip_code: zip.to_string(),
            name: format!("Product {sku}"),
            priority: Priority::Medium,
            category: "Unknown".to_string(),
            set_name: "Unknown".to_string(),
        }
    }

    fn record(available: bool) -> AvailabilityRecord {
        let stores = if available {
            vec![StoreAvailability {
                location_id: "101".to_string(),
                location_name: "Store 101".to_string(),
                pickup_quantity: Some(1),
                in_store_quantity: None,
            }]
        } else {
            Vec::new()
        };
        AvailabilityRecord {
            available,
            total_locations_checked: 1,
            locations_checked: vec!["Store 101".to_string()],
            stores,
            checked_at: Utc::now(),
        }
    }

    #[derive(Clone, Copy)]
    enum Plan {
        InStock,
        OutOfStock,
        Fail,
    }

    struct StubFetcher {
        plan: HashMap<(String, String), Plan>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl StubFetcher {
        fn new(plan: Vec<(&str, &str, Plan)>) -> Self {
            StubFetcher {
                plan: plan
                    .into_iter()
                    .map(|(sku, zip, p)| ((sku.to_string(), zip.to_string()), p))
                    .collect(),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn max_observed_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    impl StockFetcher for StubFetcher {
        async fn check(
            &self,
            sku: &str,
            zip_code: &str,
        ) -> Result<AvailabilityRecord, LookupError> {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match self.plan.get(&(sku.to_owned(), zip_code.to_owned())) {
                Some(Plan::InStock) => Ok(record(true)),
                Some(Plan::OutOfStock) => Ok(record(false)),
                _ => Err(LookupError::NotFound {
                    sku: sku.to_owned(),
                }),
            }
        }
    }

    // -------------------------------------------------------------------
    // apply_check
    // -------------------------------------------------------------------

    #[test]
    fn first_in_stock_sighting_is_a_restock() {
        let mut store = StatusStore::default();
        let transition = apply_check(&mut store, "1", "90503", record(true));
        assert_eq!(transition, Transition::Restocked);
        assert!(store.get("1", "90503").unwrap().available);
    }

    #[test]
    fn first_out_of_stock_sighting_is_no_change() {
        let mut store = StatusStore::default();
        let transition = apply_check(&mut store, "1", "90503", record(false));
        assert_eq!(transition, Transition::NoChange);
        assert!(!store.get("1", "90503").unwrap().available);
    }

    #[test]
    fn out_of_stock_to_in_stock_is_a_restock() {
        let mut store = StatusStore::default();
        apply_check(&mut store, "1", "90503", record(false));
        let transition = apply_check(&mut store, "1", "90503", record(true));
        assert_eq!(transition, Transition::Restocked);
    }

    #[test]
    fn staying_in_stock_does_not_refire() {
        let mut store = StatusStore::default();
        apply_check(&mut store, "1", "90503", record(true));
        let transition = apply_check(&mut store, "1", "90503", record(true));
        assert_eq!(transition, Transition::NoChange);
    }

    #[test]
    fn going_out_of_stock_is_no_change_but_still_recorded() {
        let mut store = StatusStore::default();
        apply_check(&mut store, "1", "90503", record(true));
        let transition = apply_check(&mut store, "1", "90503", record(false));
        assert_eq!(transition, Transition::NoChange);
        assert!(!store.get("1", "90503").unwrap().available);
    }

    #[test]
    fn staying_out_of_stock_is_no_change() {
        let mut store = StatusStore::default();
        apply_check(&mut store, "1", "90503", record(false));
        let transition = apply_check(&mut store, "1", "90503", record(false));
        assert_eq!(transition, Transition::NoChange);
    }

    #[test]
    fn pairs_transition_independently() {
        let mut store = StatusStore::default();
        apply_check(&mut store, "1", "90503", record(true));
        let transition = apply_check(&mut store, "1", "10001", record(true));
        assert_eq!(
            transition,
            Transition::Restocked,
            "same sku at another zip is its own pair"
        );
    }

    // -------------------------------------------------------------------
    // run_cycle
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn empty_catalog_yields_no_outcomes() {
        let catalog = RwLock::new(Catalog::default());
        let store = RwLock::new(StatusStore::default());
        let fetcher = StubFetcher::new(Vec::new());

        let outcomes = run_cycle(&catalog, &store, &fetcher, 1).await;
        assert!(outcomes.is_empty());
        assert!(store.read().await.is_empty());
    }

    #[tokio::test]
    async fn outcomes_follow_catalog_order_under_concurrency() {
        let catalog = RwLock::new(
            Catalog::from_products(vec![spec("1", "90503"), spec("2", "90503"), spec("3", "90503")])
                .unwrap(),
        );
        let store = RwLock::new(StatusStore::default());
        let fetcher = StubFetcher::new(vec![
            ("1", "90503", Plan::InStock),
            ("2", "90503", Plan::OutOfStock),
            ("3", "90503", Plan::InStock),
        ]);

        let outcomes = run_cycle(&catalog, &store, &fetcher, 3).await;
        let skus: Vec<&str> = outcomes.iter().map(|o| o.product.sku.as_str()).collect();
        assert_eq!(skus, vec!["1", "2", "3"]);
        assert!(matches!(outcomes[0].outcome, CheckOutcome::Restocked(_)));
        assert!(matches!(outcomes[1].outcome, CheckOutcome::NoChange(_)));
        assert!(matches!(outcomes[2].outcome, CheckOutcome::Restocked(_)));
    }

    #[tokio::test]
    async fn failed_lookup_skips_product_and_preserves_stored_record() {
        let catalog = RwLock::new(
            Catalog::from_products(vec![spec("1", "90503"), spec("2", "90503"), spec("3", "90503")])
                .unwrap(),
        );
        let store = RwLock::new(StatusStore::default());
        store.write().await.update("2", "90503", record(true));
        let fetcher = StubFetcher::new(vec![
            ("1", "90503", Plan::InStock),
            ("2", "90503", Plan::Fail),
            ("3", "90503", Plan::OutOfStock),
        ]);

        let outcomes = run_cycle(&catalog, &store, &fetcher, 1).await;
        assert!(matches!(outcomes[1].outcome, CheckOutcome::Skipped(_)));

        let store = store.read().await;
        assert!(store.get("1", "90503").unwrap().available);
        assert!(
            store.get("2", "90503").unwrap().available,
            "failed lookup must not overwrite the stored record"
        );
        assert!(!store.get("3", "90503").unwrap().available);
    }

    #[tokio::test]
    async fn unchanged_response_does_not_refire_across_cycles() {
        let catalog = RwLock::new(Catalog::from_products(vec![spec("1", "90503")]).unwrap());
        let store = RwLock::new(StatusStore::default());
        let fetcher = StubFetcher::new(vec![("1", "90503", Plan::InStock)]);

        let first = run_cycle(&catalog, &store, &fetcher, 1).await;
        assert!(matches!(first[0].outcome, CheckOutcome::Restocked(_)));

        let second = run_cycle(&catalog, &store, &fetcher, 1).await;
        assert!(matches!(second[0].outcome, CheckOutcome::NoChange(_)));
    }

    #[tokio::test]
    async fn restock_fires_after_out_of_stock_phase() {
        let catalog = RwLock::new(Catalog::from_products(vec![spec("1", "90503")]).unwrap());
        let store = RwLock::new(StatusStore::default());

        let out = StubFetcher::new(vec![("1", "90503", Plan::OutOfStock)]);
        let first = run_cycle(&catalog, &store, &out, 1).await;
        assert!(matches!(first[0].outcome, CheckOutcome::NoChange(_)));

        let back = StubFetcher::new(vec![("1", "90503", Plan::InStock)]);
        let second = run_cycle(&catalog, &store, &back, 1).await;
        assert!(matches!(second[0].outcome, CheckOutcome::Restocked(_)));
    }

    #[tokio::test]
    async fn fan_out_never_exceeds_the_configured_bound() {
        let products: Vec<ProductSpec> = (0..8).map(|i| spec(&format!("{i}"), "90503")).collect();
        let plan: Vec<(&str, &str, Plan)> = Vec::new();
        let catalog = RwLock::new(Catalog::from_products(products).unwrap());
        let store = RwLock::new(StatusStore::default());
        let fetcher = StubFetcher::new(plan);

        run_cycle(&catalog, &store, &fetcher, 2).await;
        assert!(fetcher.max_observed_in_flight() <= 2);
    }

    #[tokio::test]
    async fn zero_concurrency_is_floored_to_sequential() {
        let products: Vec<ProductSpec> = (0..4).map(|i| spec(&format!("{i}"), "90503")).collect();
        let catalog = RwLock::new(Catalog::from_products(products).unwrap());
        let store = RwLock::new(StatusStore::default());
        let fetcher = StubFetcher::new(vec![("0", "90503", Plan::InStock)]);

        let outcomes = run_cycle(&catalog, &store, &fetcher, 0).await;
        assert_eq!(outcomes.len(), 4);
        assert!(fetcher.max_observed_in_flight() <= 1);
    }
}
