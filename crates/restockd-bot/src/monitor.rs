//! Periodic monitoring driver.
//!
//! Registers a repeating scheduler job that runs one reconciliation cycle
//! over the catalog and posts a channel alert for every product that came
//! back in stock.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use restockd_core::{Catalog, StatusStore};
use restockd_engine::{restock_alert, run_cycle, CheckOutcome};
use restockd_lookup::StockClient;

use crate::sink::ChannelSink;

/// Shared handles for monitoring cycles and command dispatch.
#[derive(Clone)]
pub struct MonitorContext {
    pub catalog: Arc<RwLock<Catalog>>,
    pub store: Arc<RwLock<StatusStore>>,
    pub client: StockClient,
    pub sink: ChannelSink,
    pub max_concurrent: usize,
    cycle_guard: Arc<Mutex<()>>,
}

impl MonitorContext {
    #[must_use]
    pub fn new(
        catalog: Arc<RwLock<Catalog>>,
        store: Arc<RwLock<StatusStore>>,
        client: StockClient,
        sink: ChannelSink,
        max_concurrent: usize,
    ) -> Self {
        MonitorContext {
            catalog,
            store,
            client,
            sink,
            max_concurrent,
            cycle_guard: Arc::new(Mutex::new(())),
        }
    }
}

/// Builds and starts the scheduler with the repeating monitoring job.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process; dropping it shuts down the job.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    ctx: MonitorContext,
    interval_secs: u64,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_repeated_async(Duration::from_secs(interval_secs), move |_uuid, _lock| {
        let ctx = ctx.clone();
        Box::pin(async move {
            run_monitor_tick(ctx).await;
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

/// One scheduler tick. The cycle runs in its own task so a panic inside
/// it is contained and logged instead of poisoning the scheduler.
async fn run_monitor_tick(ctx: MonitorContext) {
    let cycle = tokio::spawn(async move { run_monitor_cycle(&ctx).await });
    if let Err(error) = cycle.await {
        tracing::error!(error = %error, "monitoring cycle task failed");
    }
}

/// Runs one monitoring cycle and alerts on every restock transition.
///
/// If a previous cycle is still in flight the tick is skipped rather than
/// queued, so a slow provider cannot pile up overlapping cycles.
pub async fn run_monitor_cycle(ctx: &MonitorContext) {
    let Ok(_guard) = ctx.cycle_guard.try_lock() else {
        tracing::warn!("previous monitoring cycle still running; skipping this tick");
        return;
    };

    let products = ctx.catalog.read().await.len();
    tracing::info!(products, "starting monitoring cycle");

    let outcomes = run_cycle(&ctx.catalog, &ctx.store, &ctx.client, ctx.max_concurrent).await;

    let mut restocked = 0_usize;
    let mut unchanged = 0_usize;
    let mut skipped = 0_usize;
    for outcome in &outcomes {
        match &outcome.outcome {
            CheckOutcome::Restocked(record) => {
                restocked += 1;
                let alert = restock_alert(&outcome.product, record);
                match ctx.sink.send(&alert).await {
                    Ok(()) => tracing::info!(
                        name = %outcome.product.name,
                        sku = %outcome.product.sku,
                        zip_code = %outcome.product.zip_code,
                        stores = record.stores.len(),
                        "restock alert sent"
                    ),
                    Err(error) => tracing::error!(
                        sku = %outcome.product.sku,
                        zip_code = %outcome.product.zip_code,
                        error = %error,
                        "failed to send restock alert"
                    ),
                }
            }
            CheckOutcome::NoChange(_) => unchanged += 1,
            CheckOutcome::Skipped(_) => skipped += 1,
        }
    }

    tracing::info!(restocked, unchanged, skipped, "monitoring cycle complete");
}
