//! One pass of the periodic evaluation over every plan.
//!
//! Each plan that fires is handled in its own unit of work: the order, its
//! checks and the plan's new last-triggered timestamp are committed together
//! or not at all. A plan that fails is logged and recorded in the report,
//! and the sweep moves on to the next one. Since a failed firing leaves the
//! timestamp untouched, the next sweep in the same window tries again.

use jiff::{Timestamp, Zoned};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use super::{factory, trigger, Engine};
use crate::{
    error::Result,
    models::Order,
    store::{Repository, Store},
};

/// A plan that fired during a sweep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Firing {
    pub plan_id: u64,
    pub order_id: u64,
}

/// A plan whose firing failed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SweepFailure {
    pub plan_id: u64,
    pub error: String,
}

/// What a sweep did.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SweepReport {
    /// Instant the sweep evaluated against
    pub at: Timestamp,
    /// Number of plans loaded
    pub evaluated: usize,
    pub fired: Vec<Firing>,
    /// Plans that were due but had already fired that day
    pub skipped: Vec<u64>,
    pub failed: Vec<SweepFailure>,
}

impl SweepReport {
    fn new(at: Timestamp) -> Self {
        Self {
            at,
            evaluated: 0,
            fired: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
        }
    }
}

/// Fires one plan if it is still due, inside the caller's unit of work.
///
/// The plan is re-read so a concurrent sweep or manual trigger that already
/// fired it today is observed. Returns `None` when there was nothing to do.
fn fire_if_due(store: &mut dyn Store, plan_id: u64, now: &Zoned) -> Result<Option<Order>> {
    let Some(mut plan) = store.find_plan(plan_id)? else {
        return Ok(None);
    };
    if !trigger::should_trigger(&plan, now) || trigger::fired_on_same_day(&plan, now) {
        return Ok(None);
    }

    let at = now.timestamp();
    let order = factory::create_order(store, &plan, at)?;
    plan.last_triggered_at = Some(at);
    plan.updated_at = at;
    store.save_plan(&plan)?;
    Ok(Some(order))
}

impl<R: Repository> Engine<R> {
    /// Runs one sweep at the clock's current instant.
    pub async fn sweep(&self) -> Result<SweepReport> {
        self.sweep_at(self.now()).await
    }

    /// Runs one sweep as of `now`.
    ///
    /// Only a failure to load the plans fails the sweep as a whole.
    pub async fn sweep_at(&self, now: Zoned) -> Result<SweepReport> {
        let mut report = SweepReport::new(now.timestamp());
        let plans = self.run(|store| store.find_all_plans()).await?;
        report.evaluated = plans.len();
        info!("Sweeping {} plans at {now}", plans.len());

        for plan in plans {
            if !trigger::should_trigger(&plan, &now) {
                continue;
            }
            if trigger::fired_on_same_day(&plan, &now) {
                debug!("Plan {} already fired today, skipping", plan.id);
                report.skipped.push(plan.id);
                continue;
            }

            let plan_id = plan.id;
            let at = now.clone();
            match self.run(move |store| fire_if_due(store, plan_id, &at)).await {
                Ok(Some(order)) => {
                    info!("Plan {plan_id} fired, created order {}", order.id);
                    report.fired.push(Firing {
                        plan_id,
                        order_id: order.id,
                    });
                }
                Ok(None) => {
                    debug!("Plan {plan_id} no longer due, skipping");
                    report.skipped.push(plan_id);
                }
                Err(e) => {
                    error!("Plan {plan_id} failed to fire: {e}");
                    report.failed.push(SweepFailure {
                        plan_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Sweep finished: {} fired, {} skipped, {} failed",
            report.fired.len(),
            report.skipped.len(),
            report.failed.len()
        );
        Ok(report)
    }
}
