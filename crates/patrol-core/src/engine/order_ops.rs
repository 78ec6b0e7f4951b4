//! Order operations for the Engine.
//!
//! Every transition reads the order, applies a [`lifecycle`] function and
//! saves it conditionally on the revision it read, all inside one unit of
//! work. Two callers racing on the same order cannot both win: the SQLite
//! store serializes them on its write lock and the loser sees the new
//! status, and any store without such a lock still rejects the stale
//! revision.

use log::info;
use serde::{Deserialize, Serialize};

use super::{lifecycle, Engine};
use crate::{
    access::Actor,
    error::{InspectionError, Result},
    models::{Check, CheckStatus, Order, OrderStatus},
    params::{AssignOrder, CompleteOrder, ConfirmCheck, Id, ListOrders},
    store::{Repository, Store},
};

/// Outcome of confirming one point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Confirmation {
    pub order: Order,
    pub check: Check,
    /// False when the point had already been confirmed before
    pub counted: bool,
}

fn find_order(store: &dyn Store, id: u64) -> Result<Order> {
    store
        .find_order(id)?
        .ok_or(InspectionError::OrderNotFound { id })
}

impl<R: Repository> Engine<R> {
    /// Retrieves an order by its ID.
    pub async fn get_order(&self, params: &Id) -> Result<Order> {
        let id = params.id;
        self.run(move |store| find_order(store, id)).await
    }

    /// Lists orders, optionally for one plan and/or in one status.
    pub async fn list_orders(&self, params: &ListOrders) -> Result<Vec<Order>> {
        let status = params
            .status
            .as_deref()
            .map(|s| {
                s.parse::<OrderStatus>()
                    .map_err(|reason| InspectionError::invalid_input("status").with_reason(reason))
            })
            .transpose()?;
        let plan_id = params.plan_id;

        self.run(move |store| store.list_orders(plan_id, status)).await
    }

    /// The checks of an order, in creation (route) order.
    pub async fn order_checks(&self, params: &Id) -> Result<Vec<Check>> {
        let id = params.id;
        self.run(move |store| {
            find_order(store, id)?;
            store.checks_for_order(id)
        })
        .await
    }

    /// Hands a pending order to an inspector. A user actor becomes the
    /// assigner if the order has none.
    pub async fn assign_order(&self, actor: Actor, params: &AssignOrder) -> Result<Order> {
        let order_id = params.order_id;
        let assignee_id = params.assignee_id;
        let assigner_id = match actor {
            Actor::User(id) => Some(id),
            Actor::System => None,
        };
        let now = self.now().timestamp();

        let order = self
            .run(move |store| {
                let mut order = find_order(store, order_id)?;
                if store.find_user(assignee_id)?.is_none() {
                    return Err(InspectionError::UserNotFound { id: assignee_id });
                }
                lifecycle::assign(&mut order, assignee_id, assigner_id, now)?;
                store.save_order(&mut order)?;
                Ok(order)
            })
            .await?;

        info!("Assigned order {order_id} to user {assignee_id}");
        Ok(order)
    }

    /// Starts field work on an assigned order.
    pub async fn start_order(&self, params: &Id) -> Result<Order> {
        let id = params.id;
        let now = self.now().timestamp();

        let order = self
            .run(move |store| {
                let mut order = find_order(store, id)?;
                lifecycle::start(&mut order, now)?;
                store.save_order(&mut order)?;
                Ok(order)
            })
            .await?;

        info!("Started order {id}");
        Ok(order)
    }

    /// Records the result for one point of an in-progress order.
    pub async fn confirm_check(&self, params: &ConfirmCheck) -> Result<Confirmation> {
        let status = params
            .status
            .parse::<CheckStatus>()
            .map_err(|reason| InspectionError::invalid_input("status").with_reason(reason))?;
        let order_id = params.order_id;
        let point_id = params.point_id;
        let comment = params.comment.clone();
        let now = self.now().timestamp();

        let confirmation = self
            .run(move |store| {
                let mut order = find_order(store, order_id)?;
                lifecycle::require_status(&order, OrderStatus::InProgress, "confirm a point on")?;
                let mut check = store
                    .find_check(order_id, point_id)?
                    .ok_or(InspectionError::CheckNotFound { order_id, point_id })?;

                let counted = lifecycle::confirm(&mut order, &mut check, status, comment, now)?;
                store.save_check(&check)?;
                store.save_order(&mut order)?;
                Ok(Confirmation {
                    order,
                    check,
                    counted,
                })
            })
            .await?;

        info!(
            "Confirmed point {point_id} on order {order_id} as {} ({}/{})",
            confirmation.check.status.as_str(),
            confirmation.order.completed_checks,
            confirmation.order.total_checks
        );
        Ok(confirmation)
    }

    /// Closes an in-progress order whose checks are all confirmed.
    pub async fn complete_order(&self, params: &CompleteOrder) -> Result<Order> {
        let id = params.order_id;
        let inspection_data = params.inspection_data.clone();
        let now = self.now().timestamp();

        let order = self
            .run(move |store| {
                let mut order = find_order(store, id)?;
                lifecycle::complete(&mut order, inspection_data, now)?;
                store.save_order(&mut order)?;
                Ok(order)
            })
            .await?;

        info!("Completed order {id}");
        Ok(order)
    }
}
