//! Materializes a fired plan into an order with one check per route point.

use jiff::Timestamp;
use log::debug;

use crate::{
    error::{InspectionError, Result},
    models::{Order, OrderStatus, Plan},
    store::{NewCheck, NewOrder, Store},
};

/// Creates the order for one firing of `plan`.
///
/// Runs inside the caller's unit of work. Any store failure is returned as
/// is and leaves the rest of the sequence unexecuted; the enclosing unit
/// discards whatever was already written.
pub fn create_order(store: &mut dyn Store, plan: &Plan, now: Timestamp) -> Result<Order> {
    let route = store
        .find_route_with_points(plan.route_id)?
        .ok_or(InspectionError::RouteNotFound { id: plan.route_id })?;

    let status = if plan.assigner_id.is_some() {
        OrderStatus::Assigned
    } else {
        OrderStatus::Pending
    };

    let mut order = store.create_order(NewOrder {
        plan_id: plan.id,
        status,
        assigner_id: plan.assigner_id,
        created_at: now,
    })?;

    for point in &route.points {
        store.create_check(NewCheck {
            order_id: order.id,
            point_id: point.id,
        })?;
    }

    order.total_checks = u32::try_from(route.points.len()).map_err(|_| InspectionError::Store {
        message: format!("route {} has too many points", route.id),
    })?;
    order.updated_at = now;
    store.save_order(&mut order)?;

    debug!(
        "Created order {} for plan {} with {} checks",
        order.id, plan.id, order.total_checks
    );
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{CheckStatus, Trigger},
        params::{CreatePoint, CreateRoute},
        store::{FailPoint, MemoryRepository, Repository},
    };

    fn seed(repo: &MemoryRepository, points: usize, assigner_id: Option<u64>) -> Plan {
        repo.atomically(|store| {
            let mut point_ids = Vec::new();
            for i in 0..points {
                let point = store.create_point(&CreatePoint {
                    name: format!("Valve {i}"),
                    location: None,
                    description: None,
                })?;
                point_ids.push(point.id);
            }
            let route = store.create_route(&CreateRoute {
                name: "Plant floor".to_string(),
                project_id: 1,
                description: None,
                point_ids,
            })?;
            store.create_plan(crate::store::NewPlan {
                name: "Monthly walk".to_string(),
                project_id: 1,
                route_id: route.id,
                trigger: Trigger::Manual,
                assigner_id,
                assignee_ids: vec![],
                created_at: Timestamp::UNIX_EPOCH,
            })
        })
        .unwrap()
    }

    #[test]
    fn test_one_check_per_point() {
        let repo = MemoryRepository::new();
        let plan = seed(&repo, 3, None);

        let (order, checks) = repo
            .atomically(|store| {
                let order = create_order(store, &plan, Timestamp::UNIX_EPOCH)?;
                let checks = store.checks_for_order(order.id)?;
                Ok((order, checks))
            })
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_checks, 3);
        assert_eq!(order.completed_checks, 0);
        assert_eq!(checks.len(), 3);
        assert!(checks.iter().all(|c| c.status == CheckStatus::Pending));

        let mut points: Vec<u64> = checks.iter().map(|c| c.point_id).collect();
        points.sort_unstable();
        points.dedup();
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn test_assigner_starts_order_assigned() {
        let repo = MemoryRepository::new();
        let plan = seed(&repo, 1, Some(7));

        let order = repo
            .atomically(|store| create_order(store, &plan, Timestamp::UNIX_EPOCH))
            .unwrap();
        assert_eq!(order.status, OrderStatus::Assigned);
        assert_eq!(order.assigner_id, Some(7));
        assert_eq!(order.assignee_id, None);
    }

    #[test]
    fn test_empty_route_yields_zero_checks() {
        let repo = MemoryRepository::new();
        let plan = seed(&repo, 0, None);

        let order = repo
            .atomically(|store| create_order(store, &plan, Timestamp::UNIX_EPOCH))
            .unwrap();
        assert_eq!(order.total_checks, 0);
    }

    #[test]
    fn test_missing_route() {
        let repo = MemoryRepository::new();
        let mut plan = seed(&repo, 1, None);
        plan.route_id = 999;

        let err = repo
            .atomically(|store| create_order(store, &plan, Timestamp::UNIX_EPOCH))
            .unwrap_err();
        assert!(matches!(err, InspectionError::RouteNotFound { id: 999 }));
    }

    #[test]
    fn test_check_failure_discards_order() {
        let repo = MemoryRepository::new();
        let plan = seed(&repo, 2, None);
        repo.fail_on(FailPoint::CreateCheck);

        assert!(repo
            .atomically(|store| create_order(store, &plan, Timestamp::UNIX_EPOCH))
            .is_err());

        let orders = repo.atomically(|store| store.list_orders(None, None)).unwrap();
        assert!(orders.is_empty());
    }
}
