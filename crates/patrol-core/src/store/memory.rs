//! In-memory repository.
//!
//! All state sits behind one mutex, so units of work are fully serialized.
//! A unit runs against a copy of the state which replaces the original only
//! when the unit succeeds.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Mutex, PoisonError},
};

use super::{
    CheckStore, DirectoryStore, ItemStore, NewCheck, NewOrder, NewPlan, OrderStore, PlanStore,
    Repository, RouteStore, Store,
};
use crate::{
    access::{project_access, AccessControl},
    error::{InspectionError, Result},
    models::{Check, CheckStatus, Item, Order, OrderStatus, Plan, Point, Project, Route, User},
    params::{CreateItem, CreatePoint, CreateProject, CreateRoute, CreateUser},
};

/// Store operations that can be made to fail on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailPoint {
    CreateOrder,
    CreateCheck,
    SaveOrder,
    SavePlan,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    next_id: u64,
    plans: BTreeMap<u64, Plan>,
    orders: BTreeMap<u64, Order>,
    checks: BTreeMap<u64, Check>,
    points: BTreeMap<u64, Point>,
    routes: BTreeMap<u64, Route>,
    items: BTreeMap<u64, Item>,
    /// (point_id, item_id) pairs
    point_items: BTreeSet<(u64, u64)>,
    projects: BTreeMap<u64, Project>,
    users: BTreeMap<u64, User>,
    fail_on: Vec<FailPoint>,
}

impl MemoryState {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn fault(&self, point: FailPoint) -> Result<()> {
        if self.fail_on.contains(&point) {
            Err(InspectionError::Store {
                message: format!("injected failure at {point:?}"),
            })
        } else {
            Ok(())
        }
    }
}

/// Repository that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    state: Mutex<MemoryState>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call of the given operation fail with a store
    /// error until [`MemoryRepository::clear_failures`] is called.
    pub fn fail_on(&self, point: FailPoint) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !state.fail_on.contains(&point) {
            state.fail_on.push(point);
        }
    }

    pub fn clear_failures(&self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_on
            .clear();
    }
}

impl Repository for MemoryRepository {
    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Store) -> Result<T>,
    {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let mut working = guard.clone();
        let value = f(&mut working)?;
        *guard = working;
        Ok(value)
    }
}

impl AccessControl for MemoryRepository {
    fn has_project_access(&self, subject_id: u64, project_id: u64) -> Result<bool> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(project_access(state.users.get(&subject_id), project_id))
    }
}

impl PlanStore for MemoryState {
    fn create_plan(&mut self, plan: NewPlan) -> Result<Plan> {
        let id = self.allocate_id();
        let plan = Plan {
            id,
            name: plan.name,
            project_id: plan.project_id,
            route_id: plan.route_id,
            trigger: plan.trigger,
            assigner_id: plan.assigner_id,
            assignee_ids: plan.assignee_ids,
            last_triggered_at: None,
            created_at: plan.created_at,
            updated_at: plan.created_at,
        };
        self.plans.insert(id, plan.clone());
        Ok(plan)
    }

    fn find_all_plans(&self) -> Result<Vec<Plan>> {
        Ok(self.plans.values().cloned().collect())
    }

    fn find_plan(&self, id: u64) -> Result<Option<Plan>> {
        Ok(self.plans.get(&id).cloned())
    }

    fn save_plan(&mut self, plan: &Plan) -> Result<()> {
        self.fault(FailPoint::SavePlan)?;
        match self.plans.get_mut(&plan.id) {
            Some(slot) => {
                *slot = plan.clone();
                Ok(())
            }
            None => Err(InspectionError::PlanNotFound { id: plan.id }),
        }
    }

    fn delete_plan(&mut self, id: u64) -> Result<bool> {
        Ok(self.plans.remove(&id).is_some())
    }
}

impl OrderStore for MemoryState {
    fn create_order(&mut self, order: NewOrder) -> Result<Order> {
        self.fault(FailPoint::CreateOrder)?;
        let id = self.allocate_id();
        let order = Order {
            id,
            plan_id: order.plan_id,
            status: order.status,
            assigner_id: order.assigner_id,
            assignee_id: None,
            started_at: None,
            ended_at: None,
            inspection_data: None,
            completed_checks: 0,
            total_checks: 0,
            revision: 0,
            created_at: order.created_at,
            updated_at: order.created_at,
        };
        self.orders.insert(id, order.clone());
        Ok(order)
    }

    fn save_order(&mut self, order: &mut Order) -> Result<()> {
        self.fault(FailPoint::SaveOrder)?;
        let stored = self
            .orders
            .get_mut(&order.id)
            .ok_or(InspectionError::OrderNotFound { id: order.id })?;
        if stored.revision != order.revision {
            return Err(InspectionError::state_conflict(
                order.id,
                "order was modified concurrently",
            ));
        }
        order.revision += 1;
        *stored = order.clone();
        Ok(())
    }

    fn find_order(&self, id: u64) -> Result<Option<Order>> {
        Ok(self.orders.get(&id).cloned())
    }

    fn list_orders(
        &self,
        plan_id: Option<u64>,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>> {
        Ok(self
            .orders
            .values()
            .filter(|o| plan_id.map_or(true, |p| o.plan_id == p))
            .filter(|o| status.map_or(true, |s| o.status == s))
            .cloned()
            .collect())
    }
}

impl CheckStore for MemoryState {
    fn create_check(&mut self, check: NewCheck) -> Result<Check> {
        self.fault(FailPoint::CreateCheck)?;
        if self.find_check(check.order_id, check.point_id)?.is_some() {
            return Err(InspectionError::Store {
                message: format!(
                    "duplicate check for point {} on order {}",
                    check.point_id, check.order_id
                ),
            });
        }
        let id = self.allocate_id();
        let check = Check {
            id,
            order_id: check.order_id,
            point_id: check.point_id,
            status: CheckStatus::Pending,
            comment: None,
            checked_at: None,
        };
        self.checks.insert(id, check.clone());
        Ok(check)
    }

    fn find_check(&self, order_id: u64, point_id: u64) -> Result<Option<Check>> {
        Ok(self
            .checks
            .values()
            .find(|c| c.order_id == order_id && c.point_id == point_id)
            .cloned())
    }

    fn save_check(&mut self, check: &Check) -> Result<()> {
        match self.checks.get_mut(&check.id) {
            Some(slot) => {
                *slot = check.clone();
                Ok(())
            }
            None => Err(InspectionError::CheckNotFound {
                order_id: check.order_id,
                point_id: check.point_id,
            }),
        }
    }

    fn checks_for_order(&self, order_id: u64) -> Result<Vec<Check>> {
        Ok(self
            .checks
            .values()
            .filter(|c| c.order_id == order_id)
            .cloned()
            .collect())
    }
}

impl RouteStore for MemoryState {
    fn find_route_with_points(&self, route_id: u64) -> Result<Option<Route>> {
        Ok(self.routes.get(&route_id).cloned())
    }

    fn find_point(&self, id: u64) -> Result<Option<Point>> {
        Ok(self.points.get(&id).cloned())
    }

    fn create_point(&mut self, params: &CreatePoint) -> Result<Point> {
        let point = Point {
            id: self.allocate_id(),
            name: params.name.clone(),
            location: params.location.clone(),
            description: params.description.clone(),
        };
        self.points.insert(point.id, point.clone());
        Ok(point)
    }

    fn create_route(&mut self, params: &CreateRoute) -> Result<Route> {
        let points = params
            .point_ids
            .iter()
            .map(|id| {
                self.points
                    .get(id)
                    .cloned()
                    .ok_or(InspectionError::PointNotFound { id: *id })
            })
            .collect::<Result<Vec<_>>>()?;
        let route = Route {
            id: self.allocate_id(),
            name: params.name.clone(),
            project_id: params.project_id,
            description: params.description.clone(),
            points,
        };
        self.routes.insert(route.id, route.clone());
        Ok(route)
    }
}

impl ItemStore for MemoryState {
    fn create_item(&mut self, params: &CreateItem) -> Result<Item> {
        let item = Item {
            id: self.allocate_id(),
            title: params.title.clone(),
            details: params.details.clone(),
            execution_method: params.execution_method.clone(),
        };
        self.items.insert(item.id, item.clone());
        Ok(item)
    }

    fn find_item(&self, id: u64) -> Result<Option<Item>> {
        Ok(self.items.get(&id).cloned())
    }

    fn save_item(&mut self, item: &Item) -> Result<()> {
        match self.items.get_mut(&item.id) {
            Some(slot) => {
                *slot = item.clone();
                Ok(())
            }
            None => Err(InspectionError::ItemNotFound { id: item.id }),
        }
    }

    fn delete_item(&mut self, id: u64) -> Result<bool> {
        self.point_items.retain(|(_, item_id)| *item_id != id);
        Ok(self.items.remove(&id).is_some())
    }

    fn items_for_point(&self, point_id: u64) -> Result<Vec<Item>> {
        Ok(self
            .point_items
            .iter()
            .filter(|(p, _)| *p == point_id)
            .filter_map(|(_, item_id)| self.items.get(item_id).cloned())
            .collect())
    }

    fn attach_item(&mut self, point_id: u64, item_id: u64) -> Result<()> {
        self.point_items.insert((point_id, item_id));
        Ok(())
    }

    fn detach_item(&mut self, point_id: u64, item_id: u64) -> Result<bool> {
        Ok(self.point_items.remove(&(point_id, item_id)))
    }
}

impl DirectoryStore for MemoryState {
    fn create_project(&mut self, params: &CreateProject) -> Result<Project> {
        let project = Project {
            id: self.allocate_id(),
            name: params.name.clone(),
            parent_id: params.parent_id,
        };
        self.projects.insert(project.id, project.clone());
        Ok(project)
    }

    fn find_project(&self, id: u64) -> Result<Option<Project>> {
        Ok(self.projects.get(&id).cloned())
    }

    fn create_user(&mut self, params: &CreateUser) -> Result<User> {
        let user = User {
            id: self.allocate_id(),
            username: params.username.clone(),
            project_id: params.project_id,
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    fn find_user(&self, id: u64) -> Result<Option<User>> {
        Ok(self.users.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;

    fn new_order() -> NewOrder {
        NewOrder {
            plan_id: 1,
            status: OrderStatus::Pending,
            assigner_id: None,
            created_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_failed_unit_leaves_no_trace() {
        let repo = MemoryRepository::new();
        repo.fail_on(FailPoint::CreateCheck);

        let result = repo.atomically(|store| {
            let order = store.create_order(new_order())?;
            store.create_check(NewCheck {
                order_id: order.id,
                point_id: 10,
            })?;
            Ok(order)
        });
        assert!(result.is_err());

        let orders = repo
            .atomically(|store| store.list_orders(None, None))
            .expect("list orders");
        assert!(orders.is_empty());
    }

    #[test]
    fn test_fault_persists_until_cleared() {
        let repo = MemoryRepository::new();
        repo.fail_on(FailPoint::CreateOrder);
        assert!(repo.atomically(|s| s.create_order(new_order())).is_err());
        assert!(repo.atomically(|s| s.create_order(new_order())).is_err());

        repo.clear_failures();
        assert!(repo.atomically(|s| s.create_order(new_order())).is_ok());
    }

    #[test]
    fn test_save_order_rejects_stale_revision() {
        let repo = MemoryRepository::new();
        let order = repo.atomically(|s| s.create_order(new_order())).unwrap();

        let mut first = order.clone();
        first.status = OrderStatus::Assigned;
        repo.atomically(|s| s.save_order(&mut first)).unwrap();
        assert_eq!(first.revision, 1);

        let mut stale = order;
        stale.status = OrderStatus::Assigned;
        let err = repo.atomically(|s| s.save_order(&mut stale)).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::StateConflict);
    }

    #[test]
    fn test_duplicate_check_rejected() {
        let repo = MemoryRepository::new();
        let check = NewCheck {
            order_id: 1,
            point_id: 2,
        };
        repo.atomically(|s| s.create_check(check)).unwrap();
        assert!(repo.atomically(|s| s.create_check(check)).is_err());
    }

    #[test]
    fn test_deleting_item_detaches_it() {
        let repo = MemoryRepository::new();
        let item = repo
            .atomically(|s| {
                let item = s.create_item(&CreateItem {
                    title: "Gauge".into(),
                    details: None,
                    execution_method: "reading".into(),
                })?;
                s.attach_item(7, item.id)?;
                Ok(item)
            })
            .unwrap();
        assert_eq!(repo.atomically(|s| s.items_for_point(7)).unwrap(), vec![item.clone()]);

        assert!(repo.atomically(|s| s.delete_item(item.id)).unwrap());
        assert!(repo.atomically(|s| s.items_for_point(7)).unwrap().is_empty());
        assert!(!repo.atomically(|s| s.detach_item(7, item.id)).unwrap());
    }

    #[test]
    fn test_route_requires_known_points() {
        let repo = MemoryRepository::new();
        let err = repo
            .atomically(|s| {
                s.create_route(&CreateRoute {
                    name: "North loop".into(),
                    project_id: 1,
                    description: None,
                    point_ids: vec![42],
                })
            })
            .unwrap_err();
        assert!(matches!(err, InspectionError::PointNotFound { id: 42 }));
    }
}
