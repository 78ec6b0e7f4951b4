//! Persistence interfaces consumed by the engine.
//!
//! The engine never talks to a database handle directly. It receives a
//! [`Repository`] at construction time and performs every read and write
//! inside [`Repository::atomically`], which hands out a `&mut dyn Store`
//! whose effects become visible together or not at all.
//!
//! Two implementations ship with the crate:
//!
//! - [`crate::db::SqliteRepository`]: SQLite on disk, one IMMEDIATE
//!   transaction per unit of work
//! - [`memory::MemoryRepository`]: mutex-guarded in-memory state with fault
//!   injection, for tests and embedding

use jiff::Timestamp;

use crate::{
    error::Result,
    models::{Check, Item, Order, OrderStatus, Plan, Point, Project, Route, Trigger, User},
    params::{CreateItem, CreatePoint, CreateProject, CreateRoute, CreateUser},
};

pub mod memory;

pub use memory::{FailPoint, MemoryRepository};

/// Fields of a plan before it has an identity.
#[derive(Debug, Clone)]
pub struct NewPlan {
    pub name: String,
    pub project_id: u64,
    pub route_id: u64,
    pub trigger: Trigger,
    pub assigner_id: Option<u64>,
    pub assignee_ids: Vec<u64>,
    pub created_at: Timestamp,
}

/// Fields of an order before it has an identity.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub plan_id: u64,
    pub status: OrderStatus,
    pub assigner_id: Option<u64>,
    pub created_at: Timestamp,
}

/// Fields of a check before it has an identity. Checks always start
/// `Pending`.
#[derive(Debug, Clone, Copy)]
pub struct NewCheck {
    pub order_id: u64,
    pub point_id: u64,
}

/// Read/write access to plans.
pub trait PlanStore {
    fn create_plan(&mut self, plan: NewPlan) -> Result<Plan>;

    /// Every plan, in id order.
    fn find_all_plans(&self) -> Result<Vec<Plan>>;

    fn find_plan(&self, id: u64) -> Result<Option<Plan>>;

    fn save_plan(&mut self, plan: &Plan) -> Result<()>;

    /// Returns false when no plan had that id.
    fn delete_plan(&mut self, id: u64) -> Result<bool>;
}

/// Read/write access to orders.
pub trait OrderStore {
    /// Persists a fresh order with zero checks and revision 0.
    fn create_order(&mut self, order: NewOrder) -> Result<Order>;

    /// Conditional update keyed on `order.revision`. On success the revision
    /// in `order` is bumped; a concurrent writer that got there first turns
    /// this into a `StateConflict`.
    fn save_order(&mut self, order: &mut Order) -> Result<()>;

    fn find_order(&self, id: u64) -> Result<Option<Order>>;

    fn list_orders(&self, plan_id: Option<u64>, status: Option<OrderStatus>)
        -> Result<Vec<Order>>;
}

/// Read/write access to checks.
pub trait CheckStore {
    fn create_check(&mut self, check: NewCheck) -> Result<Check>;

    fn find_check(&self, order_id: u64, point_id: u64) -> Result<Option<Check>>;

    fn save_check(&mut self, check: &Check) -> Result<()>;

    fn checks_for_order(&self, order_id: u64) -> Result<Vec<Check>>;
}

/// Routes and the points they visit.
pub trait RouteStore {
    /// The route with its points in walking order.
    fn find_route_with_points(&self, route_id: u64) -> Result<Option<Route>>;

    fn find_point(&self, id: u64) -> Result<Option<Point>>;

    fn create_point(&mut self, params: &CreatePoint) -> Result<Point>;

    /// Fails with `PointNotFound` if any listed point is unknown.
    fn create_route(&mut self, params: &CreateRoute) -> Result<Route>;
}

/// Inspection items and the points they are attached to.
pub trait ItemStore {
    fn create_item(&mut self, params: &CreateItem) -> Result<Item>;

    fn find_item(&self, id: u64) -> Result<Option<Item>>;

    fn save_item(&mut self, item: &Item) -> Result<()>;

    /// Also detaches the item from every point. Returns false when no item
    /// had that id.
    fn delete_item(&mut self, id: u64) -> Result<bool>;

    /// Items attached to a point, in id order.
    fn items_for_point(&self, point_id: u64) -> Result<Vec<Item>>;

    /// Attaching twice is a no-op.
    fn attach_item(&mut self, point_id: u64, item_id: u64) -> Result<()>;

    /// Returns false when the item was not attached.
    fn detach_item(&mut self, point_id: u64, item_id: u64) -> Result<bool>;
}

/// Projects and users.
pub trait DirectoryStore {
    fn create_project(&mut self, params: &CreateProject) -> Result<Project>;

    fn find_project(&self, id: u64) -> Result<Option<Project>>;

    fn create_user(&mut self, params: &CreateUser) -> Result<User>;

    fn find_user(&self, id: u64) -> Result<Option<User>>;
}

/// Everything a unit of work can touch.
pub trait Store:
    PlanStore + OrderStore + CheckStore + RouteStore + ItemStore + DirectoryStore
{
}

impl<T> Store for T where
    T: PlanStore + OrderStore + CheckStore + RouteStore + ItemStore + DirectoryStore
{
}

/// Source of atomic units of work.
pub trait Repository: Send + Sync + 'static {
    /// Runs `f` against the store. Writes made by `f` are published only if
    /// it returns `Ok`; on `Err` none of them are observable afterwards.
    fn atomically<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Store) -> Result<T>;
}
