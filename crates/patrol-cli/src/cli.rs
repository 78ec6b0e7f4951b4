//! Subcommand definitions and their handlers.
//!
//! Every command has a clap argument struct that converts into the matching
//! `patrol_core::params` type with a `From` impl, so core parameters stay
//! free of clap derives:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Engine
//! ```
//!
//! [`Cli`] holds the engine, the renderer and the acting identity and
//! dispatches each subcommand.

use std::{fmt, time::Duration};

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use jiff::civil::Time;
use log::info;
use patrol_core::{
    display::{
        Checks, CreateResult, DeleteResult, Items, OperationStatus, Orders, Plans, UpdateResult,
    },
    params::*,
    Actor, Engine, Scheduler, SweepSchedule,
};
use serde::Serialize;

use crate::renderer::TerminalRenderer;

// ============================================================================
// Value enums
// ============================================================================

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum TriggerKindArg {
    /// Fire on a day of the month (1-31)
    Monthly,
    /// Fire on a day of the week (0 = Sunday .. 6 = Saturday)
    Weekly,
    /// Only fire with `plan trigger`
    Manual,
}

impl fmt::Display for TriggerKindArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerKindArg::Monthly => write!(f, "monthly"),
            TriggerKindArg::Weekly => write!(f, "weekly"),
            TriggerKindArg::Manual => write!(f, "manual"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum OrderStatusArg {
    Pending,
    Assigned,
    InProgress,
    Completed,
}

impl fmt::Display for OrderStatusArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatusArg::Pending => write!(f, "pending"),
            OrderStatusArg::Assigned => write!(f, "assigned"),
            OrderStatusArg::InProgress => write!(f, "in_progress"),
            OrderStatusArg::Completed => write!(f, "completed"),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum CheckStatusArg {
    /// The point is fine
    Passed,
    /// The point needs attention
    Failed,
}

impl fmt::Display for CheckStatusArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatusArg::Passed => write!(f, "passed"),
            CheckStatusArg::Failed => write!(f, "failed"),
        }
    }
}

// ============================================================================
// Directory commands
// ============================================================================

/// Create a project
#[derive(Args)]
pub struct CreateProjectArgs {
    pub name: String,
    /// Parent project
    #[arg(long)]
    pub parent: Option<u64>,
}

impl From<CreateProjectArgs> for CreateProject {
    fn from(val: CreateProjectArgs) -> Self {
        CreateProject {
            name: val.name,
            parent_id: val.parent,
        }
    }
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Create a project
    #[command(alias = "c")]
    Create(CreateProjectArgs),
}

/// Register a user
#[derive(Args)]
pub struct CreateUserArgs {
    pub username: String,
    /// Project the user belongs to. Omit to register an administrator
    #[arg(long)]
    pub project: Option<u64>,
}

impl From<CreateUserArgs> for CreateUser {
    fn from(val: CreateUserArgs) -> Self {
        CreateUser {
            username: val.username,
            project_id: val.project,
        }
    }
}

#[derive(Args)]
pub struct ShowArgs {
    #[arg(help = "Unique identifier of the resource to show")]
    pub id: u64,
}

impl From<ShowArgs> for Id {
    fn from(val: ShowArgs) -> Self {
        Id { id: val.id }
    }
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a user
    #[command(alias = "c")]
    Create(CreateUserArgs),
    /// Show a user
    #[command(alias = "s")]
    Show(ShowArgs),
}

/// Create an inspection point
#[derive(Args)]
pub struct CreatePointArgs {
    pub name: String,
    /// Where the point is, e.g. "Building 2, basement"
    #[arg(short, long)]
    pub location: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
}

impl From<CreatePointArgs> for CreatePoint {
    fn from(val: CreatePointArgs) -> Self {
        CreatePoint {
            name: val.name,
            location: val.location,
            description: val.description,
        }
    }
}

#[derive(Subcommand)]
pub enum PointCommands {
    /// Create an inspection point
    #[command(alias = "c")]
    Create(CreatePointArgs),
    /// List the inspection items attached to a point
    Items(ShowArgs),
}

/// Create an inspection item
#[derive(Args)]
pub struct CreateItemArgs {
    pub title: String,
    /// How the item is carried out, e.g. "visual" or "meter reading"
    #[arg(short, long)]
    pub method: String,
    #[arg(short, long)]
    pub details: Option<String>,
}

impl From<CreateItemArgs> for CreateItem {
    fn from(val: CreateItemArgs) -> Self {
        CreateItem {
            title: val.title,
            details: val.details,
            execution_method: val.method,
        }
    }
}

/// Update an inspection item
#[derive(Args)]
pub struct UpdateItemArgs {
    pub id: u64,
    #[arg(long)]
    pub title: Option<String>,
    /// New details; pass an empty string to clear them
    #[arg(long)]
    pub details: Option<String>,
    #[arg(long)]
    pub method: Option<String>,
}

impl UpdateItemArgs {
    fn changes(&self) -> Vec<String> {
        let mut changes = Vec::new();
        if let Some(title) = &self.title {
            changes.push(format!("Renamed to '{title}'"));
        }
        if self.details.is_some() {
            changes.push("Changed details".to_string());
        }
        if let Some(method) = &self.method {
            changes.push(format!("Set method to '{method}'"));
        }
        changes
    }
}

impl From<UpdateItemArgs> for UpdateItem {
    fn from(val: UpdateItemArgs) -> Self {
        UpdateItem {
            id: val.id,
            title: val.title,
            details: val.details,
            execution_method: val.method,
        }
    }
}

/// Delete an inspection item and detach it from every point
#[derive(Args)]
pub struct DeleteItemArgs {
    pub id: u64,
    /// Confirm the deletion (required to prevent accidental deletion)
    #[arg(long)]
    pub confirm: bool,
}

/// An item together with a point
#[derive(Args)]
pub struct PointItemArgs {
    pub item_id: u64,
    #[arg(long)]
    pub point: u64,
}

impl From<PointItemArgs> for PointItem {
    fn from(val: PointItemArgs) -> Self {
        PointItem {
            point_id: val.point,
            item_id: val.item_id,
        }
    }
}

#[derive(Subcommand)]
pub enum ItemCommands {
    /// Create an inspection item
    #[command(alias = "c")]
    Create(CreateItemArgs),
    /// Show an inspection item
    #[command(alias = "s")]
    Show(ShowArgs),
    /// Update an inspection item
    #[command(alias = "u")]
    Update(UpdateItemArgs),
    /// Delete an inspection item
    Delete(DeleteItemArgs),
    /// Attach an item to a point
    Attach(PointItemArgs),
    /// Detach an item from a point
    Detach(PointItemArgs),
}

/// Create a route over existing points
#[derive(Args)]
pub struct CreateRouteArgs {
    pub name: String,
    #[arg(long)]
    pub project: u64,
    /// Points in walking order, comma-separated
    #[arg(long, value_delimiter = ',', required = true)]
    pub points: Vec<u64>,
    #[arg(short, long)]
    pub description: Option<String>,
}

impl From<CreateRouteArgs> for CreateRoute {
    fn from(val: CreateRouteArgs) -> Self {
        CreateRoute {
            name: val.name,
            project_id: val.project,
            description: val.description,
            point_ids: val.points,
        }
    }
}

#[derive(Subcommand)]
pub enum RouteCommands {
    /// Create a route
    #[command(alias = "c")]
    Create(CreateRouteArgs),
    /// Show a route with its points
    #[command(alias = "s")]
    Show(ShowArgs),
}

// ============================================================================
// Plan commands
// ============================================================================

/// Create an inspection plan
#[derive(Args)]
pub struct CreatePlanArgs {
    pub name: String,
    #[arg(long)]
    pub project: u64,
    #[arg(long)]
    pub route: u64,
    #[arg(long, value_enum)]
    pub trigger: TriggerKindArg,
    /// Day of month (1-31) or day of week (0-6, 0 = Sunday)
    #[arg(long, default_value_t = 0)]
    pub day: i64,
    /// Default assigner; fired orders start out assigned
    #[arg(long)]
    pub assigner: Option<u64>,
    /// Eligible inspectors, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub assignees: Vec<u64>,
}

impl From<CreatePlanArgs> for CreatePlan {
    fn from(val: CreatePlanArgs) -> Self {
        CreatePlan {
            name: val.name,
            project_id: val.project,
            route_id: val.route,
            trigger_kind: val.trigger.to_string(),
            trigger_day: val.day,
            assigner_id: val.assigner,
            assignee_ids: val.assignees,
        }
    }
}

/// List plans
#[derive(Args)]
pub struct ListPlansArgs {
    /// Only plans of this project
    #[arg(long)]
    pub project: Option<u64>,
}

impl From<ListPlansArgs> for ListPlans {
    fn from(val: ListPlansArgs) -> Self {
        ListPlans {
            project_id: val.project,
        }
    }
}

/// Change a plan. Options that are not given keep their value
#[derive(Args)]
pub struct UpdatePlanArgs {
    pub id: u64,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub route: Option<u64>,
    #[arg(long, value_enum)]
    pub trigger: Option<TriggerKindArg>,
    #[arg(long)]
    pub day: Option<i64>,
    #[arg(long, conflicts_with = "clear_assigner")]
    pub assigner: Option<u64>,
    /// Remove the default assigner
    #[arg(long)]
    pub clear_assigner: bool,
    /// Replace the eligible inspectors, comma-separated
    #[arg(long, value_delimiter = ',')]
    pub assignees: Option<Vec<u64>>,
}

impl UpdatePlanArgs {
    /// Human readable list of the requested changes.
    fn changes(&self) -> Vec<String> {
        let mut changes = Vec::new();
        if let Some(name) = &self.name {
            changes.push(format!("Renamed to '{name}'"));
        }
        if let Some(route) = self.route {
            changes.push(format!("Moved to route {route}"));
        }
        if self.trigger.is_some() || self.day.is_some() {
            changes.push("Changed trigger".to_string());
        }
        if self.clear_assigner {
            changes.push("Removed default assigner".to_string());
        } else if let Some(assigner) = self.assigner {
            changes.push(format!("Set default assigner to {assigner}"));
        }
        if self.assignees.is_some() {
            changes.push("Replaced assignees".to_string());
        }
        changes
    }
}

impl From<UpdatePlanArgs> for UpdatePlan {
    fn from(val: UpdatePlanArgs) -> Self {
        UpdatePlan {
            id: val.id,
            name: val.name,
            route_id: val.route,
            trigger_kind: val.trigger.map(|t| t.to_string()),
            trigger_day: val.day,
            assigner_id: val.assigner,
            clear_assigner: val.clear_assigner,
            assignee_ids: val.assignees,
        }
    }
}

/// Delete a plan permanently
#[derive(Args)]
pub struct DeletePlanArgs {
    pub id: u64,
    /// Confirm the deletion (required to prevent accidental deletion)
    #[arg(long)]
    pub confirm: bool,
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Create a plan
    #[command(alias = "c")]
    Create(CreatePlanArgs),
    /// List plans
    #[command(aliases = ["l", "ls"])]
    List(ListPlansArgs),
    /// Show a plan
    #[command(alias = "s")]
    Show(ShowArgs),
    /// Change a plan
    #[command(alias = "u")]
    Update(UpdatePlanArgs),
    /// Delete a plan; its orders are kept
    #[command(aliases = ["d", "rm"])]
    Delete(DeletePlanArgs),
    /// Fire a plan now, whatever its trigger
    #[command(alias = "t")]
    Trigger(ShowArgs),
}

// ============================================================================
// Order commands
// ============================================================================

/// List orders
#[derive(Args)]
pub struct ListOrdersArgs {
    #[arg(long)]
    pub plan: Option<u64>,
    #[arg(long, value_enum)]
    pub status: Option<OrderStatusArg>,
}

impl From<ListOrdersArgs> for ListOrders {
    fn from(val: ListOrdersArgs) -> Self {
        ListOrders {
            plan_id: val.plan,
            status: val.status.map(|s| s.to_string()),
        }
    }
}

/// Hand a pending order to an inspector
#[derive(Args)]
pub struct AssignOrderArgs {
    pub order_id: u64,
    pub assignee_id: u64,
}

impl From<AssignOrderArgs> for AssignOrder {
    fn from(val: AssignOrderArgs) -> Self {
        AssignOrder {
            order_id: val.order_id,
            assignee_id: val.assignee_id,
        }
    }
}

/// Record the result for one point of an order
#[derive(Args)]
pub struct ConfirmCheckArgs {
    pub order_id: u64,
    pub point_id: u64,
    #[arg(value_enum)]
    pub status: CheckStatusArg,
    #[arg(short, long)]
    pub comment: Option<String>,
}

impl From<ConfirmCheckArgs> for ConfirmCheck {
    fn from(val: ConfirmCheckArgs) -> Self {
        ConfirmCheck {
            order_id: val.order_id,
            point_id: val.point_id,
            status: val.status.to_string(),
            comment: val.comment,
        }
    }
}

/// Complete an order once every point is confirmed
#[derive(Args)]
pub struct CompleteOrderArgs {
    pub order_id: u64,
    /// Inspection result summary
    pub result: String,
}

impl From<CompleteOrderArgs> for CompleteOrder {
    fn from(val: CompleteOrderArgs) -> Self {
        CompleteOrder {
            order_id: val.order_id,
            inspection_data: val.result,
        }
    }
}

#[derive(Subcommand)]
pub enum OrderCommands {
    /// List orders
    #[command(aliases = ["l", "ls"])]
    List(ListOrdersArgs),
    /// Show an order
    #[command(alias = "s")]
    Show(ShowArgs),
    /// Show the checks of an order
    Checks(ShowArgs),
    /// Assign a pending order
    #[command(alias = "a")]
    Assign(AssignOrderArgs),
    /// Start an assigned order
    Start(ShowArgs),
    /// Confirm one point
    #[command(alias = "c")]
    Check(ConfirmCheckArgs),
    /// Complete an order
    Complete(CompleteOrderArgs),
}

// ============================================================================
// Scheduler
// ============================================================================

/// Sweep schedule for `serve`
#[derive(Args)]
pub struct ServeArgs {
    /// Local time of the daily sweep, e.g. 06:30. Defaults to midnight
    #[arg(long, conflicts_with = "every_secs")]
    pub at: Option<String>,
    /// Sweep every N seconds instead of daily
    #[arg(long)]
    pub every_secs: Option<u64>,
}

impl ServeArgs {
    fn schedule(&self) -> Result<SweepSchedule> {
        if let Some(secs) = self.every_secs {
            if secs == 0 {
                bail!("--every-secs must be greater than zero");
            }
            return Ok(SweepSchedule::Every(Duration::from_secs(secs)));
        }
        match &self.at {
            Some(at) => {
                let time: Time = at
                    .parse()
                    .with_context(|| format!("Invalid sweep time '{at}', expected HH:MM"))?;
                Ok(SweepSchedule::DailyAt(time))
            }
            None => Ok(SweepSchedule::default()),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Runs subcommands against an engine and renders the results.
pub struct Cli {
    engine: Engine,
    renderer: TerminalRenderer,
    actor: Actor,
    json: bool,
}

impl Cli {
    pub fn new(engine: Engine, renderer: TerminalRenderer, actor: Actor, json: bool) -> Self {
        Self {
            engine,
            renderer,
            actor,
            json,
        }
    }

    /// Prints `value` as JSON or `markdown` through the renderer.
    fn output<T: Serialize + ?Sized>(&self, value: &T, markdown: impl fmt::Display) -> Result<()> {
        if self.json {
            self.renderer.json(value)
        } else {
            self.renderer.show(markdown);
            Ok(())
        }
    }

    pub async fn handle_project_command(&self, command: ProjectCommands) -> Result<()> {
        match command {
            ProjectCommands::Create(args) => {
                let project = self.engine.create_project(&args.into()).await?;
                self.output(&project, CreateResult::new(project.clone()))
            }
        }
    }

    pub async fn handle_user_command(&self, command: UserCommands) -> Result<()> {
        match command {
            UserCommands::Create(args) => {
                let user = self.engine.create_user(&args.into()).await?;
                self.output(&user, CreateResult::new(user.clone()))
            }
            UserCommands::Show(args) => {
                let user = self.engine.get_user(&args.into()).await?;
                self.output(&user, &user)
            }
        }
    }

    pub async fn handle_point_command(&self, command: PointCommands) -> Result<()> {
        match command {
            PointCommands::Create(args) => {
                let point = self.engine.create_point(&args.into()).await?;
                self.output(&point, CreateResult::new(point.clone()))
            }
            PointCommands::Items(args) => {
                let items = self.engine.point_items(&args.into()).await?;
                self.output(&items, Items(items.clone()))
            }
        }
    }

    pub async fn handle_item_command(&self, command: ItemCommands) -> Result<()> {
        match command {
            ItemCommands::Create(args) => {
                let item = self.engine.create_item(&args.into()).await?;
                self.output(&item, CreateResult::new(item.clone()))
            }
            ItemCommands::Show(args) => {
                let item = self.engine.get_item(&args.into()).await?;
                self.output(&item, &item)
            }
            ItemCommands::Update(args) => {
                let changes = args.changes();
                let item = self.engine.update_item(&args.into()).await?;
                self.output(&item, UpdateResult::with_changes(item.clone(), changes))
            }
            ItemCommands::Delete(args) => {
                if !args.confirm {
                    self.renderer.show(OperationStatus::failure(format!(
                        "Refusing to delete item {} without --confirm",
                        args.id
                    )));
                    return Ok(());
                }
                let item = self.engine.delete_item(&Id { id: args.id }).await?;
                self.output(&item, DeleteResult::new(item.clone()))
            }
            ItemCommands::Attach(args) => {
                let params = PointItem::from(args);
                let items = self.engine.attach_item(&params).await?;
                self.output(&items, Items(items.clone()))
            }
            ItemCommands::Detach(args) => {
                let params = PointItem::from(args);
                let items = self.engine.detach_item(&params).await?;
                self.output(&items, Items(items.clone()))
            }
        }
    }

    pub async fn handle_route_command(&self, command: RouteCommands) -> Result<()> {
        match command {
            RouteCommands::Create(args) => {
                let route = self.engine.create_route(self.actor, &args.into()).await?;
                self.output(&route, CreateResult::new(route.clone()))
            }
            RouteCommands::Show(args) => {
                let route = self.engine.get_route(self.actor, &args.into()).await?;
                self.output(&route, &route)
            }
        }
    }

    pub async fn handle_plan_command(&self, command: PlanCommands) -> Result<()> {
        match command {
            PlanCommands::Create(args) => {
                let plan = self.engine.create_plan(self.actor, &args.into()).await?;
                self.output(&plan, CreateResult::new(plan.clone()))
            }
            PlanCommands::List(args) => self.list_plans(&args.into()).await,
            PlanCommands::Show(args) => {
                let plan = self.engine.get_plan(self.actor, &args.into()).await?;
                self.output(&plan, &plan)
            }
            PlanCommands::Update(args) => {
                let changes = args.changes();
                let plan = self.engine.update_plan(self.actor, &args.into()).await?;
                self.output(&plan, UpdateResult::with_changes(plan.clone(), changes))
            }
            PlanCommands::Delete(args) => {
                if !args.confirm {
                    self.renderer.show(OperationStatus::failure(format!(
                        "Refusing to delete plan {} without --confirm",
                        args.id
                    )));
                    return Ok(());
                }
                let plan = self
                    .engine
                    .delete_plan(self.actor, &Id { id: args.id })
                    .await?;
                self.output(&plan, DeleteResult::new(plan.clone()))
            }
            PlanCommands::Trigger(args) => {
                let order = self.engine.trigger_plan(self.actor, &args.into()).await?;
                self.output(&order, CreateResult::new(order.clone()))
            }
        }
    }

    pub async fn list_plans(&self, params: &ListPlans) -> Result<()> {
        let plans = self.engine.list_plans(self.actor, params).await?;
        if self.json {
            return self.renderer.json(&plans);
        }
        self.renderer.render("# Plans\n\n");
        self.renderer.show(Plans(plans));
        Ok(())
    }

    pub async fn handle_order_command(&self, command: OrderCommands) -> Result<()> {
        match command {
            OrderCommands::List(args) => {
                let orders = self.engine.list_orders(&args.into()).await?;
                if self.json {
                    return self.renderer.json(&orders);
                }
                self.renderer.render("# Orders\n\n");
                self.renderer.show(Orders(orders));
                Ok(())
            }
            OrderCommands::Show(args) => {
                let order = self.engine.get_order(&args.into()).await?;
                self.output(&order, &order)
            }
            OrderCommands::Checks(args) => {
                let checks = self.engine.order_checks(&args.into()).await?;
                if self.json {
                    return self.renderer.json(&checks);
                }
                self.renderer.show(Checks(checks));
                Ok(())
            }
            OrderCommands::Assign(args) => {
                let assignee = args.assignee_id;
                let order = self.engine.assign_order(self.actor, &args.into()).await?;
                let changes = vec![format!("Assigned to user {assignee}")];
                self.output(&order, UpdateResult::with_changes(order.clone(), changes))
            }
            OrderCommands::Start(args) => {
                let order = self.engine.start_order(&args.into()).await?;
                self.output(&order, UpdateResult::new(order.clone()))
            }
            OrderCommands::Check(args) => {
                let confirmation = self.engine.confirm_check(&args.into()).await?;
                self.output(&confirmation, &confirmation)
            }
            OrderCommands::Complete(args) => {
                let order = self.engine.complete_order(&args.into()).await?;
                self.output(&order, UpdateResult::new(order.clone()))
            }
        }
    }

    pub async fn sweep(&self) -> Result<()> {
        let report = self.engine.sweep().await?;
        self.output(&report, &report)
    }

    /// Runs the scheduler until Ctrl-C, printing each sweep report.
    pub async fn serve(&self, args: &ServeArgs) -> Result<()> {
        let schedule = args.schedule()?;
        let handle = Scheduler::start(self.engine.clone(), schedule);
        let mut reports = handle.reports();

        loop {
            tokio::select! {
                signal = tokio::signal::ctrl_c() => {
                    signal.context("Failed to listen for Ctrl-C")?;
                    info!("Interrupted, waiting for the scheduler to stop");
                    break;
                }
                changed = reports.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let report = reports.borrow_and_update().clone();
                    if let Some(report) = report {
                        self.output(&report, &report)?;
                    }
                }
            }
        }

        handle.stop().await.context("Scheduler did not stop cleanly")
    }
}
