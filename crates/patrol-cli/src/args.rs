use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{
    ItemCommands, OrderCommands, PlanCommands, PointCommands, ProjectCommands, RouteCommands,
    ServeArgs, UserCommands,
};

/// Command-line interface for the Patrol inspection workflow engine
///
/// Patrol keeps recurring inspection plans, fires them into inspection
/// orders on their trigger days and tracks each order as inspectors confirm
/// the points along its route. Run `patrol serve` to keep the daily sweep
/// going in the background.
#[derive(Parser)]
#[command(version, about, name = "patrol")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/patrol/patrol.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Act as this user, subject to project membership. Without it commands
    /// run as the local operator with full access
    #[arg(long, global = true, value_name = "USER_ID")]
    pub as_user: Option<u64>,

    /// IANA time zone that decides calendar days, e.g. Europe/Berlin.
    /// Defaults to the system time zone
    #[arg(long, global = true)]
    pub time_zone: Option<String>,

    /// Print results as JSON instead of markdown
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the Patrol CLI
///
/// Directory data (`project`, `user`, `point`, `item`, `route`) is set up once;
/// `plan` and `order` cover the day to day workflow; `sweep` and `serve`
/// fire due plans.
#[derive(Subcommand)]
pub enum Commands {
    /// Manage projects
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Manage users
    #[command(alias = "u")]
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Manage inspection points
    Point {
        #[command(subcommand)]
        command: PointCommands,
    },
    /// Manage inspection items and attach them to points
    #[command(alias = "i")]
    Item {
        #[command(subcommand)]
        command: ItemCommands,
    },
    /// Manage routes
    #[command(alias = "r")]
    Route {
        #[command(subcommand)]
        command: RouteCommands,
    },
    /// Manage inspection plans
    #[command(alias = "p")]
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Work on inspection orders
    #[command(alias = "o")]
    Order {
        #[command(subcommand)]
        command: OrderCommands,
    },
    /// Fire every plan that is due right now
    Sweep,
    /// Run sweeps on a schedule until interrupted
    Serve(ServeArgs),
}
