//! Patrol CLI Application
//!
//! Command-line front end for the patrol inspection workflow engine.

mod args;
mod cli;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use jiff::tz::TimeZone;
use log::info;
use patrol_core::{params::ListPlans, Actor, EngineBuilder};
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        no_color,
        as_user,
        time_zone,
        json,
        command,
    } = Args::parse();

    let mut builder = EngineBuilder::new().with_database_path(database_file);
    if let Some(name) = time_zone {
        let zone = TimeZone::get(&name).with_context(|| format!("Unknown time zone '{name}'"))?;
        builder = builder.with_time_zone(zone);
    }
    let engine = builder
        .build()
        .await
        .context("Failed to initialize engine")?;

    let actor = as_user.map_or(Actor::System, Actor::User);
    let cli = Cli::new(engine, TerminalRenderer::new(!no_color), actor, json);

    info!("Patrol started");

    match command {
        Some(Project { command }) => cli.handle_project_command(command).await,
        Some(User { command }) => cli.handle_user_command(command).await,
        Some(Point { command }) => cli.handle_point_command(command).await,
        Some(Item { command }) => cli.handle_item_command(command).await,
        Some(Route { command }) => cli.handle_route_command(command).await,
        Some(Plan { command }) => cli.handle_plan_command(command).await,
        Some(Order { command }) => cli.handle_order_command(command).await,
        Some(Sweep) => cli.sweep().await,
        Some(Serve(args)) => {
            info!("Starting sweep scheduler");
            cli.serve(&args).await
        }
        None => cli.list_plans(&ListPlans::default()).await,
    }
}
