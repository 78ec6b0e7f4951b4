#![allow(dead_code)]

use std::sync::Arc;

use jiff::{civil::date, tz::TimeZone, Zoned};
use patrol_core::{
    access::Actor,
    clock::FixedClock,
    models::{Plan, Route, User},
    params::{CreatePlan, CreatePoint, CreateProject, CreateRoute, CreateUser},
    Engine, EngineBuilder,
};
use tempfile::TempDir;

/// 2024-03-`day` at 09:00 UTC.
pub fn march(day: i8) -> Zoned {
    date(2024, 3, day)
        .at(9, 0, 0, 0)
        .to_zoned(TimeZone::UTC)
        .expect("valid test instant")
}

/// An engine on a fresh SQLite file with a controllable clock.
pub async fn create_test_engine(now: Zoned) -> (TempDir, Engine, Arc<FixedClock>) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let clock = Arc::new(FixedClock::new(now));
    let engine = EngineBuilder::new()
        .with_database_path(Some(&db_path))
        .with_clock(clock.clone())
        .build()
        .await
        .expect("Failed to create engine");
    (temp_dir, engine, clock)
}

/// Everything a plan needs: a project, an assigner, an inspector and a
/// three-point route.
pub struct Site {
    pub project_id: u64,
    pub assigner: User,
    pub inspector: User,
    pub route: Route,
}

pub async fn create_site(engine: &Engine) -> Site {
    let project = engine
        .create_project(&CreateProject {
            name: "Water works".to_string(),
            parent_id: None,
        })
        .await
        .expect("Failed to create project");
    let assigner = engine
        .create_user(&CreateUser {
            username: "supervisor".to_string(),
            project_id: Some(project.id),
        })
        .await
        .expect("Failed to create assigner");
    let inspector = engine
        .create_user(&CreateUser {
            username: "inspector".to_string(),
            project_id: Some(project.id),
        })
        .await
        .expect("Failed to create inspector");

    let mut point_ids = Vec::new();
    for name in ["Intake", "Filter bed", "Reservoir"] {
        let point = engine
            .create_point(&CreatePoint {
                name: name.to_string(),
                location: Some("Building 1".to_string()),
                description: None,
            })
            .await
            .expect("Failed to create point");
        point_ids.push(point.id);
    }

    let route = engine
        .create_route(
            Actor::System,
            &CreateRoute {
                name: "Treatment line".to_string(),
                project_id: project.id,
                description: None,
                point_ids,
            },
        )
        .await
        .expect("Failed to create route");

    Site {
        project_id: project.id,
        assigner,
        inspector,
        route,
    }
}

pub async fn create_monthly_plan(engine: &Engine, site: &Site, day: i64) -> Plan {
    engine
        .create_plan(
            Actor::System,
            &CreatePlan {
                name: "Monthly treatment check".to_string(),
                project_id: site.project_id,
                route_id: site.route.id,
                trigger_kind: "monthly".to_string(),
                trigger_day: day,
                assigner_id: Some(site.assigner.id),
                assignee_ids: vec![site.inspector.id],
            },
        )
        .await
        .expect("Failed to create plan")
}
