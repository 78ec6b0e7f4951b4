use jiff::Timestamp;
use patrol_core::{
    db::Database,
    params::{CreateItem, CreatePoint, CreateProject, CreateRoute},
    store::{
        CheckStore, DirectoryStore, ItemStore, NewCheck, NewOrder, NewPlan, OrderStore, PlanStore,
        RouteStore,
    },
    ErrorKind, InspectionError, OrderStatus, Trigger,
};
use tempfile::NamedTempFile;

/// Helper function to create a temporary database for testing
fn create_test_db() -> (NamedTempFile, Database) {
    let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
    let db = Database::new(temp_file.path()).expect("Failed to create test database");
    (temp_file, db)
}

fn new_order(plan_id: u64) -> NewOrder {
    NewOrder {
        plan_id,
        status: OrderStatus::Pending,
        assigner_id: None,
        created_at: Timestamp::UNIX_EPOCH,
    }
}

#[test]
fn test_database_initialization() {
    let (temp_file, mut db) = create_test_db();
    assert!(temp_file.path().exists());

    let mut session = db.session().expect("Failed to begin session");
    let project = session
        .create_project(&CreateProject {
            name: "Depot".to_string(),
            parent_id: None,
        })
        .expect("Failed to create project");
    session.commit().expect("Failed to commit");
    drop(db);

    // Opening again reapplies the idempotent schema and keeps the data
    let mut reopened = Database::new(temp_file.path()).expect("Failed to reopen database");
    let session = reopened.session().expect("Failed to begin session");
    let found = session
        .find_project(project.id)
        .expect("Failed to query project")
        .expect("Project should survive reopening");
    assert_eq!(found.name, "Depot");
}

#[test]
fn test_stale_order_save_conflicts() {
    let (_temp_file, mut db) = create_test_db();
    let mut session = db.session().expect("Failed to begin session");

    let order = session.create_order(new_order(1)).expect("Failed to create order");
    assert_eq!(order.revision, 0);

    let mut first = session
        .find_order(order.id)
        .expect("Failed to find order")
        .expect("Order should exist");
    let mut stale = first.clone();

    first.status = OrderStatus::Assigned;
    session.save_order(&mut first).expect("Failed to save order");
    assert_eq!(first.revision, 1);

    stale.status = OrderStatus::Assigned;
    let err = session
        .save_order(&mut stale)
        .expect_err("Stale revision must be rejected");
    assert_eq!(err.kind(), ErrorKind::StateConflict);
    assert_eq!(stale.revision, 0, "Failed save leaves the revision alone");
}

#[test]
fn test_save_missing_order_is_not_found() {
    let (_temp_file, mut db) = create_test_db();
    let mut session = db.session().expect("Failed to begin session");

    let mut order = session.create_order(new_order(1)).expect("Failed to create order");
    order.id += 100;
    let err = session.save_order(&mut order).expect_err("No such order");
    assert!(matches!(err, InspectionError::OrderNotFound { .. }));
}

#[test]
fn test_one_check_per_point() {
    let (_temp_file, mut db) = create_test_db();
    let mut session = db.session().expect("Failed to begin session");

    let order = session.create_order(new_order(1)).expect("Failed to create order");
    let check = NewCheck {
        order_id: order.id,
        point_id: 7,
    };
    session.create_check(check).expect("Failed to create check");
    let err = session
        .create_check(check)
        .expect_err("Duplicate check must violate the unique constraint");
    assert_eq!(err.kind(), ErrorKind::Persistence);

    let checks = session
        .checks_for_order(order.id)
        .expect("Failed to list checks");
    assert_eq!(checks.len(), 1);
}

#[test]
fn test_uncommitted_session_rolls_back() {
    let (_temp_file, mut db) = create_test_db();

    {
        let mut session = db.session().expect("Failed to begin session");
        session.create_order(new_order(1)).expect("Failed to create order");
        // Dropped without commit
    }

    let session = db.session().expect("Failed to begin session");
    let orders = session
        .list_orders(None, None)
        .expect("Failed to list orders");
    assert!(orders.is_empty());
}

#[test]
fn test_route_keeps_point_order() {
    let (_temp_file, mut db) = create_test_db();
    let mut session = db.session().expect("Failed to begin session");

    let mut ids = Vec::new();
    for name in ["C", "A", "B"] {
        let point = session
            .create_point(&CreatePoint {
                name: name.to_string(),
                ..Default::default()
            })
            .expect("Failed to create point");
        ids.push(point.id);
    }
    ids.reverse();

    let route = session
        .create_route(&CreateRoute {
            name: "Reverse".to_string(),
            project_id: 1,
            description: None,
            point_ids: ids.clone(),
        })
        .expect("Failed to create route");

    let loaded = session
        .find_route_with_points(route.id)
        .expect("Failed to load route")
        .expect("Route should exist");
    let loaded_ids: Vec<u64> = loaded.points.iter().map(|p| p.id).collect();
    assert_eq!(loaded_ids, ids);
    assert_eq!(loaded.points[0].name, "B");

    let err = session
        .create_route(&CreateRoute {
            name: "Broken".to_string(),
            project_id: 1,
            description: None,
            point_ids: vec![ids[0], 999],
        })
        .expect_err("Unknown point");
    assert!(matches!(err, InspectionError::PointNotFound { id: 999 }));
}

#[test]
fn test_plan_round_trip_keeps_trigger_and_assignees() {
    let (_temp_file, mut db) = create_test_db();
    let mut session = db.session().expect("Failed to begin session");

    let project = session
        .create_project(&CreateProject {
            name: "Depot".to_string(),
            parent_id: None,
        })
        .expect("Failed to create project");
    let route = session
        .create_route(&CreateRoute {
            name: "Yard".to_string(),
            project_id: project.id,
            description: None,
            point_ids: vec![],
        })
        .expect("Failed to create route");

    let plan = session
        .create_plan(NewPlan {
            name: "Weekly sweep".to_string(),
            project_id: project.id,
            route_id: route.id,
            trigger: Trigger::from_parts("weekly", 0).expect("valid trigger"),
            assigner_id: Some(4),
            assignee_ids: vec![2, 3],
            created_at: Timestamp::UNIX_EPOCH,
        })
        .expect("Failed to create plan");

    let mut loaded = session
        .find_plan(plan.id)
        .expect("Failed to load plan")
        .expect("Plan should exist");
    assert_eq!(loaded, plan);

    loaded.last_triggered_at = Some(Timestamp::UNIX_EPOCH);
    loaded.assignee_ids = vec![3];
    session.save_plan(&loaded).expect("Failed to save plan");

    let reloaded = session
        .find_plan(plan.id)
        .expect("Failed to load plan")
        .expect("Plan should exist");
    assert_eq!(reloaded.assignee_ids, vec![3]);
    assert_eq!(reloaded.last_triggered_at, Some(Timestamp::UNIX_EPOCH));

    assert!(session.delete_plan(plan.id).expect("Failed to delete plan"));
    assert!(session.find_plan(plan.id).expect("Failed to query").is_none());
}

#[test]
fn test_item_attachments_follow_item_lifecycle() {
    let (_temp_file, mut db) = create_test_db();
    let mut session = db.session().expect("Failed to begin session");

    let point = session
        .create_point(&CreatePoint {
            name: "Boiler".to_string(),
            location: None,
            description: None,
        })
        .expect("Failed to create point");
    assert_eq!(
        session.find_point(point.id).expect("Failed to query point"),
        Some(point.clone())
    );

    let mut item = session
        .create_item(&CreateItem {
            title: "Flue temperature".to_string(),
            details: None,
            execution_method: "meter reading".to_string(),
        })
        .expect("Failed to create item");
    session
        .attach_item(point.id, item.id)
        .expect("Failed to attach item");
    // A second attach is ignored
    session
        .attach_item(point.id, item.id)
        .expect("Failed to attach item again");

    item.details = Some("Below 180 °C".to_string());
    session.save_item(&item).expect("Failed to save item");
    let attached = session
        .items_for_point(point.id)
        .expect("Failed to list items");
    assert_eq!(attached, vec![item.clone()]);

    assert!(session.delete_item(item.id).expect("Failed to delete item"));
    assert!(session
        .items_for_point(point.id)
        .expect("Failed to list items")
        .is_empty());
    assert!(!session
        .detach_item(point.id, item.id)
        .expect("Failed to detach item"));

    let err = session.save_item(&item).expect_err("Item is gone");
    assert!(matches!(err, InspectionError::ItemNotFound { id } if id == item.id));
}
