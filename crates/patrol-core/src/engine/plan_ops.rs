//! Plan operations for the Engine.

use std::collections::BTreeSet;
use std::sync::Arc;

use log::info;
use tokio::task;

use super::{factory, Engine};
use crate::{
    access::Actor,
    error::{InspectionError, Result},
    models::{Order, Plan, Trigger},
    params::{CreatePlan, Id, ListPlans, UpdatePlan},
    store::{NewPlan, Repository, Store},
};

fn validate_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(InspectionError::invalid_input("name").with_reason("Plan name cannot be empty"));
    }
    Ok(name.to_string())
}

/// Checks that the route exists and belongs to the plan's project.
fn check_route(store: &dyn Store, route_id: u64, project_id: u64) -> Result<()> {
    let route = store
        .find_route_with_points(route_id)?
        .ok_or(InspectionError::RouteNotFound { id: route_id })?;
    if route.project_id != project_id {
        return Err(InspectionError::invalid_input("route_id").with_reason(format!(
            "Route {route_id} belongs to project {}, not {project_id}",
            route.project_id
        )));
    }
    Ok(())
}

fn check_users(store: &dyn Store, ids: impl IntoIterator<Item = u64>) -> Result<()> {
    for id in ids {
        if store.find_user(id)?.is_none() {
            return Err(InspectionError::UserNotFound { id });
        }
    }
    Ok(())
}

fn find_plan(store: &dyn Store, id: u64) -> Result<Plan> {
    store
        .find_plan(id)?
        .ok_or(InspectionError::PlanNotFound { id })
}

impl<R: Repository> Engine<R> {
    /// Creates a plan after validating its trigger, route and staff.
    pub async fn create_plan(&self, actor: Actor, params: &CreatePlan) -> Result<Plan> {
        let name = validate_name(&params.name)?;
        let trigger = Trigger::from_parts(&params.trigger_kind, params.trigger_day)?;
        self.authorize(actor, params.project_id).await?;

        let mut assignee_ids = params.assignee_ids.clone();
        assignee_ids.sort_unstable();
        assignee_ids.dedup();

        let draft = NewPlan {
            name,
            project_id: params.project_id,
            route_id: params.route_id,
            trigger,
            assigner_id: params.assigner_id,
            assignee_ids,
            created_at: self.now().timestamp(),
        };

        let plan = self
            .run(move |store| {
                check_route(store, draft.route_id, draft.project_id)?;
                check_users(store, draft.assigner_id.into_iter())?;
                check_users(store, draft.assignee_ids.iter().copied())?;
                store.create_plan(draft)
            })
            .await?;

        info!("Created plan {} ({})", plan.id, plan.trigger);
        Ok(plan)
    }

    /// Retrieves a plan by its ID.
    pub async fn get_plan(&self, actor: Actor, params: &Id) -> Result<Plan> {
        let id = params.id;
        let plan = self.run(move |store| find_plan(store, id)).await?;
        self.authorize(actor, plan.project_id).await?;
        Ok(plan)
    }

    /// Lists plans, restricted to the projects the actor can see.
    pub async fn list_plans(&self, actor: Actor, params: &ListPlans) -> Result<Vec<Plan>> {
        if let Some(project_id) = params.project_id {
            self.authorize(actor, project_id).await?;
        }

        let project_filter = params.project_id;
        let plans: Vec<Plan> = self
            .run(move |store| {
                let plans = store.find_all_plans()?;
                Ok(plans
                    .into_iter()
                    .filter(|p| project_filter.map_or(true, |id| p.project_id == id))
                    .collect())
            })
            .await?;

        let subject_id = match actor {
            Actor::User(id) if project_filter.is_none() => id,
            _ => return Ok(plans),
        };

        let projects: BTreeSet<u64> = plans.iter().map(|p| p.project_id).collect();
        let access = Arc::clone(&self.access);
        let visible = task::spawn_blocking(move || {
            let mut visible = BTreeSet::new();
            for project_id in projects {
                if access.has_project_access(subject_id, project_id)? {
                    visible.insert(project_id);
                }
            }
            Ok::<_, InspectionError>(visible)
        })
        .await
        .map_err(|e| InspectionError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        Ok(plans
            .into_iter()
            .filter(|p| visible.contains(&p.project_id))
            .collect())
    }

    /// Applies the given changes to a plan. Trigger kind and day are
    /// validated together, falling back to the stored value for whichever
    /// one is omitted.
    pub async fn update_plan(&self, actor: Actor, params: &UpdatePlan) -> Result<Plan> {
        let current = self.get_plan(actor, &Id { id: params.id }).await?;

        let name = params.name.as_deref().map(validate_name).transpose()?;
        let trigger = if params.trigger_kind.is_some() || params.trigger_day.is_some() {
            let kind = match params.trigger_kind.as_deref() {
                Some(kind) => kind.parse()?,
                None => current.trigger.kind(),
            };
            let day = params
                .trigger_day
                .unwrap_or_else(|| i64::from(current.trigger.day()));
            Some(Trigger::from_kind(kind, day)?)
        } else {
            None
        };
        if params.clear_assigner && params.assigner_id.is_some() {
            return Err(InspectionError::invalid_input("assigner_id")
                .with_reason("Cannot set and clear the assigner at the same time"));
        }

        let params = params.clone();
        let now = self.now().timestamp();
        let plan = self
            .run(move |store| {
                // Re-read so a concurrent sweep's timestamp is kept
                let mut plan = find_plan(store, params.id)?;

                if let Some(name) = name {
                    plan.name = name;
                }
                if let Some(route_id) = params.route_id {
                    check_route(store, route_id, plan.project_id)?;
                    plan.route_id = route_id;
                }
                if let Some(trigger) = trigger {
                    plan.trigger = trigger;
                }
                if params.clear_assigner {
                    plan.assigner_id = None;
                } else if let Some(assigner_id) = params.assigner_id {
                    check_users(store, [assigner_id])?;
                    plan.assigner_id = Some(assigner_id);
                }
                if let Some(mut assignee_ids) = params.assignee_ids {
                    check_users(store, assignee_ids.iter().copied())?;
                    assignee_ids.sort_unstable();
                    assignee_ids.dedup();
                    plan.assignee_ids = assignee_ids;
                }

                plan.updated_at = now;
                store.save_plan(&plan)?;
                Ok(plan)
            })
            .await?;

        info!("Updated plan {}", plan.id);
        Ok(plan)
    }

    /// Deletes a plan. Orders already fired from it are kept.
    pub async fn delete_plan(&self, actor: Actor, params: &Id) -> Result<Plan> {
        let plan = self.get_plan(actor, params).await?;

        let id = plan.id;
        let deleted = self.run(move |store| store.delete_plan(id)).await?;
        if !deleted {
            return Err(InspectionError::PlanNotFound { id });
        }

        info!("Deleted plan {id}");
        Ok(plan)
    }

    /// Fires a plan immediately, whatever its trigger kind.
    ///
    /// The order and the new last-triggered timestamp are written in one
    /// unit of work, the same way a sweep fires a plan. Neither the trigger
    /// rule nor the once-per-day guard applies.
    pub async fn trigger_plan(&self, actor: Actor, params: &Id) -> Result<Order> {
        let plan = self.get_plan(actor, params).await?;

        let id = plan.id;
        let now = self.now().timestamp();
        let order = self
            .run(move |store| {
                let mut plan = find_plan(store, id)?;
                let order = factory::create_order(store, &plan, now)?;
                plan.last_triggered_at = Some(now);
                plan.updated_at = now;
                store.save_plan(&plan)?;
                Ok(order)
            })
            .await?;

        info!("Manually triggered plan {id}, created order {}", order.id);
        Ok(order)
    }
}
