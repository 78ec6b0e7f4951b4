//! Projects, users, points and routes.
//!
//! Plain data entry the workflow depends on. Only routes are tied to a
//! project and go through the access check.

use std::collections::BTreeSet;

use log::info;

use super::Engine;
use crate::{
    access::Actor,
    error::{InspectionError, Result},
    models::{Point, Project, Route, User},
    params::{CreatePoint, CreateProject, CreateRoute, CreateUser, Id},
    store::Repository,
};

pub(super) fn required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(InspectionError::invalid_input(field).with_reason(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl<R: Repository> Engine<R> {
    /// Registers a project, optionally below an existing parent.
    pub async fn create_project(&self, params: &CreateProject) -> Result<Project> {
        required("name", &params.name)?;
        let params = params.clone();

        let project = self
            .run(move |store| {
                if let Some(parent_id) = params.parent_id {
                    if store.find_project(parent_id)?.is_none() {
                        return Err(InspectionError::invalid_input("parent_id")
                            .with_reason(format!("Project {parent_id} does not exist")));
                    }
                }
                store.create_project(&params)
            })
            .await?;

        info!("Created project {} ({})", project.id, project.name);
        Ok(project)
    }

    /// Registers a user. Without a project the user is a global
    /// administrator.
    pub async fn create_user(&self, params: &CreateUser) -> Result<User> {
        required("username", &params.username)?;
        let params = params.clone();

        let user = self
            .run(move |store| {
                if let Some(project_id) = params.project_id {
                    if store.find_project(project_id)?.is_none() {
                        return Err(InspectionError::invalid_input("project_id")
                            .with_reason(format!("Project {project_id} does not exist")));
                    }
                }
                store.create_user(&params)
            })
            .await?;

        info!("Created user {} ({})", user.id, user.username);
        Ok(user)
    }

    /// Retrieves a user by its ID.
    pub async fn get_user(&self, params: &Id) -> Result<User> {
        let id = params.id;
        self.run(move |store| store.find_user(id)?.ok_or(InspectionError::UserNotFound { id }))
            .await
    }

    pub async fn create_point(&self, params: &CreatePoint) -> Result<Point> {
        required("name", &params.name)?;
        let params = params.clone();
        self.run(move |store| store.create_point(&params)).await
    }

    /// Creates a route visiting the given points in order. A point may
    /// appear only once, since each order holds a single check per point.
    pub async fn create_route(&self, actor: Actor, params: &CreateRoute) -> Result<Route> {
        required("name", &params.name)?;
        let mut seen = BTreeSet::new();
        if let Some(duplicate) = params.point_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(InspectionError::invalid_input("point_ids")
                .with_reason(format!("Point {duplicate} is listed more than once")));
        }
        self.authorize(actor, params.project_id).await?;

        let params = params.clone();
        let route = self.run(move |store| store.create_route(&params)).await?;

        info!("Created route {} with {} points", route.id, route.points.len());
        Ok(route)
    }

    /// Retrieves a route with its points in walking order.
    pub async fn get_route(&self, actor: Actor, params: &Id) -> Result<Route> {
        let id = params.id;
        let route = self
            .run(move |store| {
                store
                    .find_route_with_points(id)?
                    .ok_or(InspectionError::RouteNotFound { id })
            })
            .await?;
        self.authorize(actor, route.project_id).await?;
        Ok(route)
    }
}
