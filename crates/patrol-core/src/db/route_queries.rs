//! Route and point queries.

use rusqlite::{params, OptionalExtension, Row};

use super::{utils::id_at, Session};
use crate::{
    error::{DatabaseResultExt, InspectionError, Result},
    models::{Point, Route},
    params::{CreatePoint, CreateRoute},
    store::RouteStore,
};

const INSERT_POINT_SQL: &str =
    "INSERT INTO points (name, location, description) VALUES (?1, ?2, ?3)";
const SELECT_POINT_SQL: &str = "SELECT id, name, location, description FROM points WHERE id = ?1";
const INSERT_ROUTE_SQL: &str =
    "INSERT INTO routes (name, project_id, description) VALUES (?1, ?2, ?3)";
const SELECT_ROUTE_SQL: &str =
    "SELECT id, name, project_id, description FROM routes WHERE id = ?1";
const INSERT_ROUTE_POINT_SQL: &str =
    "INSERT INTO route_points (route_id, point_id, position) VALUES (?1, ?2, ?3)";
const SELECT_ROUTE_POINTS_SQL: &str = "SELECT p.id, p.name, p.location, p.description FROM route_points rp JOIN points p ON p.id = rp.point_id WHERE rp.route_id = ?1 ORDER BY rp.position";

fn point_from_row(row: &Row<'_>) -> rusqlite::Result<Point> {
    Ok(Point {
        id: id_at(row, 0)?,
        name: row.get(1)?,
        location: row.get(2)?,
        description: row.get(3)?,
    })
}

impl Session<'_> {
    fn route_points(&self, route_id: u64) -> Result<Vec<Point>> {
        let mut stmt = self
            .tx
            .prepare(SELECT_ROUTE_POINTS_SQL)
            .db_context("Failed to prepare query")?;
        let points = stmt
            .query_map(params![route_id as i64], point_from_row)
            .db_context("Failed to query route points")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch route points")?;
        Ok(points)
    }
}

impl RouteStore for Session<'_> {
    fn find_route_with_points(&self, route_id: u64) -> Result<Option<Route>> {
        let route = self
            .tx
            .query_row(SELECT_ROUTE_SQL, params![route_id as i64], |row| {
                Ok(Route {
                    id: id_at(row, 0)?,
                    name: row.get(1)?,
                    project_id: id_at(row, 2)?,
                    description: row.get(3)?,
                    points: Vec::new(),
                })
            })
            .optional()
            .db_context("Failed to query route")?;

        match route {
            Some(mut route) => {
                route.points = self.route_points(route_id)?;
                Ok(Some(route))
            }
            None => Ok(None),
        }
    }

    fn find_point(&self, id: u64) -> Result<Option<Point>> {
        self.tx
            .query_row(SELECT_POINT_SQL, params![id as i64], point_from_row)
            .optional()
            .db_context("Failed to query point")
    }

    fn create_point(&mut self, params: &CreatePoint) -> Result<Point> {
        self.tx
            .execute(
                INSERT_POINT_SQL,
                params![
                    &params.name,
                    params.location.as_deref(),
                    params.description.as_deref()
                ],
            )
            .db_context("Failed to insert point")?;

        Ok(Point {
            id: self.tx.last_insert_rowid() as u64,
            name: params.name.clone(),
            location: params.location.clone(),
            description: params.description.clone(),
        })
    }

    fn create_route(&mut self, params: &CreateRoute) -> Result<Route> {
        // Resolve every point first so an unknown id writes nothing
        let mut points = Vec::with_capacity(params.point_ids.len());
        for id in &params.point_ids {
            let point = self
                .find_point(*id)?
                .ok_or(InspectionError::PointNotFound { id: *id })?;
            points.push(point);
        }

        self.tx
            .execute(
                INSERT_ROUTE_SQL,
                params![
                    &params.name,
                    params.project_id as i64,
                    params.description.as_deref()
                ],
            )
            .db_context("Failed to insert route")?;
        let route_id = self.tx.last_insert_rowid() as u64;

        for (position, point) in points.iter().enumerate() {
            self.tx
                .execute(
                    INSERT_ROUTE_POINT_SQL,
                    params![route_id as i64, point.id as i64, position as i64],
                )
                .db_context("Failed to insert route point")?;
        }

        Ok(Route {
            id: route_id,
            name: params.name.clone(),
            project_id: params.project_id,
            description: params.description.clone(),
            points,
        })
    }
}
