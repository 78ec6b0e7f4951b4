//! Plan CRUD operations and queries.

use jiff::Timestamp;
use log::warn;
use rusqlite::{params, OptionalExtension, Row};

use super::{
    utils::{id_at, optional_id, optional_id_at, optional_timestamp, optional_timestamp_at, timestamp_at},
    Session,
};
use crate::{
    error::{DatabaseResultExt, InspectionError, Result},
    models::{Plan, Trigger},
    store::{NewPlan, PlanStore},
};

const INSERT_PLAN_SQL: &str = "INSERT INTO plans (name, project_id, route_id, trigger_kind, trigger_day, assigner_id, last_triggered_at, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, NULL, ?7, ?7)";
const PLAN_COLUMNS: &str = "id, name, project_id, route_id, trigger_kind, trigger_day, assigner_id, last_triggered_at, created_at, updated_at";
const UPDATE_PLAN_SQL: &str = "UPDATE plans SET name = ?1, route_id = ?2, trigger_kind = ?3, trigger_day = ?4, assigner_id = ?5, last_triggered_at = ?6, updated_at = ?7 WHERE id = ?8";
const DELETE_PLAN_SQL: &str = "DELETE FROM plans WHERE id = ?1";
const SELECT_ASSIGNEES_SQL: &str =
    "SELECT user_id FROM plan_assignees WHERE plan_id = ?1 ORDER BY user_id";
const INSERT_ASSIGNEE_SQL: &str =
    "INSERT OR IGNORE INTO plan_assignees (plan_id, user_id) VALUES (?1, ?2)";
const DELETE_ASSIGNEES_SQL: &str = "DELETE FROM plan_assignees WHERE plan_id = ?1";

/// A plan row before its trigger columns have been validated.
struct PlanRow {
    id: u64,
    name: String,
    project_id: u64,
    route_id: u64,
    trigger_kind: String,
    trigger_day: i64,
    assigner_id: Option<u64>,
    last_triggered_at: Option<Timestamp>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl PlanRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: id_at(row, 0)?,
            name: row.get(1)?,
            project_id: id_at(row, 2)?,
            route_id: id_at(row, 3)?,
            trigger_kind: row.get(4)?,
            trigger_day: row.get(5)?,
            assigner_id: optional_id_at(row, 6)?,
            last_triggered_at: optional_timestamp_at(row, 7)?,
            created_at: timestamp_at(row, 8)?,
            updated_at: timestamp_at(row, 9)?,
        })
    }

    fn into_plan(self, assignee_ids: Vec<u64>) -> Result<Plan> {
        let trigger = Trigger::from_parts(&self.trigger_kind, self.trigger_day)?;
        Ok(Plan {
            id: self.id,
            name: self.name,
            project_id: self.project_id,
            route_id: self.route_id,
            trigger,
            assigner_id: self.assigner_id,
            assignee_ids,
            last_triggered_at: self.last_triggered_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl Session<'_> {
    fn plan_assignees(&self, plan_id: u64) -> Result<Vec<u64>> {
        let mut stmt = self
            .tx
            .prepare(SELECT_ASSIGNEES_SQL)
            .db_context("Failed to prepare query")?;
        let ids = stmt
            .query_map(params![plan_id as i64], |row| id_at(row, 0))
            .db_context("Failed to query plan assignees")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch plan assignees")?;
        Ok(ids)
    }

    fn replace_assignees(&self, plan_id: u64, assignee_ids: &[u64]) -> Result<()> {
        self.tx
            .execute(DELETE_ASSIGNEES_SQL, params![plan_id as i64])
            .db_context("Failed to clear plan assignees")?;
        for user_id in assignee_ids {
            self.tx
                .execute(INSERT_ASSIGNEE_SQL, params![plan_id as i64, *user_id as i64])
                .db_context("Failed to insert plan assignee")?;
        }
        Ok(())
    }
}

impl PlanStore for Session<'_> {
    fn create_plan(&mut self, plan: NewPlan) -> Result<Plan> {
        let now_str = plan.created_at.to_string();
        self.tx
            .execute(
                INSERT_PLAN_SQL,
                params![
                    &plan.name,
                    plan.project_id as i64,
                    plan.route_id as i64,
                    plan.trigger.kind().as_str(),
                    i64::from(plan.trigger.day()),
                    optional_id(plan.assigner_id),
                    &now_str
                ],
            )
            .db_context("Failed to insert plan")?;

        let id = self.tx.last_insert_rowid() as u64;
        self.replace_assignees(id, &plan.assignee_ids)?;

        Ok(Plan {
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
        })
    }

    fn find_all_plans(&self) -> Result<Vec<Plan>> {
        let rows = {
            let mut stmt = self
                .tx
                .prepare(&format!("SELECT {PLAN_COLUMNS} FROM plans ORDER BY id"))
                .db_context("Failed to prepare query")?;
            // Decode every row on its own so one corrupt plan cannot hide the rest
            let rows = stmt
                .query_map([], |row| Ok((id_at(row, 0)?, PlanRow::from_row(row))))
                .db_context("Failed to query plans")?
                .collect::<std::result::Result<Vec<_>, _>>()
                .db_context("Failed to fetch plans")?;
            rows
        };

        let mut plans = Vec::with_capacity(rows.len());
        for (id, row) in rows {
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!("Skipping unreadable plan {id}: {e}");
                    continue;
                }
            };
            let plan = self
                .plan_assignees(id)
                .and_then(|assignees| row.into_plan(assignees));
            // An unusable plan must never fire; keep the rest of the sweep going
            match plan {
                Ok(plan) => plans.push(plan),
                Err(e) => warn!("Skipping unusable plan {id}: {e}"),
            }
        }
        Ok(plans)
    }

    fn find_plan(&self, id: u64) -> Result<Option<Plan>> {
        let row = self
            .tx
            .query_row(
                &format!("SELECT {PLAN_COLUMNS} FROM plans WHERE id = ?1"),
                params![id as i64],
                PlanRow::from_row,
            )
            .optional()
            .db_context("Failed to query plan")?;

        match row {
            Some(row) => {
                let assignees = self.plan_assignees(id)?;
                row.into_plan(assignees).map(Some)
            }
            None => Ok(None),
        }
    }

    fn save_plan(&mut self, plan: &Plan) -> Result<()> {
        let rows = self
            .tx
            .execute(
                UPDATE_PLAN_SQL,
                params![
                    &plan.name,
                    plan.route_id as i64,
                    plan.trigger.kind().as_str(),
                    i64::from(plan.trigger.day()),
                    optional_id(plan.assigner_id),
                    optional_timestamp(plan.last_triggered_at),
                    plan.updated_at.to_string(),
                    plan.id as i64
                ],
            )
            .db_context("Failed to update plan")?;

        if rows == 0 {
            return Err(InspectionError::PlanNotFound { id: plan.id });
        }
        self.replace_assignees(plan.id, &plan.assignee_ids)
    }

    fn delete_plan(&mut self, id: u64) -> Result<bool> {
        let rows = self
            .tx
            .execute(DELETE_PLAN_SQL, params![id as i64])
            .db_context("Failed to delete plan")?;
        Ok(rows > 0)
    }
}
