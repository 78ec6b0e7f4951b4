//! Order and check operations and queries.

use jiff::Timestamp;
use rusqlite::{params, OptionalExtension, Row};

use super::{
    utils::{
        id_at, optional_id, optional_id_at, optional_timestamp, optional_timestamp_at, parsed_at,
        timestamp_at,
    },
    Session,
};
use crate::{
    error::{DatabaseResultExt, InspectionError, Result},
    models::{Check, CheckStatus, Order, OrderStatus},
    store::{CheckStore, NewCheck, NewOrder, OrderStore},
};

const INSERT_ORDER_SQL: &str = "INSERT INTO orders (plan_id, status, assigner_id, completed_checks, total_checks, revision, created_at, updated_at) VALUES (?1, ?2, ?3, 0, 0, 0, ?4, ?4)";
const ORDER_COLUMNS: &str = "id, plan_id, status, assigner_id, assignee_id, started_at, ended_at, inspection_data, completed_checks, total_checks, revision, created_at, updated_at";
// Conditional on the revision the caller read; 0 rows means someone else won
const UPDATE_ORDER_SQL: &str = "UPDATE orders SET status = ?1, assigner_id = ?2, assignee_id = ?3, started_at = ?4, ended_at = ?5, inspection_data = ?6, completed_checks = ?7, total_checks = ?8, revision = revision + 1, updated_at = ?9 WHERE id = ?10 AND revision = ?11";
const CHECK_ORDER_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM orders WHERE id = ?1)";

const INSERT_CHECK_SQL: &str =
    "INSERT INTO checks (order_id, point_id, status, comment, checked_at) VALUES (?1, ?2, ?3, NULL, NULL)";
const CHECK_COLUMNS: &str = "id, order_id, point_id, status, comment, checked_at";
const UPDATE_CHECK_SQL: &str =
    "UPDATE checks SET status = ?1, comment = ?2, checked_at = ?3 WHERE id = ?4";

impl Session<'_> {
    /// Helper function to construct an Order from a database row
    fn build_order_from_row(row: &Row<'_>) -> rusqlite::Result<Order> {
        Ok(Order {
            id: id_at(row, 0)?,
            plan_id: id_at(row, 1)?,
            status: parsed_at::<OrderStatus>(row, 2)?,
            assigner_id: optional_id_at(row, 3)?,
            assignee_id: optional_id_at(row, 4)?,
            started_at: optional_timestamp_at(row, 5)?,
            ended_at: optional_timestamp_at(row, 6)?,
            inspection_data: row.get(7)?,
            completed_checks: row.get::<_, i64>(8)? as u32,
            total_checks: row.get::<_, i64>(9)? as u32,
            revision: row.get::<_, i64>(10)? as u64,
            created_at: timestamp_at(row, 11)?,
            updated_at: timestamp_at(row, 12)?,
        })
    }

    /// Helper function to construct a Check from a database row
    fn build_check_from_row(row: &Row<'_>) -> rusqlite::Result<Check> {
        Ok(Check {
            id: id_at(row, 0)?,
            order_id: id_at(row, 1)?,
            point_id: id_at(row, 2)?,
            status: parsed_at::<CheckStatus>(row, 3)?,
            comment: row.get(4)?,
            checked_at: optional_timestamp_at(row, 5)?,
        })
    }
}

impl OrderStore for Session<'_> {
    fn create_order(&mut self, order: NewOrder) -> Result<Order> {
        self.tx
            .execute(
                INSERT_ORDER_SQL,
                params![
                    order.plan_id as i64,
                    order.status.as_str(),
                    optional_id(order.assigner_id),
                    order.created_at.to_string()
                ],
            )
            .db_context("Failed to insert order")?;

        let id = self.tx.last_insert_rowid() as u64;

        Ok(Order {
            id,
            plan_id: order.plan_id,
            status: order.status,
            assigner_id: order.assigner_id,
            assignee_id: None,
            started_at: None,
            ended_at: None,
            inspection_data: None,
            completed_checks: 0,
            total_checks: 0,
            revision: 0,
            created_at: order.created_at,
            updated_at: order.created_at,
        })
    }

    fn save_order(&mut self, order: &mut Order) -> Result<()> {
        let rows = self
            .tx
            .execute(
                UPDATE_ORDER_SQL,
                params![
                    order.status.as_str(),
                    optional_id(order.assigner_id),
                    optional_id(order.assignee_id),
                    optional_timestamp(order.started_at),
                    optional_timestamp(order.ended_at),
                    order.inspection_data.as_deref(),
                    i64::from(order.completed_checks),
                    i64::from(order.total_checks),
                    order.updated_at.to_string(),
                    order.id as i64,
                    order.revision as i64
                ],
            )
            .db_context("Failed to update order")?;

        if rows == 0 {
            let exists: bool = self
                .tx
                .query_row(CHECK_ORDER_EXISTS_SQL, params![order.id as i64], |row| {
                    row.get(0)
                })
                .db_context("Failed to check order existence")?;
            return Err(if exists {
                InspectionError::state_conflict(order.id, "order was modified concurrently")
            } else {
                InspectionError::OrderNotFound { id: order.id }
            });
        }

        order.revision += 1;
        Ok(())
    }

    fn find_order(&self, id: u64) -> Result<Option<Order>> {
        self.tx
            .query_row(
                &format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1"),
                params![id as i64],
                Self::build_order_from_row,
            )
            .optional()
            .db_context("Failed to query order")
    }

    fn list_orders(
        &self,
        plan_id: Option<u64>,
        status: Option<OrderStatus>,
    ) -> Result<Vec<Order>> {
        let mut query = format!("SELECT {ORDER_COLUMNS} FROM orders");
        let mut conditions = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(plan_id) = plan_id {
            conditions.push("plan_id = ?");
            params_vec.push(Box::new(plan_id as i64));
        }
        if let Some(status) = status {
            conditions.push("status = ?");
            params_vec.push(Box::new(status.as_str()));
        }
        if !conditions.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&conditions.join(" AND "));
        }
        query.push_str(" ORDER BY id");

        let mut stmt = self.tx.prepare(&query).db_context("Failed to prepare query")?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|b| &**b).collect();

        let orders = stmt
            .query_map(&params_refs[..], Self::build_order_from_row)
            .db_context("Failed to query orders")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch orders")?;
        Ok(orders)
    }
}

impl CheckStore for Session<'_> {
    fn create_check(&mut self, check: NewCheck) -> Result<Check> {
        self.tx
            .execute(
                INSERT_CHECK_SQL,
                params![
                    check.order_id as i64,
                    check.point_id as i64,
                    CheckStatus::Pending.as_str()
                ],
            )
            .db_context("Failed to insert check")?;

        Ok(Check {
            id: self.tx.last_insert_rowid() as u64,
            order_id: check.order_id,
            point_id: check.point_id,
            status: CheckStatus::Pending,
            comment: None,
            checked_at: None,
        })
    }

    fn find_check(&self, order_id: u64, point_id: u64) -> Result<Option<Check>> {
        self.tx
            .query_row(
                &format!("SELECT {CHECK_COLUMNS} FROM checks WHERE order_id = ?1 AND point_id = ?2"),
                params![order_id as i64, point_id as i64],
                Self::build_check_from_row,
            )
            .optional()
            .db_context("Failed to query check")
    }

    fn save_check(&mut self, check: &Check) -> Result<()> {
        let rows = self
            .tx
            .execute(
                UPDATE_CHECK_SQL,
                params![
                    check.status.as_str(),
                    check.comment.as_deref(),
                    check.checked_at.map(|ts: Timestamp| ts.to_string()),
                    check.id as i64
                ],
            )
            .db_context("Failed to update check")?;

        if rows == 0 {
            return Err(InspectionError::CheckNotFound {
                order_id: check.order_id,
                point_id: check.point_id,
            });
        }
        Ok(())
    }

    fn checks_for_order(&self, order_id: u64) -> Result<Vec<Check>> {
        let mut stmt = self
            .tx
            .prepare(&format!(
                "SELECT {CHECK_COLUMNS} FROM checks WHERE order_id = ?1 ORDER BY id"
            ))
            .db_context("Failed to prepare query")?;

        let checks = stmt
            .query_map(params![order_id as i64], Self::build_check_from_row)
            .db_context("Failed to query checks")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch checks")?;
        Ok(checks)
    }
}
