//! Inspection item queries.

use rusqlite::{params, OptionalExtension, Row};

use super::{utils::id_at, Session};
use crate::{
    error::{DatabaseResultExt, InspectionError, Result},
    models::Item,
    params::CreateItem,
    store::ItemStore,
};

const INSERT_ITEM_SQL: &str =
    "INSERT INTO items (title, details, execution_method) VALUES (?1, ?2, ?3)";
const SELECT_ITEM_SQL: &str =
    "SELECT id, title, details, execution_method FROM items WHERE id = ?1";
const UPDATE_ITEM_SQL: &str =
    "UPDATE items SET title = ?1, details = ?2, execution_method = ?3 WHERE id = ?4";
const DELETE_ITEM_SQL: &str = "DELETE FROM items WHERE id = ?1";
const SELECT_POINT_ITEMS_SQL: &str = "SELECT i.id, i.title, i.details, i.execution_method FROM point_items pi JOIN items i ON i.id = pi.item_id WHERE pi.point_id = ?1 ORDER BY i.id";
const INSERT_POINT_ITEM_SQL: &str =
    "INSERT OR IGNORE INTO point_items (point_id, item_id) VALUES (?1, ?2)";
const DELETE_POINT_ITEM_SQL: &str =
    "DELETE FROM point_items WHERE point_id = ?1 AND item_id = ?2";

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    Ok(Item {
        id: id_at(row, 0)?,
        title: row.get(1)?,
        details: row.get(2)?,
        execution_method: row.get(3)?,
    })
}

impl ItemStore for Session<'_> {
    fn create_item(&mut self, params: &CreateItem) -> Result<Item> {
        self.tx
            .execute(
                INSERT_ITEM_SQL,
                params![
                    &params.title,
                    params.details.as_deref(),
                    &params.execution_method
                ],
            )
            .db_context("Failed to insert item")?;

        Ok(Item {
            id: self.tx.last_insert_rowid() as u64,
            title: params.title.clone(),
            details: params.details.clone(),
            execution_method: params.execution_method.clone(),
        })
    }

    fn find_item(&self, id: u64) -> Result<Option<Item>> {
        self.tx
            .query_row(SELECT_ITEM_SQL, params![id as i64], item_from_row)
            .optional()
            .db_context("Failed to query item")
    }

    fn save_item(&mut self, item: &Item) -> Result<()> {
        let rows = self
            .tx
            .execute(
                UPDATE_ITEM_SQL,
                params![
                    &item.title,
                    item.details.as_deref(),
                    &item.execution_method,
                    item.id as i64
                ],
            )
            .db_context("Failed to update item")?;

        if rows == 0 {
            return Err(InspectionError::ItemNotFound { id: item.id });
        }
        Ok(())
    }

    fn delete_item(&mut self, id: u64) -> Result<bool> {
        let rows = self
            .tx
            .execute(DELETE_ITEM_SQL, params![id as i64])
            .db_context("Failed to delete item")?;
        Ok(rows > 0)
    }

    fn items_for_point(&self, point_id: u64) -> Result<Vec<Item>> {
        let mut stmt = self
            .tx
            .prepare(SELECT_POINT_ITEMS_SQL)
            .db_context("Failed to prepare query")?;
        let items = stmt
            .query_map(params![point_id as i64], item_from_row)
            .db_context("Failed to query point items")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch point items")?;
        Ok(items)
    }

    fn attach_item(&mut self, point_id: u64, item_id: u64) -> Result<()> {
        self.tx
            .execute(
                INSERT_POINT_ITEM_SQL,
                params![point_id as i64, item_id as i64],
            )
            .db_context("Failed to attach item")?;
        Ok(())
    }

    fn detach_item(&mut self, point_id: u64, item_id: u64) -> Result<bool> {
        let rows = self
            .tx
            .execute(
                DELETE_POINT_ITEM_SQL,
                params![point_id as i64, item_id as i64],
            )
            .db_context("Failed to detach item")?;
        Ok(rows > 0)
    }
}
