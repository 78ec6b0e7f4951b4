//! Project and user queries.

use rusqlite::{params, OptionalExtension, Row};

use super::{
    utils::{id_at, optional_id, optional_id_at},
    Session,
};
use crate::{
    error::{DatabaseResultExt, Result},
    models::{Project, User},
    params::{CreateProject, CreateUser},
    store::DirectoryStore,
};

const INSERT_PROJECT_SQL: &str = "INSERT INTO projects (name, parent_id) VALUES (?1, ?2)";
const SELECT_PROJECT_SQL: &str = "SELECT id, name, parent_id FROM projects WHERE id = ?1";
const INSERT_USER_SQL: &str = "INSERT INTO users (username, project_id) VALUES (?1, ?2)";
pub(super) const SELECT_USER_SQL: &str =
    "SELECT id, username, project_id FROM users WHERE id = ?1";

pub(super) fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: id_at(row, 0)?,
        username: row.get(1)?,
        project_id: optional_id_at(row, 2)?,
    })
}

impl DirectoryStore for Session<'_> {
    fn create_project(&mut self, params: &CreateProject) -> Result<Project> {
        self.tx
            .execute(
                INSERT_PROJECT_SQL,
                params![&params.name, optional_id(params.parent_id)],
            )
            .db_context("Failed to insert project")?;

        Ok(Project {
            id: self.tx.last_insert_rowid() as u64,
            name: params.name.clone(),
            parent_id: params.parent_id,
        })
    }

    fn find_project(&self, id: u64) -> Result<Option<Project>> {
        self.tx
            .query_row(SELECT_PROJECT_SQL, params![id as i64], |row| {
                Ok(Project {
                    id: id_at(row, 0)?,
                    name: row.get(1)?,
                    parent_id: optional_id_at(row, 2)?,
                })
            })
            .optional()
            .db_context("Failed to query project")
    }

    fn create_user(&mut self, params: &CreateUser) -> Result<User> {
        self.tx
            .execute(
                INSERT_USER_SQL,
                params![&params.username, optional_id(params.project_id)],
            )
            .db_context("Failed to insert user")?;

        Ok(User {
            id: self.tx.last_insert_rowid() as u64,
            username: params.username.clone(),
            project_id: params.project_id,
        })
    }

    fn find_user(&self, id: u64) -> Result<Option<User>> {
        self.tx
            .query_row(SELECT_USER_SQL, params![id as i64], user_from_row)
            .optional()
            .db_context("Failed to query user")
    }
}
