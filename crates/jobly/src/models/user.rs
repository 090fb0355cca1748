//! Users and their job applications.
//!
//! Registration and password checks live with token issuance, outside this
//! crate. Here a user is read, patched, removed, and can apply to jobs.

use super::trace_sql;
use crate::client::GenericClient;
use crate::columns::ColumnMap;
use crate::error::{JoblyError, JoblyResult};
use crate::partial_update::{FieldUpdates, sql_for_partial_update};
use crate::row::{FromRow, RowExt, from_rows};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

const SELECT_COLUMNS: &str = "username, first_name, last_name, email, is_admin";

/// User fields that differ from their column names.
pub const USER_COLUMNS: ColumnMap = ColumnMap::new(&[
    ("firstName", "first_name"),
    ("lastName", "last_name"),
    ("isAdmin", "is_admin"),
]);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

impl FromRow for User {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            username: row.try_get_column("username")?,
            first_name: row.try_get_column("first_name")?,
            last_name: row.try_get_column("last_name")?,
            email: row.try_get_column("email")?,
            is_admin: row.try_get_column("is_admin")?,
        })
    }
}

/// A user with the ids of the jobs they applied to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub jobs: Vec<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub is_admin: Option<bool>,
}

impl UserUpdate {
    pub fn field_updates(&self) -> FieldUpdates {
        let mut updates = FieldUpdates::new();
        updates
            .set_opt("firstName", self.first_name.clone())
            .set_opt("lastName", self.last_name.clone())
            .set_opt("email", self.email.clone())
            .set_opt("isAdmin", self.is_admin);
        updates
    }
}

impl User {
    /// All users, ordered by username.
    pub async fn find_all(conn: &impl GenericClient) -> JoblyResult<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY username", SELECT_COLUMNS);
        trace_sql(&sql, 0);
        let rows = conn.query(&sql, &[]).await?;
        from_rows(&rows)
    }

    /// A user by username, with applied job ids.
    pub async fn get(conn: &impl GenericClient, username: &str) -> JoblyResult<UserDetail> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", SELECT_COLUMNS);
        trace_sql(&sql, 1);
        let user = match conn.query_opt(&sql, &[&username]).await? {
            Some(row) => User::from_row(&row)?,
            None => return Err(JoblyError::not_found(format!("No user: {}", username))),
        };

        let applied = "SELECT job_id FROM applications WHERE username = $1 ORDER BY job_id";
        trace_sql(applied, 1);
        let jobs = conn
            .query(applied, &[&username])
            .await?
            .iter()
            .map(|row| row.try_get_column::<i32>("job_id"))
            .collect::<JoblyResult<Vec<_>>>()?;

        Ok(UserDetail { user, jobs })
    }

    /// Apply `patch` to the user and return the updated row.
    pub async fn update(
        conn: &impl GenericClient,
        username: &str,
        patch: &UserUpdate,
    ) -> JoblyResult<User> {
        let set = sql_for_partial_update(&patch.field_updates(), &USER_COLUMNS)?;
        let sql = format!(
            "UPDATE users SET {} WHERE username = ${} RETURNING {}",
            set.clause(),
            set.next_placeholder(),
            SELECT_COLUMNS
        );

        let mut params = set.params_ref();
        params.push(&username as &(dyn ToSql + Sync));

        trace_sql(&sql, params.len());
        match conn.query_opt(&sql, &params).await? {
            Some(row) => User::from_row(&row),
            None => {
                tracing::debug!(target: "jobly.sql", username, "update matched no user");
                Err(JoblyError::not_found(format!("No user: {}", username)))
            }
        }
    }

    /// Delete the user.
    pub async fn remove(conn: &impl GenericClient, username: &str) -> JoblyResult<()> {
        let sql = "DELETE FROM users WHERE username = $1";
        trace_sql(sql, 1);
        if conn.execute(sql, &[&username]).await? == 0 {
            return Err(JoblyError::not_found(format!("No user: {}", username)));
        }
        Ok(())
    }

    /// Record that `username` applied to job `job_id`.
    pub async fn apply_to_job(
        conn: &impl GenericClient,
        username: &str,
        job_id: i32,
    ) -> JoblyResult<()> {
        let job = "SELECT id FROM jobs WHERE id = $1";
        trace_sql(job, 1);
        if conn.query_opt(job, &[&job_id]).await?.is_none() {
            return Err(JoblyError::not_found(format!("No job: {}", job_id)));
        }

        let user = "SELECT username FROM users WHERE username = $1";
        trace_sql(user, 1);
        if conn.query_opt(user, &[&username]).await?.is_none() {
            return Err(JoblyError::not_found(format!("No user: {}", username)));
        }

        let sql = "INSERT INTO applications (job_id, username) VALUES ($1, $2)";
        trace_sql(sql, 2);
        conn.execute(sql, &[&job_id, &username]).await?;
        Ok(())
    }
}
