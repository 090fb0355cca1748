//! Job postings.

use super::{deserialize_some, push_where, trace_sql};
use crate::client::GenericClient;
use crate::columns::ColumnMap;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::{Filter, FilterField, sql_for_filter};
use crate::partial_update::{FieldUpdates, sql_for_partial_update};
use crate::row::{FromRow, RowExt, from_rows};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

const SELECT_COLUMNS: &str = "id, title, salary, equity, company_handle";

/// Job fields that differ from their column names.
///
/// Every updatable job field is already its own column.
pub const JOB_COLUMNS: ColumnMap = ColumnMap::identity();

/// A job posting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// Input for [`Job::create`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Patch for [`Job::update`].
///
/// `id` and `companyHandle` are not updatable; sending them is rejected at
/// deserialization. For `salary` and `equity`, an explicit `null` clears the
/// column while an absent key leaves it alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub equity: Option<Option<Decimal>>,
}

impl JobUpdate {
    /// The fields this patch assigns, keyed by their JSON names.
    pub fn field_updates(&self) -> FieldUpdates {
        let mut updates = FieldUpdates::new();
        updates
            .set_opt("title", self.title.clone())
            .set_opt("salary", self.salary)
            .set_opt("equity", self.equity);
        updates
    }
}

/// Search criteria for [`Job::find_all`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    /// Inclusive salary lower bound.
    pub min_salary: Option<i32>,
    /// `true` keeps only jobs with equity above zero; `false` is no constraint.
    pub has_equity: Option<bool>,
}

impl Filter for JobFilter {
    const FIELDS: &'static [FilterField<Self>] = &[
        FilterField::Contains {
            column: "title",
            get: |f| f.title.as_deref(),
        },
        FilterField::AtLeast {
            column: "salary",
            get: |f| f.min_salary.map(i64::from),
        },
        FilterField::Positive {
            column: "equity",
            get: |f| f.has_equity,
        },
    ];
}

impl Job {
    /// Insert a job and return it with its generated id.
    pub async fn create(conn: &impl GenericClient, data: &NewJob) -> JoblyResult<Job> {
        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            SELECT_COLUMNS
        );
        trace_sql(&sql, 4);
        let row = conn
            .query_one(
                &sql,
                &[
                    &data.title,
                    &data.salary,
                    &data.equity,
                    &data.company_handle,
                ],
            )
            .await?;
        Job::from_row(&row)
    }

    /// All jobs matching `filter`, ordered by title.
    pub async fn find_all(conn: &impl GenericClient, filter: &JobFilter) -> JoblyResult<Vec<Job>> {
        filter.validate()?;
        let predicate = sql_for_filter(filter);

        let mut sql = format!("SELECT {} FROM jobs", SELECT_COLUMNS);
        push_where(&mut sql, &predicate);
        sql.push_str(" ORDER BY title, id");

        trace_sql(&sql, predicate.values().len());
        let rows = conn.query(&sql, &predicate.params_ref()).await?;
        from_rows(&rows)
    }

    /// Jobs posted by `company_handle`, ordered by id.
    pub async fn for_company(
        conn: &impl GenericClient,
        company_handle: &str,
    ) -> JoblyResult<Vec<Job>> {
        let sql = format!(
            "SELECT {} FROM jobs WHERE company_handle = $1 ORDER BY id",
            SELECT_COLUMNS
        );
        trace_sql(&sql, 1);
        let rows = conn.query(&sql, &[&company_handle]).await?;
        from_rows(&rows)
    }

    /// A single job by id.
    pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<Job> {
        let sql = format!("SELECT {} FROM jobs WHERE id = $1", SELECT_COLUMNS);
        trace_sql(&sql, 1);
        match conn.query_opt(&sql, &[&id]).await? {
            Some(row) => Job::from_row(&row),
            None => Err(JoblyError::not_found(format!("No job: {}", id))),
        }
    }

    /// Apply `patch` to job `id` and return the updated row.
    ///
    /// An empty patch is a validation error; an unknown id is not found.
    pub async fn update(conn: &impl GenericClient, id: i32, patch: &JobUpdate) -> JoblyResult<Job> {
        let set = sql_for_partial_update(&patch.field_updates(), &JOB_COLUMNS)?;
        let sql = format!(
            "UPDATE jobs SET {} WHERE id = ${} RETURNING {}",
            set.clause(),
            set.next_placeholder(),
            SELECT_COLUMNS
        );

        let mut params = set.params_ref();
        params.push(&id as &(dyn ToSql + Sync));

        trace_sql(&sql, params.len());
        match conn.query_opt(&sql, &params).await? {
            Some(row) => Job::from_row(&row),
            None => {
                tracing::debug!(target: "jobly.sql", id, "update matched no job");
                Err(JoblyError::not_found(format!("No job: {}", id)))
            }
        }
    }

    /// Delete job `id`.
    pub async fn remove(conn: &impl GenericClient, id: i32) -> JoblyResult<()> {
        let sql = "DELETE FROM jobs WHERE id = $1";
        trace_sql(sql, 1);
        if conn.execute(sql, &[&id]).await? == 0 {
            return Err(JoblyError::not_found(format!("No job: {}", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patch_keeps_absent_and_null_apart() {
        let patch: JobUpdate =
            serde_json::from_value(json!({"title": "New", "salary": null})).unwrap();
        assert_eq!(patch.title.as_deref(), Some("New"));
        assert_eq!(patch.salary, Some(None));
        assert_eq!(patch.equity, None);

        let set = sql_for_partial_update(&patch.field_updates(), &JOB_COLUMNS).unwrap();
        assert_eq!(set.clause(), r#""title"=$1, "salary"=$2"#);
        assert_eq!(set.next_placeholder(), 3);
    }

    #[test]
    fn patch_rejects_id_and_company_changes() {
        assert!(serde_json::from_value::<JobUpdate>(json!({"id": 2})).is_err());
        assert!(serde_json::from_value::<JobUpdate>(json!({"companyHandle": "c2"})).is_err());
    }

    #[test]
    fn empty_patch_has_no_data() {
        let err = sql_for_partial_update(&JobUpdate::default().field_updates(), &JOB_COLUMNS)
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn job_serializes_camel_case_with_string_equity() {
        let job = Job {
            id: 1,
            title: "j1".into(),
            salary: Some(100),
            equity: Some(Decimal::new(1, 1)),
            company_handle: "c1".into(),
        };
        assert_eq!(
            serde_json::to_value(&job).unwrap(),
            json!({
                "id": 1,
                "title": "j1",
                "salary": 100,
                "equity": "0.1",
                "companyHandle": "c1",
            })
        );
    }
}
