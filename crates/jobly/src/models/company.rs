//! Companies that post jobs.

use super::{deserialize_some, push_where, trace_sql};
use crate::client::GenericClient;
use crate::columns::ColumnMap;
use crate::error::{JoblyError, JoblyResult};
use crate::filter::{Filter, FilterField, sql_for_filter};
use crate::models::job::Job;
use crate::partial_update::{FieldUpdates, sql_for_partial_update};
use crate::row::{FromRow, RowExt, from_rows};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

const SELECT_COLUMNS: &str = "handle, name, description, num_employees, logo_url";

/// Company fields that differ from their column names.
pub const COMPANY_COLUMNS: ColumnMap = ColumnMap::new(&[
    ("numEmployees", "num_employees"),
    ("logoUrl", "logo_url"),
]);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// A company together with the jobs it has posted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyWithJobs {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// Patch for [`Company::update`]. The handle is not updatable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub num_employees: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub logo_url: Option<Option<String>>,
}

impl CompanyUpdate {
    pub fn field_updates(&self) -> FieldUpdates {
        let mut updates = FieldUpdates::new();
        updates
            .set_opt("name", self.name.clone())
            .set_opt("description", self.description.clone())
            .set_opt("numEmployees", self.num_employees)
            .set_opt("logoUrl", self.logo_url.clone());
        updates
    }
}

/// Search criteria for [`Company::find_all`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    pub name: Option<String>,
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
}

impl Filter for CompanyFilter {
    const FIELDS: &'static [FilterField<Self>] = &[
        FilterField::Contains {
            column: "name",
            get: |f| f.name.as_deref(),
        },
        FilterField::AtLeast {
            column: "num_employees",
            get: |f| f.min_employees.map(i64::from),
        },
        FilterField::AtMost {
            column: "num_employees",
            get: |f| f.max_employees.map(i64::from),
        },
    ];

    fn validate(&self) -> JoblyResult<()> {
        if let (Some(min), Some(max)) = (self.min_employees, self.max_employees) {
            if min > max {
                return Err(JoblyError::validation(
                    "minEmployees cannot be greater than maxEmployees",
                ));
            }
        }
        Ok(())
    }
}

impl Company {
    /// Insert a company. A handle that already exists is a validation error.
    pub async fn create(conn: &impl GenericClient, data: &NewCompany) -> JoblyResult<Company> {
        let check = "SELECT handle FROM companies WHERE handle = $1";
        trace_sql(check, 1);
        if conn.query_opt(check, &[&data.handle]).await?.is_some() {
            return Err(JoblyError::validation(format!(
                "Duplicate company: {}",
                data.handle
            )));
        }

        let sql = format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            SELECT_COLUMNS
        );
        trace_sql(&sql, 5);
        let row = conn
            .query_one(
                &sql,
                &[
                    &data.handle,
                    &data.name,
                    &data.description,
                    &data.num_employees,
                    &data.logo_url,
                ],
            )
            .await?;
        Company::from_row(&row)
    }

    /// All companies matching `filter`, ordered by name.
    pub async fn find_all(
        conn: &impl GenericClient,
        filter: &CompanyFilter,
    ) -> JoblyResult<Vec<Company>> {
        filter.validate()?;
        let predicate = sql_for_filter(filter);

        let mut sql = format!("SELECT {} FROM companies", SELECT_COLUMNS);
        push_where(&mut sql, &predicate);
        sql.push_str(" ORDER BY name");

        trace_sql(&sql, predicate.values().len());
        let rows = conn.query(&sql, &predicate.params_ref()).await?;
        from_rows(&rows)
    }

    /// A company by handle, with its jobs.
    pub async fn get(conn: &impl GenericClient, handle: &str) -> JoblyResult<CompanyWithJobs> {
        let sql = format!("SELECT {} FROM companies WHERE handle = $1", SELECT_COLUMNS);
        trace_sql(&sql, 1);
        let company = match conn.query_opt(&sql, &[&handle]).await? {
            Some(row) => Company::from_row(&row)?,
            None => return Err(JoblyError::not_found(format!("No company: {}", handle))),
        };

        let jobs = Job::for_company(conn, handle).await?;
        Ok(CompanyWithJobs { company, jobs })
    }

    /// Apply `patch` to the company and return the updated row.
    pub async fn update(
        conn: &impl GenericClient,
        handle: &str,
        patch: &CompanyUpdate,
    ) -> JoblyResult<Company> {
        let set = sql_for_partial_update(&patch.field_updates(), &COMPANY_COLUMNS)?;
        let sql = format!(
            "UPDATE companies SET {} WHERE handle = ${} RETURNING {}",
            set.clause(),
            set.next_placeholder(),
            SELECT_COLUMNS
        );

        let mut params = set.params_ref();
        params.push(&handle as &(dyn ToSql + Sync));

        trace_sql(&sql, params.len());
        match conn.query_opt(&sql, &params).await? {
            Some(row) => Company::from_row(&row),
            None => {
                tracing::debug!(target: "jobly.sql", handle, "update matched no company");
                Err(JoblyError::not_found(format!("No company: {}", handle)))
            }
        }
    }

    /// Delete the company (and, through the foreign key, its jobs).
    pub async fn remove(conn: &impl GenericClient, handle: &str) -> JoblyResult<()> {
        let sql = "DELETE FROM companies WHERE handle = $1";
        trace_sql(sql, 1);
        if conn.execute(sql, &[&handle]).await? == 0 {
            return Err(JoblyError::not_found(format!("No company: {}", handle)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn patch_translates_camel_case_fields() {
        let patch: CompanyUpdate = serde_json::from_value(json!({
            "name": "New",
            "numEmployees": 10,
            "logoUrl": null,
        }))
        .unwrap();

        let set = sql_for_partial_update(&patch.field_updates(), &COMPANY_COLUMNS).unwrap();
        assert_eq!(
            set.clause(),
            r#""name"=$1, "num_employees"=$2, "logo_url"=$3"#
        );
        assert_eq!(set.values()[2], crate::Value::Null);
    }

    #[test]
    fn patch_rejects_handle_change() {
        assert!(serde_json::from_value::<CompanyUpdate>(json!({"handle": "c9"})).is_err());
    }

    #[test]
    fn min_above_max_is_rejected() {
        let filter = CompanyFilter {
            min_employees: Some(10),
            max_employees: Some(2),
            ..Default::default()
        };
        assert!(filter.validate().unwrap_err().is_validation());

        let equal = CompanyFilter {
            min_employees: Some(2),
            max_employees: Some(2),
            ..Default::default()
        };
        assert!(equal.validate().is_ok());
    }

    #[test]
    fn company_with_jobs_flattens() {
        let detail = CompanyWithJobs {
            company: Company {
                handle: "c1".into(),
                name: "C1".into(),
                description: "Desc1".into(),
                num_employees: Some(1),
                logo_url: None,
            },
            jobs: Vec::new(),
        };
        assert_eq!(
            serde_json::to_value(&detail).unwrap(),
            json!({
                "handle": "c1",
                "name": "C1",
                "description": "Desc1",
                "numEmployees": 1,
                "logoUrl": null,
                "jobs": [],
            })
        );
    }
}
