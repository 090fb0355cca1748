//! Entity data-access: jobs, companies and users.
//!
//! Every operation takes the connection explicitly as `&impl GenericClient`;
//! nothing here holds a global handle. Statements are assembled from a fixed
//! base plus a fragment from [`sql_for_partial_update`](crate::sql_for_partial_update)
//! or [`sql_for_filter`](crate::sql_for_filter).

pub mod company;
pub mod job;
pub mod user;

pub use company::{Company, CompanyFilter, CompanyUpdate, CompanyWithJobs, NewCompany};
pub use job::{Job, JobFilter, JobUpdate, NewJob};
pub use user::{User, UserDetail, UserUpdate};

use crate::fragment::Fragment;
use serde::{Deserialize, Deserializer};

/// Deserialize a present field as `Some(value)`, so that with
/// `#[serde(default)]` an `Option<Option<T>>` tells absent (`None`) from
/// explicit null (`Some(None)`).
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Append ` WHERE <predicate>` unless the predicate is empty.
pub(crate) fn push_where(sql: &mut String, predicate: &Fragment) {
    if !predicate.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(predicate.clause());
    }
}

pub(crate) fn trace_sql(sql: &str, params: usize) {
    tracing::debug!(target: "jobly.sql", sql, params, "executing statement");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::sql_for_filter;

    #[test]
    fn empty_filter_adds_no_where_keyword() {
        let mut sql = "SELECT handle FROM companies".to_string();
        push_where(&mut sql, &sql_for_filter(&CompanyFilter::default()));
        assert_eq!(sql, "SELECT handle FROM companies");
    }

    #[test]
    fn non_empty_filter_is_prefixed() {
        let filter = JobFilter {
            has_equity: Some(true),
            ..Default::default()
        };
        let mut sql = "SELECT id FROM jobs".to_string();
        push_where(&mut sql, &sql_for_filter(&filter));
        assert_eq!(sql, "SELECT id FROM jobs WHERE equity > 0");
    }
}
