//! Filter-predicate `WHERE` clause construction.
//!
//! Each searchable entity declares, once, the ordered list of criteria it
//! recognizes. A criterion is a [`FilterField`] variant naming its comparison
//! and carrying a typed accessor into the entity's criteria struct, so the set
//! of recognized keys and their types are fixed at compile time.
//!
//! ```ignore
//! use jobly::{Filter, FilterField, sql_for_filter};
//!
//! #[derive(Default)]
//! struct JobFilter {
//!     title: Option<String>,
//!     min_salary: Option<i32>,
//!     has_equity: Option<bool>,
//! }
//!
//! impl Filter for JobFilter {
//!     const FIELDS: &'static [FilterField<Self>] = &[
//!         FilterField::Contains { column: "title", get: |f| f.title.as_deref() },
//!         FilterField::AtLeast { column: "salary", get: |f| f.min_salary.map(i64::from) },
//!         FilterField::Positive { column: "equity", get: |f| f.has_equity },
//!     ];
//! }
//!
//! let filter = JobFilter { min_salary: Some(150), has_equity: Some(true), ..Default::default() };
//! let where_ = sql_for_filter(&filter);
//! assert_eq!(where_.clause(), "salary >= $1 AND equity > 0");
//! ```

use crate::error::{JoblyError, JoblyResult};
use crate::fragment::Fragment;
use crate::value::Value;
use serde::de::DeserializeOwned;

/// One recognized filter criterion of entity criteria type `F`.
pub enum FilterField<F: 'static> {
    /// Case-insensitive substring match: `<column> ILIKE $i` bound to `%<text>%`.
    Contains {
        column: &'static str,
        get: fn(&F) -> Option<&str>,
    },
    /// Inclusive lower bound: `<column> >= $i`.
    AtLeast {
        column: &'static str,
        get: fn(&F) -> Option<i64>,
    },
    /// Inclusive upper bound: `<column> <= $i`.
    AtMost {
        column: &'static str,
        get: fn(&F) -> Option<i64>,
    },
    /// Strictly positive when the flag is `true`: `<column> > 0`, no parameter.
    /// `false` and absent add nothing.
    Positive {
        column: &'static str,
        get: fn(&F) -> Option<bool>,
    },
}

impl<F: 'static> FilterField<F> {
    /// The physical column this criterion constrains.
    pub fn column(&self) -> &'static str {
        match self {
            FilterField::Contains { column, .. }
            | FilterField::AtLeast { column, .. }
            | FilterField::AtMost { column, .. }
            | FilterField::Positive { column, .. } => *column,
        }
    }

    /// Whether this criterion binds a parameter when it applies.
    pub fn is_parameterized(&self) -> bool {
        !matches!(self, FilterField::Positive { .. })
    }
}

/// An entity's search criteria.
///
/// `FIELDS` is walked in declaration order, independent of the order the
/// caller supplied the criteria in, so a given set of present criteria always
/// renders the same SQL text.
pub trait Filter: Sized + 'static {
    /// Recognized criteria, in emission order.
    const FIELDS: &'static [FilterField<Self>];

    /// Cross-field checks run by the caller before building.
    fn validate(&self) -> JoblyResult<()> {
        Ok(())
    }
}

/// Build the `WHERE` predicate for `filter`.
///
/// Present criteria are joined with ` AND `. With no present criteria the
/// clause is empty and the caller must omit the `WHERE` keyword.
/// Placeholders are numbered as predicates are emitted, so they are always
/// `$1..$k` where `k` is the number of parameterized predicates.
pub fn sql_for_filter<F: Filter>(filter: &F) -> Fragment {
    let mut predicates: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    for field in F::FIELDS {
        match field {
            FilterField::Contains { column, get } => {
                if let Some(text) = get(filter) {
                    values.push(Value::Text(format!("%{}%", text)));
                    predicates.push(format!("{} ILIKE ${}", column, values.len()));
                }
            }
            FilterField::AtLeast { column, get } => {
                if let Some(n) = get(filter) {
                    values.push(Value::Int(n));
                    predicates.push(format!("{} >= ${}", column, values.len()));
                }
            }
            FilterField::AtMost { column, get } => {
                if let Some(n) = get(filter) {
                    values.push(Value::Int(n));
                    predicates.push(format!("{} <= ${}", column, values.len()));
                }
            }
            FilterField::Positive { column, get } => {
                if get(filter) == Some(true) {
                    predicates.push(format!("{} > 0", column));
                }
            }
        }
    }

    Fragment::new(predicates.join(" AND "), values)
}

/// Parse untyped criteria into `F` and run its checks.
///
/// Unknown keys and mistyped values (e.g. a non-numeric `minSalary`) surface
/// as [`JoblyError::Validation`], provided `F` deserializes with
/// `deny_unknown_fields`.
pub fn parse_filter<F>(json: serde_json::Value) -> JoblyResult<F>
where
    F: Filter + DeserializeOwned,
{
    let filter: F =
        serde_json::from_value(json).map_err(|e| JoblyError::validation(e.to_string()))?;
    filter.validate()?;
    Ok(filter)
}
