//! The output of the fragment builders.

use crate::value::Value;
use tokio_postgres::types::ToSql;

/// A parameterized SQL fragment and the values bound to its placeholders.
///
/// Placeholders in [`clause`](Fragment::clause) are numbered `$1..$n` with no
/// gaps, and `values()[i - 1]` is the value bound to `$i`. Callers splice the
/// clause into a full statement and continue numbering from
/// [`next_placeholder`](Fragment::next_placeholder).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fragment {
    clause: String,
    values: Vec<Value>,
}

impl Fragment {
    pub(crate) fn new(clause: String, values: Vec<Value>) -> Self {
        Self { clause, values }
    }

    /// The clause text, e.g. `"title"=$1, "salary"=$2`.
    pub fn clause(&self) -> &str {
        &self.clause
    }

    /// Values in placeholder order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Whether the clause is empty (an unconstrained filter).
    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }

    /// The number the caller should use for its next placeholder.
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values.iter().map(|v| v as &(dyn ToSql + Sync)).collect()
    }

    /// Split into the clause and its values.
    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.clause, self.values)
    }
}
