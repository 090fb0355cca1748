//! Partial-update `SET` clause construction.
//!
//! A PATCH-style update touches an arbitrary subset of an entity's fields.
//! [`sql_for_partial_update`] turns that subset into a `SET` clause with
//! positional placeholders and the matching value list:
//!
//! ```ignore
//! use jobly::{ColumnMap, FieldUpdates, sql_for_partial_update};
//!
//! let mut updates = FieldUpdates::new();
//! updates.set("firstName", "Aliya").set("age", 32);
//!
//! let set = sql_for_partial_update(&updates, &ColumnMap::new(&[("firstName", "first_name")]))?;
//! assert_eq!(set.clause(), r#""first_name"=$1, "age"=$2"#);
//!
//! let sql = format!("UPDATE users SET {} WHERE username = ${}", set.clause(), set.next_placeholder());
//! ```

use crate::columns::{ColumnMap, quote_column};
use crate::error::{JoblyError, JoblyResult};
use crate::fragment::Fragment;
use crate::value::Value;
use std::fmt::Write;

/// An ordered, non-empty-at-use set of `field -> new value` assignments.
///
/// Order is insertion order and is the order of the emitted placeholders.
/// Setting a field twice replaces the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdates {
    fields: Vec<(String, Value)>,
}

impl FieldUpdates {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `value` to `field`.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let field = field.into();
        let value = value.into();
        match self.fields.iter().position(|(name, _)| *name == field) {
            Some(idx) => self.fields[idx].1 = value,
            None => self.fields.push((field, value)),
        }
        self
    }

    /// Assign `value` to `field` if present (`None` => leave the field out).
    ///
    /// For nullable columns pass an `Option<Option<T>>`: `Some(None)` binds NULL.
    pub fn set_opt<T: Into<Value>>(&mut self, field: &str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.set(field, v);
        }
        self
    }

    /// Chainable form of [`set`](FieldUpdates::set).
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Number of assigned fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field is assigned.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The value assigned to `field`, if any.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Iterate assignments in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Build from an untyped JSON object, accepting only `allowed` keys.
    ///
    /// Rejects non-objects, keys outside `allowed`, and non-scalar values with
    /// [`JoblyError::Validation`]. An empty object yields an empty set; the
    /// builder reports that case.
    pub fn from_json(json: serde_json::Value, allowed: &[&str]) -> JoblyResult<Self> {
        let serde_json::Value::Object(map) = json else {
            return Err(JoblyError::validation("update data must be a JSON object"));
        };

        let mut updates = FieldUpdates::new();
        for (key, value) in map {
            if !allowed.contains(&key.as_str()) {
                return Err(JoblyError::validation(format!(
                    "field '{}' cannot be updated",
                    key
                )));
            }
            let value = Value::try_from(value)
                .map_err(|e| JoblyError::validation(format!("field '{}': {}", key, e)))?;
            updates.set(key, value);
        }
        Ok(updates)
    }
}

impl<K, V> FromIterator<(K, V)> for FieldUpdates
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut updates = FieldUpdates::new();
        for (field, value) in iter {
            updates.set(field, value);
        }
        updates
    }
}

/// Build the `SET` clause for a partial update.
///
/// The field at 1-based position `i` becomes `"<column>"=$i`, with the column
/// resolved through `columns`. Fragments are joined with `, `.
///
/// Returns [`JoblyError::Validation`] (`"No data"`) when `updates` is empty:
/// `SET` with nothing after it is invalid SQL.
///
/// Field names are emitted as quoted identifiers, not parameters. Callers must
/// only pass fields from the entity's own whitelist.
pub fn sql_for_partial_update(
    updates: &FieldUpdates,
    columns: &ColumnMap,
) -> JoblyResult<Fragment> {
    if updates.is_empty() {
        return Err(JoblyError::validation("No data"));
    }

    let mut clause = String::new();
    let mut values = Vec::with_capacity(updates.len());
    for (idx, (field, value)) in updates.iter().enumerate() {
        if idx > 0 {
            clause.push_str(", ");
        }
        let _ = write!(
            &mut clause,
            "{}=${}",
            quote_column(columns.column(field)),
            idx + 1
        );
        values.push(value.clone());
    }

    Ok(Fragment::new(clause, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NO_COLUMNS: ColumnMap = ColumnMap::identity();

    #[test]
    fn works_with_one_field() {
        let updates = FieldUpdates::new().with("colA", "x");
        let set = sql_for_partial_update(&updates, &ColumnMap::new(&[("colA", "col_a")])).unwrap();

        assert_eq!(set.clause(), r#""col_a"=$1"#);
        assert_eq!(set.values(), &[Value::Text("x".into())]);
    }

    #[test]
    fn untranslated_field_keeps_its_name() {
        let updates = FieldUpdates::new().with("colB", "y");
        let set = sql_for_partial_update(&updates, &ColumnMap::new(&[("colA", "col_a")])).unwrap();

        assert_eq!(set.clause(), r#""colB"=$1"#);
    }

    #[test]
    fn placeholders_follow_insertion_order() {
        let updates = FieldUpdates::new()
            .with("firstName", "Aliya")
            .with("age", 32)
            .with("isAdmin", false);
        let columns = ColumnMap::new(&[("firstName", "first_name"), ("isAdmin", "is_admin")]);
        let set = sql_for_partial_update(&updates, &columns).unwrap();

        assert_eq!(set.clause(), r#""first_name"=$1, "age"=$2, "is_admin"=$3"#);
        assert_eq!(
            set.values(),
            &[
                Value::Text("Aliya".into()),
                Value::Int(32),
                Value::Bool(false)
            ]
        );
        assert_eq!(set.next_placeholder(), 4);
        assert_eq!(set.params_ref().len(), 3);
    }

    #[test]
    fn null_is_an_assignment() {
        let updates = FieldUpdates::new()
            .with("title", "New")
            .with("salary", Value::Null)
            .with("equity", None::<f64>);
        let set = sql_for_partial_update(&updates, &NO_COLUMNS).unwrap();

        assert_eq!(set.clause(), r#""title"=$1, "salary"=$2, "equity"=$3"#);
        assert_eq!(set.values()[1], Value::Null);
        assert_eq!(set.values()[2], Value::Null);
    }

    #[test]
    fn empty_updates_are_rejected() {
        let err = sql_for_partial_update(&FieldUpdates::new(), &NO_COLUMNS).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Validation error: No data");
    }

    #[test]
    fn setting_a_field_twice_replaces_in_place() {
        let mut updates = FieldUpdates::new();
        updates.set("a", 1).set("b", 2).set("a", 3);
        let set = sql_for_partial_update(&updates, &NO_COLUMNS).unwrap();

        assert_eq!(set.clause(), r#""a"=$1, "b"=$2"#);
        assert_eq!(set.values(), &[Value::Int(3), Value::Int(2)]);
    }

    #[test]
    fn set_opt_distinguishes_absent_from_null() {
        let mut updates = FieldUpdates::new();
        updates
            .set_opt("title", None::<String>)
            .set_opt("salary", Some(None::<i32>))
            .set_opt("equity", Some(Some(0.5)));

        assert_eq!(updates.len(), 2);
        assert!(updates.get("title").is_none());
        assert_eq!(updates.get("salary"), Some(&Value::Null));
        assert_eq!(updates.get("equity"), Some(&Value::Float(0.5)));
    }

    #[test]
    fn building_twice_is_identical() {
        let updates: FieldUpdates = [("name", Value::from("C1")), ("numEmployees", Value::from(10))]
            .into_iter()
            .collect();
        let columns = ColumnMap::new(&[("numEmployees", "num_employees")]);

        assert_eq!(
            sql_for_partial_update(&updates, &columns).unwrap(),
            sql_for_partial_update(&updates, &columns).unwrap()
        );
    }

    #[test]
    fn from_json_enforces_the_whitelist() {
        let allowed = ["title", "salary", "equity"];

        let updates =
            FieldUpdates::from_json(json!({"title": "New", "salary": null}), &allowed).unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates.get("salary"), Some(&Value::Null));

        let err = FieldUpdates::from_json(json!({"id": 5}), &allowed).unwrap_err();
        assert!(err.is_validation());

        let err = FieldUpdates::from_json(json!({"title": ["a"]}), &allowed).unwrap_err();
        assert!(err.is_validation());

        let err = FieldUpdates::from_json(json!("title"), &allowed).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn from_json_empty_object_fails_at_build_time() {
        let updates = FieldUpdates::from_json(json!({}), &["title"]).unwrap();
        assert!(updates.is_empty());
        assert!(sql_for_partial_update(&updates, &NO_COLUMNS).is_err());
    }
}
