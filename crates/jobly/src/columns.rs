//! Logical field name to physical column name translation.
//!
//! Entities expose their fields in camelCase (`numEmployees`) while the tables
//! use snake_case (`num_employees`). A [`ColumnMap`] lists only the names that
//! differ; every other field maps to itself.

/// A server-controlled translation table from field names to column names.
///
/// # Example
/// ```ignore
/// use jobly::ColumnMap;
///
/// const COLUMNS: ColumnMap = ColumnMap::new(&[("numEmployees", "num_employees")]);
///
/// assert_eq!(COLUMNS.column("numEmployees"), "num_employees");
/// assert_eq!(COLUMNS.column("name"), "name");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    entries: &'static [(&'static str, &'static str)],
}

impl ColumnMap {
    /// Create a map from `(field, column)` pairs.
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// A map with no entries: every field is its own column.
    pub const fn identity() -> Self {
        Self { entries: &[] }
    }

    /// Resolve the column for `field`, falling back to `field` itself.
    pub fn column<'a>(&self, field: &'a str) -> &'a str {
        match self.entries.iter().find(|(name, _)| *name == field) {
            Some(&(_, column)) => column,
            None => field,
        }
    }

    /// Whether `field` has an explicit entry.
    pub fn contains(&self, field: &str) -> bool {
        self.entries.iter().any(|(name, _)| *name == field)
    }
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self::identity()
    }
}

/// Double-quote a column name, doubling any embedded `"`.
pub fn quote_column(column: &str) -> String {
    let mut out = String::with_capacity(column.len() + 2);
    out.push('"');
    for ch in column.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_COLUMNS: ColumnMap = ColumnMap::new(&[
        ("firstName", "first_name"),
        ("lastName", "last_name"),
        ("isAdmin", "is_admin"),
    ]);

    #[test]
    fn listed_fields_translate() {
        assert_eq!(USER_COLUMNS.column("firstName"), "first_name");
        assert_eq!(USER_COLUMNS.column("isAdmin"), "is_admin");
        assert!(USER_COLUMNS.contains("lastName"));
    }

    #[test]
    fn missing_fields_fall_back_to_their_own_name() {
        assert_eq!(USER_COLUMNS.column("email"), "email");
        assert!(!USER_COLUMNS.contains("email"));
        assert_eq!(ColumnMap::identity().column("colB"), "colB");
    }

    #[test]
    fn quoting_doubles_embedded_quotes() {
        assert_eq!(quote_column("first_name"), "\"first_name\"");
        assert_eq!(quote_column("colB"), "\"colB\"");
        assert_eq!(quote_column("a\"b"), "\"a\"\"b\"");
    }
}
