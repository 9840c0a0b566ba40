//! PostgREST query-string builder.

use std::fmt::Display;

/// Filters, ordering and paging for one table request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(self, columns: &str) -> Self {
        self.param("select", columns)
    }

    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.param(column, format!("eq.{}", value))
    }

    pub fn gt(self, column: &str, value: impl Display) -> Self {
        self.param(column, format!("gt.{}", value))
    }

    pub fn gte(self, column: &str, value: impl Display) -> Self {
        self.param(column, format!("gte.{}", value))
    }

    pub fn lte(self, column: &str, value: impl Display) -> Self {
        self.param(column, format!("lte.{}", value))
    }

    /// Case-insensitive substring match.
    pub fn ilike_contains(self, column: &str, needle: &str) -> Self {
        self.param(column, format!("ilike.{}", contains_pattern(needle)))
    }

    pub fn in_list<T: Display>(self, column: &str, values: &[T]) -> Self {
        let list = values
            .iter()
            .map(|v| quote(&v.to_string()))
            .collect::<Vec<_>>()
            .join(",");
        self.param(column, format!("in.({})", list))
    }

    /// Case-insensitive substring match on any of `columns`.
    pub fn any_ilike_contains(self, columns: &[&str], needle: &str) -> Self {
        let pattern = contains_pattern(needle);
        let conditions = columns
            .iter()
            .map(|column| format!("{}.ilike.{}", column, pattern))
            .collect::<Vec<_>>()
            .join(",");
        self.param("or", format!("({})", conditions))
    }

    /// Descending order puts nulls last.
    pub fn order(self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc.nullslast" };
        self.param("order", format!("{}.{}", column, direction))
    }

    pub fn limit(self, limit: usize) -> Self {
        self.param("limit", limit.to_string())
    }

    pub fn offset(self, offset: usize) -> Self {
        self.param("offset", offset.to_string())
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// `?k=v&...` with encoded values, or an empty string.
    pub fn to_query_string(&self) -> String {
        if self.params.is_empty() {
            return String::new();
        }
        let pairs = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("?{}", pairs)
    }

    fn param(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.push((key.to_string(), value.into()));
        self
    }
}

fn contains_pattern(needle: &str) -> String {
    quote(&format!("*{}*", needle))
}

/// Quotes values containing characters reserved by the filter grammar.
fn quote(value: &str) -> String {
    if value.contains([',', '(', ')', '"', '\\', ':']) {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_in_order() {
        let query = Query::new()
            .select("*")
            .eq("id", "prop-1")
            .in_list("status", &["active", "coming_soon"])
            .order("created_at", false)
            .limit(10);

        assert_eq!(
            query.params(),
            &[
                ("select".to_string(), "*".to_string()),
                ("id".to_string(), "eq.prop-1".to_string()),
                ("status".to_string(), "in.(active,coming_soon)".to_string()),
                ("order".to_string(), "created_at.desc.nullslast".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_search_across_columns() {
        let query = Query::new().any_ilike_contains(&["name", "city"], "loft");
        assert_eq!(query.params()[0].1, "(name.ilike.*loft*,city.ilike.*loft*)");
    }

    #[test]
    fn test_reserved_characters_are_quoted() {
        let query = Query::new().ilike_contains("city", "a,b");
        assert_eq!(query.params()[0].1, "ilike.\"*a,b*\"");
    }

    #[test]
    fn test_query_string_is_encoded() {
        let query = Query::new().select("*,property:properties(*)").eq("user_id", "u 1");
        assert_eq!(
            query.to_query_string(),
            "?select=%2A%2Cproperty%3Aproperties%28%2A%29&user_id=eq.u%201"
        );
        assert_eq!(Query::new().to_query_string(), "");
    }
}
