// src/api/query.rs
//! Filter expressions and query parameters for the Explore v2.1 `records` endpoint.

use crate::utils::constants::{FIELD_DEPARTMENT, FIELD_NAME, FIELD_YEAR};

/// One `records` request against a dataset partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pub where_clause: String,
    pub limit: usize,
    /// Field projection, e.g. `inom,dep`
    pub select: Option<String>,
}

impl QueryParams {
    pub fn as_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("where", self.where_clause.clone()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(select) = &self.select {
            pairs.push(("select", select.clone()));
        }
        pairs
    }
}

/// Quote a value for use inside an ODSQL double-quoted string literal.
pub fn quote_literal(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Backslash-escape the `LIKE` wildcards of a search term.
pub fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Builder for `AND`-joined filter clauses.
#[derive(Debug, Default, Clone)]
pub struct WhereClause {
    clauses: Vec<String>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: &str) -> Self {
        self.clauses.push(format!("{}={}", field, quote_literal(value)));
        self
    }

    /// `field LIKE "%value%"`, with `%` and `_` in `value` matched literally.
    pub fn contains(mut self, field: &str, value: &str) -> Self {
        let pattern = format!("%{}%", escape_like(value));
        self.clauses
            .push(format!("{} LIKE {}", field, quote_literal(&pattern)));
        self
    }

    pub fn within(mut self, field: &str, values: &[String]) -> Self {
        if values.is_empty() {
            return self;
        }
        let quoted: Vec<String> = values.iter().map(|v| quote_literal(v)).collect();
        self.clauses
            .push(format!("{} IN ({})", field, quoted.join(",")));
        self
    }

    /// Adds the equality only when `value` is present and non-empty.
    pub fn eq_if_present(self, field: &str, value: Option<&str>) -> Self {
        match value.filter(|v| !v.is_empty()) {
            Some(v) => self.eq(field, v),
            None => self,
        }
    }

    pub fn build(&self) -> String {
        self.clauses.join(" AND ")
    }
}

/// Candidate search used during name resolution:
/// `inom LIKE "%term%" [AND dep="d"] AND an IN (...)`, projected on name and department.
pub fn name_search_query(
    term: &str,
    department: Option<&str>,
    valid_years: &[i32],
    limit: usize,
) -> QueryParams {
    let years: Vec<String> = valid_years.iter().map(|y| y.to_string()).collect();
    let where_clause = WhereClause::new()
        .contains(FIELD_NAME, term)
        .eq_if_present(FIELD_DEPARTMENT, department)
        .within(FIELD_YEAR, &years)
        .build();
    QueryParams {
        where_clause,
        limit,
        select: Some(format!("{},{}", FIELD_NAME, FIELD_DEPARTMENT)),
    }
}

/// Exact lookup of one commune for one year: `an="Y" AND inom="name" [AND dep="d"]`.
pub fn exact_year_query(year: i32, name: &str, department: Option<&str>, limit: usize) -> QueryParams {
    let where_clause = WhereClause::new()
        .eq(FIELD_YEAR, &year.to_string())
        .eq(FIELD_NAME, name)
        .eq_if_present(FIELD_DEPARTMENT, department)
        .build();
    QueryParams {
        where_clause,
        limit,
        select: None,
    }
}
