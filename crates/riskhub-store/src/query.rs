//! Select queries: columns, filters, many-to-one joins, ordering
//!
//! A [`Query`] is backend-neutral. [`Query::to_params`] renders it in the
//! PostgREST query-string dialect; [`Filter::matches`] evaluates it against an
//! in-memory row. Comparison is loose so that query-string values (always
//! text) match numeric and date columns the same way on both backends.

use riskhub_core::Row;
use serde_json::Value;
use std::cmp::Ordering;

/// Comparison operator
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    Eq(Value),
    Neq(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    In(Vec<Value>),
    IsNull,
    NotNull,
}

/// One column condition; conditions in a query are and-ed
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
}

impl Filter {
    /// `column = value`
    #[must_use]
    pub fn eq(column: &str, value: impl Into<Value>) -> Self {
        Self {
            column: column.to_string(),
            op: FilterOp::Eq(value.into()),
        }
    }

    /// `column <> value`
    #[must_use]
    pub fn neq(column: &str, value: impl Into<Value>) -> Self {
        Self {
            column: column.to_string(),
            op: FilterOp::Neq(value.into()),
        }
    }

    /// `column >= value`
    #[must_use]
    pub fn gte(column: &str, value: impl Into<Value>) -> Self {
        Self {
            column: column.to_string(),
            op: FilterOp::Gte(value.into()),
        }
    }

    /// `column <= value`
    #[must_use]
    pub fn lte(column: &str, value: impl Into<Value>) -> Self {
        Self {
            column: column.to_string(),
            op: FilterOp::Lte(value.into()),
        }
    }

    /// `column in (values)`
    #[must_use]
    pub fn in_list(column: &str, values: Vec<Value>) -> Self {
        Self {
            column: column.to_string(),
            op: FilterOp::In(values),
        }
    }

    /// `column is null`
    #[must_use]
    pub fn is_null(column: &str) -> Self {
        Self {
            column: column.to_string(),
            op: FilterOp::IsNull,
        }
    }

    /// `column is not null`
    #[must_use]
    pub fn not_null(column: &str) -> Self {
        Self {
            column: column.to_string(),
            op: FilterOp::NotNull,
        }
    }

    /// PostgREST operator expression, e.g. `eq.2025`
    #[must_use]
    pub fn to_param(&self) -> String {
        match &self.op {
            FilterOp::Eq(v) => format!("eq.{}", render(v)),
            FilterOp::Neq(v) => format!("neq.{}", render(v)),
            FilterOp::Gt(v) => format!("gt.{}", render(v)),
            FilterOp::Gte(v) => format!("gte.{}", render(v)),
            FilterOp::Lt(v) => format!("lt.{}", render(v)),
            FilterOp::Lte(v) => format!("lte.{}", render(v)),
            FilterOp::In(vs) => {
                let items: Vec<String> = vs.iter().map(render_list_item).collect();
                format!("in.({})", items.join(","))
            }
            FilterOp::IsNull => "is.null".to_string(),
            FilterOp::NotNull => "not.is.null".to_string(),
        }
    }

    /// Evaluate against a row; absent columns read as null
    #[must_use]
    pub fn matches(&self, row: &Row) -> bool {
        let actual = row.get(&self.column).unwrap_or(&Value::Null);
        match &self.op {
            FilterOp::IsNull => actual.is_null(),
            FilterOp::NotNull => !actual.is_null(),
            FilterOp::Eq(v) => loose_eq(actual, v),
            FilterOp::Neq(v) => !actual.is_null() && !loose_eq(actual, v),
            FilterOp::In(vs) => vs.iter().any(|v| loose_eq(actual, v)),
            FilterOp::Gt(v) => loose_cmp(actual, v) == Some(Ordering::Greater),
            FilterOp::Gte(v) => matches!(
                loose_cmp(actual, v),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            FilterOp::Lt(v) => loose_cmp(actual, v) == Some(Ordering::Less),
            FilterOp::Lte(v) => {
                matches!(loose_cmp(actual, v), Some(Ordering::Less | Ordering::Equal))
            }
        }
    }
}

/// Many-to-one embed: `alias` receives the row of `table` whose `id` equals
/// this row's `foreign_key` column (or null)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub alias: String,
    pub table: String,
    pub foreign_key: String,
    pub columns: Vec<String>,
}

impl Join {
    /// Create a join
    #[must_use]
    pub fn new(alias: &str, table: &str, foreign_key: &str, columns: &[&str]) -> Self {
        Self {
            alias: alias.to_string(),
            table: table.to_string(),
            foreign_key: foreign_key.to_string(),
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
        }
    }

    /// PostgREST select item, e.g. `unit:master_work_units!unit_kerja_id(name,code)`
    #[must_use]
    pub fn to_select(&self) -> String {
        let cols = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(",")
        };
        format!("{}:{}!{}({})", self.alias, self.table, self.foreign_key, cols)
    }
}

/// Sort key; nulls always sort last
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A select against one table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Selected columns; empty means all
    pub columns: Vec<String>,
    pub filters: Vec<Filter>,
    pub joins: Vec<Join>,
    pub order: Vec<Order>,
    pub limit: Option<usize>,
}

impl Query {
    /// Select every column
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict selected columns
    #[must_use]
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|c| (*c).to_string()).collect();
        self
    }

    /// Add a filter
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add many filters
    #[must_use]
    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Shorthand for an equality filter
    #[must_use]
    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::eq(column, value))
    }

    /// Add a many-to-one join
    #[must_use]
    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    /// Sort ascending by a column
    #[must_use]
    pub fn order_asc(mut self, column: &str) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            ascending: true,
        });
        self
    }

    /// Sort descending by a column
    #[must_use]
    pub fn order_desc(mut self, column: &str) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            ascending: false,
        });
        self
    }

    /// Cap the number of rows
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Value of the PostgREST `select` parameter
    #[must_use]
    pub fn select_clause(&self) -> String {
        let mut items: Vec<String> = if self.columns.is_empty() {
            vec!["*".to_string()]
        } else {
            self.columns.clone()
        };
        items.extend(self.joins.iter().map(Join::to_select));
        items.join(",")
    }

    /// Query-string pairs in the PostgREST dialect
    #[must_use]
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.select_clause())];
        params.extend(filter_params(&self.filters));
        if !self.order.is_empty() {
            let order: Vec<String> = self
                .order
                .iter()
                .map(|o| {
                    let dir = if o.ascending { "asc" } else { "desc" };
                    format!("{}.{dir}.nullslast", o.column)
                })
                .collect();
            params.push(("order".to_string(), order.join(",")));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

    /// All filters hold for the row
    #[must_use]
    pub fn matches(&self, row: &Row) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    /// Compare two rows by the query's sort keys
    #[must_use]
    pub fn compare(&self, a: &Row, b: &Row) -> Ordering {
        for key in &self.order {
            let left = a.get(&key.column).unwrap_or(&Value::Null);
            let right = b.get(&key.column).unwrap_or(&Value::Null);
            let ord = match (left.is_null(), right.is_null()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => {
                    let ord = loose_cmp(left, right).unwrap_or(Ordering::Equal);
                    if key.ascending {
                        ord
                    } else {
                        ord.reverse()
                    }
                }
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

/// Filters as query-string pairs
#[must_use]
pub fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|f| (f.column.clone(), f.to_param()))
        .collect()
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn render_list_item(value: &Value) -> String {
    let text = render(value);
    if text.contains([',', '(', ')', '"']) {
        format!("\"{}\"", text.replace('"', "\\\""))
    } else {
        text
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Equality across JSON types: `2025 == "2025"`, `true == "true"`
fn loose_eq(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    if a.is_null() || b.is_null() {
        return false;
    }
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x == y;
    }
    matches!((as_text(a), as_text(b)), (Some(x), Some(y)) if x == y)
}

/// Ordering across JSON types; numbers numerically, everything else as text
fn loose_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    if a.is_null() || b.is_null() {
        return None;
    }
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x.partial_cmp(&y);
    }
    Some(as_text(a)?.cmp(&as_text(b)?))
}
