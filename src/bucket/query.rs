//! Bucket query builder
//!
//! Produces query strings of the form
//! `bucket('name').select('a','b').where(...).join(...).limit(n).offset(n).orderBy(...).run()`.
//! Clauses are always emitted in that order, and an absent clause emits nothing.

use std::fmt;

/// Comparison operators understood by `.where()`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Operator {
    #[default]
    Eq,
    NotEq,
    GreaterOrEq,
    LessOrEq,
    Greater,
    Less,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::GreaterOrEq => ">=",
            Self::LessOrEq => "<=",
            Self::Greater => ">",
            Self::Less => "<",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operand of a filter condition
///
/// Text is quoted in the query; numbers and booleans are written bare.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => write!(f, "'{}'", s),
            Self::Integer(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// A single `{'selector', 'op', value}` filter
#[derive(Debug, Clone, PartialEq)]
pub struct WhereCondition {
    pub selector: String,
    pub operator: Operator,
    pub value: Value,
}

impl WhereCondition {
    pub fn new(selector: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            selector: selector.into(),
            operator,
            value: value.into(),
        }
    }
}

/// A `.join('bucket', 'primary', 'join')` clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSpec {
    pub bucket: String,
    pub primary_selector: String,
    pub join_selector: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub selector: String,
    pub direction: Direction,
}

/// Structured form of a Bucket query
#[derive(Debug, Clone, PartialEq)]
pub struct BucketQuery {
    pub bucket: String,
    pub select: Vec<String>,
    pub filters: Vec<WhereCondition>,
    pub joins: Vec<JoinSpec>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub order_by: Option<OrderBy>,
}

impl BucketQuery {
    /// Starts a query against `bucket` with no clauses
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            select: Vec::new(),
            filters: Vec::new(),
            joins: Vec::new(),
            limit: None,
            offset: None,
            order_by: None,
        }
    }

    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn filter(mut self, condition: WhereCondition) -> Self {
        self.filters.push(condition);
        self
    }

    pub fn join(
        mut self,
        bucket: impl Into<String>,
        primary_selector: impl Into<String>,
        join_selector: impl Into<String>,
    ) -> Self {
        self.joins.push(JoinSpec {
            bucket: bucket.into(),
            primary_selector: primary_selector.into(),
            join_selector: join_selector.into(),
        });
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn order_by(mut self, selector: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some(OrderBy {
            selector: selector.into(),
            direction,
        });
        self
    }

    /// Returns a copy of this query restricted to one page
    pub fn page(&self, page_size: u64, offset: u64) -> Self {
        self.clone().limit(page_size).offset(offset)
    }

    /// Renders the query string
    pub fn build(&self) -> String {
        build_query(self)
    }
}

/// Builds the Bucket query string for `query`
///
/// # Example
///
/// ```
/// use bucket_sync::bucket::{build_query, BucketQuery};
///
/// let query = BucketQuery::new("recipe")
///     .select(["production_json"])
///     .limit(5000)
///     .offset(0);
/// assert_eq!(
///     build_query(&query),
///     "bucket('recipe').select('production_json').limit(5000).offset(0).run()"
/// );
/// ```
pub fn build_query(query: &BucketQuery) -> String {
    let mut out = format!("bucket('{}')", query.bucket);

    if !query.select.is_empty() {
        let fields: Vec<String> = query.select.iter().map(|f| format!("'{}'", f)).collect();
        out.push_str(&format!(".select({})", fields.join(",")));
    }

    if !query.filters.is_empty() {
        let conditions: Vec<String> = query
            .filters
            .iter()
            .map(|c| format!("{{'{}', '{}', {}}}", c.selector, c.operator, c.value))
            .collect();
        out.push_str(&format!(".where({})", conditions.join(", ")));
    }

    for join in &query.joins {
        out.push_str(&format!(
            ".join('{}', '{}', '{}')",
            join.bucket, join.primary_selector, join.join_selector
        ));
    }

    if let Some(limit) = query.limit {
        out.push_str(&format!(".limit({})", limit));
    }

    if let Some(offset) = query.offset {
        out.push_str(&format!(".offset({})", offset));
    }

    if let Some(order) = &query.order_by {
        out.push_str(&format!(
            ".orderBy('{}', '{}')",
            order.selector,
            order.direction.as_str()
        ));
    }

    out.push_str(".run()");
    out
}
