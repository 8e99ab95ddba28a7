//! Query builder for document listings
//!
//! Queries travel as JSON strings in repeated `queries[]` parameters, e.g.
//! `{"method":"equal","attribute":"accountId","values":["65f0c1"]}`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Query operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryMethod {
    Equal,
    Search,
    OrderAsc,
    OrderDesc,
    Limit,
    Offset,
}

/// A single filter, ordering or pagination clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    method: QueryMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    values: Vec<Value>,
}

impl Query {
    fn new(method: QueryMethod, attribute: Option<&str>, values: Vec<Value>) -> Self {
        Self {
            method,
            attribute: attribute.map(str::to_string),
            values,
        }
    }

    /// Documents whose attribute equals the value
    pub fn equal(attribute: &str, value: impl Into<Value>) -> Self {
        Self::new(QueryMethod::Equal, Some(attribute), vec![value.into()])
    }

    /// Full-text search on an attribute backed by a fulltext index
    pub fn search(attribute: &str, term: &str) -> Self {
        Self::new(QueryMethod::Search, Some(attribute), vec![Value::from(term)])
    }

    pub fn order_asc(attribute: &str) -> Self {
        Self::new(QueryMethod::OrderAsc, Some(attribute), Vec::new())
    }

    pub fn order_desc(attribute: &str) -> Self {
        Self::new(QueryMethod::OrderDesc, Some(attribute), Vec::new())
    }

    /// Return at most `limit` documents
    pub fn limit(limit: u32) -> Self {
        Self::new(QueryMethod::Limit, None, vec![Value::from(limit)])
    }

    pub fn offset(offset: u32) -> Self {
        Self::new(QueryMethod::Offset, None, vec![Value::from(offset)])
    }

    pub fn method(&self) -> QueryMethod {
        self.method
    }

    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Numeric argument of a `limit` or `offset` clause
    pub fn as_count(&self) -> Option<usize> {
        match self.method {
            QueryMethod::Limit | QueryMethod::Offset => self
                .values
                .first()
                .and_then(Value::as_u64)
                .and_then(|n| usize::try_from(n).ok()),
            _ => None,
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
