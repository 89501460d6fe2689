//! Persistence adapter: one query/execute contract, implemented once per backend.

mod sqlite;

pub use sqlite::SqliteDatabase;

use async_trait::async_trait;
use std::collections::HashMap;

/// Errors raised by a persistence backend or while decoding its rows.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("column {0:?} missing from row")]
    MissingColumn(String),
    #[error("column {column:?}: expected {expected}")]
    UnexpectedType {
        column: String,
        expected: &'static str,
    },
    #[error("column {column:?}: invalid value {value:?}")]
    InvalidValue { column: String, value: String },
    #[error("insert did not report a row id")]
    MissingInsertId,
}

/// A bind parameter or a column value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// One result row, keyed by column name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Row {
    columns: HashMap<String, Value>,
}

impl Row {
    pub fn get(&self, column: &str) -> Result<&Value, DbError> {
        self.columns
            .get(column)
            .ok_or_else(|| DbError::MissingColumn(column.to_owned()))
    }

    pub fn get_i64(&self, column: &str) -> Result<i64, DbError> {
        match self.get(column)? {
            Value::Integer(v) => Ok(*v),
            _ => Err(DbError::UnexpectedType {
                column: column.to_owned(),
                expected: "integer",
            }),
        }
    }

    /// Integer column that may be NULL (e.g. scores of a scheduled match).
    pub fn get_opt_i64(&self, column: &str) -> Result<Option<i64>, DbError> {
        match self.get(column)? {
            Value::Null => Ok(None),
            Value::Integer(v) => Ok(Some(*v)),
            Value::Text(_) => Err(DbError::UnexpectedType {
                column: column.to_owned(),
                expected: "integer or null",
            }),
        }
    }

    pub fn get_str(&self, column: &str) -> Result<&str, DbError> {
        match self.get(column)? {
            Value::Text(v) => Ok(v),
            _ => Err(DbError::UnexpectedType {
                column: column.to_owned(),
                expected: "text",
            }),
        }
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

/// Metadata returned by a write.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExecResult {
    /// Id assigned to the inserted row, if the statement inserted one.
    pub insert_id: Option<i64>,
    pub rows_affected: u64,
}

/// Parameterized SQL against a relational store. Placeholders are `?`.
///
/// The engine only ever talks to this trait, so swapping the backend never
/// changes engine code.
#[async_trait]
pub trait Database: Send + Sync {
    async fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, DbError>;

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecResult, DbError>;

    /// First row of `query`, if any.
    async fn query_one(&self, sql: &str, params: &[Value]) -> Result<Option<Row>, DbError> {
        Ok(self.query(sql, params).await?.into_iter().next())
    }
}
