//! SQLite backend (local file or in-memory) on top of an sqlx pool.

use super::{Database, DbError, ExecResult, Row, Value};
use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{
    SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow,
};
use sqlx::{Column, Row as _, Sqlite};
use std::str::FromStr;

const SCHEMA: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS players (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS tournaments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'pending'
    )",
    "CREATE TABLE IF NOT EXISTS tournament_players (
        tournament_id INTEGER NOT NULL,
        player_id INTEGER NOT NULL,
        PRIMARY KEY (tournament_id, player_id)
    )",
    "CREATE TABLE IF NOT EXISTS matches (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tournament_id INTEGER NOT NULL,
        player1_id INTEGER NOT NULL,
        player2_id INTEGER NOT NULL,
        score1 INTEGER DEFAULT NULL,
        score2 INTEGER DEFAULT NULL,
        round TEXT NOT NULL DEFAULT 'group',
        status TEXT NOT NULL DEFAULT 'scheduled'
    )",
];

/// Connection pool handle. Constructed by the process entry point (or a test)
/// and handed to the engine as `&dyn Database`.
#[derive(Clone, Debug)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Open (creating if missing) the database at `url`, e.g. `sqlite://data.sqlite3`.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Ok(Self { pool })
    }

    /// Private in-memory database. A single connection is kept alive for the
    /// lifetime of the pool, since every SQLite memory connection is its own database.
    pub async fn in_memory() -> Result<Self, DbError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self { pool })
    }

    /// Create the four tables if they do not exist yet.
    pub async fn init_schema(&self) -> Result<(), DbError> {
        for ddl in SCHEMA {
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        Ok(())
    }
}

fn bind_params<'q>(sql: &'q str, params: &'q [Value]) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    params.iter().fold(sqlx::query(sql), |query, param| match param {
        Value::Null => query.bind(None::<i64>),
        Value::Integer(v) => query.bind(*v),
        Value::Text(v) => query.bind(v.as_str()),
    })
}

/// SQLite is dynamically typed per value: try integer first, then text.
fn decode_row(row: &SqliteRow) -> Result<Row, DbError> {
    row.columns()
        .iter()
        .map(|column| -> Result<(String, Value), DbError> {
            let idx = column.ordinal();
            let value = match row.try_get::<Option<i64>, _>(idx) {
                Ok(v) => v.map_or(Value::Null, Value::Integer),
                Err(_) => Value::Text(row.try_get::<String, _>(idx)?),
            };
            Ok((column.name().to_owned(), value))
        })
        .collect()
}

fn is_insert(sql: &str) -> bool {
    sql.trim_start()
        .get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("insert"))
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, DbError> {
        let rows = bind_params(sql, params).fetch_all(&self.pool).await?;
        rows.iter().map(decode_row).collect()
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<ExecResult, DbError> {
        let done = bind_params(sql, params).execute(&self.pool).await?;
        Ok(ExecResult {
            insert_id: is_insert(sql).then(|| done.last_insert_rowid()),
            rows_affected: done.rows_affected(),
        })
    }
}
