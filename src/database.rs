/// Data-access collaborator
///
/// Handlers never talk to sqlx directly. They send a query and its
/// parameters to a `QueryExecutor` and get back ordered rows as JSON maps,
/// or a `DatabaseError` they turn into a 500.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;

use crate::configuration::DatabaseSettings;
use crate::error::DatabaseError;

/// One result row, column name to value
pub type Row = serde_json::Map<String, Value>;

/// Positional query parameter (`$1`, `$2`, ...)
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Int(Option<i64>),
    Float(Option<f64>),
    Text(Option<String>),
}

impl From<i64> for QueryParam {
    fn from(v: i64) -> Self {
        QueryParam::Int(Some(v))
    }
}

impl From<Option<i64>> for QueryParam {
    fn from(v: Option<i64>) -> Self {
        QueryParam::Int(v)
    }
}

impl From<f64> for QueryParam {
    fn from(v: f64) -> Self {
        QueryParam::Float(Some(v))
    }
}

impl From<Option<f64>> for QueryParam {
    fn from(v: Option<f64>) -> Self {
        QueryParam::Float(v)
    }
}

impl From<&str> for QueryParam {
    fn from(v: &str) -> Self {
        QueryParam::Text(Some(v.to_string()))
    }
}

impl From<String> for QueryParam {
    fn from(v: String) -> Self {
        QueryParam::Text(Some(v))
    }
}

impl From<Option<String>> for QueryParam {
    fn from(v: Option<String>) -> Self {
        QueryParam::Text(v)
    }
}

#[async_trait]
pub trait QueryExecutor: Send + Sync + 'static {
    /// Run `query` with positional `params` and return every row it produces.
    async fn execute_query(
        &self,
        query: &str,
        params: &[QueryParam],
    ) -> Result<Vec<Row>, DatabaseError>;
}

/// PostgreSQL executor backed by a connection pool
#[derive(Clone)]
pub struct PgQueryExecutor {
    pool: PgPool,
}

impl PgQueryExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build a pool lazily; connections are opened on first use.
    pub fn connect_lazy(settings: &DatabaseSettings) -> Result<Self, DatabaseError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect_lazy(&settings.connection_string())?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl QueryExecutor for PgQueryExecutor {
    async fn execute_query(
        &self,
        query: &str,
        params: &[QueryParam],
    ) -> Result<Vec<Row>, DatabaseError> {
        // Any statement shape comes back as one JSON object per row
        let wrapped = format!("WITH t AS ({}) SELECT row_to_json(t) FROM t", query);

        let mut statement = sqlx::query_scalar::<sqlx::Postgres, Json<Row>>(&wrapped);
        for param in params {
            statement = match param {
                QueryParam::Int(v) => statement.bind(*v),
                QueryParam::Float(v) => statement.bind(*v),
                QueryParam::Text(v) => statement.bind(v.clone()),
            };
        }

        let rows = statement.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(|Json(row)| row).collect())
    }
}

/// Value of the first column of the first row, as returned by scalar
/// stored functions such as `SELECT add_admin($1, $2)`.
pub fn first_scalar(rows: &[Row]) -> Option<&Value> {
    rows.first().and_then(|row| row.values().next())
}

/// New identifier returned by an insert function.
pub fn scalar_id(rows: &[Row]) -> Result<i64, DatabaseError> {
    first_scalar(rows)
        .and_then(Value::as_i64)
        .ok_or_else(|| DatabaseError::UnexpectedRow("expected an integer id".to_string()))
}

/// Whether an update/delete function reported that it touched a row.
/// Functions may answer with a boolean or an affected-row count.
pub fn scalar_flag(rows: &[Row]) -> Result<bool, DatabaseError> {
    match first_scalar(rows) {
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(Value::Number(n)) => Ok(n.as_i64().map_or(false, |count| count > 0)),
        Some(Value::Null) | None => Ok(false),
        Some(other) => Err(DatabaseError::UnexpectedRow(format!(
            "expected a boolean, got {}",
            other
        ))),
    }
}

/// Deserialize a row into a typed record.
pub fn from_row<T: DeserializeOwned>(row: &Row) -> Result<T, DatabaseError> {
    serde_json::from_value(Value::Object(row.clone()))
        .map_err(|e| DatabaseError::UnexpectedRow(e.to_string()))
}
