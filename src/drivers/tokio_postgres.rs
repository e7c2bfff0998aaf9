use std::error::Error;

use async_trait::async_trait;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDateTime, Utc};
use tokio_postgres::{
    types::{to_sql_checked, IsNull, ToSql, Type},
    Client, NoTls,
};
use tracing::{debug, error};

use crate::error::{PgBindError, Result};
use crate::traits::DatabaseDriver;
use crate::types::{RawQueryResult, SqlValue};

/// PostgreSQL driver implementation using tokio-postgres.
pub struct TokioPostgresDriver {
    client: Client,
}

impl TokioPostgresDriver {
    /// Connect to a PostgreSQL database.
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let (client, connection) = tokio_postgres::connect(connection_string, NoTls)
            .await
            .map_err(|e| PgBindError::ConnectionFailed(e.to_string()))?;

        // Spawn the connection handler
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "PostgreSQL connection error");
            }
        });

        debug!("PostgreSQL connection established");
        Ok(Self { client })
    }
}

#[async_trait]
impl DatabaseDriver for TokioPostgresDriver {
    async fn execute(&self, sql: &str, params: &[SqlValue]) -> Result<RawQueryResult> {
        // Convert SqlValue params to tokio-postgres compatible types
        let converted_params: Vec<Box<dyn ToSql + Sync + Send>> =
            params.iter().map(sql_value_to_tosql).collect();

        let param_refs: Vec<&(dyn ToSql + Sync)> = converted_params
            .iter()
            .map(|b| b.as_ref() as &(dyn ToSql + Sync))
            .collect();

        let rows = self
            .client
            .query(sql, &param_refs)
            .await
            .map_err(|e| PgBindError::QueryFailed(e.to_string()))?;

        // Extract column names
        let columns: Vec<String> = match rows.first() {
            Some(row) => row
                .columns()
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
            None => Vec::new(),
        };

        let result_rows = rows
            .iter()
            .map(|row| {
                row.columns()
                    .iter()
                    .enumerate()
                    .map(|(i, col)| row_value(row, i, col.type_()))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RawQueryResult::new(columns, result_rows))
    }
}

/// An untyped NULL parameter, accepted for any column type.
#[derive(Debug)]
struct Null;

impl ToSql for Null {
    fn to_sql(
        &self,
        _ty: &Type,
        _out: &mut BytesMut,
    ) -> std::result::Result<IsNull, Box<dyn Error + Sync + Send>> {
        Ok(IsNull::Yes)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

/// Convert a SqlValue to a boxed ToSql trait object.
fn sql_value_to_tosql(value: &SqlValue) -> Box<dyn ToSql + Sync + Send> {
    match value {
        SqlValue::Null => Box::new(Null),
        SqlValue::Text(s) => Box::new(s.clone()),
        SqlValue::Int32(i) => Box::new(*i),
        SqlValue::Int64(i) => Box::new(*i),
        SqlValue::Float64(f) => Box::new(*f),
        SqlValue::Bool(b) => Box::new(*b),
        SqlValue::Timestamp(ts) => Box::new(*ts),
        SqlValue::Blob(bytes) => Box::new(bytes.clone()),
    }
}

fn get<'r, T>(row: &'r tokio_postgres::Row, index: usize) -> Result<Option<T>>
where
    T: tokio_postgres::types::FromSql<'r>,
{
    row.try_get::<_, Option<T>>(index)
        .map_err(|e| PgBindError::QueryFailed(e.to_string()))
}

/// Convert a row value at a given index to a SqlValue, by column type.
/// Types without a native counterpart are read as text.
fn row_value(row: &tokio_postgres::Row, index: usize, ty: &Type) -> Result<SqlValue> {
    // Type's constants are not usable as patterns, hence the comparison chain.
    let value = if *ty == Type::BOOL {
        get::<bool>(row, index)?.map(SqlValue::Bool)
    } else if *ty == Type::INT2 {
        get::<i16>(row, index)?.map(|v| SqlValue::Int32(i32::from(v)))
    } else if *ty == Type::INT4 {
        get::<i32>(row, index)?.map(SqlValue::Int32)
    } else if *ty == Type::INT8 {
        get::<i64>(row, index)?.map(SqlValue::Int64)
    } else if *ty == Type::FLOAT4 {
        get::<f32>(row, index)?.map(|v| SqlValue::Float64(f64::from(v)))
    } else if *ty == Type::FLOAT8 {
        get::<f64>(row, index)?.map(SqlValue::Float64)
    } else if *ty == Type::TIMESTAMPTZ {
        get::<DateTime<Utc>>(row, index)?.map(SqlValue::Timestamp)
    } else if *ty == Type::TIMESTAMP {
        get::<NaiveDateTime>(row, index)?.map(|v| SqlValue::Timestamp(v.and_utc()))
    } else if *ty == Type::BYTEA {
        get::<Vec<u8>>(row, index)?.map(SqlValue::Blob)
    } else {
        get::<String>(row, index)?.map(SqlValue::Text)
    };
    Ok(value.unwrap_or(SqlValue::Null))
}
