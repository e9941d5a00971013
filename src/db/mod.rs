//! # Persistence Layer
//!
//! Owns the bounded PostgreSQL connection pool and the conversion of rows to
//! JSON objects for the API boundary.

pub mod schema;

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::{Column, Row, TypeInfo};
use tracing::{error, info, warn};

use crate::config::DbConfig;

/// Build the connection pool.
///
/// The pool is lazy: no connection is opened until the first query, so
/// startup never blocks on the store. Use [`ping`] to probe reachability.
pub fn connect(config: &DbConfig) -> PgPool {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.name);

    PgPoolOptions::new()
        .max_connections(config.pool_size)
        .acquire_timeout(Duration::from_millis(config.connect_timeout_ms))
        .idle_timeout(Duration::from_millis(config.idle_timeout_ms))
        .connect_lazy_with(options)
}

/// Acquire and release one connection to confirm the store is reachable.
///
/// An unreachable store is logged but never fatal: the process keeps
/// accepting requests, which then fail per-query until the store comes back.
pub async fn ping(pool: &PgPool) {
    match pool.acquire().await {
        Ok(_conn) => info!("connected to PostgreSQL"),
        Err(e) => error!(error = %e, "PostgreSQL connection failed; queries will fail until the store is reachable"),
    }
}

/// Convert a row into a JSON object, in column order.
///
/// Duplicate column names keep the last occurrence, which is what the batch
/// join reads rely on (`SELECT bp.*, pm.*` lets product columns win). BYTEA
/// columns come out base64-encoded; this is the only place image bytes are
/// transcoded.
pub fn row_to_json(row: &PgRow) -> Value {
    let mut object = Map::new();
    for (index, column) in row.columns().iter().enumerate() {
        let value = decode_column(row, index, column.type_info().name());
        object.insert(column.name().to_string(), value);
    }
    Value::Object(object)
}

fn decode_column(row: &PgRow, index: usize, type_name: &str) -> Value {
    let decoded = match type_name {
        "INT2" => row.try_get::<Option<i16>, _>(index).map(|v| v.map(Value::from)),
        "INT4" => row.try_get::<Option<i32>, _>(index).map(|v| v.map(Value::from)),
        "INT8" => row.try_get::<Option<i64>, _>(index).map(|v| v.map(Value::from)),
        "FLOAT4" => row.try_get::<Option<f32>, _>(index).map(|v| v.map(Value::from)),
        "FLOAT8" => row.try_get::<Option<f64>, _>(index).map(|v| v.map(Value::from)),
        "BOOL" => row.try_get::<Option<bool>, _>(index).map(|v| v.map(Value::from)),
        "BYTEA" => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .map(|v| v.map(|bytes| Value::from(BASE64.encode(bytes)))),
        "DATE" => row
            .try_get::<Option<NaiveDate>, _>(index)
            .map(|v| v.map(|d| Value::from(d.format("%Y-%m-%d").to_string()))),
        "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(index)
            .map(|v| v.map(|t| Value::from(t.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()))),
        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(index)
            .map(|v| v.map(|t| Value::from(t.to_rfc3339()))),
        // VARCHAR, TEXT, BPCHAR, NAME and anything else stringly typed
        _ => row.try_get::<Option<String>, _>(index).map(|v| v.map(Value::from)),
    };

    match decoded {
        Ok(value) => value.unwrap_or(Value::Null),
        Err(e) => {
            warn!(column = index, column_type = type_name, error = %e, "could not decode column, returning null");
            Value::Null
        }
    }
}
