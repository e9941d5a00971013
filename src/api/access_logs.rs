//! # Access Log Routes
//!
//! CRUD for `access_logs`: records of a batch being scanned at a geographic
//! location. Latitude and longitude must fall within valid bounds; there is
//! no enrichment join on read.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;

use super::error::{ApiError, ApiResult};
use super::envelope::Envelope;
use super::extract::JsonOrForm;
use super::AppState;
use crate::db::row_to_json;
use crate::validation::{as_f64, RuleSet};

const INSERT_ACCESS_LOG: &str = "
    INSERT INTO access_logs (batch_number, product_name, latitude, longitude, address)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING *";

const UPDATE_ACCESS_LOG: &str = "
    UPDATE access_logs
    SET batch_number = $1, product_name = $2, latitude = $3, longitude = $4, address = $5
    WHERE id = $6
    RETURNING *";

/// Create access log routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_access_logs).post(create_access_log))
        .route(
            "/{id}",
            get(get_access_log)
                .put(update_access_log)
                .delete(delete_access_log),
        )
}

/// Incoming access log record. Coordinates stay loosely typed so form
/// bodies (strings) and JSON numbers validate the same way.
#[derive(Debug, Default, Deserialize)]
pub struct AccessLogPayload {
    pub batch_number: Option<String>,
    pub product_name: Option<String>,
    pub latitude: Option<Value>,
    pub longitude: Option<Value>,
    pub address: Option<String>,
}

impl AccessLogPayload {
    fn validate(&self) -> ApiResult<()> {
        RuleSet::new()
            .required("batch_number", &self.batch_number, "Batch number is required")
            .required("product_name", &self.product_name, "Product name is required")
            .numeric_range(
                "latitude",
                &self.latitude,
                -90.0,
                90.0,
                "Latitude must be a valid number",
            )
            .numeric_range(
                "longitude",
                &self.longitude,
                -180.0,
                180.0,
                "Longitude must be a valid number",
            )
            .required("address", &self.address, "Address is required")
            .finish()
            .map_err(ApiError::Validation)
    }

    // Only called after validation.
    fn latitude(&self) -> Option<f64> {
        self.latitude.as_ref().and_then(as_f64)
    }

    fn longitude(&self) -> Option<f64> {
        self.longitude.as_ref().and_then(as_f64)
    }
}

async fn list_access_logs(State(state): State<AppState>) -> ApiResult<Json<Envelope>> {
    let rows = sqlx::query("SELECT * FROM access_logs")
        .fetch_all(&state.pool)
        .await?;

    let logs: Vec<Value> = rows.iter().map(row_to_json).collect();
    Ok(Json(Envelope::ok(
        "Access logs retrieved successfully!",
        Value::Array(logs),
    )))
}

async fn get_access_log(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Envelope>> {
    let row = sqlx::query("SELECT * FROM access_logs WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(ApiError::NotFound("Access log"))?;

    Ok(Json(Envelope::ok(
        "Access log retrieved successfully!",
        row_to_json(&row),
    )))
}

async fn create_access_log(
    State(state): State<AppState>,
    JsonOrForm(payload): JsonOrForm<AccessLogPayload>,
) -> ApiResult<(StatusCode, Json<Envelope>)> {
    payload.validate()?;

    let row = sqlx::query(INSERT_ACCESS_LOG)
        .bind(&payload.batch_number)
        .bind(&payload.product_name)
        .bind(payload.latitude())
        .bind(payload.longitude())
        .bind(&payload.address)
        .fetch_one(&state.pool)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(
            "Access log created successfully!",
            row_to_json(&row),
        )),
    ))
}

async fn update_access_log(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    JsonOrForm(payload): JsonOrForm<AccessLogPayload>,
) -> ApiResult<Json<Envelope>> {
    payload.validate()?;

    let row = sqlx::query(UPDATE_ACCESS_LOG)
        .bind(&payload.batch_number)
        .bind(&payload.product_name)
        .bind(payload.latitude())
        .bind(payload.longitude())
        .bind(&payload.address)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(ApiError::NotFound("Access log"))?;

    Ok(Json(Envelope::ok(
        "Access log updated successfully!",
        row_to_json(&row),
    )))
}

async fn delete_access_log(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Envelope>> {
    let row = sqlx::query("DELETE FROM access_logs WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(ApiError::NotFound("Access log"))?;

    Ok(Json(Envelope::ok(
        "Access log deleted successfully!",
        row_to_json(&row),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_payload() -> AccessLogPayload {
        AccessLogPayload {
            batch_number: Some("B1".to_string()),
            product_name: Some("Acme Widget".to_string()),
            latitude: Some(json!(12.9716)),
            longitude: Some(json!(77.5946)),
            address: Some("Bengaluru".to_string()),
        }
    }

    #[test]
    fn test_valid_payload_passes() {
        let payload = valid_payload();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.latitude(), Some(12.9716));
        assert_eq!(payload.longitude(), Some(77.5946));
    }

    #[test]
    fn test_out_of_range_longitude_is_keyed_by_field() {
        let payload = AccessLogPayload {
            longitude: Some(json!(200)),
            ..valid_payload()
        };
        let Err(ApiError::Validation(errors)) = payload.validate() else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "longitude");
    }

    #[test]
    fn test_string_coordinates_from_form_bodies_validate() {
        let payload = AccessLogPayload {
            latitude: Some(json!("-45.2")),
            longitude: Some(json!("170.1")),
            ..valid_payload()
        };
        assert!(payload.validate().is_ok());
        assert_eq!(payload.latitude(), Some(-45.2));
    }

    #[test]
    fn test_empty_payload_reports_every_field() {
        let payload = AccessLogPayload::default();
        let Err(ApiError::Validation(errors)) = payload.validate() else {
            panic!("expected validation failure");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec!["batch_number", "product_name", "latitude", "longitude", "address"]
        );
    }
}
