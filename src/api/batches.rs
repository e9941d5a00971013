//! # Batch Production Routes
//!
//! CRUD for `batch_production`, plus a lookup by `identification_number`.
//! Single-row reads join against `product_master` on `product_name` to
//! enrich the batch with product attributes; the reference is by name, not a
//! foreign key, so a missing product means 404 even when the batch row
//! exists.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use super::error::{ApiError, ApiResult};
use super::envelope::Envelope;
use super::extract::JsonOrForm;
use super::AppState;
use crate::db::row_to_json;
use crate::validation::{parse_date, RuleSet};

// Both tables' columns come back as-is; on name collisions (id,
// product_name) the product column wins in the JSON conversion.
const SELECT_BATCH_BY_ID: &str = "
    SELECT bp.*, pm.*
    FROM batch_production bp
    JOIN product_master pm ON bp.product_name = pm.product_name
    WHERE bp.id = $1";

const SELECT_BATCH_BY_IDENTIFICATION: &str = "
    SELECT bp.*, pm.*
    FROM batch_production bp
    JOIN product_master pm ON bp.product_name = pm.product_name
    WHERE bp.identification_number = $1";

const INSERT_BATCH: &str = "
    INSERT INTO batch_production
        (batch_number, product_name, identification_number, manufacture_date, expiry_date)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING *";

const UPDATE_BATCH: &str = "
    UPDATE batch_production
    SET batch_number = $1, product_name = $2, identification_number = $3,
        manufacture_date = $4, expiry_date = $5
    WHERE id = $6
    RETURNING *";

/// Create batch production routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_batches).post(create_batch))
        .route(
            "/{id}",
            get(get_batch).put(update_batch).delete(delete_batch),
        )
        .route(
            "/identification/{identification_number}",
            get(get_batch_by_identification),
        )
}

/// Incoming batch record. Dates stay textual until validated.
#[derive(Debug, Default, Deserialize)]
pub struct BatchPayload {
    pub batch_number: Option<String>,
    pub product_name: Option<String>,
    pub identification_number: Option<String>,
    pub manufacture_date: Option<String>,
    pub expiry_date: Option<String>,
}

impl BatchPayload {
    fn validate(&self) -> ApiResult<()> {
        RuleSet::new()
            .required("batch_number", &self.batch_number, "Batch number is required")
            .required("product_name", &self.product_name, "Product name is required")
            .optional_date(
                "manufacture_date",
                &self.manufacture_date,
                "Manufacture date must be a valid date",
            )
            .optional_date(
                "expiry_date",
                &self.expiry_date,
                "Expiry date must be a valid date",
            )
            .finish()
            .map_err(ApiError::Validation)
    }

    // Only called after validation, so a present date always parses.
    fn manufacture_date(&self) -> Option<NaiveDate> {
        self.manufacture_date.as_deref().and_then(parse_date)
    }

    fn expiry_date(&self) -> Option<NaiveDate> {
        self.expiry_date.as_deref().and_then(parse_date)
    }
}

async fn list_batches(State(state): State<AppState>) -> ApiResult<Json<Envelope>> {
    let rows = sqlx::query("SELECT * FROM batch_production")
        .fetch_all(&state.pool)
        .await?;

    let batches: Vec<Value> = rows.iter().map(row_to_json).collect();
    Ok(Json(Envelope::ok(
        "Batch productions retrieved successfully!",
        Value::Array(batches),
    )))
}

async fn get_batch(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Envelope>> {
    let row = sqlx::query(SELECT_BATCH_BY_ID)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(ApiError::NotFound("Batch production"))?;

    Ok(Json(Envelope::ok(
        "Batch production retrieved successfully!",
        row_to_json(&row),
    )))
}

async fn get_batch_by_identification(
    State(state): State<AppState>,
    Path(identification_number): Path<String>,
) -> ApiResult<Json<Envelope>> {
    let row = sqlx::query(SELECT_BATCH_BY_IDENTIFICATION)
        .bind(&identification_number)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(ApiError::NotFound("Batch production"))?;

    Ok(Json(Envelope::ok(
        "Batch production retrieved successfully!",
        row_to_json(&row),
    )))
}

async fn create_batch(
    State(state): State<AppState>,
    JsonOrForm(payload): JsonOrForm<BatchPayload>,
) -> ApiResult<(StatusCode, Json<Envelope>)> {
    payload.validate()?;

    let row = sqlx::query(INSERT_BATCH)
        .bind(&payload.batch_number)
        .bind(&payload.product_name)
        .bind(&payload.identification_number)
        .bind(payload.manufacture_date())
        .bind(payload.expiry_date())
        .fetch_one(&state.pool)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(
            "Batch production created successfully!",
            row_to_json(&row),
        )),
    ))
}

async fn update_batch(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    JsonOrForm(payload): JsonOrForm<BatchPayload>,
) -> ApiResult<Json<Envelope>> {
    payload.validate()?;

    let row = sqlx::query(UPDATE_BATCH)
        .bind(&payload.batch_number)
        .bind(&payload.product_name)
        .bind(&payload.identification_number)
        .bind(payload.manufacture_date())
        .bind(payload.expiry_date())
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(ApiError::NotFound("Batch production"))?;

    Ok(Json(Envelope::ok(
        "Batch production updated successfully!",
        row_to_json(&row),
    )))
}

async fn delete_batch(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Envelope>> {
    let row = sqlx::query("DELETE FROM batch_production WHERE id = $1 RETURNING *")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or(ApiError::NotFound("Batch production"))?;

    Ok(Json(Envelope::ok(
        "Batch production deleted successfully!",
        row_to_json(&row),
    )))
}
