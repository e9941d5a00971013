//! # Schema Initializer
//!
//! Idempotent DDL for the three tables and the product-name index. Every
//! statement is `IF NOT EXISTS`, so re-running on each process start is safe.
//! The statements are independent: a failure on one is logged and does not
//! block the others.

use sqlx::PgPool;
use tracing::{error, info};

const CREATE_PRODUCT_MASTER: &str = "
    CREATE TABLE IF NOT EXISTS product_master (
        id SERIAL PRIMARY KEY,
        product_name VARCHAR(255) NOT NULL,
        product_image BYTEA,
        registration_number VARCHAR(100) UNIQUE NOT NULL,
        manufactured_by VARCHAR(255) NOT NULL,
        cautionary_symbol_image BYTEA,
        antidotes_statement TEXT,
        marked_by VARCHAR(255),
        customer_care_details TEXT,
        gstin VARCHAR(50),
        product_instruction_image BYTEA,
        created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )";

const CREATE_PRODUCT_NAME_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_product_name ON product_master(product_name)";

const CREATE_BATCH_PRODUCTION: &str = "
    CREATE TABLE IF NOT EXISTS batch_production (
        id SERIAL PRIMARY KEY,
        batch_number VARCHAR(255) NOT NULL,
        product_name VARCHAR(255) NOT NULL,
        identification_number VARCHAR(255),
        manufacture_date DATE,
        expiry_date DATE
    )";

const CREATE_ACCESS_LOGS: &str = "
    CREATE TABLE IF NOT EXISTS access_logs (
        id SERIAL PRIMARY KEY,
        batch_number VARCHAR(255),
        product_name VARCHAR(255),
        latitude DOUBLE PRECISION,
        longitude DOUBLE PRECISION,
        address VARCHAR(255),
        accessed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
    )";

/// Ensure the three tables and the secondary index exist.
pub async fn init_schema(pool: &PgPool) {
    let statements = [
        ("product_master", CREATE_PRODUCT_MASTER),
        ("idx_product_name", CREATE_PRODUCT_NAME_INDEX),
        ("batch_production", CREATE_BATCH_PRODUCTION),
        ("access_logs", CREATE_ACCESS_LOGS),
    ];

    for (name, statement) in statements {
        match sqlx::query(statement).execute(pool).await {
            Ok(_) => info!(object = name, "schema object ready"),
            Err(e) => error!(object = name, error = %e, "schema initialization failed"),
        }
    }
}
