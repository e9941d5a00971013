//! batchtrack - CRUD API for manufactured products, their production batches
//! and location-tagged access events, backed by PostgreSQL.

pub mod api;
pub mod config;
pub mod db;
pub mod validation;
