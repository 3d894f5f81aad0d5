/// Post Service Library
///
/// Accepts short reports ("posts") about companies, tagged by city, and serves
/// listing, lookup and keyword search over them. Reads go through a Redis
/// cache-aside layer; writes are throttled per client and invalidate the
/// affected city listings.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route table
/// - `services`: the four query orchestrators (create, get, list, search)
/// - `cache`: cache keys, TTL policy and best-effort cache access
/// - `ratelimit`: fixed refreshable-window limiter over a counter store
/// - `db`: relational store contract and its PostgreSQL / in-memory adapters
/// - `models`: value objects and cached shapes
/// - `error`: error types and HTTP mapping
/// - `config`: configuration management
/// - `metrics`: Prometheus collectors
pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod ratelimit;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
