//! PostgreSQL persistence
//!
//! Stores products and job executions in PostgreSQL through a
//! `deadpool-postgres` connection pool.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;
pub use models::{JobExecutionRow, ProductRow};
