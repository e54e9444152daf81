//! Database connection factory.
//!
//! Turns a [`DatabaseConfig`] made of discrete fields (host, port, user, ...)
//! into a lazily connecting `PostgreSQL` pool, with pool defaults of 20 open
//! connections and a one hour connection lifetime.

pub mod config;
pub mod error;
pub mod pool;

pub use config::DatabaseConfig;
pub use error::DatabaseError;
pub use pool::{build_connect_options, connect, ping};
pub use sqlx::postgres::PgPool;
