use std::str::FromStr;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use tracing::{debug, info, instrument, warn};

use crate::config::DatabaseConfig;
use crate::error::DatabaseError;

const POSTGRES_DRIVERS: &[&str] = &["postgres", "postgresql", "pgx"];

/// Build `PgConnectOptions` from the discrete fields of a [`DatabaseConfig`].
///
/// Empty fields are left to the driver defaults (and the `PG*` environment
/// variables sqlx honours). A `port` or `ssl_mode` the driver cannot parse is
/// logged and left at its default as well; connection problems surface on
/// first use, never here.
pub fn build_connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    let mut options = PgConnectOptions::new();

    if !config.host.is_empty() {
        options = options.host(&config.host);
    }
    if !config.port.is_empty() {
        match config.port.parse::<u16>() {
            Ok(port) => options = options.port(port),
            Err(e) => warn!(port = %config.port, error = %e, "ignoring unparseable database port"),
        }
    }
    if !config.user.is_empty() {
        options = options.username(&config.user);
    }
    if !config.password.is_empty() {
        options = options.password(&config.password);
    }
    if !config.database.is_empty() {
        options = options.database(&config.database);
    }
    if !config.ssl_mode.is_empty() {
        match PgSslMode::from_str(&config.ssl_mode) {
            Ok(ssl_mode) => options = options.ssl_mode(ssl_mode),
            Err(e) => {
                warn!(ssl_mode = %config.ssl_mode, error = %e, "ignoring unknown database ssl_mode");
            }
        }
    }
    if !config.app_name.is_empty() {
        options = options.application_name(&config.app_name);
    }

    options
}

/// Open a connection pool for `config`.
///
/// Defaults are applied first ([`DatabaseConfig::normalized`]). The pool
/// connects lazily: no connection is attempted until the first query, so an
/// unreachable server surfaces on first use (or through [`ping`]). Must be
/// called from within a tokio runtime.
///
/// `max_idle_conns` has no sqlx counterpart; sqlx closes idle connections on
/// its own schedule and the value is only logged.
#[instrument(skip(config), fields(driver = %config.driver))]
pub fn connect(config: DatabaseConfig) -> Result<PgPool, DatabaseError> {
    let config = config.normalized();

    if !POSTGRES_DRIVERS.contains(&config.driver.as_str()) {
        return Err(DatabaseError::UnsupportedDriver(config.driver));
    }

    let options = build_connect_options(&config);
    debug!(dsn = %config.redacted_dsn(), "opening database pool");

    let pool = PgPoolOptions::new()
        .max_connections(config.max_open_conns)
        .max_lifetime(config.conn_max_lifetime)
        .connect_lazy_with(options);

    info!(
        max_open_conns = config.max_open_conns,
        max_idle_conns = config.max_idle_conns,
        conn_max_lifetime = ?config.conn_max_lifetime,
        "database pool ready"
    );
    Ok(pool)
}

/// Run `SELECT 1` to check the database is reachable.
pub async fn ping(pool: &PgPool) -> Result<(), DatabaseError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
