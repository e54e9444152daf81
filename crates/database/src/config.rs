use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_APP_NAME: &str = "data-connector-lib";
const DEFAULT_MAX_OPEN_CONNS: u32 = 20;
const DEFAULT_MAX_IDLE_CONNS: u32 = 10;
const DEFAULT_CONN_MAX_LIFETIME: Duration = Duration::from_secs(60 * 60);

/// Connection settings for a relational database.
///
/// Only the pool-sizing fields and the application name have defaults
/// (see [`DatabaseConfig::normalized`]); every other field is passed to the
/// driver as given.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Driver name. `postgres`, `postgresql` and `pgx` are supported.
    #[serde(default = "default_driver")]
    pub driver: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: String,
    /// Database name.
    #[serde(default)]
    pub database: String,
    /// `disable`, `allow`, `prefer`, `require`, `verify-ca` or `verify-full`.
    #[serde(default)]
    pub ssl_mode: String,
    /// Reported to the server as `application_name`.
    #[serde(default)]
    pub app_name: String,
    /// Pool size cap; `0` means the default of 20.
    #[serde(default)]
    pub max_open_conns: u32,
    /// Idle connection cap; `0` means the default of 10.
    #[serde(default)]
    pub max_idle_conns: u32,
    /// Maximum lifetime of a pooled connection, in seconds; `0` means one hour.
    #[serde(default, with = "duration_secs")]
    pub conn_max_lifetime: Duration,
}

fn default_driver() -> String {
    "postgres".to_owned()
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("driver", &self.driver)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .field("app_name", &self.app_name)
            .field("max_open_conns", &self.max_open_conns)
            .field("max_idle_conns", &self.max_idle_conns)
            .field("conn_max_lifetime", &self.conn_max_lifetime)
            .finish()
    }
}

impl DatabaseConfig {
    /// A `PostgreSQL` configuration for the given host and database.
    pub fn postgres(host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            driver: default_driver(),
            host: host.into(),
            port: "5432".to_owned(),
            database: database.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    #[must_use]
    pub fn with_ssl_mode(mut self, ssl_mode: impl Into<String>) -> Self {
        self.ssl_mode = ssl_mode.into();
        self
    }

    #[must_use]
    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }

    /// Fill unset fields with defaults. Never fails and never rejects a value.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.app_name.is_empty() {
            DEFAULT_APP_NAME.clone_into(&mut self.app_name);
        }
        if self.max_open_conns == 0 {
            self.max_open_conns = DEFAULT_MAX_OPEN_CONNS;
        }
        if self.max_idle_conns == 0 {
            self.max_idle_conns = DEFAULT_MAX_IDLE_CONNS;
        }
        if self.conn_max_lifetime.is_zero() {
            self.conn_max_lifetime = DEFAULT_CONN_MAX_LIFETIME;
        }
        self
    }

    /// Keyword/value connection string, e.g.
    /// `host=db port=5432 user=app password=s3cret dbname=orders sslmode=disable application_name=api`.
    pub fn dsn(&self) -> String {
        self.render_dsn(&self.password)
    }

    /// [`dsn`](Self::dsn) with the password masked, safe to log.
    pub fn redacted_dsn(&self) -> String {
        self.render_dsn("[REDACTED]")
    }

    fn render_dsn(&self, password: &str) -> String {
        format!(
            "host={} port={} user={} password={} dbname={} sslmode={} application_name={}",
            self.host, self.port, self.user, password, self.database, self.ssl_mode, self.app_name,
        )
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
