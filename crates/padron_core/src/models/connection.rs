//! Connection parameters and session lifecycle models.

use crate::error::PadronError;

use std::path::Path;

/// Default PostgreSQL port used when `db_port` is not set.
pub const DEFAULT_PORT: u16 = 5432;

/// Environment variable names read at startup.
pub const ENV_HOST: &str = "db_server_name";
pub const ENV_DATABASE: &str = "db_name";
pub const ENV_USER: &str = "db_user";
pub const ENV_PASSWORD: &str = "db_password";
pub const ENV_PORT: &str = "db_port";
pub const ENV_SSL_MODE: &str = "db_sslmode";

/// Lifecycle of a [`Session`](crate::services::Session).
///
/// `Idle` covers both "never connected" and "connect failed"; in both cases no
/// handle is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No open connection
    #[default]
    Idle,
    /// Connection open and usable
    Connected,
    /// Connection released
    Closed,
}

impl SessionState {
    /// Check if the session has been closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// TLS mode for the database connection. There is no plaintext mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SslMode {
    /// Require TLS, accept any certificate
    #[default]
    Require,
    /// Require TLS, verify CA and hostname
    VerifyFull,
}

impl SslMode {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Require => "require",
            Self::VerifyFull => "verify-full",
        }
    }

    /// Parse from string representation, falling back to `Require`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "verify-full" | "verify_full" => Self::VerifyFull,
            _ => Self::Require,
        }
    }
}

/// Parameters for the single database connection.
///
/// Values are kept exactly as found in the environment; they are only checked
/// when a connection is attempted, so a bad setup degrades to a failed
/// `connect` instead of aborting the program.
#[derive(Clone, Default)]
pub struct ConnectionParams {
    /// Server hostname or IP
    pub host: Option<String>,
    /// Database name
    pub database: Option<String>,
    /// Login username
    pub user: Option<String>,
    /// Login password
    pub password: Option<String>,
    /// Server port, as text
    pub port: Option<String>,
    /// TLS configuration
    pub ssl_mode: SslMode,
}

impl ConnectionParams {
    /// Build parameters from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: lookup(ENV_HOST),
            database: lookup(ENV_DATABASE),
            user: lookup(ENV_USER),
            password: lookup(ENV_PASSWORD),
            port: lookup(ENV_PORT),
            ssl_mode: lookup(ENV_SSL_MODE).map(|s| SslMode::parse(&s)).unwrap_or_default(),
        }
    }

    /// Read parameters from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load `.env` from the working directory (if any), then read the environment.
    pub fn load() -> Self {
        Self::load_from(".env")
    }

    /// Load an env file (if it exists), then read the environment.
    ///
    /// Variables already set in the process win over the file. A missing or
    /// unreadable file is logged and otherwise ignored.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match dotenvy::from_path(path) {
            Ok(()) => tracing::debug!(path = %path.display(), "Loaded env file"),
            Err(e) if e.not_found() => tracing::debug!(path = %path.display(), "No env file found"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to read env file"),
        }
        Self::from_env()
    }

    /// Parse the configured port, defaulting to 5432 when unset.
    pub fn port_number(&self) -> Result<u16, PadronError> {
        match self.port.as_deref().map(str::trim) {
            None | Some("") => Ok(DEFAULT_PORT),
            Some(raw) => raw
                .parse::<u16>()
                .ok()
                .filter(|port| *port != 0)
                .ok_or_else(|| PadronError::config(format!("Invalid {ENV_PORT}: {raw:?}"))),
        }
    }

    /// Validate the parameters.
    pub fn validate(&self) -> Result<(), PadronError> {
        require(&self.host, ENV_HOST)?;
        require(&self.database, ENV_DATABASE)?;
        require(&self.user, ENV_USER)?;
        self.port_number()?;
        Ok(())
    }

    /// Build the driver configuration, validating first.
    pub fn to_pg_config(&self) -> Result<tokio_postgres::Config, PadronError> {
        self.validate()?;

        let mut pg_config = tokio_postgres::Config::new();
        pg_config.host(self.host.as_deref().unwrap_or_default());
        pg_config.port(self.port_number()?);
        pg_config.dbname(self.database.as_deref().unwrap_or_default());
        pg_config.user(self.user.as_deref().unwrap_or_default());
        if let Some(password) = &self.password {
            pg_config.password(password);
        }
        pg_config.application_name("padron");
        pg_config.ssl_mode(tokio_postgres::config::SslMode::Require);
        Ok(pg_config)
    }

    /// Get the display connection string (without password).
    pub fn display_url(&self) -> String {
        let port = self.port_number().unwrap_or(DEFAULT_PORT);
        format!(
            "postgresql://{}@{}:{}/{}",
            self.user.as_deref().unwrap_or(""),
            self.host.as_deref().unwrap_or(""),
            port,
            self.database.as_deref().unwrap_or("")
        )
    }
}

impl std::fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("port", &self.port)
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

fn require(value: &Option<String>, name: &str) -> Result<(), PadronError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(()),
        _ => Err(PadronError::config(format!("{name} is not set"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            (ENV_HOST, "db.example.com"),
            (ENV_DATABASE, "censo"),
            (ENV_USER, "reader"),
            (ENV_PASSWORD, "s3cret"),
            (ENV_PORT, "6543"),
        ])
    }

    fn params_from(env: &HashMap<&'static str, &'static str>) -> ConnectionParams {
        ConnectionParams::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_from_lookup_reads_all_fields() {
        let params = params_from(&full_env());
        assert_eq!(params.host.as_deref(), Some("db.example.com"));
        assert_eq!(params.database.as_deref(), Some("censo"));
        assert_eq!(params.user.as_deref(), Some("reader"));
        assert_eq!(params.password.as_deref(), Some("s3cret"));
        assert_eq!(params.port_number().unwrap(), 6543);
        assert_eq!(params.ssl_mode, SslMode::Require);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_missing_port_defaults() {
        let mut env = full_env();
        env.remove(ENV_PORT);
        let params = params_from(&env);
        assert_eq!(params.port_number().unwrap(), DEFAULT_PORT);
    }

    #[test]
    fn test_invalid_port_is_config_error() {
        for bad in ["abc", "70000", "0", "-1"] {
            let mut env = full_env();
            env.insert(ENV_PORT, bad);
            let err = params_from(&env).validate().unwrap_err();
            assert!(matches!(err, PadronError::Config { .. }), "port {bad}");
        }
    }

    #[test]
    fn test_missing_host_is_config_error() {
        let mut env = full_env();
        env.remove(ENV_HOST);
        let err = params_from(&env).to_pg_config().unwrap_err();
        assert_eq!(err.to_string(), "Config error: db_server_name is not set");
    }

    #[test]
    fn test_blank_user_is_config_error() {
        let mut env = full_env();
        env.insert(ENV_USER, "   ");
        assert!(params_from(&env).validate().is_err());
    }

    #[test]
    fn test_to_pg_config_requires_tls() {
        let pg_config = params_from(&full_env()).to_pg_config().unwrap();
        assert_eq!(pg_config.get_ssl_mode(), tokio_postgres::config::SslMode::Require);
        assert_eq!(pg_config.get_ports(), &[6543]);
        assert_eq!(pg_config.get_dbname(), Some("censo"));
        assert_eq!(pg_config.get_user(), Some("reader"));
    }

    #[test]
    fn test_debug_redacts_password() {
        let params = params_from(&full_env());
        let debug = format!("{params:?}");
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_display_url_has_no_password() {
        let params = params_from(&full_env());
        assert_eq!(params.display_url(), "postgresql://reader@db.example.com:6543/censo");
    }

    #[test]
    fn test_ssl_mode_parse() {
        assert_eq!(SslMode::parse("verify-full"), SslMode::VerifyFull);
        assert_eq!(SslMode::parse("VERIFY_FULL"), SslMode::VerifyFull);
        assert_eq!(SslMode::parse("require"), SslMode::Require);
        assert_eq!(SslMode::parse("disable"), SslMode::Require);
    }

    // The only test that touches the process environment, and only the db_* keys.
    #[test]
    fn test_load_from_prefers_process_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "db_server_name=from-file").unwrap();
        writeln!(file, "db_name=padron").unwrap();
        writeln!(file, "db_sslmode=verify-full").unwrap();
        drop(file);

        for key in [ENV_DATABASE, ENV_USER, ENV_PASSWORD, ENV_PORT, ENV_SSL_MODE] {
            std::env::remove_var(key);
        }
        std::env::set_var(ENV_HOST, "from-process");

        let params = ConnectionParams::load_from(&path);
        assert_eq!(params.host.as_deref(), Some("from-process"));
        assert_eq!(params.database.as_deref(), Some("padron"));
        assert_eq!(params.ssl_mode, SslMode::VerifyFull);

        // A missing file is not an error; the environment is still read.
        let params = ConnectionParams::load_from(dir.path().join("missing.env"));
        assert_eq!(params.host.as_deref(), Some("from-process"));

        for key in [ENV_HOST, ENV_DATABASE, ENV_SSL_MODE] {
            std::env::remove_var(key);
        }
    }
}
