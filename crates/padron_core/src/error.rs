//! Error types for the padron console.
//!
//! Every failure the session can hit is reported through [`PadronError`] so the
//! menu (or any other caller) can branch on the kind instead of parsing text.

use thiserror::Error;

/// Main error type for padron.
#[derive(Debug, Error)]
pub enum PadronError {
    /// Database connection failed or was lost.
    #[error("Connection error: {message}")]
    Connection {
        /// Human-readable error message.
        message: String,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication failed.
    #[error("Authentication error: {message}")]
    Authentication {
        /// Human-readable error message.
        message: String,
        /// Actionable hint for the user.
        hint: Option<String>,
    },

    /// TLS negotiation or connector setup failed.
    #[error("SSL error: {message}")]
    Ssl {
        /// Human-readable error message.
        message: String,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution error with PostgreSQL-specific details.
    #[error("{message}")]
    Query {
        /// PostgreSQL error message.
        message: String,
        /// Additional detail from PostgreSQL.
        detail: Option<String>,
        /// PostgreSQL hint.
        hint: Option<String>,
        /// Position in query (1-indexed).
        position: Option<usize>,
        /// PostgreSQL error code (e.g., "42P01").
        code: Option<String>,
    },

    /// An operation needed an open connection and there was none.
    #[error("No database connection")]
    NotConnected,

    /// Connection parameters are missing or malformed.
    #[error("Config error: {message}")]
    Config {
        /// Human-readable error message.
        message: String,
    },

    /// Unexpected internal error.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// Optional underlying error source.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PadronError {
    // ========== Constructors ==========

    /// Create a new connection error with source.
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection { message: message.into(), source: Some(Box::new(source)) }
    }

    /// Create a new query error with full PostgreSQL details.
    pub fn query(
        message: impl Into<String>,
        detail: Option<String>,
        hint: Option<String>,
        position: Option<usize>,
        code: Option<String>,
    ) -> Self {
        Self::Query { message: message.into(), detail, hint, position, code }
    }

    /// Create a new config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create a new internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    // ========== Methods ==========

    /// Check if this error means there was no open connection to use.
    pub fn is_not_connected(&self) -> bool {
        matches!(self, Self::NotConnected)
    }

    /// Get actionable hint for the user.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Connection { .. } => Some("Check that the database server is reachable"),
            Self::Authentication { hint, .. } => hint.as_deref(),
            Self::Ssl { .. } => Some("The server must accept encrypted connections"),
            Self::Query { hint, .. } => hint.as_deref(),
            Self::NotConnected => Some("Restart after fixing the connection settings"),
            Self::Config { .. } => {
                Some("Set db_server_name, db_name, db_user, db_password and db_port")
            }
            Self::Internal { .. } => Some("Please report this issue"),
        }
    }

    /// Get PostgreSQL error code (if applicable).
    pub fn pg_code(&self) -> Option<&str> {
        match self {
            Self::Query { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

// ========== Error Conversions ==========

/// Convert from tokio_postgres::Error to PadronError.
impl From<tokio_postgres::Error> for PadronError {
    fn from(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let message = db_err.message().to_string();
            let detail = db_err.detail().map(String::from);
            let hint = db_err.hint().map(String::from);
            let position = db_err.position().and_then(|p| match p {
                tokio_postgres::error::ErrorPosition::Original(pos) => Some(*pos as usize),
                tokio_postgres::error::ErrorPosition::Internal { .. } => None,
            });

            let code_str = db_err.code().code();
            return match code_str {
                "28P01" => PadronError::Authentication {
                    message,
                    hint: Some("Invalid password - check db_password".to_string()),
                },
                "28000" => PadronError::Authentication {
                    message,
                    hint: Some("Authentication rejected - check db_user and pg_hba".to_string()),
                },
                _ if code_str.starts_with("08") => {
                    PadronError::Connection { message, source: Some(Box::new(err)) }
                }
                _ => PadronError::query(
                    message,
                    detail,
                    hint,
                    position,
                    Some(code_str.to_string()),
                ),
            };
        }

        let message = err.to_string();
        if message.starts_with("error performing TLS handshake") {
            return PadronError::Ssl { message, source: Some(Box::new(err)) };
        }

        if err.is_closed() {
            return PadronError::Connection {
                message: "Connection closed".to_string(),
                source: Some(Box::new(err)),
            };
        }

        PadronError::Connection { message, source: Some(Box::new(err)) }
    }
}

/// Convert from native_tls::Error to PadronError.
impl From<native_tls::Error> for PadronError {
    fn from(err: native_tls::Error) -> Self {
        PadronError::Ssl {
            message: format!("Failed to create TLS connector: {err}"),
            source: Some(Box::new(err)),
        }
    }
}
