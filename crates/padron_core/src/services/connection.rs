//! PostgreSQL connection handling over tokio-postgres.
//!
//! The rest of the crate is blocking and single-threaded, so [`PgConnector`]
//! owns a current-thread tokio runtime and blocks on every driver call. The
//! runtime only makes progress inside `block_on`, which is also where the
//! spawned connection driver gets polled.

use crate::error::PadronError;
use crate::models::{ConnectionParams, ResultRow, SslMode};

use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;
use tokio_postgres::SimpleQueryMessage;

/// Opens database connections.
pub trait Connector {
    /// The connection type this connector produces.
    type Connection: DbConnection;

    /// Open a connection using the given parameters.
    fn connect(&self, params: &ConnectionParams) -> Result<Self::Connection, PadronError>;
}

/// An open database connection together with its statement cursor.
pub trait DbConnection {
    /// Execute a literal query and collect every returned row, in order.
    fn query(&mut self, sql: &str) -> Result<Vec<ResultRow>, PadronError>;

    /// Release the cursor and then the connection.
    fn close(self) -> Result<(), PadronError>;
}

/// Connector for PostgreSQL with mandatory TLS.
pub struct PgConnector {
    runtime: Arc<Runtime>,
}

impl PgConnector {
    /// Create a connector with its own current-thread runtime.
    pub fn new() -> Result<Self, PadronError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| PadronError::internal(format!("Failed to create tokio runtime: {e}")))?;

        Ok(Self { runtime: Arc::new(runtime) })
    }

    /// Build the TLS connector for the configured mode.
    ///
    /// `Require` encrypts without verifying the certificate, like libpq's
    /// `sslmode=require`.
    fn tls_connector(ssl_mode: SslMode) -> Result<MakeTlsConnector, PadronError> {
        let mut builder = TlsConnector::builder();
        if ssl_mode == SslMode::Require {
            builder.danger_accept_invalid_certs(true);
        }
        let connector = builder.build()?;
        Ok(MakeTlsConnector::new(connector))
    }
}

impl Connector for PgConnector {
    type Connection = PgConnection;

    fn connect(&self, params: &ConnectionParams) -> Result<PgConnection, PadronError> {
        let pg_config = params.to_pg_config()?;
        let tls = Self::tls_connector(params.ssl_mode)?;

        tracing::debug!(
            url = %params.display_url(),
            ssl_mode = params.ssl_mode.as_str(),
            "Opening connection"
        );

        let (client, connection) = self.runtime.block_on(pg_config.connect(tls))?;

        let driver = self.runtime.spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(error = %e, "Connection driver exited with error");
            }
        });

        Ok(PgConnection { runtime: Arc::clone(&self.runtime), client, driver })
    }
}

/// An open PostgreSQL connection.
pub struct PgConnection {
    runtime: Arc<Runtime>,
    client: tokio_postgres::Client,
    driver: JoinHandle<()>,
}

impl DbConnection for PgConnection {
    fn query(&mut self, sql: &str) -> Result<Vec<ResultRow>, PadronError> {
        let messages = self.runtime.block_on(self.client.simple_query(sql))?;

        let mut rows = Vec::new();
        for message in messages {
            if let SimpleQueryMessage::Row(row) = message {
                if rows.is_empty() {
                    let columns: Vec<&str> = row.columns().iter().map(|c| c.name()).collect();
                    tracing::debug!(?columns, "Result columns");
                }
                rows.push((0..row.len()).map(|idx| row.get(idx)).collect::<ResultRow>());
            }
        }
        Ok(rows)
    }

    fn close(self) -> Result<(), PadronError> {
        let Self { runtime, client, driver } = self;

        // Dropping the client sends Terminate; the driver then completes.
        drop(client);
        runtime
            .block_on(driver)
            .map_err(|e| PadronError::connection_with_source("Connection driver task failed", e))
    }
}

impl std::fmt::Debug for PgConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgConnection")
            .field("is_closed", &self.client.is_closed())
            .finish()
    }
}
