//! Database session: connect, fetch, close.

use crate::error::PadronError;
use crate::models::{ConnectionParams, ResultRow, SessionState};
use crate::services::connection::{Connector, DbConnection};

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Owns at most one open connection and its cursor.
///
/// The connection handle is `Some` only while the session is `Connected`.
/// Failures are logged here and returned to the caller; nothing is retried.
pub struct Session<C: Connector> {
    id: Uuid,
    params: ConnectionParams,
    connector: C,
    connection: Option<C::Connection>,
    state: SessionState,
    connected_at: Option<DateTime<Utc>>,
}

impl<C: Connector> Session<C> {
    /// Create an idle session. No connection is attempted yet.
    pub fn new(params: ConnectionParams, connector: C) -> Self {
        Self {
            id: Uuid::new_v4(),
            params,
            connector,
            connection: None,
            state: SessionState::Idle,
            connected_at: None,
        }
    }

    /// Get the session identifier used in logs.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the connection parameters.
    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    /// Get the current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Check if a connection is open.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Get when the current connection was opened.
    pub fn connected_at(&self) -> Option<DateTime<Utc>> {
        self.connected_at
    }

    /// Open the connection.
    ///
    /// On failure the session stays without a handle; the error is logged and
    /// returned. Calling this while connected does nothing.
    pub fn connect(&mut self) -> Result<(), PadronError> {
        if self.connection.is_some() {
            tracing::debug!(session_id = %self.id, "Already connected");
            return Ok(());
        }

        match self.connector.connect(&self.params) {
            Ok(connection) => {
                self.connection = Some(connection);
                self.state = SessionState::Connected;
                self.connected_at = Some(Utc::now());
                tracing::info!(
                    session_id = %self.id,
                    host = self.params.host.as_deref().unwrap_or_default(),
                    database = self.params.database.as_deref().unwrap_or_default(),
                    "Connected to database"
                );
                Ok(())
            }
            Err(e) => {
                self.connected_at = None;
                tracing::error!(session_id = %self.id, error = %e, "Failed to connect to database");
                Err(e)
            }
        }
    }

    /// Run a literal query and return its rows.
    pub fn fetch(&mut self, query: &str) -> Result<Vec<ResultRow>, PadronError> {
        let Some(connection) = self.connection.as_mut() else {
            tracing::warn!(session_id = %self.id, "No database connection");
            return Err(PadronError::NotConnected);
        };

        match connection.query(query) {
            Ok(rows) => {
                tracing::debug!(session_id = %self.id, row_count = rows.len(), "Query completed");
                Ok(rows)
            }
            Err(e) => {
                tracing::error!(session_id = %self.id, error = %e, "Failed to fetch data");
                Err(e)
            }
        }
    }

    /// Run a query, degrading any failure to an empty result.
    pub fn fetch_or_empty(&mut self, query: &str) -> Vec<ResultRow> {
        self.fetch(query).unwrap_or_default()
    }

    /// Release the connection if one is open. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(connection) = self.connection.take() {
            if let Err(e) = connection.close() {
                tracing::warn!(session_id = %self.id, error = %e, "Error while closing connection");
            }
            tracing::info!(session_id = %self.id, "Connection closed");
        }
        self.connected_at = None;
        self.state = SessionState::Closed;
    }
}

impl<C: Connector> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("params", &self.params)
            .field("state", &self.state)
            .field("connected_at", &self.connected_at)
            .finish()
    }
}
