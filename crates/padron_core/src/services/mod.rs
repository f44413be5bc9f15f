//! Backend services for the padron console.
//!
//! - `connection` - Connector seam and the tokio-postgres implementation
//! - `session` - Connection lifecycle (connect, fetch, close)

pub mod connection;
pub mod session;

pub use connection::{Connector, DbConnection, PgConnection, PgConnector};
pub use session::Session;
