//! Core types and services for the padron PostgreSQL console.
//!
//! - **error**: Error handling with PostgreSQL-specific details
//! - **models**: Connection parameters, session state, result rows
//! - **services**: Connector seam and the database session
//! - **menu**: Menu state machine and its console loop
//! - **logging**: Structured logging setup

pub mod error;
pub mod logging;
pub mod menu;
pub mod models;
pub mod services;

#[cfg(test)]
mod testing;

pub use error::PadronError;
pub use menu::{run_menu, MainMenu, MenuCommand, MenuEvent};
pub use models::{ConnectionParams, ResultRow, SessionState, SslMode, FIXED_QUERY};
pub use services::{Connector, DbConnection, PgConnection, PgConnector, Session};
