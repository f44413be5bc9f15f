//! Data models for the padron console.
//!
//! - `connection` - ConnectionParams, SslMode, SessionState
//! - `query` - ResultRow, the fixed query

pub mod connection;
pub mod query;

pub use connection::{ConnectionParams, SessionState, SslMode};
pub use query::{ResultRow, FIXED_QUERY};
