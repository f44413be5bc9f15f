//! In-memory connector used by unit tests.

use crate::error::PadronError;
use crate::models::{ConnectionParams, ResultRow};
use crate::services::{Connector, DbConnection};

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Counters shared between a fake connector and its connections.
#[derive(Debug, Default)]
pub struct FakeStats {
    pub connects: Cell<usize>,
    pub queries: RefCell<Vec<String>>,
    pub closes: Cell<usize>,
}

/// Serves a fixed table; validates params like the real connector does.
pub struct FakeConnector {
    pub rows: Vec<ResultRow>,
    pub refuse_connect: bool,
    pub fail_queries: bool,
    pub stats: Rc<FakeStats>,
}

impl FakeConnector {
    pub fn with_rows(rows: Vec<ResultRow>) -> Self {
        Self { rows, refuse_connect: false, fail_queries: false, stats: Rc::default() }
    }

    pub fn refusing() -> Self {
        Self { refuse_connect: true, ..Self::with_rows(Vec::new()) }
    }

    pub fn failing_queries() -> Self {
        Self { fail_queries: true, ..Self::with_rows(Vec::new()) }
    }
}

impl Connector for FakeConnector {
    type Connection = FakeConnection;

    fn connect(&self, params: &ConnectionParams) -> Result<FakeConnection, PadronError> {
        params.validate()?;
        self.stats.connects.set(self.stats.connects.get() + 1);
        if self.refuse_connect {
            return Err(PadronError::Connection {
                message: "connection refused".to_string(),
                source: None,
            });
        }
        Ok(FakeConnection {
            rows: self.rows.clone(),
            fail_queries: self.fail_queries,
            stats: Rc::clone(&self.stats),
        })
    }
}

pub struct FakeConnection {
    rows: Vec<ResultRow>,
    fail_queries: bool,
    stats: Rc<FakeStats>,
}

impl DbConnection for FakeConnection {
    fn query(&mut self, sql: &str) -> Result<Vec<ResultRow>, PadronError> {
        self.stats.queries.borrow_mut().push(sql.to_string());
        if self.fail_queries {
            return Err(PadronError::query(
                "relation \"padron\" does not exist",
                None,
                None,
                Some(15),
                Some("42P01".to_string()),
            ));
        }
        Ok(self.rows.clone())
    }

    fn close(self) -> Result<(), PadronError> {
        self.stats.closes.set(self.stats.closes.get() + 1);
        Ok(())
    }
}

/// Parameters that pass validation.
pub fn valid_params() -> ConnectionParams {
    ConnectionParams {
        host: Some("localhost".to_string()),
        database: Some("padron".to_string()),
        user: Some("postgres".to_string()),
        password: Some("postgres".to_string()),
        port: Some("5432".to_string()),
        ..Default::default()
    }
}

/// Three rows shaped like the PADRON table.
pub fn padron_rows() -> Vec<ResultRow> {
    vec![
        vec![Some("1"), Some("García"), Some("Ana")].into_iter().collect(),
        vec![Some("2"), Some("López"), None].into_iter().collect(),
        vec![Some("3"), Some("Pérez"), Some("Luis")].into_iter().collect(),
    ]
}
