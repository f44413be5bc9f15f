//! Padron - a console menu for querying the PADRON table over PostgreSQL.

use padron_core::logging::{init_logging, LogConfig};
use padron_core::{run_menu, ConnectionParams, MainMenu, PgConnector, Session};

fn main() {
    let _logging_guard = init_logging(LogConfig::new(padron_core::logging::log_dir()));

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting padron");

    let params = ConnectionParams::load();

    // Setup failures are reported but never change the exit status.
    let connector = match PgConnector::new() {
        Ok(connector) => connector,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize database connector");
            eprintln!("Error: {e}");
            return;
        }
    };

    let mut menu = MainMenu::new(Session::new(params, connector));

    let stdin = std::io::stdin();
    if let Err(e) = run_menu(&mut menu, stdin.lock(), std::io::stdout()) {
        tracing::error!(error = %e, "Console I/O failed");
    }

    tracing::info!(session_id = %menu.session().id(), "Exiting padron");
}
