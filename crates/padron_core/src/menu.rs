//! Interactive menu as a small state machine.
//!
//! [`MainMenu`] turns discrete [`MenuCommand`]s into [`MenuEvent`]s and owns the
//! session lifecycle; [`run_menu`] is the line-oriented I/O shell around it.

use crate::error::PadronError;
use crate::models::{ResultRow, SessionState, FIXED_QUERY};
use crate::services::{Connector, Session};

use std::io::{self, BufRead, Write};

/// Menu header and options, printed before every prompt.
pub const MENU_TEXT: &str = "\nDatabase Menu\n1. Run query SELECT * FROM PADRON\n2. Exit\n";

/// Prompt printed after the menu.
pub const PROMPT: &str = "Choose an option: ";

/// A user choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuCommand {
    /// Option 1: run the fixed query
    RunQuery,
    /// Option 2: leave the program
    Exit,
    /// Anything else, as typed
    Invalid(String),
}

impl MenuCommand {
    /// Parse one line of user input.
    ///
    /// Only the line terminator is stripped, so `" 1"` is not option 1.
    pub fn parse(input: &str) -> Self {
        match input.trim_end_matches(['\r', '\n']) {
            "1" => Self::RunQuery,
            "2" => Self::Exit,
            other => Self::Invalid(other.to_string()),
        }
    }
}

/// Outcome of a menu step.
#[derive(Debug)]
pub enum MenuEvent {
    /// The startup connection succeeded
    Connected,
    /// The startup connection failed; the menu keeps running without one
    ConnectFailed(PadronError),
    /// The fixed query returned these rows
    Rows(Vec<ResultRow>),
    /// The fixed query could not run; treated as an empty result
    QueryFailed(PadronError),
    /// Input was not a menu option
    InvalidChoice(String),
    /// The session is closed and the loop is over
    Exited,
}

/// The main menu state machine.
///
/// States follow the session: `Idle` until the startup connect succeeds (or
/// for good if it fails), `Connected` afterwards, `Closed` once the user
/// exits. `Closed` is terminal.
pub struct MainMenu<C: Connector> {
    session: Session<C>,
}

impl<C: Connector> MainMenu<C> {
    /// Wrap a session that has not been connected yet.
    pub fn new(session: Session<C>) -> Self {
        Self { session }
    }

    /// Get the underlying session.
    pub fn session(&self) -> &Session<C> {
        &self.session
    }

    /// Get the current state.
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Check if the menu has reached its terminal state.
    pub fn is_finished(&self) -> bool {
        self.session.state().is_closed()
    }

    /// Connect once at startup.
    pub fn start(&mut self) -> MenuEvent {
        match self.session.connect() {
            Ok(()) => MenuEvent::Connected,
            Err(e) => MenuEvent::ConnectFailed(e),
        }
    }

    /// Apply one command.
    pub fn handle(&mut self, command: MenuCommand) -> MenuEvent {
        if self.is_finished() {
            return MenuEvent::Exited;
        }

        match command {
            MenuCommand::RunQuery => match self.session.fetch(FIXED_QUERY) {
                Ok(rows) => MenuEvent::Rows(rows),
                Err(e) => MenuEvent::QueryFailed(e),
            },
            MenuCommand::Exit => {
                self.session.close();
                MenuEvent::Exited
            }
            MenuCommand::Invalid(input) => {
                tracing::debug!(input = %input, "Invalid menu choice");
                MenuEvent::InvalidChoice(input)
            }
        }
    }
}

/// Write the user-facing text for an event.
pub fn render_event<W: Write>(event: &MenuEvent, output: &mut W) -> io::Result<()> {
    match event {
        MenuEvent::Connected => Ok(()),
        MenuEvent::ConnectFailed(e) => {
            writeln!(output, "Error connecting to the database: {e}")?;
            render_hint(e, output)
        }
        MenuEvent::Rows(rows) => {
            for row in rows {
                writeln!(output, "{row}")?;
            }
            Ok(())
        }
        MenuEvent::QueryFailed(e) if e.is_not_connected() => {
            writeln!(output, "No database connection.")
        }
        MenuEvent::QueryFailed(e) => {
            writeln!(output, "Error fetching data: {e}")?;
            if let Some(code) = e.pg_code() {
                writeln!(output, "Code: {code}")?;
            }
            render_hint(e, output)
        }
        MenuEvent::InvalidChoice(_) => writeln!(output, "Invalid option. Please try again."),
        MenuEvent::Exited => writeln!(output, "Exiting program."),
    }
}

fn render_hint<W: Write>(error: &PadronError, output: &mut W) -> io::Result<()> {
    match error.hint() {
        Some(hint) => writeln!(output, "Hint: {hint}"),
        None => Ok(()),
    }
}

/// Run the menu until the user exits or input ends.
///
/// Lines are read as bytes; invalid UTF-8 is just another invalid choice.
/// End of input counts as choosing Exit. The session is closed exactly once
/// even if writing to `output` fails.
pub fn run_menu<C, R, W>(menu: &mut MainMenu<C>, input: R, mut output: W) -> io::Result<()>
where
    C: Connector,
    R: BufRead,
    W: Write,
{
    let result = drive(menu, input, &mut output);
    if !menu.is_finished() {
        menu.handle(MenuCommand::Exit);
    }
    result
}

fn drive<C, R, W>(menu: &mut MainMenu<C>, input: R, output: &mut W) -> io::Result<()>
where
    C: Connector,
    R: BufRead,
    W: Write,
{
    let event = menu.start();
    render_event(&event, output)?;

    let mut input = input;
    let mut line = Vec::new();
    while !menu.is_finished() {
        write!(output, "{MENU_TEXT}{PROMPT}")?;
        output.flush()?;

        line.clear();
        let command = if input.read_until(b'\n', &mut line)? == 0 {
            writeln!(output)?;
            MenuCommand::Exit
        } else {
            MenuCommand::parse(&String::from_utf8_lossy(&line))
        };

        let event = menu.handle(command);
        render_event(&event, output)?;
    }
    Ok(())
}
