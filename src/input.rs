//! Key handling for the dashboard.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press asks the dashboard to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Leave the dashboard.
    Quit,
    /// A lone Esc quits; Esc followed at once by more input does not.
    ConfirmEscape,
    /// Keep running.
    None,
}

/// Maps key events to actions.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputHandler;

impl InputHandler {
    /// A handler with the fixed quit bindings.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// `q` and `Ctrl+C` quit, `Esc` quits once confirmed; releases are ignored.
    #[must_use]
    pub fn handle_key(&self, event: KeyEvent) -> Action {
        if event.kind == KeyEventKind::Release {
            return Action::None;
        }

        if event.modifiers.contains(KeyModifiers::CONTROL) {
            return match event.code {
                KeyCode::Char('c') => Action::Quit,
                _ => Action::None,
            };
        }

        match event.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Esc => Action::ConfirmEscape,
            _ => Action::None,
        }
    }

    /// Settles [`Action::ConfirmEscape`] given whether more input was
    /// already waiting right after the Esc.
    #[must_use]
    pub fn confirm_escape(&self, followup_pending: bool) -> Action {
        if followup_pending {
            Action::None
        } else {
            Action::Quit
        }
    }
}
