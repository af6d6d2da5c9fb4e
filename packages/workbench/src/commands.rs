//! Workbench commands and their key bindings.

use crossterm::event::{KeyCode, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkbenchCommand {
    NextTab,
    PrevTab,
    GoToTab1,
    GoToTab2,
    GoToTab3,
    GoToTab4,
    GoToTab5,
    GoToTab6,
    GoToTab7,
    GoToTab8,
    GoToTab9,
    CloseTab,
    OpenGoto,
    OpenHome,
    ToggleHelp,
    Quit,
}

impl WorkbenchCommand {
    pub fn all() -> &'static [WorkbenchCommand] {
        use WorkbenchCommand::*;
        &[
            NextTab, PrevTab, GoToTab1, GoToTab2, GoToTab3, GoToTab4, GoToTab5, GoToTab6,
            GoToTab7, GoToTab8, GoToTab9, CloseTab, OpenGoto, OpenHome, ToggleHelp, Quit,
        ]
    }

    pub fn label(&self) -> &'static str {
        use WorkbenchCommand::*;
        match self {
            NextTab => "next tab",
            PrevTab => "previous tab",
            GoToTab1 => "go to tab 1",
            GoToTab2 => "go to tab 2",
            GoToTab3 => "go to tab 3",
            GoToTab4 => "go to tab 4",
            GoToTab5 => "go to tab 5",
            GoToTab6 => "go to tab 6",
            GoToTab7 => "go to tab 7",
            GoToTab8 => "go to tab 8",
            GoToTab9 => "go to tab 9",
            CloseTab => "close tab",
            OpenGoto => "go to route",
            OpenHome => "open home tab",
            ToggleHelp => "toggle help",
            Quit => "quit",
        }
    }

    pub fn binding_label(&self) -> &'static str {
        use WorkbenchCommand::*;
        match self {
            NextTab => "Tab / ]",
            PrevTab => "S-Tab / [",
            GoToTab1 => "1",
            GoToTab2 => "2",
            GoToTab3 => "3",
            GoToTab4 => "4",
            GoToTab5 => "5",
            GoToTab6 => "6",
            GoToTab7 => "7",
            GoToTab8 => "8",
            GoToTab9 => "9",
            CloseTab => "x / C-w",
            OpenGoto => "g",
            OpenHome => "h",
            ToggleHelp => "?",
            Quit => "q / C-c",
        }
    }

    /// Zero-based tab position for the direct-jump commands.
    pub fn tab_position(&self) -> Option<usize> {
        use WorkbenchCommand::*;
        match self {
            GoToTab1 => Some(0),
            GoToTab2 => Some(1),
            GoToTab3 => Some(2),
            GoToTab4 => Some(3),
            GoToTab5 => Some(4),
            GoToTab6 => Some(5),
            GoToTab7 => Some(6),
            GoToTab8 => Some(7),
            GoToTab9 => Some(8),
            _ => None,
        }
    }
}

/// Key dispatch for normal mode. The goto prompt consumes keys itself
/// while it is open.
pub fn command_for_key(code: KeyCode, modifiers: KeyModifiers) -> Option<WorkbenchCommand> {
    use WorkbenchCommand::*;
    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(Quit),
            KeyCode::Char('w') => Some(CloseTab),
            _ => None,
        };
    }
    match code {
        KeyCode::Tab => Some(NextTab),
        KeyCode::BackTab => Some(PrevTab),
        KeyCode::Char(']') => Some(NextTab),
        KeyCode::Char('[') => Some(PrevTab),
        KeyCode::Char('1') => Some(GoToTab1),
        KeyCode::Char('2') => Some(GoToTab2),
        KeyCode::Char('3') => Some(GoToTab3),
        KeyCode::Char('4') => Some(GoToTab4),
        KeyCode::Char('5') => Some(GoToTab5),
        KeyCode::Char('6') => Some(GoToTab6),
        KeyCode::Char('7') => Some(GoToTab7),
        KeyCode::Char('8') => Some(GoToTab8),
        KeyCode::Char('9') => Some(GoToTab9),
        KeyCode::Char('x') => Some(CloseTab),
        KeyCode::Char('g') => Some(OpenGoto),
        KeyCode::Char('h') => Some(OpenHome),
        KeyCode::Char('?') => Some(ToggleHelp),
        KeyCode::Char('q') => Some(Quit),
        _ => None,
    }
}
