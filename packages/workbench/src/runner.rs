//! The synchronous shell loop.

use std::io;
use std::panic;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::state::WorkbenchApp;
use crate::ui;

/// Restores the terminal however the shell exits.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Panic reports go to the log instead of stderr, which the alternate
/// screen owns while the shell runs. Page panics are caught at the page
/// boundary; anything else unwinds past the guard, which restores the
/// terminal on drop.
fn install_panic_logger() {
    panic::set_hook(Box::new(|info| {
        tracing::error!(panic = %info, "panic");
    }));
}

/// Blocking event loop: draw a frame, wait for input, repeat.
pub fn run_workbench(mut app: WorkbenchApp) -> Result<()> {
    install_panic_logger();
    let _guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;

    while !app.should_quit {
        terminal.draw(|f| ui::draw(f, &app))?;
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
            _ => {}
        }
    }
    Ok(())
}
