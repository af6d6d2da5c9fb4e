//! Interactive state of the workbench shell.
//!
//! `WorkbenchApp` owns the dock controller and the page resolver and
//! turns key events into controller calls. The goto prompt and the help
//! overlay are modal: while one is open it consumes the keyboard.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::commands::{command_for_key, WorkbenchCommand};
use crate::dock::DockController;
use crate::pages::PageResolver;

#[derive(Debug, Default)]
pub struct GotoPrompt {
    pub visible: bool,
    pub input: String,
}

impl GotoPrompt {
    pub fn open(&mut self) {
        self.visible = true;
        self.input.clear();
    }

    pub fn close(&mut self) {
        self.visible = false;
        self.input.clear();
    }

    /// Closes the prompt and returns the trimmed input.
    pub fn take(&mut self) -> String {
        let text = self.input.trim().to_string();
        self.close();
        text
    }
}

pub struct WorkbenchApp {
    pub controller: DockController,
    pub resolver: PageResolver,
    pub prompt: GotoPrompt,
    pub show_help: bool,
    pub show_help_hint: bool,
    pub status: Option<String>,
    pub should_quit: bool,
}

impl WorkbenchApp {
    pub fn new(controller: DockController, resolver: PageResolver, show_help_hint: bool) -> Self {
        Self {
            controller,
            resolver,
            prompt: GotoPrompt::default(),
            show_help: false,
            show_help_hint,
            status: None,
            should_quit: false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.status = None;
        if self.prompt.visible {
            self.handle_prompt_key(key);
            return;
        }
        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return;
        }
        if let Some(cmd) = command_for_key(key.code, key.modifiers) {
            self.handle_command(cmd);
        }
    }

    pub fn handle_command(&mut self, cmd: WorkbenchCommand) {
        use WorkbenchCommand::*;
        match cmd {
            NextTab => self.activate_offset(1),
            PrevTab => self.activate_offset(-1),
            CloseTab => self.close_active(),
            OpenGoto => self.prompt.open(),
            OpenHome => {
                let route = self.controller.default_route().to_string();
                self.controller.open_tab(&route, None, None);
            }
            ToggleHelp => self.show_help = !self.show_help,
            Quit => self.should_quit = true,
            direct => {
                if let Some(position) = direct.tab_position() {
                    self.activate_position(position);
                }
            }
        }
    }

    fn handle_prompt_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.prompt.close(),
            KeyCode::Enter => self.submit_goto(),
            KeyCode::Backspace => {
                self.prompt.input.pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.prompt.input.push(c);
            }
            _ => {}
        }
    }

    fn submit_goto(&mut self) {
        let path = self.prompt.take();
        if path.is_empty() {
            return;
        }
        if !self.controller.open_tab(&path, None, None) {
            self.status = Some(format!("no route matches '{path}'"));
        }
    }

    fn activate_offset(&mut self, delta: isize) {
        let index = self.controller.index();
        let len = index.len();
        if len == 0 {
            return;
        }
        let current = index
            .active_id()
            .and_then(|id| index.position(id))
            .unwrap_or(0);
        let next = (current as isize + delta).rem_euclid(len as isize) as usize;
        let id = index.entries()[next].id.clone();
        self.controller.set_active_tab(&id);
    }

    fn activate_position(&mut self, position: usize) {
        let id = match self.controller.index().entries().get(position) {
            Some(entry) => entry.id.clone(),
            None => return,
        };
        self.controller.set_active_tab(&id);
    }

    fn close_active(&mut self) {
        let id = match self.controller.get_active_tab() {
            Some(tab) => tab.id.clone(),
            None => return,
        };
        self.controller.close_tab(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dock::MemoryStore;
    use ledgerdock_routes::RouteRegistry;

    fn app() -> WorkbenchApp {
        let registry = RouteRegistry::ledgerdock_default();
        let controller = DockController::restore(
            registry.clone(),
            Box::new(MemoryStore::new()),
            "/home",
        );
        let resolver = PageResolver::ledgerdock_default(registry);
        WorkbenchApp::new(controller, resolver, true)
    }

    fn press(app: &mut WorkbenchApp, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_path(app: &mut WorkbenchApp, path: &str) {
        press(app, KeyCode::Char('g'));
        for c in path.chars() {
            press(app, KeyCode::Char(c));
        }
        press(app, KeyCode::Enter);
    }

    #[test]
    fn goto_prompt_opens_tabs() {
        let mut app = app();
        type_path(&mut app, "/accounts");
        assert!(!app.prompt.visible);
        assert_eq!(
            app.controller.get_active_tab().map(|t| t.path.clone()),
            Some("/accounts".to_string())
        );
    }

    #[test]
    fn goto_prompt_reports_unroutable_paths() {
        let mut app = app();
        type_path(&mut app, "/payroll/cycle");
        assert_eq!(app.controller.get_all_tabs().len(), 1);
        assert!(app.status.as_deref().unwrap_or_default().contains("no route"));
    }

    #[test]
    fn escape_abandons_the_prompt() {
        let mut app = app();
        press(&mut app, KeyCode::Char('g'));
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Esc);
        assert!(!app.prompt.visible);
        assert!(app.prompt.input.is_empty());
        assert_eq!(app.controller.get_all_tabs().len(), 1);
    }

    #[test]
    fn tab_cycling_wraps_both_ways() {
        let mut app = app();
        app.controller.open_tab("/accounts", None, None);
        app.controller.open_tab("/journal", None, None);

        press(&mut app, KeyCode::Tab);
        assert_eq!(
            app.controller.get_active_tab().map(|t| t.path.clone()),
            Some("/home".to_string())
        );
        press(&mut app, KeyCode::BackTab);
        assert_eq!(
            app.controller.get_active_tab().map(|t| t.path.clone()),
            Some("/journal".to_string())
        );
    }

    #[test]
    fn digits_jump_to_tab_positions() {
        let mut app = app();
        app.controller.open_tab("/accounts", None, None);
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(
            app.controller.get_active_tab().map(|t| t.path.clone()),
            Some("/home".to_string())
        );
        // Out-of-range digits do nothing.
        press(&mut app, KeyCode::Char('9'));
        assert_eq!(
            app.controller.get_active_tab().map(|t| t.path.clone()),
            Some("/home".to_string())
        );
    }

    #[test]
    fn closing_the_last_tab_leaves_an_empty_workspace() {
        let mut app = app();
        press(&mut app, KeyCode::Char('x'));
        assert!(app.controller.get_all_tabs().is_empty());
        assert!(app.controller.get_active_tab().is_none());
        // A second close is a quiet no-op.
        press(&mut app, KeyCode::Char('x'));
        // Home reopens a tab.
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.controller.get_all_tabs().len(), 1);
    }

    #[test]
    fn help_overlay_swallows_keys_until_dismissed() {
        let mut app = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.controller.get_all_tabs().len(), 1);
        press(&mut app, KeyCode::Esc);
        assert!(!app.show_help);
    }

    #[test]
    fn quit_sets_the_flag() {
        let mut app = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
