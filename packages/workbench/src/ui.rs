//! Frame rendering for the workbench shell.

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use crate::commands::WorkbenchCommand;
use crate::pages;
use crate::state::WorkbenchApp;

const MAX_TAB_TITLE_WIDTH: usize = 18;

pub fn draw(f: &mut Frame, app: &WorkbenchApp) {
    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .split(f.area());

    render_tab_bar(f, app, chunks[0]);
    render_page(f, app, chunks[1]);
    render_status_bar(f, app, chunks[2]);

    if app.prompt.visible {
        render_goto_prompt(f, app);
    }
    if app.show_help {
        render_help_overlay(f);
    }
}

fn render_tab_bar(f: &mut Frame, app: &WorkbenchApp, area: Rect) {
    let index = app.controller.index();
    let titles: Vec<Line> = index
        .entries()
        .iter()
        .enumerate()
        .map(|(position, tab)| {
            let numeral = if position < 9 {
                format!("{}:", position + 1)
            } else {
                String::new()
            };
            Line::from(vec![
                Span::styled(numeral, Style::default().fg(Color::DarkGray)),
                Span::raw(truncate_title(&tab.title, MAX_TAB_TITLE_WIDTH)),
            ])
        })
        .collect();
    let selected = index.active_id().and_then(|id| index.position(id));
    let tabs = Tabs::new(titles)
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(Span::styled("│", Style::default().fg(Color::DarkGray)));
    f.render_widget(tabs, area);
}

fn render_page(f: &mut Frame, app: &WorkbenchApp, area: Rect) {
    match app.controller.get_active_tab() {
        Some(tab) => {
            let page = app.resolver.resolve(tab);
            pages::render_guarded(page.as_ref(), area, f.buffer_mut());
        }
        None => {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from("No open tabs."),
                Line::from(""),
                Line::from("Press 'g' to open a route or 'h' for the home tab."),
            ])
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray));
            f.render_widget(empty, area);
        }
    }
}

fn render_status_bar(f: &mut Frame, app: &WorkbenchApp, area: Rect) {
    let left = match &app.status {
        Some(message) => Line::from(Span::styled(
            format!(" {message}"),
            Style::default().fg(Color::Yellow),
        )),
        None => {
            let path = app
                .controller
                .get_active_tab()
                .map(|tab| tab.path.as_str())
                .unwrap_or("");
            Line::from(Span::styled(
                format!(" {path}"),
                Style::default().fg(Color::Cyan),
            ))
        }
    };
    f.render_widget(Paragraph::new(left), area);

    if app.show_help_hint {
        let hints = Line::from(Span::styled(
            "g goto  x close  ? help  q quit ",
            Style::default().fg(Color::DarkGray),
        ));
        f.render_widget(Paragraph::new(hints).alignment(Alignment::Right), area);
    }
}

fn render_goto_prompt(f: &mut Frame, app: &WorkbenchApp) {
    let area = centered_rect(56, 4, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(" Go to route ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let lines = vec![
        Line::from(vec![
            Span::raw(app.prompt.input.clone()),
            Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)),
        ]),
        Line::from(Span::styled(
            "Enter opens, Esc cancels. Try /accounts or /tasks/7.",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_help_overlay(f: &mut Frame) {
    let commands = WorkbenchCommand::all();
    let height = commands.len() as u16 + 2;
    let area = centered_rect(40, height, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(" Key bindings ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let lines: Vec<Line> = commands
        .iter()
        .map(|cmd| {
            Line::from(vec![
                Span::styled(
                    format!(" {:<11}", cmd.binding_label()),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(cmd.label()),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn truncate_title(title: &str, max: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for c in title.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if width + w > max {
            out.push('…');
            break;
        }
        width += w;
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_titles_pass_through() {
        assert_eq!(truncate_title("Overview", 18), "Overview");
    }

    #[test]
    fn long_titles_are_cut_at_display_width() {
        let long = "A very long client profile title";
        let cut = truncate_title(long, 10);
        assert!(cut.ends_with('…'));
        assert!(cut.chars().count() <= 11);
    }

    #[test]
    fn wide_glyphs_count_for_their_display_width() {
        let cut = truncate_title("株式会社ブライト", 6);
        // Three double-width glyphs fill the budget.
        assert_eq!(cut, "株式会…");
    }

    #[test]
    fn centered_rect_clamps_to_the_frame() {
        let area = Rect::new(0, 0, 20, 5);
        let rect = centered_rect(56, 4, area);
        assert!(rect.width <= 20);
        assert!(rect.height <= 5);
        assert_eq!(rect.x, 0);
    }

    #[test]
    fn help_lists_every_command() {
        assert_eq!(WorkbenchCommand::all().len(), 16);
    }
}
