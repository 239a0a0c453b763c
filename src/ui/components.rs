//! Reusable UI components for the TUI.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppMode};

/// Render the help bar with context-sensitive key bindings.
pub fn render_help_bar(f: &mut Frame, area: Rect, app: &App) {
    let help = Paragraph::new(Line::from(build_help_text(app)))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));

    f.render_widget(help, area);
}

fn build_help_text(app: &App) -> Vec<Span<'static>> {
    let key_style = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let text_style = Style::default().fg(Color::White);
    let sep_style = Style::default().fg(Color::DarkGray);

    let bindings: &[(&'static str, &'static str)] = match app.mode {
        AppMode::ConfirmDelete => &[("Y", "Confirm"), ("N/Esc", "Cancel")],
        AppMode::Message => &[("any key", "Close")],
        AppMode::Disconnected => &[("R", "Reconnect"), ("Q/Esc", "Quit")],
        AppMode::Normal => &[
            ("↑↓/jk", "Move"),
            ("Enter", "Open"),
            ("Bksp", "Up"),
            ("Space", "Select"),
            ("t", "Transfer"),
            ("d", "Delete"),
            ("r", "Refresh"),
            ("Tab", "Switch"),
            ("q", "Quit"),
        ],
    };

    let mut spans = Vec::new();
    for (i, (key, action)) in bindings.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" │ ", sep_style));
        }
        spans.push(Span::styled(*key, key_style));
        spans.push(Span::styled(format!(":{}", action), text_style));
    }
    spans
}

/// Render the status bar with message and selection count.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.active_pane().selection_count();
    let text = if selected > 0 {
        format!("{} │ {} selected", app.message, selected)
    } else {
        app.message.clone()
    };

    let status = Paragraph::new(text).style(Style::default().bg(Color::Blue).fg(Color::White));

    f.render_widget(status, area);
}

/// Render a centered popup dialog.
pub fn render_popup(f: &mut Frame, title: &str, lines: Vec<Line>, style: Style) {
    let area = f.area();

    let max_line_width = lines.iter().map(|l| l.width()).max().unwrap_or(20) as u16;

    let popup_width = (max_line_width + 4).max(40).min(area.width.saturating_sub(4));
    let popup_height = (lines.len() as u16 + 4).min(area.height.saturating_sub(2));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    f.render_widget(Clear, popup_area);

    let popup = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(style)
                .title(title)
                .title_style(style.add_modifier(Modifier::BOLD)),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(popup, popup_area);
}

/// Render whichever popup the current mode calls for.
pub fn render_mode_popup(f: &mut Frame, app: &App) {
    match app.mode {
        AppMode::Normal => {}
        AppMode::ConfirmDelete => render_delete_confirm(f, app),
        AppMode::Message => {
            let text = app.popup.clone().unwrap_or_default();
            let lines = vec![Line::from(""), Line::from(text), Line::from("")];
            render_popup(f, " Error ", lines, Style::default().fg(Color::Red));
        }
        AppMode::Disconnected => {
            let text = app.popup.clone().unwrap_or_default();
            let lines = vec![
                Line::from(""),
                Line::from(text),
                Line::from(""),
                Line::from(vec![
                    Span::styled("[R]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                    Span::raw(" Reconnect  "),
                    Span::styled("[Q]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
                    Span::raw(" Quit"),
                ]),
            ];
            render_popup(f, " Connection lost ", lines, Style::default().fg(Color::Red));
        }
    }
}

fn render_delete_confirm(f: &mut Frame, app: &App) {
    let pane = app.active_pane();

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("Really delete ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(format!("{} item(s)", pane.selection_count())),
            Span::raw(" ("),
            Span::styled(pane.label().to_string(), Style::default().fg(Color::Yellow)),
            Span::raw(")?"),
        ]),
        Line::from(""),
        Line::from(vec![Span::styled(
            truncate_path(pane.location(), 60),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        Line::from(vec![
            Span::styled("[Y]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw(" Yes  "),
            Span::styled("[N/Esc]", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(" No"),
        ]),
    ];

    render_popup(f, " ⚠ Confirm Delete ", lines, Style::default().fg(Color::Red));
}

/// Keep the tail of a long path.
fn truncate_path(path: &str, max_len: usize) -> String {
    let count = path.chars().count();
    if count <= max_len {
        path.to_string()
    } else {
        let tail: String = path.chars().skip(count - max_len + 3).collect();
        format!("...{}", tail)
    }
}
