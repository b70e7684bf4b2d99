use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Focus, Popup};
use crate::form::FormField;
use crate::notify::Level;
use crate::page::{EquipmentRow, PageView, EMPTY_TEXT, LOADING_TEXT};
use crate::theme::Theme;

/// Lines taken by one equipment row, separator included
const ROW_HEIGHT: u16 = 5;

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(3),               // Page header
            Constraint::Min(8),                  // Form + listing panes
            Constraint::Length(1),               // Info line (toasts)
            Constraint::Length(1),               // Footer
        ])
        .split(area);

    draw_header(f, app, chunks[0]);

    // Side by side when wide enough, stacked otherwise
    let direction = if area.width < 90 { Direction::Vertical } else { Direction::Horizontal };
    let panes = Layout::default()
        .direction(direction)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(chunks[1]);

    draw_form_box(f, app, panes[0]);
    draw_equipment_box(f, app, panes[1]);
    draw_info_line(f, app, chunks[2]);
    draw_footer(f, app, chunks[3]);

    if app.popup == Popup::Help {
        draw_help_popup(f, &app.theme);
    }
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let lines = vec![
        Line::from(Span::styled(
            "Equipment Barter",
            Style::default().fg(t.header).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "List your farming equipment for exchange with other farmers. Help build a collaborative farming community.",
            Style::default().fg(t.text_dim),
        )),
    ];
    let header = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(header, area);
}

fn pane_block<'a>(title: &'a str, active: bool, t: &Theme) -> Block<'a> {
    let border_color = if active { t.accent } else { t.inactive };
    let title_style = if active {
        Style::default().fg(t.accent).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(t.inactive)
    };

    Block::default()
        .title(Span::styled(title, title_style))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
}

fn draw_form_box(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let active = app.focus == Focus::Form;
    let block = pane_block(" List Your Equipment ", active, t);

    let mut lines = Vec::new();
    for field in FormField::ALL {
        let focused = active && app.form.focus() == field;
        let label_style = if focused {
            Style::default().fg(t.accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(t.text_dim)
        };

        let value = app.form.value(field);
        let value_span = match field {
            FormField::Condition => Span::styled(format!("◂ {} ▸", value), Style::default().fg(t.text)),
            FormField::ExpectedValue => Span::styled(format!("{}{}", app.currency, value), Style::default().fg(t.text)),
            _ => Span::styled(value.to_string(), Style::default().fg(t.text)),
        };

        let mut spans = vec![
            Span::styled(if focused { "› " } else { "  " }, label_style),
            Span::styled(format!("{:<15}", field.label()), label_style),
            value_span,
        ];
        if focused && field != FormField::Condition {
            spans.push(Span::styled("_", Style::default().fg(t.accent)));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    if app.submitting {
        lines.push(Line::styled("  Submitting...", Style::default().fg(t.text_dim)));
    } else if let Some(err) = app.form.error() {
        lines.push(Line::styled(format!("  {}", err), Style::default().fg(t.danger)));
    } else {
        lines.push(Line::from(vec![
            Span::styled("  F2", Style::default().fg(t.accent)),
            Span::styled(" List Equipment", Style::default().fg(t.text_dim)),
        ]));
    }

    let form = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    f.render_widget(form, area);
}

fn draw_equipment_box(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let active = app.focus == Focus::Listing;
    let block = pane_block(" Available Equipment ", active, t);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let centered = |text: String, color: Color| {
        Paragraph::new(vec![Line::from(""), Line::styled(text, Style::default().fg(color))])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
    };

    match app.page.view(&app.currency) {
        PageView::Loading => f.render_widget(centered(LOADING_TEXT.to_string(), t.text_dim), inner),
        PageView::Error(message) => f.render_widget(centered(message, t.danger), inner),
        PageView::Empty => f.render_widget(centered(EMPTY_TEXT.to_string(), t.text_dim), inner),
        PageView::List(rows) => {
            // Keep the selected row in view
            let visible = (inner.height / ROW_HEIGHT).max(1) as usize;
            let skip = app.selected.saturating_sub(visible - 1);

            let lines: Vec<Line> = rows
                .iter()
                .enumerate()
                .skip(skip)
                .take(visible)
                .flat_map(|(i, row)| row_lines(row, active && i == app.selected, t))
                .collect();
            f.render_widget(Paragraph::new(lines), inner);
        }
    }
}

fn row_lines<'a>(row: &'a EquipmentRow, selected: bool, t: &Theme) -> Vec<Line<'a>> {
    let base = if selected {
        Style::default().bg(t.bg_selected)
    } else {
        Style::default()
    };
    let dim = base.fg(t.text_dim);

    vec![
        Line::from(vec![
            Span::styled(&row.name, base.fg(t.text).add_modifier(Modifier::BOLD)),
            Span::styled("  ", base),
            Span::styled(" Barter ", base.fg(t.success).add_modifier(Modifier::REVERSED)),
        ]),
        Line::styled(&row.description, dim),
        Line::styled(format!("Condition: {}   Value: {}", row.condition, row.value), dim),
        Line::styled(format!("Location: {}   Owner: {}", row.location, row.owner), dim),
        Line::styled("─".repeat(24), Style::default().fg(t.inactive)),
    ]
}

fn draw_info_line(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let line = match app.toasts.current() {
        Some(toast) => {
            let (icon, color) = match toast.level {
                Level::Info => ("ℹ ", t.info),
                Level::Success => ("✓ ", t.success),
                Level::Error => ("✗ ", t.danger),
            };
            Line::from(vec![
                Span::styled(icon, Style::default().fg(color)),
                Span::styled(toast.message.as_str(), Style::default().fg(color)),
            ])
        }
        None => Line::from(Span::styled("Ready", Style::default().fg(t.text_dim))),
    };

    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let hints: Vec<(&str, &str)> = match app.focus {
        Focus::Form => vec![
            ("↑↓", "Field"),
            ("←→", "Condition"),
            ("F2", "Submit"),
            ("Tab", "Listings"),
            ("F1", "Help"),
        ],
        Focus::Listing => vec![
            ("↑↓", "Nav"),
            ("Space", "Barter"),
            ("R", "Reload"),
            ("Tab", "Form"),
            ("h", "Help"),
            ("q", "Quit"),
        ],
    };

    // Responsive: show fewer hints on narrow terminals
    let max_hints = if area.width < 60 { 4 } else { hints.len() };

    let hint_spans: Vec<Span> = hints
        .iter()
        .take(max_hints)
        .flat_map(|(key, action)| {
            vec![
                Span::styled(*key, Style::default().fg(t.accent)),
                Span::styled(format!(" {} │ ", action), Style::default().fg(t.text_dim)),
            ]
        })
        .collect();

    f.render_widget(Paragraph::new(Line::from(hint_spans)), area);
}

fn draw_help_popup(f: &mut Frame, t: &Theme) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let section = |title: &'static str| {
        Line::from(Span::styled(title, Style::default().fg(t.header).add_modifier(Modifier::BOLD)))
    };
    let entry = |key: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<10}", key), Style::default().fg(t.accent)),
            Span::raw(what),
        ])
    };

    let help_text = vec![
        section("═══ Anywhere ═══"),
        entry("Tab", "Switch between form and listings"),
        entry("F1", "Toggle this help"),
        entry("Ctrl+C", "Quit"),
        Line::from(""),
        section("═══ List Your Equipment ═══"),
        entry("↑/↓", "Previous/next field"),
        entry("Enter", "Next field (submits on the last one)"),
        entry("←/→ Space", "Change condition"),
        entry("F2 Ctrl+S", "List the equipment"),
        entry("Esc", "Go to listings"),
        Line::from(""),
        section("═══ Available Equipment ═══"),
        entry("↑/↓ j/k", "Move selection"),
        entry("Space b", "Barter for the selected item"),
        entry("R", "Reload listings"),
        entry("n", "Go to form"),
        entry("q", "Quit"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" Help ", Style::default().fg(t.accent)))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(t.accent)),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::ScriptedService;
    use crate::api::ApiError;
    use crate::config::AppConfig;
    use crate::model::sample_record;
    use crate::page::PageEvent;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
    use std::sync::Arc;

    fn app() -> App {
        App::new(&AppConfig::default(), Arc::new(ScriptedService::default()))
    }

    fn render(app: &App) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn text(buffer: &Buffer) -> String {
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_loading_view() {
        let screen = text(&render(&app()));
        assert!(screen.contains(LOADING_TEXT));
        assert!(!screen.contains(EMPTY_TEXT));
    }

    #[test]
    fn test_error_view_has_no_rows() {
        let mut app = app();
        app.page.apply(PageEvent::Fetched(Err(ApiError::Status(500))));

        let screen = text(&render(&app));
        assert!(screen.contains("Failed to load equipment. Please try again later."));
        assert!(!screen.contains("Owner:"));
    }

    #[test]
    fn test_empty_view() {
        let mut app = app();
        app.page.apply(PageEvent::Fetched(Ok(Vec::new())));

        let screen = text(&render(&app));
        assert!(screen.contains(EMPTY_TEXT));
        assert!(!screen.contains(LOADING_TEXT));
    }

    #[test]
    fn test_rows_show_every_field() {
        let mut app = app();
        app.page.apply(PageEvent::Fetched(Ok(vec![
            sample_record("e1", "Tractor", "Ravi"),
            sample_record("e2", "Harrow", "Meena"),
        ])));

        let screen = text(&render(&app));
        assert!(screen.contains("Tractor"));
        assert!(screen.contains("Condition: Good   Value: ₹5000"));
        assert!(screen.contains("Location: Nashik   Owner: Meena"));
        assert_eq!(screen.matches("Owner: ").count(), 2);
        assert!(screen.find("Tractor").unwrap() < screen.find("Harrow").unwrap());
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let mut app = app();
        app.page.apply(PageEvent::Fetched(Ok(vec![sample_record("e1", "Tractor", "Ravi")])));

        assert_eq!(render(&app), render(&app));
    }

    #[test]
    fn test_form_error_is_shown_inline() {
        let mut app = app();
        assert!(app.form.submit().is_err());

        let screen = text(&render(&app));
        assert!(screen.contains("Equipment Name is required"));
    }
}
