use crate::core::alert::AlertLevel;
use crate::core::state::Console;
use crate::core::visibility::ViewModel;
use crate::tui::TuiState;

use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Row, Table};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

/// Pages with a currently visible menu entry, in chrome order. The run loop
/// uses the same list for number-key shortcuts.
pub fn menu_pages(view: &ViewModel) -> Vec<&str> {
    view.regions()
        .iter()
        .filter(|r| r.visible)
        .filter_map(|r| r.id.strip_prefix("nav:"))
        .collect()
}

pub fn draw_ui(frame: &mut Frame, console: &Console, tui: &TuiState) {
    use Constraint::{Length, Min};
    let layout = Layout::vertical([Length(1), Length(1), Min(0), Length(1), Length(3)]);
    let [title_area, menu_area, main_area, status_area, input_area] = layout.areas(frame.area());

    // Title bar: identity on the right of the product name
    let identity = if console.session.is_authenticated() {
        let session = console.session.session();
        let roles: Vec<_> = session.roles.iter().map(String::as_str).collect();
        format!("{} [{}]", session.username, roles.join(","))
    } else {
        "not logged in".to_string()
    };
    frame.render_widget(
        Span::styled(
            format!("Quorum Console | {identity}"),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        title_area,
    );

    // Menu: number shortcuts for every visible nav entry
    let mut spans = Vec::new();
    for (i, page) in menu_pages(&console.view).iter().enumerate() {
        let active = console.view.visible_page() == Some(page);
        let style = if active {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!("{}:{}", i + 1, page), style));
        spans.push(Span::raw("  "));
    }
    frame.render_widget(Line::from(spans), menu_area);

    // Main area: the active page's table snapshot
    draw_page(frame, main_area, console);

    // Status line: open notification wins over alerts
    let status = if let Some(ref notice) = tui.notice {
        Span::styled(
            format!("[Ctrl+O] {}: {}", notice.title, notice.body),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )
    } else if let Some(alert) = console.alerts.active().last() {
        let color = match alert.level {
            AlertLevel::Info => Color::Green,
            AlertLevel::Error => Color::Red,
        };
        Span::styled(alert.text.clone(), Style::default().fg(color))
    } else {
        Span::raw("")
    };
    frame.render_widget(status, status_area);

    // Input area, with the page's usage hint as the block title
    let hint = console
        .router
        .active_page()
        .map(|p| p.view().hint)
        .unwrap_or_default();
    let title = if hint.is_empty() {
        "Input".to_string()
    } else {
        format!("Input ({hint})")
    };
    let input = Paragraph::new(tui.input_buffer.as_str()).block(Block::bordered().title(title));
    frame.render_widget(input, input_area);
}

fn draw_page(frame: &mut Frame, area: ratatui::layout::Rect, console: &Console) {
    let Some(page) = console.router.active_page() else {
        frame.render_widget(
            Paragraph::new("Loading...").block(Block::bordered()),
            area,
        );
        return;
    };
    let view = page.view();

    if view.columns.is_empty() {
        frame.render_widget(
            Paragraph::new("").block(Block::bordered().title(view.title)),
            area,
        );
        return;
    }

    // Column widths from content, capped so one long cell cannot starve the rest
    let widths: Vec<Constraint> = view
        .columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let content_max = view
                .rows
                .iter()
                .filter_map(|r| r.get(i))
                .map(|c| UnicodeWidthStr::width(c.as_str()))
                .max()
                .unwrap_or(0);
            let w = content_max.max(UnicodeWidthStr::width(*col)).min(40) as u16;
            Constraint::Max(w + 2)
        })
        .collect();

    let header = Row::new(view.columns.iter().copied())
        .style(Style::default().add_modifier(Modifier::BOLD));
    let rows = view.rows.iter().map(|r| Row::new(r.clone()));
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::bordered().title(view.title));
    frame.render_widget(table, area);
}
