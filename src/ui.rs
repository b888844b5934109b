use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::app::App;
use crate::config::DETAIL_PANE_LINES;
use crate::model::NavLevel;

const BG: Color = Color::Rgb(9, 15, 25);
const PANEL: Color = Color::Rgb(16, 27, 44);
const ACCENT: Color = Color::Rgb(52, 211, 153);
const MUTED: Color = Color::Rgb(140, 156, 178);
const PL_A: Color = Color::Rgb(17, 94, 89);
const PL_B: Color = Color::Rgb(30, 64, 175);
const PL_C: Color = Color::Rgb(55, 48, 163);
const PL_D: Color = Color::Rgb(82, 24, 124);

const HELP_TEXT: &str = "tab, h: cycle next • j: scroll down • k: scroll up • enter, l: select item • r: reload table • q: back/exit";

/// Cluster identity shown in the header; owned by the gateway, not the session.
pub struct Target<'a> {
    pub context: &'a str,
    pub cluster: &'a str,
}

pub fn render(frame: &mut Frame, app: &mut App, target: &Target<'_>) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(6),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, root[0], app, target);
    render_body(frame, root[1], app);
    render_status(frame, root[2], app);
    frame.render_widget(
        Paragraph::new(HELP_TEXT).style(Style::default().bg(BG).fg(MUTED)),
        root[3],
    );
}

fn render_header(frame: &mut Frame, area: Rect, app: &App, target: &Target<'_>) {
    let mut spans = Vec::new();
    push_powerline_segment(&mut spans, " KLV ", Color::Black, ACCENT, PL_A);
    push_powerline_segment(
        &mut spans,
        format!(" {} ", compact_text(target.context, 20)),
        Color::White,
        PL_A,
        PL_B,
    );
    push_powerline_segment(
        &mut spans,
        format!(
            " {} ",
            compact_text(&display_cluster_endpoint(target.cluster), 32)
        ),
        Color::White,
        PL_B,
        PL_C,
    );
    push_powerline_segment(
        &mut spans,
        format!(" {} ", breadcrumb(app)),
        Color::White,
        PL_C,
        BG,
    );

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(BG)),
        area,
    );
}

fn breadcrumb(app: &App) -> String {
    [
        app.selected_namespace(),
        app.selected_pod(),
        app.selected_container(),
    ]
    .iter()
    .filter(|part| !part.is_empty())
    .map(|part| compact_text(part, 32))
    .collect::<Vec<_>>()
    .join(" › ")
}

fn render_body(frame: &mut Frame, area: Rect, app: &mut App) {
    let focused = app.level();
    if focused.is_drilled() {
        let detail_height = DETAIL_PANE_LINES + 2;
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(detail_height)])
            .split(area);
        render_pair(frame, rows[0], app, NavLevel::Containers, NavLevel::Logs);
        render_detail(frame, rows[1], app);
    } else {
        render_pair(frame, area, app, NavLevel::Namespaces, NavLevel::Pods);
    }
}

fn render_pair(frame: &mut Frame, area: Rect, app: &mut App, left: NavLevel, right: NavLevel) {
    let left_width = app.table(left).width.saturating_add(4);
    let right_width = app.table(right).width.saturating_add(4);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(left_width),
            Constraint::Length(right_width),
            Constraint::Min(0),
        ])
        .split(area);

    render_table(frame, chunks[0], app, left);
    render_table(frame, chunks[1], app, right);
}

fn render_table(frame: &mut Frame, area: Rect, app: &mut App, level: NavLevel) {
    let focused = app.level() == level;
    app.table_mut(level).set_page_size(table_rows_visible(area));
    let table = app.table(level);

    let title = match table.last_refreshed {
        Some(at) => format!(" {} · {} ", table.title, at.format("%H:%M:%S")),
        None => format!(" {} ", table.title),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(if focused {
            BorderType::Rounded
        } else {
            BorderType::Plain
        })
        .border_style(if focused {
            Style::default().fg(ACCENT)
        } else {
            Style::default().fg(MUTED)
        })
        .style(Style::default().bg(PANEL));

    let width = table.width as usize;
    let rows = table.rows().iter().map(|row| {
        Row::new(vec![
            Cell::from(compact_text(row, width)).style(Style::default().fg(Color::White)),
        ])
    });

    let widget = Table::new(rows, [Constraint::Length(table.width)])
        .block(block)
        .column_spacing(1)
        .row_highlight_style(if focused {
            Style::default()
                .fg(Color::Rgb(255, 255, 175))
                .bg(Color::Rgb(95, 0, 255))
        } else {
            Style::default()
                .bg(Color::Rgb(24, 36, 58))
                .add_modifier(Modifier::BOLD)
        })
        .highlight_symbol("› ");

    let mut state = TableState::default();
    state.select(Some(table.selected()));
    frame.render_stateful_widget(widget, area, &mut state);
}

fn render_detail(frame: &mut Frame, area: Rect, app: &App) {
    let width = (app.config().detail_width as u16).saturating_add(2);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(width), Constraint::Min(0)])
        .split(area);

    let block = Block::default()
        .title(" Log line ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(ACCENT))
        .style(Style::default().bg(PANEL));
    let paragraph = Paragraph::new(Text::from(app.selected_log_line().to_string()))
        .block(block)
        .style(Style::default().fg(Color::White));

    frame.render_widget(paragraph, chunks[0]);
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    push_powerline_segment(
        &mut spans,
        format!(" {} ", app.level()),
        Color::White,
        PL_D,
        PL_B,
    );
    push_powerline_segment(
        &mut spans,
        format!(
            " {} ",
            compact_text(app.status(), area.width.saturating_sub(16) as usize)
        ),
        Color::White,
        PL_B,
        BG,
    );
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(BG)),
        area,
    );
}

fn push_powerline_segment(
    spans: &mut Vec<Span<'static>>,
    content: impl Into<String>,
    fg: Color,
    bg: Color,
    next_bg: Color,
) {
    spans.push(Span::styled(
        content.into(),
        Style::default().fg(fg).bg(bg).add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled("\u{e0b0}", Style::default().fg(bg).bg(next_bg)));
}

fn table_rows_visible(area: Rect) -> usize {
    area.height.saturating_sub(2).max(1) as usize
}

fn compact_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }

    if max_chars <= 1 {
        return "…".to_string();
    }

    let mut out = value
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    out.push('…');
    out
}

fn display_cluster_endpoint(cluster: &str) -> String {
    let trimmed = cluster.trim().trim_end_matches('/');
    trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed)
        .to_string()
}
