use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{BarChart, Clear, List, ListItem, Paragraph, Wrap};

use super::format::snapshot_info_line;
use super::text::truncate_with_ellipsis;
use super::theme::{Theme, ValueStyle};
use crate::app::{AppState, Focus, PromptKind, FORM_FIELDS};
use crate::config::ColorScheme;

pub(crate) fn draw_ui(frame: &mut ratatui::Frame, app: &AppState, scheme: ColorScheme) {
    let theme = Theme::for_scheme(scheme);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(frame.area());

    draw_header(frame, app, &theme, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(38), Constraint::Percentage(62)])
        .split(chunks[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(7)])
        .split(body[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(body[1]);

    draw_form(frame, app, &theme, left[0]);
    draw_activity(frame, app, &theme, left[1]);
    draw_snapshots(frame, app, &theme, right[0]);
    draw_console(frame, app, &theme, right[1]);
    draw_footer(frame, app, &theme, chunks[2]);

    if app.prompt.is_some() {
        draw_prompt(frame, app, &theme);
    }
}

fn draw_header(frame: &mut ratatui::Frame, app: &AppState, theme: &Theme, area: Rect) {
    let session = if app.console_running {
        Span::styled("running", theme.accent_style())
    } else {
        Span::styled("stopped", theme.value_style(ValueStyle::Dim))
    };
    let updated = app
        .last_updated
        .map(|time| humantime::format_rfc3339_seconds(time).to_string())
        .unwrap_or_else(|| "-".to_string());
    let line = Line::from(vec![
        Span::styled("Hotwords Dashboard", theme.value_style(ValueStyle::Important)),
        Span::styled("  console: ", theme.key_style()),
        session,
        Span::styled("  last update: ", theme.key_style()),
        Span::styled(updated, theme.value_style(ValueStyle::Dim)),
    ]);
    let header = Paragraph::new(line).block(theme.block("Status"));
    frame.render_widget(header, area);
}

fn draw_form(frame: &mut ratatui::Frame, app: &AppState, theme: &Theme, area: Rect) {
    let title = if app.focus == Focus::Form {
        "Run Config *"
    } else {
        "Run Config"
    };
    let block = theme.block(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let items: Vec<ListItem> = FORM_FIELDS
        .iter()
        .map(|field| {
            let selected = app.focus == Focus::Form && *field == app.selected_field();
            let marker = if selected { ">> " } else { "   " };
            let value_style = if selected {
                theme.highlight_style()
            } else {
                theme.value_style(ValueStyle::Normal)
            };
            let line = Line::from(vec![
                Span::styled(marker, theme.accent_style()),
                Span::styled(format!("{:<18}", field.label()), theme.key_style()),
                Span::styled(app.form.field_value(*field), value_style),
            ]);
            ListItem::new(line)
        })
        .collect();
    frame.render_widget(List::new(items), rows[0]);

    let width = rows[1].width.saturating_sub(7) as usize;
    let resolved = Paragraph::new(Line::from(vec![
        Span::styled("input: ", theme.key_style()),
        Span::styled(
            truncate_with_ellipsis(&app.form.input_display, width),
            theme.value_style(ValueStyle::Dim),
        ),
    ]));
    frame.render_widget(resolved, rows[1]);
}

fn draw_activity(frame: &mut ratatui::Frame, app: &AppState, theme: &Theme, area: Rect) {
    let mut lines = Vec::new();
    for (label, status) in [
        ("run: ", &app.run_status),
        ("upload: ", &app.upload_status),
        ("download: ", &app.download_status),
    ] {
        if !status.is_empty() {
            lines.push(Line::from(vec![
                Span::styled(label, theme.key_style()),
                Span::styled(status.clone(), theme.value_style(ValueStyle::Normal)),
            ]));
        }
    }
    if let Some(error) = &app.form_error {
        lines.push(Line::styled(error.clone(), theme.warn_style()));
    }
    if !app.output_preview.is_empty() {
        let width = area.width.saturating_sub(11) as usize;
        lines.push(Line::from(vec![
            Span::styled("preview: ", theme.key_style()),
            Span::styled(
                truncate_with_ellipsis(&app.output_preview, width),
                theme.value_style(ValueStyle::Dim),
            ),
        ]));
    }
    if lines.is_empty() {
        lines.push(Line::styled("idle", theme.value_style(ValueStyle::Dim)));
    }
    let activity = Paragraph::new(lines)
        .block(theme.block("Activity"))
        .wrap(Wrap { trim: true });
    frame.render_widget(activity, area);
}

fn draw_snapshots(frame: &mut ratatui::Frame, app: &AppState, theme: &Theme, area: Rect) {
    let mut block = theme.block("Snapshots");
    if app.chart_highlight {
        block = block.border_style(theme.accent_border_style());
    }
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.snapshots.is_empty() {
        let placeholder = Paragraph::new("no snapshots yet, run an analysis first")
            .style(theme.value_style(ValueStyle::Dim))
            .wrap(Wrap { trim: true });
        frame.render_widget(placeholder, inner);
        return;
    }

    let snap = &app.snapshots[app.snap_idx];
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(inner);

    let info = Paragraph::new(snapshot_info_line(
        app.snap_idx,
        app.snapshots.len(),
        snap.time,
    ))
    .style(theme.accent_style());
    frame.render_widget(info, rows[0]);

    // Delivered order is the backend's ranking; render it as-is.
    let data: Vec<(&str, u64)> = snap
        .items
        .iter()
        .map(|item| (item.word.as_str(), item.count))
        .collect();
    if data.is_empty() {
        let empty = Paragraph::new("empty snapshot").style(theme.value_style(ValueStyle::Dim));
        frame.render_widget(empty, rows[1]);
        return;
    }

    let count = data.len() as u16;
    let gaps = count.saturating_sub(1);
    let bar_width = (rows[1].width.saturating_sub(gaps) / count.max(1)).clamp(3, 12);
    let chart = BarChart::default()
        .data(&data)
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(theme.bar_style())
        .value_style(theme.bar_value_style())
        .label_style(theme.value_style(ValueStyle::Dim));
    frame.render_widget(chart, rows[1]);
}

fn draw_console(frame: &mut ratatui::Frame, app: &AppState, theme: &Theme, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    let session = if app.console_running {
        "running"
    } else {
        "stopped"
    };
    let focus_marker = if app.focus == Focus::Console { " *" } else { "" };
    let output_title = format!("Console [{session}]{focus_marker}");
    let inner_height = rows[0].height.saturating_sub(2) as usize;
    let scroll = app.console_lines.len().saturating_sub(inner_height) as u16;
    let output = Paragraph::new(app.console_lines.join("\n"))
        .block(theme.block(&output_title))
        .style(theme.value_style(ValueStyle::Normal))
        .scroll((scroll, 0));
    frame.render_widget(output, rows[0]);

    let input_title = if app.sending {
        "Input (sending...)".to_string()
    } else {
        let line_count = app.console_input.split('\n').count();
        if line_count > 1 {
            format!("Input ({line_count} lines, ctrl+enter sends)")
        } else {
            "Input (ctrl+enter sends)".to_string()
        }
    };
    let last_line = app.console_input.split('\n').next_back().unwrap_or("");
    let cursor = if app.focus == Focus::Console && !app.sending {
        "▌"
    } else {
        ""
    };
    let input_style = if app.sending {
        theme.value_style(ValueStyle::Dim)
    } else {
        theme.value_style(ValueStyle::Normal)
    };
    let input = Paragraph::new(format!("{last_line}{cursor}"))
        .block(theme.block(&input_title))
        .style(input_style);
    frame.render_widget(input, rows[1]);

    if !app.send_status.is_empty() {
        let style = if app.send_status.starts_with("send failed") {
            theme.warn_style()
        } else {
            theme.accent_style()
        };
        frame.render_widget(Paragraph::new(app.send_status.clone()).style(style), rows[2]);
    }
}

fn draw_footer(frame: &mut ratatui::Frame, app: &AppState, theme: &Theme, area: Rect) {
    let help = match app.focus {
        Focus::Form => {
            "tab=console  up/down=field  enter=edit  left/right=page  s=save  r=run  u=upload  \
             w=window  k=query  t=console  x=reset  d=download  q=quit"
        }
        Focus::Console => "esc=back  type to edit  enter=newline  ctrl+enter=send",
    };
    let mut spans = vec![Span::styled(help, theme.help_style())];
    if app.confirm_quit {
        spans.push(Span::styled(
            "  press q again to quit, esc to cancel",
            theme.warn_style(),
        ));
    }
    let footer = Paragraph::new(Line::from(spans)).block(theme.block("Controls"));
    frame.render_widget(footer, area);
}

fn draw_prompt(frame: &mut ratatui::Frame, app: &AppState, theme: &Theme) {
    let Some(prompt) = &app.prompt else {
        return;
    };
    let title = match prompt.kind {
        PromptKind::Field(field) => field.label(),
        PromptKind::WindowSize => "window size (min)",
        PromptKind::QueryMinute => "query minute",
    };
    let area = centered_rect(46, 4, frame.area());
    frame.render_widget(Clear, area);
    let block = theme.block(title).border_style(theme.accent_border_style());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);
    let buffer = Paragraph::new(format!("{}▌", prompt.buffer))
        .style(theme.value_style(ValueStyle::Normal));
    frame.render_widget(buffer, rows[0]);
    if let Some(error) = &prompt.error {
        frame.render_widget(Paragraph::new(error.clone()).style(theme.warn_style()), rows[1]);
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
