use ratatui::style::{Color, Modifier, Style};

use crate::config::ColorScheme;

#[derive(Clone, Copy)]
pub(super) enum ValueStyle {
    Normal,
    Important,
    Dim,
}

pub(super) struct Theme {
    border: Color,
    title: Color,
    text: Color,
    dim: Color,
    accent: Color,
    highlight_fg: Color,
    highlight_bg: Color,
    warn: Color,
    bar: Color,
    bar_value: Color,
}

impl Theme {
    pub(super) fn for_scheme(scheme: ColorScheme) -> Self {
        match scheme {
            ColorScheme::Dark => Self::dark(),
            ColorScheme::Light => Self::light(),
        }
    }

    pub(super) fn dark() -> Self {
        Self {
            border: Color::DarkGray,
            title: Color::Blue,
            text: Color::White,
            dim: Color::Gray,
            accent: Color::Cyan,
            highlight_fg: Color::White,
            highlight_bg: Color::DarkGray,
            warn: Color::Yellow,
            bar: Color::Blue,
            bar_value: Color::White,
        }
    }

    pub(super) fn light() -> Self {
        Self {
            border: Color::Gray,
            title: Color::Blue,
            text: Color::Black,
            dim: Color::DarkGray,
            accent: Color::Blue,
            highlight_fg: Color::Black,
            highlight_bg: Color::Gray,
            warn: Color::Magenta,
            bar: Color::Blue,
            bar_value: Color::Black,
        }
    }

    pub(super) fn block<'a>(&self, title: &'a str) -> ratatui::widgets::Block<'a> {
        ratatui::widgets::Block::default()
            .title(ratatui::text::Span::styled(
                title,
                Style::default().fg(self.title).add_modifier(Modifier::BOLD),
            ))
            .borders(ratatui::widgets::Borders::ALL)
            .border_style(Style::default().fg(self.border))
    }

    pub(super) fn accent_border_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub(super) fn highlight_style(&self) -> Style {
        Style::default()
            .fg(self.highlight_fg)
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub(super) fn help_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub(super) fn accent_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub(super) fn warn_style(&self) -> Style {
        Style::default().fg(self.warn).add_modifier(Modifier::BOLD)
    }

    pub(super) fn key_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub(super) fn value_style(&self, level: ValueStyle) -> Style {
        match level {
            ValueStyle::Normal => Style::default().fg(self.text),
            ValueStyle::Important => {
                Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
            }
            ValueStyle::Dim => Style::default().fg(self.dim),
        }
    }

    pub(super) fn bar_style(&self) -> Style {
        Style::default().fg(self.bar)
    }

    /// Count labels rendered at the bar tops; the foreground flips with the
    /// color scheme so the value stays readable on the bar.
    pub(super) fn bar_value_style(&self) -> Style {
        Style::default()
            .fg(self.bar_value)
            .bg(self.bar)
            .add_modifier(Modifier::BOLD)
    }
}
