//! Header widget

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::core::state::{LinkHealth, StatusState};
use crate::ui::theme::Theme;

pub struct Header<'a> {
    status: &'a StatusState,
    theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(status: &'a StatusState, theme: &'a Theme) -> Self {
        Self { status, theme }
    }
}

impl<'a> Widget for Header<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, self.theme.styles.header);

        let separator = || Span::styled(" │ ", Style::default().fg(self.theme.colors.fg_muted));
        let status_style = match self.status.health() {
            LinkHealth::Healthy => self.theme.styles.status_ok,
            LinkHealth::Waiting => self.theme.styles.status_warning,
            LinkHealth::Degraded => self.theme.styles.status_warning,
            LinkHealth::Down => self.theme.styles.status_error,
        };

        let mut spans = vec![
            Span::styled(
                " GAUGEDASH ",
                Style::default()
                    .fg(self.theme.colors.accent_primary)
                    .add_modifier(Modifier::BOLD),
            ),
            separator(),
            Span::styled(
                self.status.endpoint.as_str(),
                Style::default().fg(self.theme.colors.fg_primary),
            ),
            separator(),
            Span::styled(self.status.describe(), status_style),
        ];

        if let Some(code) = self.status.last_status {
            spans.push(separator());
            spans.push(Span::styled(
                format!("HTTP {}", code),
                Style::default().fg(self.theme.colors.fg_muted),
            ));
        }

        if self.status.error_count > 0 {
            spans.push(separator());
            spans.push(Span::styled(
                format!("errors {}", self.status.error_count),
                self.theme.styles.status_warning,
            ));
        }

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);

        // Last update on the right
        let updated = self
            .status
            .last_update
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "--:--:--".to_string());
        let updated_span = Span::styled(&updated, Style::default().fg(self.theme.colors.fg_muted));
        let updated_x = area.x + area.width.saturating_sub(updated.len() as u16 + 1);
        buf.set_span(updated_x, area.y, &updated_span, updated.len() as u16);
    }
}
