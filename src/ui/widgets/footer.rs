//! Footer widget with keybindings

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use crate::ui::theme::Theme;

pub struct Footer<'a> {
    theme: &'a Theme,
    snapshots: u64,
    stopped: bool,
}

impl<'a> Footer<'a> {
    pub fn new(theme: &'a Theme, snapshots: u64, stopped: bool) -> Self {
        Self {
            theme,
            snapshots,
            stopped,
        }
    }
}

impl<'a> Widget for Footer<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, self.theme.styles.footer);

        let bindings: &[(&str, &str)] = if self.stopped {
            &[("c", "Reconnect"), ("q", "Quit")]
        } else {
            &[("r", "Reset peaks"), ("q", "Quit")]
        };

        let mut spans = Vec::new();
        for (i, (key, action)) in bindings.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled("  ", self.theme.styles.keybind));
            }
            spans.push(Span::styled(
                format!("[{}]", key),
                self.theme.styles.keybind_key,
            ));
            spans.push(Span::styled(
                format!(" {}", action),
                self.theme.styles.keybind,
            ));
        }

        let line = Line::from(spans);
        buf.set_line(area.x + 1, area.y, &line, area.width.saturating_sub(2));

        let count = format!("{} samples", self.snapshots);
        let count_span = Span::styled(&count, self.theme.styles.keybind);
        let count_x = area.x + area.width.saturating_sub(count.len() as u16 + 1);
        buf.set_span(count_x, area.y, &count_span, count.len() as u16);
    }
}
