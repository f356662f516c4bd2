//! One bordered gauge per metric channel

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Span,
    widgets::{Block, Borders, Gauge, Widget},
};

use crate::metrics::MetricChannel;
use crate::ui::theme::Theme;

pub struct GaugePanel<'a> {
    channel: &'a MetricChannel,
    theme: &'a Theme,
}

impl<'a> GaugePanel<'a> {
    pub fn new(channel: &'a MetricChannel, theme: &'a Theme) -> Self {
        Self { channel, theme }
    }
}

impl<'a> Widget for GaugePanel<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!(" {} ", self.channel.label());
        let block = Block::default()
            .title(Span::styled(title, self.theme.styles.panel_title))
            .borders(Borders::ALL)
            .border_style(self.theme.styles.panel_border)
            .style(Style::default().bg(self.theme.colors.bg_primary));

        let percent = self.channel.displayed();
        // Gauge panics on ratios outside 0..=1
        let ratio = (percent / 100.0).clamp(0.0, 1.0);

        Gauge::default()
            .block(block)
            .gauge_style(
                Style::default()
                    .fg(self.theme.level_color(percent))
                    .bg(self.theme.colors.bg_track),
            )
            .ratio(ratio)
            .label(Span::styled(
                self.channel.value_text(),
                self.theme.styles.gauge_text,
            ))
            .render(area, buf);
    }
}
