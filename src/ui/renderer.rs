//! Main UI renderer

use ratatui::{style::Style, widgets::Block, Frame};

use crate::core::dashboard::DashboardController;
use crate::core::state::StatusState;
use crate::ui::layout::LayoutManager;
use crate::ui::theme::Theme;
use crate::ui::widgets::*;

pub struct Renderer;

impl Renderer {
    pub fn render(
        frame: &mut Frame,
        controller: &DashboardController,
        status: &StatusState,
        theme: &Theme,
    ) {
        let area = frame.area();

        // Clear background
        frame.render_widget(
            Block::default().style(Style::default().bg(theme.colors.bg_primary)),
            area,
        );

        let channels = controller.channels();
        let layout = LayoutManager::compute(area, channels.len());

        frame.render_widget(Header::new(status, theme), layout.header);
        frame.render_widget(
            Footer::new(theme, controller.snapshot_count(), status.fatal.is_some()),
            layout.footer,
        );

        for (channel, rect) in channels.iter().zip(layout.gauges) {
            frame.render_widget(GaugePanel::new(channel, theme), rect);
        }
    }
}
