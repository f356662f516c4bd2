//! Layout management for the gauge board

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Below this width gauges are stacked in a single column
const COMPACT_WIDTH: u16 = 60;

/// Computed layout rects
#[derive(Debug, Clone, Default)]
pub struct ComputedLayout {
    pub header: Rect,
    pub footer: Rect,
    /// One rect per gauge, in channel order
    pub gauges: Vec<Rect>,
}

pub struct LayoutManager;

impl LayoutManager {
    /// Compute all rects for `gauge_count` gauges
    pub fn compute(area: Rect, gauge_count: usize) -> ComputedLayout {
        // Main vertical split: header, body, footer
        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Header
                Constraint::Min(3),    // Body
                Constraint::Length(1), // Footer
            ])
            .split(area);

        let body = main_chunks[1];
        let gauges = if gauge_count == 0 {
            Vec::new()
        } else if body.width < COMPACT_WIDTH {
            Self::stacked(body, gauge_count)
        } else {
            Self::two_rows(body, gauge_count)
        };

        ComputedLayout {
            header: main_chunks[0],
            footer: main_chunks[2],
            gauges,
        }
    }

    /// Fewer gauges on top, the rest below: 7 gauges become 3 + 4.
    fn two_rows(body: Rect, count: usize) -> Vec<Rect> {
        let top = count / 2;
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(body);

        let mut rects = Self::row(rows[0], top);
        rects.extend(Self::row(rows[1], count - top));
        rects
    }

    fn row(area: Rect, count: usize) -> Vec<Rect> {
        if count == 0 {
            return Vec::new();
        }
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, count as u32); count])
            .split(area)
            .to_vec()
    }

    fn stacked(body: Rect, count: usize) -> Vec<Rect> {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(3); count])
            .split(body)
            .to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seven_gauges_split_three_over_four() {
        let layout = LayoutManager::compute(Rect::new(0, 0, 120, 40), 7);

        assert_eq!(layout.header.height, 1);
        assert_eq!(layout.footer.y, 39);
        assert_eq!(layout.gauges.len(), 7);

        let top_y = layout.gauges[0].y;
        let top = layout.gauges.iter().filter(|r| r.y == top_y).count();
        assert_eq!(top, 3);
        assert!(layout.gauges[3].y > top_y);
    }

    #[test]
    fn test_narrow_terminal_stacks() {
        let layout = LayoutManager::compute(Rect::new(0, 0, 40, 30), 7);
        assert_eq!(layout.gauges.len(), 7);
        assert!(layout.gauges.iter().all(|r| r.x == 0 && r.width == 40));
    }

    #[test]
    fn test_no_gauges() {
        let layout = LayoutManager::compute(Rect::new(0, 0, 80, 24), 0);
        assert!(layout.gauges.is_empty());
    }
}
