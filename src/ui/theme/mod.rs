//! Color palettes for the gauge board

#![allow(dead_code)]

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
    pub styles: ThemeStyles,
}

#[derive(Debug, Clone)]
pub struct ThemeColors {
    pub bg_primary: Color,
    pub bg_secondary: Color,
    pub bg_track: Color,

    pub fg_primary: Color,
    pub fg_muted: Color,

    pub accent_primary: Color,
    pub accent_secondary: Color,

    // Gauge fill by level
    pub level_low: Color,
    pub level_mid: Color,
    pub level_high: Color,

    pub error: Color,
    pub border: Color,
}

#[derive(Debug, Clone)]
pub struct ThemeStyles {
    pub header: Style,
    pub footer: Style,
    pub panel_title: Style,
    pub panel_border: Style,
    pub gauge_text: Style,
    pub status_ok: Style,
    pub status_warning: Style,
    pub status_error: Style,
    pub keybind: Style,
    pub keybind_key: Style,
}

impl Theme {
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "nord" => Self::nord(),
            "gruvbox" => Self::gruvbox(),
            _ => Self::tokyo_night(),
        }
    }

    /// Tokyo Night (default)
    pub fn tokyo_night() -> Self {
        Self::from_colors(
            "Tokyo Night",
            ThemeColors {
                bg_primary: Color::Rgb(26, 27, 38),
                bg_secondary: Color::Rgb(36, 40, 59),
                bg_track: Color::Rgb(41, 46, 66),
                fg_primary: Color::Rgb(192, 202, 245),
                fg_muted: Color::Rgb(86, 95, 137),
                accent_primary: Color::Rgb(122, 162, 247),
                accent_secondary: Color::Rgb(187, 154, 247),
                level_low: Color::Rgb(158, 206, 106),
                level_mid: Color::Rgb(224, 175, 104),
                level_high: Color::Rgb(247, 118, 142),
                error: Color::Rgb(247, 118, 142),
                border: Color::Rgb(41, 46, 66),
            },
        )
    }

    pub fn nord() -> Self {
        Self::from_colors(
            "Nord",
            ThemeColors {
                bg_primary: Color::Rgb(46, 52, 64),
                bg_secondary: Color::Rgb(59, 66, 82),
                bg_track: Color::Rgb(67, 76, 94),
                fg_primary: Color::Rgb(236, 239, 244),
                fg_muted: Color::Rgb(216, 222, 233),
                accent_primary: Color::Rgb(136, 192, 208),
                accent_secondary: Color::Rgb(129, 161, 193),
                level_low: Color::Rgb(163, 190, 140),
                level_mid: Color::Rgb(235, 203, 139),
                level_high: Color::Rgb(191, 97, 106),
                error: Color::Rgb(191, 97, 106),
                border: Color::Rgb(67, 76, 94),
            },
        )
    }

    pub fn gruvbox() -> Self {
        Self::from_colors(
            "Gruvbox",
            ThemeColors {
                bg_primary: Color::Rgb(40, 40, 40),
                bg_secondary: Color::Rgb(60, 56, 54),
                bg_track: Color::Rgb(80, 73, 69),
                fg_primary: Color::Rgb(235, 219, 178),
                fg_muted: Color::Rgb(168, 153, 132),
                accent_primary: Color::Rgb(131, 165, 152),
                accent_secondary: Color::Rgb(211, 134, 155),
                level_low: Color::Rgb(184, 187, 38),
                level_mid: Color::Rgb(250, 189, 47),
                level_high: Color::Rgb(251, 73, 52),
                error: Color::Rgb(251, 73, 52),
                border: Color::Rgb(80, 73, 69),
            },
        )
    }

    /// Fill color for a gauge at `percent`.
    pub fn level_color(&self, percent: f64) -> Color {
        if percent >= 85.0 {
            self.colors.level_high
        } else if percent >= 60.0 {
            self.colors.level_mid
        } else {
            self.colors.level_low
        }
    }

    fn from_colors(name: &str, colors: ThemeColors) -> Self {
        let styles = ThemeStyles {
            header: Style::default()
                .bg(colors.bg_secondary)
                .fg(colors.fg_primary),
            footer: Style::default().bg(colors.bg_secondary).fg(colors.fg_muted),
            panel_title: Style::default()
                .fg(colors.accent_primary)
                .add_modifier(Modifier::BOLD),
            panel_border: Style::default().fg(colors.border),
            gauge_text: Style::default()
                .fg(colors.fg_primary)
                .add_modifier(Modifier::BOLD),
            status_ok: Style::default().fg(colors.level_low),
            status_warning: Style::default().fg(colors.level_mid),
            status_error: Style::default().fg(colors.error),
            keybind: Style::default().fg(colors.fg_muted),
            keybind_key: Style::default()
                .fg(colors.accent_secondary)
                .add_modifier(Modifier::BOLD),
        };

        Self {
            name: name.to_string(),
            colors,
            styles,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::tokyo_night()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_falls_back() {
        assert_eq!(Theme::from_name("NORD").name, "Nord");
        assert_eq!(Theme::from_name("unknown").name, "Tokyo Night");
    }

    #[test]
    fn test_level_color_thresholds() {
        let theme = Theme::default();
        assert_eq!(theme.level_color(10.0), theme.colors.level_low);
        assert_eq!(theme.level_color(60.0), theme.colors.level_mid);
        assert_eq!(theme.level_color(99.0), theme.colors.level_high);
    }
}
