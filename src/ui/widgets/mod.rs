//! UI Widgets

pub mod footer;
pub mod gauge_panel;
pub mod header;

pub use footer::Footer;
pub use gauge_panel::GaugePanel;
pub use header::Header;
