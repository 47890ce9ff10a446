pub mod card_grid;
pub mod detail_view;
pub mod filter_bar;
pub mod sprite_view;
pub mod status_footer;

// Re-export core Component trait
pub use tui_dispatch::Component;

pub use card_grid::{CardGrid, CardGridProps};
pub use detail_view::{DetailView, DetailViewProps};
pub use filter_bar::{FilterBar, FilterBarProps};
pub use sprite_view::{SpriteView, SpriteViewProps};
pub use status_footer::{StatusFooter, StatusFooterProps};

use ratatui::style::Color;

pub const BG_BASE: Color = Color::Rgb(12, 18, 28);
pub const BG_PANEL: Color = Color::Rgb(20, 32, 46);
pub const BG_HIGHLIGHT: Color = Color::Rgb(28, 92, 110);
pub const TEXT_MAIN: Color = Color::Rgb(232, 242, 244);
pub const TEXT_DIM: Color = Color::Rgb(176, 195, 207);
pub const ACCENT_TEAL: Color = Color::Rgb(72, 204, 184);
pub const ACCENT_GOLD: Color = Color::Rgb(228, 176, 88);
pub const ACCENT_RED: Color = Color::Rgb(204, 90, 90);

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub(crate) fn spinner(tick: u64) -> &'static str {
    SPINNER[(tick % SPINNER.len() as u64) as usize]
}
