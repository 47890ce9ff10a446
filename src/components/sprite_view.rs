use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use super::{Component, TEXT_DIM};
use crate::action::Action;
use crate::sprite::{self, ImageSlot, SpriteArt};

const UPPER_HALF: &str = "\u{2580}";
const LOWER_HALF: &str = "\u{2584}";

pub struct SpriteViewProps<'a> {
    pub slot: &'a ImageSlot,
}

/// One image slot: the decoded sprite, a loading note or the placeholder.
#[derive(Default)]
pub struct SpriteView;

impl Component<Action> for SpriteView {
    type Props<'a> = SpriteViewProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        match props.slot {
            ImageSlot::Ready(art) => draw_half_blocks(frame, area, art),
            ImageSlot::Loading => {
                let paragraph = Paragraph::new("[loading sprite]")
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(TEXT_DIM));
                frame.render_widget(paragraph, vertical_center(area, 1));
            }
            ImageSlot::Fallback => {
                let art = sprite::placeholder();
                let rows = art.lines().count() as u16;
                let paragraph = Paragraph::new(art)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(TEXT_DIM));
                frame.render_widget(paragraph, vertical_center(area, rows));
            }
        }
    }
}

/// Paint two pixel rows per cell: foreground is the top pixel, background
/// the bottom one. Transparent pixels keep the cell's existing background.
fn draw_half_blocks(frame: &mut Frame, area: Rect, art: &SpriteArt) {
    let cols = art.width.min(area.width);
    let rows = art.cell_rows().min(area.height);
    let left = area.x + (area.width - cols) / 2;
    let top = area.y + (area.height - rows) / 2;
    let buf = frame.buffer_mut();

    for row in 0..rows {
        for col in 0..cols {
            let upper = art.pixel(col, row * 2);
            let lower = art.pixel(col, row * 2 + 1);
            let Some(cell) = buf.cell_mut((left + col, top + row)) else {
                continue;
            };
            match (upper, lower) {
                (None, None) => {}
                (Some(up), None) => {
                    cell.set_symbol(UPPER_HALF).set_fg(rgb(up));
                }
                (None, Some(down)) => {
                    cell.set_symbol(LOWER_HALF).set_fg(rgb(down));
                }
                (Some(up), Some(down)) => {
                    cell.set_symbol(UPPER_HALF).set_fg(rgb(up)).set_bg(rgb(down));
                }
            }
        }
    }
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb(r, g, b)
}

fn vertical_center(area: Rect, rows: u16) -> Rect {
    let rows = rows.min(area.height);
    Rect {
        y: area.y + (area.height - rows) / 2,
        height: rows,
        ..area
    }
}
