use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_dispatch::EventKind;

use super::{
    spinner, Component, ACCENT_GOLD, ACCENT_TEAL, BG_HIGHLIGHT, BG_PANEL, TEXT_DIM, TEXT_MAIN,
};
use crate::action::Action;
use crate::state::{grid_columns, grid_rows, SummaryRecord, CARD_HEIGHT, CARD_WIDTH};

pub struct CardGridProps<'a> {
    pub records: &'a [SummaryRecord],
    pub selected: usize,
    pub page: u32,
    pub busy: bool,
    pub exhausted: bool,
    pub tick: u64,
    pub is_focused: bool,
}

/// Scrolling grid of record cards.
#[derive(Default)]
pub struct CardGrid {
    /// First visible grid row.
    offset: usize,
}

impl CardGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the selected row on screen, moving the window as little as possible.
    fn follow_selection(&mut self, selected_row: usize, visible_rows: usize) {
        if selected_row < self.offset {
            self.offset = selected_row;
        } else if selected_row >= self.offset + visible_rows {
            self.offset = selected_row + 1 - visible_rows;
        }
    }
}

impl Component<Action> for CardGrid {
    type Props<'a> = CardGridProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return None;
        }

        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Left | KeyCode::Char('h') => Some(Action::ListMoveColumn(-1)),
                KeyCode::Right | KeyCode::Char('l') => Some(Action::ListMoveColumn(1)),
                KeyCode::Up | KeyCode::Char('k') => Some(Action::ListMoveRow(-1)),
                KeyCode::Down | KeyCode::Char('j') => Some(Action::ListMoveRow(1)),
                KeyCode::PageUp => Some(Action::ListMovePage(-1)),
                KeyCode::PageDown => Some(Action::ListMovePage(1)),
                KeyCode::Home | KeyCode::Char('g') => Some(Action::ListJumpTop),
                KeyCode::End | KeyCode::Char('G') => Some(Action::ListJumpBottom),
                KeyCode::Enter => props
                    .records
                    .get(props.selected)
                    .map(|record| Action::DetailOpen(record.id)),
                KeyCode::Char('/') => Some(Action::FilterNameStart),
                KeyCode::Char(']') => Some(Action::FilterTypeNext),
                KeyCode::Char('[') => Some(Action::FilterTypePrev),
                KeyCode::Char('c') => Some(Action::FilterTypeClear),
                KeyCode::Char('+') | KeyCode::Char('=') => Some(Action::PageSizeNext),
                KeyCode::Char('-') => Some(Action::PageSizePrev),
                KeyCode::Char('r') | KeyCode::F(5) => Some(Action::ListReload),
                KeyCode::Char('q') => Some(Action::Quit),
                _ => None,
            },
            EventKind::Scroll { delta, .. } if *delta != 0 => {
                Some(Action::ListMoveRow(delta.signum() as i16))
            }
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let title = format!(" POKEDEX · {} loaded ", props.records.len());
        let mut block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
            .border_style(Style::default().fg(if props.is_focused {
                ACCENT_TEAL
            } else {
                TEXT_DIM
            }));
        if props.busy && !props.records.is_empty() {
            block = block.title_bottom(format!(
                " {} loading page {} ",
                spinner(props.tick),
                props.page
            ));
        } else if props.exhausted && !props.records.is_empty() {
            block = block.title_bottom(" end of list ");
        }
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if props.records.is_empty() {
            let message = if props.busy {
                format!("{} Loading Pokedex...", spinner(props.tick))
            } else {
                "No Pokemon match these filters.".to_string()
            };
            let paragraph = Paragraph::new(message)
                .alignment(Alignment::Center)
                .style(Style::default().fg(TEXT_DIM));
            frame.render_widget(paragraph, inner);
            return;
        }

        let columns = grid_columns(inner.width);
        let visible_rows = grid_rows(inner.height);
        let selected = props.selected.min(props.records.len() - 1);
        self.follow_selection(selected / columns, visible_rows);

        let first = self.offset * columns;
        let last = (first + columns * visible_rows).min(props.records.len());
        for (index, record) in props.records[first..last].iter().enumerate() {
            let column = (index % columns) as u16;
            let row = (index / columns) as u16;
            let card_area = Rect {
                x: inner.x + column * CARD_WIDTH,
                y: inner.y + row * CARD_HEIGHT,
                width: CARD_WIDTH,
                height: CARD_HEIGHT,
            }
            .intersection(inner);
            render_card(frame, card_area, record, first + index == selected);
        }
    }
}

fn render_card(frame: &mut Frame, area: Rect, record: &SummaryRecord, selected: bool) {
    let (bg, border) = if selected {
        (BG_HIGHLIGHT, ACCENT_TEAL)
    } else {
        (BG_PANEL, TEXT_DIM)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default().bg(bg).fg(TEXT_MAIN))
        .border_style(Style::default().fg(border));

    let types = record
        .types
        .iter()
        .map(|tag| tag.name.as_str())
        .collect::<Vec<_>>()
        .join(" / ");
    let lines = vec![
        Line::from(Span::styled(
            format!("#{:03}", record.id),
            Style::default().fg(ACCENT_GOLD),
        )),
        Line::from(Span::styled(
            record.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(types, Style::default().fg(TEXT_DIM))),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use tui_dispatch::testing::RenderHarness;

    fn records(count: u32) -> Vec<SummaryRecord> {
        (1..=count)
            .map(|id| SummaryRecord {
                id,
                name: format!("mon-{id}"),
                image: String::new(),
                types: Vec::new(),
            })
            .collect()
    }

    fn props(records: &[SummaryRecord], selected: usize) -> CardGridProps<'_> {
        CardGridProps {
            records,
            selected,
            page: 1,
            busy: false,
            exhausted: false,
            tick: 0,
            is_focused: true,
        }
    }

    #[test]
    fn enter_opens_selected_record() {
        let records = records(3);
        let mut grid = CardGrid::new();
        let event = EventKind::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        let actions: Vec<_> = grid
            .handle_event(&event, props(&records, 2))
            .into_iter()
            .collect();
        assert_eq!(actions, vec![Action::DetailOpen(3)]);
    }

    #[test]
    fn unfocused_grid_ignores_keys() {
        let records = records(3);
        let mut grid = CardGrid::new();
        let event = EventKind::Key(KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE));
        let mut unfocused = props(&records, 0);
        unfocused.is_focused = false;
        let actions: Vec<_> = grid.handle_event(&event, unfocused).into_iter().collect();
        assert!(actions.is_empty());
    }

    #[test]
    fn scrolls_to_keep_selection_visible() {
        let records = records(30);
        let mut render = RenderHarness::new(50, 12);
        let mut grid = CardGrid::new();
        // Two columns and two rows fit; selecting #21 pulls its row into view.
        let output = render.render_to_string_plain(|frame| {
            grid.render(frame, frame.area(), props(&records, 20));
        });
        assert!(output.contains("mon-21"));
        assert!(!output.contains("mon-1 "));
    }

    #[test]
    fn empty_list_messages() {
        let mut render = RenderHarness::new(60, 10);
        let mut grid = CardGrid::new();
        let output = render.render_to_string_plain(|frame| {
            grid.render(frame, frame.area(), props(&[], 0));
        });
        assert!(output.contains("No Pokemon match these filters."));

        let output = render.render_to_string_plain(|frame| {
            let mut loading = props(&[], 0);
            loading.busy = true;
            grid.render(frame, frame.area(), loading);
        });
        assert!(output.contains("Loading Pokedex..."));
    }
}
