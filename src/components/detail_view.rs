use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{
    BaseStyle, Padding, SelectList, SelectListBehavior, SelectListProps, SelectListStyle,
    SelectionStyle,
};

use super::{
    spinner, Component, SpriteView, SpriteViewProps, ACCENT_GOLD, ACCENT_TEAL, BG_HIGHLIGHT,
    BG_PANEL, TEXT_DIM, TEXT_MAIN,
};
use crate::action::Action;
use crate::sprite::SPRITE_MAX_COLS;
use crate::state::{DetailRecord, DetailScreen, Evolution, Stat, TypeTag};
use crate::stats::render_stat;

pub const TYPES_UNAVAILABLE: &str = "Types unavailable for this Pokémon.";
pub const STATS_UNAVAILABLE: &str = "Statistics unavailable for this Pokémon.";
pub const EVOLUTIONS_UNAVAILABLE: &str = "Evolutions unavailable for this Pokémon.";

pub struct DetailViewProps<'a> {
    pub detail: &'a DetailScreen,
    pub tick: u64,
    pub is_focused: bool,
}

pub struct DetailView {
    evolution_list: SelectList,
    sprite: SpriteView,
}

impl Default for DetailView {
    fn default() -> Self {
        Self {
            evolution_list: SelectList::new(),
            sprite: SpriteView,
        }
    }
}

impl DetailView {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component<Action> for DetailView {
    type Props<'a> = DetailViewProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.is_focused {
            return Vec::new();
        }
        let EventKind::Key(key) = event else {
            return Vec::new();
        };

        match key.code {
            KeyCode::Esc | KeyCode::Backspace => vec![Action::DetailBack],
            KeyCode::Char('q') => vec![Action::Quit],
            KeyCode::Enter => vec![Action::EvolutionOpen],
            _ => {
                let items = evolution_items(available(
                    props.detail.record.data().and_then(|r| r.evolutions.as_ref()),
                ));
                if items.is_empty() {
                    return Vec::new();
                }
                let list_props = SelectListProps {
                    items: &items,
                    count: items.len(),
                    selected: props.detail.evolution_selected.min(items.len() - 1),
                    is_focused: true,
                    style: evolution_list_style(),
                    behavior: SelectListBehavior {
                        show_scrollbar: true,
                        wrap_navigation: false,
                    },
                    on_select: Action::EvolutionSelect,
                    render_item: &|item| item.clone(),
                };
                self.evolution_list
                    .handle_event(event, list_props)
                    .into_iter()
                    .collect()
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        // A failed fetch keeps the loading view; the reason is in the footer.
        let Some(record) = props.detail.record.data() else {
            let label = match props.detail.id {
                Some(id) => format!("{} Loading Pokémon #{id}...", spinner(props.tick)),
                None => "No Pokémon selected.".to_string(),
            };
            let block = panel(" POKÉMON ", false);
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new(label)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(TEXT_DIM)),
                inner,
            );
            return;
        };

        let chunks = Layout::vertical([
            Constraint::Length(3), // Name and types
            Constraint::Min(1),    // Sprite, stats, evolutions
        ])
        .split(area);
        render_header(frame, chunks[0], record);

        let body = Layout::horizontal([
            Constraint::Length(SPRITE_MAX_COLS as u16 + 2),
            Constraint::Min(20),
        ])
        .split(chunks[1]);

        let sprite_block = panel(" ARTWORK ", false);
        let sprite_area = sprite_block.inner(body[0]);
        frame.render_widget(sprite_block, body[0]);
        let slot = props.detail.image_slot(record.image.as_deref());
        self.sprite
            .render(frame, sprite_area, SpriteViewProps { slot: &slot });

        let stats = available(record.stats.as_ref());
        let stats_rows = stats.map_or(1, <[Stat]>::len) as u16 + 2;
        let right = Layout::vertical([Constraint::Length(stats_rows), Constraint::Min(3)])
            .split(body[1]);
        render_stats(frame, right[0], stats);
        self.render_evolutions(frame, right[1], record, &props);
    }
}

impl DetailView {
    fn render_evolutions(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        record: &DetailRecord,
        props: &DetailViewProps<'_>,
    ) {
        let block = panel(" EVOLUTIONS ", props.is_focused);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let Some(evolutions) = available(record.evolutions.as_ref()) else {
            frame.render_widget(unavailable(EVOLUTIONS_UNAVAILABLE), inner);
            return;
        };

        let columns = Layout::horizontal([Constraint::Min(16), Constraint::Percentage(55)])
            .split(inner);
        let items = evolution_items(Some(evolutions));
        let selected = props.detail.evolution_selected.min(items.len() - 1);
        let list_props = SelectListProps {
            items: &items,
            count: items.len(),
            selected,
            is_focused: props.is_focused,
            style: evolution_list_style(),
            behavior: SelectListBehavior {
                show_scrollbar: true,
                wrap_navigation: false,
            },
            on_select: Action::EvolutionSelect,
            render_item: &|item| item.clone(),
        };
        self.evolution_list.render(frame, columns[0], list_props);

        let slot = props
            .detail
            .image_slot(evolutions[selected].image.as_deref());
        self.sprite
            .render(frame, columns[1], SpriteViewProps { slot: &slot });
    }
}

/// Present and non-empty sub-resources only.
fn available<T>(items: Option<&Vec<T>>) -> Option<&[T]> {
    items.map(Vec::as_slice).filter(|items| !items.is_empty())
}

fn render_header(frame: &mut Frame, area: Rect, record: &DetailRecord) {
    let block = panel(&format!(" #{:03} {} ", record.id, record.name), false);
    let types_line = match available(record.types.as_ref()) {
        Some(types) => types_line(types),
        None => Line::from(Span::styled(
            TYPES_UNAVAILABLE,
            Style::default().fg(TEXT_DIM),
        )),
    };
    frame.render_widget(Paragraph::new(types_line).block(block), area);
}

fn types_line(types: &[TypeTag]) -> Line<'static> {
    let mut spans = vec![Span::styled("Types: ", Style::default().fg(TEXT_DIM))];
    for (index, tag) in types.iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled(" / ", Style::default().fg(TEXT_DIM)));
        }
        spans.push(Span::styled(
            tag.name.clone(),
            Style::default().fg(ACCENT_GOLD).add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

fn render_stats(frame: &mut Frame, area: Rect, stats: Option<&[Stat]>) {
    let block = panel(" STATS ", false);
    let Some(stats) = stats else {
        frame.render_widget(unavailable(STATS_UNAVAILABLE).block(block), area);
        return;
    };
    let lines = stats
        .iter()
        .map(|stat| Line::from(render_stat(stat)))
        .collect::<Vec<_>>();
    frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);
}

fn evolution_items(evolutions: Option<&[Evolution]>) -> Vec<Line<'static>> {
    evolutions
        .unwrap_or_default()
        .iter()
        .map(|evolution| Line::from(format!("#{:03} {}", evolution.id, evolution.name)))
        .collect()
}

fn unavailable(message: &'static str) -> Paragraph<'static> {
    Paragraph::new(message)
        .style(Style::default().fg(TEXT_DIM))
        .wrap(Wrap { trim: true })
}

fn panel(title: &str, focused: bool) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
        .border_style(Style::default().fg(if focused { ACCENT_TEAL } else { TEXT_DIM }))
}

fn evolution_list_style() -> SelectListStyle {
    SelectListStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: Some(BG_PANEL),
            fg: Some(TEXT_MAIN),
        },
        selection: SelectionStyle {
            style: Some(
                Style::default()
                    .bg(BG_HIGHLIGHT)
                    .fg(TEXT_MAIN)
                    .add_modifier(Modifier::BOLD),
            ),
            marker: None,
            disabled: false,
        },
        ..SelectListStyle::default()
    }
}
