use crossterm::event::KeyCode;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_dispatch::EventKind;
use tui_dispatch_components::{BaseStyle, Padding, TextInput, TextInputProps, TextInputStyle};

use super::{Component, ACCENT_GOLD, ACCENT_TEAL, BG_BASE, BG_PANEL, TEXT_DIM, TEXT_MAIN};
use crate::action::Action;

pub struct FilterBarProps<'a> {
    pub name: &'a str,
    pub type_label: &'a str,
    pub limit: u32,
    /// The name input owns the keyboard.
    pub editing: bool,
}

/// Filter controls above the grid: name input, type and page size.
pub struct FilterBar {
    input: TextInput,
}

impl Default for FilterBar {
    fn default() -> Self {
        Self {
            input: TextInput::new(),
        }
    }
}

impl FilterBar {
    pub fn new() -> Self {
        Self::default()
    }
}

const PLACEHOLDER: &str = "Filter by name ( / )";

fn submit_name(_: String) -> Action {
    Action::FilterNameSubmit
}

fn cursor_moved(_: usize) -> Action {
    Action::Render
}

fn input_style(editing: bool) -> TextInputStyle {
    TextInputStyle {
        base: BaseStyle {
            border: None,
            padding: Padding::xy(1, 0),
            bg: Some(if editing { BG_BASE } else { BG_PANEL }),
            fg: Some(TEXT_MAIN),
        },
        placeholder_style: Some(Style::default().fg(TEXT_DIM)),
        cursor_style: Some(Style::default().bg(ACCENT_GOLD).fg(BG_BASE)),
    }
}

impl Component<Action> for FilterBar {
    type Props<'a> = FilterBarProps<'a>;

    fn handle_event(
        &mut self,
        event: &EventKind,
        props: Self::Props<'_>,
    ) -> impl IntoIterator<Item = Action> {
        if !props.editing {
            return Vec::new();
        }
        let EventKind::Key(key) = event else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Esc => vec![Action::FilterNameCancel],
            KeyCode::Enter => vec![Action::FilterNameSubmit],
            _ => {
                let input_props = TextInputProps {
                    value: props.name,
                    placeholder: PLACEHOLDER,
                    is_focused: true,
                    style: input_style(true),
                    on_change: Action::FilterNameChange,
                    on_submit: submit_name,
                    on_cursor_move: Some(cursor_moved),
                };
                self.input
                    .handle_event(event, input_props)
                    .into_iter()
                    .collect()
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let border = if props.editing { ACCENT_TEAL } else { TEXT_DIM };
        let block = Block::default()
            .borders(Borders::ALL)
            .title("FILTERS")
            .style(Style::default().bg(BG_PANEL).fg(TEXT_MAIN))
            .border_style(Style::default().fg(border));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::horizontal([
            Constraint::Min(16),    // Name
            Constraint::Length(26), // Type
            Constraint::Length(16), // Page size
        ])
        .split(inner);

        let input_props = TextInputProps {
            value: props.name,
            placeholder: PLACEHOLDER,
            is_focused: props.editing,
            style: input_style(props.editing),
            on_change: Action::FilterNameChange,
            on_submit: submit_name,
            on_cursor_move: Some(cursor_moved),
        };
        self.input.render(frame, chunks[0], input_props);

        frame.render_widget(
            Paragraph::new(labelled("[ ] type", props.type_label)),
            chunks[1],
        );
        frame.render_widget(
            Paragraph::new(labelled("+/- size", &props.limit.to_string())),
            chunks[2],
        );
    }
}

fn labelled(key: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!(" {key} "),
            Style::default().fg(ACCENT_TEAL).add_modifier(Modifier::BOLD),
        ),
        Span::styled(value.to_string(), Style::default().fg(ACCENT_GOLD)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use tui_dispatch::testing::RenderHarness;

    fn key(code: KeyCode) -> EventKind {
        EventKind::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn props(editing: bool) -> FilterBarProps<'static> {
        FilterBarProps {
            name: "pika",
            type_label: "Electrik",
            limit: 20,
            editing,
        }
    }

    #[test]
    fn ignores_keys_when_not_editing() {
        let mut bar = FilterBar::new();
        let actions: Vec<_> = bar
            .handle_event(&key(KeyCode::Char('x')), props(false))
            .into_iter()
            .collect();
        assert!(actions.is_empty());
    }

    #[test]
    fn escape_cancels_and_enter_submits() {
        let mut bar = FilterBar::new();
        let actions: Vec<_> = bar
            .handle_event(&key(KeyCode::Esc), props(true))
            .into_iter()
            .collect();
        assert_eq!(actions, vec![Action::FilterNameCancel]);
        let actions: Vec<_> = bar
            .handle_event(&key(KeyCode::Enter), props(true))
            .into_iter()
            .collect();
        assert_eq!(actions, vec![Action::FilterNameSubmit]);
    }

    #[test]
    fn renders_current_filters() {
        let mut render = RenderHarness::new(80, 3);
        let mut bar = FilterBar::new();
        let output = render.render_to_string_plain(|frame| {
            bar.render(frame, frame.area(), props(false));
        });
        assert!(output.contains("pika"));
        assert!(output.contains("Electrik"));
        assert!(output.contains("20"));
    }
}
