use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Span,
    widgets::Borders,
    Frame,
};
use tui_dispatch_components::style::BorderStyle;
use tui_dispatch_components::{
    BaseStyle, Padding, StatusBar, StatusBarHint, StatusBarItem, StatusBarProps,
    StatusBarSection, StatusBarStyle,
};

use super::{
    spinner, Component, ACCENT_GOLD, ACCENT_RED, ACCENT_TEAL, BG_PANEL, TEXT_DIM, TEXT_MAIN,
};
use crate::action::Action;
use crate::state::{AppState, Screen};

pub struct StatusFooterProps<'a> {
    pub state: &'a AppState,
}

pub struct StatusFooter {
    status_bar: StatusBar,
}

impl Default for StatusFooter {
    fn default() -> Self {
        Self {
            status_bar: StatusBar::new(),
        }
    }
}

impl StatusFooter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component<Action> for StatusFooter {
    type Props<'a> = StatusFooterProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let state = props.state;
        let (status, color) = match &state.message {
            Some(message) => (message.clone(), ACCENT_RED),
            None => (progress(state), ACCENT_GOLD),
        };
        let status_items = [StatusBarItem::span(Span::styled(
            status.as_str(),
            Style::default().fg(color),
        ))];
        let left_hints = hints(state);
        let center_hints = [StatusBarHint::new("q", "Quit")];

        let style = StatusBarStyle {
            base: BaseStyle {
                border: Some(BorderStyle {
                    borders: Borders::ALL,
                    style: Style::default().fg(TEXT_DIM),
                    focused_style: Some(Style::default().fg(ACCENT_TEAL)),
                }),
                padding: Padding::xy(1, 0),
                bg: Some(BG_PANEL),
                fg: Some(TEXT_MAIN),
            },
            text: Style::default().fg(TEXT_DIM),
            hint_key: Style::default()
                .fg(ACCENT_TEAL)
                .add_modifier(Modifier::BOLD),
            hint_label: Style::default().fg(TEXT_DIM),
            separator: Style::default().fg(TEXT_DIM),
        };

        let center = if state.list.name_editing {
            StatusBarSection::empty()
        } else {
            StatusBarSection::hints(&center_hints)
        };
        let props = StatusBarProps {
            left: StatusBarSection::hints(&left_hints).with_separator("  "),
            center,
            right: StatusBarSection::items(&status_items).with_separator("  "),
            style,
            is_focused: false,
        };
        Component::<Action>::render(&mut self.status_bar, frame, area, props);
    }
}

fn progress(state: &AppState) -> String {
    match state.screen {
        Screen::List if state.list.busy => format!(
            "{} Loading page {}...",
            spinner(state.tick),
            state.list.query.page
        ),
        Screen::Detail if state.detail.record.is_loading() => {
            format!("{} Loading Pokémon...", spinner(state.tick))
        }
        _ => String::new(),
    }
}

fn hints(state: &AppState) -> Vec<StatusBarHint<'static>> {
    match state.screen {
        Screen::List if state.list.name_editing => vec![
            StatusBarHint::new("Enter", "Done"),
            StatusBarHint::new("Esc", "Clear"),
        ],
        Screen::List => vec![
            StatusBarHint::new("Enter", "Open"),
            StatusBarHint::new("/", "Name"),
            StatusBarHint::new("[ ]", "Type"),
            StatusBarHint::new("c", "All types"),
            StatusBarHint::new("+/-", "Page size"),
            StatusBarHint::new("r", "Reload"),
        ],
        Screen::Detail => vec![
            StatusBarHint::new("j/k", "Evolution"),
            StatusBarHint::new("Enter", "Open"),
            StatusBarHint::new("Esc", "Back"),
        ],
    }
}
