use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tui_dispatch::DataResource;
use tui_dispatch_debug::debug::{ron_string, DebugSection, DebugState};

use crate::query::QueryState;
use crate::scroll::{ScrollObserver, ScrollPosition};
use crate::sprite::ImageSlot;

/// Card size in the list grid, borders included.
pub const CARD_WIDTH: u16 = 24;
pub const CARD_HEIGHT: u16 = 5;
/// Spinner frame interval while a request is in flight.
pub const SPINNER_TICK_MS: u64 = 120;
/// Rows taken by the filter bar, the footer and the grid border.
const GRID_CHROME_ROWS: u16 = 3 + 3 + 2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypeTag {
    pub id: u32,
    pub name: String,
    pub image: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub id: u32,
    pub name: String,
    pub image: String,
    pub types: Vec<TypeTag>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stat {
    pub name: String,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evolution {
    pub id: u32,
    pub name: String,
    pub image: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub id: u32,
    pub name: String,
    pub image: Option<String>,
    pub stats: Option<Vec<Stat>>,
    pub evolutions: Option<Vec<Evolution>>,
    pub types: Option<Vec<TypeTag>>,
}

impl DetailRecord {
    /// Every distinct image URL the detail screen shows.
    pub fn image_urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = Vec::new();
        let evolution_images = self
            .evolutions
            .iter()
            .flatten()
            .filter_map(|evolution| evolution.image.as_ref());
        for url in self.image.iter().chain(evolution_images) {
            if !url.is_empty() && !urls.contains(url) {
                urls.push(url.clone());
            }
        }
        urls
    }

    pub fn evolution_count(&self) -> usize {
        self.evolutions.as_ref().map_or(0, Vec::len)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Screen {
    List,
    Detail,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListScreen {
    pub query: QueryState,
    pub records: Vec<SummaryRecord>,
    pub types: Vec<TypeTag>,
    pub selected: usize,
    /// A page fetch is outstanding.
    pub busy: bool,
    /// Generation of the latest issued page request.
    pub generation: u64,
    /// The last page came back short; no further pages exist.
    pub exhausted: bool,
    pub name_editing: bool,
    pub scroll: ScrollObserver,
}

impl ListScreen {
    pub fn new(query: QueryState) -> Self {
        Self {
            query,
            records: Vec::new(),
            types: Vec::new(),
            selected: 0,
            busy: false,
            generation: 0,
            exhausted: false,
            name_editing: false,
            scroll: ScrollObserver::default(),
        }
    }

    pub fn selected_record(&self) -> Option<&SummaryRecord> {
        self.records.get(self.selected)
    }

    pub fn type_name(&self, type_id: u32) -> Option<&str> {
        self.types
            .iter()
            .find(|tag| tag.id == type_id)
            .map(|tag| tag.name.as_str())
    }

    pub fn type_label(&self) -> String {
        match self.query.type_id {
            None => "All types".to_string(),
            Some(id) => self
                .type_name(id)
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{id}")),
        }
    }

    pub fn scroll_position(&self, columns: usize) -> ScrollPosition {
        ScrollPosition::in_grid(self.selected, self.records.len(), columns)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetailScreen {
    pub id: Option<u32>,
    /// Generation of the latest issued detail request.
    pub generation: u64,
    pub record: DataResource<DetailRecord>,
    pub images: HashMap<String, ImageSlot>,
    pub evolution_selected: usize,
}

impl Default for DetailScreen {
    fn default() -> Self {
        Self {
            id: None,
            generation: 0,
            record: DataResource::Empty,
            images: HashMap::new(),
            evolution_selected: 0,
        }
    }
}

impl DetailScreen {
    /// What to draw for an image URL. No URL at all means the placeholder.
    pub fn image_slot(&self, url: Option<&str>) -> ImageSlot {
        match url.filter(|url| !url.is_empty()) {
            None => ImageSlot::Fallback,
            Some(url) => self.images.get(url).cloned().unwrap_or(ImageSlot::Loading),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppState {
    pub screen: Screen,
    pub list: ListScreen,
    pub detail: DetailScreen,
    pub terminal_size: (u16, u16),
    pub message: Option<String>,
    pub tick: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(QueryState::default(), None)
    }
}

impl AppState {
    /// Initial state; `start_id` opens the detail screen straight away.
    pub fn new(query: QueryState, start_id: Option<u32>) -> Self {
        let detail = DetailScreen {
            id: start_id,
            ..DetailScreen::default()
        };
        Self {
            screen: if start_id.is_some() {
                Screen::Detail
            } else {
                Screen::List
            },
            list: ListScreen::new(query),
            detail,
            terminal_size: (80, 24),
            message: None,
            tick: 0,
        }
    }

    pub fn grid_columns(&self) -> usize {
        grid_columns(self.terminal_size.0.saturating_sub(2))
    }

    pub fn grid_visible_rows(&self) -> usize {
        grid_rows(self.terminal_size.1.saturating_sub(GRID_CHROME_ROWS))
    }

    pub fn is_loading(&self) -> bool {
        match self.screen {
            Screen::List => self.list.busy,
            Screen::Detail => self.detail.record.is_loading(),
        }
    }
}

/// Cards that fit side by side in `width` cells.
pub fn grid_columns(width: u16) -> usize {
    (width / CARD_WIDTH).max(1) as usize
}

/// Card rows that fit in `height` cells.
pub fn grid_rows(height: u16) -> usize {
    (height / CARD_HEIGHT).max(1) as usize
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        vec![
            DebugSection::new("List")
                .entry("records", ron_string(&self.list.records.len()))
                .entry("selected", ron_string(&self.list.selected))
                .entry("page", ron_string(&self.list.query.page))
                .entry("limit", ron_string(&self.list.query.limit))
                .entry("name", ron_string(&self.list.query.name))
                .entry("type", ron_string(&self.list.query.type_id))
                .entry("busy", ron_string(&self.list.busy))
                .entry("generation", ron_string(&self.list.generation))
                .entry("exhausted", ron_string(&self.list.exhausted))
                .entry("scroll_attached", ron_string(&self.list.scroll.is_attached())),
            DebugSection::new("Detail")
                .entry("screen", ron_string(&self.screen))
                .entry("id", ron_string(&self.detail.id))
                .entry("generation", ron_string(&self.detail.generation))
                .entry("loading", ron_string(&self.detail.record.is_loading()))
                .entry("images", ron_string(&self.detail.images.len())),
            DebugSection::new("Status").entry("message", ron_string(&self.message)),
        ]
    }
}
