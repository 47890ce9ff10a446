use serde::{Deserialize, Serialize};

use crate::query::FetchMode;
use crate::sprite::SpriteArt;
use crate::state::{DetailRecord, SummaryRecord, TypeTag};

#[derive(tui_dispatch::Action, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[action(infer_categories)]
pub enum Action {
    Init,

    TypesDidLoad(Vec<TypeTag>),
    TypesDidError(String),

    ListDidLoad {
        generation: u64,
        mode: FetchMode,
        records: Vec<SummaryRecord>,
    },
    ListDidError {
        generation: u64,
        mode: FetchMode,
        error: String,
    },
    ListReload,
    /// Move the selection by whole cards (left/right)
    ListMoveColumn(i16),
    /// Move the selection by grid rows (up/down, mouse wheel)
    ListMoveRow(i16),
    /// Move the selection by a screenful of rows
    ListMovePage(i16),
    ListJumpTop,
    ListJumpBottom,

    FilterNameStart,
    /// Name filter text changed (debounced fetch)
    FilterNameChange(String),
    FilterNameSubmit,
    FilterNameCancel,
    FilterTypeNext,
    FilterTypePrev,
    FilterTypeClear,
    PageSizeNext,
    PageSizePrev,

    DetailOpen(u32),
    DetailDidLoad {
        generation: u64,
        record: DetailRecord,
    },
    DetailDidError {
        generation: u64,
        error: String,
    },
    DetailBack,
    EvolutionSelect(usize),
    EvolutionOpen,

    SpriteDidLoad { url: String, sprite: SpriteArt },
    SpriteDidError { url: String, error: String },

    UiTerminalResize(u16, u16),
    /// Force a re-render (cursor movement in the name input)
    Render,
    Tick,
    Quit,
}
