use crate::query::{FetchMode, QueryState};

#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    LoadTypes,
    /// Fetch one page of the collection. `debounce` coalesces bursts of
    /// name-filter keystrokes into a single request.
    LoadPage {
        query: QueryState,
        generation: u64,
        mode: FetchMode,
        debounce: bool,
    },
    LoadDetail { id: u32, generation: u64 },
    LoadSprite { url: String },
}
