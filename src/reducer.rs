use tui_dispatch::{DataResource, DispatchResult};

use crate::action::Action;
use crate::effect::Effect;
use crate::query::FetchMode;
use crate::sprite::ImageSlot;
use crate::state::{AppState, DetailRecord, Screen};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        Action::Init => {
            state.message = None;
            let mut effects = vec![Effect::LoadTypes, reset_list(state, false)];
            match state.detail.id {
                Some(id) if state.screen == Screen::Detail => {
                    effects.push(open_detail(state, id));
                }
                _ => state.list.scroll.attach(),
            }
            DispatchResult::changed_with_many(effects)
        }

        Action::TypesDidLoad(types) => {
            state.list.types = types;
            DispatchResult::changed()
        }

        Action::TypesDidError(error) => {
            state.message = Some(format!("Type list error: {error}"));
            DispatchResult::changed()
        }

        Action::ListDidLoad {
            generation,
            mode,
            records,
        } => {
            if generation != state.list.generation {
                log::debug!(
                    "dropping stale page response (generation {generation}, latest {})",
                    state.list.generation
                );
                return DispatchResult::unchanged();
            }
            let list = &mut state.list;
            list.busy = false;
            list.exhausted = records.len() < list.query.limit as usize;
            match mode {
                FetchMode::Reset => {
                    list.records = records;
                    list.selected = 0;
                }
                FetchMode::Append => list.records.extend(records),
            }
            state.message = None;
            DispatchResult::changed()
        }

        Action::ListDidError {
            generation,
            mode,
            error,
        } => {
            if generation != state.list.generation {
                return DispatchResult::unchanged();
            }
            state.list.busy = false;
            if mode == FetchMode::Append {
                state.list.query.rewind();
            }
            state.message = Some(format!("List error: {error}"));
            DispatchResult::changed()
        }

        Action::ListReload => {
            state.list.query.page = 1;
            DispatchResult::changed_with(reset_list(state, false))
        }

        Action::ListMoveColumn(delta) => {
            let target = offset_index(state.list.selected, delta as i64);
            move_selection(state, target)
        }

        Action::ListMoveRow(delta) => {
            let columns = state.grid_columns() as i64;
            let target = offset_index(state.list.selected, delta as i64 * columns);
            move_selection(state, target)
        }

        Action::ListMovePage(delta) => {
            let step = (state.grid_columns() * state.grid_visible_rows()) as i64;
            let target = offset_index(state.list.selected, delta as i64 * step);
            move_selection(state, target)
        }

        Action::ListJumpTop => move_selection(state, 0),

        Action::ListJumpBottom => {
            let last = state.list.records.len().saturating_sub(1);
            move_selection(state, last)
        }

        Action::FilterNameStart => {
            if state.list.name_editing {
                return DispatchResult::unchanged();
            }
            state.list.name_editing = true;
            DispatchResult::changed()
        }

        Action::FilterNameChange(name) => {
            if !state.list.query.set_name(name) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed_with(reset_list(state, true))
        }

        Action::FilterNameSubmit => {
            if !state.list.name_editing {
                return DispatchResult::unchanged();
            }
            state.list.name_editing = false;
            DispatchResult::changed()
        }

        Action::FilterNameCancel => {
            state.list.name_editing = false;
            if state.list.query.set_name("") {
                return DispatchResult::changed_with(reset_list(state, false));
            }
            DispatchResult::changed()
        }

        Action::FilterTypeNext => cycle_type(state, 1),
        Action::FilterTypePrev => cycle_type(state, -1),

        Action::FilterTypeClear => {
            if !state.list.query.set_type(None) {
                return DispatchResult::unchanged();
            }
            DispatchResult::changed_with(reset_list(state, false))
        }

        Action::PageSizeNext => cycle_page_size(state, 1),
        Action::PageSizePrev => cycle_page_size(state, -1),

        Action::DetailOpen(id) => DispatchResult::changed_with(open_detail(state, id)),

        Action::DetailDidLoad { generation, record } => {
            if generation != state.detail.generation {
                log::debug!("dropping stale detail response for #{}", record.id);
                return DispatchResult::unchanged();
            }
            let urls = record.image_urls();
            state.detail.record = DataResource::Loaded(record);
            state.detail.images.clear();
            state.message = None;
            let effects: Vec<_> = urls
                .into_iter()
                .map(|url| {
                    state.detail.images.insert(url.clone(), ImageSlot::Loading);
                    Effect::LoadSprite { url }
                })
                .collect();
            if effects.is_empty() {
                DispatchResult::changed()
            } else {
                DispatchResult::changed_with_many(effects)
            }
        }

        Action::DetailDidError { generation, error } => {
            if generation != state.detail.generation {
                return DispatchResult::unchanged();
            }
            state.detail.record = DataResource::Failed(error.clone());
            state.message = Some(format!("Detail error: {error}"));
            DispatchResult::changed()
        }

        Action::DetailBack => {
            if state.screen != Screen::Detail {
                return DispatchResult::unchanged();
            }
            state.screen = Screen::List;
            state.list.scroll.attach();
            state.message = None;
            DispatchResult::changed()
        }

        Action::EvolutionSelect(index) => {
            let count = state
                .detail
                .record
                .data()
                .map_or(0, DetailRecord::evolution_count);
            if count == 0 {
                return DispatchResult::unchanged();
            }
            let index = index.min(count - 1);
            if index == state.detail.evolution_selected {
                return DispatchResult::unchanged();
            }
            state.detail.evolution_selected = index;
            DispatchResult::changed()
        }

        Action::EvolutionOpen => {
            let id = state
                .detail
                .record
                .data()
                .and_then(|record| record.evolutions.as_ref())
                .and_then(|evolutions| evolutions.get(state.detail.evolution_selected))
                .map(|evolution| evolution.id);
            match id {
                Some(id) => DispatchResult::changed_with(open_detail(state, id)),
                None => DispatchResult::unchanged(),
            }
        }

        Action::SpriteDidLoad { url, sprite } => match state.detail.images.get_mut(&url) {
            Some(slot) => {
                *slot = ImageSlot::Ready(sprite);
                DispatchResult::changed()
            }
            None => DispatchResult::unchanged(),
        },

        Action::SpriteDidError { url, error } => match state.detail.images.get_mut(&url) {
            Some(slot) => {
                log::debug!("image {url} replaced by placeholder: {error}");
                *slot = ImageSlot::Fallback;
                DispatchResult::changed()
            }
            None => DispatchResult::unchanged(),
        },

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size == (width, height) {
                return DispatchResult::unchanged();
            }
            state.terminal_size = (width, height);
            DispatchResult::changed()
        }

        Action::Tick => {
            if state.is_loading() {
                state.tick = state.tick.wrapping_add(1);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Render => DispatchResult::changed(),

        Action::Quit => DispatchResult::unchanged(),
    }
}

/// Start a page-1 fetch that replaces the list. Any outstanding page fetch
/// is superseded: its generation is no longer the latest.
fn reset_list(state: &mut AppState, debounce: bool) -> Effect {
    let list = &mut state.list;
    list.generation += 1;
    list.busy = true;
    list.exhausted = false;
    log::debug!(
        "list reset: generation {} query {:?}",
        list.generation,
        list.query
    );
    Effect::LoadPage {
        query: list.query.clone(),
        generation: list.generation,
        mode: FetchMode::Reset,
        debounce,
    }
}

/// Request the next page if the selection is near the end of the grid.
/// Skipped while a fetch is in flight or after the last page.
fn maybe_advance(state: &mut AppState) -> Option<Effect> {
    let columns = state.grid_columns();
    let list = &mut state.list;
    if !list.scroll.near_end(list.scroll_position(columns)) {
        return None;
    }
    if list.busy || list.exhausted {
        return None;
    }
    list.query.advance();
    list.generation += 1;
    list.busy = true;
    log::debug!(
        "list advance: page {} generation {}",
        list.query.page,
        list.generation
    );
    Some(Effect::LoadPage {
        query: list.query.clone(),
        generation: list.generation,
        mode: FetchMode::Append,
        debounce: false,
    })
}

fn move_selection(state: &mut AppState, target: usize) -> DispatchResult<Effect> {
    let len = state.list.records.len();
    if len == 0 {
        return DispatchResult::unchanged();
    }
    let target = target.min(len - 1);
    let moved = target != state.list.selected;
    state.list.selected = target;
    match maybe_advance(state) {
        Some(effect) => DispatchResult::changed_with(effect),
        None if moved => DispatchResult::changed(),
        None => DispatchResult::unchanged(),
    }
}

fn cycle_type(state: &mut AppState, step: i32) -> DispatchResult<Effect> {
    let types = &state.list.types;
    if types.is_empty() {
        return DispatchResult::unchanged();
    }
    // Position 0 is "all types", the rest follow the type list.
    let slots = types.len() as i32 + 1;
    let current = state
        .list
        .query
        .type_id
        .and_then(|id| types.iter().position(|tag| tag.id == id))
        .map_or(0, |index| index as i32 + 1);
    let next = (current + step).rem_euclid(slots) as usize;
    let type_id = next.checked_sub(1).map(|index| types[index].id);
    if !state.list.query.set_type(type_id) {
        return DispatchResult::unchanged();
    }
    DispatchResult::changed_with(reset_list(state, false))
}

fn cycle_page_size(state: &mut AppState, step: i32) -> DispatchResult<Effect> {
    let limit = state.list.query.cycled_limit(step);
    if !state.list.query.set_limit(limit) {
        return DispatchResult::unchanged();
    }
    DispatchResult::changed_with(reset_list(state, false))
}

fn open_detail(state: &mut AppState, id: u32) -> Effect {
    state.screen = Screen::Detail;
    state.list.scroll.detach();
    state.list.name_editing = false;
    let detail = &mut state.detail;
    detail.id = Some(id);
    detail.generation += 1;
    detail.record = DataResource::Loading;
    detail.images.clear();
    detail.evolution_selected = 0;
    state.message = None;
    Effect::LoadDetail {
        id,
        generation: detail.generation,
    }
}

fn offset_index(index: usize, delta: i64) -> usize {
    (index as i64 + delta).max(0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryState;
    use crate::state::{Evolution, Stat, SummaryRecord, TypeTag};
    use pretty_assertions::assert_eq;

    fn record(id: u32) -> SummaryRecord {
        SummaryRecord {
            id,
            name: format!("mon-{id}"),
            image: format!("{id}.png"),
            types: Vec::new(),
        }
    }

    fn page(range: std::ops::RangeInclusive<u32>) -> Vec<SummaryRecord> {
        range.map(record).collect()
    }

    fn ids(state: &AppState) -> Vec<u32> {
        state.list.records.iter().map(|r| r.id).collect()
    }

    /// Booted list screen with the first page of ten loaded, one card per row.
    fn loaded_list() -> AppState {
        let mut state = AppState::new(QueryState::with_limit(10), None);
        state.terminal_size = (30, 40);
        let _ = reducer(&mut state, Action::Init);
        let generation = state.list.generation;
        let _ = reducer(
            &mut state,
            Action::ListDidLoad {
                generation,
                mode: FetchMode::Reset,
                records: page(1..=10),
            },
        );
        state
    }

    fn detail_record(evolutions: Option<Vec<Evolution>>) -> DetailRecord {
        DetailRecord {
            id: 1,
            name: "Bulbizarre".into(),
            image: Some("main.png".into()),
            stats: Some(vec![Stat {
                name: "HP".into(),
                value: 45.0,
            }]),
            evolutions,
            types: None,
        }
    }

    #[test]
    fn init_loads_types_and_first_page() {
        let mut state = AppState::default();
        let result = reducer(&mut state, Action::Init);
        assert!(result.changed);
        assert_eq!(result.effects.len(), 2);
        assert_eq!(result.effects[0], Effect::LoadTypes);
        assert!(matches!(
            &result.effects[1],
            Effect::LoadPage { query, mode: FetchMode::Reset, debounce: false, .. }
                if query.page == 1 && query.limit == 50
        ));
        assert!(state.list.busy);
        assert!(state.list.scroll.is_attached());
    }

    #[test]
    fn init_with_start_id_opens_detail() {
        let mut state = AppState::new(QueryState::default(), Some(4));
        let result = reducer(&mut state, Action::Init);
        assert_eq!(result.effects.len(), 3);
        assert!(matches!(result.effects[2], Effect::LoadDetail { id: 4, .. }));
        assert!(!state.list.scroll.is_attached());
        assert!(state.detail.record.is_loading());
    }

    #[test]
    fn advancing_appends() {
        let mut state = loaded_list();
        let result = reducer(&mut state, Action::ListJumpBottom);
        assert_eq!(result.effects.len(), 1);
        let Effect::LoadPage {
            query,
            generation,
            mode,
            ..
        } = result.effects[0].clone()
        else {
            panic!("expected page load");
        };
        assert_eq!(query.page, 2);
        assert_eq!(mode, FetchMode::Append);

        let _ = reducer(
            &mut state,
            Action::ListDidLoad {
                generation,
                mode,
                records: page(11..=20),
            },
        );
        assert_eq!(ids(&state), (1..=20).collect::<Vec<_>>());
        assert!(!state.list.busy);
    }

    #[test]
    fn no_advance_while_busy() {
        let mut state = loaded_list();
        let first = reducer(&mut state, Action::ListJumpBottom);
        assert_eq!(first.effects.len(), 1);
        let second = reducer(&mut state, Action::ListMoveRow(-1));
        assert!(second.effects.is_empty());
        assert_eq!(state.list.query.page, 2);
    }

    #[test]
    fn filter_change_resets_to_first_page() {
        let mut state = loaded_list();
        let _ = reducer(&mut state, Action::ListJumpBottom);
        assert_eq!(state.list.query.page, 2);

        let result = reducer(&mut state, Action::FilterNameChange("p".into()));
        assert_eq!(state.list.query.page, 1);
        assert!(matches!(
            &result.effects[0],
            Effect::LoadPage { mode: FetchMode::Reset, debounce: true, query, .. }
                if query.name == "p"
        ));
        let generation = state.list.generation;
        let _ = reducer(
            &mut state,
            Action::ListDidLoad {
                generation,
                mode: FetchMode::Reset,
                records: vec![record(25)],
            },
        );
        assert_eq!(ids(&state), vec![25]);
    }

    #[test]
    fn stale_page_response_is_dropped() {
        let mut state = loaded_list();
        let _ = reducer(&mut state, Action::ListJumpBottom);
        let stale_generation = state.list.generation;
        let _ = reducer(&mut state, Action::FilterTypeClear);
        let _ = reducer(&mut state, Action::PageSizeNext);
        let latest = state.list.generation;
        assert!(latest > stale_generation);

        let result = reducer(
            &mut state,
            Action::ListDidLoad {
                generation: stale_generation,
                mode: FetchMode::Append,
                records: page(11..=20),
            },
        );
        assert!(!result.changed);
        assert!(state.list.busy);
        assert_eq!(ids(&state), (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn page_size_change_resets_like_a_filter() {
        let mut state = loaded_list();
        let _ = reducer(&mut state, Action::ListJumpBottom);
        let result = reducer(&mut state, Action::PageSizeNext);
        assert_eq!(state.list.query.limit, 20);
        assert_eq!(state.list.query.page, 1);
        assert!(matches!(
            &result.effects[0],
            Effect::LoadPage { mode: FetchMode::Reset, .. }
        ));
    }

    #[test]
    fn short_page_exhausts_list() {
        let mut state = loaded_list();
        let result = reducer(&mut state, Action::ListJumpBottom);
        let Effect::LoadPage { generation, .. } = result.effects[0].clone() else {
            panic!("expected page load");
        };
        let _ = reducer(
            &mut state,
            Action::ListDidLoad {
                generation,
                mode: FetchMode::Append,
                records: page(11..=13),
            },
        );
        assert!(state.list.exhausted);
        let result = reducer(&mut state, Action::ListJumpBottom);
        assert!(result.effects.is_empty());
    }

    #[test]
    fn failed_append_keeps_list_and_rewinds_page() {
        let mut state = loaded_list();
        let result = reducer(&mut state, Action::ListJumpBottom);
        let Effect::LoadPage { generation, .. } = result.effects[0].clone() else {
            panic!("expected page load");
        };
        let _ = reducer(
            &mut state,
            Action::ListDidError {
                generation,
                mode: FetchMode::Append,
                error: "timeout".into(),
            },
        );
        assert!(!state.list.busy);
        assert_eq!(state.list.query.page, 1);
        assert_eq!(ids(&state), (1..=10).collect::<Vec<_>>());
        assert_eq!(state.message.as_deref(), Some("List error: timeout"));
    }

    #[test]
    fn type_cycle_walks_all_then_types() {
        let mut state = loaded_list();
        let _ = reducer(
            &mut state,
            Action::TypesDidLoad(vec![
                TypeTag {
                    id: 7,
                    name: "Feu".into(),
                    image: None,
                },
                TypeTag {
                    id: 9,
                    name: "Eau".into(),
                    image: None,
                },
            ]),
        );
        let _ = reducer(&mut state, Action::FilterTypeNext);
        assert_eq!(state.list.query.type_id, Some(7));
        let _ = reducer(&mut state, Action::FilterTypeNext);
        assert_eq!(state.list.query.type_id, Some(9));
        let _ = reducer(&mut state, Action::FilterTypeNext);
        assert_eq!(state.list.query.type_id, None);
        let _ = reducer(&mut state, Action::FilterTypePrev);
        assert_eq!(state.list.query.type_id, Some(9));
    }

    #[test]
    fn type_cycle_without_types_is_a_no_op() {
        let mut state = loaded_list();
        let result = reducer(&mut state, Action::FilterTypeNext);
        assert!(!result.changed);
    }

    #[test]
    fn cancel_name_filter_clears_it() {
        let mut state = loaded_list();
        let _ = reducer(&mut state, Action::FilterNameStart);
        let _ = reducer(&mut state, Action::FilterNameChange("a".into()));
        let result = reducer(&mut state, Action::FilterNameCancel);
        assert!(!state.list.name_editing);
        assert_eq!(state.list.query.name, "");
        assert_eq!(result.effects.len(), 1);
    }

    #[test]
    fn detail_open_detaches_scroll_and_back_reattaches() {
        let mut state = loaded_list();
        let result = reducer(&mut state, Action::DetailOpen(3));
        assert_eq!(state.screen, Screen::Detail);
        assert!(!state.list.scroll.is_attached());
        assert!(matches!(result.effects[0], Effect::LoadDetail { id: 3, .. }));

        // Moving the list while detached never pages.
        let result = reducer(&mut state, Action::ListJumpBottom);
        assert!(result.effects.is_empty());

        let _ = reducer(&mut state, Action::DetailBack);
        assert_eq!(state.screen, Screen::List);
        assert!(state.list.scroll.is_attached());
        assert_eq!(ids(&state), (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn detail_load_requests_every_image() {
        let mut state = AppState::default();
        let _ = reducer(&mut state, Action::DetailOpen(1));
        let generation = state.detail.generation;
        let record = detail_record(Some(vec![Evolution {
            id: 2,
            name: "Herbizarre".into(),
            image: Some("evo.png".into()),
        }]));
        let result = reducer(&mut state, Action::DetailDidLoad { generation, record });
        assert_eq!(
            result.effects,
            vec![
                Effect::LoadSprite {
                    url: "main.png".into()
                },
                Effect::LoadSprite {
                    url: "evo.png".into()
                },
            ]
        );
        assert_eq!(state.detail.image_slot(Some("evo.png")), ImageSlot::Loading);

        let _ = reducer(
            &mut state,
            Action::SpriteDidError {
                url: "evo.png".into(),
                error: "404".into(),
            },
        );
        assert_eq!(state.detail.image_slot(Some("evo.png")), ImageSlot::Fallback);
    }

    #[test]
    fn stale_detail_response_is_dropped() {
        let mut state = AppState::default();
        let _ = reducer(&mut state, Action::DetailOpen(1));
        let stale = state.detail.generation;
        let _ = reducer(&mut state, Action::DetailOpen(2));
        let result = reducer(
            &mut state,
            Action::DetailDidLoad {
                generation: stale,
                record: detail_record(None),
            },
        );
        assert!(!result.changed);
        assert!(state.detail.record.is_loading());
        assert_eq!(state.detail.id, Some(2));
    }

    #[test]
    fn detail_error_is_recorded() {
        let mut state = AppState::default();
        let _ = reducer(&mut state, Action::DetailOpen(1));
        let generation = state.detail.generation;
        let _ = reducer(
            &mut state,
            Action::DetailDidError {
                generation,
                error: "boom".into(),
            },
        );
        assert!(state.detail.record.is_failed());
        assert_eq!(state.message.as_deref(), Some("Detail error: boom"));
    }

    #[test]
    fn evolution_open_switches_identifier() {
        let mut state = AppState::default();
        let _ = reducer(&mut state, Action::DetailOpen(1));
        let generation = state.detail.generation;
        let evolutions = vec![
            Evolution {
                id: 2,
                name: "Herbizarre".into(),
                image: None,
            },
            Evolution {
                id: 3,
                name: "Florizarre".into(),
                image: None,
            },
        ];
        let _ = reducer(
            &mut state,
            Action::DetailDidLoad {
                generation,
                record: detail_record(Some(evolutions)),
            },
        );
        let _ = reducer(&mut state, Action::EvolutionSelect(5));
        assert_eq!(state.detail.evolution_selected, 1);
        let result = reducer(&mut state, Action::EvolutionOpen);
        assert!(matches!(result.effects[0], Effect::LoadDetail { id: 3, .. }));
        assert_eq!(state.detail.evolution_selected, 0);
        assert!(state.detail.record.is_loading());
    }

    #[test]
    fn late_sprite_for_previous_detail_is_ignored() {
        let mut state = AppState::default();
        let _ = reducer(&mut state, Action::DetailOpen(1));
        let result = reducer(
            &mut state,
            Action::SpriteDidError {
                url: "old.png".into(),
                error: "gone".into(),
            },
        );
        assert!(!result.changed);
    }
}
