//! dexview - Pokedex catalog viewer

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use dexview::action::Action;
use dexview::api;
use dexview::components::{
    CardGrid, CardGridProps, Component, DetailView, DetailViewProps, FilterBar, FilterBarProps,
    StatusFooter, StatusFooterProps, BG_BASE,
};
use dexview::config::Config;
use dexview::effect::Effect;
use dexview::logger;
use dexview::query::FetchMode;
use dexview::reducer::reducer;
use dexview::state::{AppState, Screen, SPINNER_TICK_MS};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    style::Style,
    widgets::Block,
    Frame, Terminal,
};
use tui_dispatch::{
    EffectContext, EffectStoreLike, EffectStoreWithMiddleware, EventBus, EventContext, EventKind,
    EventRoutingState, HandlerResponse, Keybindings, RenderContext, TaskKey,
};
use tui_dispatch_debug::debug::DebugLayer;
use tui_dispatch_debug::{
    DebugCliArgs, DebugRunOutput, DebugSession, DebugSessionError, ReplayItem,
};

/// Quiet period before a name-filter edit turns into a request.
const NAME_DEBOUNCE_MS: u64 = 250;
const FOOTER_ROWS: u16 = 3;
const FILTER_ROWS: u16 = 3;

/// Browse the Pokedex API from the terminal
#[derive(Parser, Debug)]
#[command(name = "dexview")]
#[command(about = "Pokedex catalog viewer with filters, infinite scroll and detail pages")]
struct Args {
    #[command(flatten)]
    config: Config,

    #[command(flatten)]
    debug: DebugCliArgs,
}

#[derive(tui_dispatch::ComponentId, Clone, Copy, PartialEq, Eq, Hash, Debug)]
enum DexComponentId {
    Filter,
    Grid,
    Detail,
}

#[derive(tui_dispatch::BindingContext, Clone, Copy, PartialEq, Eq, Hash)]
enum DexContext {
    List,
    NameInput,
    Detail,
}

impl EventRoutingState<DexComponentId, DexContext> for AppState {
    fn focused(&self) -> Option<DexComponentId> {
        match self.screen {
            Screen::List if self.list.name_editing => Some(DexComponentId::Filter),
            Screen::List => Some(DexComponentId::Grid),
            Screen::Detail => Some(DexComponentId::Detail),
        }
    }

    fn modal(&self) -> Option<DexComponentId> {
        if self.screen == Screen::List && self.list.name_editing {
            Some(DexComponentId::Filter)
        } else {
            None
        }
    }

    fn binding_context(&self, id: DexComponentId) -> DexContext {
        match id {
            DexComponentId::Filter => DexContext::NameInput,
            DexComponentId::Grid => DexContext::List,
            DexComponentId::Detail => DexContext::Detail,
        }
    }

    fn default_context(&self) -> DexContext {
        DexContext::List
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let Args {
        config,
        debug: debug_args,
    } = Args::parse();

    if let Some(path) = config.log_file.as_deref() {
        logger::init(path, config.log_level)
            .map_err(|err| io::Error::other(format!("logger setup failed: {err}")))?;
    }
    api::configure(&config.api_base);
    log::info!(
        "starting dexview: api {} limit {} id {:?}",
        api::api_base(),
        config.limit,
        config.id
    );

    let debug = DebugSession::new(debug_args);

    let terminal_size = crossterm::terminal::size().unwrap_or((80, 24));
    let query = config.initial_query();
    let start_id = config.id;
    let state = debug
        .load_state_or_else_async(move || async move {
            Ok::<AppState, io::Error>(AppState {
                terminal_size,
                ..AppState::new(query, start_id)
            })
        })
        .await
        .map_err(debug_error)?;

    let replay_actions = debug.load_replay_items().map_err(debug_error)?;

    let (middleware, action_recorder) = debug.middleware_with_recorder();
    let store = EffectStoreWithMiddleware::new(state, reducer, middleware);

    // ===== Terminal setup =====
    let use_alt_screen = debug.use_alt_screen();
    let mut stdout = io::stdout();
    if use_alt_screen {
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &debug, store, replay_actions).await;

    // ===== Cleanup =====
    if use_alt_screen {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
    }

    let run_output = result?;
    run_output.write_render_output()?;
    debug
        .save_actions(action_recorder.as_ref())
        .map_err(debug_error)?;

    log::info!("dexview exited");
    Ok(())
}

struct DexUi {
    filter: FilterBar,
    grid: CardGrid,
    detail: DetailView,
    footer: StatusFooter,
}

impl DexUi {
    fn new() -> Self {
        Self {
            filter: FilterBar::new(),
            grid: CardGrid::new(),
            detail: DetailView::new(),
            footer: StatusFooter::new(),
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        render_ctx: RenderContext,
        event_ctx: &mut EventContext<DexComponentId>,
    ) {
        frame.render_widget(Block::default().style(Style::default().bg(BG_BASE)), area);

        match state.screen {
            Screen::List => {
                let chunks = Layout::vertical([
                    Constraint::Length(FILTER_ROWS),
                    Constraint::Min(1),
                    Constraint::Length(FOOTER_ROWS),
                ])
                .split(area);

                event_ctx.set_component_area(DexComponentId::Filter, chunks[0]);
                event_ctx.set_component_area(DexComponentId::Grid, chunks[1]);
                event_ctx.component_areas.remove(&DexComponentId::Detail);

                let type_label = state.list.type_label();
                self.filter.render(
                    frame,
                    chunks[0],
                    FilterBarProps {
                        name: &state.list.query.name,
                        type_label: &type_label,
                        limit: state.list.query.limit,
                        editing: state.list.name_editing,
                    },
                );
                self.grid.render(
                    frame,
                    chunks[1],
                    grid_props(state, render_ctx.is_focused() && !state.list.name_editing),
                );
                self.footer
                    .render(frame, chunks[2], StatusFooterProps { state });
            }
            Screen::Detail => {
                let chunks = Layout::vertical([
                    Constraint::Min(1),
                    Constraint::Length(FOOTER_ROWS),
                ])
                .split(area);

                event_ctx.set_component_area(DexComponentId::Detail, chunks[0]);
                event_ctx.component_areas.remove(&DexComponentId::Filter);
                event_ctx.component_areas.remove(&DexComponentId::Grid);

                self.detail.render(
                    frame,
                    chunks[0],
                    DetailViewProps {
                        detail: &state.detail,
                        tick: state.tick,
                        is_focused: render_ctx.is_focused(),
                    },
                );
                self.footer
                    .render(frame, chunks[1], StatusFooterProps { state });
            }
        }
    }

    fn handle_filter_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let type_label = state.list.type_label();
        let props = FilterBarProps {
            name: &state.list.query.name,
            type_label: &type_label,
            limit: state.list.query.limit,
            editing: state.list.name_editing,
        };
        let actions: Vec<_> = self.filter.handle_event(event, props).into_iter().collect();
        // Modal while editing: every key stays in the input.
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }

    fn handle_grid_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let actions: Vec<_> = self
            .grid
            .handle_event(event, grid_props(state, true))
            .into_iter()
            .collect();
        handler_response(actions)
    }

    fn handle_detail_event(
        &mut self,
        event: &EventKind,
        state: &AppState,
    ) -> HandlerResponse<Action> {
        let props = DetailViewProps {
            detail: &state.detail,
            tick: state.tick,
            is_focused: true,
        };
        let actions: Vec<_> = self.detail.handle_event(event, props).into_iter().collect();
        handler_response(actions)
    }
}

fn grid_props(state: &AppState, is_focused: bool) -> CardGridProps<'_> {
    CardGridProps {
        records: &state.list.records,
        selected: state.list.selected,
        page: state.list.query.page,
        busy: state.list.busy,
        exhausted: state.list.exhausted,
        tick: state.tick,
        is_focused,
    }
}

fn handler_response(actions: Vec<Action>) -> HandlerResponse<Action> {
    if actions.is_empty() {
        HandlerResponse::ignored()
    } else {
        HandlerResponse {
            actions,
            consumed: true,
            needs_render: false,
        }
    }
}

fn debug_error(error: DebugSessionError) -> io::Error {
    io::Error::other(format!("debug session error: {error}"))
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    debug: &DebugSession,
    store: impl EffectStoreLike<AppState, Action, Effect>,
    replay_actions: Vec<ReplayItem<Action>>,
) -> io::Result<DebugRunOutput<AppState>> {
    let ui = Rc::new(RefCell::new(DexUi::new()));
    let mut bus: EventBus<AppState, Action, DexComponentId, DexContext> = EventBus::new();
    let keybindings: Keybindings<DexContext> = Keybindings::new();

    let ui_filter = Rc::clone(&ui);
    bus.register(DexComponentId::Filter, move |event, state| {
        ui_filter
            .borrow_mut()
            .handle_filter_event(&event.kind, state)
    });

    let ui_grid = Rc::clone(&ui);
    bus.register(DexComponentId::Grid, move |event, state| {
        ui_grid.borrow_mut().handle_grid_event(&event.kind, state)
    });

    let ui_detail = Rc::clone(&ui);
    bus.register(DexComponentId::Detail, move |event, state| {
        ui_detail
            .borrow_mut()
            .handle_detail_event(&event.kind, state)
    });

    bus.register_global(|event, _state| match event.kind {
        EventKind::Resize(width, height) => {
            HandlerResponse::action(Action::UiTerminalResize(width, height)).with_render()
        }
        _ => HandlerResponse::ignored(),
    });

    debug
        .run_effect_app_with_bus(
            terminal,
            store,
            DebugLayer::simple(),
            replay_actions,
            Some(Action::Init),
            Some(Action::Quit),
            |runtime| {
                if debug.render_once() {
                    return;
                }

                runtime.subscriptions().interval(
                    "tick",
                    Duration::from_millis(SPINNER_TICK_MS),
                    || Action::Tick,
                );
            },
            &mut bus,
            &keybindings,
            |frame, area, state, render_ctx, event_ctx| {
                ui.borrow_mut()
                    .render(frame, area, state, render_ctx, event_ctx);
            },
            |action| matches!(action, Action::Quit),
            handle_effect,
        )
        .await
}

/// Handle effects by spawning tasks. Reusing a task key replaces the
/// previous task, so a superseded page or detail request is dropped early.
fn handle_effect(effect: Effect, ctx: &mut EffectContext<Action>) {
    match effect {
        Effect::LoadTypes => {
            ctx.tasks().spawn(TaskKey::new("types"), async {
                match api::fetch_types().await {
                    Ok(types) => Action::TypesDidLoad(types),
                    Err(err) => {
                        log::warn!("type list fetch failed: {err}");
                        Action::TypesDidError(err.to_string())
                    }
                }
            });
        }
        Effect::LoadPage {
            query,
            generation,
            mode,
            debounce,
        } => {
            let task = async move {
                match api::fetch_page(&query).await {
                    Ok(records) => Action::ListDidLoad {
                        generation,
                        mode,
                        records,
                    },
                    Err(err) => {
                        log::warn!("page {} fetch failed: {err}", query.page);
                        Action::ListDidError {
                            generation,
                            mode,
                            error: err.to_string(),
                        }
                    }
                }
            };
            if debounce && mode == FetchMode::Reset {
                ctx.tasks().debounce(
                    TaskKey::new("list_page"),
                    Duration::from_millis(NAME_DEBOUNCE_MS),
                    task,
                );
            } else {
                ctx.tasks().spawn(TaskKey::new("list_page"), task);
            }
        }
        Effect::LoadDetail { id, generation } => {
            ctx.tasks().spawn(TaskKey::new("detail"), async move {
                match api::fetch_detail(id).await {
                    Ok(record) => Action::DetailDidLoad { generation, record },
                    Err(err) => {
                        log::warn!("detail #{id} fetch failed: {err}");
                        Action::DetailDidError {
                            generation,
                            error: err.to_string(),
                        }
                    }
                }
            });
        }
        Effect::LoadSprite { url } => {
            let key = format!("sprite_{url}");
            ctx.tasks().spawn(TaskKey::new(key), async move {
                match api::fetch_sprite(&url).await {
                    Ok(sprite) => Action::SpriteDidLoad { url, sprite },
                    Err(err) => Action::SpriteDidError {
                        url,
                        error: err.to_string(),
                    },
                }
            });
        }
    }
}
