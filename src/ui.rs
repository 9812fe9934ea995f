use crate::app::{update, AppMsg, Effect};
use crate::config::{env_flag, load_config, AppConfig};
use crate::logging::LogBuffer;
use crate::model::{Resource, SelectedItem};
use crate::nav::flatten::{flatten_nodes, position_of, FlatNode};
use crate::nav::keys::entry_key;
use crate::nav::tree::{ChildNode, FetchStatus, NavTree};
use crate::services::catalog::{spawn_load_catalog, CatalogSnapshot};
use crate::services::http::HttpClient;
use crate::services::loader::spawn_load_resources;
use crate::services::WrapSource;
use crate::widgets::content::draw_content;
use crate::widgets::header::draw_header;
use crate::widgets::menu::{compute_scroll_window, draw_menu};
use crate::widgets::status_bar::draw_footer;
use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

// Results posted back by worker threads.
pub enum LoadMsg {
    Catalog(CatalogSnapshot),
    Resources {
        wrap: String,
        outcome: Result<Vec<Resource>, String>,
    },
}

#[derive(Default)]
pub struct AppState {
    pub(crate) config: AppConfig,
    pub(crate) catalog: CatalogSnapshot,
    pub(crate) catalog_requested: bool,
    pub(crate) catalog_loaded: bool,
    pub(crate) tree: NavTree,
    // Last selection event, shown in the content pane
    pub(crate) selection: Option<SelectedItem>,
    // Cursor row in the flattened menu
    pub(crate) selected: usize,
    pub(crate) menu_offset: usize,
    pub(crate) menu_viewport_h: u16,
    pub(crate) tick: u64,
    pub(crate) theme: crate::theme::Theme,
    pub(crate) logs: LogBuffer,
    source: Option<Arc<dyn WrapSource>>,
    tx: Option<Sender<LoadMsg>>,
    rx: Option<Receiver<LoadMsg>>,
}

impl AppState {
    pub(crate) fn new(config: AppConfig, source: Arc<dyn WrapSource>, logs: LogBuffer) -> Self {
        let (tx, rx) = mpsc::channel::<LoadMsg>();
        Self {
            config,
            logs,
            source: Some(source),
            tx: Some(tx),
            rx: Some(rx),
            ..Default::default()
        }
    }

    pub(crate) fn rows(&self) -> Vec<FlatNode> {
        flatten_nodes(&self.tree.render_tree(&self.catalog.entries))
    }
}

pub fn run() -> Result<()> {
    let cfg = load_config()?;
    let logs = LogBuffer::new();
    let _log_guard = crate::logging::init(&cfg.logging, logs.clone())?;
    let client = HttpClient::new(&cfg.base_url)
        .with_context(|| format!("configuring backend {}", cfg.base_url))?;
    tracing::info!(base_url = %cfg.base_url, "starting wrapnav");
    let mut state = AppState::new(cfg, Arc::new(client), logs);

    if env_flag("WRAPNAV_HEADLESS") {
        return run_headless(&mut state);
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let res = event_loop(&mut terminal, &mut state);
    // Restore
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

fn event_loop<B: Backend>(terminal: &mut Terminal<B>, state: &mut AppState) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();
    loop {
        start_catalog_load(state);
        terminal.draw(|f| ui(f, state))?;
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_key(state, key.code) {
                    return Ok(());
                }
            }
        }
        pump_loads(state);
        if last_tick.elapsed() >= tick_rate {
            state.tick = state.tick.wrapping_add(1);
            last_tick = Instant::now();
        }
    }
}

fn run_headless(state: &mut AppState) -> Result<()> {
    let ticks: u64 = std::env::var("WRAPNAV_TICKS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(10);
    let expand_name = std::env::var("WRAPNAV_HEADLESS_EXPAND").ok();
    let backend = ratatui::backend::TestBackend::new(100, 30);
    let mut terminal = Terminal::new(backend)?;
    let mut expand_done = false;
    for _ in 0..ticks {
        start_catalog_load(state);
        if !expand_done && state.catalog_loaded {
            if let Some(name) = &expand_name {
                let effects = update(state, AppMsg::ToggleEntry(name.clone()));
                run_effects(state, effects);
            }
            expand_done = true;
        }
        terminal.draw(|f| ui(f, state))?;
        pump_loads(state);
        state.tick = state.tick.wrapping_add(1);
        std::thread::sleep(Duration::from_millis(200));
    }
    if env_flag("WRAPNAV_SMOKE_SUMMARY") {
        println!("{}", headless_summary(state));
    }
    Ok(())
}

pub(crate) fn headless_summary(state: &AppState) -> serde_json::Value {
    let entries: serde_json::Map<String, serde_json::Value> = state
        .catalog
        .entries
        .iter()
        .map(|e| {
            let status = match state.tree.status(&e.name) {
                FetchStatus::Idle => "idle",
                FetchStatus::Loading => "loading",
                FetchStatus::Loaded => "loaded",
                FetchStatus::Error => "error",
            };
            (e.name.clone(), serde_json::Value::from(status))
        })
        .collect();
    serde_json::json!({
        "catalog_loaded": state.catalog_loaded,
        "catalog_error": state.catalog.error,
        "wraps": state.catalog.entries.len(),
        "status": entries,
    })
}

// The catalog is requested once per run.
fn start_catalog_load(state: &mut AppState) {
    if state.catalog_requested {
        return;
    }
    state.catalog_requested = true;
    if let (Some(source), Some(tx)) = (&state.source, &state.tx) {
        spawn_load_catalog(source.clone(), tx.clone());
    }
}

fn run_effects(state: &mut AppState, effects: Vec<Effect>) {
    for eff in effects {
        match eff {
            Effect::LoadResources { wrap } => match (&state.source, &state.tx) {
                (Some(source), Some(tx)) => {
                    tracing::debug!(wrap = %wrap, "load resources");
                    spawn_load_resources(source.clone(), wrap, tx.clone());
                }
                _ => tracing::warn!(wrap = %wrap, "no backend; fetch not dispatched"),
            },
            Effect::Selected(item) => {
                tracing::info!(
                    wrap = %item.wrap,
                    resource = item.resource.as_deref().unwrap_or("-"),
                    "selected"
                );
                state.selection = Some(item);
            }
        }
    }
}

/// Applies every finished load. The cursor stays on the same row (by key)
/// when rows above it appear or disappear.
pub(crate) fn pump_loads(state: &mut AppState) {
    let mut drained: Vec<LoadMsg> = Vec::new();
    if let Some(rx) = &state.rx {
        while let Ok(msg) = rx.try_recv() {
            drained.push(msg);
        }
    }
    if drained.is_empty() {
        return;
    }
    let cursor_key = state.rows().get(state.selected).map(|r| r.key().to_string());
    for msg in drained {
        let effects = match msg {
            LoadMsg::Catalog(snapshot) => update(state, AppMsg::CatalogLoaded(snapshot)),
            LoadMsg::Resources { wrap, outcome } => {
                update(state, AppMsg::ResourcesLoaded { wrap, outcome })
            }
        };
        run_effects(state, effects);
    }
    let rows = state.rows();
    state.selected = cursor_key
        .and_then(|k| position_of(&rows, &k))
        .unwrap_or(state.selected)
        .min(rows.len().saturating_sub(1));
    keep_cursor_visible(state, rows.len());
}

fn keep_cursor_visible(state: &mut AppState, total: usize) {
    let ih = state.menu_viewport_h as usize;
    if ih == 0 {
        return;
    }
    if state.selected < state.menu_offset {
        state.menu_offset = state.selected;
    } else if state.selected >= state.menu_offset + ih {
        let (start, _) = compute_scroll_window(total, state.selected, state.menu_viewport_h);
        state.menu_offset = start;
    }
}

/// Returns true when the app should quit.
pub(crate) fn handle_key(state: &mut AppState, code: KeyCode) -> bool {
    let rows = state.rows();
    let total = rows.len();
    match code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Up => state.selected = state.selected.saturating_sub(1),
        KeyCode::Down => {
            if state.selected + 1 < total {
                state.selected += 1;
            }
        }
        KeyCode::PageUp => {
            let step = (state.menu_viewport_h as usize).max(1);
            state.selected = state.selected.saturating_sub(step);
        }
        KeyCode::PageDown => {
            let step = (state.menu_viewport_h as usize).max(1);
            state.selected = (state.selected + step).min(total.saturating_sub(1));
        }
        KeyCode::Home => state.selected = 0,
        KeyCode::End => state.selected = total.saturating_sub(1),
        KeyCode::Enter | KeyCode::Char(' ') => {
            if let Some(row) = rows.get(state.selected) {
                if let Some(msg) = activation_msg(row) {
                    let effects = update(state, msg);
                    run_effects(state, effects);
                }
            }
        }
        KeyCode::Right => {
            if let Some(FlatNode::Branch {
                wrap,
                expanded: false,
                ..
            }) = rows.get(state.selected)
            {
                let effects = update(state, AppMsg::ToggleEntry(wrap.clone()));
                run_effects(state, effects);
            }
        }
        KeyCode::Left => match rows.get(state.selected) {
            Some(FlatNode::Branch {
                wrap,
                expanded: true,
                ..
            }) => {
                let effects = update(state, AppMsg::ToggleEntry(wrap.clone()));
                run_effects(state, effects);
            }
            Some(row @ FlatNode::Child { .. }) => {
                if let Some(parent) = position_of(&rows, &entry_key(row.wrap())) {
                    state.selected = parent;
                }
            }
            _ => {}
        },
        _ => {}
    }
    keep_cursor_visible(state, state.rows().len());
    false
}

// What Enter does on a row; placeholders are inert.
pub(crate) fn activation_msg(row: &FlatNode) -> Option<AppMsg> {
    match row {
        FlatNode::Leaf { wrap, .. } => Some(AppMsg::Select {
            wrap: wrap.clone(),
            resource: None,
        }),
        FlatNode::Branch { wrap, .. } => Some(AppMsg::ToggleEntry(wrap.clone())),
        FlatNode::Child {
            wrap,
            child: ChildNode::Resource(r),
            ..
        } => Some(AppMsg::Select {
            wrap: wrap.clone(),
            resource: Some(r.name.clone()),
        }),
        FlatNode::Child { .. } => None,
    }
}

fn ui(f: &mut Frame, state: &mut AppState) {
    let screen = f.area();
    let bg = Block::default().style(Style::default().bg(state.theme.bg));
    f.render_widget(bg, screen);

    const DEBUG_H: u16 = 6;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(DEBUG_H),
            Constraint::Length(1),
        ])
        .split(screen);

    draw_header(f, chunks[0], state);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[1]);
    state.menu_viewport_h = body[0].height.saturating_sub(2);
    draw_menu(f, body[0], state);
    draw_content(f, body[1], state);

    draw_debug(f, chunks[2], state);
    draw_footer(
        f,
        chunks[3],
        state,
        "↑/↓ move  Enter select/toggle  ←/→ collapse/expand  q quit",
    );
}

fn draw_debug(f: &mut Frame, area: Rect, state: &AppState) {
    let b = Block::default()
        .borders(Borders::TOP)
        .border_style(state.theme.text_muted())
        .title(Span::styled(
            "Log",
            state.theme.text_muted().add_modifier(Modifier::BOLD),
        ));
    let h = area.height.saturating_sub(1) as usize;
    let lines: Vec<Line> = state
        .logs
        .tail(h)
        .into_iter()
        .map(|l| {
            let style = if l.level == tracing::Level::ERROR {
                state.theme.text_error()
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(vec![
                Span::styled(format!("{:<5} ", l.level.as_str()), style),
                Span::raw(l.message),
            ])
        })
        .collect();
    let p = Paragraph::new(lines).block(b).wrap(Wrap { trim: true });
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CatalogEntry, MenuMode};
    use crate::services::http::FetchError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    // Backend whose resource calls block until the test releases them.
    struct GatedSource {
        catalog: Vec<CatalogEntry>,
        calls: AtomicUsize,
        gate: Mutex<Receiver<Result<Vec<Resource>, String>>>,
    }

    impl WrapSource for GatedSource {
        fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, FetchError> {
            Ok(self.catalog.clone())
        }
        fn fetch_resources(&self, _wrap: &str) -> Result<Vec<Resource>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self
                .gate
                .lock()
                .unwrap()
                .recv()
                .unwrap_or_else(|_| Err("gate closed".into()));
            next.map_err(|message| FetchError::Status {
                status: 500,
                message,
            })
        }
    }

    fn gated(
        catalog: Vec<CatalogEntry>,
    ) -> (
        Arc<GatedSource>,
        Sender<Result<Vec<Resource>, String>>,
        AppState,
    ) {
        let (gate_tx, gate_rx) = mpsc::channel();
        let src = Arc::new(GatedSource {
            catalog,
            calls: AtomicUsize::new(0),
            gate: Mutex::new(gate_rx),
        });
        let st = AppState::new(AppConfig::default(), src.clone(), LogBuffer::new());
        (src, gate_tx, st)
    }

    fn pump_until(st: &mut AppState, done: impl Fn(&AppState) -> bool) {
        for _ in 0..500 {
            pump_loads(st);
            if done(st) {
                return;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        panic!("condition not reached");
    }

    fn catalog() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::new("pods", "Pods", MenuMode::Grid),
            CatalogEntry::new("db", "Database", MenuMode::SubMenu),
        ]
    }

    fn resource(name: &str) -> Resource {
        Resource {
            name: name.into(),
            namespace: None,
        }
    }

    #[test]
    fn collapse_during_fetch_then_result_lands() {
        let (src, gate, mut st) = gated(catalog());
        start_catalog_load(&mut st);
        pump_until(&mut st, |s| s.catalog_loaded);

        // cursor on "db", expand, collapse, expand again while loading
        st.selected = 1;
        assert!(!handle_key(&mut st, KeyCode::Enter));
        assert!(!handle_key(&mut st, KeyCode::Enter));
        assert!(!handle_key(&mut st, KeyCode::Enter));
        assert!(!handle_key(&mut st, KeyCode::Left));
        assert!(!st.tree.is_expanded("db"));
        assert_eq!(st.tree.status("db"), FetchStatus::Loading);

        gate.send(Ok(vec![resource("pods-1")])).unwrap();
        pump_until(&mut st, |s| s.tree.status("db") == FetchStatus::Loaded);
        assert!(!st.tree.is_expanded("db"));
        assert_eq!(src.calls.load(Ordering::SeqCst), 1);

        // re-expand: data shown, no new fetch
        assert!(!handle_key(&mut st, KeyCode::Right));
        let rows = st.rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].key(), "wrap:db/pods-1");
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(src.calls.load(Ordering::SeqCst), 1);

        // select the resource
        assert!(!handle_key(&mut st, KeyCode::Down));
        assert!(!handle_key(&mut st, KeyCode::Enter));
        assert_eq!(
            st.selection,
            Some(SelectedItem {
                wrap: "db".into(),
                resource: Some("pods-1".into()),
            })
        );
    }

    #[test]
    fn error_fetch_is_not_retried() {
        let (src, gate, mut st) = gated(catalog());
        start_catalog_load(&mut st);
        pump_until(&mut st, |s| s.catalog_loaded);
        st.selected = 1;
        handle_key(&mut st, KeyCode::Enter);
        gate.send(Err("boom".into())).unwrap();
        pump_until(&mut st, |s| s.tree.status("db") == FetchStatus::Error);
        let rows = st.rows();
        assert!(matches!(
            &rows[2],
            FlatNode::Child { child: ChildNode::Failed(m), .. } if m == "boom"
        ));
        // placeholder is inert
        assert!(activation_msg(&rows[2]).is_none());
        for _ in 0..4 {
            handle_key(&mut st, KeyCode::Up);
            handle_key(&mut st, KeyCode::Enter);
            handle_key(&mut st, KeyCode::Down);
        }
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(src.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn grid_row_selects_directly() {
        let (src, _gate, mut st) = gated(catalog());
        start_catalog_load(&mut st);
        pump_until(&mut st, |s| s.catalog_loaded);
        st.selected = 0;
        handle_key(&mut st, KeyCode::Enter);
        assert_eq!(
            st.selection,
            Some(SelectedItem {
                wrap: "pods".into(),
                resource: None,
            })
        );
        assert_eq!(src.calls.load(Ordering::SeqCst), 0);
        assert!(st.tree.fetch_state("pods").is_none());
    }

    #[test]
    fn cursor_follows_row_when_rows_above_grow() {
        let entries = vec![
            CatalogEntry::new("db", "Database", MenuMode::SubMenu),
            CatalogEntry::new("pods", "Pods", MenuMode::Grid),
        ];
        let (_src, gate, mut st) = gated(entries);
        start_catalog_load(&mut st);
        pump_until(&mut st, |s| s.catalog_loaded);
        handle_key(&mut st, KeyCode::Enter); // expand db -> Loading row
        handle_key(&mut st, KeyCode::End); // cursor on "pods"
        assert_eq!(st.rows()[st.selected].key(), "wrap:pods");
        gate.send(Ok(vec![resource("a"), resource("b"), resource("c")]))
            .unwrap();
        pump_until(&mut st, |s| s.tree.status("db") == FetchStatus::Loaded);
        assert_eq!(st.rows()[st.selected].key(), "wrap:pods");
        assert_eq!(st.selected, 4);
    }

    #[test]
    fn quit_keys() {
        let mut st = AppState::default();
        assert!(handle_key(&mut st, KeyCode::Char('q')));
        assert!(handle_key(&mut st, KeyCode::Esc));
        assert!(!handle_key(&mut st, KeyCode::Down));
    }

    #[test]
    fn summary_reports_per_entry_status() {
        let (_src, _gate, mut st) = gated(catalog());
        start_catalog_load(&mut st);
        pump_until(&mut st, |s| s.catalog_loaded);
        let s = headless_summary(&st);
        assert_eq!(s["wraps"], 2);
        assert_eq!(s["status"]["db"], "idle");
        assert_eq!(s["catalog_error"], serde_json::Value::Null);
    }

    #[test]
    fn full_frame_renders_without_panicking() {
        let (_src, _gate, mut st) = gated(catalog());
        start_catalog_load(&mut st);
        pump_until(&mut st, |s| s.catalog_loaded);
        let backend = ratatui::backend::TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| ui(f, &mut st)).unwrap();
        assert!(st.menu_viewport_h > 0);
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("▸ Database"));
        assert!(text.contains("Select an item from the menu"));
    }
}
