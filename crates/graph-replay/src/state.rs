use crate::actions::{self, Action};
use crate::effects::{self, Effect};
use crate::layout_force;
use crate::layout_settings::LayoutSettings;
use crate::replay::ReplayLog;
use crate::serialization::{GraphFileError, GraphHeader, read_graph_header};
use crate::sim::SimContext;
use crate::store::Store;
use eframe::egui::{Pos2, Vec2};
use std::io::{self, BufRead};
use std::path::PathBuf;

/// Source of action groups; boxed so a file and an in-memory log can be
/// swapped at runtime.
pub type LogSource = Box<dyn BufRead>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Pointer only drags nodes.
    #[default]
    View,
    /// Pointer also adds, deletes and connects nodes.
    Edit,
}

/// A node held under the pointer. `target` is where it is pinned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    pub index: usize,
    pub grab: Vec2,
    pub target: Pos2,
}

/// Graph, replay cursor and viewer state that the reducer works on.
pub struct Session {
    pub store: Store,
    pub ctx: SimContext,
    pub replay: ReplayLog<LogSource>,
    pub mode: EditMode,
    pub show_labels: bool,
    pub drag: Option<Drag>,
    /// Start of an edge being drawn in edit mode.
    pub connecting_from: Option<(usize, Pos2)>,
    pub log_path: Option<PathBuf>,
    pub error_message: Option<String>,
}

impl Session {
    pub fn new(settings: LayoutSettings, ctx: SimContext) -> Self {
        Self {
            store: Store::new(settings),
            ctx,
            replay: ReplayLog::new(empty_source()),
            mode: EditMode::default(),
            show_labels: true,
            drag: None,
            connecting_from: None,
            log_path: None,
            error_message: None,
        }
    }

    /// Advance the layout by `dt` seconds and keep a dragged node under
    /// the pointer.
    pub fn tick(&mut self, dt: f32) {
        let max_dt = self.store.settings().max_frame_dt.max(0.0);
        let dt = dt.clamp(0.0, max_dt);
        layout_force::step(&mut self.store, &self.ctx, dt);
        if let Some(drag) = self.drag {
            if let Err(e) = self.store.set_position(drag.index, drag.target) {
                log::warn!("dropping stale drag: {}", e);
                self.drag = None;
            }
        }
    }

    /// Load the graph header from `source` and replay the rest of it.
    pub fn open_log(
        &mut self,
        mut source: LogSource,
    ) -> Result<(), GraphFileError> {
        let header = read_graph_header(&mut source)?;
        self.open_graph(&header)?;
        self.replay = ReplayLog::new(source);
        Ok(())
    }

    /// Replace the graph with `header`; no actions follow.
    pub fn open_graph(
        &mut self,
        header: &GraphHeader,
    ) -> Result<(), GraphFileError> {
        self.store
            .load(&mut self.ctx, header.node_count, &header.edges)?;
        self.replay = ReplayLog::new(empty_source());
        self.reset_pointer();
        Ok(())
    }

    /// Drop pointer state that refers to node indices, which structural
    /// edits and reloads invalidate.
    pub(crate) fn reset_pointer(&mut self) {
        self.drag = None;
        self.connecting_from = None;
    }

    pub(crate) fn report(&mut self, message: String) {
        log::warn!("{}", message);
        self.error_message = Some(message);
    }
}

pub(crate) fn empty_source() -> LogSource {
    Box::new(io::empty())
}

pub struct State {
    pub session: Session,
    action_queue: Vec<Action>,
    effect_queue: Vec<Effect>,
}

impl State {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            action_queue: Vec::new(),
            effect_queue: Vec::new(),
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        self.action_queue.push(action);
    }

    pub fn flush_actions(&mut self) {
        let actions = std::mem::take(&mut self.action_queue);
        for action in actions {
            let mut effects = actions::update(&mut self.session, action);
            self.effect_queue.append(&mut effects);
        }
    }

    pub fn flush_effects(&mut self) {
        let effects = std::mem::take(&mut self.effect_queue);
        for effect in effects {
            effects::run(&mut self.session, effect);
        }
    }
}
