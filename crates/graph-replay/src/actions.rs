use crate::effects::Effect;
use crate::layout_settings::{EDGE_LENGTH_RANGE, FORCE_RANGE};
use crate::replay::ReplayError;
use crate::state::{Drag, EditMode, Session};
use crate::store::Toggle;
use eframe::egui::{Pos2, Vec2};
use std::path::PathBuf;

/// Actions that can be dispatched to modify the viewer session
#[derive(Debug, Clone)]
pub enum Action {
    // Replay
    /// Apply the next action group, reading it from the log if needed
    StepForward,
    /// Undo the last applied action group
    StepBackward,
    /// Undo everything
    SeekStart,
    /// Re-apply every group read so far
    SeekEnd,

    // Structural editing (not recorded, not undoable)
    AddNode { pos: Pos2 },
    DeleteNode { index: usize },
    ToggleEdge { a: usize, b: usize },
    /// Close label gaps left by deleted nodes
    Renumber,

    // Pointer
    /// Grab a node; `pointer` is where the press happened
    BeginDrag { index: usize, pointer: Pos2 },
    DragTo { pointer: Pos2 },
    EndDrag,
    /// Start drawing an edge from a node in edit mode
    BeginConnect { from: usize, pointer: Pos2 },
    /// Release while drawing an edge; toggles it when released on a node
    EndConnect { target: Option<usize> },

    // UI state
    SetEditMode { mode: EditMode },
    SetShowLabels { show: bool },
    SetForce { force: f32 },
    SetEdgeLength { length: f32 },
    ResizeViewport { size: Vec2 },

    // File operations
    OpenLog { path: PathBuf },
    OpenGraph { path: PathBuf },
    SaveGraph { path: PathBuf },
    /// Clear any error message
    ClearErrorMessage,
}

fn replay_failed(session: &mut Session, what: &str, e: ReplayError) {
    session.report(format!("{} failed: {}", what, e));
}

/// Apply a single action to the session
pub fn update(session: &mut Session, action: Action) -> Vec<Effect> {
    match action {
        // Replay
        Action::StepForward => {
            if let Err(e) = session.replay.step_forward(&mut session.store) {
                replay_failed(session, "step forward", e);
            }
            vec![]
        }
        Action::StepBackward => {
            if let Err(e) = session.replay.step_backward(&mut session.store)
            {
                replay_failed(session, "step backward", e);
            }
            vec![]
        }
        Action::SeekStart => {
            if let Err(e) = session.replay.seek(&mut session.store, 0) {
                replay_failed(session, "seek", e);
            }
            vec![]
        }
        Action::SeekEnd => {
            let end = session.replay.loaded();
            if let Err(e) = session.replay.seek(&mut session.store, end) {
                replay_failed(session, "seek", e);
            }
            vec![]
        }

        // Structural editing
        Action::AddNode { pos } => {
            let index = session.store.add_node(pos);
            log::debug!("added node {}", index + 1);
            vec![]
        }
        Action::DeleteNode { index } => {
            match session.store.delete_node(index) {
                Ok(node) => {
                    log::debug!("deleted node labelled {}", node.label);
                    session.reset_pointer();
                }
                Err(e) => session.report(format!("delete failed: {}", e)),
            }
            vec![]
        }
        Action::ToggleEdge { a, b } => {
            match session.store.toggle_edge(a, b) {
                Ok(Toggle::Added(id)) => log::debug!("added edge {}", id + 1),
                Ok(Toggle::Removed(id)) => {
                    log::debug!("removed edge {}", id + 1)
                }
                Ok(Toggle::Ignored) => {}
                Err(e) => session.report(format!("toggle failed: {}", e)),
            }
            vec![]
        }
        Action::Renumber => {
            session.store.renumber();
            vec![]
        }

        // Pointer
        Action::BeginDrag { index, pointer } => {
            match session.store.node(index) {
                Ok(node) => {
                    session.drag = Some(Drag {
                        index,
                        grab: node.pos - pointer,
                        target: node.pos,
                    });
                }
                Err(e) => log::warn!("cannot drag: {}", e),
            }
            vec![]
        }
        Action::DragTo { pointer } => {
            if let Some(drag) = session.drag.as_mut() {
                drag.target = pointer + drag.grab;
                let (index, target) = (drag.index, drag.target);
                if let Err(e) = session.store.set_position(index, target) {
                    log::warn!("dropping stale drag: {}", e);
                    session.drag = None;
                }
            }
            vec![]
        }
        Action::EndDrag => {
            if let Some(drag) = session.drag.take() {
                // released nodes start from rest
                if let Err(e) = session.store.clear_velocity(drag.index) {
                    log::warn!("dropping stale drag: {}", e);
                }
            }
            vec![]
        }
        Action::BeginConnect { from, pointer } => {
            if session.store.node(from).is_ok() {
                session.connecting_from = Some((from, pointer));
            }
            vec![]
        }
        Action::EndConnect { target } => {
            let from = session.connecting_from.take();
            match (from, target) {
                (Some((a, _)), Some(b)) => {
                    update(session, Action::ToggleEdge { a, b })
                }
                _ => vec![],
            }
        }

        // UI state
        Action::SetEditMode { mode } => {
            session.mode = mode;
            session.connecting_from = None;
            vec![]
        }
        Action::SetShowLabels { show } => {
            session.show_labels = show;
            vec![]
        }
        Action::SetForce { force } => {
            session.store.settings_mut().force =
                force.clamp(FORCE_RANGE.min, FORCE_RANGE.max);
            vec![]
        }
        Action::SetEdgeLength { length } => {
            session.store.set_edge_length(
                length.clamp(EDGE_LENGTH_RANGE.min, EDGE_LENGTH_RANGE.max),
            );
            vec![]
        }
        Action::ResizeViewport { size } => {
            if size.x > 0.0 && size.y > 0.0 {
                session.ctx.set_viewport(size);
            }
            vec![]
        }

        // File operations
        Action::OpenLog { path } => {
            vec![Effect::OpenLog { path }]
        }
        Action::OpenGraph { path } => {
            vec![Effect::OpenGraph { path }]
        }
        Action::SaveGraph { path } => {
            vec![Effect::SaveGraph { path }]
        }
        Action::ClearErrorMessage => {
            session.error_message = None;
            vec![]
        }
    }
}
