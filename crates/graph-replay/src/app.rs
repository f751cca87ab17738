use crate::actions::Action;
use crate::graph_view;
use crate::layout_settings::{EDGE_LENGTH_RANGE, FORCE_RANGE};
use crate::state::{EditMode, State};
use eframe::egui::{self, Key, PointerButton, Pos2, Sense};

const LOG_FILTER: (&str, &[&str]) = ("Graph log", &["txt", "log"]);

pub struct ViewerApp {
    state: State,
}

impl ViewerApp {
    pub fn new(state: State) -> Self {
        Self { state }
    }

    fn dispatch(&mut self, action: Action) {
        self.state.dispatch(action);
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open log…").clicked() {
                        ui.close();
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter(LOG_FILTER.0, LOG_FILTER.1)
                            .pick_file()
                        {
                            self.dispatch(Action::OpenLog { path });
                        }
                    }
                    if ui.button("Open graph…").clicked() {
                        ui.close();
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter(LOG_FILTER.0, LOG_FILTER.1)
                            .pick_file()
                        {
                            self.dispatch(Action::OpenGraph { path });
                        }
                    }
                    if ui.button("Save graph…").clicked() {
                        ui.close();
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter(LOG_FILTER.0, LOG_FILTER.1)
                            .save_file()
                        {
                            self.dispatch(Action::SaveGraph { path });
                        }
                    }
                });
                ui.menu_button("View", |ui| {
                    let mut show = self.state.session.show_labels;
                    if ui.checkbox(&mut show, "Show Labels").changed() {
                        self.dispatch(Action::SetShowLabels { show });
                    }
                    let mut editing =
                        self.state.session.mode == EditMode::Edit;
                    if ui.checkbox(&mut editing, "Edit Mode (E)").changed() {
                        let mode = if editing {
                            EditMode::Edit
                        } else {
                            EditMode::View
                        };
                        self.dispatch(Action::SetEditMode { mode });
                    }
                    if ui.button("Renumber (R)").clicked() {
                        ui.close();
                        self.dispatch(Action::Renumber);
                    }
                });
            });
        });
    }

    fn status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let session = &self.state.session;
                let replay = &session.replay;
                let more = if replay.is_exhausted() { "" } else { "+" };
                ui.label(format!(
                    "Step {} / {}{}",
                    replay.cursor(),
                    replay.loaded(),
                    more
                ));
                ui.separator();
                ui.label(match session.mode {
                    EditMode::View => "Mode: View",
                    EditMode::Edit => "Mode: Edit",
                });
                if let Some(path) = &session.log_path {
                    ui.separator();
                    ui.label(path.display().to_string());
                }
                ui.separator();

                let mut force = session.store.settings().force;
                let mut length = session.store.settings().edge_length;
                let force_changed = ui
                    .add(
                        egui::Slider::new(
                            &mut force,
                            FORCE_RANGE.min..=FORCE_RANGE.max,
                        )
                        .step_by(FORCE_RANGE.step as f64)
                        .text("Force"),
                    )
                    .changed();
                let length_changed = ui
                    .add(
                        egui::Slider::new(
                            &mut length,
                            EDGE_LENGTH_RANGE.min..=EDGE_LENGTH_RANGE.max,
                        )
                        .step_by(EDGE_LENGTH_RANGE.step as f64)
                        .text("Edge length"),
                    )
                    .changed();
                if force_changed {
                    self.dispatch(Action::SetForce { force });
                }
                if length_changed {
                    self.dispatch(Action::SetEdgeLength { length });
                }
            });
        });
    }

    fn keyboard(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let keys = ctx.input(|i| {
            [
                Key::ArrowRight,
                Key::ArrowLeft,
                Key::Home,
                Key::End,
                Key::E,
                Key::R,
            ]
            .map(|k| i.key_pressed(k))
        });
        let [right, left, home, end, edit, renumber] = keys;
        if right {
            self.dispatch(Action::StepForward);
        }
        if left {
            self.dispatch(Action::StepBackward);
        }
        if home {
            self.dispatch(Action::SeekStart);
        }
        if end {
            self.dispatch(Action::SeekEnd);
        }
        if edit {
            let mode = match self.state.session.mode {
                EditMode::View => EditMode::Edit,
                EditMode::Edit => EditMode::View,
            };
            self.dispatch(Action::SetEditMode { mode });
        }
        if renumber {
            self.dispatch(Action::Renumber);
        }
    }

    /// Turns pointer input on the canvas into actions. Positions are
    /// converted to graph coordinates first.
    fn canvas_input(
        &self,
        response: &egui::Response,
        origin: Pos2,
        press_origin: Option<Pos2>,
    ) -> Vec<Action> {
        let session = &self.state.session;
        let store = &session.store;
        let to_graph = |p: Pos2| p - origin.to_vec2();
        let pointer = response.interact_pointer_pos().map(to_graph);
        let editing = session.mode == EditMode::Edit;
        let mut actions = Vec::new();

        if response.drag_started_by(PointerButton::Primary)
            && let Some(start) = press_origin.map(to_graph)
            && let Some(index) = graph_view::node_at(store, start)
        {
            actions.push(if editing {
                Action::BeginConnect {
                    from: index,
                    pointer: start,
                }
            } else {
                Action::BeginDrag {
                    index,
                    pointer: start,
                }
            });
        }

        if response.dragged_by(PointerButton::Primary)
            && let Some(pointer) = pointer
        {
            actions.push(Action::DragTo { pointer });
        }

        if response.drag_stopped() {
            let target = pointer.and_then(|p| graph_view::node_at(store, p));
            actions.push(Action::EndDrag);
            actions.push(Action::EndConnect { target });
        }

        if editing {
            if response.double_clicked()
                && let Some(pos) = pointer
                && graph_view::node_at(store, pos).is_none()
            {
                actions.push(Action::AddNode { pos });
            } else if response.secondary_clicked()
                && let Some(pos) = pointer
                && let Some(index) = graph_view::node_at(store, pos)
            {
                actions.push(Action::DeleteNode { index });
            }
        }
        actions
    }

    fn error_window(&mut self, ctx: &egui::Context) {
        if let Some(error) = self.state.session.error_message.clone() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(&error);
                    if ui.button("OK").clicked() {
                        self.dispatch(Action::ClearErrorMessage);
                    }
                });
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.menu_bar(ctx);
        self.status_bar(ctx);
        self.keyboard(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
            let origin = response.rect.min;

            let viewport = graph_view::viewport_for(response.rect.size());
            if viewport != self.state.session.ctx.viewport() {
                self.dispatch(Action::ResizeViewport { size: viewport });
            }

            let press_origin = ui.input(|i| i.pointer.press_origin());
            for action in self.canvas_input(&response, origin, press_origin) {
                self.dispatch(action);
            }

            self.state.flush_actions();
            self.state.flush_effects();

            let dt = ui.input(|i| i.stable_dt);
            self.state.session.tick(dt);

            let hover = response.hover_pos().map(|p| p - origin.to_vec2());
            graph_view::paint(&painter, origin, &self.state.session, hover);
        });

        self.error_window(ctx);
        self.state.flush_actions();
        self.state.flush_effects();

        ctx.request_repaint();
    }
}
