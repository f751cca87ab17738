use crate::color::Rgba;
use crate::state::Session;
use crate::store::Store;
use eframe::egui::{self, Align2, Color32, FontId, Pos2, Stroke, Vec2};

// UI Constants
const CONNECT_PREVIEW_STROKE_WIDTH: f32 = 2.0;
const CONNECT_PREVIEW_COLOR: Color32 = Color32::from_rgb(100, 100, 255);
const LABEL_COLOR: Color32 = Color32::from_rgb(230, 230, 230);

pub fn to_color32(color: Rgba) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), color.a())
}

fn node_radius(store: &Store, size: f32) -> f32 {
    store.settings().node_radius * size
}

/// Topmost node whose disc contains `pos` (graph coordinates).
pub fn node_at(store: &Store, pos: Pos2) -> Option<usize> {
    store
        .nodes()
        .iter()
        .enumerate()
        .rev()
        .find(|(_, node)| {
            node.pos.distance(pos) <= node_radius(store, node.size)
        })
        .map(|(index, _)| index)
}

/// Draws the session's graph. Graph coordinates start at `origin`.
pub fn paint(
    painter: &egui::Painter,
    origin: Pos2,
    session: &Session,
    pointer: Option<Pos2>,
) {
    let store = &session.store;
    let settings = store.settings();
    let scale = store.scale();
    let offset = origin.to_vec2();

    for edge in store.edges().iter().filter(|e| e.alive) {
        let (Ok(u), Ok(v)) = (store.node(edge.u()), store.node(edge.v())) else {
            continue;
        };
        painter.line_segment(
            [u.pos + offset, v.pos + offset],
            Stroke::new(settings.edge_width * scale, to_color32(edge.color)),
        );
    }

    if let (Some((from, _)), Some(pointer)) =
        (session.connecting_from, pointer)
        && let Ok(node) = store.node(from)
    {
        painter.line_segment(
            [node.pos + offset, pointer + offset],
            Stroke::new(CONNECT_PREVIEW_STROKE_WIDTH, CONNECT_PREVIEW_COLOR),
        );
    }

    for node in store.nodes() {
        let center = node.pos + offset;
        let radius = node_radius(store, node.size);
        painter.circle(
            center,
            radius,
            to_color32(node.fill),
            Stroke::new(
                settings.node_outline * node.size,
                to_color32(node.highlight),
            ),
        );
        if session.show_labels {
            painter.text(
                center,
                Align2::CENTER_CENTER,
                node.label.to_string(),
                FontId::proportional(radius * 0.8),
                LABEL_COLOR,
            );
        }
    }
}

/// Size the simulation should use for a panel of `size` points.
pub fn viewport_for(size: Vec2) -> Vec2 {
    size.max(Vec2::splat(1.0))
}
