//! Force-directed layout.
//!
//! One call to [`step`] advances every node by `dt` seconds:
//! pairwise repulsion, springs along live edges, soft walls at the inset
//! margin, a pull towards the center, then explicit Euler integration with
//! exponential damping. A zero `dt` leaves positions and velocities as they
//! are.

use crate::sim::SimContext;
use crate::store::{Node, Store};
use eframe::egui::{Pos2, Vec2};

pub fn step(store: &mut Store, ctx: &SimContext, dt: f32) {
    let settings = store.settings().clone();
    let scale = store.scale();
    let force = settings.force;
    let (nodes, edges) = store.parts_mut();

    repel(nodes, force, settings.repulsion_unit * scale, dt);

    for edge in edges.iter().filter(|e| e.alive) {
        let (u, v) = edge.endpoints();
        let delta = nodes[v].pos - nodes[u].pos;
        let length = delta.length();
        if length <= 0.0 {
            continue;
        }
        let displacement = length - edge.optimal_length;
        let impulse = delta / length * force * dt * displacement;
        nodes[u].velocity += impulse;
        nodes[v].velocity -= impulse;
    }

    let viewport = ctx.viewport();
    let margin = ctx.margin();
    let center = ctx.center();
    let wall = force * dt * settings.wall_gain;
    let pull = force / settings.centering_divisor / scale * dt;

    for node in nodes.iter_mut() {
        node.velocity += wall_impulse(node.pos, viewport, margin) * wall;
        node.velocity -= (node.pos - center) * pull;
        node.pos += node.velocity * dt;
        node.velocity *= (-dt).exp();
    }
}

/// Inverse-square push between every unordered pair, with distances
/// measured in units of `unit`.
fn repel(nodes: &mut [Node], force: f32, unit: f32, dt: f32) {
    for i in 0..nodes.len() {
        let (head, tail) = nodes.split_at_mut(i + 1);
        let a = &mut head[i];
        for b in tail.iter_mut() {
            let delta = a.pos - b.pos;
            let d = delta.length() / unit;
            if d > 0.0 {
                let impulse = delta * (force / (d * d)) * dt;
                a.velocity += impulse;
                b.velocity -= impulse;
            }
        }
    }
}

/// Squared penetration depth into the margin on each axis, signed to point
/// back inside.
fn wall_impulse(pos: Pos2, viewport: Vec2, margin: Vec2) -> Vec2 {
    Vec2::new(
        wall_axis(pos.x, viewport.x, margin.x),
        wall_axis(pos.y, viewport.y, margin.y),
    )
}

fn wall_axis(p: f32, size: f32, margin: f32) -> f32 {
    if p < margin {
        let depth = margin - p;
        depth * depth
    } else if p > size - margin {
        let depth = p - (size - margin);
        -(depth * depth)
    } else {
        0.0
    }
}
