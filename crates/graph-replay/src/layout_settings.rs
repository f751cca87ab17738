use crate::color::Rgba;
use serde::{Deserialize, Serialize};

/// Common slider metadata so bounds live in one place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl SliderRange {
    pub const fn new(min: f32, max: f32, step: f32) -> Self {
        Self { min, max, step }
    }
}

pub const FORCE_RANGE: SliderRange = SliderRange::new(0.5, 12.0, 0.1);
pub const EDGE_LENGTH_RANGE: SliderRange =
    SliderRange::new(40.0, 600.0, 5.0);

/// Constants of the force model and the default look of new entities.
///
/// Sizes and lengths are given for a small graph; the store multiplies
/// them by its scale factor once the node count is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Strength shared by repulsion, springs, walls and centering.
    pub force: f32,
    /// Distance unit for repulsion before scaling.
    pub repulsion_unit: f32,
    /// Graphs with more nodes than this get shrunk.
    pub full_size_nodes: f32,
    pub wall_gain: f32,
    pub centering_divisor: f32,
    pub node_radius: f32,
    pub node_outline: f32,
    pub edge_width: f32,
    pub edge_length: f32,
    pub node_fill: Rgba,
    pub node_highlight: Rgba,
    pub edge_color: Rgba,
    /// Upper bound for a single integration step, in seconds.
    pub max_frame_dt: f32,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            force: 3.0,
            repulsion_unit: 100.0,
            full_size_nodes: 20.0,
            wall_gain: 4.0,
            centering_divisor: 3.0,
            node_radius: 26.0,
            node_outline: 4.0,
            edge_width: 3.0,
            edge_length: 200.0,
            node_fill: Rgba::from_rgb(50, 50, 50),
            node_highlight: Rgba::WHITE,
            edge_color: Rgba::from_rgb(100, 100, 100),
            max_frame_dt: 0.1,
        }
    }
}

/// A settings field holding a value the force model cannot run with.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
#[error("invalid {field}: {value}")]
pub struct InvalidSetting {
    pub field: &'static str,
    pub value: f32,
}

impl LayoutSettings {
    /// Rejects non-finite values, and zero or negative ones wherever the
    /// force model divides by or clamps against the field.
    pub fn validate(&self) -> Result<(), InvalidSetting> {
        let positive = [
            ("force", self.force),
            ("repulsion_unit", self.repulsion_unit),
            ("full_size_nodes", self.full_size_nodes),
            ("wall_gain", self.wall_gain),
            ("centering_divisor", self.centering_divisor),
            ("node_radius", self.node_radius),
            ("edge_length", self.edge_length),
            ("max_frame_dt", self.max_frame_dt),
        ];
        let non_negative = [
            ("node_outline", self.node_outline),
            ("edge_width", self.edge_width),
        ];
        let bad = positive
            .into_iter()
            .find(|(_, v)| !(v.is_finite() && *v > 0.0))
            .or_else(|| {
                non_negative
                    .into_iter()
                    .find(|(_, v)| !(v.is_finite() && *v >= 0.0))
            });
        match bad {
            Some((field, value)) => Err(InvalidSetting { field, value }),
            None => Ok(()),
        }
    }

    /// `min(full_size_nodes / n, 1)`, and 1 for an empty graph or when
    /// `full_size_nodes` is unusable.
    pub fn scale_for(&self, node_count: usize) -> f32 {
        if node_count == 0 {
            return 1.0;
        }
        let scale = (self.full_size_nodes / node_count as f32).min(1.0);
        if scale > 0.0 { scale } else { 1.0 }
    }
}
