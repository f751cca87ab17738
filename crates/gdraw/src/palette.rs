//! Ready-made colors for algorithm states.

use crate::color::Color;

/// `i`th color of a ten-color categorical scheme, wrapping around.
pub fn category(i: usize) -> Color {
    let scheme = &colorous::CATEGORY10;
    scheme[i % scheme.len()].into()
}

/// Color at `t` in `[0, 1]` on a sequential scale; for distances and
/// other ordered quantities.
pub fn sequential(t: f64) -> Color {
    colorous::VIRIDIS.eval_continuous(t.clamp(0.0, 1.0)).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wraps() {
        assert_eq!(category(0), category(10));
        assert_ne!(category(0), category(1));
    }

    #[test]
    fn test_sequential_clamps() {
        assert_eq!(sequential(-1.0), sequential(0.0));
        assert_eq!(sequential(2.0), sequential(1.0));
    }
}
