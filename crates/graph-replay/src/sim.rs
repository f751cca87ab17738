use eframe::egui::{Pos2, Vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Viewport the simulation runs in, used until the window reports its
/// real size.
pub const DEFAULT_VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

/// Everything the layout needs besides the graph itself: the random
/// source for initial placement and the board the nodes live on.
pub struct SimContext {
    rng: StdRng,
    viewport: Vec2,
}

impl SimContext {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            viewport,
        }
    }

    /// Deterministic placement, for tests and reproducible screenshots.
    pub fn seeded(viewport: Vec2, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            viewport,
        }
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    /// Inset kept free along every border.
    pub fn margin(&self) -> Vec2 {
        self.viewport / 10.0
    }

    pub fn center(&self) -> Pos2 {
        (self.viewport / 2.0).to_pos2()
    }

    /// Uniform point inside the viewport minus its margin.
    pub fn random_position(&mut self) -> Pos2 {
        let margin = self.margin();
        let inner = self.viewport - margin * 2.0;
        Pos2::new(
            self.rng.random::<f32>() * inner.x + margin.x,
            self.rng.random::<f32>() * inner.y + margin.y,
        )
    }
}

impl Default for SimContext {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWPORT)
    }
}
