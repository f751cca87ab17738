pub mod actions;
pub mod app;
pub mod codec;
pub mod color;
pub mod effects;
pub mod graph_view;
pub mod layout_force;
pub mod layout_settings;
pub mod native;
pub mod replay;
pub mod serialization;
pub mod sim;
pub mod state;
pub mod store;

pub use codec::{CodecError, Mutation, MutationGroup};
pub use color::Rgba;
pub use replay::{ReplayError, ReplayLog};
pub use sim::SimContext;
pub use store::{Store, StoreError};

use app::ViewerApp;
use state::State;

/// Build the viewer around an already prepared state.
pub fn create_app(_cc: &eframe::CreationContext<'_>, state: State) -> ViewerApp {
    ViewerApp::new(state)
}
