//! Producer side of graph-replay: algorithms write their graph and every
//! state change to a log that the viewer steps through.

pub mod color;
pub mod palette;
pub mod writer;

pub use color::Color;
pub use writer::{LogError, LogWriter};
