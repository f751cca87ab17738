use crate::actions::Action;
use crate::serialization;
use crate::sim::{DEFAULT_VIEWPORT, SimContext};
use crate::state::{Session, State};
use crate::create_app;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "graph-replay")]
#[command(about = "Step through a recorded graph algorithm", long_about = None)]
pub struct Args {
    /// Action log to replay
    #[arg(default_value = "GraphLog.txt")]
    pub log: PathBuf,

    /// JSON file with layout and style settings
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Seed for the initial node placement
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Session for `args` with the log queued for opening. A log that cannot
/// be read leaves an empty graph and an error message.
pub fn initial_state(args: &Args) -> State {
    let settings =
        serialization::load_settings_or_default(args.settings.as_deref());
    let ctx = match args.seed {
        Some(seed) => SimContext::seeded(DEFAULT_VIEWPORT, seed),
        None => SimContext::new(DEFAULT_VIEWPORT),
    };
    let mut state = State::new(Session::new(settings, ctx));
    state.dispatch(Action::OpenLog {
        path: args.log.clone(),
    });
    state.flush_actions();
    state.flush_effects();
    state
}

/// Entry point used by the native executable.
pub fn run(args: Args) -> eframe::Result<()> {
    let state = initial_state(&args);
    let native_options = eframe::NativeOptions::default();

    eframe::run_native(
        "Graph Replay",
        native_options,
        Box::new(move |cc| Ok(Box::new(create_app(cc, state)))),
    )
}
