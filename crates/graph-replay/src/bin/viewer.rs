use clap::Parser;
use graph_replay::native::{self, Args};

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();
    native::run(Args::parse())
}
