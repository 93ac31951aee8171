use std::env;

use libapparatus::{config::BuildOptions, pipeline::build_once};
use tracing_subscriber::EnvFilter;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = BuildOptions::from_args(env::args().skip(1));
    build_once(&options)
}
