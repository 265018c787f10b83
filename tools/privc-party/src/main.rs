use anyhow::{Context, Result};
use clap::Parser;
use privc_party::{config::Config, runner};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[clap(name = "privc-party")]
struct Options {
    /// The path to the config file
    config_path: PathBuf,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(tracing_subscriber::fmt::layer()).init();

    let options = Options::parse();
    let config = Config::load(&options.config_path).context("failed to load config")?;
    let revealed = runner::run(&config).context("computation failed")?;
    println!("Result of shape {:?}: {:?}", revealed.shape(), revealed.to_f64s());
    Ok(())
}
