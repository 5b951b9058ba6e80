use std::path::PathBuf;

use clap::Parser;
use desk_diorama::DioramaConfig;

/// Render the desk diorama in a window.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// TOML settings file; missing files fall back to the defaults.
    #[arg(long, default_value = "diorama.toml")]
    config: PathBuf,

    /// Directory to read textures from, overriding the config.
    #[arg(long)]
    assets: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = DioramaConfig::load(&args.config)?;
    if let Some(assets) = args.assets {
        config.assets.directory = assets;
    }
    desk_diorama::run(config)
}
