use std::path::PathBuf;

use clap::Parser;

use devkit_gen::config::{load_or_default, OutputLayout};
use devkit_gen::observability::init_logging;
use devkit_gen::Pipeline;

#[derive(Parser)]
#[command(name = "devkit-gen")]
#[command(
    about = "Generate nginx and traefik config from per-project devkit.yml files",
    long_about = None
)]
struct Cli {
    /// Tree root containing projects/ and .env
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Generator configuration (TOML); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured output layout (per-domain or single)
    #[arg(long)]
    layout: Option<OutputLayout>,

    /// Render and report without writing anything
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_or_default(cli.config.as_deref())?;
    if let Some(layout) = cli.layout {
        config.proxy.layout = layout;
    }

    init_logging(&config.observability.log_level);

    tracing::info!(
        root = %cli.root.display(),
        projects_dir = %config.paths.projects_dir,
        layout = ?config.proxy.layout,
        "Configuration loaded"
    );

    let pipeline = Pipeline::new(&cli.root, config)?;

    let summary = if cli.dry_run {
        pipeline.plan()?.report().summary("Would generate")
    } else {
        pipeline.run()?.summary("Generated")
    };
    print!("{}", summary);

    Ok(())
}
