use anyhow::Result;
use clap::Parser;
use covid_analysis::{config::Args, pipeline};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    // stderr, so previews on stdout stay clean
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    // ─── 2) resolve config ───────────────────────────────────────────
    let config = Args::parse().into_config()?;
    info!(input = %config.input.display(), output = %config.output.display(), "startup");

    // ─── 3) run ──────────────────────────────────────────────────────
    let stdout = std::io::stdout();
    pipeline::run(&config, &mut stdout.lock())?;
    Ok(())
}
