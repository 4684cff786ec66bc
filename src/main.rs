use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pagecrop::app::AppContext;
use pagecrop::cli::Cli;
use pagecrop::config::HarvestConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = HarvestConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    if config.headless {
        println!("Running in headless mode...");
    }

    let count = config.count;
    let ctx = AppContext::new(config)?;
    println!("Writing to {}", ctx.destination.display());

    let report = ctx.harvester.harvest(count).await;

    println!(
        "Elapsed run time: {} seconds",
        report.elapsed.as_secs_f64()
    );
    println!(
        "Harvested {} of {} pages ({} failed)",
        report.succeeded(),
        count,
        report.failed()
    );

    Ok(())
}
