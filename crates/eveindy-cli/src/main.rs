mod commands;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use eveindy_cli::output::{print_footer, print_logo, OutputFormat};

use commands::cost::{handle_cost, CostArgs};
use commands::invention::{handle_invention, InventionArgs};
use commands::job_time::{handle_job_time, JobTimeArgs};
use commands::materials::{handle_materials, MaterialsArgs};
use commands::AppContext;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "EVE industry materials, invention and build cost calculator"
)]
struct Cli {
    /// Industry catalog database, or a directory containing industry_catalog.db.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Price list CSV with type_id, buy and sell columns.
    #[arg(long, global = true)]
    prices: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Suppress the banner and timing footer.
    #[arg(long, global = true)]
    no_logo: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Components and base materials needed to build an item.
    Materials(MaterialsArgs),
    /// Invention chance, runs and materials for a tech-2 or tech-3 blueprint.
    Invention(InventionArgs),
    /// Duration of a manufacturing or invention job.
    JobTime(JobTimeArgs),
    /// Build cost breakdown and profit.
    Cost(CostArgs),
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let started = Instant::now();

    let decorate = cli.format.is_text() && !cli.no_logo;
    if decorate {
        print_logo();
    }

    let ctx = AppContext {
        catalog: cli.catalog,
        prices: cli.prices,
        format: cli.format,
    };
    match &cli.command {
        Command::Materials(args) => handle_materials(&ctx, args)?,
        Command::Invention(args) => handle_invention(&ctx, args)?,
        Command::JobTime(args) => handle_job_time(&ctx, args)?,
        Command::Cost(args) => handle_cost(&ctx, args)?,
    }

    if decorate {
        print_footer(started.elapsed());
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
