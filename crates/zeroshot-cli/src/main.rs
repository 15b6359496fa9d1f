mod display;
mod serve;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use zeroshot_core::Catalog;
use zeroshot_datagen::GenerateOptions;

#[derive(Parser, Debug)]
#[command(name = "zeroshot", version)]
#[command(about = "Zero-shot classification service and synthetic dataset generator")]
struct Cli {
    /// Log filter, e.g. `info` or `zeroshot_server=debug,tower_http=debug`
    #[arg(long, global = true, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Catalog TOML file (labels and security matrix); built-in when omitted
    #[arg(long, global = true, env = "ZEROSHOT_CATALOG")]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the models and serve the HTTP API until Ctrl-C
    Serve(serve::ServeArgs),
    /// Write synthetic CSV datasets
    Generate(GenerateArgs),
    /// Look up the value of a security level for a data category
    Security {
        category: String,
        /// 低风险等级 / 中风险等级 / 高风险等级 (or low / medium / high)
        level: String,
    },
    /// Print the label groups and the security matrix
    Catalog,
}

#[derive(clap::Args, Debug)]
struct GenerateArgs {
    /// Output directory
    #[arg(long, short = 'o', default_value = "generated_data")]
    output: PathBuf,
    #[arg(long, default_value_t = 100)]
    files_per_category: usize,
    #[arg(long, default_value_t = 50)]
    min_rows: usize,
    #[arg(long, default_value_t = 200)]
    max_rows: usize,
    /// Restrict to these categories (key, name or number); repeatable
    #[arg(long = "category", short = 'c')]
    categories: Vec<String>,
    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Command::Serve(args) => {
            let catalog = load_catalog(cli.catalog.as_deref())?;
            serve::run(args, catalog).await
        }
        Command::Generate(args) => generate(args).await,
        Command::Security { category, level } => {
            let catalog = load_catalog(cli.catalog.as_deref())?;
            let value = catalog
                .security
                .level_value(&category, &level)
                .with_context(|| format!("looking up {category} / {level}"))?;
            println!("{value}");
            Ok(())
        }
        Command::Catalog => {
            let catalog = load_catalog(cli.catalog.as_deref())?;
            print!("{}", display::render_catalog(&catalog));
            Ok(())
        }
    }
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalog(path: Option<&std::path::Path>) -> anyhow::Result<Catalog> {
    Catalog::load_or_builtin(path).context("loading catalog")
}

async fn generate(args: GenerateArgs) -> anyhow::Result<()> {
    let opts = GenerateOptions {
        files_per_category: args.files_per_category,
        min_rows: args.min_rows,
        max_rows: args.max_rows,
        categories: args.categories,
        seed: args.seed,
        ..GenerateOptions::new(args.output)
    };
    let stats = tokio::task::spawn_blocking(move || zeroshot_datagen::generate(&opts))
        .await
        .context("generator task failed")?
        .context("generating datasets")?;

    eprintln!(
        "  {} categories, {} files ({} failed), {} rows in {:.1}s",
        stats.categories,
        stats.files_written,
        stats.files_failed,
        stats.rows,
        stats.elapsed.as_secs_f64()
    );
    Ok(())
}
