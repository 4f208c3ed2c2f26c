mod inspect;
mod migrate;
mod rebuild;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use imgshift_pipeline::CarryForwardPolicy;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "imgshift")]
#[command(about = "Rename, re-host and re-attach Shopify product images per variant")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Migrate the images of one or more products
    Migrate {
        /// Product id, numeric or `gid://shopify/Product/<n>` (repeatable)
        #[arg(long = "product", required = true, num_args = 1..)]
        products: Vec<String>,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Migrate every product matching an Admin API search query
    Batch {
        /// Search query, e.g. `vendor:Acme tag:tiles`
        #[arg(long)]
        query: String,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Count the products matching a search query and list their ids
    Count {
        #[arg(long)]
        query: String,
    },
    /// Show a product's image/variant links and planned filenames
    Inspect {
        #[arg(long)]
        product: String,

        /// Ignore carry-forward context when planning filenames
        #[arg(long)]
        no_carry_forward: bool,
    },
    /// Rebuild the import file from stored manifests without network calls
    Csv {
        /// Output path (defaults to IMGSHIFT_OUTPUT_PATH)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Compare product ids in an import file against stored manifests
    Verify {
        #[arg(long)]
        csv: PathBuf,
    },
}

/// Flags shared by `migrate` and `batch`.
#[derive(Debug, Args)]
struct RunArgs {
    /// Output path (defaults to IMGSHIFT_OUTPUT_PATH)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Name unlinked images as gallery shots instead of attributing them to
    /// the preceding variant
    #[arg(long)]
    no_carry_forward: bool,

    /// Fetch and plan only; download and upload nothing
    #[arg(long)]
    dry_run: bool,
}

impl RunArgs {
    fn options(&self, config: &imgshift_core::AppConfig) -> migrate::MigrateOptions {
        migrate::MigrateOptions {
            output: self
                .output
                .clone()
                .unwrap_or_else(|| config.output_path.clone()),
            carry_forward: carry_forward_policy(self.no_carry_forward),
            dry_run: self.dry_run,
        }
    }
}

fn carry_forward_policy(no_carry_forward: bool) -> CarryForwardPolicy {
    if no_carry_forward {
        CarryForwardPolicy::Disabled
    } else {
        CarryForwardPolicy::Carry
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = imgshift_core::load_app_config()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::debug!(env = %config.env, store = %config.shopify_store, "configuration loaded");

    match cli.command {
        Commands::Migrate { products, run } => {
            let options = run.options(&config);
            migrate::run_migrate(&config, &products, &options).await
        }
        Commands::Batch { query, run } => {
            let options = run.options(&config);
            migrate::run_batch(&config, &query, &options).await
        }
        Commands::Count { query } => inspect::run_count(&config, &query).await,
        Commands::Inspect {
            product,
            no_carry_forward,
        } => inspect::run_inspect(&config, &product, carry_forward_policy(no_carry_forward)).await,
        Commands::Csv { output } => {
            let output = output.unwrap_or_else(|| config.output_path.clone());
            rebuild::run_csv(&config, &output)
        }
        Commands::Verify { csv } => rebuild::run_verify(&config, &csv),
    }
}

#[cfg(test)]
mod test_support;
