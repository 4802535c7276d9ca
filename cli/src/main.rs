//! `bidboard`: command-line driver for the bid board store.

mod logging;
mod output;

use anyhow::{Context as _, Result};
use bidboard_business::{BusinessConfig, build_http_store};
use bidboard_cli::commands;
use bidboard_states::StateCtx;
use clap::{Parser, Subcommand};
use output::Output;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "bidboard")]
#[command(about = "Drive the bid board store against an auction API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the auction API (`/api` is appended)
    #[arg(long, global = true, env = "BIDBOARD_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Enable verbose debug output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// List registered user ids
    Users,
    /// Show one registered user
    User {
        /// User id to look up
        name: String,
    },
    /// Submit a clock bid given as JSON
    Bid {
        /// Bid payload, e.g. '{"itemId":"x1","price":10}'
        json: String,
    },
}

impl Cli {
    fn config(&self) -> Result<BusinessConfig> {
        match &self.api_base_url {
            Some(url) => Ok(BusinessConfig::new(url)),
            None => BusinessConfig::from_env().context("Failed to read configuration"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let config = cli.config()?;
    info!(api_url = %config.api_url(), "Using auction API");

    let mut ctx = build_http_store(&config).context("Failed to build store")?;
    let out = Output::new();

    let result = match cli.command {
        Commands::Users => run_users(&mut ctx, &out).await,
        Commands::User { name } => run_user(&mut ctx, &out, &name).await,
        Commands::Bid { json } => run_bid(&mut ctx, &out, &json).await,
    };

    ctx.shutdown().await;
    result
}

async fn run_users(ctx: &mut StateCtx, out: &Output) -> Result<()> {
    let names = commands::list_users(ctx).await?;
    if names.is_empty() {
        out.warning("No registered users");
        return Ok(());
    }

    out.header("Registered users");
    for name in &names {
        out.print(name);
    }
    out.count("Total", names.len());
    Ok(())
}

async fn run_user(ctx: &mut StateCtx, out: &Output, name: &str) -> Result<()> {
    let user = commands::lookup_user(ctx, name).await?;
    if user.id.is_empty() {
        out.warning(format!("{name} is not registered"));
    }

    out.header(name);
    out.labeled_indent("id", &user.id, 2);
    out.labeled_indent("approle", &user.approle, 2);
    out.labeled_indent("color", &user.color, 2);
    out.labeled_indent("avatar", &user.avatar, 2);
    Ok(())
}

async fn run_bid(ctx: &mut StateCtx, out: &Output, json: &str) -> Result<()> {
    let submitted = commands::submit_bid(ctx, json).await?;

    out.success("Bid accepted");
    out.count("Submitted bids", submitted);
    Ok(())
}
