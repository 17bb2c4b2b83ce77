use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{ContextArgs, PriceArgs};

#[derive(Parser)]
#[command(name = "lcf")]
#[command(about = "Lightning Charge field invoice tooling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database commands
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },

    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> site -> local)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Print the fingerprint and wrapper selector of a field context
    Fingerprint {
        #[command(flatten)]
        ctx: ContextArgs,
    },

    /// Resolve (and if needed create) the invoices for a field context
    Resolve {
        /// Layered config paths in merge order
        #[arg(long = "config")]
        config_paths: Vec<String>,

        #[command(flatten)]
        ctx: ContextArgs,

        #[command(flatten)]
        price: PriceArgs,
    },

    /// Invoice inspection
    Invoice {
        #[command(subcommand)]
        cmd: InvoiceCmd,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    Status,
    /// Apply SQL migrations.
    Migrate,
}

#[derive(Subcommand)]
enum InvoiceCmd {
    /// Fetch one invoice from Lightning Charge
    Show {
        #[arg(long = "config")]
        config_paths: Vec<String>,

        #[arg(long)]
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Db { cmd } => {
            let pool = lcf_db::connect_from_env().await?;
            match cmd {
                DbCmd::Status => {
                    let s = lcf_db::status(&pool).await?;
                    println!("db_ok={} has_ledger_table={}", s.ok, s.has_ledger_table);
                }
                DbCmd::Migrate => {
                    lcf_db::migrate(&pool).await?;
                    println!("migrations_applied=true");
                }
            }
        }

        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = lcf_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Fingerprint { ctx } => {
            let ctx = ctx.into_context()?;
            commands::field::fingerprint(&ctx);
        }

        Commands::Resolve {
            config_paths,
            ctx,
            price,
        } => {
            let ctx = ctx.into_context()?;
            commands::field::resolve(&config_paths, &ctx, &price).await?;
        }

        Commands::Invoice { cmd } => match cmd {
            InvoiceCmd::Show { config_paths, id } => {
                commands::invoice::show(&config_paths, &id).await?;
            }
        },
    }

    Ok(())
}

/// Logs go to stderr so stdout stays parseable.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
