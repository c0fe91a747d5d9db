use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use ip_tam_dashboard::config::Config;
use ip_tam_dashboard::constants::EXPORT_FILE_NAME;
use ip_tam_dashboard::dashboard::{compare, recompute, DashboardParams, Snapshot};
use ip_tam_dashboard::domain::format_number;
use ip_tam_dashboard::export::export_to_path;
use ip_tam_dashboard::pipeline::processing::aggregate::ranking::top_companies_by_profiles;
use ip_tam_dashboard::pipeline::processing::filter::FilterSet;
use ip_tam_dashboard::pipeline::{prepare_base_table, BaseTable};
use ip_tam_dashboard::server::{start_server, AppState};
use ip_tam_dashboard::{logging, metrics};

#[derive(Parser)]
#[command(name = "tam-dashboard")]
#[command(about = "Filter, tier and aggregate the IP professionals TAM dataset")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to dashboard.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Source CSV, overriding the configured path
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Keep only rows whose facet has this value, e.g. `tier=T1` (repeatable)
    #[arg(long = "include", global = true, value_name = "FACET=VALUE")]
    include: Vec<String>,

    /// Drop rows whose facet has this value, e.g. `region=EU` (repeatable)
    #[arg(long = "exclude", global = true, value_name = "FACET=VALUE")]
    exclude: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print headline statistics of the filtered view
    Summary {
        /// Print the full snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// List company rollups, largest first
    Companies {
        #[arg(long, default_value_t = 15)]
        limit: usize,
    },
    /// Write the filtered row-level table as CSV
    Export {
        #[arg(long, default_value = EXPORT_FILE_NAME)]
        output: PathBuf,
    },
    /// Compare the filtered view against a second filter set
    Compare {
        /// Include filter of the right-hand view (repeatable)
        #[arg(long = "right-include", value_name = "FACET=VALUE")]
        right_include: Vec<String>,

        /// Exclude filter of the right-hand view (repeatable)
        #[arg(long = "right-exclude", value_name = "FACET=VALUE")]
        right_exclude: Vec<String>,

        #[arg(long)]
        json: bool,
    },
    /// Serve snapshots over HTTP
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

fn apply_filter_args(base: &FilterSet, include: &[String], exclude: &[String]) -> anyhow::Result<FilterSet> {
    let mut filters = base.clone();
    for expr in include {
        filters
            .add_include_expr(expr)
            .with_context(|| format!("invalid --include '{}'", expr))?;
    }
    for expr in exclude {
        filters
            .add_exclude_expr(expr)
            .with_context(|| format!("invalid --exclude '{}'", expr))?;
    }
    Ok(filters)
}

fn load_base(config: &Config) -> anyhow::Result<BaseTable> {
    prepare_base_table(&config.source.path)
        .with_context(|| format!("could not load {}", config.source.path.display()))
}

fn print_summary(snapshot: &Snapshot) {
    let s = &snapshot.summary;
    println!("\n📊 TAM summary");
    for line in &snapshot.active_filters {
        println!("   {}", line);
    }
    println!("   Accounts: {}", s.accounts);
    println!("   Profiles: {}", s.profiles);
    match s.total_patents {
        Some(total) => println!("   Patents (lifetime): {}", format_number(total)),
        None => println!("   Patents (lifetime): N/A"),
    }
    match s.total_patents_recent {
        Some(total) => println!("   Patents (recent): {}", format_number(total)),
        None => println!("   Patents (recent): N/A"),
    }
    for share in &s.tiers {
        println!(
            "   {:<12} {:>6} accounts ({:.1}%)",
            share.tier.label(),
            share.accounts,
            share.percentage
        );
    }
    if let Some(patents) = &s.patents {
        println!(
            "   Patent holders: {} ({:.1}%), mean {:.0}, median {:.0}",
            patents.accounts, patents.share_of_accounts, patents.mean_total, patents.median_total
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(Some(path.as_path()))?,
        None => Config::load()?,
    };
    if let Some(source) = &cli.source {
        config.source.path = source.clone();
    }

    let mut params = DashboardParams::from_config(&config);
    params.filters = apply_filter_args(&params.filters, &cli.include, &cli.exclude)?;

    metrics::init_metrics();

    match cli.command {
        Commands::Summary { json } => {
            let base = load_base(&config)?;
            let view = recompute(&base.table, &params);
            if json {
                println!("{}", serde_json::to_string_pretty(&view.snapshot)?);
            } else {
                print_summary(&view.snapshot);
            }
        }
        Commands::Companies { limit } => {
            let base = load_base(&config)?;
            let view = recompute(&base.table, &params);
            println!("{:<40} {:>8} {:>12} {:>16}", "Company", "Profiles", "Custom tier", "Lifetime patents");
            for company in top_companies_by_profiles(&view.snapshot.companies, limit) {
                println!(
                    "{:<40} {:>8} {:>12} {:>16}",
                    company.company,
                    company.profile_count,
                    company.tier.map_or("-", |t| t.label()),
                    company.patents_total.map_or_else(|| "N/A".to_string(), format_number),
                );
            }
        }
        Commands::Export { output } => {
            let base = load_base(&config)?;
            let view = recompute(&base.table, &params);
            export_to_path(&view.filtered, &output)
                .with_context(|| format!("could not write {}", output.display()))?;
            println!("✅ Wrote {} rows to {}", view.filtered.len(), output.display());
        }
        Commands::Compare {
            right_include,
            right_exclude,
            json,
        } => {
            let base = load_base(&config)?;
            let right = DashboardParams {
                filters: apply_filter_args(&config.filters, &right_include, &right_exclude)?,
                ..params.clone()
            };
            let comparison = compare(&base.table, &params, &right);
            if json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                println!("\n⬅️  Left");
                print_summary(&comparison.left);
                println!("\n➡️  Right");
                print_summary(&comparison.right);
                println!(
                    "\nΔ accounts {:+}, Δ profiles {:+}",
                    comparison.delta.accounts, comparison.delta.profiles
                );
            }
        }
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.server.port);
            let state = AppState::load(config.source.path.clone(), params)
                .with_context(|| format!("could not load {}", config.source.path.display()))?;
            info!(port, "Starting dashboard server");
            if let Err(e) = start_server(Arc::new(state), port).await {
                error!("Server error: {}", e);
                return Err(e);
            }
        }
    }

    Ok(())
}
