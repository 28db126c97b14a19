#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the ee-status ranking engine.
//!
//! ```text
//! ee_status totals --county Alpha --state Bayern
//! ee_status rankings --state Bayern --numerator pv_net_nominal_capacity
//! ee_status timeline --municipality-key 091620000000
//! ee_status search Fürth
//! ee_status serve [--interactive]
//! ```
//!
//! Every engine command prints its result as pretty JSON. `--data-dir`
//! overrides `EE_STATUS_DATA_DIR`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ee_status_analytics_models::{RankingsParams, SearchParams, TotalsParams};
use ee_status_registry::{Snapshot, paths};
use ee_status_registry_models::ScopeFilter;
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "ee_status",
    about = "Rank German municipalities, counties, and states by renewable capacity"
)]
struct Cli {
    /// Directory holding `current_totals.csv` and `monthly_timeline.csv`
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Averages and ranks of one entity at every level
    Totals {
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        ratio: RatioArgs,
    },
    /// Ranking table of a county, a state, or the country
    Rankings {
        /// County whose municipalities are ranked
        #[arg(long)]
        county: Option<String>,
        /// State whose counties are ranked
        #[arg(long)]
        state: Option<String>,
        #[command(flatten)]
        ratio: RatioArgs,
    },
    /// Cumulative capacity per energy source over time
    Timeline {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Resolve free text to a municipality, county, or state
    Search {
        /// Text to search for
        query: String,
    },
    /// Start the HTTP API server
    Serve {
        /// Prompt for configuration before starting
        #[arg(long)]
        interactive: bool,
        /// Address to bind (defaults to `BIND_ADDR` or 127.0.0.1)
        #[arg(long, conflicts_with = "interactive")]
        bind_addr: Option<String>,
        /// Port to listen on (defaults to `PORT` or 8080)
        #[arg(long, conflicts_with = "interactive")]
        port: Option<u16>,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Official municipality key
    #[arg(long)]
    municipality_key: Option<String>,
    /// Municipality name
    #[arg(long)]
    municipality: Option<String>,
    /// County name
    #[arg(long)]
    county: Option<String>,
    /// State name
    #[arg(long)]
    state: Option<String>,
}

impl From<FilterArgs> for ScopeFilter {
    fn from(args: FilterArgs) -> Self {
        Self {
            municipality_key: args.municipality_key,
            municipality: args.municipality,
            county: args.county,
            state: args.state,
        }
    }
}

#[derive(Args)]
struct RatioArgs {
    /// Numerator column (default: total_net_nominal_capacity)
    #[arg(long)]
    numerator: Option<String>,
    /// Denominator column (default: population)
    #[arg(long)]
    denominator: Option<String>,
    /// Order of tied scores: input_order or name
    #[arg(long)]
    tie_break: Option<String>,
}

fn print_json(value: &impl Serialize) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load(data_dir: Option<PathBuf>) -> Result<Snapshot, Box<dyn std::error::Error>> {
    let dir = data_dir.unwrap_or_else(paths::data_dir);
    log::debug!("Using data directory {}", dir.display());
    Ok(ee_status_registry::load_snapshot(&dir)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    match cli.command {
        Commands::Totals { filter, ratio } => {
            let params = TotalsParams {
                filter: filter.into(),
                ratio: ee_status_analytics::parse_ratio(
                    ratio.numerator.as_deref(),
                    ratio.denominator.as_deref(),
                )?,
                tie_break: ee_status_analytics::parse_tie_break(ratio.tie_break.as_deref())?,
            };
            let snapshot = load(cli.data_dir)?;
            print_json(&ee_status_analytics::totals(&snapshot, &params)?)?;
        }
        Commands::Rankings {
            county,
            state,
            ratio,
        } => {
            let params = RankingsParams {
                filter: ScopeFilter {
                    county,
                    state,
                    ..ScopeFilter::default()
                },
                ratio: ee_status_analytics::parse_ratio(
                    ratio.numerator.as_deref(),
                    ratio.denominator.as_deref(),
                )?,
                tie_break: ee_status_analytics::parse_tie_break(ratio.tie_break.as_deref())?,
            };
            let snapshot = load(cli.data_dir)?;
            print_json(&ee_status_analytics::rankings(&snapshot, &params)?)?;
        }
        Commands::Timeline { filter } => {
            let snapshot = load(cli.data_dir)?;
            print_json(&ee_status_analytics::timeline(&snapshot, &filter.into())?)?;
        }
        Commands::Search { query } => {
            let snapshot = load(cli.data_dir)?;
            print_json(&ee_status_analytics::search(&snapshot, &SearchParams { query }))?;
        }
        Commands::Serve {
            interactive: true,
            ..
        } => {
            if let Some(dir) = &cli.data_dir {
                // SAFETY: No other threads exist yet; the variable is read
                // once when the interactive prompt builds its default.
                unsafe {
                    std::env::set_var(paths::DATA_DIR_ENV, dir);
                }
            }
            actix_web::rt::System::new().block_on(ee_status_server::interactive::run())?;
        }
        Commands::Serve {
            interactive: false,
            bind_addr,
            port,
        } => {
            let snapshot = load(cli.data_dir)?;
            let (default_addr, default_port) = ee_status_server::bind_config();
            actix_web::rt::System::new().block_on(ee_status_server::serve(
                snapshot,
                bind_addr.unwrap_or(default_addr),
                port.unwrap_or(default_port),
            ))?;
        }
    }

    Ok(())
}
