//! `liveops` CLI: expand event rules and resolve inherited configs from the
//! command line. Everything is JSON in, JSON out.
//!
//! ## Usage
//!
//! ```sh
//! # Occurrence dates of a rule inside a window
//! liveops expand --from 2024-01-01 --to 2024-03-31 -i rule.json
//!
//! # Active 30-minute slots, or collapsed ranges
//! liveops occupancy --from 2024-01-01 --to 2024-01-31 --ranges -i rule.json
//!
//! # Resolved config layers for one node of a category tree
//! liveops resolve --node sword -i tree.json
//!
//! # Changed-only diff of an edited config
//! liveops diff -i groups.json
//! ```

use std::collections::HashMap;
use std::io::{self, Read};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config_inherit::{ConfigGroup, NodeTree, RawNodeConfig};
use liveops_calendar::{DateWindow, EventRule};

#[derive(Parser)]
#[command(
    name = "liveops",
    version,
    about = "Liveops calendar expansion and config inheritance"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the occurrence dates of an event rule
    Expand {
        #[command(flatten)]
        window: WindowArgs,
        #[command(flatten)]
        io: IoArgs,
    },
    /// List the 30-minute slots an event rule keeps active
    Occupancy {
        #[command(flatten)]
        window: WindowArgs,
        /// Collapse contiguous slots into start/end ranges
        #[arg(long)]
        ranges: bool,
        #[command(flatten)]
        io: IoArgs,
    },
    /// Resolve the config layers visible when editing a node
    Resolve {
        /// Node to resolve
        #[arg(long)]
        node: String,
        #[command(flatten)]
        io: IoArgs,
    },
    /// Reduce an edited config to its changed segments
    Diff {
        #[command(flatten)]
        io: IoArgs,
    },
}

#[derive(clap::Args)]
struct WindowArgs {
    /// First day of the window (YYYY-MM-DD)
    #[arg(long)]
    from: NaiveDate,
    /// Last day of the window, inclusive (YYYY-MM-DD)
    #[arg(long)]
    to: NaiveDate,
}

impl WindowArgs {
    fn window(&self) -> DateWindow {
        DateWindow::new(self.from, self.to)
    }
}

#[derive(clap::Args)]
struct IoArgs {
    /// Input file (reads from stdin if omitted)
    #[arg(short, long)]
    input: Option<String>,
    /// Output file (writes to stdout if omitted)
    #[arg(short, long)]
    output: Option<String>,
}

/// Input of `resolve`: the stored rows of a category tree.
#[derive(Deserialize)]
struct TreeInput {
    nodes: Vec<NodeRow>,
}

#[derive(Deserialize)]
struct NodeRow {
    #[serde(rename = "nodeID")]
    node_id: String,
    #[serde(rename = "parentID", default)]
    parent_id: Option<String>,
    #[serde(default)]
    config: String,
    #[serde(default)]
    overrides: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Expand { window, io } => {
            let rule = read_rule(&io)?;
            let dates = liveops_calendar::expand(&rule, &window.window())
                .with_context(|| format!("Failed to expand rule '{}'", rule.id))?;
            debug!(rule = %rule.id, count = dates.len(), "expanded");
            let keys: Vec<String> = dates
                .iter()
                .map(|d| liveops_calendar::format_date_key(*d))
                .collect();
            write_json(&io, &keys)?;
        }
        Commands::Occupancy { window, ranges, io } => {
            let rule = read_rule(&io)?;
            let occupancy = liveops_calendar::occupancy_for_rule(&rule, &window.window())
                .with_context(|| format!("Failed to build occupancy for rule '{}'", rule.id))?;
            if ranges {
                write_json(&io, &occupancy.ranges())?;
            } else {
                write_json(&io, &occupancy.keys())?;
            }
        }
        Commands::Resolve { node, io } => {
            let input: TreeInput = serde_json::from_str(&read_input(io.input.as_deref())?)
                .context("Failed to parse tree JSON")?;

            let mut tree = NodeTree::new();
            let mut raw = HashMap::with_capacity(input.nodes.len());
            for row in input.nodes {
                tree.insert(row.node_id.clone(), row.parent_id);
                raw.insert(row.node_id, RawNodeConfig::new(row.config, row.overrides));
            }

            let resolved = config_inherit::resolve(&node, &tree, &raw)
                .with_context(|| format!("Failed to resolve node '{node}'"))?;
            write_json(&io, &resolved)?;
        }
        Commands::Diff { io } => {
            let groups: Vec<ConfigGroup> =
                serde_json::from_str(&read_input(io.input.as_deref())?)
                    .context("Failed to parse config groups JSON")?;
            write_json(&io, &config_inherit::encode_diff(&groups))?;
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_rule(io: &IoArgs) -> Result<EventRule> {
    let json = read_input(io.input.as_deref())?;
    serde_json::from_str(&json).context("Failed to parse event rule JSON")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_json<T: serde::Serialize>(io: &IoArgs, value: &T) -> Result<()> {
    let mut content = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    content.push('\n');
    write_output(io.output.as_deref(), &content)
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
