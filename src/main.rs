use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use solar_dashboard::config::load_config;
use solar_dashboard::data::model::Region;
use solar_dashboard::report;
use solar_dashboard::state::{DashboardState, DashboardView};

/// Compare solar irradiance across regions from per-region CSV files.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Region to include (label, file stem or short key); repeatable.
    /// Defaults to the configured regions.
    #[arg(short, long = "region")]
    regions: Vec<String>,

    /// Metric for the time-series view (first numeric column by default).
    #[arg(short, long)]
    metric: Option<String>,

    /// Settings file (defaults to ./dashboard.toml when present).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to search for region files; repeatable, replaces the
    /// configured candidates.
    #[arg(long = "data-dir")]
    data_dirs: Vec<PathBuf>,

    /// Print the view as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Read selection commands from stdin, re-running after each one.
    #[arg(short, long)]
    interactive: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if !args.data_dirs.is_empty() {
        config.data_dirs = args.data_dirs.clone();
    }
    if !args.regions.is_empty() {
        config.regions = args.regions.clone();
    }

    let mut state = DashboardState::new(&config);
    state.select_metric(args.metric.clone());

    if args.interactive {
        run_interactive(&mut state, args.json)
    } else {
        print_view(&state.refresh(), args.json)
    }
}

fn print_view(view: &DashboardView, json: bool) -> Result<()> {
    let mut stdout = io::stdout().lock();
    if json {
        serde_json::to_writer_pretty(&mut stdout, view).context("writing JSON view")?;
        writeln!(stdout)?;
    } else {
        write!(stdout, "{}", report::render(view))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Interactive loop
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
enum Command {
    Regions(Vec<String>),
    Metric(Option<String>),
    Show,
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    match word {
        "regions" | "r" => Command::Regions(
            rest.split([';', ','])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        ),
        "metric" | "m" => Command::Metric((!rest.is_empty()).then(|| rest.to_string())),
        "show" | "" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => Command::Unknown(other.to_string()),
    }
}

fn print_help() {
    println!("Commands:");
    println!("  regions <label>[; <label>...]   select regions (empty clears the selection)");
    println!("  metric [<name>]                 time-series metric (empty = default)");
    println!("  show                            re-run with the current selection");
    println!("  quit");
    println!("Regions:");
    for region in Region::ALL {
        println!("  {}", region.label());
    }
}

fn run_interactive(state: &mut DashboardState, json: bool) -> Result<()> {
    print_view(&state.refresh(), json)?;
    print_help();

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }
        match parse_command(&line) {
            Command::Regions(regions) => state.select_regions(regions),
            Command::Metric(metric) => state.select_metric(metric),
            Command::Show => {}
            Command::Help => {
                print_help();
                continue;
            }
            Command::Quit => return Ok(()),
            Command::Unknown(word) => {
                println!("unknown command '{word}', try 'help'");
                continue;
            }
        }
        print_view(&state.refresh(), json)?;
    }
}
