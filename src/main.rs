//! CLI entry point for the Olympic medal explorer.
//!
//! Provides subcommands for the overview, per-country and comparison views,
//! an arbitrary count table, and an interactive mode that serves many views
//! from one loaded dataset.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use olympic_medals::{
    config::Settings,
    error::DashboardError,
    output::{self, EMPTY_MESSAGE, Layout},
    pipeline::{DedupePolicy, Pipeline, classify::CategoryMap, series::SeriesMode},
    record::{Field, Medal, Season},
    source::CachedSource,
    views::Dashboard,
};
use std::ffi::OsStr;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "olympic_medals")]
#[command(about = "Explore Olympic medal statistics from an athlete-events CSV", long_about = None)]
struct Cli {
    /// Dataset CSV (optionally .gz); overrides OLYMPIC_DATA_PATH
    #[arg(long, global = true, value_name = "PATH")]
    data: Option<PathBuf>,

    /// JSON sport → category table; overrides OLYMPIC_CATEGORY_MAP
    #[arg(long, global = true, value_name = "PATH")]
    categories: Option<PathBuf>,

    /// Count a team medal once per athlete instead of once per team
    #[arg(long, global = true, default_value_t = false)]
    count_every_athlete: bool,

    #[command(flatten)]
    render: RenderArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct RenderArgs {
    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Table)]
    format: Format,

    /// Olympic season to look at
    #[arg(short, long, global = true, value_parser = parse_season, default_value = "summer")]
    season: Season,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Table,
    Json,
    Csv,
}

impl Format {
    fn layout(self) -> Layout {
        match self {
            Format::Csv => Layout::Csv,
            Format::Table | Format::Json => Layout::Grid,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum MedalFilter {
    Gold,
    Silver,
    Bronze,
    Any,
}

impl MedalFilter {
    fn medal(self) -> Option<Medal> {
        match self {
            MedalFilter::Gold => Some(Medal::Gold),
            MedalFilter::Silver => Some(Medal::Silver),
            MedalFilter::Bronze => Some(Medal::Bronze),
            MedalFilter::Any => None,
        }
    }
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Season athletes plus medal counts by country, sex and age
    Overview {
        /// Display table rows to print
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Medal history of one team
    Country {
        #[arg(value_name = "TEAM")]
        team: String,

        /// List the team's medallists in this sport
        #[arg(long)]
        sport: Option<String>,

        /// List the team's medallists in this year
        #[arg(long)]
        year: Option<i32>,

        /// Plot medals per year as a count or as a share of all medals
        #[arg(short, long, value_parser = parse_mode, default_value = "count")]
        mode: SeriesMode,
    },
    /// Compare the category profile of 2 to 5 teams
    Versus {
        #[arg(value_name = "TEAM", required = true, num_args = 1..)]
        teams: Vec<String>,

        /// Medal kind to count
        #[arg(long, value_enum, default_value_t = MedalFilter::Gold)]
        medal: MedalFilter,
    },
    /// Count medals grouped by one or more fields
    Table {
        /// Fields to group by, comma separated
        #[arg(long, value_delimiter = ',', value_parser = parse_field, default_value = "noc")]
        by: Vec<Field>,

        /// Field whose values become columns
        #[arg(long, value_parser = parse_field, default_value = "medal")]
        pivot: Field,

        /// Also write the table to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List teams with at least one medal
    Teams,
    /// Print the sport → category table
    Categories,
    /// Read commands from stdin, one per line, against a dataset loaded once
    Explore,
}

/// One line of explore mode. Flags left out fall back to the session's.
#[derive(Parser)]
#[command(no_binary_name = true)]
struct ExploreLine {
    #[arg(short, long, global = true, value_enum)]
    format: Option<Format>,

    #[arg(short, long, global = true, value_parser = parse_season)]
    season: Option<Season>,

    #[command(subcommand)]
    command: Commands,
}

impl ExploreLine {
    fn render_args(&self, defaults: &RenderArgs) -> RenderArgs {
        RenderArgs {
            format: self.format.unwrap_or(defaults.format),
            season: self.season.unwrap_or(defaults.season),
        }
    }
}

fn parse_season(s: &str) -> Result<Season, String> {
    s.parse()
}

fn parse_mode(s: &str) -> Result<SeriesMode, String> {
    s.parse()
}

fn parse_field(s: &str) -> Result<Field, String> {
    s.parse()
}

fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok(); // Load .env file

    let settings = Settings::from_env();
    let _log_guard = init_logging(&settings.log_file_path)?;

    let cli = Cli::parse();

    let data_path = cli.data.clone().unwrap_or_else(|| settings.data_path.clone());
    let categories = match cli.categories.as_ref().or(settings.category_map.as_ref()) {
        Some(path) => CategoryMap::load(path)?,
        None => CategoryMap::default(),
    };
    let dedupe = if cli.count_every_athlete {
        DedupePolicy::None
    } else {
        DedupePolicy::TeamMedals
    };
    info!(data = %data_path.display(), ?dedupe, "Starting");

    let pipeline = Pipeline::new(categories, dedupe);
    let mut source = CachedSource::new(data_path);

    match cli.command {
        Commands::Explore => explore(&mut source, &pipeline, &cli.render)?,
        command => {
            let stdout = std::io::stdout();
            if !run_pass(&mut stdout.lock(), &mut source, &pipeline, &cli.render, &command)? {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Logging setup: colored stderr + JSON rolling log file.
fn init_logging(log_file_path: &Path) -> Result<WorkerGuard> {
    let log_dir = log_file_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = log_file_path
        .file_name()
        .unwrap_or(OsStr::new("olympic_medals.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(guard)
}

/// Runs one rendering pass. Returns `Ok(false)` when the pass ended on a
/// user-facing condition that was already reported.
fn run_pass<W: Write>(
    out: &mut W,
    source: &mut CachedSource,
    pipeline: &Pipeline,
    render: &RenderArgs,
    command: &Commands,
) -> Result<bool> {
    let Err(e) = render_command(out, source, pipeline, render, command) else {
        return Ok(true);
    };
    let err = e.downcast::<DashboardError>()?;

    if let DashboardError::EmptyResult(what) = &err {
        info!(what = %what, "Empty result");
        writeln!(out, "{EMPTY_MESSAGE} ({what})")?;
        return Ok(true);
    }
    if err.is_warning() {
        warn!(error = %err, "Selection rejected");
        eprintln!("warning: {err}");
        return Ok(false);
    }
    if err.is_user_facing() {
        error!(error = %err, "Rendering pass failed");
        eprintln!("error: {err}");
        return Ok(false);
    }
    Err(err.into())
}

fn render_command<W: Write>(
    out: &mut W,
    source: &mut CachedSource,
    pipeline: &Pipeline,
    render: &RenderArgs,
    command: &Commands,
) -> Result<()> {
    let season = render.season;
    let json = matches!(render.format, Format::Json);
    let layout = render.format.layout();
    let text = layout == Layout::Grid;

    if let Commands::Categories = command {
        if json {
            return output::write_json(out, "categories", pipeline.categories());
        }
        return output::render_categories(out, pipeline.categories(), layout);
    }

    let records = source.records()?;
    let dashboard = Dashboard::new(records, pipeline);

    match command {
        Commands::Overview { limit } => {
            let overview = dashboard.overview(season);
            if json {
                return output::write_json(out, "overview", &overview);
            }
            if text {
                output::write_title(out, &format!("{} Games athletes", season.as_str()))?;
                output::render_records(out, &overview.records, *limit)?;
            }
            let sections = [
                ("Medals by country", &overview.by_country),
                ("Medals by sex", &overview.by_sex),
                ("Medals by age", &overview.by_age),
            ];
            for (i, (title, table)) in sections.into_iter().enumerate() {
                if text {
                    output::write_title(out, title)?;
                } else if i > 0 {
                    writeln!(out)?;
                }
                output::render_table(out, table, layout)?;
            }
        }
        Commands::Country {
            team,
            sport,
            year,
            mode,
        } => {
            let profile = dashboard.country_profile(team, season, sport.as_deref(), *year)?;
            if json {
                return output::write_json(out, "country", &profile);
            }
            if !text {
                output::render_table(out, &profile.medals, layout)?;
                writeln!(out)?;
                return output::render_series(out, &profile.series, *mode, layout);
            }
            output::write_title(out, &format!("{} medals", profile.team))?;
            output::render_table(out, &profile.medals, layout)?;
            output::write_title(out, "Medals per year")?;
            output::render_series(out, &profile.series, *mode, layout)?;
            writeln!(out)?;
            writeln!(out, "Sports: {}", profile.sports.join(", "))?;
            let years: Vec<String> = profile.years.iter().map(i32::to_string).collect();
            writeln!(out, "Years: {}", years.join(", "))?;
            if let Some(listing) = &profile.sport_athletes {
                output::write_title(out, &format!("Medallists in {}", listing.label))?;
                output::render_listing(out, listing)?;
            }
            if let Some(listing) = &profile.year_athletes {
                output::write_title(out, &format!("Medallists in {}", listing.label))?;
                output::render_listing(out, listing)?;
            }
        }
        Commands::Versus { teams, medal } => {
            let comparison = dashboard.versus(teams, season, medal.medal())?;
            if json {
                return output::write_json(out, "versus", &comparison);
            }
            if text {
                output::write_title(out, "Share of medals by category")?;
            }
            output::render_comparison(out, &comparison, layout)?;
        }
        Commands::Table {
            by,
            pivot,
            output: csv_path,
        } => {
            let table = dashboard.table(season, by, *pivot);
            if let Some(path) = csv_path {
                output::write_table_csv(path, &table)?;
                info!(path = %path.display(), "Table written");
            }
            if json {
                return output::write_json(out, "table", &table);
            }
            output::render_table(out, &table, layout)?;
        }
        Commands::Teams => {
            let teams = dashboard.teams(season);
            if json {
                return output::write_json(out, "teams", &teams);
            }
            output::render_list(out, "Team", &teams, layout)?;
        }
        Commands::Categories | Commands::Explore => {}
    }

    Ok(())
}

/// Interactive loop: each stdin line is one rendering pass. Failures end the
/// pass, never the loop.
fn explore(source: &mut CachedSource, pipeline: &Pipeline, defaults: &RenderArgs) -> Result<()> {
    info!(path = %source.path().display(), "Explore mode; type 'help' or 'quit'");

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        match line {
            "" => continue,
            "quit" | "exit" => break,
            _ => {}
        }

        let words = split_words(line);
        let parsed = match ExploreLine::try_parse_from(&words) {
            Ok(parsed) => parsed,
            Err(e) => {
                // clap renders help and usage errors itself
                let _ = e.print();
                continue;
            }
        };

        if let Commands::Explore = parsed.command {
            warn!("Already exploring");
            continue;
        }

        let render = parsed.render_args(defaults);

        debug!(line, "Explore pass");
        let stdout = std::io::stdout();
        if let Err(e) = run_pass(&mut stdout.lock(), source, pipeline, &render, &parsed.command) {
            error!(error = %e, "Explore pass failed");
            eprintln!("error: {e:#}");
        }
    }

    Ok(())
}

/// Splits a line on whitespace, keeping double-quoted runs together.
fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => quoted = !quoted,
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}
