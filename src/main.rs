// Calendar grid command line
// Renders a JSON list of records into a JSON calendar grid

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use clap::Parser;

use calendar_grid::models::range::Granularity;
use calendar_grid::services::settings::SettingsService;
use calendar_grid::{CalendarRenderer, RRuleExpander, RawRecord};

#[derive(Parser, Debug)]
#[command(
    name = "calendar-grid",
    version,
    about = "Lay out calendar events as year, month, week or day grids"
)]
struct Cli {
    /// JSON array of records; reads stdin when omitted or "-"
    #[arg(short, long)]
    events: Option<PathBuf>,

    /// Settings file, defaults to calendar.toml in the config directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured calendar type
    #[arg(short = 't', long = "type")]
    calendar_type: Option<Granularity>,

    /// Date argument, e.g. 2025, 2025-04, 202514 or 2025-04-10
    #[arg(short, long)]
    date: Option<String>,

    /// Reference day for past/today/future styling (YYYY-MM-DD)
    #[arg(long, value_parser = parse_today)]
    today: Option<NaiveDate>,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,
}

fn parse_today(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| anyhow!("invalid date {:?}: {}", value, e))
}

fn read_records(path: Option<&PathBuf>) -> Result<Vec<RawRecord>> {
    let text = match path.filter(|p| p.as_os_str() != "-") {
        Some(path) => fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).context("Failed to read records from stdin")?;
            text
        }
    };
    serde_json::from_str(&text).context("Records are not a valid JSON array")
}

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let cli = Cli::parse();

    let service = SettingsService::new(cli.config.as_deref());
    let mut settings = service.load().context("Failed to load settings")?;
    if let Some(calendar_type) = cli.calendar_type {
        settings.calendar_type = calendar_type;
    }

    let records = read_records(cli.events.as_ref())?;
    log::info!("Read {} records", records.len());

    let today = cli.today.unwrap_or_else(|| Local::now().date_naive());
    let expander = RRuleExpander::new();
    let output = CalendarRenderer::new(&settings, &expander).render(&records, cli.date.as_deref(), today);

    for message in &output.messages {
        eprintln!("{}", message);
    }

    let json = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", json)?;
    Ok(())
}
