mod app;
mod calendar;
mod data;
mod help;
mod theme;
use crate::app::App;
use crate::calendar::{DateRange, GridExtent, GridLayout, InvalidRangeError};
use crate::data::{read_day_values, read_periods, YMD_FMT};
use anyhow::Context;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use time::{Date, OffsetDateTime};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run(RunOptions),
    Help,
    Version,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct RunOptions {
    values: PathBuf,
    periods: Option<PathBuf>,
    from: Option<Date>,
    to: Option<Date>,
    focus: Option<Date>,
    select: Option<DateRange>,
    log_file: Option<PathBuf>,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut values = None;
        let mut opts = RunOptions::default();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Long("periods") => opts.periods = Some(PathBuf::from(parser.value()?)),
                Arg::Long("from") => opts.from = Some(parser.value()?.parse_with(parse_ymd)?),
                Arg::Long("to") => opts.to = Some(parser.value()?.parse_with(parse_ymd)?),
                Arg::Long("focus") => opts.focus = Some(parser.value()?.parse_with(parse_ymd)?),
                Arg::Long("select") => {
                    opts.select = Some(parser.value()?.parse_with(parse_selection)?);
                }
                Arg::Long("log-file") => opts.log_file = Some(PathBuf::from(parser.value()?)),
                Arg::Value(value) if values.is_none() => values = Some(PathBuf::from(value)),
                _ => return Err(arg.unexpected()),
            }
        }
        opts.values = values.ok_or_else(|| lexopt::Error::from("missing <values.csv> argument"))?;
        Ok(Command::Run(opts))
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run(opts) => opts.run(),
            Command::Help => {
                println!("Usage: paschal [options] <values.csv>");
                println!();
                println!("Terminal heatmap calendar whose years run from Easter to Easter");
                println!();
                println!("The values file is a CSV document with \"date\" and \"value\" columns.");
                println!();
                println!("Options:");
                println!("  --periods <file>           Mark the periods in the given CSV file, which");
                println!("                             has \"label\", \"start_date\", and \"end_date\"");
                println!("                             columns");
                println!("  --from <YYYY-MM-DD>        First date to show [default: first date with a value]");
                println!("  --to <YYYY-MM-DD>          Last date to show [default: last date with a value]");
                println!("  --focus <YYYY-MM-DD>       Start with the given date focused");
                println!("  --select <START>..<END>    Mute the colors of days outside the given range");
                println!("  --log-file <path>          Write a log of events to the given file");
                println!("  -h, --help                 Display this help message and exit");
                println!("  -V, --version              Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

impl RunOptions {
    fn run(self) -> anyhow::Result<()> {
        if let Some(path) = &self.log_file {
            init_logging(path)?;
        }
        let today = OffsetDateTime::now_local()
            .context("failed to determine local date")?
            .date();
        let values = File::open(&self.values)
            .map_err(anyhow::Error::from)
            .and_then(|fp| Ok(read_day_values(fp)?))
            .with_context(|| format!("failed to read values from {}", self.values.display()))?;
        let periods = match &self.periods {
            Some(path) => File::open(path)
                .map_err(anyhow::Error::from)
                .and_then(|fp| Ok(read_periods(fp)?))
                .with_context(|| format!("failed to read periods from {}", path.display()))?,
            None => Vec::new(),
        };
        if values.is_empty() {
            tracing::warn!(path = %self.values.display(), "No values loaded");
        }
        let lo = self.from.or(values.first_date()).unwrap_or(today);
        let hi = self.to.or(values.last_date()).unwrap_or(today);
        let extent = GridExtent::new(lo, hi).context("invalid range of dates to show")?;
        let layout = GridLayout::default();
        tracing::info!(
            %lo,
            %hi,
            seasons = extent.season_qty(),
            first_season = extent.first_season().year(),
            width = extent.width(&layout),
            height = extent.height(&layout),
            "Resolved grid extent"
        );
        let mut app = App::new(values, extent, today)
            .periods(periods)
            .selection(self.select);
        if let Some(date) = self.focus {
            app = app.start_date(date);
        }
        with_terminal(|terminal| {
            terminal.hide_cursor().context("failed to hide cursor")?;
            app.run(terminal)?;
            Ok(())
        })
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn parse_ymd(s: &str) -> Result<Date, time::error::Parse> {
    Date::parse(s, &YMD_FMT)
}

fn parse_selection(s: &str) -> Result<DateRange, SelectionError> {
    let (start, end) = s.split_once("..").ok_or(SelectionError::Syntax)?;
    Ok(DateRange::new(parse_ymd(start)?, parse_ymd(end)?)?)
}

#[derive(Debug, Error)]
enum SelectionError {
    #[error("expected a range of the form YYYY-MM-DD..YYYY-MM-DD")]
    Syntax,
    #[error(transparent)]
    Date(#[from] time::error::Parse),
    #[error(transparent)]
    Range(#[from] InvalidRangeError),
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to install logger")
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(&mut DefaultTerminal) -> anyhow::Result<T>,
{
    let mut terminal = ratatui::init();
    let r = crossterm::execute!(io::stdout(), EnableMouseCapture)
        .context("failed to enable mouse capture")
        .and_then(|()| func(&mut terminal));
    // Best effort: the terminal is being torn down either way.
    let _ = crossterm::execute!(io::stdout(), DisableMouseCapture);
    ratatui::restore();
    r
}
