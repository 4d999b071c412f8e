//! Reading the per-day values and the periods from CSV
use crate::calendar::{DayValues, InvalidRangeError, Period};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use std::io::Read;
use thiserror::Error;
use time::{format_description::FormatItem, macros::format_description, Date};

pub(crate) static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

#[derive(Clone, Debug, Deserialize, PartialEq)]
struct ValueRecord {
    date: String,
    value: f64,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
struct PeriodRecord {
    label: String,
    start_date: String,
    end_date: String,
}

/// Reads a CSV document with `date` and `value` columns
pub(crate) fn read_day_values<R: Read>(reader: R) -> Result<DayValues, LoadError> {
    let mut values = DayValues::new();
    for_each_record(reader, |line, ValueRecord { date, value }| {
        let date = parse_date(line, &date)?;
        if values.insert(date, value).is_some() {
            return Err(LoadError::Duplicate { line, date });
        }
        Ok(())
    })?;
    tracing::debug!(
        days = values.len(),
        first = ?values.first_date(),
        last = ?values.last_date(),
        "Loaded day values"
    );
    Ok(values)
}

/// Reads a CSV document with `label`, `start_date`, and `end_date` columns
pub(crate) fn read_periods<R: Read>(reader: R) -> Result<Vec<Period>, LoadError> {
    let mut periods = Vec::new();
    for_each_record(reader, |line, rec: PeriodRecord| {
        let start = parse_date(line, &rec.start_date)?;
        let end = parse_date(line, &rec.end_date)?;
        let period = Period::new(rec.label.as_str(), start, end).map_err(|source| {
            LoadError::Period {
                line,
                label: rec.label,
                source,
            }
        })?;
        periods.push(period);
        Ok(())
    })?;
    tracing::debug!(periods = periods.len(), "Loaded periods");
    Ok(periods)
}

fn for_each_record<R, T, F>(reader: R, mut func: F) -> Result<(), LoadError>
where
    R: Read,
    T: for<'de> Deserialize<'de>,
    F: FnMut(u64, T) -> Result<(), LoadError>,
{
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = reader.headers()?.clone();
    let mut raw = StringRecord::new();
    while reader.read_record(&mut raw)? {
        let line = raw.position().map_or(0, csv::Position::line);
        func(line, raw.deserialize(Some(&headers))?)?;
    }
    Ok(())
}

fn parse_date(line: u64, value: &str) -> Result<Date, LoadError> {
    Date::parse(value, &YMD_FMT).map_err(|source| LoadError::Date {
        line,
        value: value.to_owned(),
        source,
    })
}

#[derive(Debug, Error)]
pub(crate) enum LoadError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("line {line}: invalid date {value:?}")]
    Date {
        line: u64,
        value: String,
        source: time::error::Parse,
    },
    #[error("line {line}: more than one value for {date}")]
    Duplicate { line: u64, date: Date },
    #[error("line {line}: invalid period {label:?}")]
    Period {
        line: u64,
        label: String,
        source: InvalidRangeError,
    },
}
