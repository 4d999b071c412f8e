//! Easter-to-Easter "seasons", the unit into which the calendar is divided in
//! place of the civil year

use std::iter::successors;
use thiserror::Error;
use time::{Date, Month};

/// Earliest year for which Easter is computed
pub(crate) const MIN_YEAR: i32 = 1;

/// Latest year for which Easter is computed
pub(crate) const MAX_YEAR: i32 = 9999;

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("year {0} is outside the supported range {min}..={max}", min = MIN_YEAR, max = MAX_YEAR)]
pub(crate) struct RangeError(pub(crate) i32);

/// Returns the date of (Western) Easter Sunday in the given year of the
/// proleptic Gregorian calendar
pub(crate) fn easter_for_year(year: i32) -> Result<Date, RangeError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(RangeError(year));
    }
    // Anonymous Gregorian algorithm (Meeus/Jones/Butcher)
    let a = year % 19;
    let (b, c) = (year / 100, year % 100);
    let (d, e) = (b / 4, b % 4);
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let (i, k) = (c / 4, c % 4);
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let n = h + l - 7 * m + 114;
    let month = if n / 31 == 3 {
        Month::March
    } else {
        Month::April
    };
    let day = u8::try_from(n % 31 + 1).expect("day of month should fit in a u8");
    Ok(Date::from_calendar_date(year, month, day).expect("Easter should be a valid date"))
}

/// Returns the anchor of the season containing `date`
pub(crate) fn easter(date: Date) -> Result<Date, RangeError> {
    let this_year = easter_for_year(date.year())?;
    if date >= this_year {
        Ok(this_year)
    } else {
        easter_for_year(date.year() - 1)
    }
}

/// Returns the anchor of the season after the one containing `date`
pub(crate) fn easter_ceiling(date: Date) -> Result<Date, RangeError> {
    let this_year = easter_for_year(date.year())?;
    if date >= this_year {
        easter_for_year(date.year() + 1)
    } else {
        Ok(this_year)
    }
}

/// The span of days from one Easter Sunday (inclusive) to the next
/// (exclusive)
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct Season {
    anchor: Date,
    // The following season's anchor
    end: Date,
}

impl Season {
    /// Returns the season beginning on Easter of the given year
    pub(crate) fn for_year(year: i32) -> Result<Season, RangeError> {
        let anchor = easter_for_year(year)?;
        let end = easter_for_year(year + 1)?;
        Ok(Season { anchor, end })
    }

    pub(crate) fn containing(date: Date) -> Result<Season, RangeError> {
        Season::for_year(easter(date)?.year())
    }

    /// Easter Sunday on which the season begins
    pub(crate) fn anchor(&self) -> Date {
        self.anchor
    }

    /// The first day of the following season
    pub(crate) fn end(&self) -> Date {
        self.end
    }

    pub(crate) fn last_day(&self) -> Date {
        self.end
            .previous_day()
            .expect("Easter should never be the first day of time")
    }

    pub(crate) fn year(&self) -> i32 {
        self.anchor.year()
    }

    pub(crate) fn next(&self) -> Result<Season, RangeError> {
        Season::for_year(self.year() + 1)
    }

    pub(crate) fn contains(&self, date: Date) -> bool {
        self.anchor <= date && date < self.end
    }

    pub(crate) fn days(&self) -> impl Iterator<Item = Date> {
        let last = self.last_day();
        successors(Some(self.anchor), move |&d| d.next_day().filter(|&d| d <= last))
    }

    /// Iterates over the portions of the calendar months that fall within the
    /// season, so that the first span starts on the anchor and the last ends
    /// on the day before the next anchor
    pub(crate) fn months(&self) -> impl Iterator<Item = MonthSpan> {
        let last = self.last_day();
        successors(Some(self.anchor), move |&start| {
            month_end(start).next_day().filter(|&d| d <= last)
        })
        .map(move |start| MonthSpan {
            start,
            end: month_end(start).min(last),
        })
    }

    /// Returns the years spanned by the season in the form "1692-3",
    /// "1699-700", or "1999-2000", eliding the leading digits the two years
    /// have in common
    pub(crate) fn label(&self) -> String {
        let first = format!("{:04}", self.year());
        let second = format!("{:04}", self.year() + 1);
        let common = first
            .bytes()
            .zip(second.bytes())
            .take_while(|(a, b)| a == b)
            .count();
        format!("{first}-{}", &second[common..])
    }
}

/// An inclusive run of days belonging to a single calendar month
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct MonthSpan {
    pub(crate) start: Date,
    pub(crate) end: Date,
}

impl MonthSpan {
    pub(crate) fn month(&self) -> Month {
        self.start.month()
    }
}

/// Returns the last day of the month containing `date`
fn month_end(date: Date) -> Date {
    let end = match date.month() {
        Month::December => date.replace_day(31).ok(),
        m => Date::from_calendar_date(date.year(), m.next(), 1)
            .ok()
            .and_then(Date::previous_day),
    };
    end.expect("every month should have a last day")
}
