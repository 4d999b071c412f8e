//! Conversion between dates, grid cells, and pixel positions.
//!
//! Each season is drawn as a band of seven rows, one per weekday starting
//! with Sunday, and one column per week, the first column being the week of
//! the season's anchor.  Bands are stacked vertically with a two-row gutter
//! between consecutive seasons.

use super::range::{DateRange, InvalidRangeError};
use super::season::{easter, easter_ceiling, RangeError, Season};
use std::iter::successors;
use thiserror::Error;
use time::{Date, Duration};

pub(crate) const DAYS_IN_WEEK: i32 = 7;

/// Number of cell-heights taken up by each season: seven weekday rows plus
/// the gutter
pub(crate) const SEASON_ROWS: i32 = 9;

/// Width and height of a cell in pixels
pub(crate) const CELL_SIZE: i32 = 8;

pub(crate) const MARGINS: Margins = Margins {
    top: 30,
    right: 5,
    bottom: 10,
    left: 25,
};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct Margins {
    pub(crate) top: i32,
    pub(crate) right: i32,
    pub(crate) bottom: i32,
    pub(crate) left: i32,
}

/// Pixel dimensions of the grid.  A layout is passed to every computation
/// that needs one rather than being stored anywhere.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct GridLayout {
    pub(crate) cell_size: i32,
    pub(crate) margins: Margins,
}

impl GridLayout {
    /// Vertical distance in pixels between the tops of consecutive seasons
    pub(crate) fn season_pitch(&self) -> i32 {
        self.cell_size * SEASON_ROWS
    }

    /// Total height in pixels of a grid showing `season_qty` seasons
    pub(crate) fn height(&self, season_qty: u16) -> i32 {
        self.margins.top + self.margins.bottom + i32::from(season_qty) * self.season_pitch()
    }

    /// Total width in pixels of a grid whose longest season spans `weeks`
    /// columns
    pub(crate) fn width(&self, weeks: u16) -> i32 {
        self.margins.left + self.margins.right + i32::from(weeks) * self.cell_size
    }
}

impl Default for GridLayout {
    fn default() -> GridLayout {
        GridLayout {
            cell_size: CELL_SIZE,
            margins: MARGINS,
        }
    }
}

/// Position of a day's cell within its season's band
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub(crate) struct CellCoordinate {
    pub(crate) week_column: u16,
    /// 0 = Sunday, 6 = Saturday
    pub(crate) weekday_row: u8,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct Point {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

impl Point {
    pub(crate) fn new(x: i32, y: i32) -> Point {
        Point { x, y }
    }
}

/// Returns the cell of `date` within `season`, or `None` if `date` is not in
/// `season`
pub(crate) fn date_to_cell(date: Date, season: Season) -> Option<CellCoordinate> {
    if !season.contains(date) {
        return None;
    }
    let weekday_row = date.weekday().number_days_from_sunday();
    let sunday = date - Duration::days(weekday_row.into());
    // Easter is always a Sunday, so the anchor begins the first column.
    let week_column = u16::try_from((sunday - season.anchor()).whole_weeks()).ok()?;
    Some(CellCoordinate {
        week_column,
        weekday_row,
    })
}

/// Returns the pixel position of the top-left corner of `cell` in the season
/// drawn `season_index` bands below the top of the grid
pub(crate) fn cell_to_pixel(season_index: u16, cell: CellCoordinate, layout: &GridLayout) -> Point {
    Point {
        x: layout.margins.left + i32::from(cell.week_column) * layout.cell_size,
        y: layout.margins.top
            + i32::from(season_index) * layout.season_pitch()
            + i32::from(cell.weekday_row) * layout.cell_size,
    }
}

/// Returns the date whose cell contains `point`, or `None` if `point` lies in
/// a margin, in the gutter between seasons, past the end of a season, or on a
/// date outside `extent`
pub(crate) fn pixel_to_date(point: Point, extent: &GridExtent, layout: &GridLayout) -> Option<Date> {
    let Margins { top, left, .. } = layout.margins;
    if point.y < top || point.x < left {
        return None;
    }
    let season_offset = (point.y - top) / layout.season_pitch();
    let week_offset = (point.x - left) / layout.cell_size;
    let weekday_offset = (point.y - top) / layout.cell_size % SEASON_ROWS;
    if weekday_offset >= DAYS_IN_WEEK {
        return None;
    }
    let season = Season::for_year(extent.first_season().year().checked_add(season_offset)?).ok()?;
    let date = season
        .anchor()
        .checked_add(Duration::weeks(week_offset.into()))?
        .checked_add(Duration::days(weekday_offset.into()))?;
    (season.contains(date) && extent.contains(date)).then_some(date)
}

/// The span of dates to display, along with the seasons it touches
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct GridExtent {
    range: DateRange,
    first: Season,
    last: Season,
}

impl GridExtent {
    pub(crate) fn new(lo: Date, hi: Date) -> Result<GridExtent, ExtentError> {
        let range = DateRange::new(lo, hi)?;
        let first = Season::for_year(easter(lo)?.year())?;
        // The season containing `hi` is the one before its ceiling.
        let last = Season::for_year(easter_ceiling(hi)?.year() - 1)?;
        Ok(GridExtent { range, first, last })
    }

    pub(crate) fn range(&self) -> DateRange {
        self.range
    }

    pub(crate) fn lo(&self) -> Date {
        self.range.start()
    }

    pub(crate) fn hi(&self) -> Date {
        self.range.end()
    }

    pub(crate) fn contains(&self, date: Date) -> bool {
        self.range.contains(date)
    }

    /// The season containing `lo`, drawn at the top of the grid
    pub(crate) fn first_season(&self) -> Season {
        self.first
    }

    /// The season containing `hi`, drawn at the bottom of the grid
    pub(crate) fn last_season(&self) -> Season {
        self.last
    }

    pub(crate) fn season_qty(&self) -> u16 {
        u16::try_from(self.last.year() - self.first.year() + 1)
            .expect("number of seasons should fit in a u16")
    }

    /// Returns the position of `season` counting down from the top of the
    /// grid, or `None` if the extent does not touch `season`
    pub(crate) fn season_index(&self, season: Season) -> Option<u16> {
        if season < self.first || season > self.last {
            return None;
        }
        u16::try_from(season.year() - self.first.year()).ok()
    }

    /// Iterates over the seasons the extent touches, paired with their
    /// indices
    pub(crate) fn seasons(&self) -> impl Iterator<Item = (u16, Season)> {
        let last = self.last;
        let seasons = successors(Some(self.first), move |s| {
            s.next().ok().filter(|&n| n <= last)
        });
        (0u16..).zip(seasons)
    }

    /// Returns the index of the season containing `date` and the date's cell
    /// within it
    pub(crate) fn locate(&self, date: Date) -> Option<(u16, CellCoordinate)> {
        let season = Season::containing(date).ok()?;
        let index = self.season_index(season)?;
        Some((index, date_to_cell(date, season)?))
    }

    /// Height in pixels of the whole grid, margins included
    pub(crate) fn height(&self, layout: &GridLayout) -> i32 {
        layout.height(self.season_qty())
    }

    /// Width in pixels of the whole grid, margins included
    pub(crate) fn width(&self, layout: &GridLayout) -> i32 {
        let weeks = self
            .seasons()
            .filter_map(|(_, s)| date_to_cell(s.last_day(), s))
            .map(|cell| cell.week_column + 1)
            .max()
            .unwrap_or_default();
        layout.width(weeks)
    }
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub(crate) enum ExtentError {
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error(transparent)]
    InvalidRange(#[from] InvalidRangeError),
}
