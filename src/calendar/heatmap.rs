//! A single draw pass over the heatmap, computed as plain data for a renderer
//! to paint

use super::grid::{date_to_cell, CellCoordinate, GridExtent};
use super::outline::{trace_month, MonthOutline};
use super::range::{DateRange, InvalidRangeError};
use super::scale::{color_for, Palette, QuantileScale};
use super::season::{easter, easter_ceiling, Season};
use super::values::DayValues;
use ratatui::style::Color;
use time::{Date, Month};

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub(crate) enum DrawMode {
    /// Draw day cells and month outlines
    #[default]
    Focus,
    /// Draw only the labels and markers around the grid
    Context,
}

/// A labeled span of dates drawn as a bracket beside the seasons it covers
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Period {
    label: String,
    range: DateRange,
}

impl Period {
    pub(crate) fn new<S: Into<String>>(
        label: S,
        start: Date,
        end: Date,
    ) -> Result<Period, InvalidRangeError> {
        Ok(Period {
            label: label.into(),
            range: DateRange::new(start, end)?,
        })
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn range(&self) -> DateRange {
        self.range
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct DayCell {
    pub(crate) cell: CellCoordinate,
    pub(crate) color: Color,
}

/// Everything to draw for one season of the grid
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SeasonBand {
    /// Position of the season counting down from the top of the grid
    pub(crate) index: u16,
    pub(crate) season: Season,
    pub(crate) cells: Vec<DayCell>,
    pub(crate) outlines: Vec<MonthOutline>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct PeriodMarker {
    pub(crate) label: String,
    /// Index of the first season the period touches
    pub(crate) first_season: u16,
    /// Index of the last season the period touches
    pub(crate) last_season: u16,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct AxisLabel {
    pub(crate) month: Month,
    pub(crate) column: u16,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Heatmap<'a> {
    values: &'a DayValues,
    periods: &'a [Period],
    extent: GridExtent,
    scale: QuantileScale,
    mode: DrawMode,
    focus: Option<Date>,
    selection: Option<DateRange>,
}

impl<'a> Heatmap<'a> {
    pub(crate) fn new(values: &'a DayValues, extent: GridExtent) -> Heatmap<'a> {
        let scale = QuantileScale::new(values.values());
        tracing::trace!(
            values = values.len(),
            seasons = extent.season_qty(),
            "Built heatmap color scale"
        );
        Heatmap {
            values,
            periods: &[],
            extent,
            scale,
            mode: DrawMode::default(),
            focus: None,
            selection: None,
        }
    }

    pub(crate) fn periods(mut self, periods: &'a [Period]) -> Self {
        self.periods = periods;
        self
    }

    pub(crate) fn mode(mut self, mode: DrawMode) -> Self {
        self.mode = mode;
        self
    }

    pub(crate) fn focus(mut self, focus: Option<Date>) -> Self {
        self.focus = focus;
        self
    }

    /// Days outside `selection` are drawn with the muted palette
    pub(crate) fn selection(mut self, selection: Option<DateRange>) -> Self {
        self.selection = selection;
        self
    }

    pub(crate) fn extent(&self) -> &GridExtent {
        &self.extent
    }

    /// Iterates over the bands of the seasons on the grid, starting with the
    /// one at index `start`
    pub(crate) fn seasons_from(&self, start: u16) -> impl Iterator<Item = SeasonBand> + '_ {
        self.extent
            .seasons()
            .skip(start.into())
            .map(move |(index, season)| self.band(index, season))
    }

    fn band(&self, index: u16, season: Season) -> SeasonBand {
        let (cells, outlines) = match self.mode {
            DrawMode::Focus => (self.day_cells(season), self.month_outlines(season)),
            DrawMode::Context => (Vec::new(), Vec::new()),
        };
        SeasonBand {
            index,
            season,
            cells,
            outlines,
        }
    }

    fn day_cells(&self, season: Season) -> Vec<DayCell> {
        season
            .days()
            .filter(|&date| self.extent.contains(date))
            .filter_map(|date| {
                let cell = date_to_cell(date, season)?;
                Some(DayCell {
                    cell,
                    color: color_for(date, self.values, &self.scale, self.palette_for(date)),
                })
            })
            .collect()
    }

    fn month_outlines(&self, season: Season) -> Vec<MonthOutline> {
        let range = self.extent.range();
        season
            .months()
            .filter_map(|span| range.clip(span.start, span.end))
            .map(|r| {
                trace_month(r.start(), r.end(), season)
                    .expect("clipped month should lie within its season")
            })
            .collect()
    }

    fn palette_for(&self, date: Date) -> Palette {
        match self.selection {
            Some(sel) if !sel.contains(date) => Palette::Muted,
            _ => Palette::Normal,
        }
    }

    /// Returns the season index and cell of the focused date, if it is in a
    /// season on the grid
    pub(crate) fn focus_marker(&self) -> Option<(u16, CellCoordinate)> {
        self.focus.and_then(|date| self.extent.locate(date))
    }

    /// Returns a marker for each period that overlaps the extent, clamped to
    /// the seasons on the grid
    pub(crate) fn period_markers(&self) -> Vec<PeriodMarker> {
        let first_year = self.extent.first_season().year();
        let last_year = self.extent.last_season().year();
        self.periods
            .iter()
            .filter_map(|p| {
                let range = p.range();
                self.extent.range().clip(range.start(), range.end())?;
                // Seasons that cannot be computed lie beyond the extent.
                let first = easter(range.start())
                    .map_or(first_year, |d| d.year())
                    .max(first_year);
                let last = easter_ceiling(range.end())
                    .map_or(last_year, |d| d.year() - 1)
                    .min(last_year);
                Some(PeriodMarker {
                    label: p.label().to_owned(),
                    first_season: u16::try_from(first - first_year).ok()?,
                    last_season: u16::try_from(last - first_year).ok()?,
                })
            })
            .collect()
    }

    /// Returns the months of the season at `season_index`, each paired with
    /// the week column in which it begins
    pub(crate) fn axis_labels(&self, season_index: u16) -> Vec<AxisLabel> {
        let Some((_, season)) = self.extent.seasons().nth(season_index.into()) else {
            return Vec::new();
        };
        season
            .months()
            .filter_map(|span| {
                let cell = date_to_cell(span.start, season)?;
                Some(AxisLabel {
                    month: span.month(),
                    column: cell.week_column,
                })
            })
            .collect()
    }

    /// Returns the season index of `date` and the week column at which its
    /// month begins within that season, for placing a caption beneath the
    /// month
    pub(crate) fn tooltip_position(&self, date: Date) -> Option<(u16, u16)> {
        let (index, _) = self.extent.locate(date)?;
        let season = Season::containing(date).ok()?;
        let span = season
            .months()
            .find(|span| span.start <= date && date <= span.end)?;
        let cell = date_to_cell(span.start, season)?;
        Some((index, cell.week_column))
    }
}
