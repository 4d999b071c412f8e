use super::grid::{
    cell_to_pixel, pixel_to_date, CellCoordinate, GridExtent, GridLayout, Point,
};
use super::heatmap::{AxisLabel, DayCell, Heatmap, PeriodMarker};
use super::outline::MonthOutline;
use crate::theme::{
    BACKGROUND, FOCUS_STYLE, FOCUS_SYMBOL, MONTH_STYLE, OUTLINE_COLOR, PERIOD_STYLE,
    SEASON_STYLE, TOOLTIP_STYLE,
};
use ratatui::{
    buffer::{Buffer, Cell},
    layout::{Position, Rect},
    style::Style,
    symbols::Marker,
    text::Text,
    widgets::{
        canvas::{self, Canvas},
        Paragraph, StatefulWidget, Widget,
    },
};
use thiserror::Error;
use time::{format_description::FormatItem, macros::format_description, Date};

static TOOLTIP_FMT: &[FormatItem<'_>] =
    format_description!("[weekday repr:short] [day padding:space] [month repr:short] [year]");

/// Number of columns on the left side of the grid, used as the margin in
/// which each season's years are written
const LABEL_WIDTH: u16 = 10;

/// Number of lines above the grid, used for the month names
const HEADER_LINES: u16 = 1;

/// Number of lines taken up by each season: one per weekday, plus the gutter
const BAND_LINES: u16 = 9;

const WEEKDAY_LINES: u16 = 7;

/// Line within a season's band on which its label is written
const LABEL_LINE: u16 = 3;

/// Columns between the left edge of the grid and the period brackets
const PERIOD_COLUMN: u16 = 59;

const ACS_HLINE: char = '─';
const ACS_VLINE: char = '│';
const ACS_TTEE: char = '┬';
const ACS_LRCORNER: char = '┘';

/// Scroll position of the grid and where it was last drawn, for mapping
/// terminal positions back to dates
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct ViewState {
    /// Index of the season at the top of the grid
    scroll: u16,
    /// Terminal position of the top-left cell of the topmost season
    origin: Position,
    /// Number of seasons whose weekday rows were all drawn
    visible: u16,
}

impl ViewState {
    pub(crate) fn new() -> ViewState {
        ViewState::default()
    }

    pub(crate) fn scroll(&self) -> u16 {
        self.scroll
    }

    /// Number of seasons to scroll by for one page
    pub(crate) fn page_size(&self) -> u16 {
        self.visible.max(1)
    }

    pub(crate) fn scroll_forwards(
        &mut self,
        seasons: u16,
        season_qty: u16,
    ) -> Result<(), EdgeOfGridError> {
        let max = season_qty.saturating_sub(self.page_size());
        if self.scroll >= max {
            return Err(EdgeOfGridError);
        }
        self.scroll = self.scroll.saturating_add(seasons).min(max);
        Ok(())
    }

    pub(crate) fn scroll_backwards(&mut self, seasons: u16) -> Result<(), EdgeOfGridError> {
        if self.scroll == 0 {
            return Err(EdgeOfGridError);
        }
        self.scroll = self.scroll.saturating_sub(seasons);
        Ok(())
    }

    /// Scrolls as little as possible so that the season at `index` is fully
    /// drawn
    pub(crate) fn reveal(&mut self, index: u16) {
        if index < self.scroll {
            self.scroll = index;
        } else if index >= self.scroll.saturating_add(self.page_size()) {
            self.scroll = index + 1 - self.page_size();
        }
    }

    /// Returns the pixel at the center of the grid cell drawn at the given
    /// terminal position, or `None` if the position is above or left of the
    /// grid
    pub(crate) fn point_at(&self, column: u16, row: u16, layout: &GridLayout) -> Option<Point> {
        let week_column = column.checked_sub(self.origin.x)?;
        let line = row.checked_sub(self.origin.y)?;
        let season_index = self.scroll.checked_add(line / BAND_LINES)?;
        // Gutter lines become rows 7 and 8, which no date occupies.
        let weekday_row = u8::try_from(line % BAND_LINES).ok()?;
        let corner = cell_to_pixel(
            season_index,
            CellCoordinate {
                week_column,
                weekday_row,
            },
            layout,
        );
        let half = layout.cell_size / 2;
        Some(Point::new(corner.x + half, corner.y + half))
    }

    /// Returns the date drawn at the given terminal position, if any
    pub(crate) fn date_at(
        &self,
        column: u16,
        row: u16,
        extent: &GridExtent,
        layout: &GridLayout,
    ) -> Option<Date> {
        let point = self.point_at(column, row, layout);
        let date = point.and_then(|p| pixel_to_date(p, extent, layout));
        tracing::trace!(column, row, ?point, ?date, "Hit-tested pointer");
        date
    }
}

#[derive(Copy, Clone, Debug, Eq, Error, PartialEq)]
#[error("reached the edge of the grid")]
pub(crate) struct EdgeOfGridError;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Calendar<'a> {
    heatmap: Heatmap<'a>,
    hover: Option<Date>,
}

impl<'a> Calendar<'a> {
    pub(crate) fn new(heatmap: Heatmap<'a>) -> Calendar<'a> {
        Calendar {
            heatmap,
            hover: None,
        }
    }

    /// Caption the month of `date` with the date itself
    pub(crate) fn hover(mut self, date: Option<Date>) -> Self {
        self.hover = date;
        self
    }
}

impl StatefulWidget for Calendar<'_> {
    type State = ViewState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let season_qty = self.heatmap.extent().season_qty();
        state.scroll = state.scroll.min(season_qty.saturating_sub(1));
        let grid_lines = area.height.saturating_sub(HEADER_LINES);
        // The last season need not have room for its gutter.
        state.visible = (grid_lines + (BAND_LINES - WEEKDAY_LINES)) / BAND_LINES;
        state.origin = Position::new(area.x + LABEL_WIDTH, area.y + HEADER_LINES);
        let drawn = grid_lines.div_ceil(BAND_LINES);
        let scroll = state.scroll;
        let mut canvas = BufferCanvas::new(area, buf);
        canvas.draw_axis(&self.heatmap.axis_labels(scroll));
        for band in self.heatmap.seasons_from(scroll).take(drawn.into()) {
            let top = HEADER_LINES + (band.index - scroll) * BAND_LINES;
            canvas.draw_outlines(top, &band.outlines);
            canvas.draw_cells(top, &band.cells);
            canvas.draw_season_label(top, &band.season.label());
        }
        if let Some((index, cell)) = self.heatmap.focus_marker() {
            if let Some(y) = band_top(index, scroll)
                .and_then(|top| top.checked_add(u16::from(cell.weekday_row)))
            {
                canvas.draw_focus(y, LABEL_WIDTH + cell.week_column);
            }
        }
        if let Some(date) = self.hover {
            if let Some((index, column)) = self.heatmap.tooltip_position(date) {
                let y = band_top(index, scroll).and_then(|top| top.checked_add(WEEKDAY_LINES));
                if let (Some(y), Ok(s)) = (y, date.format(&TOOLTIP_FMT)) {
                    canvas.mvprint(y, LABEL_WIDTH + column, s, Some(TOOLTIP_STYLE));
                }
            }
        }
        for marker in self.heatmap.period_markers() {
            canvas.draw_period(&marker, scroll);
        }
    }
}

/// Returns the line on which the season at `index` is drawn when the grid is
/// scrolled to `scroll`, or `None` if it is above the top of the grid or too
/// far below to number
fn band_top(index: u16, scroll: u16) -> Option<u16> {
    index
        .checked_sub(scroll)?
        .checked_mul(BAND_LINES)?
        .checked_add(HEADER_LINES)
}

#[derive(Debug, Eq, PartialEq)]
struct BufferCanvas<'a> {
    area: Rect,
    buf: &'a mut Buffer,
}

impl<'a> BufferCanvas<'a> {
    fn new(area: Rect, buf: &'a mut Buffer) -> Self {
        Self { area, buf }
    }

    fn draw_axis(&mut self, labels: &[AxisLabel]) {
        // A month that begins too close to the next one to fit its name is
        // only a sliver of the season and goes unlabeled.
        let mut kept: Vec<AxisLabel> = Vec::with_capacity(labels.len());
        for &label in labels {
            if kept.last().is_some_and(|prev| label.column < prev.column + 4) {
                kept.pop();
            }
            kept.push(label);
        }
        for label in kept {
            self.mvprint(
                0,
                LABEL_WIDTH + label.column,
                month_abbrev(label.month),
                Some(MONTH_STYLE),
            );
        }
    }

    fn draw_season_label(&mut self, top: u16, label: &str) {
        self.mvprint(top + LABEL_LINE, 0, label, Some(SEASON_STYLE));
    }

    fn draw_cells(&mut self, top: u16, cells: &[DayCell]) {
        for c in cells {
            let y = top + u16::from(c.cell.weekday_row);
            let x = LABEL_WIDTH + c.cell.week_column;
            if let Some(cell) = self.cell_mut(y, x) {
                cell.set_bg(c.color);
            }
        }
    }

    fn draw_outlines(&mut self, top: u16, outlines: &[MonthOutline]) {
        if outlines.is_empty() || top >= self.area.height || LABEL_WIDTH >= self.area.width {
            return;
        }
        let area = Rect {
            x: self.area.x + LABEL_WIDTH,
            y: self.area.y + top,
            width: self.area.width - LABEL_WIDTH,
            height: WEEKDAY_LINES.min(self.area.height - top),
        };
        let width = f64::from(area.width);
        let height = f64::from(area.height);
        // Canvas coordinates grow upwards, while weekday rows grow downwards.
        Canvas::default()
            .marker(Marker::Braille)
            .background_color(BACKGROUND)
            .x_bounds([0.0, width])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                for outline in outlines {
                    for (a, b) in outline.edges() {
                        ctx.draw(&canvas::Line {
                            x1: f64::from(a.x),
                            y1: height - f64::from(a.y),
                            x2: f64::from(b.x),
                            y2: height - f64::from(b.y),
                            color: OUTLINE_COLOR,
                        });
                    }
                }
            })
            .render(area, self.buf);
    }

    fn draw_focus(&mut self, y: u16, x: u16) {
        if let Some(cell) = self.cell_mut(y, x) {
            cell.set_symbol(FOCUS_SYMBOL);
            cell.set_style(FOCUS_STYLE);
        }
    }

    fn draw_period(&mut self, marker: &PeriodMarker, scroll: u16) {
        let x = LABEL_WIDTH + PERIOD_COLUMN;
        let top = if marker.first_season < scroll {
            None
        } else {
            match band_top(marker.first_season, scroll) {
                Some(top) if top < self.area.height => Some(top),
                // Starts below the drawn area
                _ => return,
            }
        };
        let Some(last) = marker.last_season.checked_sub(scroll) else {
            return;
        };
        let bottom = last
            .saturating_mul(BAND_LINES)
            .saturating_add(HEADER_LINES + WEEKDAY_LINES - 1);
        if let Some(top) = top {
            self.mvprint(top, x, format!("{ACS_HLINE}{ACS_TTEE}"), Some(PERIOD_STYLE));
            self.mvprint(top, x + 3, &marker.label, Some(PERIOD_STYLE));
        }
        let first_bar = top.map_or(HEADER_LINES, |top| top + 1);
        for y in first_bar..bottom.min(self.area.height) {
            self.mvprint(y, x + 1, String::from(ACS_VLINE), Some(PERIOD_STYLE));
        }
        self.mvprint(
            bottom,
            x,
            format!("{ACS_HLINE}{ACS_LRCORNER}"),
            Some(PERIOD_STYLE),
        );
    }

    fn cell_mut(&mut self, y: u16, x: u16) -> Option<&mut Cell> {
        if y < self.area.height && x < self.area.width {
            self.buf.cell_mut((x + self.area.x, y + self.area.y))
        } else {
            None
        }
    }

    fn mvprint<S: AsRef<str>>(&mut self, y: u16, x: u16, s: S, style: Option<Style>) {
        if y < self.area.height && x < self.area.width {
            let text = Text::styled(s.as_ref(), style.unwrap_or_default());
            let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
            // Using a Paragraph lets us truncate text that extends beyond the
            // calendar's area, though we need to be sure that the Rect passed
            // to the Paragraph is entirely within the frame lest a panic
            // result.
            Paragraph::new(text).render(
                Rect {
                    x: x + self.area.x,
                    y: y + self.area.y,
                    width: (self.area.width - x).min(width),
                    height: 1,
                },
                self.buf,
            );
        }
    }
}

fn month_abbrev(month: time::Month) -> String {
    month.to_string()[..3].to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::grid::SEASON_ROWS;
    use crate::calendar::heatmap::{DrawMode, Period};
    use crate::calendar::values::DayValues;
    use crate::theme::BASE_STYLE;
    use time::macros::date;

    fn scenario_values() -> DayValues {
        DayValues::from_iter([(date!(2023 - 04 - 09), 10.0), (date!(2023 - 12 - 25), 1.0)])
    }

    fn scenario_extent() -> GridExtent {
        GridExtent::new(date!(2023 - 01 - 01), date!(2024 - 12 - 31)).unwrap()
    }

    #[test]
    fn test_band_lines_match_layout() {
        assert_eq!(i32::from(BAND_LINES), SEASON_ROWS);
    }

    #[test]
    fn test_context_render() {
        let values = scenario_values();
        let periods = [Period::new("Spring", date!(2023 - 05 - 01), date!(2023 - 06 - 01)).unwrap()];
        let heatmap = Heatmap::new(&values, scenario_extent())
            .periods(&periods)
            .mode(DrawMode::Context)
            .focus(Some(date!(2023 - 04 - 09)));
        let calendar = Calendar::new(heatmap).hover(Some(date!(2023 - 12 - 25)));
        let area = Rect::new(0, 0, 80, 20);
        let mut buffer = Buffer::empty(area);
        buffer.set_style(area, BASE_STYLE);
        let mut state = ViewState::new();
        calendar.render(area, &mut buffer, &mut state);
        let mut expected = Buffer::with_lines([
            "            may jun jul  aug sep oct  nov dec  jan feb mar apr                  ",
            "                                                                                ",
            "                                                                                ",
            "                                                                                ",
            "2022-3                                                                          ",
            "                                                                                ",
            "                                                                                ",
            "                                                                                ",
            "                                                                                ",
            "                                                                                ",
            "          ●                                                          ─┬ Spring  ",
            "                                                                      │         ",
            "                                                                      │         ",
            "2023-4                                                                │         ",
            "                                                                      │         ",
            "                                                                      │         ",
            "                                                                     ─┘         ",
            "                                           Mon 25 Dec 2023                      ",
            "                                                                                ",
            "                                                                                ",
        ]);
        expected.set_style(*expected.area(), BASE_STYLE);
        for (x, width) in [
            (12, 3),
            (16, 3),
            (20, 3),
            (25, 3),
            (29, 3),
            (33, 3),
            (38, 3),
            (42, 3),
            (47, 3),
            (51, 3),
            (55, 3),
            (59, 3),
        ] {
            expected.set_style(Rect::new(x, 0, width, 1), MONTH_STYLE);
        }
        expected.set_style(Rect::new(0, 4, 6, 1), SEASON_STYLE);
        expected.set_style(Rect::new(0, 13, 6, 1), SEASON_STYLE);
        expected.set_style(Rect::new(10, 10, 1, 1), FOCUS_STYLE);
        expected.set_style(Rect::new(43, 17, 15, 1), TOOLTIP_STYLE);
        expected.set_style(Rect::new(69, 10, 2, 1), PERIOD_STYLE);
        expected.set_style(Rect::new(72, 10, 6, 1), PERIOD_STYLE);
        expected.set_style(Rect::new(70, 11, 1, 5), PERIOD_STYLE);
        expected.set_style(Rect::new(69, 16, 2, 1), PERIOD_STYLE);
        assert_eq!(buffer, expected);
        assert_eq!(state.visible, 2);
        assert_eq!(state.origin, Position::new(10, 1));
    }

    #[test]
    fn test_render_distant_period() {
        let values = DayValues::new();
        let lo = Date::from_calendar_date(2, time::Month::June, 1).unwrap();
        let extent = GridExtent::new(lo, date!(9998 - 01 - 01)).unwrap();
        let periods = [Period::new("Far", date!(9000 - 06 - 01), date!(9000 - 07 - 01)).unwrap()];
        let far = date!(9000 - 06 - 15);
        let heatmap = Heatmap::new(&values, extent)
            .periods(&periods)
            .mode(DrawMode::Context)
            .focus(Some(far));
        let area = Rect::new(0, 0, 80, 20);
        let mut buffer = Buffer::empty(area);
        let mut state = ViewState::new();
        Calendar::new(heatmap.clone())
            .hover(Some(far))
            .render(area, &mut buffer, &mut state);
        for y in 0..20 {
            assert_eq!(buffer[(70, y)].symbol(), " ", "period drawn on line {y}");
        }
        // Scrolled so that the season of 9000 is at the top
        let index = extent.locate(far).unwrap().0;
        assert_eq!(index, 8998);
        state.scroll_forwards(index, extent.season_qty()).unwrap();
        let mut buffer = Buffer::empty(area);
        Calendar::new(heatmap)
            .hover(Some(far))
            .render(area, &mut buffer, &mut state);
        assert_eq!(state.scroll(), index);
        assert_eq!(buffer[(70, 1)].symbol(), "┬");
        assert_eq!(buffer[(70, 7)].symbol(), "┘");
    }

    #[test]
    fn test_focus_render_colors_cells() {
        let values = scenario_values();
        let heatmap = Heatmap::new(&values, scenario_extent());
        let area = Rect::new(0, 0, 80, 20);
        let mut buffer = Buffer::empty(area);
        buffer.set_style(area, BASE_STYLE);
        let mut state = ViewState::new();
        Calendar::new(heatmap).render(area, &mut buffer, &mut state);
        let colors = crate::calendar::scale::Palette::Normal.colors();
        // Easter 2023 and Christmas 2023 in the second season
        assert_eq!(buffer[(10, 10)].bg, colors[6]);
        assert_eq!(buffer[(10 + 37, 11)].bg, colors[0]);
        // Days before the extent are not drawn.
        assert_eq!(buffer[(10, 1)].bg, BACKGROUND);
        // The gutter is left alone.
        assert_eq!(buffer[(20, 8)].bg, BACKGROUND);
    }

    #[test]
    fn test_date_at() {
        let values = scenario_values();
        let extent = scenario_extent();
        let layout = GridLayout::default();
        let heatmap = Heatmap::new(&values, extent).mode(DrawMode::Context);
        let area = Rect::new(0, 0, 80, 20);
        let mut buffer = Buffer::empty(area);
        let mut state = ViewState::new();
        Calendar::new(heatmap.clone()).render(area, &mut buffer, &mut state);
        assert_eq!(
            state.date_at(10, 10, &extent, &layout),
            Some(date!(2023 - 04 - 09))
        );
        assert_eq!(
            state.date_at(10 + 37, 11, &extent, &layout),
            Some(date!(2023 - 12 - 25))
        );
        assert_eq!(state.date_at(9, 10, &extent, &layout), None);
        assert_eq!(state.date_at(10, 0, &extent, &layout), None);
        assert_eq!(state.date_at(20, 17, &extent, &layout), None);
        assert_eq!(state.date_at(10, 1, &extent, &layout), None);
        state.scroll_forwards(1, extent.season_qty()).unwrap();
        Calendar::new(heatmap).render(area, &mut buffer, &mut state);
        assert_eq!(
            state.date_at(10, 1, &extent, &layout),
            Some(date!(2023 - 04 - 09))
        );
    }

    #[test]
    fn test_scrolling() {
        let mut state = ViewState {
            scroll: 0,
            origin: Position::new(10, 1),
            visible: 2,
        };
        assert_eq!(state.scroll_backwards(1), Err(EdgeOfGridError));
        assert_eq!(state.scroll_forwards(1, 5), Ok(()));
        assert_eq!(state.scroll(), 1);
        assert_eq!(state.scroll_forwards(state.page_size(), 5), Ok(()));
        assert_eq!(state.scroll(), 3);
        assert_eq!(state.scroll_forwards(1, 5), Err(EdgeOfGridError));
        assert_eq!(state.scroll_backwards(2), Ok(()));
        assert_eq!(state.scroll(), 1);
        state.reveal(4);
        assert_eq!(state.scroll(), 3);
        state.reveal(0);
        assert_eq!(state.scroll(), 0);
        state.reveal(1);
        assert_eq!(state.scroll(), 0);
    }

    #[test]
    fn test_month_abbrev() {
        assert_eq!(month_abbrev(time::Month::September), "sep");
    }
}
