//! Outlines around the cells of a month.
//!
//! Because days run down each week's column and wrap to the top of the next,
//! a month's cells form a "staircase": the tail of its first column, some
//! number of full columns, and the head of its last column.

use super::grid::{date_to_cell, CellCoordinate};
use super::range::InvalidRangeError;
use super::season::Season;
use thiserror::Error;
use time::Date;

/// Row coordinate of the bottom edge of the Saturday cells
const BOTTOM: u16 = 7;

/// A corner of an outline, measured in cells from the top-left corner of the
/// season's band
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct Vertex {
    pub(crate) x: u16,
    pub(crate) y: u16,
}

impl Vertex {
    pub(crate) fn new(x: u16, y: u16) -> Vertex {
        Vertex { x, y }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
// Invariant: Closed, i.e., the first and last vertices are the same, and no
// vertex lies on the line through its neighbors
pub(crate) struct MonthOutline(Vec<Vertex>);

impl MonthOutline {
    fn close(mut corners: Vec<Vertex>) -> MonthOutline {
        if let Some(&first) = corners.first() {
            corners.push(first);
        }
        MonthOutline(corners)
    }

    /// All vertices in drawing order, ending with a repeat of the first
    pub(crate) fn vertices(&self) -> &[Vertex] {
        &self.0
    }

    pub(crate) fn edges(&self) -> impl Iterator<Item = (Vertex, Vertex)> + '_ {
        self.vertices().windows(2).map(|w| (w[0], w[1]))
    }
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub(crate) enum OutlineError {
    #[error(transparent)]
    InvalidRange(#[from] InvalidRangeError),
    #[error("{date} is not in the season beginning {anchor}")]
    OutsideSeason { date: Date, anchor: Date },
}

/// Traces the outline of the cells for the days `start` through `end`
/// (inclusive), which must lie within `season`
pub(crate) fn trace_month(start: Date, end: Date, season: Season) -> Result<MonthOutline, OutlineError> {
    if end < start {
        return Err(InvalidRangeError { start, end }.into());
    }
    let cell = |date: Date| {
        date_to_cell(date, season).ok_or(OutlineError::OutsideSeason {
            date,
            anchor: season.anchor(),
        })
    };
    let CellCoordinate {
        week_column: w0,
        weekday_row: d0,
    } = cell(start)?;
    let CellCoordinate {
        week_column: w1,
        weekday_row: d1,
    } = cell(end)?;
    let (d0, d1) = (u16::from(d0), u16::from(d1));
    let staircase = vec![
        Vertex::new(w0 + 1, d0),
        Vertex::new(w0, d0),
        Vertex::new(w0, BOTTOM),
        Vertex::new(w1, BOTTOM),
        Vertex::new(w1, d1 + 1),
        Vertex::new(w1 + 1, d1 + 1),
        Vertex::new(w1 + 1, 0),
        Vertex::new(w0 + 1, 0),
    ];
    Ok(MonthOutline::close(simplify(staircase)))
}

// Repeatedly removes any vertex that coincides with or is collinear with its
// neighbors in the (implicitly closed) ring.  When the month's first and last
// weeks are the same, the staircase doubles back on itself, and this reduces
// it to a rectangle.
fn simplify(mut ring: Vec<Vertex>) -> Vec<Vertex> {
    while ring.len() > 3 {
        let n = ring.len();
        let redundant = (0..n).find(|&i| {
            let prev = ring[(i + n - 1) % n];
            let next = ring[(i + 1) % n];
            collinear(prev, ring[i], next)
        });
        match redundant {
            Some(i) => {
                ring.remove(i);
            }
            None => break,
        }
    }
    ring
}

fn collinear(a: Vertex, b: Vertex, c: Vertex) -> bool {
    let (ax, ay) = (i32::from(a.x), i32::from(a.y));
    let (bx, by) = (i32::from(b.x), i32::from(b.y));
    let (cx, cy) = (i32::from(c.x), i32::from(c.y));
    (bx - ax) * (cy - ay) == (by - ay) * (cx - ax)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use time::macros::date;

    fn vertices(points: &[(u16, u16)]) -> Vec<Vertex> {
        points.iter().map(|&(x, y)| Vertex::new(x, y)).collect()
    }

    fn corners(outline: &MonthOutline) -> &[Vertex] {
        outline.vertices().split_last().map_or(&[], |(_, rest)| rest)
    }

    fn assert_well_formed(outline: &MonthOutline) {
        let vs = outline.vertices();
        assert_eq!(vs.first(), vs.last(), "outline is not closed: {vs:?}");
        for (a, b) in outline.edges() {
            assert!(a.x == b.x || a.y == b.y, "diagonal edge {a:?} -> {b:?}");
            assert_ne!(a, b, "zero-length edge in {vs:?}");
        }
        let distinct = corners(outline).iter().collect::<HashSet<_>>();
        assert_eq!(distinct.len(), corners(outline).len());
    }

    #[test]
    fn test_mid_week_month() {
        // May 2023 runs from a Monday in week 3 to a Wednesday in week 7.
        let season = Season::for_year(2023).unwrap();
        let outline = trace_month(date!(2023 - 05 - 01), date!(2023 - 05 - 31), season).unwrap();
        assert_eq!(
            outline.vertices(),
            vertices(&[
                (4, 1),
                (3, 1),
                (3, 7),
                (7, 7),
                (7, 4),
                (8, 4),
                (8, 0),
                (4, 0),
                (4, 1),
            ])
        );
        assert_eq!(corners(&outline).len(), 8);
        assert_well_formed(&outline);
    }

    #[test]
    fn test_month_starting_sunday() {
        // October 2023 starts on a Sunday, so its top-left notch vanishes.
        let season = Season::for_year(2023).unwrap();
        let outline = trace_month(date!(2023 - 10 - 01), date!(2023 - 10 - 31), season).unwrap();
        assert_eq!(
            outline.vertices(),
            vertices(&[
                (25, 0),
                (25, 7),
                (29, 7),
                (29, 3),
                (30, 3),
                (30, 0),
                (25, 0),
            ])
        );
        assert_well_formed(&outline);
    }

    #[test]
    fn test_single_cell() {
        // Easter 2024 is the last day of March, so that month contributes a
        // single day to the season.
        let season = Season::for_year(2024).unwrap();
        let outline = trace_month(date!(2024 - 03 - 31), date!(2024 - 03 - 31), season).unwrap();
        assert_eq!(
            outline.vertices(),
            vertices(&[(0, 0), (0, 1), (1, 1), (1, 0), (0, 0)])
        );
        assert_eq!(corners(&outline).len(), 4);
        assert_well_formed(&outline);
    }

    #[test]
    fn test_single_column() {
        let season = Season::for_year(2023).unwrap();
        // Tuesday through Friday of the same week
        let outline = trace_month(date!(2023 - 05 - 02), date!(2023 - 05 - 05), season).unwrap();
        assert_eq!(
            outline.vertices(),
            vertices(&[(4, 2), (3, 2), (3, 6), (4, 6), (4, 2)])
        );
        assert_eq!(corners(&outline).len(), 4);
    }

    #[test]
    fn test_first_month_of_season() {
        let season = Season::for_year(2023).unwrap();
        let outline = trace_month(date!(2023 - 04 - 09), date!(2023 - 04 - 30), season).unwrap();
        assert_eq!(
            outline.vertices(),
            vertices(&[(0, 0), (0, 7), (3, 7), (3, 1), (4, 1), (4, 0), (0, 0)])
        );
        assert_well_formed(&outline);
    }

    #[test]
    fn test_last_month_of_season() {
        // The season's final span of March ends on the Saturday before
        // Easter, closing off the bottom-right corner.
        let season = Season::for_year(2023).unwrap();
        let outline = trace_month(date!(2024 - 03 - 01), date!(2024 - 03 - 30), season).unwrap();
        assert_eq!(
            outline.vertices(),
            vertices(&[
                (47, 5),
                (46, 5),
                (46, 7),
                (51, 7),
                (51, 0),
                (47, 0),
                (47, 5),
            ])
        );
        assert_well_formed(&outline);
    }

    #[test]
    fn test_every_month_near_anchors() {
        for year in 2015..2035 {
            let season = Season::for_year(year).unwrap();
            let last_column = date_to_cell(season.last_day(), season).unwrap().week_column;
            for span in season.months() {
                let outline = trace_month(span.start, span.end, season).unwrap();
                assert_well_formed(&outline);
                let n = corners(&outline).len();
                assert!([4, 6, 8].contains(&n), "{n} corners for {span:?}");
                assert!(
                    outline.vertices().iter().all(|v| v.x <= last_column + 1 && v.y <= BOTTOM),
                    "{span:?} spills out of its season"
                );
            }
        }
    }

    #[test]
    fn test_reversed_range() {
        let season = Season::for_year(2023).unwrap();
        assert_eq!(
            trace_month(date!(2023 - 05 - 31), date!(2023 - 05 - 01), season),
            Err(OutlineError::InvalidRange(InvalidRangeError {
                start: date!(2023 - 05 - 31),
                end: date!(2023 - 05 - 01),
            }))
        );
    }

    #[test]
    fn test_outside_season() {
        let season = Season::for_year(2023).unwrap();
        assert_eq!(
            trace_month(date!(2023 - 04 - 01), date!(2023 - 04 - 30), season),
            Err(OutlineError::OutsideSeason {
                date: date!(2023 - 04 - 01),
                anchor: date!(2023 - 04 - 09),
            })
        );
    }
}
