//! The Easter-anchored calendar engine: seasons, grid geometry, coloring,
//! and month outlines, plus the terminal widget that draws them
mod grid;
mod heatmap;
mod outline;
mod range;
mod scale;
mod season;
mod values;
mod widget;
pub(crate) use self::grid::{GridExtent, GridLayout};
pub(crate) use self::heatmap::{DrawMode, Heatmap, Period};
pub(crate) use self::range::{DateRange, InvalidRangeError};
pub(crate) use self::values::DayValues;
pub(crate) use self::widget::{Calendar, ViewState};
