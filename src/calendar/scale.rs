//! Quantile color scale for per-day values

use super::values::DayValues;
use ratatui::style::Color;
use std::num::NonZeroU8;
use time::Date;

const PALETTE_BUCKETS: NonZeroU8 = match NonZeroU8::new(7) {
    Some(n) => n,
    None => panic!("palette size should be nonzero"),
};

/// Number of colors in each palette
pub(crate) const PALETTE_SIZE: usize = PALETTE_BUCKETS.get() as usize;

/// Color of a day that has no value
pub(crate) const EMPTY_COLOR: Color = Color::Rgb(0xff, 0xff, 0xff);

/// The seven lightest classes of ColorBrewer's nine-class YlGnBu scheme
const NORMAL_COLORS: [Color; PALETTE_SIZE] = [
    Color::Rgb(0xff, 0xff, 0xd9),
    Color::Rgb(0xed, 0xf8, 0xb1),
    Color::Rgb(0xc7, 0xe9, 0xb4),
    Color::Rgb(0x7f, 0xcd, 0xbb),
    Color::Rgb(0x41, 0xb6, 0xc4),
    Color::Rgb(0x1d, 0x91, 0xc0),
    Color::Rgb(0x22, 0x5e, 0xa8),
];

/// Classes two through eight of ColorBrewer's nine-class Greys scheme.  The
/// first class is pure white, which is taken by `EMPTY_COLOR`.
const MUTED_COLORS: [Color; PALETTE_SIZE] = [
    Color::Rgb(0xf0, 0xf0, 0xf0),
    Color::Rgb(0xd9, 0xd9, 0xd9),
    Color::Rgb(0xbd, 0xbd, 0xbd),
    Color::Rgb(0x96, 0x96, 0x96),
    Color::Rgb(0x73, 0x73, 0x73),
    Color::Rgb(0x52, 0x52, 0x52),
    Color::Rgb(0x25, 0x25, 0x25),
];

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Palette {
    Normal,
    Muted,
}

impl Palette {
    pub(crate) fn colors(self) -> &'static [Color; PALETTE_SIZE] {
        match self {
            Palette::Normal => &NORMAL_COLORS,
            Palette::Muted => &MUTED_COLORS,
        }
    }
}

/// Maps values to bucket indices so that each bucket holds roughly the same
/// number of the values the scale was built from
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct QuantileScale {
    // Sorted; bucket `i` holds values in `thresholds[i-1]..thresholds[i]`
    thresholds: Vec<f64>,
}

impl QuantileScale {
    /// Builds a scale with one bucket per palette color
    pub(crate) fn new<I: IntoIterator<Item = f64>>(values: I) -> QuantileScale {
        QuantileScale::with_buckets(values, PALETTE_BUCKETS)
    }

    pub(crate) fn with_buckets<I: IntoIterator<Item = f64>>(
        values: I,
        buckets: NonZeroU8,
    ) -> QuantileScale {
        let mut sorted = values
            .into_iter()
            .filter(|v| v.is_finite())
            .collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        let thresholds = if sorted.is_empty() {
            Vec::new()
        } else {
            (1..buckets.get())
                .map(|k| quantile(&sorted, k, buckets.get()))
                .collect()
        };
        QuantileScale { thresholds }
    }

    pub(crate) fn bucket(&self, value: f64) -> usize {
        self.thresholds.partition_point(|&t| t <= value)
    }
}

// Returns the `k/q`-th quantile of a sorted, nonempty slice, interpolating
// linearly between adjacent values
fn quantile(sorted: &[f64], k: u8, q: u8) -> f64 {
    let scaled = (sorted.len() - 1) * usize::from(k);
    let i = scaled / usize::from(q);
    let rem = u8::try_from(scaled % usize::from(q)).expect("remainder should be less than q");
    let lower = sorted[i];
    match sorted.get(i + 1) {
        Some(&upper) if rem > 0 => lower + (upper - lower) * f64::from(rem) / f64::from(q),
        _ => lower,
    }
}

/// How a day is shaded, independent of palette
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Shade {
    Empty,
    Bucket(usize),
}

impl Shade {
    pub(crate) fn of(date: Date, values: &DayValues, scale: &QuantileScale) -> Shade {
        match values.get(date) {
            Some(v) => Shade::Bucket(scale.bucket(v)),
            None => Shade::Empty,
        }
    }

    pub(crate) fn color(self, palette: Palette) -> Color {
        match self {
            Shade::Empty => EMPTY_COLOR,
            Shade::Bucket(i) => palette.colors()[i.min(PALETTE_SIZE - 1)],
        }
    }
}

pub(crate) fn color_for(
    date: Date,
    values: &DayValues,
    scale: &QuantileScale,
    palette: Palette,
) -> Color {
    Shade::of(date, values, scale).color(palette)
}
