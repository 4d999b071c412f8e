use thiserror::Error;
use time::Date;

/// An inclusive span of dates
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct DateRange {
    start: Date,
    end: Date,
}

impl DateRange {
    pub(crate) fn new(start: Date, end: Date) -> Result<DateRange, InvalidRangeError> {
        if end < start {
            Err(InvalidRangeError { start, end })
        } else {
            Ok(DateRange { start, end })
        }
    }

    pub(crate) fn start(&self) -> Date {
        self.start
    }

    pub(crate) fn end(&self) -> Date {
        self.end
    }

    pub(crate) fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    /// Returns the dates common to `self` and the inclusive range
    /// `start..=end`, or `None` if there are none
    pub(crate) fn clip(&self, start: Date, end: Date) -> Option<DateRange> {
        DateRange::new(start.max(self.start), end.min(self.end)).ok()
    }
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
#[error("range ends on {end}, before it starts on {start}")]
pub(crate) struct InvalidRangeError {
    pub(crate) start: Date,
    pub(crate) end: Date,
}
