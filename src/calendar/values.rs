use std::collections::BTreeMap;
use time::Date;

/// A numeric value for each of some set of days
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct DayValues(BTreeMap<Date, f64>);

impl DayValues {
    pub(crate) fn new() -> DayValues {
        DayValues::default()
    }

    /// Sets the value for `date`, returning the value previously stored for
    /// it, if any
    pub(crate) fn insert(&mut self, date: Date, value: f64) -> Option<f64> {
        self.0.insert(date, value)
    }

    pub(crate) fn get(&self, date: Date) -> Option<f64> {
        self.0.get(&date).copied()
    }

    pub(crate) fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.values().copied()
    }

    pub(crate) fn first_date(&self) -> Option<Date> {
        self.0.keys().next().copied()
    }

    pub(crate) fn last_date(&self) -> Option<Date> {
        self.0.keys().next_back().copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(Date, f64)> for DayValues {
    fn from_iter<I: IntoIterator<Item = (Date, f64)>>(iter: I) -> DayValues {
        DayValues(iter.into_iter().collect())
    }
}
