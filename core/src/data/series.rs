use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Date-ordered series with at most one value per calendar day.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailySeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl DailySeries {
    /// Collapses arbitrary (date, value) points, averaging same-day duplicates.
    pub fn collapse<I>(points: I) -> Self
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let mut days: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        for (date, value) in points {
            let entry = days.entry(date).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
        let (dates, values) = days
            .into_iter()
            .map(|(date, (sum, count))| (date, sum / count as f64))
            .unzip();
        Self { dates, values }
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }

    /// Keeps the days inside `[start, end]`.
    pub fn restrict(&self, start: NaiveDate, end: NaiveDate) -> Self {
        let (dates, values) = self.iter().filter(|(d, _)| *d >= start && *d <= end).unzip();
        Self { dates, values }
    }
}
