use crate::data::DailySeries;
use crate::math::{LoessSmoother, StatsHelper};
use crate::prelude::{CompareError, CompareResult};
use crate::processing::assemble::StationSeries;
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;

/// Satellite and gauge series sharing exactly the same days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignedPair {
    pub dates: Vec<NaiveDate>,
    /// Demeaned satellite values.
    pub satellite: Vec<f64>,
    /// Demeaned gauge values.
    pub gauge: Vec<f64>,
    pub satellite_filtered: Vec<f64>,
    pub gauge_filtered: Vec<f64>,
    pub min_distance_km: Option<f64>,
}

impl AlignedPair {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Why a station yielded nothing to compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyReason {
    NoSatelliteData,
    NoGaugeData,
    NoOverlap,
    NoSharedDays,
}

impl std::fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmptyReason::NoSatelliteData => write!(f, "no satellite data within radius"),
            EmptyReason::NoGaugeData => write!(f, "no gauge data"),
            EmptyReason::NoOverlap => write!(f, "series do not overlap in time"),
            EmptyReason::NoSharedDays => write!(f, "no shared days in overlap window"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Alignment {
    Aligned(AlignedPair),
    Empty(EmptyReason),
}

/// Inner join of two daily series on calendar day.
pub fn intersect(a: &DailySeries, b: &DailySeries) -> (Vec<NaiveDate>, Vec<f64>, Vec<f64>) {
    let (mut i, mut j) = (0, 0);
    let (mut dates, mut left, mut right) = (Vec::new(), Vec::new(), Vec::new());
    let (ad, av, bd, bv) = (a.dates(), a.values(), b.dates(), b.values());
    while i < ad.len() && j < bd.len() {
        match ad[i].cmp(&bd[j]) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                dates.push(ad[i]);
                left.push(av[i]);
                right.push(bv[j]);
                i += 1;
                j += 1;
            }
        }
    }
    (dates, left, right)
}

/// Overlap, intersection, demeaning and smoothing of one station.
#[derive(Debug, Clone)]
pub struct AlignmentStage {
    smoother: LoessSmoother,
}

impl AlignmentStage {
    pub fn new(smoother: LoessSmoother) -> Self {
        Self { smoother }
    }

    pub fn from_window_days(window_days: f64) -> CompareResult<Self> {
        Ok(Self::new(LoessSmoother::from_window_days(window_days)?))
    }

    pub fn align_station(&self, satellite: &StationSeries, gauge: &DailySeries) -> CompareResult<Alignment> {
        let daily = satellite.daily_values();
        let mut alignment = self.align(&daily, gauge)?;
        if let Alignment::Aligned(pair) = &mut alignment {
            pair.min_distance_km = satellite.min_distance_on(&pair.dates);
        }
        Ok(alignment)
    }

    pub fn align(&self, satellite: &DailySeries, gauge: &DailySeries) -> CompareResult<Alignment> {
        if let Some(bad) = satellite.iter().chain(gauge.iter()).find(|(_, v)| !v.is_finite()) {
            return Err(CompareError::Alignment(format!(
                "non-finite value on {}",
                bad.0
            )));
        }

        let (Some(sat_start), Some(sat_end)) = (satellite.first_date(), satellite.last_date()) else {
            return Ok(Alignment::Empty(EmptyReason::NoSatelliteData));
        };
        let (Some(tg_start), Some(tg_end)) = (gauge.first_date(), gauge.last_date()) else {
            return Ok(Alignment::Empty(EmptyReason::NoGaugeData));
        };

        let start = sat_start.max(tg_start);
        let end = sat_end.min(tg_end);
        if start > end {
            return Ok(Alignment::Empty(EmptyReason::NoOverlap));
        }

        let (dates, sat_values, tg_values) =
            intersect(&satellite.restrict(start, end), &gauge.restrict(start, end));
        if dates.is_empty() {
            return Ok(Alignment::Empty(EmptyReason::NoSharedDays));
        }

        let sat_demeaned = StatsHelper::demean(&sat_values);
        let tg_demeaned = StatsHelper::demean(&tg_values);
        let satellite_filtered = self.smoother.smooth(&sat_demeaned)?;
        let gauge_filtered = self.smoother.smooth(&tg_demeaned)?;

        Ok(Alignment::Aligned(AlignedPair {
            dates,
            satellite: sat_demeaned,
            gauge: tg_demeaned,
            satellite_filtered,
            gauge_filtered,
            min_distance_km: None,
        }))
    }
}
