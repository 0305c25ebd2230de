//! Result rows produced by the aggregation queries.

use serde::Serialize;

/// Number of distinct stations in one district.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistrictStationCount {
    pub district: String,
    pub stations: usize,
}

/// Mean dock count over the stations of one district.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistrictDockAverage {
    pub district: String,
    pub average_docks: f64,
}

/// How many deployment rows carry a given year, and their share of all counted rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
    pub percent: f64,
}
