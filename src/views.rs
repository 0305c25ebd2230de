//! Data behind each page of the explorer.
//!
//! These are plain serializable payloads; how a page is drawn is up to
//! whoever consumes them.

use anyhow::{Result, bail};
use serde::Serialize;

use crate::analyzers::aggregate::{
    avg_docks_per_district, deployment_year_counts, stations_per_district,
};
use crate::analyzers::filter::{ALL_DISTRICTS, DistrictSelector, filter_by_district};
use crate::analyzers::types::{DistrictDockAverage, DistrictStationCount, YearCount};
use crate::datasets::{Datasets, StationColumn, StationTable};

pub const APP_TITLE: &str = "Boston Blue Bikes Data Explorer";
pub const APP_TAGLINE: &str = "Explore the usage patterns of Blue Bikes in Boston.";
pub const BANNER_IMAGE: &str = "Bluebikes.png";

/// The four pages of the explorer, in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    MapVisualization,
    Charts,
    Feedback,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Home, Page::MapVisualization, Page::Charts, Page::Feedback];

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::MapVisualization => "Map Visualization",
            Page::Charts => "Charts",
            Page::Feedback => "Feedback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeView {
    pub title: &'static str,
    pub tagline: &'static str,
    pub image: &'static str,
    pub stations: usize,
    pub districts: usize,
}

pub fn home_view(data: &Datasets) -> HomeView {
    HomeView {
        title: APP_TITLE,
        tagline: APP_TAGLINE,
        image: BANNER_IMAGE,
        stations: data.stations.len(),
        districts: data.stations.districts().len(),
    }
}

/// Camera position the map opens at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewState {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
}

/// Downtown Boston.
pub const BOSTON_VIEW: ViewState = ViewState {
    latitude: 42.3601,
    longitude: -71.0589,
    zoom: 12.0,
    pitch: 50.0,
};

/// One plotted station, carrying the fields its tooltip shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub name: String,
    pub district: String,
    pub deployment_year: Option<i32>,
    pub total_docks: Option<u32>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub district: DistrictSelector,
    pub average_docks: Option<f64>,
    pub view_state: ViewState,
    pub points: Vec<MapPoint>,
}

pub fn map_view(data: &Datasets, selector: &DistrictSelector) -> Result<MapView> {
    let filtered = filter_by_district(
        &data.stations,
        StationColumn::District.header(),
        selector,
    )?;

    let points = filtered
        .subset
        .stations()
        .iter()
        .map(|s| MapPoint {
            name: s.name.clone(),
            district: s.district.clone(),
            deployment_year: s.deployment_year,
            total_docks: s.total_docks,
            latitude: s.latitude,
            longitude: s.longitude,
        })
        .collect();

    Ok(MapView {
        district: selector.clone(),
        average_docks: filtered.average_docks,
        view_state: BOSTON_VIEW,
        points,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartsView {
    pub deployment_years: Vec<YearCount>,
    pub stations_per_district: Vec<DistrictStationCount>,
    pub avg_docks_per_district: Vec<DistrictDockAverage>,
}

pub fn charts_view(data: &Datasets) -> Result<ChartsView> {
    Ok(ChartsView {
        deployment_years: deployment_year_counts(&data.deployments),
        stations_per_district: stations_per_district(&data.stations),
        avg_docks_per_district: avg_docks_per_district(&data.stations)?,
    })
}

/// Choices for the district selector: the "All" sentinel, then every
/// district seen in the table in first-seen order.
pub fn district_options(table: &StationTable) -> Vec<String> {
    std::iter::once(ALL_DISTRICTS)
        .chain(table.districts())
        .map(str::to_string)
        .collect()
}

/// Parses a selector, accepting only "All" or a district present in `table`.
///
/// # Errors
///
/// Returns an error listing the valid choices when `district` is unknown.
/// Matching is case-sensitive.
pub fn district_selector(table: &StationTable, district: &str) -> Result<DistrictSelector> {
    let options = district_options(table);
    if !options.iter().any(|o| o == district) {
        bail!(
            "unknown district '{district}'; choose one of: {}",
            options.join(", ")
        );
    }
    Ok(DistrictSelector::from(district))
}
