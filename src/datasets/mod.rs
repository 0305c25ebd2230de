//! Dataset loading.
//!
//! [`Datasets`] owns the station and deployment tables for the life of the
//! process. It is built once and passed by reference to every query.

pub mod deployments;
pub mod stations;

pub use deployments::{DeploymentRecord, DeploymentTable};
pub use stations::{Station, StationColumn, StationTable};

use anyhow::Result;
use tracing::info;

/// The read-only tables every view is computed from.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub stations: StationTable,
    pub deployments: DeploymentTable,
}

impl Datasets {
    pub fn new(stations: StationTable, deployments: DeploymentTable) -> Self {
        Self {
            stations,
            deployments,
        }
    }

    /// Loads both tables. Either failing is fatal for the caller.
    #[tracing::instrument]
    pub fn load(stations_source: &str, deployments_source: &str) -> Result<Self> {
        let stations = StationTable::load(stations_source)?;
        let deployments = DeploymentTable::load(deployments_source)?;

        info!(
            stations = stations.len(),
            deployments = deployments.len(),
            "Datasets ready"
        );
        Ok(Self::new(stations, deployments))
    }
}

/// Parses a year cell such as `2011` or `2011.0`.
pub(crate) fn parse_year(raw: &str) -> Option<i32> {
    let raw = raw.trim();
    if let Ok(year) = raw.parse::<i32>() {
        return Some(year);
    }

    let value = raw.parse::<f64>().ok()?;
    year_from_float(value)
}

pub(crate) fn year_from_float(value: f64) -> Option<i32> {
    if value.fract() == 0.0 && value >= i32::MIN as f64 && value <= i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}
