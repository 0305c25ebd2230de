//! District filtering for the map view.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::analyzers::utility::checked_mean;
use crate::datasets::{StationColumn, StationTable};

/// Selector value that disables filtering.
pub const ALL_DISTRICTS: &str = "All";

/// Which rows of the station table to keep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DistrictSelector {
    #[default]
    All,
    Only(String),
}

impl DistrictSelector {
    pub fn as_str(&self) -> &str {
        match self {
            DistrictSelector::All => ALL_DISTRICTS,
            DistrictSelector::Only(value) => value,
        }
    }
}

impl From<&str> for DistrictSelector {
    fn from(value: &str) -> Self {
        if value == ALL_DISTRICTS {
            DistrictSelector::All
        } else {
            DistrictSelector::Only(value.to_string())
        }
    }
}

impl FromStr for DistrictSelector {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.into())
    }
}

impl fmt::Display for DistrictSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DistrictSelector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// The rows kept by a filter and their mean dock count.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterResult {
    pub subset: StationTable,
    /// `None` when the subset has no dock counts to average.
    pub average_docks: Option<f64>,
}

/// Keeps the stations whose `column` (given by header name) equals the selector.
///
/// # Errors
///
/// Returns an error if `column` names no station column.
pub fn filter_by_district(
    table: &StationTable,
    column: &str,
    selector: &DistrictSelector,
) -> Result<FilterResult> {
    let column: StationColumn = column.parse()?;
    Ok(filter_by_column(table, column, selector))
}

/// Typed form of [`filter_by_district`].
///
/// Matching is exact and case-sensitive on the cell's text; blank cells never match.
pub fn filter_by_column(
    table: &StationTable,
    column: StationColumn,
    selector: &DistrictSelector,
) -> FilterResult {
    let subset = match selector {
        DistrictSelector::All => table.clone(),
        DistrictSelector::Only(value) => {
            table.retain_where(|s| s.matches(column, value))
        }
    };

    let average_docks = average_docks(&subset);
    debug!(
        %column,
        %selector,
        rows = subset.len(),
        ?average_docks,
        "Filtered station table"
    );

    FilterResult {
        subset,
        average_docks,
    }
}

/// Mean of `Total docks` over the table, skipping blank cells.
///
/// A table without the column reads as 0; a table with nothing to average
/// (no rows, or only blank cells) reads as `None`.
pub fn average_docks(table: &StationTable) -> Option<f64> {
    if !table.has_total_docks() {
        return Some(0.0);
    }

    let docks: Vec<f64> = table
        .stations()
        .iter()
        .filter_map(|s| s.total_docks)
        .map(f64::from)
        .collect();
    checked_mean(&docks)
}
