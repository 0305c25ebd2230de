//! The station table: one row per Bluebikes dock station.
//!
//! The published CSV starts with a banner line ("Last Updated ...") ahead of
//! the real header, and only its first eight columns are station metadata.
//! Columns are resolved by header name once, when the file is loaded, so a
//! malformed file is rejected here instead of inside a query.

use std::collections::HashSet;
use std::fmt;
use std::io::Read;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow, bail};
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::datasets::parse_year;
use crate::fetch::read_source;

/// Number of leading CSV columns that carry station metadata.
pub const STATION_COLUMN_COUNT: usize = 8;

/// A named column of the station table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StationColumn {
    Number,
    Name,
    Latitude,
    Longitude,
    District,
    Public,
    TotalDocks,
    DeploymentYear,
}

impl StationColumn {
    pub const ALL: [StationColumn; STATION_COLUMN_COUNT] = [
        StationColumn::Number,
        StationColumn::Name,
        StationColumn::Latitude,
        StationColumn::Longitude,
        StationColumn::District,
        StationColumn::Public,
        StationColumn::TotalDocks,
        StationColumn::DeploymentYear,
    ];

    /// The header text of this column in the station CSV.
    pub fn header(self) -> &'static str {
        match self {
            StationColumn::Number => "Number",
            StationColumn::Name => "Name",
            StationColumn::Latitude => "Latitude",
            StationColumn::Longitude => "Longitude",
            StationColumn::District => "District",
            StationColumn::Public => "Public",
            StationColumn::TotalDocks => "Total docks",
            StationColumn::DeploymentYear => "Deployment Year",
        }
    }

    /// Whether a station file without this column is rejected.
    ///
    /// `Total docks` only feeds the average-docks metrics, which degrade
    /// instead of failing when it is missing.
    pub fn is_required(self) -> bool {
        !matches!(self, StationColumn::Public | StationColumn::TotalDocks)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for StationColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

impl FromStr for StationColumn {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        StationColumn::ALL
            .into_iter()
            .find(|c| c.header() == s)
            .ok_or_else(|| anyhow!("unknown station column '{s}'"))
    }
}

/// One row of the station table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub number: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub district: String,
    pub public: Option<String>,
    pub total_docks: Option<u32>,
    pub deployment_year: Option<i32>,
}

impl Station {
    /// Text form of the value in `column`, or `None` for a blank cell.
    pub fn value_of(&self, column: StationColumn) -> Option<String> {
        match column {
            StationColumn::Number => Some(self.number.clone()),
            StationColumn::Name => Some(self.name.clone()),
            StationColumn::Latitude => Some(self.latitude.to_string()),
            StationColumn::Longitude => Some(self.longitude.to_string()),
            StationColumn::District => Some(self.district.clone()),
            StationColumn::Public => self.public.clone(),
            StationColumn::TotalDocks => self.total_docks.map(|d| d.to_string()),
            StationColumn::DeploymentYear => self.deployment_year.map(|y| y.to_string()),
        }
    }

    /// Whether the cell in `column` equals `value`.
    ///
    /// Coordinates compare numerically, since `42.35810` and `42.3581` name the
    /// same point; every other column compares its text exactly.
    pub fn matches(&self, column: StationColumn, value: &str) -> bool {
        let coordinate = match column {
            StationColumn::Latitude => self.latitude,
            StationColumn::Longitude => self.longitude,
            _ => return self.value_of(column).as_deref() == Some(value),
        };
        value.trim().parse::<f64>().is_ok_and(|v| v == coordinate)
    }
}

/// Position of every known column within a CSV record.
#[derive(Debug, Default)]
struct StationSchema {
    positions: [Option<usize>; STATION_COLUMN_COUNT],
}

impl StationSchema {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let mut schema = StationSchema::default();

        for (pos, header) in headers.iter().take(STATION_COLUMN_COUNT).enumerate() {
            if let Ok(column) = header.trim().parse::<StationColumn>() {
                schema.positions[column.index()] = Some(pos);
            }
        }

        let missing: Vec<&str> = StationColumn::ALL
            .into_iter()
            .filter(|c| c.is_required() && schema.position(*c).is_none())
            .map(StationColumn::header)
            .collect();
        if !missing.is_empty() {
            bail!("station file is missing required columns: {}", missing.join(", "));
        }

        Ok(schema)
    }

    fn position(&self, column: StationColumn) -> Option<usize> {
        self.positions[column.index()]
    }

    fn has(&self, column: StationColumn) -> bool {
        self.position(column).is_some()
    }

    /// Trimmed cell text, `None` when the column is absent or the cell blank.
    fn cell<'r>(&self, record: &'r StringRecord, column: StationColumn) -> Option<&'r str> {
        self.position(column)
            .and_then(|pos| record.get(pos))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn parse_station(&self, record: &StringRecord) -> Result<Station> {
        let text = |column| self.cell(record, column).unwrap_or_default().to_string();

        let number = self
            .cell(record, StationColumn::Number)
            .ok_or_else(|| anyhow!("blank '{}'", StationColumn::Number))?
            .to_string();

        let coordinate = |column: StationColumn| -> Result<f64> {
            let raw = self
                .cell(record, column)
                .ok_or_else(|| anyhow!("blank '{column}'"))?;
            raw.parse()
                .with_context(|| format!("invalid '{column}' value '{raw}'"))
        };

        let total_docks: Option<u32> = match self.cell(record, StationColumn::TotalDocks) {
            Some(raw) => Some(
                raw.parse()
                    .with_context(|| format!("invalid '{}' value '{raw}'", StationColumn::TotalDocks))?,
            ),
            None => None,
        };

        let deployment_year = match self.cell(record, StationColumn::DeploymentYear) {
            Some(raw) => Some(parse_year(raw).ok_or_else(|| {
                anyhow!("invalid '{}' value '{raw}'", StationColumn::DeploymentYear)
            })?),
            None => None,
        };

        Ok(Station {
            number,
            name: text(StationColumn::Name),
            latitude: coordinate(StationColumn::Latitude)?,
            longitude: coordinate(StationColumn::Longitude)?,
            district: text(StationColumn::District),
            public: self.cell(record, StationColumn::Public).map(str::to_string),
            total_docks,
            deployment_year,
        })
    }
}

/// The loaded station table. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationTable {
    stations: Vec<Station>,
    has_total_docks: bool,
}

impl StationTable {
    /// Builds a table, rejecting duplicate station numbers.
    pub fn new(stations: Vec<Station>, has_total_docks: bool) -> Result<Self> {
        let mut seen = HashSet::with_capacity(stations.len());
        for station in &stations {
            if !seen.insert(station.number.as_str()) {
                bail!("duplicate station number '{}'", station.number);
            }
        }

        Ok(Self {
            stations,
            has_total_docks,
        })
    }

    /// Loads the station table from a local path or URL.
    #[tracing::instrument]
    pub fn load(source: &str) -> Result<Self> {
        let bytes = read_source(source)?;
        let table = Self::from_csv_reader(bytes.as_slice())
            .with_context(|| format!("failed to load station table from '{source}'"))?;

        info!(
            stations = table.len(),
            districts = table.districts().len(),
            "Station table loaded"
        );
        Ok(table)
    }

    /// Parses a station CSV: banner line, header line, then one station per record.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut records = rdr.records();

        let banner = records
            .next()
            .ok_or_else(|| anyhow!("station file is empty"))??;
        debug!(banner = ?banner.get(0), "Skipping banner row");

        let headers = records
            .next()
            .ok_or_else(|| anyhow!("station file has no header row"))??;
        let schema = StationSchema::resolve(&headers)?;

        let has_total_docks = schema.has(StationColumn::TotalDocks);
        if !has_total_docks {
            warn!(
                "Station file has no '{}' column; dock averages will read 0",
                StationColumn::TotalDocks
            );
        }

        let mut stations = Vec::new();
        for result in records {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let station = schema
                .parse_station(&record)
                .with_context(|| format!("bad station record on line {line}"))?;
            stations.push(station);
        }

        Self::new(stations, has_total_docks)
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    /// Whether the source file carried a `Total docks` column.
    pub fn has_total_docks(&self) -> bool {
        self.has_total_docks
    }

    /// A table with the same schema holding only the stations accepted by `keep`.
    pub fn retain_where(&self, mut keep: impl FnMut(&Station) -> bool) -> Self {
        Self {
            stations: self.stations.iter().filter(|s| keep(s)).cloned().collect(),
            has_total_docks: self.has_total_docks,
        }
    }

    /// The same stations with the `Total docks` column dropped.
    pub fn without_total_docks(&self) -> Self {
        Self {
            stations: self
                .stations
                .iter()
                .cloned()
                .map(|s| Station {
                    total_docks: None,
                    ..s
                })
                .collect(),
            has_total_docks: false,
        }
    }

    /// Distinct district values in first-seen order.
    pub fn districts(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.stations
            .iter()
            .map(|s| s.district.as_str())
            .filter(|d| seen.insert(*d))
            .collect()
    }
}
