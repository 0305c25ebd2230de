//! The deployment table, read from the first worksheet of a spreadsheet.

use std::io::Cursor;

use anyhow::{Context, Result, anyhow, bail};
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::datasets::{parse_year, year_from_float};
use crate::fetch::read_source;

pub const DEPLOYMENT_YEAR: &str = "Deployment Year";

/// One row of the deployment table.
///
/// Only the deployment year is interpreted; every other column is kept as text.
/// A year cell that is blank, or holds anything but a whole year (a date, an
/// error value such as `#N/A`, free text), leaves `deployment_year` empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentRecord {
    pub deployment_year: Option<i32>,
    pub fields: Vec<(String, String)>,
}

impl DeploymentRecord {
    pub fn field(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeploymentTable {
    records: Vec<DeploymentRecord>,
}

impl DeploymentTable {
    pub fn new(records: Vec<DeploymentRecord>) -> Self {
        Self { records }
    }

    /// Loads the deployment table from a local path or URL.
    #[tracing::instrument]
    pub fn load(source: &str) -> Result<Self> {
        let bytes = read_source(source)?;
        let table = Self::from_bytes(bytes)
            .with_context(|| format!("failed to load deployment table from '{source}'"))?;

        info!(records = table.len(), "Deployment table loaded");
        Ok(table)
    }

    /// Parses a workbook (xlsx, xlsm, xlsb, xls or ods) held in memory.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        let sheet = workbook.sheet_names().first().cloned();
        debug!(sheet = ?sheet, "Reading first worksheet");

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| anyhow!("workbook has no worksheets"))??;

        Self::from_rows(range.rows())
    }

    /// Builds the table from spreadsheet rows, the first of which is the header.
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a [Data]>) -> Result<Self> {
        let mut rows = rows.into_iter();
        let headers: Vec<String> = rows
            .next()
            .ok_or_else(|| anyhow!("worksheet is empty"))?
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let Some(year_pos) = headers.iter().position(|h| h == DEPLOYMENT_YEAR) else {
            bail!("worksheet has no '{DEPLOYMENT_YEAR}' column");
        };

        let mut records = Vec::new();
        // Header is spreadsheet row 1.
        for (row_num, row) in rows.enumerate().map(|(i, r)| (i + 2, r)) {
            let deployment_year = match row.get(year_pos).map(year_from_cell) {
                Some(Ok(year)) => year,
                Some(Err(e)) => {
                    warn!(row = row_num, error = %e, "Unreadable '{DEPLOYMENT_YEAR}'; row not counted");
                    None
                }
                None => None,
            };

            let fields = headers
                .iter()
                .enumerate()
                .filter(|(pos, _)| *pos != year_pos)
                .map(|(pos, header)| {
                    let value = row.get(pos).map(|c| c.to_string()).unwrap_or_default();
                    (header.clone(), value)
                })
                .collect();

            records.push(DeploymentRecord {
                deployment_year,
                fields,
            });
        }

        Ok(Self::new(records))
    }

    pub fn records(&self) -> &[DeploymentRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn year_from_cell(cell: &Data) -> Result<Option<i32>> {
    match cell {
        Data::Empty => Ok(None),
        Data::Int(v) => Ok(Some(i32::try_from(*v)?)),
        Data::Float(v) => year_from_float(*v)
            .map(Some)
            .ok_or_else(|| anyhow!("'{v}' is not a whole year")),
        Data::String(s) if s.trim().is_empty() => Ok(None),
        Data::String(s) => parse_year(s)
            .map(Some)
            .ok_or_else(|| anyhow!("'{s}' is not a year")),
        other => bail!("unexpected cell {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    fn sheet() -> Vec<Vec<Data>> {
        vec![
            vec![s("Station"), s("Deployment Year"), s("Municipality")],
            vec![s("Fan Pier"), Data::Float(2011.0), s("Boston")],
            vec![s("MIT at Mass Ave"), Data::Int(2012), s("Cambridge")],
            vec![s("Back Bay T"), s("2011"), s("Boston")],
            vec![s("Pending"), Data::Empty, s("Boston")],
        ]
    }

    fn table_from(rows: &[Vec<Data>]) -> Result<DeploymentTable> {
        DeploymentTable::from_rows(rows.iter().map(Vec::as_slice))
    }

    #[test]
    fn test_from_rows() {
        let table = table_from(&sheet()).unwrap();

        assert_eq!(table.len(), 4);
        let years: Vec<_> = table.records().iter().map(|r| r.deployment_year).collect();
        assert_eq!(years, vec![Some(2011), Some(2012), Some(2011), None]);
        assert_eq!(table.records()[1].field("Municipality"), Some("Cambridge"));
        assert_eq!(table.records()[1].field("Deployment Year"), None);
    }

    #[test]
    fn test_short_row_has_no_year() {
        let rows = vec![vec![s("Station"), s("Deployment Year")], vec![s("Orphan")]];
        let table = table_from(&rows).unwrap();
        assert_eq!(table.records()[0].deployment_year, None);
        assert_eq!(table.records()[0].field("Station"), Some("Orphan"));
    }

    #[test]
    fn test_missing_year_column() {
        let rows = vec![vec![s("Station"), s("Year")]];
        let err = table_from(&rows).unwrap_err();
        assert!(err.to_string().contains("Deployment Year"));
    }

    #[test]
    fn test_empty_sheet() {
        assert!(table_from(&[]).is_err());
    }

    #[test]
    fn test_unreadable_years_are_skipped() {
        let rows = vec![
            vec![s("Deployment Year"), s("Station")],
            vec![Data::Float(2014.0), s("Fan Pier")],
            vec![s("someday"), s("Planned")],
            vec![Data::Error(CellErrorType::NA), s("Broken")],
            vec![Data::Float(2014.5), s("Odd")],
            vec![Data::Bool(true), s("Flag")],
            vec![Data::Int(2016), s("Kendall T")],
        ];
        let table = table_from(&rows).unwrap();

        assert_eq!(table.len(), 6);
        let years: Vec<_> = table.records().iter().map(|r| r.deployment_year).collect();
        assert_eq!(years, vec![Some(2014), None, None, None, None, Some(2016)]);
        assert_eq!(table.records()[2].field("Station"), Some("Broken"));
    }

    #[test]
    fn test_year_from_cell_errors() {
        assert!(year_from_cell(&s("someday")).is_err());
        assert!(year_from_cell(&Data::Error(CellErrorType::NA)).is_err());
        assert_eq!(year_from_cell(&s("  ")).unwrap(), None);
        assert_eq!(year_from_cell(&s("2013")).unwrap(), Some(2013));
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(DeploymentTable::from_bytes(b"not a workbook".to_vec()).is_err());
    }
}
