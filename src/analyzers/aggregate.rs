use crate::analyzers::types::{DistrictDockAverage, DistrictStationCount, YearCount};
use crate::analyzers::utility::{mean, pct};
use crate::datasets::{DeploymentTable, StationColumn, StationTable};
use anyhow::bail;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Counts distinct station numbers per district, ordered by district name.
pub fn stations_per_district(table: &StationTable) -> Vec<DistrictStationCount> {
    let mut groups: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();

    for station in table.stations() {
        groups
            .entry(station.district.as_str())
            .or_default()
            .insert(station.number.as_str());
    }

    groups
        .into_iter()
        .map(|(district, numbers)| DistrictStationCount {
            district: district.to_string(),
            stations: numbers.len(),
        })
        .collect()
}

/// Mean `Total docks` per district, ordered by district name.
///
/// Districts whose dock cells are all blank are left out.
///
/// # Errors
///
/// Fails if the table has no `Total docks` column, since there is nothing
/// meaningful to average.
pub fn avg_docks_per_district(table: &StationTable) -> anyhow::Result<Vec<DistrictDockAverage>> {
    if !table.has_total_docks() {
        bail!(
            "station table has no '{}' column to average",
            StationColumn::TotalDocks
        );
    }

    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();

    for station in table.stations() {
        if let Some(docks) = station.total_docks {
            groups
                .entry(station.district.as_str())
                .or_default()
                .push(docks as f64);
        }
    }

    Ok(groups
        .into_iter()
        .map(|(district, docks)| DistrictDockAverage {
            district: district.to_string(),
            average_docks: mean(&docks),
        })
        .collect())
}

/// Rows per deployment year, most frequent first.
///
/// Ties keep the order in which the years first appear. Rows without a year
/// are not counted.
pub fn deployment_year_counts(table: &DeploymentTable) -> Vec<YearCount> {
    let mut counts: Vec<(i32, usize)> = Vec::new();
    let mut slots: HashMap<i32, usize> = HashMap::new();

    for year in table.records().iter().filter_map(|r| r.deployment_year) {
        let slot = *slots.entry(year).or_insert_with(|| {
            counts.push((year, 0));
            counts.len() - 1
        });
        counts[slot].1 += 1;
    }

    // Stable sort keeps first-seen order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let total: usize = counts.iter().map(|(_, n)| n).sum();

    counts
        .into_iter()
        .map(|(year, count)| YearCount {
            year,
            count,
            percent: pct(count, total),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::{DeploymentRecord, Station};

    fn station(number: &str, district: &str, docks: Option<u32>) -> Station {
        Station {
            number: number.to_string(),
            name: number.to_string(),
            latitude: 42.35,
            longitude: -71.05,
            district: district.to_string(),
            public: None,
            total_docks: docks,
            deployment_year: None,
        }
    }

    fn stations() -> StationTable {
        StationTable::new(
            vec![
                station("D1", "Downtown", Some(10)),
                station("D2", "Downtown", Some(12)),
                station("D3", "Downtown", Some(14)),
                station("C1", "Cambridge", Some(5)),
                station("C2", "Cambridge", Some(7)),
            ],
            true,
        )
        .unwrap()
    }

    fn deployments(years: &[Option<i32>]) -> DeploymentTable {
        DeploymentTable::new(
            years
                .iter()
                .map(|y| DeploymentRecord {
                    deployment_year: *y,
                    fields: vec![],
                })
                .collect(),
        )
    }

    #[test]
    fn test_stations_per_district() {
        let counts = stations_per_district(&stations());
        assert_eq!(
            counts,
            vec![
                DistrictStationCount {
                    district: "Cambridge".into(),
                    stations: 2
                },
                DistrictStationCount {
                    district: "Downtown".into(),
                    stations: 3
                },
            ]
        );
    }

    #[test]
    fn test_station_counts_sum_to_table_size() {
        let table = stations();
        let total: usize = stations_per_district(&table).iter().map(|c| c.stations).sum();
        assert_eq!(total, table.len());
    }

    #[test]
    fn test_avg_docks_per_district() {
        let averages = avg_docks_per_district(&stations()).unwrap();
        assert_eq!(averages.len(), 2);
        assert_eq!(averages[0].district, "Cambridge");
        assert_eq!(averages[0].average_docks, 6.0);
        assert_eq!(averages[1].district, "Downtown");
        assert_eq!(averages[1].average_docks, 12.0);
    }

    #[test]
    fn test_avg_docks_skips_all_blank_district() {
        let table = StationTable::new(
            vec![station("A", "Boston", Some(4)), station("B", "Everett", None)],
            true,
        )
        .unwrap();
        let averages = avg_docks_per_district(&table).unwrap();
        assert_eq!(averages.len(), 1);
        assert_eq!(averages[0].district, "Boston");
    }

    #[test]
    fn test_avg_docks_requires_column() {
        let err = avg_docks_per_district(&stations().without_total_docks()).unwrap_err();
        assert!(err.to_string().contains("Total docks"));
    }

    #[test]
    fn test_deployment_year_counts_order() {
        let table = deployments(&[
            Some(2012),
            Some(2011),
            Some(2011),
            None,
            Some(2015),
            Some(2012),
            Some(2011),
        ]);
        let counts = deployment_year_counts(&table);

        let summary: Vec<(i32, usize)> = counts.iter().map(|c| (c.year, c.count)).collect();
        assert_eq!(summary, vec![(2011, 3), (2012, 2), (2015, 1)]);
        assert_eq!(counts[0].percent, 50.0);
    }

    #[test]
    fn test_deployment_year_ties_keep_first_seen_order() {
        let counts = deployment_year_counts(&deployments(&[Some(2019), Some(2016), Some(2017)]));
        let years: Vec<i32> = counts.iter().map(|c| c.year).collect();
        assert_eq!(years, vec![2019, 2016, 2017]);
    }

    #[test]
    fn test_deployment_year_counts_empty() {
        assert!(deployment_year_counts(&DeploymentTable::default()).is_empty());
    }
}
