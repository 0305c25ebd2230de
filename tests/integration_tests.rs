use bluebikes_explorer::analyzers::aggregate::{
    avg_docks_per_district, deployment_year_counts, stations_per_district,
};
use bluebikes_explorer::analyzers::filter::{DistrictSelector, filter_by_district};
use bluebikes_explorer::datasets::Datasets;
use bluebikes_explorer::feedback::{FeedbackEntry, Rating, append_feedback, load_feedback};
use bluebikes_explorer::views::{charts_view, district_options, district_selector, map_view};

const STATIONS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/stations.csv");
const DEPLOYMENTS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/boston_data.xlsx");

fn load() -> Datasets {
    Datasets::load(STATIONS, DEPLOYMENTS).expect("Failed to load fixtures")
}

#[test]
fn test_full_pipeline() {
    let data = load();

    assert_eq!(data.stations.len(), 5);
    assert_eq!(data.deployments.len(), 6);

    let downtown =
        filter_by_district(&data.stations, "District", &DistrictSelector::from("Downtown")).unwrap();
    assert_eq!(downtown.subset.len(), 3);
    assert_eq!(downtown.average_docks, Some(12.0));

    let counts: Vec<(String, usize)> = stations_per_district(&data.stations)
        .into_iter()
        .map(|c| (c.district, c.stations))
        .collect();
    assert_eq!(
        counts,
        vec![("Cambridge".to_string(), 2), ("Downtown".to_string(), 3)]
    );
}

#[test]
fn test_every_observed_district_filters_to_itself() {
    let data = load();

    for district in data.stations.districts() {
        let result =
            filter_by_district(&data.stations, "District", &DistrictSelector::from(district))
                .unwrap();
        assert!(!result.subset.is_empty());
        assert!(result.subset.stations().iter().all(|s| s.district == district));
    }
}

#[test]
fn test_all_selector_and_missing_docks() {
    let data = load();

    let all = filter_by_district(&data.stations, "District", &DistrictSelector::All).unwrap();
    assert_eq!(all.subset, data.stations);

    let stripped = data.stations.without_total_docks();
    let all = filter_by_district(&stripped, "District", &DistrictSelector::All).unwrap();
    assert_eq!(all.average_docks, Some(0.0));
    assert!(avg_docks_per_district(&stripped).is_err());
}

#[test]
fn test_deployment_years_from_workbook() {
    let data = load();
    let years: Vec<(i32, usize)> = deployment_year_counts(&data.deployments)
        .iter()
        .map(|y| (y.year, y.count))
        .collect();
    assert_eq!(years, vec![(2011, 3), (2012, 2), (2015, 1)]);
    assert_eq!(data.deployments.records()[0].field("Municipality"), Some("Boston"));
}

#[test]
fn test_views_from_fixtures() {
    let data = load();

    assert_eq!(
        district_options(&data.stations),
        vec!["All", "Downtown", "Cambridge"]
    );

    let map = map_view(&data, &DistrictSelector::from("Cambridge")).unwrap();
    assert_eq!(map.points.len(), 2);
    assert_eq!(map.average_docks, Some(6.0));

    let charts = charts_view(&data).unwrap();
    assert_eq!(charts.avg_docks_per_district.len(), 2);
    assert_eq!(charts.deployment_years[0].percent, 50.0);
}

#[test]
fn test_map_district_must_be_observed() {
    let data = load();

    let selector = district_selector(&data.stations, "Downtown").unwrap();
    assert_eq!(map_view(&data, &selector).unwrap().points.len(), 3);

    assert!(district_selector(&data.stations, "Nowhere").is_err());
    assert!(district_selector(&data.stations, "downtown").is_err());
}

#[test]
fn test_feedback_log() {
    let path = format!(
        "{}/bluebikes_integration_feedback.csv",
        std::env::temp_dir().display()
    );
    let _ = std::fs::remove_file(&path);

    let entry = FeedbackEntry::new("Great app", Rating::new(5).unwrap());
    append_feedback(&path, &entry).unwrap();
    assert_eq!(load_feedback(&path).unwrap(), vec![entry.clone()]);

    append_feedback(&path, &entry).unwrap();
    assert_eq!(load_feedback(&path).unwrap().len(), 2);

    std::fs::remove_file(&path).unwrap();
}
