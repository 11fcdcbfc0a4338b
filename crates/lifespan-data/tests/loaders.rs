//! Loader tests over inline text and the sample files in `data/`.

#![allow(
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing,
    clippy::float_cmp
)]

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use lifespan_core::config::DataConfig;
use lifespan_data::{
    DataError, load_bandwidths_from_reader, load_country_shapes_from_reader, load_dataset,
    load_games_from_reader, load_life_table_from_reader,
};
use lifespan_types::{AgeBracket, AttributeKey, GameSeason, Gender};

const LIFE_TABLE: &str = "\
country,country_code,region,year,life_expect,life_expectancy_male,life_expectancy_female,bmi,doctors,hospitals,male_0_1,male_85_plus,female_0_1,female_85_plus
Chad,TCD,Africa,2000,47.5,46.1,48.9,21.0,,3,0.11,1.0,0.09,1.0
Chad,TCD,Africa,2001.0,48.0,46.6,49.4,21.2,0.4,3,0.10,1.0,,1.0
";

#[test]
fn life_table_rows_and_columns() {
    let rows = load_life_table_from_reader(LIFE_TABLE.as_bytes()).unwrap();
    assert_eq!(rows.len(), 2);

    let first = &rows[0];
    assert_eq!(first.country, "Chad");
    assert_eq!(first.country_code, "TCD");
    assert_eq!(first.year, 2000);
    assert_eq!(first.life_expectancy_for(Gender::Male), Some(46.1));
    assert_eq!(first.indicator(AttributeKey::Bmi), Some(21.0));
    assert_eq!(first.indicator(AttributeKey::Doctors), None);
    assert_eq!(first.mortality.len(), 4);

    let open_ended = first
        .brackets_for(Gender::Male)
        .find(|b| b.bracket.upper.is_none())
        .unwrap();
    assert_eq!(open_ended.bracket, AgeBracket { lower: 85, upper: None });
    assert_eq!(open_ended.column, "male_85_plus");

    let second = &rows[1];
    assert_eq!(second.year, 2001);
    assert_eq!(second.indicator(AttributeKey::Doctors), Some(0.4));
    let infant = second
        .brackets_for(Gender::Female)
        .find(|b| b.bracket.lower == 0)
        .unwrap();
    assert_eq!(infant.probability, None);
}

#[test]
fn life_table_without_year_column_fails() {
    let err = load_life_table_from_reader("country,bmi\nChad,21\n".as_bytes()).unwrap_err();
    assert!(matches!(
        err,
        DataError::MissingColumn { column: "year", .. }
    ));
}

#[test]
fn life_table_rejects_garbage_numbers() {
    let csv = "country,year,bmi\nChad,2000,heavy\n";
    let err = load_life_table_from_reader(csv.as_bytes()).unwrap_err();
    match err {
        DataError::InvalidNumber { row, column, .. } => {
            assert_eq!(row, 1);
            assert_eq!(column, "bmi");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn bandwidth_rows_start_in_2000() {
    let csv = "bmi,doctors,notes\n0.6,0.7,x\n0.5,,y\n";
    let table = load_bandwidths_from_reader(csv.as_bytes()).unwrap();
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.get(2000, AttributeKey::Doctors), Some(0.7));
    assert_eq!(table.get(2001, AttributeKey::Bmi), Some(0.5));
    assert_eq!(table.get(2001, AttributeKey::Doctors), None);
    assert_eq!(table.get(1999, AttributeKey::Bmi), None);
}

#[test]
fn games_parse_dates_and_seasons() {
    let csv = "\
game_slug,game_end_date,game_start_date,game_season,game_year
sydney-2000,2000-10-01T00:00:00Z,2000-09-15T00:00:00Z,Summer,2000
salt-lake-city-2002,2/24/2002,2/8/2002,Winter,2002
";
    let games = load_games_from_reader(csv.as_bytes()).unwrap();
    assert_eq!(games.len(), 2);
    assert_eq!(
        games[0].start_date,
        NaiveDate::from_ymd_opt(2000, 9, 15).unwrap()
    );
    assert_eq!(games[0].season, GameSeason::Summer);
    assert_eq!(
        games[1].end_date,
        NaiveDate::from_ymd_opt(2002, 2, 24).unwrap()
    );
    assert_eq!(games[1].season, GameSeason::Winter);
}

#[test]
fn games_with_unknown_season_fail() {
    let csv = "game_end_date,game_start_date,game_season,game_year\n2000-10-01,2000-09-15,Autumn,2000\n";
    let err = load_games_from_reader(csv.as_bytes()).unwrap_err();
    assert!(matches!(err, DataError::UnknownValue { row: 1, .. }));
}

#[test]
fn shapes_join_hdi_by_name() {
    let topology = r#"{
        "type": "Topology",
        "objects": {"countries": {"type": "GeometryCollection", "geometries": [
            {"type": "Polygon", "arcs": [[0]], "properties": {"name": "Chad"}},
            {"type": "Polygon", "arcs": [[1]], "properties": {"name": "Greenland"}},
            {"type": "Polygon", "arcs": [[2]]}
        ]}},
        "arcs": []
    }"#;
    let hdi = "country,HDI_2000,HDI_2016\nChad,0.29,\nNorway,0.91,0.95\n";

    let shapes = load_country_shapes_from_reader(topology.as_bytes(), hdi.as_bytes()).unwrap();
    assert_eq!(shapes.len(), 2);

    let chad = &shapes[0];
    assert_eq!(chad.name, "Chad");
    assert_eq!(chad.hdi.len(), 17);
    assert_eq!(chad.hdi_for(2000), 0.29);
    assert_eq!(chad.hdi_for(2016), 0.0);

    let greenland = &shapes[1];
    assert!(greenland.hdi.values().all(|v| *v == 0.0));
}

#[test]
fn topology_without_countries_fails() {
    let err = load_country_shapes_from_reader(
        r#"{"objects": {"land": {}}}"#.as_bytes(),
        "country\n".as_bytes(),
    )
    .unwrap_err();
    assert!(matches!(err, DataError::Json(_)));
}

fn sample_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("data")
}

#[test]
fn sample_dataset_loads() {
    let mut config = DataConfig::default();
    config.relocate(&sample_dir());
    let dataset = load_dataset(&config).unwrap();

    assert!(dataset.countries().contains("Canada"));
    assert!(dataset.years().contains(&2015));
    assert_eq!(dataset.bandwidths.rows.len(), 17);
    assert!(dataset.games.iter().any(|g| g.year == 2000));
    assert!(dataset.shapes.iter().any(|s| s.name == "Greenland"));
    assert!(dataset.life_table.iter().all(|r| r.mortality.len() == 38));
}

#[test]
fn missing_file_names_the_path() {
    let mut config = DataConfig::default();
    config.relocate(Path::new("/nonexistent/lifespan"));
    let err = load_dataset(&config).unwrap_err();
    match err {
        DataError::Open { path, .. } => assert!(path.ends_with("who_life_exp.csv")),
        other => panic!("unexpected error: {other}"),
    }
}
