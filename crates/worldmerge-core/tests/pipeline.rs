use std::fs;
use std::path::{Path, PathBuf};

use worldmerge_core::{run, MergeConfig, MergePolicy, PipelineError};
use worldmerge_parser::LoadError;

fn fixture_dir(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../worldmerge-parser/tests/data")
        .join(name)
}

fn read_rows(path: &Path) -> (String, Vec<Vec<String>>) {
    let text = fs::read_to_string(path).expect("output missing");
    let mut lines = text.lines();
    let header = lines.next().expect("empty output").to_string();
    let rows = lines
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect();
    (header, rows)
}

fn number(cell: &str) -> Option<f64> {
    if cell.is_empty() {
        None
    } else {
        Some(cell.parse().expect("numeric cell"))
    }
}

#[test]
fn latest_snapshot_keeps_one_row_per_country() {
    let out = tempfile::tempdir().unwrap();
    let output = out.path().join("merged_latest.csv");
    let config = MergeConfig::latest_snapshot()
        .with_data_dir(fixture_dir("latest"))
        .with_output(&output);

    let summary = run(&config).expect("latest snapshot run failed");
    assert_eq!(summary.rows, 2);
    assert_eq!(
        summary.columns,
        ["country", "iso3", "year", "life_expectancy", "gdp_per_capita"]
    );

    let (header, rows) = read_rows(&output);
    assert_eq!(header, "country,iso3,year,life_expectancy,gdp_per_capita");

    // AFG shares 2019 and 2020; 2021 has no GDP. USA shares only 2019.
    assert_eq!(rows[0][..3], ["Afghanistan", "AFG", "2020"]);
    assert_eq!(number(&rows[0][3]), Some(62.575));
    assert_eq!(number(&rows[0][4]), Some(1968.3));
    assert_eq!(rows[1][..3], ["United States", "USA", "2019"]);
    assert_eq!(number(&rows[1][3]), Some(78.5));
    assert_eq!(number(&rows[1][4]), Some(55000.0));
}

#[test]
fn world_metrics_outer_joins_every_country_year() {
    let out = tempfile::tempdir().unwrap();
    let output = out.path().join("world_metrics.csv");
    let config = MergeConfig::world_metrics()
        .with_data_dir(fixture_dir("world"))
        .with_output(&output);

    let summary = run(&config).expect("world metrics run failed");
    assert_eq!(summary.rows, 5);

    let (header, rows) = read_rows(&output);
    assert_eq!(
        header,
        "country,iso3,year,gdp_per_capita,life_expectancy,internet_users_pct,population"
    );

    let keys: Vec<(&str, &str)> = rows
        .iter()
        .map(|row| (row[1].as_str(), row[2].as_str()))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("AFG", "2020"),
            ("BRA", "2020"),
            ("BRA", ""),
            ("USA", "2019"),
            ("USA", "2020"),
        ]
    );

    for row in &rows {
        assert_eq!(row.len(), 7);
        assert_eq!(row[1].chars().count(), 3);
    }

    // Country names only come from the GDP file.
    assert_eq!(rows[0][0], "Afghanistan");
    assert_eq!(rows[1][0], "");
    assert_eq!(rows[4][0], "United States");

    let usa_2020: Vec<Option<f64>> = rows[4][3..].iter().map(|cell| number(cell)).collect();
    assert_eq!(
        usa_2020,
        vec![Some(54000.0), Some(77.0), Some(90.9), Some(331526933.0)]
    );
    let afg: Vec<Option<f64>> = rows[0][3..].iter().map(|cell| number(cell)).collect();
    assert_eq!(afg, vec![Some(1968.3), Some(62.575), None, Some(38972236.0)]);
}

#[test]
fn reruns_are_byte_identical() {
    let out = tempfile::tempdir().unwrap();
    let first = out.path().join("first.csv");
    let second = out.path().join("second.csv");
    let base = MergeConfig::world_metrics().with_data_dir(fixture_dir("world"));

    run(&base.clone().with_output(&first)).unwrap();
    run(&base.with_output(&second)).unwrap();

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn missing_keyword_aborts_without_output() {
    let data = tempfile::tempdir().unwrap();
    fs::copy(
        fixture_dir("world/gdp-per-capita.csv"),
        data.path().join("gdp-per-capita.csv"),
    )
    .unwrap();
    let output = data.path().join("world_metrics.csv");
    let config = MergeConfig::world_metrics()
        .with_data_dir(data.path())
        .with_output(&output);

    let err = run(&config).expect_err("missing inputs must fail");
    match err {
        PipelineError::Load(LoadError::MissingFile { keyword, .. }) => {
            assert_eq!(keyword, "life-expectancy");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!output.exists());
}

#[test]
fn schema_error_leaves_previous_output_untouched() {
    let data = tempfile::tempdir().unwrap();
    for name in ["life-expectancy.csv", "internet-users.csv", "population-total.csv"] {
        fs::copy(fixture_dir("world").join(name), data.path().join(name)).unwrap();
    }
    fs::write(
        data.path().join("gdp-per-capita.csv"),
        "Entity,Code,Year,GDP per capita (constant 2017 US$)\nUnited States,USA,2019,55000\n",
    )
    .unwrap();

    let output = data.path().join("world_metrics.csv");
    fs::write(&output, "previous run\n").unwrap();

    let config = MergeConfig::world_metrics()
        .with_data_dir(data.path())
        .with_output(&output);
    let err = run(&config).expect_err("drifted GDP header must fail");
    assert!(matches!(
        err,
        PipelineError::Load(ref load) if load.is_schema_error()
    ));
    assert!(err.to_string().contains("GDP per capita (constant 2017 US$)"));
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous run\n");
}

#[test]
fn runs_from_toml_config() {
    let out = tempfile::tempdir().unwrap();
    let output = out.path().join("custom.csv");
    let config_path = out.path().join("merge.toml");
    fs::write(
        &config_path,
        format!(
            r#"
data_dir = "{data}"
output = "{output}"
policy = "latest-common-year"

[[datasets]]
metric = "internet_users_pct"
keyword = "INTERNET"
aliases = ["Internet users (% of population)", "Individuals using the Internet (% of population)"]
keep_country = true

[[datasets]]
metric = "population"
file = "population-total.csv"
"#,
            data = fixture_dir("world").display(),
            output = output.display(),
        ),
    )
    .unwrap();

    let config = MergeConfig::load(&config_path).unwrap();
    assert_eq!(config.policy, MergePolicy::LatestCommonYear);

    let summary = run(&config).unwrap();
    assert_eq!(
        summary.columns,
        ["country", "iso3", "year", "internet_users_pct", "population"]
    );

    let (_, rows) = read_rows(&output);
    let keys: Vec<(&str, &str)> = rows
        .iter()
        .map(|row| (row[1].as_str(), row[2].as_str()))
        .collect();
    assert_eq!(keys, vec![("BRA", "2020"), ("USA", "2020")]);
    assert_eq!(rows[0][0], "Brazil");
}
