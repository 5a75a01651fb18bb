//! End-to-end tests of the boundary pipeline
//!
//! Station files are written to temporary directories in the USGS RDB
//! layout and run through configuration loading, extraction, alignment and
//! table writing.

use gauge_boundary::config::SourceFormat;
use gauge_boundary::matrix::RawMatrix;
use gauge_boundary::models::Sample;
use gauge_boundary::unify::unify;
use gauge_boundary::{
    BoundaryConfig, BoundaryError, BoundaryProcessor, LeadingFill, SeriesKind, StationConfig,
    StationSeries, UnitSystem,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const CFS_TO_CMS: f64 = 0.3048 * 0.3048 * 0.3048;

/// Write a USGS-style station file with 15-minute readings
fn write_station(dir: &Path, site: &str, values: &[f64]) -> PathBuf {
    let mut text = String::new();
    text.push_str("# ------------------------------ WARNING ------------------------------\n");
    text.push_str("# Provisional data are subject to revision.\n");
    text.push_str(&format!("# Data for site {}\n", site));
    text.push_str("agency_cd\tsite_no\tdatetime\ttz_cd\t150_00060\t150_00060_cd\n");
    text.push_str("5s\t15s\t20d\t6s\t14n\t10s\n");
    for (i, value) in values.iter().enumerate() {
        let minutes = i * 15;
        text.push_str(&format!(
            "USGS\t{}\t2019-05-01 {:02}:{:02}\tCDT\t{}\tP\n",
            site,
            minutes / 60,
            minutes % 60,
            value
        ));
    }
    let path = dir.join(format!("{}.txt", site));
    fs::write(&path, text).unwrap();
    path
}

fn series(
    name: &str,
    kind: SeriesKind,
    units: UnitSystem,
    shift: Option<f64>,
    samples: &[(f64, f64)],
) -> StationSeries {
    StationSeries {
        name: name.to_string(),
        kind,
        unit_system: units,
        datum_shift: shift,
        samples: samples.iter().map(|&(t, v)| Sample::new(t, v)).collect(),
    }
}

#[test]
fn test_two_station_alignment_scenario() {
    let a = series(
        "A",
        SeriesKind::Discharge,
        UnitSystem::Imperial,
        None,
        &[(0.0, 10.0), (60.0, 20.0)],
    );
    let b = series(
        "B",
        SeriesKind::Stage,
        UnitSystem::Metric,
        Some(1.0),
        &[(0.0, 2.0), (30.0, 4.0), (60.0, 6.0)],
    );
    let stations = vec![
        StationConfig::new("A", "A.txt", SeriesKind::Discharge).with_units(UnitSystem::Imperial),
        StationConfig::new("B", "B.txt", SeriesKind::Stage)
            .with_units(UnitSystem::Metric)
            .with_datum_shift(1.0),
    ];

    let matrix = RawMatrix::assemble(&[a, b], &stations).unwrap();
    let table = unify(&matrix, LeadingFill::FirstKnown).unwrap();

    assert_eq!(table.time, vec![0.0, 30.0, 60.0]);
    assert_eq!(table.reference_name(), "B");
    assert_eq!(table.columns[1].values, vec![3.0, 5.0, 7.0]);

    let expected = [10.0 * CFS_TO_CMS, 15.0 * CFS_TO_CMS, 20.0 * CFS_TO_CMS];
    for (got, want) in table.columns[0].values.iter().zip(expected) {
        assert!((got - want).abs() < 1e-12, "{} != {}", got, want);
    }
}

#[test]
fn test_reference_axis_from_station_with_most_samples() {
    let dir = TempDir::new().unwrap();
    let ramp = |n: usize| (0..n).map(|i| 100.0 + i as f64).collect::<Vec<_>>();

    let stations = [("s10", 10), ("s25", 25), ("s15", 15)]
        .into_iter()
        .map(|(site, count)| {
            let path = write_station(dir.path(), site, &ramp(count));
            StationConfig::new(site, path, SeriesKind::Discharge)
        })
        .collect();
    let config = BoundaryConfig::new(stations).with_output_path(dir.path().join("bc.xls"));

    let processor = BoundaryProcessor::new(config).unwrap();
    let (table, samples_read) = processor.build_table().unwrap();

    assert_eq!(samples_read, 50);
    assert_eq!(table.rows(), 25);
    assert_eq!(table.reference_name(), "s25");
    assert_eq!(table.time[24], 24.0 * 900.0);

    // Shorter stations hold their last value once their record ends
    let s10 = &table.columns[0].values;
    assert!((s10[9] - 109.0 * CFS_TO_CMS).abs() < 1e-9);
    assert_eq!(s10[9], s10[24]);
}

#[test]
fn test_pipeline_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let flow = write_station(dir.path(), "05586100", &[81200.0, 81300.0, 81250.0, 81100.0]);
    let stage = write_station(dir.path(), "05587450", &[14.2, 14.25]);
    let output = dir.path().join("liquid_boundary.xls");

    let config = BoundaryConfig::new(vec![
        StationConfig::new("05586100", flow, SeriesKind::Discharge),
        StationConfig::new("05587450", stage, SeriesKind::Stage).with_datum_shift(127.6),
    ])
    .with_output_path(&output);
    let processor = BoundaryProcessor::new(config).unwrap();

    let first = processor.process().unwrap();
    let first_bytes = fs::read(&output).unwrap();
    let second = processor.process().unwrap();
    let second_bytes = fs::read(&output).unwrap();

    assert!(!first.previous_output_removed);
    assert!(second.previous_output_removed);
    assert_eq!(first_bytes, second_bytes);
}

#[test]
fn test_legacy_user_input_run() {
    let dir = TempDir::new().unwrap();
    write_station(dir.path(), "05586100", &[1000.0, 2000.0, 3000.0]);
    write_station(dir.path(), "05587450", &[10.0, 12.0]);
    fs::write(
        dir.path().join("user_input.csv"),
        "05586100.txt,05587450.txt\n4,4\nQ(1),SL(2)\nm3/s,m\nnan,100.0\n",
    )
    .unwrap();

    let config = BoundaryConfig::load(&dir.path().join("user_input.csv")).unwrap();
    let stats = BoundaryProcessor::new(config).unwrap().process().unwrap();

    assert_eq!(stats.output_path, dir.path().join("liquid_boundary.xls"));
    let text = fs::read_to_string(&stats.output_path).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "#");
    assert_eq!(lines[1], "T\tQ(1)\tSL(2)");
    assert_eq!(lines[2], "s\tm3/s\tm");
    assert_eq!(lines.len(), 6);

    // 10 ft + 100 m datum, then 12 ft + datum carried to the last row
    assert_eq!(lines[3], "0.0000\t28.3168\t103.0480");
    assert_eq!(lines[4], "900.0000\t56.6337\t103.6576");
    assert_eq!(lines[5], "1800.0000\t84.9505\t103.6576");
}

#[test]
fn test_toml_run_with_second_resolution_timestamps() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("a.rdb"),
        "% gauge A\ntime\tflow\n2021-01-01 00:00:00\t10\n2021-01-01 00:01:00\t20\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("b.rdb"),
        "% gauge B\ntime\tstage\n\
         2021-01-01 00:00:00\t2\n\
         2021-01-01 00:00:30\t4\n\
         2021-01-01 00:01:00\t6\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("stations.toml"),
        r#"
output = "out/boundary.txt"
precision = 6

[source]
comment_marker = "%"
trailing_header_rows = 1
timestamp_format = "%Y-%m-%d %H:%M:%S"

[[stations]]
name = "A"
path = "a.rdb"
kind = "Q"
units = "imperial"
time_column = 0
value_column = 1

[[stations]]
name = "B"
path = "b.rdb"
kind = "H"
units = "metric"
datum_shift = 1.0
time_column = 0
value_column = 1
"#,
    )
    .unwrap();

    let config = BoundaryConfig::load(&dir.path().join("stations.toml")).unwrap();
    assert_eq!(
        config.source,
        SourceFormat {
            comment_marker: '%',
            trailing_header_rows: 1,
            timestamp_format: "%Y-%m-%d %H:%M:%S".to_string(),
        }
    );

    let stats = BoundaryProcessor::new(config).unwrap().process().unwrap();
    assert_eq!(stats.reference_station, "B");

    let text = fs::read_to_string(dir.path().join("out").join("boundary.txt")).unwrap();
    let rows: Vec<&str> = text.lines().skip(3).collect();
    assert_eq!(
        rows,
        vec![
            "0.000000\t0.283168\t3.000000",
            "30.000000\t0.424753\t5.000000",
            "60.000000\t0.566337\t7.000000",
        ]
    );
}

#[test]
fn test_missing_value_aborts_run() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gap.txt");
    fs::write(
        &path,
        "# gap\nagency_cd\tsite_no\tdatetime\ttz_cd\tvalue\tcd\n5s\t15s\t20d\t6s\t14n\t10s\n\
         USGS\tgap\t2019-05-01 00:00\tCDT\t5.0\tP\n\
         USGS\tgap\t2019-05-01 00:15\tCDT\t\tIce\n",
    )
    .unwrap();
    let output = dir.path().join("liquid_boundary.xls");

    let config = BoundaryConfig::new(vec![StationConfig::new("gap", &path, SeriesKind::Stage)])
        .with_output_path(&output);
    let err = BoundaryProcessor::new(config.clone())
        .unwrap()
        .process()
        .unwrap_err();

    assert!(matches!(err, BoundaryError::MissingColumn { line: 5, column: 4, .. }));
    assert!(!output.exists());

    // The same file goes through once invalid values are skipped
    let stats = BoundaryProcessor::new(config.with_skip_invalid_values(true))
        .unwrap()
        .process()
        .unwrap();
    assert_eq!(stats.samples_read, 1);
    assert_eq!(stats.output_rows, 1);
}

#[test]
fn test_leading_gap_policy() {
    let dir = TempDir::new().unwrap();
    let reference = write_station(dir.path(), "ref", &[1.0, 2.0, 3.0]);
    let late = dir.path().join("late.txt");
    fs::write(
        &late,
        "# late\nagency_cd\tsite_no\tdatetime\ttz_cd\tvalue\tcd\n5s\t15s\t20d\t6s\t14n\t10s\n\
         USGS\tlate\t2019-05-01 00:00\tCDT\tEqp\tP\n\
         USGS\tlate\t2019-05-01 00:15\tCDT\t8.0\tP\n",
    )
    .unwrap();

    let config = BoundaryConfig::new(vec![
        StationConfig::new("ref", reference, SeriesKind::Stage),
        StationConfig::new("late", &late, SeriesKind::Stage),
    ])
    .with_output_path(dir.path().join("bc.xls"))
    .with_skip_invalid_values(true);

    let (table, _) = BoundaryProcessor::new(config.clone())
        .unwrap()
        .build_table()
        .unwrap();
    let late_values = &table.columns[1].values;
    assert_eq!(late_values[0], late_values[1]);
    assert!((late_values[1] - 8.0 * 0.3048).abs() < 1e-12);

    let err = BoundaryProcessor::new(config.with_leading_fill(LeadingFill::Reject))
        .unwrap()
        .build_table()
        .unwrap_err();
    assert_eq!(err.category(), "degenerate-series");
}
