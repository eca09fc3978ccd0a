use plateau_core::mocks::MemorySink;
use plateau_core::{
    AnalysisOptions, ExplicitPlateauSpec, PlateauError, Series, SummarySink, TimeSync,
    analyze_series,
};
use rstest::{fixture, rstest};

/// Heating run: ramp 25->55, hold 60, ramp to 80, hold 80, ramp to 100.
/// ch2 tracks ch1 with an offset; `aux` is a metadata column far outside range.
fn build_run() -> Series {
    let mut ch1 = Vec::new();
    for i in 0..900 {
        let wobble = 0.005 * (i as f64).sin();
        let v = match i {
            0..100 => 25.0 + 0.3 * i as f64,
            100..400 => 60.0 + wobble,
            400..500 => 60.0 + 0.2 * (i - 400) as f64,
            500..800 => 80.0 + wobble,
            _ => 80.0 + 0.2 * (i - 800) as f64,
        };
        ch1.push(v);
    }
    let time = (0..900).map(|i| i as f64 * 22.0).collect();
    let ch2 = ch1.iter().map(|v| v + 0.5).collect();
    Series::new(time)
        .with_channel("ch1", ch1)
        .unwrap()
        .with_channel("ch2", ch2)
        .unwrap()
        .with_channel("aux", vec![-999.0; 900])
        .unwrap()
}

#[fixture]
fn calibration_run() -> Series {
    build_run()
}

fn options() -> AnalysisOptions {
    AnalysisOptions {
        tolerance: 0.1,
        num_points: 100,
        step_size: 50,
        plateau_threshold: 1.0,
        ..AnalysisOptions::default()
    }
}

#[rstest]
fn auto_detects_both_holds(calibration_run: Series) {
    let report = analyze_series(calibration_run, &options()).unwrap();
    assert_eq!(report.channels, vec!["ch1".to_string(), "ch2".to_string()]);

    let sync = report.sync.expect("sync enabled by default");
    // first reading above 35 degC is row 34
    assert_eq!(sync.dropped_rows, 34);
    assert_eq!(report.series.len(), 866);

    let spans: Vec<_> = report.plateaus.iter().map(|p| p.rows()).collect();
    assert_eq!(spans, vec![250..350, 650..750]);
    assert!((report.plateaus[0].key - 60.0).abs() < 0.01);
    assert!((report.plateaus[1].key - 80.0).abs() < 0.01);

    let table = &report.summary;
    assert_eq!(table.plateau_count(), 2);
    assert_eq!(
        table.column_names(),
        &[
            "Plateau_1min",
            "Plateau_1mean",
            "Plateau_1max",
            "Plateau_2min",
            "Plateau_2mean",
            "Plateau_2max"
        ]
        .map(String::from)
    );
    let rows: Vec<_> = table.rows().collect();
    assert_eq!(rows[1].0, "ch2");
    assert!((rows[1].1[1] - 60.5).abs() < 0.01);
    assert!((rows[1].1[4] - 80.5).abs() < 0.01);

    let mask = report.overlay_mask();
    assert_eq!(mask.iter().filter(|m| **m).count(), 200);
    assert!(mask[250] && !mask[350] && mask[749]);
}

#[rstest]
fn explicit_ranges_replace_detection(calibration_run: Series) {
    let opts = AnalysisOptions {
        find_plateaus: false,
        explicit: Some(ExplicitPlateauSpec::new(vec![(100, 199), (500, 699)])),
        ..options()
    };
    let report = analyze_series(calibration_run, &opts).unwrap();
    let spans: Vec<_> = report.plateaus.iter().map(|p| p.rows()).collect();
    assert_eq!(spans, vec![100..200, 500..700]);
    assert_eq!(report.summary.plateau_count(), 2);
}

#[rstest]
fn explicit_mode_without_ranges_is_invalid(calibration_run: Series) {
    let opts = AnalysisOptions {
        find_plateaus: false,
        explicit: None,
        ..options()
    };
    let err = analyze_series(calibration_run, &opts).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PlateauError>(),
        Some(PlateauError::InvalidParameter(_))
    ));
}

#[rstest]
fn inverted_sync_window_is_invalid(calibration_run: Series) {
    let opts = AnalysisOptions {
        sync: Some(TimeSync {
            window_low: 45.0,
            window_high: 35.0,
            ..TimeSync::default()
        }),
        ..options()
    };
    let err = analyze_series(calibration_run, &opts).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PlateauError>(),
        Some(PlateauError::InvalidParameter(_))
    ));
}

#[rstest]
fn no_sync_keeps_all_rows(calibration_run: Series) {
    let opts = AnalysisOptions {
        sync: None,
        ..options()
    };
    let report = analyze_series(calibration_run, &opts).unwrap();
    assert!(report.sync.is_none());
    assert_eq!(report.series.len(), 900);
    assert_eq!(report.plateaus.len(), 2);
}

#[rstest]
fn fixed_channel_list_is_respected(calibration_run: Series) {
    let opts = AnalysisOptions {
        channels: vec!["ch2".to_string()],
        ..options()
    };
    let report = analyze_series(calibration_run, &opts).unwrap();
    assert_eq!(report.channels, vec!["ch2".to_string()]);
    assert_eq!(report.summary.rows().count(), 1);

    let bad = AnalysisOptions {
        channels: vec!["ch7".to_string()],
        ..options()
    };
    let err = analyze_series(build_run(), &bad).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PlateauError>(),
        Some(PlateauError::UnknownChannel(_))
    ));
}

#[rstest]
fn no_plausible_channel_is_invalid() {
    let s = Series::new(vec![0.0, 1.0])
        .with_channel("aux", vec![-999.0, -999.0])
        .unwrap();
    let err = analyze_series(s, &options()).unwrap_err();
    assert!(err.to_string().contains("no temperature channels"));
}

#[rstest]
fn empty_result_is_not_an_error(calibration_run: Series) {
    let opts = AnalysisOptions {
        num_points: 5000,
        ..options()
    };
    let report = analyze_series(calibration_run, &opts).unwrap();
    assert!(report.plateaus.is_empty());
    assert!(report.summary.is_empty());
    assert_eq!(report.summary.rows().count(), 2);
}

#[rstest]
fn reports_feed_a_sink(calibration_run: Series) {
    let report = analyze_series(calibration_run, &options()).unwrap();
    let mut sink = MemorySink::default();
    sink.write_table("run_a.txt", &report.summary).unwrap();
    sink.write_table("run_b.txt", &report.summary).unwrap();
    sink.write_table("run_a.txt", &report.summary).unwrap();
    let names: Vec<_> = sink.sheets.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["run_b.txt", "run_a.txt"]);
}
