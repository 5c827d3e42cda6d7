//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 具体场景测试（区间插值、FCW 合并、窗口截取）
//! - 性质测试（合并幂等、窗口钳位、KPI 类型完整性）
//! - 合成记录的端到端测试（检测 → 窗口 → KPI 表）

#[cfg(test)]
mod fixtures {
    use contracts::{channels, Recording};

    pub const HZ: f64 = 100.0;

    /// 30 s AEB drive at 100 Hz
    ///
    /// Request 0 -> 1 at 10 s, 2 at 11 s, 3 at 12.5 s, 0 at 13 s. Target
    /// deceleration -6 (PB) for 10-11 s, -15 (FB) for 11-12.5 s. Speed 50 kph
    /// until 10 s, linear to 0 at 13 s.
    pub fn aeb_drive(name: &str) -> Recording {
        let n = 3000;
        let mut request = vec![0.0; n];
        let mut decel = vec![0.0; n];
        let mut speed = vec![50.0; n];
        for i in 0..n {
            match i {
                1000..=1099 => {
                    request[i] = 1.0;
                    decel[i] = -6.0;
                }
                1100..=1249 => {
                    request[i] = 2.0;
                    decel[i] = -15.0;
                }
                1250..=1299 => request[i] = 3.0,
                _ => {}
            }
            if i >= 1000 {
                speed[i] = if i >= 1300 {
                    0.0
                } else {
                    50.0 * (1300 - i) as f64 / 300.0
                };
            }
        }
        Recording::with_equidistant_time(name, n, 1.0 / HZ)
            .with_channel(channels::AEB_REQUEST, request)
            .unwrap()
            .with_channel(channels::AEB_TARGET_DECEL, decel)
            .unwrap()
            .with_channel(channels::EGO_SPEED_KPH, speed)
            .unwrap()
    }

    /// 1 Hz FCW request with two bursts of two samples each
    pub fn fcw_request(bursts: &[usize], n: usize) -> Recording {
        let mut request = vec![0.0; n];
        for &start in bursts {
            request[start] = 2.0;
            request[start + 1] = 2.0;
        }
        Recording::with_equidistant_time("fcw_drive", n, 1.0)
            .with_channel(channels::FCW_REQUEST, request)
            .unwrap()
            .with_channel(channels::EGO_SPEED_KPH, vec![60.0; n])
            .unwrap()
    }

    pub const CONFIG_TOML: &str = r#"
round_decimals = 3

[aeb]
pb_truncate_at_fb = true

[calibration.SteeringWheelAngle_Th]
x = [0.0, 50.0, 100.0]
y = [5.0, 10.0, 20.0]

[calibration.PedalPosProIncrease_Th]
x = [0.0, 100.0]
y = [0.1, 0.2]
"#;
}

#[cfg(test)]
mod scenario_tests {
    use contracts::{channels, CalibrationTable, EventBoundary, EventKind, Recording};
    use event_detector::{detect_fcw_events, merge_events};
    use kpi_engine::find_intervention_start;
    use segmenter::extract_windows;
    use signal_tools::interpolate;

    #[test]
    fn test_intervention_start_less_or_tolerance() {
        let decel = [0.0, 0.0, -1.0, -7.0, -7.0, -7.0, 0.0, 0.0];
        let time: Vec<f64> = (0..decel.len()).map(|i| i as f64 * 0.1).collect();
        let start = find_intervention_start(&time, &decel, -6.0, 0.1).unwrap();
        assert_eq!(start.index, 3);
    }

    #[test]
    fn test_fcw_bursts_within_merge_window_merge() {
        let request = [0.0, 0.0, 2.0, 2.0, 0.0, 0.0, 3.0, 3.0, 0.0];
        let time: Vec<f64> = (0..request.len()).map(|i| i as f64).collect();
        let events = detect_fcw_events(&time, &request, &[2, 3], 2.0);
        assert_eq!(events, vec![EventBoundary::new(2.0, 8.0)]);

        let raw = [EventBoundary::new(2.0, 4.0), EventBoundary::new(6.0, 8.0)];
        assert_eq!(merge_events(&raw, 2.0), events);
    }

    #[test]
    fn test_calibration_interpolation_and_clamp() {
        let table = CalibrationTable::new(vec![0.0, 50.0, 100.0], vec![5.0, 10.0, 20.0]).unwrap();
        assert!((interpolate(&table, 75.0).unwrap() - 15.0).abs() < 1e-12);
        assert_eq!(interpolate(&table, 200.0).unwrap(), 20.0);
    }

    #[test]
    fn test_open_window_end_clamped_to_source() {
        let source = Recording::with_equidistant_time("drive", 121, 0.1)
            .with_channel(channels::EGO_SPEED_KPH, vec![30.0; 121])
            .unwrap();
        let extraction = extract_windows(
            &source,
            EventKind::Aeb,
            &[EventBoundary::open(10.0)],
            6.0,
            3.0,
        );
        let w = &extraction.windows[0];
        assert!((w.start - 4.0).abs() < 1e-9);
        assert!((w.end - 12.0).abs() < 1e-9);
    }
}

#[cfg(test)]
mod property_tests {
    use contracts::{ChannelStore, ColumnType, EventBoundary, EventKind, KpiValue};
    use event_detector::merge_events;
    use kpi_engine::KpiEngine;
    use segmenter::extract_windows;
    use signal_tools::interpolate;

    use crate::fixtures;

    #[test]
    fn test_merge_is_idempotent() {
        let raw: Vec<EventBoundary> = [(0.0, 1.0), (2.5, 3.0), (9.0, 9.5), (10.0, 14.0), (20.0, 21.0)]
            .iter()
            .map(|&(s, e)| EventBoundary::new(s, e))
            .collect();
        for window in [0.5, 1.5, 2.0, 7.0] {
            let once = merge_events(&raw, window);
            assert_eq!(merge_events(&once, window), once, "merge window {window}");
        }
    }

    #[test]
    fn test_interpolation_clamps_and_hits_breakpoints() {
        let table = contracts::CalibrationTable::new(vec![10.0, 20.0, 40.0], vec![1.0, 3.0, 2.0]).unwrap();
        for q in [-100.0, 0.0, 9.999] {
            assert_eq!(interpolate(&table, q).unwrap(), 1.0);
        }
        for q in [40.001, 1e6] {
            assert_eq!(interpolate(&table, q).unwrap(), 2.0);
        }
        for (x, y) in table.x.iter().zip(&table.y) {
            assert_eq!(interpolate(&table, *x).unwrap(), *y);
        }
    }

    #[test]
    fn test_windows_stay_inside_source() {
        let source = fixtures::fcw_request(&[1, 25], 30);
        let (t_min, t_max) = (source.t_min().unwrap(), source.t_max().unwrap());
        let boundaries = [
            EventBoundary::new(1.0, 3.0),
            EventBoundary::new(25.0, 27.0),
            EventBoundary::open(29.0),
        ];
        let extraction = extract_windows(&source, EventKind::Fcw, &boundaries, 6.0, 3.0);
        assert_eq!(extraction.windows.len(), 3);
        for w in &extraction.windows {
            assert!(t_min <= w.start && w.start < w.end && w.end <= t_max, "{}", w.name);
        }
    }

    #[test]
    fn test_every_cell_matches_its_declared_type() {
        let engine = KpiEngine::new(&Default::default()).unwrap();
        let source = fixtures::aeb_drive("drive");
        // one window with an event, one without any signal at all
        let mut windows = extract_windows(
            &source,
            EventKind::Aeb,
            &[EventBoundary::new(10.0, 13.0)],
            6.0,
            3.0,
        )
        .windows;
        let mut empty = windows[0].clone();
        empty.name = "drive_aeb_02".into();
        empty.recording = contracts::Recording::with_equidistant_time("empty", 10, 0.1);
        windows.push(empty);

        let table = engine.compute_table(EventKind::Aeb, &windows).unwrap();
        for row in table.rows() {
            for (spec, value) in table.schema().columns().iter().zip(row.values) {
                assert_eq!(value.column_type(), spec.ty, "{} in {}", spec.name, row.label);
                if spec.ty == ColumnType::Double && (spec.name == "pbDur" || spec.name == "fbDur") {
                    let KpiValue::Double(v) = value else { unreachable!() };
                    assert!(*v >= 0.0, "{} = {v} in {}", spec.name, row.label);
                }
            }
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{columns, EventKind};
    use ingestion::{IngestionConfig, RecordingLoader};
    use kpi_engine::KpiEngine;
    use observability::BatchMetricsAggregator;
    use segmenter::{list_windows, load_window, FileSink, FileSinkConfig, MemorySink, Segmenter};

    use crate::fixtures;

    fn close(actual: Option<f64>, expected: f64) -> bool {
        actual.is_some_and(|v| (v - expected).abs() < 1e-6)
    }

    /// Synthetic AEB drive -> transition detection -> window -> KPI row
    #[test]
    fn test_e2e_aeb_in_memory() {
        let config = ConfigLoader::load_from_str(fixtures::CONFIG_TOML, ConfigFormat::Toml).unwrap();
        let segmenter = Segmenter::new(config.params.segmentation.clone());
        let engine = KpiEngine::new(&config).unwrap();

        let mut sink = MemorySink::new("mem");
        let report = segmenter
            .segment(&fixtures::aeb_drive("drive"), EventKind::Aeb, &mut sink)
            .unwrap();
        assert_eq!(report.windows, vec!["drive_aeb_01".to_string()]);
        let window = &sink.windows()[0];
        // event 10-13 s padded by 6 s / 3 s
        assert!((window.start - 4.0).abs() < 1e-6);
        assert!((window.end - 16.0).abs() < 1e-6);

        let table = engine.compute_table(EventKind::Aeb, sink.windows()).unwrap();
        assert!(table.is_finalized());
        assert_eq!(table.label(0), Some("drive_aeb_01"));
        assert!(close(table.get_f64(0, columns::AEB_INTV_START_TIME), 10.0));
        // decel recovery (12.5 s) precedes standstill (13 s)
        assert!(close(table.get_f64(0, columns::AEB_INTV_END_TIME), 12.5));
        assert!(close(table.get_f64(0, columns::INTV_DUR), 2.5));
        assert_eq!(table.get_bool(0, columns::IS_VEH_STOPPED), Some(true));
        assert!(close(table.get_f64(0, columns::VEH_SPD), 50.0));

        assert!(close(table.get_f64(0, columns::PB_DUR), 0.99));
        assert!(close(table.get_f64(0, columns::FB_DUR), 1.49));
        assert_eq!(table.get_bool(0, columns::IS_PB_ON), Some(true));
        assert_eq!(table.get_bool(0, columns::IS_FB_ON), Some(true));

        // 50 kph on the calibration tables; pedal table normalized to percent
        assert!(close(table.get_f64(0, columns::STEER_ANG_TH), 10.0));
        assert!(close(table.get_f64(0, columns::PEDAL_POS_INC_TH), 15.0));
        assert!(table.get_f64(0, columns::LAT_ACCEL_TH).unwrap().is_nan());
    }

    /// JSON recording on disk -> loader -> file sink -> reload -> KPI table
    #[test]
    fn test_e2e_fcw_through_files() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        let source = fixtures::fcw_request(&[5, 8, 20], 30);
        let request: Vec<f64> = contracts::ChannelStore::channel(&source, contracts::channels::FCW_REQUEST)
            .unwrap()
            .to_vec();
        let doc = serde_json::json!({
            "sample_rate_hz": 1.0,
            "channels": {
                "FcwReq": request,
                "VehSpd": vec![60.0; 30],
            }
        });
        let path = input.path().join("fcw_drive.json");
        std::fs::write(&path, doc.to_string()).unwrap();

        let mut config = config_loader::AnalysisConfig::default();
        config
            .channels
            .insert(contracts::channels::FCW_REQUEST.into(), vec!["FcwReq".into()]);
        config
            .channels
            .insert(contracts::channels::EGO_SPEED_KPH.into(), vec!["VehSpd".into()]);

        let loader = RecordingLoader::new(IngestionConfig::from(&config));
        let segmenter = Segmenter::new(config.params.segmentation.clone());
        let engine = KpiEngine::new(&config).unwrap();
        let mut batch = BatchMetricsAggregator::new();

        {
            let recording = loader.load(&path).unwrap();
            let mut sink = FileSink::new("files", FileSinkConfig::new(output.path())).unwrap();
            let report = segmenter.segment(&recording, EventKind::Fcw, &mut sink).unwrap();
            batch.update_segmentation(
                EventKind::Fcw,
                report.events,
                &report.window_durations,
                report.discarded.len(),
            );
            batch.recording_done();
        }

        // bursts at 5 s and 8 s merge (gap 1 s), 20 s stays separate
        let paths = list_windows(output.path(), EventKind::Fcw).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("fcw_drive_fcw_01.json"));

        let windows: Vec<_> = paths.iter().map(|p| load_window(p).unwrap()).collect();
        let table = engine.compute_table(EventKind::Fcw, &windows).unwrap();
        assert!(close(table.get_f64(0, columns::LOG_TIME), 5.0));
        assert!(close(table.get_f64(1, columns::LOG_TIME), 20.0));
        assert!(close(table.get_f64(1, columns::VEH_SPD), 60.0));
        // no brake signals: brake jerk KPIs zero-filled
        assert!(close(table.get_f64(0, columns::BRAKE_JERK_DUR), 0.0));

        let summary = batch.summary();
        assert_eq!(summary.events.get(&EventKind::Fcw), Some(&2));
        assert_eq!(summary.windows.get(&EventKind::Fcw), Some(&2));
    }

    #[test]
    fn test_e2e_both_kinds_from_one_recording() {
        let segmenter = Segmenter::default();
        let recording = fixtures::aeb_drive("mixed");
        let mut sink = MemorySink::new("mem");

        let aeb = segmenter.segment(&recording, EventKind::Aeb, &mut sink).unwrap();
        // no FCW request channel on this drive
        assert!(segmenter.segment(&recording, EventKind::Fcw, &mut sink).is_err());
        assert_eq!(aeb.events, 1);
        assert_eq!(sink.len(), 1);
    }
}
