use super::*;

#[test]
fn defaults_match_reference_constants() {
    let cfg = PipelineConfig::default();
    assert_eq!(cfg.target_fps, 30);
    assert_eq!(cfg.max_pending, 2);
    assert_eq!(cfg.icon, Canvas::new(96, 96));
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.tick_interval(), Duration::from_millis(33));
}

#[test]
fn max_outstanding_is_bounded_by_workers_and_fps() {
    let cfg = PipelineConfig {
        target_fps: 4,
        ..PipelineConfig::default()
    };
    assert_eq!(cfg.max_outstanding(16), 4);
    assert_eq!(cfg.max_outstanding(2), 2);
    assert_eq!(cfg.max_outstanding(0), 1);
}

#[test]
fn validate_rejects_degenerate_values() {
    let bad = [
        PipelineConfig {
            target_fps: 0,
            ..PipelineConfig::default()
        },
        PipelineConfig {
            max_pending: 0,
            ..PipelineConfig::default()
        },
        PipelineConfig {
            icon: Canvas::new(0, 96),
            ..PipelineConfig::default()
        },
        PipelineConfig {
            workers: Some(0),
            ..PipelineConfig::default()
        },
    ];
    for cfg in bad {
        assert!(matches!(cfg.validate(), Err(PlasmaError::Validation(_))));
    }
}

#[test]
fn partial_json_keeps_defaults() {
    let cfg: PipelineConfig =
        serde_json::from_str(r#"{ "target_fps": 24, "icon": { "width": 64, "height": 48 } }"#)
            .unwrap();
    assert_eq!(cfg.target_fps, 24);
    assert_eq!(cfg.max_pending, 2);
    assert_eq!(cfg.icon, Canvas::new(64, 48));
    assert_eq!(cfg.workers, None);
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(serde_json::from_str::<PipelineConfig>(r#"{ "fps": 24 }"#).is_err());
}

#[test]
fn from_json_path_validates() {
    let dir = std::path::PathBuf::from("target").join("config_unit");
    std::fs::create_dir_all(&dir).unwrap();

    let ok = dir.join("ok.json");
    std::fs::write(&ok, r#"{ "max_pending": 4, "workers": 3 }"#).unwrap();
    let cfg = PipelineConfig::from_json_path(&ok).unwrap();
    assert_eq!(cfg.max_pending, 4);
    assert_eq!(cfg.worker_count(), 3);

    let bad = dir.join("bad.json");
    std::fs::write(&bad, r#"{ "target_fps": 0 }"#).unwrap();
    assert!(PipelineConfig::from_json_path(&bad).is_err());

    assert!(PipelineConfig::from_json_path(&dir.join("missing.json")).is_err());
}
