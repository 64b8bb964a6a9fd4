//! Integration tests for grapher-core.
//!
//! These exercise the public API end-to-end: formula in, frame out.

use grapher_core::{
    evaluate, parse, share, ConfigError, DomainError, DrawCommand, EventSource, GraphError,
    GrapherConfig, HandlerResponse, InputEvent, Key, MemoryHost, MouseButton, ParseErrorKind,
    Point, ResizeMode, SampleResolution, Sampler, SamplerConfig, SessionHandle, StartupError,
    Viewport,
};

// =============================================================================
// Expression Tests
// =============================================================================

#[test]
fn test_square_is_even() {
    let expr = parse("x^2").expect("valid formula");
    assert_eq!(evaluate(&expr, 3.0), Ok(9.0));
    assert_eq!(evaluate(&expr, -3.0), Ok(9.0));
}

#[test]
fn test_reciprocal_undefined_at_zero() {
    let expr = parse("1/x").expect("valid formula");
    assert_eq!(evaluate(&expr, 0.0), Err(DomainError::DivisionByZero));
    assert_eq!(evaluate(&expr, 4.0), Ok(0.25));
}

#[test]
fn test_matches_std_functions() {
    let cases: [(&str, fn(f64) -> f64); 4] = [
        ("sin(x)", f64::sin),
        ("sqrt(x)", f64::sqrt),
        ("exp(x) - 1", |x| x.exp() - 1.0),
        ("2x + cos(x)^2", |x| 2.0 * x + x.cos().powi(2)),
    ];
    for (text, reference) in cases {
        let expr = parse(text).expect("valid formula");
        for i in 0..50 {
            let x = f64::from(i) * 0.37;
            let got = evaluate(&expr, x).expect("defined");
            assert!(
                (got - reference(x)).abs() < 1e-9,
                "{text} at {x}: {got} vs {}",
                reference(x)
            );
        }
    }
}

#[test]
fn test_parse_error_reports_position() {
    let err = parse("x+*2").unwrap_err();
    assert_eq!(err.position, 2);
    assert_eq!(err.kind, ParseErrorKind::UnexpectedToken("*".to_string()));
}

// =============================================================================
// Viewport Tests
// =============================================================================

#[test]
fn test_pan_then_zoom_keeps_anchor() {
    let mut vp = Viewport::new(-10.0, 10.0, -10.0, 10.0, 300, 300).expect("valid viewport");
    vp.pan(30.0, -15.0);
    let anchor = (75.0, 210.0);
    let before = vp.to_math(anchor.0, anchor.1);
    assert!(vp.zoom(0.5, anchor));
    let after = vp.to_math(anchor.0, anchor.1);
    assert!((before.0 - after.0).abs() < 1e-9);
    assert!((before.1 - after.1).abs() < 1e-9);
    assert!((vp.x_span() - 40.0).abs() < 1e-9);
}

#[test]
fn test_invalid_viewport_rejected() {
    assert!(matches!(
        Viewport::new(1.0, 1.0, 0.0, 1.0, 100, 100),
        Err(GraphError::InvalidViewport(_))
    ));
    assert!(Viewport::new(0.0, 1.0, 0.0, 1.0, 0, 100).is_err());
}

// =============================================================================
// Sampler Tests
// =============================================================================

#[test]
fn test_reciprocal_splits_at_pole() {
    let expr = parse("1/x").expect("valid formula");
    let vp = Viewport::new(-1.0, 1.0, -10.0, 10.0, 400, 200).expect("valid viewport");
    let runs: Vec<_> = Sampler::default().sample(&expr, &vp).collect();
    assert!(runs.len() >= 2);
    for run in &runs {
        assert!(run.points().iter().all(|p| p.y.is_finite()));
    }
    // No run bridges the pole.
    for run in &runs {
        let first = run.points()[0].x;
        let last = run.points()[run.len() - 1].x;
        assert!(first.signum() == last.signum() || first == 0.0 || last == 0.0);
    }
}

#[test]
fn test_fixed_resolution_caps_samples() {
    let expr = parse("sin(x)").expect("valid formula");
    let vp = Viewport::new(-5.0, 5.0, -2.0, 2.0, 800, 400).expect("valid viewport");
    let sampler = Sampler::new(SamplerConfig {
        resolution: SampleResolution::Fixed(100),
        ..SamplerConfig::default()
    });
    let runs: Vec<_> = sampler.sample(&expr, &vp).collect();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].len(), 100);
}

// =============================================================================
// Config Tests
// =============================================================================

#[test]
fn test_config_missing_fields_use_defaults() {
    let config = GrapherConfig::from_json(r#"{"view": {"x_span": 8.0}}"#).expect("valid config");
    assert_eq!(config.view.x_span, 8.0);
    assert_eq!(config.view.center_x, 0.0);
    assert_eq!(config.initial_functions, vec!["x^2".to_string()]);
    assert_eq!(config.view.resize, ResizeMode::KeepRect);
}

#[test]
fn test_config_rejects_bad_values() {
    let err = GrapherConfig::from_json(r#"{"view": {"x_span": -1}}"#).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidValue {
            field: "view.x_span",
            ..
        }
    ));
    assert!(matches!(
        GrapherConfig::from_json("{not json"),
        Err(ConfigError::Json(_))
    ));
}

#[test]
fn test_config_fixed_resolution_json() {
    let config = GrapherConfig::from_json(r#"{"sampler": {"resolution": {"fixed": 500}}}"#)
        .expect("valid config");
    assert_eq!(config.sampler.resolution, SampleResolution::Fixed(500));
}

// =============================================================================
// Share Link Tests
// =============================================================================

#[test]
fn test_share_link_round_trip() {
    let texts = ["atan2(x, 1)", "x % 2", "sin(x)"];
    let fragment = share::encode_fragment(&texts);
    assert!(!fragment[1..].contains(' '));
    assert_eq!(share::decode_fragment(&fragment).expect("non-empty"), texts);
}

// =============================================================================
// Session Tests
// =============================================================================

#[test]
fn test_session_lifecycle() {
    let mut host = MemoryHost::new();
    let monitor = host.add_canvas("plot", 640, 480);
    let handle = SessionHandle::start(&mut host, "plot", GrapherConfig::default(), None)
        .expect("session starts");
    assert_eq!(host.registered_count(), EventSource::ALL.len());
    assert_eq!(monitor.frames_presented(), 1);

    // Zoom with the wheel, then with a key; one frame serves both.
    let wheel = host.dispatch(InputEvent::Wheel {
        position: Point::new(320.0, 240.0),
        delta_y: -120.0,
    });
    assert_eq!(wheel, HandlerResponse::RequestFrame);
    let key = host.dispatch(InputEvent::KeyDown { key: Key::ZoomIn });
    assert_eq!(key, HandlerResponse::Handled);
    assert!(host.run_frame(16.0));
    assert_eq!(monitor.frames_presented(), 2);
    assert!(handle.session().viewport().x_span() < 20.0);

    // Drag.
    host.dispatch(InputEvent::PointerDown {
        position: Point::new(10.0, 10.0),
        button: MouseButton::Left,
    });
    for step in 1..=10 {
        host.dispatch(InputEvent::PointerMove {
            position: Point::new(10.0 + 2.0 * step as f32, 10.0),
        });
    }
    host.run_frame(32.0);
    assert_eq!(monitor.frames_presented(), 3);
    assert_eq!(handle.session().stats().sample_passes, 3);

    // Edits.
    let index = handle
        .update(&mut host, |s| s.add_function("1/x"))
        .expect("valid formula");
    assert_eq!(index, 1);
    host.run_frame(48.0);
    let frame = monitor.last_frame().expect("frame presented");
    assert!(frame.texts().contains(&"y = 1/x"));
    let curves = frame
        .commands()
        .iter()
        .filter(|cmd| matches!(cmd, DrawCommand::Path { style, .. } if style.width == 2.0))
        .count();
    assert!(curves >= 3);

    handle.shutdown(&mut host);
    assert_eq!(host.registered_count(), 0);
}

#[test]
fn test_session_start_failures() {
    let mut host = MemoryHost::new();
    host.add_element("header");

    let err = SessionHandle::start(&mut host, "missing-canvas", GrapherConfig::default(), None)
        .unwrap_err();
    assert!(matches!(err, StartupError::CanvasNotFound(_)));
    let err =
        SessionHandle::start(&mut host, "header", GrapherConfig::default(), None).unwrap_err();
    assert!(matches!(err, StartupError::NotACanvas(_)));
    assert_eq!(host.registered_count(), 0);
}

#[test]
fn test_session_resize_keeps_rect() {
    let mut host = MemoryHost::new();
    let monitor = host.add_canvas("plot", 400, 400);
    let handle = SessionHandle::start(&mut host, "plot", GrapherConfig::default(), None)
        .expect("session starts");

    monitor.resize(800, 400);
    let response = host.dispatch(InputEvent::Resize {
        width: 800,
        height: 400,
    });
    assert_eq!(response, HandlerResponse::RequestFrame);
    host.run_frame(16.0);

    let session = handle.session();
    assert_eq!(session.viewport().width(), 800);
    assert_eq!(session.viewport().x_span(), 20.0);
    assert_eq!(session.stats().frames, 2);
}
