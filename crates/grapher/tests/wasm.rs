//! WASM browser tests - run with `wasm-pack test --headless --chrome`

#![cfg(target_arch = "wasm32")]

use grapher::{
    add_function, set_function, start_web, start_web_with_config, stop_web, Canvas2DSurface,
};
use grapher_core::draw::DrawCommand;
use grapher_core::{Canvas, Color, Frame, Point, RecordingCanvas, Rect, Surface};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlCanvasElement;

wasm_bindgen_test_configure!(run_in_browser);

fn add_canvas(id: &str, width: u32, height: u32) -> HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas: HtmlCanvasElement = document
        .create_element("canvas")
        .unwrap()
        .dyn_into()
        .unwrap();
    canvas.set_id(id);
    canvas.set_width(width);
    canvas.set_height(height);
    document.body().unwrap().append_child(&canvas).unwrap();
    canvas
}

fn error_message(err: wasm_bindgen::JsValue) -> String {
    err.dyn_into::<js_sys::Error>().unwrap().message().into()
}

// ============================================================================
// DrawCommand JSON Serialization Tests
// ============================================================================

#[wasm_bindgen_test]
fn test_rect_json_roundtrip() {
    let cmd = DrawCommand::filled_rect(Rect::new(10.0, 20.0, 100.0, 50.0), Color::WHITE);
    let json = serde_json::to_string(&cmd).expect("serialize");
    let parsed: DrawCommand = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(parsed, cmd);
}

// ============================================================================
// Canvas2D Surface Tests
// ============================================================================

#[wasm_bindgen_test]
fn test_surface_presents_frame() {
    let canvas = add_canvas("surface-test", 120, 80);
    let mut surface = Canvas2DSurface::new(canvas).expect("2d context");
    assert_eq!(surface.size().unwrap(), (120, 80));

    let mut recorder = RecordingCanvas::new();
    recorder.clear(Color::BLACK);
    recorder.fill_circle(Point::new(60.0, 40.0), 4.0, Color::WHITE);
    let frame: Frame = recorder.into_frame();
    surface.present(&frame).expect("frame drawn");
}

#[wasm_bindgen_test]
fn test_failed_frame_leaves_previous_frame() {
    let canvas = add_canvas("atomic-test", 40, 40);
    let mut surface = Canvas2DSurface::new(canvas.clone()).expect("2d context");

    let mut good = RecordingCanvas::new();
    good.clear(Color::WHITE);
    surface.present(&good.into_frame()).expect("frame drawn");
    let shown = canvas.to_data_url().unwrap();

    // A negative radius makes `arc` throw after the clear has been replayed.
    let mut bad = RecordingCanvas::new();
    bad.clear(Color::BLACK);
    bad.fill_circle(Point::new(20.0, 20.0), -5.0, Color::WHITE);
    assert!(surface.present(&bad.into_frame()).is_err());
    assert_eq!(canvas.to_data_url().unwrap(), shown);

    let mut next = RecordingCanvas::new();
    next.clear(Color::BLACK);
    surface.present(&next.into_frame()).expect("frame drawn");
    assert_ne!(canvas.to_data_url().unwrap(), shown);
}

#[wasm_bindgen_test]
fn test_detached_canvas_is_unavailable() {
    let canvas = add_canvas("detached-test", 50, 50);
    let surface = Canvas2DSurface::new(canvas.clone()).expect("2d context");
    canvas.remove();
    assert!(surface.size().is_err());
}

// ============================================================================
// Entry Point Tests
// ============================================================================

#[wasm_bindgen_test]
async fn test_start_web_missing_canvas_rejects() {
    let err = start_web("missing-canvas".to_string()).await.unwrap_err();
    assert_eq!(error_message(err), "canvas 'missing-canvas' not found");
}

#[wasm_bindgen_test]
async fn test_start_web_lifecycle() {
    add_canvas("lifecycle-test", 300, 150);
    start_web_with_config(
        "lifecycle-test".to_string(),
        r#"{"sync_url": false}"#.to_string(),
    )
    .await
    .expect("started");

    let again = start_web_with_config(
        "lifecycle-test".to_string(),
        r#"{"sync_url": false}"#.to_string(),
    )
    .await
    .unwrap_err();
    assert!(error_message(again).contains("already has a running grapher"));

    set_function("lifecycle-test", 0, "sin(x)").expect("valid formula");
    assert!(set_function("lifecycle-test", 0, "sin(").is_err());
    assert_eq!(add_function("lifecycle-test", "x^3").expect("slot added"), 1);
    assert!(set_function("lifecycle-test", 5, "x").is_err());

    assert!(stop_web("lifecycle-test"));
    assert!(!stop_web("lifecycle-test"));
    assert!(set_function("lifecycle-test", 0, "x").is_err());
}

#[wasm_bindgen_test]
async fn test_bad_config_rejects() {
    add_canvas("config-test", 100, 100);
    let config = r#"{"max_functions": 0}"#.to_string();
    let err = start_web_with_config("config-test".to_string(), config)
        .await
        .unwrap_err();
    assert!(error_message(err).contains("max_functions"));
}
