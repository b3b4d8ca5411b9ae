#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

use webboy::config::ConfigError;
use webboy::wasm::controller::find_canvas;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn missing_canvas_is_a_config_error() {
    let document = web_sys::window().unwrap().document().unwrap();

    let err = find_canvas(&document, "frame-display").unwrap_err();
    assert_eq!(err, ConfigError::MissingCanvas("frame-display".to_string()));
}

#[wasm_bindgen_test]
fn non_canvas_element_under_the_id_is_a_config_error() {
    let document = web_sys::window().unwrap().document().unwrap();
    let div = document.create_element("div").unwrap();
    div.set_id("not-a-canvas");
    document.body().unwrap().append_child(&div).unwrap();

    let err = find_canvas(&document, "not-a-canvas").unwrap_err();
    assert_eq!(err, ConfigError::MissingCanvas("not-a-canvas".to_string()));

    document.body().unwrap().remove_child(&div).unwrap();
}

#[wasm_bindgen_test]
fn present_canvas_is_found() {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document
        .create_element("canvas")
        .unwrap()
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .unwrap();
    canvas.set_id("startup-canvas");
    document.body().unwrap().append_child(&canvas).unwrap();

    assert!(find_canvas(&document, "startup-canvas").is_ok());

    document.body().unwrap().remove_child(&canvas).unwrap();
}
