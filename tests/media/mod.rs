use std::convert::TryFrom as _;

use user_media_mock::{
    media::{ConstraintValue as V, MockType, StreamRequest},
    mock::UserMediaMock,
};
use wasm_bindgen::{JsCast as _, JsValue};
use wasm_bindgen_test::*;
use web_sys::HtmlCanvasElement;

use crate::{property, tracks};

/// Evaluates the provided JS expression.
fn eval(expr: &str) -> JsValue {
    js_sys::Function::new_no_args(&format!("return {}", expr))
        .call0(&JsValue::NULL)
        .unwrap()
}

/// Builds a [`V::Dictionary`] out of the `entries`.
fn dict(entries: Vec<(&str, V)>) -> V {
    V::Dictionary(
        entries.into_iter().map(|(k, v)| (k.to_owned(), v)).collect(),
    )
}

#[wasm_bindgen_test]
fn reads_request_as_js_enumerates_it() {
    let raw = eval(
        "{video: {width: {ideal: undefined, max: Infinity}}, 1: null, \
         audio: [true]}",
    );

    let value = V::from_js(&raw).unwrap();

    assert_eq!(
        value,
        dict(vec![
            ("1", V::Null),
            (
                "video",
                dict(vec![(
                    "width",
                    dict(vec![
                        ("ideal", V::Undefined),
                        ("max", V::Number(f64::INFINITY)),
                    ]),
                )]),
            ),
            ("audio", V::List(vec![V::Bool(true)])),
        ]),
    );
}

#[wasm_bindgen_test]
fn throwing_getter_makes_request_malformed() {
    let raw = eval("{get video() { throw new Error('no video for you') }}");

    let err = StreamRequest::try_from(raw).unwrap_err();

    assert_eq!(err.0.message, "no video for you");
}

#[wasm_bindgen_test]
async fn undefined_ideal_falls_back_to_default() {
    let raw = eval("{video: {height: {ideal: undefined, max: 1000}}}");
    let mock = UserMediaMock::new();

    let handle = mock
        .get_mock_stream(StreamRequest::try_from(raw).unwrap())
        .await
        .unwrap();

    let canvas: HtmlCanvasElement =
        property(&tracks(handle.stream())[0], "canvas").unchecked_into();
    assert_eq!(canvas.width(), 640);
    assert_eq!(canvas.height(), 480);
    assert!(handle.stop());
}

#[wasm_bindgen_test]
fn invalid_mock_type_is_described() {
    let err = MockType::from_js(JsValue::from_f64(42.0)).unwrap_err();

    assert!(err.0.contains("42"));
}
