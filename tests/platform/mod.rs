use js_sys::Object;
use user_media_mock::platform;
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

#[wasm_bindgen_test]
fn thrown_string_becomes_named_error() {
    let err = platform::Error::from(JsValue::from_str("boom"));
    assert_eq!(err.name, "Unknown JS error");
    assert_eq!(err.message, "boom");

    let err = js_sys::Error::from(err);
    assert_eq!(String::from(err.name()), "Unknown JS error");
    assert_eq!(String::from(err.message()), "boom");
}

#[wasm_bindgen_test]
fn thrown_error_is_converted_back_as_is() {
    let original = js_sys::Error::new("boom");

    let err = platform::Error::from(JsValue::from(original.clone()));
    assert_eq!(err.message, "boom");

    let err = JsValue::from(js_sys::Error::from(err));
    assert!(Object::is(&err, &original.into()));
}

#[wasm_bindgen_test]
fn thrown_non_string_is_described() {
    let err = platform::Error::from(JsValue::from_f64(42.0));

    assert_eq!(err.name, "Unknown JS error");
    assert!(err.message.contains("42"));
}
