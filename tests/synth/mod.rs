use std::{cell::RefCell, convert::TryFrom as _, rc::Rc};

use serde_json::json;
use user_media_mock::{
    media::{MockType, StreamRequest},
    mock::UserMediaMock,
    platform::MediaDevicesError,
    synth::{SynthesisError, PAINT_INTERVAL_MS},
};
use wasm_bindgen::{JsCast as _, JsValue};
use wasm_bindgen_test::*;
use web_sys::{HtmlCanvasElement, MediaStreamTrackState};

use crate::{js, property, resolve_after, tracks};

fn request(constraints: serde_json::Value) -> StreamRequest {
    StreamRequest::try_from(js(constraints)).unwrap()
}

#[wasm_bindgen_test]
async fn canvas_stream_is_sized_by_constraints() {
    let mock = UserMediaMock::new();

    let handle = mock
        .get_mock_stream(request(json!({
            "video": {"width": {"ideal": 320, "max": 640}, "height": 240},
        })))
        .await
        .unwrap();

    let tracks = tracks(handle.stream());
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].kind(), "video");
    let canvas: HtmlCanvasElement =
        property(&tracks[0], "canvas").unchecked_into();
    assert_eq!(canvas.width(), 320);
    assert_eq!(canvas.height(), 240);
    assert!(handle.stop());
}

#[wasm_bindgen_test]
async fn canvas_stream_defaults_to_vga() {
    let mock = UserMediaMock::new();

    let handle = mock.get_mock_stream(request(json!({}))).await.unwrap();

    let canvas: HtmlCanvasElement =
        property(&tracks(handle.stream())[0], "canvas").unchecked_into();
    assert_eq!(canvas.width(), 640);
    assert_eq!(canvas.height(), 480);
    assert!(handle.stop());
}

#[wasm_bindgen_test]
async fn stopped_canvas_is_not_painted_anymore() {
    let mock = UserMediaMock::new();
    let handle = mock.get_mock_stream(request(json!({}))).await.unwrap();
    let track = tracks(handle.stream()).remove(0);
    let canvas: HtmlCanvasElement =
        property(&track, "canvas").unchecked_into();

    assert!(handle.stop());
    let painted = canvas.to_data_url().unwrap();
    resolve_after(PAINT_INTERVAL_MS * 3).await.unwrap();

    assert_eq!(canvas.to_data_url().unwrap(), painted);
    assert_eq!(track.ready_state(), MediaStreamTrackState::Ended);
}

#[wasm_bindgen_test]
async fn canvas_stop_is_idempotent() {
    let mock = UserMediaMock::new();
    let handle = mock.get_mock_stream(request(json!({}))).await.unwrap();

    assert!(handle.stop());
    assert!(!handle.stop());
    assert!(handle.stop_handle().unwrap().is_stopped());
}

#[wasm_bindgen_test]
async fn canvas_stream_is_stoppable_from_js() {
    let mock = UserMediaMock::new();
    let handle = mock.get_mock_stream(request(json!({}))).await.unwrap();
    let stream = JsValue::from(handle.stream().clone());

    crate::call(&stream, "stop", &[]);

    assert!(property(&stream, "stop").is_undefined());
    assert!(handle.stop_handle().unwrap().is_stopped());
    assert!(!handle.stop());
}

#[wasm_bindgen_test]
async fn kept_js_stop_reference_may_be_called_again() {
    let mock = UserMediaMock::new();
    let handle = mock.get_mock_stream(request(json!({}))).await.unwrap();
    let stream = JsValue::from(handle.stream().clone());
    let stop: js_sys::Function = property(&stream, "stop").unchecked_into();

    stop.call0(&stream).unwrap();
    stop.call0(&stream).unwrap();
    stop.call0(&JsValue::UNDEFINED).unwrap();

    assert!(property(&stream, "stop").is_undefined());
    assert!(handle.stop_handle().unwrap().is_stopped());
}

#[wasm_bindgen_test]
async fn custom_handler_receives_raw_request() {
    let received = Rc::new(RefCell::new(None));
    let stream = web_sys::MediaStream::new().unwrap();
    let mock = UserMediaMock::new();
    mock.set_mock_type(MockType::Custom({
        let received = Rc::clone(&received);
        let stream = stream.clone();
        Rc::new(move |req: &JsValue| -> Result<JsValue, JsValue> {
            *received.borrow_mut() = Some(req.clone());
            Ok(stream.clone().into())
        })
    }));
    let raw = js(json!({"video": true}));

    let handle = mock
        .get_mock_stream(StreamRequest::try_from(raw.clone()).unwrap())
        .await
        .unwrap();

    assert_eq!(handle.stream().id(), stream.id());
    assert!(handle.stop_handle().is_none());
    assert!(js_sys::Object::is(
        received.borrow().as_ref().unwrap(),
        &raw,
    ));
}

#[wasm_bindgen_test]
async fn custom_handler_promise_is_awaited() {
    let stream = web_sys::MediaStream::new().unwrap();
    let mock = UserMediaMock::new();
    mock.set_mock_type(MockType::Custom({
        let stream = stream.clone();
        Rc::new(move |_: &JsValue| -> Result<JsValue, JsValue> {
            Ok(js_sys::Promise::resolve(&stream.clone().into()).into())
        })
    }));

    let handle = mock.get_mock_stream(request(json!({}))).await.unwrap();

    assert_eq!(handle.stream().id(), stream.id());
}

#[wasm_bindgen_test]
async fn custom_handler_failure_is_surfaced() {
    let mock = UserMediaMock::new();
    mock.set_mock_type(MockType::Custom(Rc::new(
        |_: &JsValue| -> Result<JsValue, JsValue> {
            Err(js_sys::Error::new("no camera today").into())
        },
    )));

    let err = mock
        .get_mock_stream(request(json!({})))
        .await
        .unwrap_err()
        .into_inner();

    match err {
        MediaDevicesError::Synthesis(SynthesisError::CustomHandlerFailed(
            e,
        )) => assert_eq!(e.message, "no camera today"),
        _ => panic!("unexpected error: {}", err),
    }
}

#[wasm_bindgen_test]
async fn media_element_stream_has_no_stop_capability() {
    let mock = UserMediaMock::new();
    mock.set_media_url("/not-existing.mp4".into());
    mock.set_mock_type(MockType::MediaElement);

    let handle = mock.get_mock_stream(request(json!({}))).await.unwrap();

    assert!(handle.stop_handle().is_none());
    assert!(property(handle.stream(), "stop").is_undefined());
}
