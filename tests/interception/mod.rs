use std::{cell::RefCell, rc::Rc};

use futures::channel::oneshot;
use js_sys::{Function, Object, Reflect};
use serde_json::json;
use user_media_mock::{
    api,
    media::DeviceInfo,
    mock::UserMediaMock,
    platform::{InterceptionError, MockOptions},
    utils,
};
use wasm_bindgen::{closure::Closure, JsCast as _, JsValue};
use wasm_bindgen_test::*;

use crate::{call, js, media_devices, navigator, property, resolve};

/// Indicates whether `navigator.mediaDevices.getUserMedia` is the same
/// function as the provided one.
fn is_get_user_media(func: &JsValue) -> bool {
    Object::is(&property(&media_devices(), "getUserMedia"), func)
}

#[wasm_bindgen_test]
fn restore_without_mock_is_noop() {
    let original = property(&media_devices(), "getUserMedia");
    let mock = UserMediaMock::new();

    mock.restore();

    assert!(!mock.is_prepared());
    assert!(is_get_user_media(&original));
}

#[wasm_bindgen_test]
fn mock_and_restore() {
    let original = property(&media_devices(), "getUserMedia");
    let mock = UserMediaMock::new();

    mock.mock(MockOptions::default()).unwrap();
    assert!(mock.is_prepared());
    assert!(!is_get_user_media(&original));

    mock.restore();
    assert!(!mock.is_prepared());
    assert!(is_get_user_media(&original));
    let own = media_devices()
        .unchecked_into::<Object>()
        .has_own_property(&"getUserMedia".into());
    assert!(!own);
}

#[wasm_bindgen_test]
fn restores_on_drop() {
    let original = property(&media_devices(), "enumerateDevices");
    {
        let mock = UserMediaMock::new();
        mock.mock(MockOptions::default()).unwrap();
    }

    assert!(Object::is(
        &property(&media_devices(), "enumerateDevices"),
        &original,
    ));
}

#[wasm_bindgen_test]
async fn enumerates_mock_devices() {
    let mock = UserMediaMock::new();
    mock.mock(MockOptions::default()).unwrap();

    let devices =
        resolve(call(&media_devices(), "enumerateDevices", &[])).await;
    let devices: Vec<DeviceInfo> = utils::from_js(&devices.unwrap()).unwrap();

    let ids: Vec<_> = devices.iter().map(|d| d.device_id.as_str()).collect();
    assert_eq!(ids, ["0", "1", "2"]);
    let kinds: Vec<_> = devices.iter().map(|d| d.kind.to_string()).collect();
    assert_eq!(kinds, ["audioinput", "audiooutput", "videooutput"]);
}

#[wasm_bindgen_test]
fn reports_configured_constraints() {
    let mock = UserMediaMock::new();
    mock.update_constraints(
        "video",
        json!({"width": true}).as_object().cloned().unwrap(),
        false,
    );
    mock.mock(MockOptions::default()).unwrap();

    let supported: serde_json::Value = utils::from_js(&call(
        &media_devices(),
        "getSupportedConstraints",
        &[],
    ))
    .unwrap();

    assert_eq!(supported["video"]["width"], json!(true));
    assert_eq!(supported["video"]["height"], json!(false));
    assert_eq!(supported["audio"]["volume"], json!(false));
}

#[wasm_bindgen_test]
async fn mocked_get_user_media_resolves_canvas_stream() {
    let mock = UserMediaMock::new();
    mock.mock(MockOptions::default()).unwrap();

    let stream = resolve(call(
        &media_devices(),
        "getUserMedia",
        &[js(json!({"video": {"width": 320}}))],
    ))
    .await
    .unwrap();

    assert!(stream.is_instance_of::<web_sys::MediaStream>());
    assert!(property(&stream, "stop").is_instance_of::<Function>());
    call(&stream, "stop", &[]);
    assert!(property(&stream, "stop").is_undefined());
}

#[wasm_bindgen_test]
async fn legacy_get_user_media_calls_back() {
    let mock = UserMediaMock::new();
    mock.mock(MockOptions::default()).unwrap();
    let (tx, rx) = oneshot::channel();
    let on_success = Closure::once_into_js(move |stream: JsValue| {
        let _ = tx.send(stream);
    });

    call(
        &navigator(),
        "getUserMedia",
        &[js(json!({"video": true})), on_success, JsValue::NULL],
    );

    let stream = rx.await.unwrap();
    assert!(stream.is_instance_of::<web_sys::MediaStream>());
    call(&stream, "stop", &[]);
}

#[wasm_bindgen_test]
fn leaves_unselected_entry_points_untouched() {
    let get_user_media = property(&media_devices(), "getUserMedia");
    let enumerate_devices = property(&media_devices(), "enumerateDevices");
    let mock = UserMediaMock::new();
    let options = MockOptions {
        get_user_media: false,
        ..MockOptions::default()
    };

    mock.mock(options).unwrap();

    assert!(is_get_user_media(&get_user_media));
    assert!(!Object::is(
        &property(&media_devices(), "enumerateDevices"),
        &enumerate_devices,
    ));
}

#[wasm_bindgen_test]
async fn falls_back_to_synthetic_stream() {
    let media_devices = media_devices();
    let rejecting = Function::new_no_args(
        "return Promise.reject(new Error('Permission denied'))",
    );
    Reflect::set(&media_devices, &"getUserMedia".into(), &rejecting).unwrap();

    let mock = UserMediaMock::new();
    mock.fallback_mock().unwrap();
    let stream =
        resolve(call(&media_devices, "getUserMedia", &[js(json!({}))]))
            .await
            .unwrap();

    assert!(stream.is_instance_of::<web_sys::MediaStream>());
    call(&stream, "stop", &[]);

    mock.restore();
    assert!(Object::is(
        &property(&media_devices, "getUserMedia"),
        &rejecting,
    ));
    Reflect::delete_property(
        media_devices.unchecked_ref(),
        &"getUserMedia".into(),
    )
    .unwrap();
}

#[wasm_bindgen_test]
async fn fallback_passes_real_stream_through() {
    let media_devices = media_devices();
    let real_stream = JsValue::from(web_sys::MediaStream::new().unwrap());
    let resolving = Function::new_with_args(
        "stream",
        "return () => Promise.resolve(stream)",
    )
    .call1(&JsValue::NULL, &real_stream)
    .unwrap();
    Reflect::set(&media_devices, &"getUserMedia".into(), &resolving).unwrap();

    let mock = UserMediaMock::new();
    mock.fallback_mock().unwrap();
    let stream =
        resolve(call(&media_devices, "getUserMedia", &[js(json!({}))]))
            .await
            .unwrap();

    assert!(Object::is(&stream, &real_stream));
    assert!(property(&stream, "stop").is_undefined());

    mock.restore();
    Reflect::delete_property(
        media_devices.unchecked_ref(),
        &"getUserMedia".into(),
    )
    .unwrap();
}

#[wasm_bindgen_test]
async fn legacy_fallback_calls_back_with_synthetic_stream() {
    let navigator = navigator();
    let failing = Function::new_with_args(
        "constraints, onSuccess, onError",
        "onError(new Error('Permission denied'))",
    );
    Reflect::set(&navigator, &"getUserMedia".into(), &failing).unwrap();

    let mock = UserMediaMock::new();
    mock.fallback_mock().unwrap();
    let (tx, rx) = oneshot::channel();
    let tx = Rc::new(RefCell::new(Some(tx)));
    let callback = |succeeded: bool| {
        let tx = Rc::clone(&tx);
        Closure::once_into_js(move |result: JsValue| {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send((succeeded, result));
            }
        })
    };
    call(
        &navigator,
        "getUserMedia",
        &[js(json!({"video": true})), callback(true), callback(false)],
    );

    let (succeeded, stream) = rx.await.unwrap();
    assert!(succeeded);
    assert!(stream.is_instance_of::<web_sys::MediaStream>());
    assert!(property(&stream, "stop").is_instance_of::<Function>());
    call(&stream, "stop", &[]);

    mock.restore();
    assert!(Object::is(&property(&navigator, "getUserMedia"), &failing));
    Reflect::delete_property(navigator.unchecked_ref(), &"getUserMedia".into())
        .unwrap();
}

#[wasm_bindgen_test]
fn read_only_entry_point_is_reported() {
    let navigator = navigator();
    let original = Function::new_no_args("return null");
    let descriptor = Object::new();
    Reflect::set(&descriptor, &"value".into(), &original).unwrap();
    Reflect::set(&descriptor, &"writable".into(), &false.into()).unwrap();
    Reflect::set(&descriptor, &"configurable".into(), &true.into()).unwrap();
    Object::define_property(
        navigator.unchecked_ref(),
        &"getUserMedia".into(),
        &descriptor,
    );

    let mock = UserMediaMock::new();
    let err = mock.mock(MockOptions::default()).unwrap_err().into_inner();

    match err {
        InterceptionError::ReplaceFailed(entry_point, cause) => {
            assert_eq!(entry_point, "navigator.getUserMedia");
            assert_eq!(cause.name, "TypeError");
        }
        _ => panic!("unexpected error: {}", err),
    }
    assert!(Object::is(&property(&navigator, "getUserMedia"), &original));

    mock.restore();
    Reflect::delete_property(navigator.unchecked_ref(), &"getUserMedia".into())
        .unwrap();
}

#[wasm_bindgen_test]
fn invalid_mock_type_keeps_previous_one() {
    let mock = api::UserMediaMock::new();

    let err = mock.set_mock_type("webgl".into()).unwrap_err();

    assert_eq!(property(&err, "name"), "InvalidConfiguration");
    assert_eq!(mock.mock_type(), "canvas");
}

#[wasm_bindgen_test]
fn accepts_function_mock_type() {
    let mock = api::UserMediaMock::new();

    mock.set_mock_type(Function::new_no_args("return null").into())
        .unwrap();

    assert_eq!(mock.mock_type(), "function");
}
