use std::{convert::TryFrom as _, fmt::Display};

use derive_more::From;
use js_sys::Promise;
use serde_json::{Map, Value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::{
    api::{MockError, MockOptions},
    media::{MockType, StreamRequest},
    mock::{self, ConfigurationError},
    platform::{init_logger, set_panic_hook, MediaDevices as _},
    utils::{self, JsCaused},
};

/// Mocking library interface.
///
/// Replaces the `navigator` media acquisition entry points with synthetic
/// ones and restores them back. Everything it has replaced is restored once
/// it's freed.
#[wasm_bindgen]
#[derive(From)]
pub struct UserMediaMock(mock::UserMediaMock);

#[wasm_bindgen]
impl UserMediaMock {
    /// Instantiates a new [`UserMediaMock`] with nothing replaced yet.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        set_panic_hook();
        init_logger();

        Self(mock::UserMediaMock::new())
    }

    /// Replaces every `navigator` media acquisition entry point with a
    /// synthetic one.
    pub fn mock(&self) -> Result<(), JsValue> {
        self.mock_with_options(&MockOptions::new())
    }

    /// Replaces the `navigator` media acquisition entry points selected by
    /// the provided [`MockOptions`] with synthetic ones.
    pub fn mock_with_options(
        &self,
        options: &MockOptions,
    ) -> Result<(), JsValue> {
        self.0
            .mock((*options).into())
            .map_err(MockError::from)
            .map_err(JsValue::from)
    }

    /// Makes both `getUserMedia()` entry points try the real devices first
    /// and resolve with a synthetic stream if they fail.
    pub fn fallback_mock(&self) -> Result<(), JsValue> {
        self.0
            .fallback_mock()
            .map_err(MockError::from)
            .map_err(JsValue::from)
    }

    /// Restores the original `navigator` entry points.
    ///
    /// Does nothing if they weren't replaced.
    pub fn restore(&self) {
        self.0.restore();
    }

    /// Indicates whether the original `navigator` entry points are captured.
    pub fn is_prepared(&self) -> bool {
        self.0.is_prepared()
    }

    /// Merges the provided `updates` object into the constraints reported as
    /// supported for the `kind` (`"video"`, `"audio"` or `"image"`) media.
    ///
    /// Drops the existing constraints of the `kind` first if `overwrite` is
    /// `true`. Returns `false` if the `kind` is unknown.
    pub fn update_constraints(
        &self,
        kind: &str,
        updates: &JsValue,
        overwrite: bool,
    ) -> Result<bool, JsValue> {
        let updates = utils::from_js::<Map<String, Value>>(updates)
            .map_err(ConfigurationError::from)
            .map_err(into_js_error)?;
        Ok(self.0.update_constraints(kind, updates, overwrite))
    }

    /// Sets the video file played by the `"mediaElement"` mock type.
    pub fn set_media_url(&self, url: String) {
        self.0.set_media_url(url);
    }

    /// Returns the video file played by the `"mediaElement"` mock type.
    pub fn media_url(&self) -> String {
        self.0.media_url()
    }

    /// Sets how streams are synthesized: `"canvas"`, `"mediaElement"` or a
    /// function returning a stream (or a promise of it) for the provided
    /// constraints.
    ///
    /// Throws `InvalidConfiguration` [`MockError`] and keeps the current
    /// mock type if the provided one is none of the above.
    pub fn set_mock_type(&self, mock_type: JsValue) -> Result<(), JsValue> {
        let mock_type = MockType::from_js(mock_type)
            .map_err(ConfigurationError::from)
            .map_err(into_js_error)?;
        self.0.set_mock_type(mock_type);
        Ok(())
    }

    /// Returns name of the current mock type: `"canvas"`, `"mediaElement"`
    /// or `"function"`.
    pub fn mock_type(&self) -> String {
        self.0.mock_type().name().to_owned()
    }

    /// Synthesizes a stream for the provided constraints without touching
    /// the `navigator`.
    pub fn get_mock_stream(&self, constraints: JsValue) -> Promise {
        let synthetic = self.0.synthetic();

        future_to_promise(async move {
            let request = StreamRequest::try_from(constraints)
                .map_err(into_js_error)?;
            synthetic
                .get_user_media(request)
                .await
                .map(JsValue::from)
                .map_err(MockError::from)
                .map_err(JsValue::from)
        })
    }

    /// Returns the synthetic devices as an array of [MediaDeviceInfo][1]
    /// like objects.
    ///
    /// [1]: https://w3.org/TR/mediacapture-streams/#device-info
    pub fn get_mock_devices(&self) -> Result<JsValue, JsValue> {
        utils::to_js(&self.0.get_mock_devices())
            .map_err(into_js_error)
    }

    /// Returns the constraints reported as supported.
    pub fn supported_constraints(&self) -> Result<JsValue, JsValue> {
        utils::to_js(&self.0.supported_constraints())
            .map_err(into_js_error)
    }
}

/// Converts the provided error into a [`MockError`] thrown to JS side.
fn into_js_error<E: JsCaused + Display>(err: E) -> JsValue {
    MockError::from(tracerr::new!(err)).into()
}
