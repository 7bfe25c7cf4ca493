use wasm_bindgen::prelude::*;

use crate::platform;

/// Selection of the `navigator` entry points [`UserMediaMock::mock()`]
/// replaces.
///
/// Selects every entry point unless configured otherwise.
///
/// [`UserMediaMock::mock()`]: crate::api::UserMediaMock::mock
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, Default)]
pub struct MockOptions(platform::MockOptions);

#[wasm_bindgen]
impl MockOptions {
    /// Creates new [`MockOptions`] selecting every entry point.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the legacy `navigator.getUserMedia()` is replaced.
    pub fn legacy_get_user_media(&mut self, enabled: bool) {
        self.0.legacy_get_user_media = enabled;
    }

    /// Sets whether `navigator.mediaDevices.getUserMedia()` is replaced.
    pub fn get_user_media(&mut self, enabled: bool) {
        self.0.get_user_media = enabled;
    }

    /// Sets whether `navigator.mediaDevices.getSupportedConstraints()` is
    /// replaced.
    pub fn get_supported_constraints(&mut self, enabled: bool) {
        self.0.get_supported_constraints = enabled;
    }

    /// Sets whether `navigator.mediaDevices.enumerateDevices()` is replaced.
    pub fn enumerate_devices(&mut self, enabled: bool) {
        self.0.enumerate_devices = enabled;
    }
}

impl From<MockOptions> for platform::MockOptions {
    #[inline]
    fn from(options: MockOptions) -> Self {
        options.0
    }
}
