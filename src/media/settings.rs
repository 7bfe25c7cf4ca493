//! Configuration of the synthetic media.

use std::{fmt, rc::Rc};

use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use wasm_bindgen::{JsCast as _, JsValue};

use super::MediaKind;

/// Media URL used by [`MockType::MediaElement`] unless configured otherwise.
pub const DEFAULT_MEDIA_URL: &str = "/video.mp4";

/// Generator of a custom synthetic stream.
///
/// Receives the original request and returns the stream itself, or a
/// promise resolving into it.
pub type CustomHandler = Rc<dyn Fn(&JsValue) -> Result<JsValue, JsValue>>;

/// Strategy of synthesizing a media stream.
#[derive(Clone)]
pub enum MockType {
    /// Stream captured from a canvas painted with random rectangles.
    Canvas,

    /// Stream captured from a looped `<video>` playing
    /// [`Settings::media_url`].
    MediaElement,

    /// Stream returned by a user provided generator.
    Custom(CustomHandler),
}

impl MockType {
    /// Wraps the provided JS function into a [`MockType::Custom`].
    #[must_use]
    pub fn from_js_function(func: js_sys::Function) -> Self {
        Self::Custom(Rc::new(move |request: &JsValue| {
            func.call1(&JsValue::NULL, request)
        }))
    }

    /// Returns name of this [`MockType`].
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Canvas => "canvas",
            Self::MediaElement => "mediaElement",
            Self::Custom(_) => "function",
        }
    }
}

impl Default for MockType {
    #[inline]
    fn default() -> Self {
        Self::Canvas
    }
}

impl fmt::Debug for MockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MockType::{}", self.name())
    }
}

/// Error of parsing a [`MockType`] from a JS value.
#[derive(Clone, Debug, Display, PartialEq)]
#[display(fmt = "invalid mockType: {}", _0)]
pub struct InvalidMockType(pub String);

impl MockType {
    /// Parses a [`MockType`] from its JS representation: `"canvas"`,
    /// `"mediaElement"` or a function.
    ///
    /// # Errors
    ///
    /// With [`InvalidMockType`] naming the value if it's none of the above.
    pub fn from_js(value: JsValue) -> Result<Self, InvalidMockType> {
        if let Some(name) = value.as_string() {
            return Self::from_name(&name);
        }
        value
            .dyn_into::<js_sys::Function>()
            .map(Self::from_js_function)
            .map_err(|v| InvalidMockType(format!("{:?}", v)))
    }

    /// Parses a predefined [`MockType`] by its name.
    ///
    /// # Errors
    ///
    /// With [`InvalidMockType`] if `name` is not a predefined [`MockType`].
    pub fn from_name(name: &str) -> Result<Self, InvalidMockType> {
        match name {
            "canvas" => Ok(Self::Canvas),
            "mediaElement" => Ok(Self::MediaElement),
            _ => Err(InvalidMockType(name.to_owned())),
        }
    }
}

/// Constraints reported by a synthetic [getSupportedConstraints()][1].
///
/// Every known capability is listed per [`MediaKind`] with `false` by
/// default, and can be overridden with [`ConstraintsConfig::update()`].
///
/// [1]: https://w3.org/TR/mediacapture-streams/#dom-mediadevices-getsupportedconstraints
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ConstraintsConfig {
    /// Video capabilities.
    pub video: Map<String, Value>,

    /// Audio capabilities.
    pub audio: Map<String, Value>,

    /// Image capture capabilities.
    pub image: Map<String, Value>,
}

impl ConstraintsConfig {
    /// Returns capabilities of the provided [`MediaKind`].
    #[inline]
    #[must_use]
    pub fn get(&self, kind: MediaKind) -> &Map<String, Value> {
        match kind {
            MediaKind::Video => &self.video,
            MediaKind::Audio => &self.audio,
            MediaKind::Image => &self.image,
        }
    }

    /// Merges the `updates` into the capabilities of the provided
    /// [`MediaKind`], dropping all the existing ones first if `overwrite` is
    /// `true`.
    pub fn update(
        &mut self,
        kind: MediaKind,
        updates: Map<String, Value>,
        overwrite: bool,
    ) {
        let caps = match kind {
            MediaKind::Video => &mut self.video,
            MediaKind::Audio => &mut self.audio,
            MediaKind::Image => &mut self.image,
        };
        if overwrite {
            caps.clear();
        }
        for (key, value) in updates {
            drop(caps.insert(key, value));
        }
    }
}

impl Default for ConstraintsConfig {
    fn default() -> Self {
        /// Builds capabilities map with all the `caps` unsupported.
        fn unsupported(caps: &[&str]) -> Map<String, Value> {
            caps.iter()
                .map(|cap| ((*cap).to_owned(), Value::Bool(false)))
                .collect()
        }

        Self {
            video: unsupported(&[
                // Upon testing in Chrome, width and height hold priority over
                // aspectRatio.
                "aspectRatio",
                "facingMode",
                "frameRate",
                "height",
                "width",
            ]),
            audio: unsupported(&[
                "autoGainControl",
                "channelCount",
                "echoCancellation",
                "latency",
                "noiseSuppression",
                "sampleRate",
                "sampleSize",
                "volume",
            ]),
            image: unsupported(&[
                "whiteBalanceMode",
                "exposureMode",
                "focusMode",
                "pointsOfInterest",
                "exposureCompensation",
                "colorTemperature",
                "iso",
                "brightness",
                "contrast",
                "saturation",
                "sharpness",
                "focusDistance",
                "zoom",
                "torch",
            ]),
        }
    }
}

/// Settings of the synthetic media.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Source of [`MockType::MediaElement`] streams.
    pub media_url: String,

    /// Strategy of synthesizing streams.
    pub mock_type: MockType,

    /// Constraints reported as supported.
    pub constraints: ConstraintsConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            media_url: DEFAULT_MEDIA_URL.to_owned(),
            mock_type: MockType::default(),
            constraints: ConstraintsConfig::default(),
        }
    }
}
