//! Media acquisition requests, their results and the configuration of the
//! synthetic media.

pub mod constraints;
pub mod device_info;
pub mod settings;
mod stream;

use std::{convert::TryFrom, str::FromStr};

use derive_more::Display;
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;

use crate::{
    platform,
    utils::{self, JsCaused},
};

#[doc(inline)]
pub use self::{
    constraints::ConstraintValue,
    device_info::{DeviceInfo, DeviceKind},
    settings::{ConstraintsConfig, CustomHandler, MockType, Settings},
    stream::{StopHandle, StreamHandle},
};

/// Kind of media a constraint set applies to.
#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Video track constraints.
    #[display(fmt = "video")]
    Video,

    /// Audio track constraints.
    #[display(fmt = "audio")]
    Audio,

    /// [Image capture][1] constraints.
    ///
    /// [1]: https://w3.org/TR/image-capture/#mediatracksupportedconstraints-section
    #[display(fmt = "image")]
    Image,
}

impl MediaKind {
    /// Returns the key this [`MediaKind`] is stored under in a constraints
    /// object.
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Image => "image",
        }
    }
}

/// Error of parsing a [`MediaKind`] from a string.
#[derive(Clone, Debug, Display, PartialEq)]
#[display(fmt = "Unknown media kind: {}", _0)]
pub struct UnknownMediaKind(pub String);

impl FromStr for MediaKind {
    type Err = UnknownMediaKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            "image" => Ok(Self::Image),
            _ => Err(UnknownMediaKind(s.to_owned())),
        }
    }
}

/// Error of reading a [`StreamRequest`] from a JS value.
#[derive(Clone, Debug, Display, PartialEq)]
#[display(fmt = "Malformed media request: {}", _0)]
pub struct MalformedRequest(pub platform::Error);

impl JsCaused for MalformedRequest {
    fn name(&self) -> &'static str {
        "MalformedRequest"
    }

    fn js_cause(self) -> Option<platform::Error> {
        Some(self.0)
    }
}

/// Media acquisition request as it was passed to a
/// [getUserMedia()][1] call.
///
/// The raw JS object is kept untouched for the platform and custom
/// handlers, while constraints are resolved from its [`ConstraintValue`].
///
/// [1]: https://w3.org/TR/mediacapture-streams#dom-mediadevices-getusermedia
#[derive(Clone, Debug)]
pub struct StreamRequest {
    /// Request exactly as the caller passed it.
    raw: JsValue,

    /// [`StreamRequest::raw`] as read by [`ConstraintValue::from_js()`].
    constraints: ConstraintValue,
}

impl StreamRequest {
    /// Builds a [`StreamRequest`] from its JSON representation only.
    ///
    /// The raw JS request is produced lazily when the platform needs it.
    #[must_use]
    pub fn from_json(constraints: serde_json::Value) -> Self {
        Self {
            raw: JsValue::UNDEFINED,
            constraints: constraints.into(),
        }
    }

    /// Returns the constraints of this [`StreamRequest`].
    #[inline]
    #[must_use]
    pub fn constraints(&self) -> &ConstraintValue {
        &self.constraints
    }

    /// Returns this [`StreamRequest`] as a JS value.
    ///
    /// If this request was built from a JS value, then exactly that value is
    /// returned.
    #[must_use]
    pub fn to_js(&self) -> JsValue {
        if self.raw.is_undefined()
            && self.constraints != ConstraintValue::Undefined
        {
            let json = serde_json::Value::from(&self.constraints);
            utils::to_js(&json).unwrap_or(JsValue::UNDEFINED)
        } else {
            self.raw.clone()
        }
    }
}

impl TryFrom<JsValue> for StreamRequest {
    type Error = MalformedRequest;

    fn try_from(raw: JsValue) -> Result<Self, Self::Error> {
        let constraints =
            ConstraintValue::from_js(&raw).map_err(MalformedRequest)?;
        Ok(Self { raw, constraints })
    }
}
