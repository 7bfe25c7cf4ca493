//! [MediaDevices][1] functionality.
//!
//! [1]: https://w3.org/TR/mediacapture-streams#mediadevices

use std::convert::TryFrom as _;

use async_trait::async_trait;
use derive_more::{Display, From};
use js_sys::{Promise, Reflect};
use tracerr::Traced;
use wasm_bindgen::{JsCast as _, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::{
    media::{DeviceInfo, DeviceKind, StreamHandle, StreamRequest},
    platform,
    synth::SynthesisError,
    utils::{self, get_property_by_name, window, JsCaused, JsonParseError},
};

/// Errors that may occur when acquiring media or querying media devices.
#[derive(Clone, Debug, Display, From, PartialEq)]
pub enum MediaDevicesError {
    /// Occurs when the platform doesn't provide the required entry point.
    #[display(fmt = "{} is not available", _0)]
    #[from(ignore)]
    PlatformUnavailable(&'static str),

    /// Occurs when [Navigator.getUserMedia()][1] fails.
    ///
    /// [1]: https://w3.org/TR/mediacapture-streams/#dom-navigator-getusermedia
    #[display(fmt = "Navigator.getUserMedia() failed: {}", _0)]
    #[from(ignore)]
    LegacyGetUserMediaFailed(platform::Error),

    /// Occurs when [MediaDevices.getUserMedia()][1] fails.
    ///
    /// [1]: https://w3.org/TR/mediacapture-streams#dom-mediadevices-getusermedia
    #[display(fmt = "MediaDevices.getUserMedia() failed: {}", _0)]
    #[from(ignore)]
    GetUserMediaFailed(platform::Error),

    /// Occurs when [MediaDevices.enumerateDevices()][1] fails.
    ///
    /// [1]: https://tinyurl.com/w3-streams#dom-mediadevices-enumeratedevices
    #[display(fmt = "MediaDevices.enumerateDevices() failed: {}", _0)]
    #[from(ignore)]
    EnumerateDevicesFailed(platform::Error),

    /// Occurs when [MediaDevices.getSupportedConstraints()][1] fails.
    ///
    /// [1]: https://tinyurl.com/w3-streams#dom-mediadevices-getsupportedconstraints
    #[display(fmt = "MediaDevices.getSupportedConstraints() failed: {}", _0)]
    #[from(ignore)]
    GetSupportedConstraintsFailed(platform::Error),

    /// Occurs when supported constraints cannot be represented as JSON.
    #[display(fmt = "Malformed supported constraints: {}", _0)]
    MalformedSupportedConstraints(JsonParseError),

    /// Occurs when a synthetic stream cannot be produced.
    #[display(fmt = "Failed to synthesize mock stream: {}", _0)]
    Synthesis(SynthesisError),
}

impl JsCaused for MediaDevicesError {
    fn name(&self) -> &'static str {
        match self {
            Self::PlatformUnavailable(_) => "PlatformUnavailable",
            Self::LegacyGetUserMediaFailed(_) => "LegacyGetUserMediaFailed",
            Self::GetUserMediaFailed(_) => "GetUserMediaFailed",
            Self::EnumerateDevicesFailed(_) => "EnumerateDevicesFailed",
            Self::GetSupportedConstraintsFailed(_) => {
                "GetSupportedConstraintsFailed"
            }
            Self::MalformedSupportedConstraints(_) => {
                "MalformedSupportedConstraints"
            }
            Self::Synthesis(err) => err.name(),
        }
    }

    fn js_cause(self) -> Option<platform::Error> {
        match self {
            Self::LegacyGetUserMediaFailed(err)
            | Self::GetUserMediaFailed(err)
            | Self::EnumerateDevicesFailed(err)
            | Self::GetSupportedConstraintsFailed(err) => Some(err),
            Self::Synthesis(err) => err.js_cause(),
            Self::PlatformUnavailable(_)
            | Self::MalformedSupportedConstraints(_) => None,
        }
    }
}

/// Media acquisition entry points of a platform.
///
/// Implemented by the real browser ([`NavigatorMediaDevices`]) and by
/// synthetic implementations, so the embedding code decides which one is
/// active.
#[cfg_attr(any(test, feature = "mockable"), mockall::automock)]
#[async_trait(?Send)]
pub trait MediaDevices {
    /// Prompts for a media stream satisfying the provided [`StreamRequest`].
    ///
    /// Adapter for a [MediaDevices.getUserMedia()][1] function.
    ///
    /// [1]: https://w3.org/TR/mediacapture-streams#dom-mediadevices-getusermedia
    async fn get_user_media(
        &self,
        request: StreamRequest,
    ) -> Result<StreamHandle, Traced<MediaDevicesError>>;

    /// Same as [`MediaDevices::get_user_media()`], but for the legacy
    /// callback based [Navigator.getUserMedia()][1] function.
    ///
    /// [1]: https://w3.org/TR/mediacapture-streams/#dom-navigator-getusermedia
    async fn legacy_get_user_media(
        &self,
        request: StreamRequest,
    ) -> Result<StreamHandle, Traced<MediaDevicesError>> {
        self.get_user_media(request).await
    }

    /// Collects information about available media devices.
    ///
    /// Adapter for a [MediaDevices.enumerateDevices()][1] function.
    ///
    /// [1]: https://tinyurl.com/w3-streams#dom-mediadevices-enumeratedevices
    async fn enumerate_devices(
        &self,
    ) -> Result<Vec<DeviceInfo>, Traced<MediaDevicesError>>;

    /// Returns the constraints this platform supports.
    ///
    /// Adapter for a [MediaDevices.getSupportedConstraints()][1] function.
    ///
    /// [1]: https://tinyurl.com/w3-streams#dom-mediadevices-getsupportedconstraints
    fn get_supported_constraints(
        &self,
    ) -> Result<serde_json::Value, Traced<MediaDevicesError>>;
}

/// Media acquisition entry points of a browser: `navigator.getUserMedia` and
/// `navigator.mediaDevices.{getUserMedia, enumerateDevices,
/// getSupportedConstraints}`.
///
/// Missing entry points are kept as `undefined`.
#[derive(Clone, Debug)]
pub struct EntryPoints {
    /// `navigator` object.
    pub navigator: JsValue,

    /// `navigator.mediaDevices` object.
    pub media_devices: JsValue,

    /// `navigator.getUserMedia` function.
    pub legacy_get_user_media: JsValue,

    /// `navigator.mediaDevices.getUserMedia` function.
    pub get_user_media: JsValue,

    /// `navigator.mediaDevices.enumerateDevices` function.
    pub enumerate_devices: JsValue,

    /// `navigator.mediaDevices.getSupportedConstraints` function.
    pub get_supported_constraints: JsValue,
}

impl EntryPoints {
    /// Reads the entry points currently exposed by the `navigator`.
    #[must_use]
    pub fn current() -> Self {
        let navigator = JsValue::from(window().navigator());
        let media_devices = property(&navigator, "mediaDevices");
        Self {
            legacy_get_user_media: property(&navigator, "getUserMedia"),
            get_user_media: property(&media_devices, "getUserMedia"),
            enumerate_devices: property(&media_devices, "enumerateDevices"),
            get_supported_constraints: property(
                &media_devices,
                "getSupportedConstraints",
            ),
            navigator,
            media_devices,
        }
    }
}

/// Returns the `name` property of the `target` or `undefined` if `target`
/// is not an object.
fn property(target: &JsValue, name: &str) -> JsValue {
    if target.is_object() {
        Reflect::get(target, &JsValue::from_str(name))
            .unwrap_or(JsValue::UNDEFINED)
    } else {
        JsValue::UNDEFINED
    }
}

/// Real browser [`MediaDevices`] calling the provided [`EntryPoints`].
///
/// Once the `navigator` is intercepted, this must be built from the captured
/// originals, not from the intercepted [`EntryPoints::current()`].
#[derive(Clone, Debug)]
pub struct NavigatorMediaDevices(EntryPoints);

impl NavigatorMediaDevices {
    /// Creates a new [`NavigatorMediaDevices`] calling the provided
    /// [`EntryPoints`].
    #[inline]
    #[must_use]
    pub fn new(entry_points: EntryPoints) -> Self {
        Self(entry_points)
    }

    /// Creates a new [`NavigatorMediaDevices`] calling the entry points
    /// the `navigator` currently exposes.
    #[inline]
    #[must_use]
    pub fn current() -> Self {
        Self(EntryPoints::current())
    }
}

/// Returns `func` as a JS function or fails with
/// [`MediaDevicesError::PlatformUnavailable`] naming the entry point.
fn function(
    func: &JsValue,
    name: &'static str,
) -> Result<js_sys::Function, Traced<MediaDevicesError>> {
    func.dyn_ref::<js_sys::Function>().cloned().ok_or_else(|| {
        tracerr::new!(MediaDevicesError::PlatformUnavailable(name))
    })
}

#[async_trait(?Send)]
impl MediaDevices for NavigatorMediaDevices {
    async fn get_user_media(
        &self,
        request: StreamRequest,
    ) -> Result<StreamHandle, Traced<MediaDevicesError>> {
        let get_user_media = function(
            &self.0.get_user_media,
            "MediaDevices.getUserMedia()",
        )?;
        let promise = get_user_media
            .call1(&self.0.media_devices, &request.to_js())
            .map(|p| Promise::resolve(&p))
            .map_err(platform::error::from)
            .map_err(MediaDevicesError::GetUserMediaFailed)
            .map_err(tracerr::wrap!())?;

        JsFuture::from(promise)
            .await
            .map(|stream| StreamHandle::new(stream.unchecked_into()))
            .map_err(platform::error::from)
            .map_err(MediaDevicesError::GetUserMediaFailed)
            .map_err(tracerr::wrap!())
    }

    async fn legacy_get_user_media(
        &self,
        request: StreamRequest,
    ) -> Result<StreamHandle, Traced<MediaDevicesError>> {
        let get_user_media = function(
            &self.0.legacy_get_user_media,
            "Navigator.getUserMedia()",
        )?;
        let navigator = &self.0.navigator;
        let request = request.to_js();
        let promise = Promise::new(&mut |resolve, reject| {
            if let Err(e) =
                get_user_media.call3(navigator, &request, &resolve, &reject)
            {
                let _ = reject.call1(&JsValue::NULL, &e);
            }
        });

        JsFuture::from(promise)
            .await
            .map(|stream| StreamHandle::new(stream.unchecked_into()))
            .map_err(platform::error::from)
            .map_err(MediaDevicesError::LegacyGetUserMediaFailed)
            .map_err(tracerr::wrap!())
    }

    async fn enumerate_devices(
        &self,
    ) -> Result<Vec<DeviceInfo>, Traced<MediaDevicesError>> {
        let enumerate_devices = function(
            &self.0.enumerate_devices,
            "MediaDevices.enumerateDevices()",
        )?;
        let promise = enumerate_devices
            .call0(&self.0.media_devices)
            .map(|p| Promise::resolve(&p))
            .map_err(platform::error::from)
            .map_err(MediaDevicesError::EnumerateDevicesFailed)
            .map_err(tracerr::wrap!())?;
        let devices = JsFuture::from(promise)
            .await
            .map_err(platform::error::from)
            .map_err(MediaDevicesError::EnumerateDevicesFailed)
            .map_err(tracerr::wrap!())?;

        Ok(js_sys::Array::from(&devices)
            .iter()
            .filter_map(|info| {
                let string = |name| {
                    get_property_by_name(&info, name, |v| v.as_string())
                };
                Some(DeviceInfo {
                    kind: DeviceKind::try_from(string("kind")?.as_str()).ok()?,
                    label: string("label").unwrap_or_default(),
                    device_id: string("deviceId").unwrap_or_default(),
                    group_id: string("groupId").unwrap_or_default(),
                })
            })
            .collect())
    }

    fn get_supported_constraints(
        &self,
    ) -> Result<serde_json::Value, Traced<MediaDevicesError>> {
        let get_supported_constraints = function(
            &self.0.get_supported_constraints,
            "MediaDevices.getSupportedConstraints()",
        )?;
        let constraints = get_supported_constraints
            .call0(&self.0.media_devices)
            .map_err(platform::error::from)
            .map_err(MediaDevicesError::GetSupportedConstraintsFailed)
            .map_err(tracerr::wrap!())?;

        utils::from_js(&constraints)
            .map_err(MediaDevicesError::from)
            .map_err(tracerr::wrap!())
    }
}
