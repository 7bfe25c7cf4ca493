//! [MediaDeviceInfo][1] related objects and the catalog of synthetic
//! devices.
//!
//! [1]: https://w3.org/TR/mediacapture-streams/#device-info

use std::convert::TryFrom;

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Kind of a media device.
///
/// [`DeviceKind::VideoOutput`] is not a kind browsers report. It exists to
/// describe the camera of [`catalog()`].
#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Audio input device (e.g. a microphone).
    #[display(fmt = "audioinput")]
    AudioInput,

    /// Audio output device (e.g. headphones).
    #[display(fmt = "audiooutput")]
    AudioOutput,

    /// Video input device (e.g. a webcam).
    #[display(fmt = "videoinput")]
    VideoInput,

    /// Non-standard video output device.
    #[display(fmt = "videooutput")]
    VideoOutput,
}

/// Error of parsing a [`DeviceKind`].
#[derive(Clone, Debug, Display, PartialEq)]
#[display(fmt = "Unknown device kind: {}", _0)]
pub struct UnknownDeviceKind(pub String);

impl TryFrom<&str> for DeviceKind {
    type Error = UnknownDeviceKind;

    fn try_from(kind: &str) -> Result<Self, Self::Error> {
        match kind {
            "audioinput" => Ok(Self::AudioInput),
            "audiooutput" => Ok(Self::AudioOutput),
            "videoinput" => Ok(Self::VideoInput),
            "videooutput" => Ok(Self::VideoOutput),
            _ => Err(UnknownDeviceKind(kind.to_owned())),
        }
    }
}

/// Representation of [MediaDeviceInfo][1].
///
/// [1]: https://w3.org/TR/mediacapture-streams/#device-info
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Kind of the represented device.
    pub kind: DeviceKind,

    /// Label describing the represented device (for example
    /// "External USB Webcam").
    pub label: String,

    /// Unique identifier of the represented device.
    pub device_id: String,

    /// Group identifier of the represented device.
    ///
    /// Two devices have the same group identifier if they belong to the same
    /// physical device.
    pub group_id: String,
}

/// Returns the fixed list of synthetic devices.
///
/// Identifiers are positions in the list.
///
/// Known defect: the camera is reported as [`DeviceKind::VideoOutput`]
/// instead of [`DeviceKind::VideoInput`], and the headset is listed as an
/// output. Pages relying on this catalog observe exactly these kinds.
#[must_use]
pub fn catalog() -> Vec<DeviceInfo> {
    [
        (DeviceKind::AudioInput, "(4- BUFFALO BSW32KM03 USB PC Camera)"),
        (DeviceKind::AudioOutput, "Bluetooth Hands-free Audio"),
        (DeviceKind::VideoOutput, "BUFFALO BSW32KM03 USB PC Camera"),
    ]
    .iter()
    .enumerate()
    .map(|(i, (kind, label))| DeviceInfo {
        kind: *kind,
        label: (*label).to_owned(),
        device_id: i.to_string(),
        group_id: i.to_string(),
    })
    .collect()
}
