//! [`MediaDevices`] producing synthetic media only.

use std::{cell::RefCell, rc::Rc};

use async_trait::async_trait;
use tracerr::Traced;

use crate::{
    media::{device_info, DeviceInfo, Settings, StreamHandle, StreamRequest},
    platform::{MediaDevices, MediaDevicesError},
    synth::StreamSynthesizer,
    utils::JsonParseError,
};

/// [`MediaDevices`] which never touches real devices.
///
/// Streams are synthesized according to the current [`Settings`], devices
/// are the [`device_info::catalog()`], and the configured constraints are
/// reported as the supported ones.
#[derive(Clone, Debug)]
pub struct SyntheticMediaDevices {
    /// Shared [`Settings`] of the synthetic media.
    settings: Rc<RefCell<Settings>>,

    /// Producer of the synthetic streams.
    synthesizer: StreamSynthesizer,
}

impl SyntheticMediaDevices {
    /// Creates a new [`SyntheticMediaDevices`] reading the provided
    /// [`Settings`] on each call.
    #[must_use]
    pub fn new(settings: Rc<RefCell<Settings>>) -> Self {
        Self {
            synthesizer: StreamSynthesizer::new(Rc::clone(&settings)),
            settings,
        }
    }
}

#[async_trait(?Send)]
impl MediaDevices for SyntheticMediaDevices {
    async fn get_user_media(
        &self,
        request: StreamRequest,
    ) -> Result<StreamHandle, Traced<MediaDevicesError>> {
        self.synthesizer
            .synthesize(&request)
            .await
            .map_err(tracerr::map_from_and_wrap!())
    }

    async fn enumerate_devices(
        &self,
    ) -> Result<Vec<DeviceInfo>, Traced<MediaDevicesError>> {
        Ok(device_info::catalog())
    }

    fn get_supported_constraints(
        &self,
    ) -> Result<serde_json::Value, Traced<MediaDevicesError>> {
        serde_json::to_value(&self.settings.borrow().constraints)
            .map_err(JsonParseError::from)
            .map_err(MediaDevicesError::from)
            .map_err(tracerr::wrap!())
    }
}
