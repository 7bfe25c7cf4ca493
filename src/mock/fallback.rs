//! [`MediaDevices`] substituting synthetic streams for failed real ones.

use std::rc::Rc;

use async_trait::async_trait;
use tracerr::Traced;

use crate::{
    media::{DeviceInfo, StreamHandle, StreamRequest},
    platform::{MediaDevices, MediaDevicesError},
    synth::StreamSynthesizer,
};

/// [`MediaDevices`] acquiring media from the `real` ones and synthesizing it
/// only when they fail.
///
/// Devices enumeration and supported constraints always come from the
/// `real` [`MediaDevices`].
pub struct FallbackMediaDevices {
    /// Real [`MediaDevices`] tried first.
    real: Rc<dyn MediaDevices>,

    /// Producer of the substitute streams.
    synthesizer: StreamSynthesizer,
}

impl FallbackMediaDevices {
    /// Creates a new [`FallbackMediaDevices`] falling back from the `real`
    /// [`MediaDevices`] to the provided [`StreamSynthesizer`].
    #[inline]
    #[must_use]
    pub fn new(
        real: Rc<dyn MediaDevices>,
        synthesizer: StreamSynthesizer,
    ) -> Self {
        Self { real, synthesizer }
    }

    /// Returns the `acquired` stream, or a synthetic one for the `request`
    /// if acquiring has failed.
    async fn or_synthesize(
        &self,
        acquired: Result<StreamHandle, Traced<MediaDevicesError>>,
        request: StreamRequest,
    ) -> Result<StreamHandle, Traced<MediaDevicesError>> {
        match acquired {
            Ok(stream) => {
                log::debug!("Real media acquired, no fallback needed");
                Ok(stream)
            }
            Err(e) => {
                log::warn!("Falling back to synthetic media: {}", e);
                self.synthesizer
                    .synthesize(&request)
                    .await
                    .map_err(tracerr::map_from_and_wrap!())
            }
        }
    }
}

#[async_trait(?Send)]
impl MediaDevices for FallbackMediaDevices {
    async fn get_user_media(
        &self,
        request: StreamRequest,
    ) -> Result<StreamHandle, Traced<MediaDevicesError>> {
        let acquired = self.real.get_user_media(request.clone()).await;
        self.or_synthesize(acquired, request).await
    }

    async fn legacy_get_user_media(
        &self,
        request: StreamRequest,
    ) -> Result<StreamHandle, Traced<MediaDevicesError>> {
        let acquired = self.real.legacy_get_user_media(request.clone()).await;
        self.or_synthesize(acquired, request).await
    }

    async fn enumerate_devices(
        &self,
    ) -> Result<Vec<DeviceInfo>, Traced<MediaDevicesError>> {
        self.real.enumerate_devices().await
    }

    fn get_supported_constraints(
        &self,
    ) -> Result<serde_json::Value, Traced<MediaDevicesError>> {
        self.real.get_supported_constraints()
    }
}

#[cfg(test)]
mod spec {
    use futures::executor::block_on;
    use serde_json::json;

    use crate::{
        media::{DeviceKind, Settings},
        platform::MockMediaDevices,
    };

    use super::*;

    fn fallback(real: MockMediaDevices) -> FallbackMediaDevices {
        FallbackMediaDevices::new(
            Rc::new(real),
            StreamSynthesizer::new(Rc::new(Settings::default().into())),
        )
    }

    #[test]
    fn passes_enumeration_through() {
        let mut real = MockMediaDevices::new();
        real.expect_enumerate_devices().times(1).returning(|| {
            Ok(vec![DeviceInfo {
                kind: DeviceKind::VideoInput,
                label: "Real camera".into(),
                device_id: "cam".into(),
                group_id: "grp".into(),
            }])
        });

        let devices = block_on(fallback(real).enumerate_devices()).unwrap();

        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].label, "Real camera");
    }

    #[test]
    fn passes_supported_constraints_through() {
        let mut real = MockMediaDevices::new();
        real.expect_get_supported_constraints()
            .times(1)
            .returning(|| Ok(json!({"width": true})));

        let supported = fallback(real).get_supported_constraints().unwrap();

        assert_eq!(supported, json!({"width": true}));
    }

    #[test]
    fn surfaces_real_enumeration_failure() {
        let mut real = MockMediaDevices::new();
        real.expect_enumerate_devices().times(1).returning(|| {
            Err(tracerr::new!(MediaDevicesError::PlatformUnavailable(
                "MediaDevices.enumerateDevices()"
            )))
        });

        let err = block_on(fallback(real).enumerate_devices()).unwrap_err();

        assert_eq!(
            err.into_inner(),
            MediaDevicesError::PlatformUnavailable(
                "MediaDevices.enumerateDevices()"
            ),
        );
    }
}
