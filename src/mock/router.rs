//! [`MediaDevices`] dispatching each entry point to either the real or the
//! synthetic implementation.

use std::rc::Rc;

use async_trait::async_trait;
use tracerr::Traced;

use crate::{
    media::{DeviceInfo, StreamHandle, StreamRequest},
    platform::{EntryPoint, MediaDevices, MediaDevicesError, MockOptions},
};

/// [`MediaDevices`] routing the [`EntryPoint`]s selected by its
/// [`MockOptions`] to the synthetic implementation, and all the others to the
/// real one.
///
/// Allows choosing the active implementation without patching the
/// `navigator`.
pub struct MediaDevicesRouter {
    /// Real [`MediaDevices`].
    real: Rc<dyn MediaDevices>,

    /// Synthetic [`MediaDevices`].
    synthetic: Rc<dyn MediaDevices>,

    /// [`EntryPoint`]s routed to the synthetic [`MediaDevices`].
    options: MockOptions,
}

impl MediaDevicesRouter {
    /// Creates a new [`MediaDevicesRouter`].
    #[inline]
    #[must_use]
    pub fn new(
        real: Rc<dyn MediaDevices>,
        synthetic: Rc<dyn MediaDevices>,
        options: MockOptions,
    ) -> Self {
        Self {
            real,
            synthetic,
            options,
        }
    }

    /// Returns [`MediaDevices`] the provided [`EntryPoint`] is routed to.
    fn route(&self, entry_point: EntryPoint) -> &dyn MediaDevices {
        if self.options.selects(entry_point) {
            self.synthetic.as_ref()
        } else {
            self.real.as_ref()
        }
    }
}

#[async_trait(?Send)]
impl MediaDevices for MediaDevicesRouter {
    async fn get_user_media(
        &self,
        request: StreamRequest,
    ) -> Result<StreamHandle, Traced<MediaDevicesError>> {
        self.route(EntryPoint::GetUserMedia)
            .get_user_media(request)
            .await
    }

    async fn legacy_get_user_media(
        &self,
        request: StreamRequest,
    ) -> Result<StreamHandle, Traced<MediaDevicesError>> {
        self.route(EntryPoint::LegacyGetUserMedia)
            .legacy_get_user_media(request)
            .await
    }

    async fn enumerate_devices(
        &self,
    ) -> Result<Vec<DeviceInfo>, Traced<MediaDevicesError>> {
        self.route(EntryPoint::EnumerateDevices)
            .enumerate_devices()
            .await
    }

    fn get_supported_constraints(
        &self,
    ) -> Result<serde_json::Value, Traced<MediaDevicesError>> {
        self.route(EntryPoint::GetSupportedConstraints)
            .get_supported_constraints()
    }
}

#[cfg(test)]
mod spec {
    use futures::executor::block_on;
    use serde_json::json;

    use crate::{media::device_info::catalog, platform::MockMediaDevices};

    use super::*;

    fn unavailable(what: &'static str) -> Traced<MediaDevicesError> {
        tracerr::new!(MediaDevicesError::PlatformUnavailable(what))
    }

    /// Returns [`MockMediaDevices`] which must never be called.
    fn untouched() -> MockMediaDevices {
        let mut devices = MockMediaDevices::new();
        devices.expect_get_user_media().never();
        devices.expect_legacy_get_user_media().never();
        devices.expect_enumerate_devices().never();
        devices.expect_get_supported_constraints().never();
        devices
    }

    #[test]
    fn routes_selected_entry_points_to_synthetic() {
        let mut synthetic = MockMediaDevices::new();
        synthetic
            .expect_enumerate_devices()
            .times(1)
            .returning(|| Ok(catalog()));
        synthetic
            .expect_get_supported_constraints()
            .times(1)
            .returning(|| Ok(json!({"video": {}})));
        let router = MediaDevicesRouter::new(
            Rc::new(untouched()),
            Rc::new(synthetic),
            MockOptions::default(),
        );

        assert_eq!(block_on(router.enumerate_devices()).unwrap().len(), 3);
        assert_eq!(
            router.get_supported_constraints().unwrap(),
            json!({"video": {}}),
        );
    }

    #[test]
    fn routes_unselected_entry_points_to_real() {
        let mut real = MockMediaDevices::new();
        real.expect_enumerate_devices()
            .times(1)
            .returning(|| Ok(Vec::new()));
        real.expect_get_user_media()
            .times(1)
            .returning(|_| Err(unavailable("MediaDevices.getUserMedia()")));
        let router = MediaDevicesRouter::new(
            Rc::new(real),
            Rc::new(untouched()),
            MockOptions::none(),
        );

        assert!(block_on(router.enumerate_devices()).unwrap().is_empty());
        let err = block_on(
            router.get_user_media(StreamRequest::from_json(json!(null))),
        )
        .unwrap_err();
        assert_eq!(
            err.into_inner(),
            MediaDevicesError::PlatformUnavailable(
                "MediaDevices.getUserMedia()"
            ),
        );
    }

    #[test]
    fn routes_legacy_and_promise_entry_points_independently() {
        let mut real = MockMediaDevices::new();
        real.expect_get_user_media()
            .times(1)
            .returning(|_| Err(unavailable("real")));
        let mut synthetic = MockMediaDevices::new();
        synthetic
            .expect_legacy_get_user_media()
            .times(1)
            .returning(|_| Err(unavailable("synthetic")));
        let router = MediaDevicesRouter::new(
            Rc::new(real),
            Rc::new(synthetic),
            MockOptions {
                get_user_media: false,
                ..MockOptions::get_user_media_only()
            },
        );

        let promise = block_on(
            router.get_user_media(StreamRequest::from_json(json!(null))),
        );
        let legacy = block_on(
            router.legacy_get_user_media(StreamRequest::from_json(json!(null))),
        );

        assert_eq!(
            promise.unwrap_err().into_inner(),
            MediaDevicesError::PlatformUnavailable("real"),
        );
        assert_eq!(
            legacy.unwrap_err().into_inner(),
            MediaDevicesError::PlatformUnavailable("synthetic"),
        );
    }
}
