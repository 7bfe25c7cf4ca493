//! Rust side of the mocking library: the [`UserMediaMock`] facade and the
//! synthetic, fallback and routing [`MediaDevices`] implementations.

pub mod fallback;
pub mod router;
pub mod synthetic;

use std::{cell::RefCell, rc::Rc};

use derive_more::{Display, From};
use serde_json::{Map, Value};
use tracerr::Traced;

use crate::{
    media::{
        device_info, settings::InvalidMockType, ConstraintsConfig, DeviceInfo,
        MediaKind, MockType, Settings, StreamHandle, StreamRequest,
        UnknownMediaKind,
    },
    platform::{
        self, InterceptionError, InterceptionManager, MediaDevices,
        MediaDevicesError, MockOptions, NavigatorMediaDevices,
    },
    synth::StreamSynthesizer,
    utils::{JsCaused, JsonParseError},
};

#[doc(inline)]
pub use self::{
    fallback::FallbackMediaDevices, router::MediaDevicesRouter,
    synthetic::SyntheticMediaDevices,
};

/// Errors of configuring a [`UserMediaMock`].
#[derive(Clone, Debug, Display, From, PartialEq)]
pub enum ConfigurationError {
    /// Occurs when an unknown [`MockType`] is set.
    #[display(fmt = "{}", _0)]
    InvalidConfiguration(InvalidMockType),

    /// Occurs when constraints are updated for an unknown [`MediaKind`].
    #[display(fmt = "{}", _0)]
    UnknownMediaKind(UnknownMediaKind),

    /// Occurs when constraints updates are not a JSON object.
    #[display(fmt = "Malformed constraints: {}", _0)]
    MalformedConstraints(JsonParseError),
}

impl JsCaused for ConfigurationError {
    fn name(&self) -> &'static str {
        match self {
            Self::InvalidConfiguration(_) => "InvalidConfiguration",
            Self::UnknownMediaKind(_) => "UnknownMediaKind",
            Self::MalformedConstraints(_) => "MalformedConstraints",
        }
    }

    fn js_cause(self) -> Option<platform::Error> {
        None
    }
}

/// Mocking library interface.
///
/// Owns the [`Settings`] of the synthetic media and the interception of the
/// `navigator` entry points. Intercepted entry points are restored once
/// [`UserMediaMock`] is dropped.
pub struct UserMediaMock {
    /// Settings shared with every synthetic [`MediaDevices`] created by this
    /// [`UserMediaMock`].
    settings: Rc<RefCell<Settings>>,

    /// Interception of the `navigator` entry points.
    interception: RefCell<InterceptionManager>,
}

impl UserMediaMock {
    /// Creates a new [`UserMediaMock`] with the default [`Settings`] and
    /// nothing intercepted.
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: Rc::default(),
            interception: RefCell::new(InterceptionManager::new()),
        }
    }

    /// Replaces the `navigator` entry points selected by the provided
    /// [`MockOptions`] with the [`SyntheticMediaDevices`].
    ///
    /// # Errors
    ///
    /// With [`InterceptionError`] if the `navigator` cannot be patched.
    pub fn mock(
        &self,
        options: MockOptions,
    ) -> Result<(), Traced<InterceptionError>> {
        let mut interception = self.interception.borrow_mut();
        interception.capture_originals().map_err(tracerr::wrap!())?;

        let synthetic: Rc<dyn MediaDevices> = Rc::new(self.synthetic());
        interception
            .install(options, &synthetic)
            .map_err(tracerr::wrap!())
    }

    /// Replaces both `getUserMedia` entry points of the `navigator` with the
    /// [`FallbackMediaDevices`] over the original ones.
    ///
    /// # Errors
    ///
    /// With [`InterceptionError`] if the `navigator` cannot be patched.
    pub fn fallback_mock(&self) -> Result<(), Traced<InterceptionError>> {
        let mut interception = self.interception.borrow_mut();
        interception.capture_originals().map_err(tracerr::wrap!())?;

        let real = interception
            .originals()
            .cloned()
            .map(NavigatorMediaDevices::new)
            .ok_or_else(|| tracerr::new!(InterceptionError::NotCaptured))?;
        let fallback: Rc<dyn MediaDevices> = Rc::new(
            FallbackMediaDevices::new(Rc::new(real), self.synthesizer()),
        );
        interception
            .install(MockOptions::get_user_media_only(), &fallback)
            .map_err(tracerr::wrap!())
    }

    /// Restores the original `navigator` entry points, if intercepted.
    #[inline]
    pub fn restore(&self) {
        self.interception.borrow_mut().restore();
    }

    /// Indicates whether the original `navigator` entry points are captured.
    #[inline]
    #[must_use]
    pub fn is_prepared(&self) -> bool {
        self.interception.borrow().is_prepared()
    }

    /// Merges the provided `updates` into the constraints of the `kind`
    /// media, clearing them first if `overwrite` is set.
    ///
    /// Returns `false` and changes nothing if the `kind` is unknown.
    pub fn update_constraints(
        &self,
        kind: &str,
        updates: Map<String, Value>,
        overwrite: bool,
    ) -> bool {
        match kind.parse::<MediaKind>() {
            Ok(kind) => {
                self.settings
                    .borrow_mut()
                    .constraints
                    .update(kind, updates, overwrite);
                true
            }
            Err(_) => false,
        }
    }

    /// Sets source of the [`MockType::MediaElement`] streams.
    #[inline]
    pub fn set_media_url(&self, url: String) {
        self.settings.borrow_mut().media_url = url;
    }

    /// Sets the strategy of synthesizing streams.
    #[inline]
    pub fn set_mock_type(&self, mock_type: MockType) {
        log::debug!("mockType set to {}", mock_type.name());
        self.settings.borrow_mut().mock_type = mock_type;
    }

    /// Returns the current strategy of synthesizing streams.
    #[inline]
    #[must_use]
    pub fn mock_type(&self) -> MockType {
        self.settings.borrow().mock_type.clone()
    }

    /// Returns the current source of the [`MockType::MediaElement`] streams.
    #[inline]
    #[must_use]
    pub fn media_url(&self) -> String {
        self.settings.borrow().media_url.clone()
    }

    /// Synthesizes a stream for the provided [`StreamRequest`] without any
    /// interception involved.
    ///
    /// # Errors
    ///
    /// With [`MediaDevicesError::Synthesis`] if the stream cannot be
    /// synthesized.
    pub async fn get_mock_stream(
        &self,
        request: StreamRequest,
    ) -> Result<StreamHandle, Traced<MediaDevicesError>> {
        self.synthetic()
            .get_user_media(request)
            .await
            .map_err(tracerr::wrap!())
    }

    /// Returns the synthetic devices.
    #[inline]
    #[must_use]
    pub fn get_mock_devices(&self) -> Vec<DeviceInfo> {
        device_info::catalog()
    }

    /// Returns the constraints reported as supported.
    #[inline]
    #[must_use]
    pub fn supported_constraints(&self) -> ConstraintsConfig {
        self.settings.borrow().constraints.clone()
    }

    /// Returns [`SyntheticMediaDevices`] sharing [`Settings`] of this
    /// [`UserMediaMock`].
    #[inline]
    #[must_use]
    pub fn synthetic(&self) -> SyntheticMediaDevices {
        SyntheticMediaDevices::new(Rc::clone(&self.settings))
    }

    /// Returns [`MediaDevicesRouter`] routing the entry points selected by
    /// the provided [`MockOptions`] to the [`SyntheticMediaDevices`].
    ///
    /// Other entry points go to the captured originals, or to the current
    /// `navigator` ones if nothing is captured.
    #[must_use]
    pub fn router(&self, options: MockOptions) -> MediaDevicesRouter {
        let real = self
            .interception
            .borrow()
            .originals()
            .cloned()
            .map_or_else(
                NavigatorMediaDevices::current,
                NavigatorMediaDevices::new,
            );
        MediaDevicesRouter::new(
            Rc::new(real),
            Rc::new(self.synthetic()),
            options,
        )
    }

    /// Returns [`StreamSynthesizer`] sharing [`Settings`] of this
    /// [`UserMediaMock`].
    fn synthesizer(&self) -> StreamSynthesizer {
        StreamSynthesizer::new(Rc::clone(&self.settings))
    }
}

impl Default for UserMediaMock {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for UserMediaMock {
    fn drop(&mut self) {
        self.interception.get_mut().restore();
    }
}
