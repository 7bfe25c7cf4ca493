//! Synthesizing fake [MediaStream][1]s.
//!
//! [1]: https://w3.org/TR/mediacapture-streams/#mediastream

mod canvas;
mod media_element;

use std::{cell::RefCell, rc::Rc};

use derive_more::Display;
use js_sys::Promise;
use tracerr::Traced;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

use crate::{
    media::{CustomHandler, MockType, Settings, StreamHandle, StreamRequest},
    platform,
    utils::{document, JsCaused},
};

pub use self::canvas::{PAINT_INTERVAL_MS, TICKS_PER_SECOND};

/// Errors that may occur when synthesizing a [`StreamHandle`].
#[derive(Clone, Debug, Display, PartialEq)]
pub enum SynthesisError {
    /// Occurs when a DOM element cannot be created.
    #[display(fmt = "Failed to create <{}> element: {}", _0, _1)]
    CreateElementFailed(&'static str, platform::Error),

    /// Occurs when a 2D rendering context of a canvas cannot be obtained.
    #[display(fmt = "Failed to get 2D context of a canvas")]
    NoCanvasContext,

    /// Occurs when the periodic canvas painting cannot be scheduled.
    #[display(fmt = "Failed to schedule canvas painting: {}", _0)]
    StartPaintingFailed(platform::Error),

    /// Occurs when an element cannot be captured as a stream at all.
    #[display(fmt = "captureStream() is not supported for <{}>", _0)]
    CaptureStreamUnsupported(&'static str),

    /// Occurs when capturing an element as a stream throws.
    #[display(fmt = "captureStream() failed: {}", _0)]
    CaptureStreamFailed(platform::Error),

    /// Occurs when a custom stream generator throws or its promise rejects.
    #[display(fmt = "Custom mock stream generator failed: {}", _0)]
    CustomHandlerFailed(platform::Error),
}

impl JsCaused for SynthesisError {
    fn name(&self) -> &'static str {
        match self {
            Self::CreateElementFailed(..) => "CreateElementFailed",
            Self::NoCanvasContext => "NoCanvasContext",
            Self::StartPaintingFailed(_) => "StartPaintingFailed",
            Self::CaptureStreamUnsupported(_) => "CaptureStreamUnsupported",
            Self::CaptureStreamFailed(_) => "CaptureStreamFailed",
            Self::CustomHandlerFailed(_) => "CustomHandlerFailed",
        }
    }

    fn js_cause(self) -> Option<platform::Error> {
        match self {
            Self::CreateElementFailed(_, err)
            | Self::StartPaintingFailed(err)
            | Self::CaptureStreamFailed(err)
            | Self::CustomHandlerFailed(err) => Some(err),
            Self::NoCanvasContext | Self::CaptureStreamUnsupported(_) => None,
        }
    }
}

/// Producer of synthetic [`StreamHandle`]s according to the current
/// [`Settings`].
#[derive(Clone, Debug)]
pub struct StreamSynthesizer(Rc<RefCell<Settings>>);

impl StreamSynthesizer {
    /// Creates a new [`StreamSynthesizer`] reading the provided [`Settings`]
    /// on each [`StreamSynthesizer::synthesize()`] call.
    #[inline]
    #[must_use]
    pub fn new(settings: Rc<RefCell<Settings>>) -> Self {
        Self(settings)
    }

    /// Synthesizes a [`StreamHandle`] for the provided [`StreamRequest`]
    /// using the current [`MockType`].
    ///
    /// Only [`MockType::Canvas`] streams have a stop capability.
    ///
    /// # Errors
    ///
    /// With [`SynthesisError`] if the platform fails to create, paint or
    /// capture the stream source, or the custom generator fails.
    pub async fn synthesize(
        &self,
        request: &StreamRequest,
    ) -> Result<StreamHandle, Traced<SynthesisError>> {
        let (mock_type, media_url) = {
            let settings = self.0.borrow();
            (settings.mock_type.clone(), settings.media_url.clone())
        };

        match mock_type {
            MockType::Canvas => canvas::synthesize(request.constraints()),
            MockType::MediaElement => media_element::synthesize(&media_url),
            MockType::Custom(handler) => custom(&handler, request).await,
        }
    }
}

/// Returns whatever the `handler` produces for the `request`, awaiting it if
/// it's a promise.
async fn custom(
    handler: &CustomHandler,
    request: &StreamRequest,
) -> Result<StreamHandle, Traced<SynthesisError>> {
    let stream = handler(&request.to_js())
        .map_err(platform::error::from)
        .map_err(SynthesisError::CustomHandlerFailed)
        .map_err(tracerr::wrap!())?;
    let stream = JsFuture::from(Promise::resolve(&stream))
        .await
        .map_err(platform::error::from)
        .map_err(SynthesisError::CustomHandlerFailed)
        .map_err(tracerr::wrap!())?;

    Ok(StreamHandle::new(stream.unchecked_into()))
}

/// Creates a detached DOM element with the provided `tag`.
fn create_element<T: JsCast>(
    tag: &'static str,
) -> Result<T, Traced<SynthesisError>> {
    document()
        .create_element(tag)
        .map(JsCast::unchecked_into)
        .map_err(platform::error::from)
        .map_err(|e| {
            tracerr::new!(SynthesisError::CreateElementFailed(tag, e))
        })
}
