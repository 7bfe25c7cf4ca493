//! Handles to acquired [MediaStream][1]s.
//!
//! [1]: https://w3.org/TR/mediacapture-streams/#mediastream

use std::{cell::RefCell, fmt, rc::Rc};

use derive_more::AsRef;
use js_sys::Reflect;
use wasm_bindgen::{closure::Closure, JsCast as _, JsValue};

/// Name of the property the [`StopHandle`] is exposed under on the JS
/// stream object.
const STOP_PROPERTY: &str = "stop";

/// Releases resources of a synthesized stream.
///
/// Whatever keeps the stream alive (timers, closures) is owned by the
/// [`StopHandle`] and is dropped on the first [`StopHandle::stop()`] call.
#[derive(Clone)]
pub struct StopHandle(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl StopHandle {
    /// Creates a new [`StopHandle`] running the provided `release` function
    /// once stopped.
    #[must_use]
    pub fn new<F: FnOnce() + 'static>(release: F) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(release)))))
    }

    /// Runs the release function if it hasn't been run yet.
    ///
    /// Returns `false` if this [`StopHandle`] has already been stopped.
    pub fn stop(&self) -> bool {
        // Take it first, so that the release function may call `stop()`.
        let release = self.0.borrow_mut().take();
        release.map_or(false, |release| {
            release();
            true
        })
    }

    /// Indicates whether [`StopHandle::stop()`] has been called already.
    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.borrow().is_none()
    }
}

impl fmt::Debug for StopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StopHandle").field(&self.is_stopped()).finish()
    }
}

/// Acquired [MediaStream][1] with an optional stop capability.
///
/// The owner of a [`StreamHandle`] is responsible for calling
/// [`StreamHandle::stop()`] once the stream isn't needed anymore.
///
/// [1]: https://w3.org/TR/mediacapture-streams/#mediastream
#[derive(AsRef, Clone, Debug)]
pub struct StreamHandle {
    /// Underlying [MediaStream][1].
    ///
    /// [1]: https://w3.org/TR/mediacapture-streams/#mediastream
    #[as_ref]
    stream: web_sys::MediaStream,

    /// Stop capability of a synthesized stream.
    stop: Option<StopHandle>,
}

impl StreamHandle {
    /// Wraps the provided [MediaStream][1] without any stop capability.
    ///
    /// [1]: https://w3.org/TR/mediacapture-streams/#mediastream
    #[inline]
    #[must_use]
    pub fn new(stream: web_sys::MediaStream) -> Self {
        Self { stream, stop: None }
    }

    /// Wraps the provided [MediaStream][1] with the provided [`StopHandle`].
    ///
    /// The [`StopHandle`] is also exposed as a `stop()` method of the JS
    /// stream object, which disappears after it's called (from either side).
    /// A reference to it kept by JS side stays callable and does nothing
    /// once the stream is stopped.
    ///
    /// [1]: https://w3.org/TR/mediacapture-streams/#mediastream
    #[must_use]
    pub fn with_stop(stream: web_sys::MediaStream, stop: StopHandle) -> Self {
        let js_stop = {
            let stop = stop.clone();
            let stream = stream.clone();
            Closure::wrap(Box::new(move || {
                if stop.stop() {
                    clear_stop_property(&stream);
                }
            }) as Box<dyn FnMut()>)
            .into_js_value()
        };
        if let Err(e) =
            Reflect::set(&stream, &JsValue::from_str(STOP_PROPERTY), &js_stop)
        {
            log::error!("Failed to expose `MediaStream.stop()`: {:?}", e);
        }

        Self {
            stream,
            stop: Some(stop),
        }
    }

    /// Returns the underlying [MediaStream][1].
    ///
    /// [1]: https://w3.org/TR/mediacapture-streams/#mediastream
    #[inline]
    #[must_use]
    pub fn stream(&self) -> &web_sys::MediaStream {
        &self.stream
    }

    /// Returns the stop capability of this [`StreamHandle`], if any.
    #[inline]
    #[must_use]
    pub fn stop_handle(&self) -> Option<&StopHandle> {
        self.stop.as_ref()
    }

    /// Stops this stream via its stop capability.
    ///
    /// Returns `false` if there is no stop capability or it has been used
    /// already.
    pub fn stop(&self) -> bool {
        let stopped = self.stop.as_ref().map_or(false, StopHandle::stop);
        if stopped {
            clear_stop_property(&self.stream);
        }
        stopped
    }

    /// Stops all the tracks of the provided [MediaStream][1].
    ///
    /// [1]: https://w3.org/TR/mediacapture-streams/#mediastream
    pub fn stop_tracks(stream: &web_sys::MediaStream) {
        stream
            .get_tracks()
            .iter()
            .filter_map(|t| t.dyn_into::<web_sys::MediaStreamTrack>().ok())
            .for_each(|track| track.stop());
    }
}

impl From<StreamHandle> for web_sys::MediaStream {
    #[inline]
    fn from(handle: StreamHandle) -> Self {
        handle.stream
    }
}

impl From<StreamHandle> for JsValue {
    #[inline]
    fn from(handle: StreamHandle) -> Self {
        handle.stream.into()
    }
}

/// Removes the `stop` property from the JS stream object.
fn clear_stop_property(stream: &web_sys::MediaStream) {
    if let Err(e) =
        Reflect::delete_property(stream, &JsValue::from_str(STOP_PROPERTY))
    {
        log::error!("Failed to remove `MediaStream.stop()`: {:?}", e);
    }
}
