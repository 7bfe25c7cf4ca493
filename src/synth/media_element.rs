//! Streams captured from a looped `<video>` element.

use tracerr::Traced;
use wasm_bindgen::JsCast as _;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlMediaElement, HtmlVideoElement};

use crate::{media::StreamHandle, platform, utils::get_property_by_name};

use super::{create_element, SynthesisError};

/// Names of the [captureStream()][1] method, the standard one first.
///
/// [1]: https://w3.org/TR/mediacapture-fromelement/#dom-htmlmediaelement-capturestream
const CAPTURE_STREAM: &[&str] = &["captureStream", "mozCaptureStream"];

/// Synthesizes a [`StreamHandle`] capturing a detached, looped and
/// autoplaying `<video>` element playing the provided `media_url`.
///
/// The element isn't stopped explicitly: it lives as long as the page keeps
/// the stream.
pub fn synthesize(
    media_url: &str,
) -> Result<StreamHandle, Traced<SynthesisError>> {
    let video: HtmlVideoElement = create_element("video")?;
    video.set_autoplay(true);
    video.set_loop(true);
    log::info!("mediaElement source video: {}", media_url);
    video.set_src(media_url);
    video.load();
    match video.play() {
        Ok(playing) => platform::spawn(async move {
            if let Err(e) = JsFuture::from(playing).await {
                log_play_error(e.into());
            }
        }),
        Err(e) => log_play_error(e.into()),
    }

    capture_stream(&video).map(StreamHandle::new)
}

/// Logs the provided [`platform::Error`] of starting the mock media
/// playback.
fn log_play_error(err: platform::Error) {
    log::error!("Failed to play mock media: {}", err);
}

/// Captures the provided `element` as a [MediaStream][1].
///
/// [1]: https://w3.org/TR/mediacapture-streams/#mediastream
fn capture_stream(
    element: &HtmlMediaElement,
) -> Result<web_sys::MediaStream, Traced<SynthesisError>> {
    let capture = CAPTURE_STREAM
        .iter()
        .find_map(|name| {
            get_property_by_name(element, name, |v| {
                v.dyn_into::<js_sys::Function>().ok()
            })
        })
        .ok_or_else(|| {
            tracerr::new!(SynthesisError::CaptureStreamUnsupported("video"))
        })?;

    capture
        .call0(element)
        .map(|stream| stream.unchecked_into())
        .map_err(platform::error::from)
        .map_err(SynthesisError::CaptureStreamFailed)
        .map_err(tracerr::wrap!())
}
