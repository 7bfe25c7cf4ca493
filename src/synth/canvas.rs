//! Streams captured from a canvas painted with random rectangles.

use tracerr::Traced;
use wasm_bindgen::{closure::Closure, JsCast as _, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::{
    media::{
        constraints::{self, DEFAULT_FRAME_RATE},
        ConstraintValue, MediaKind, StopHandle, StreamHandle,
    },
    platform,
    utils::{window, IntervalHandle},
};

use super::{create_element, SynthesisError};

/// Number of canvas repaints per second.
pub const TICKS_PER_SECOND: i32 = 2;

/// Delay between two canvas repaints.
pub const PAINT_INTERVAL_MS: i32 = 1000 / TICKS_PER_SECOND;

/// Synthesizes a [`StreamHandle`] capturing a freshly created canvas sized
/// and framed by the provided `request` constraints.
///
/// The returned [`StreamHandle`] has a stop capability, which cancels the
/// painting and stops all the tracks.
pub fn synthesize(
    request: &ConstraintValue,
) -> Result<StreamHandle, Traced<SynthesisError>> {
    let video = |capability| {
        constraints::resolve_number(request, MediaKind::Video, capability)
    };

    let canvas: HtmlCanvasElement = create_element("canvas")?;
    canvas.set_width(dimension(video("width")));
    canvas.set_height(dimension(video("height")));

    let painter = Painter::start(canvas.clone())?;
    log::debug!(
        "mock canvas meta: {}x{}, interval {}",
        canvas.width(),
        canvas.height(),
        painter.interval.0,
    );

    let frame_rate = video("frameRate")
        .unwrap_or_else(|| f64::from(DEFAULT_FRAME_RATE));
    let stream = canvas
        .capture_stream_with_frame_request_rate(frame_rate)
        .map_err(platform::error::from)
        .map_err(SynthesisError::CaptureStreamFailed)
        .map_err(tracerr::wrap!())?;

    let stop = {
        let stream = stream.clone();
        StopHandle::new(move || {
            drop(painter);
            StreamHandle::stop_tracks(&stream);
        })
    };
    Ok(StreamHandle::with_stop(stream, stop))
}

/// Converts a resolved canvas dimension into a valid `width`/`height`.
///
/// Values with no finite numeric representation become `0`, as the canvas
/// attribute setters do with them.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn dimension(value: Option<f64>) -> u32 {
    value
        .filter(|v| v.is_finite())
        .map_or(0, |v| v.max(0.0).min(f64::from(u32::MAX)) as u32)
}

/// Periodic painting of random rectangles on a canvas.
///
/// Painting stops once the [`Painter`] is dropped.
struct Painter {
    /// Handle of the scheduled painting, cleared on drop.
    interval: IntervalHandle,

    /// Painting callback called by the [`Painter::interval`].
    ///
    /// Must outlive the [`Painter::interval`], so declared after it.
    _tick: Closure<dyn FnMut()>,
}

impl Painter {
    /// Paints the `canvas` once and schedules painting it
    /// [`TICKS_PER_SECOND`] times a second.
    fn start(
        canvas: HtmlCanvasElement,
    ) -> Result<Self, Traced<SynthesisError>> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or_else(|| tracerr::new!(SynthesisError::NoCanvasContext))?;

        // Firefox refuses to capture a canvas that was never painted.
        paint_random_rect(&canvas, &ctx);

        let tick = Closure::wrap(Box::new(move || {
            paint_random_rect(&canvas, &ctx);
        }) as Box<dyn FnMut()>);
        let interval = window()
            .set_interval_with_callback_and_timeout_and_arguments_0(
                tick.as_ref().unchecked_ref(),
                PAINT_INTERVAL_MS,
            )
            .map_err(platform::error::from)
            .map_err(SynthesisError::StartPaintingFailed)
            .map_err(tracerr::wrap!())?;

        Ok(Self {
            interval: IntervalHandle(interval),
            _tick: tick,
        })
    }
}

/// Paints a rectangle of random size and color at the origin of the
/// `canvas`.
fn paint_random_rect(
    canvas: &HtmlCanvasElement,
    ctx: &CanvasRenderingContext2d,
) {
    let width = random(canvas.width());
    let height = random(canvas.height());
    let (r, g, b) = (random(255), random(255), random(255));
    let color = format!("rgb({},{},{})", r, g, b);

    ctx.set_fill_style(&JsValue::from_str(&color));
    ctx.fill_rect(0.0, 0.0, width, height);
}

/// Returns a random integer in `[0, max)`.
fn random(max: u32) -> f64 {
    (js_sys::Math::random() * f64::from(max)).floor()
}
