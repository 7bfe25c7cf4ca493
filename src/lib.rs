//! Synthetic [getUserMedia()][1] and [enumerateDevices()][2] for browser
//! tests.
//!
//! Replaces the `navigator` media acquisition entry points with ones
//! producing fake streams (a canvas painted with random rectangles, a looped
//! video file or whatever a custom function returns) and fake devices, and
//! restores the originals back on demand.
//!
//! # Features
//!
//! - `console_error_panic_hook`: Forwards panics to `console.error()`.
//! - `wee_alloc`: Uses [`wee_alloc`] as the global allocator.
//! - `mockable`: Exposes `platform::MockMediaDevices`.
//!
//! [1]: https://w3.org/TR/mediacapture-streams#dom-mediadevices-getusermedia
//! [2]: https://tinyurl.com/w3-streams#dom-mediadevices-enumeratedevices
//! [`wee_alloc`]: https://docs.rs/wee_alloc

#![allow(clippy::module_name_repetitions)]
#![forbid(non_ascii_idents)]

pub mod api;
pub mod media;
pub mod mock;
pub mod platform;
pub mod synth;
pub mod utils;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[doc(inline)]
pub use self::api::{MockError, MockOptions, UserMediaMock};
