//! Browser platform functionality: logging, task spawning, the
//! [`MediaDevices`] capability interface and the `navigator` interception.

pub mod error;
pub mod interception;
pub mod media_devices;

use std::{future::Future, sync::Once};

#[doc(inline)]
pub use self::{
    error::Error,
    interception::{
        EntryPoint, InterceptionError, InterceptionManager, MockOptions,
    },
    media_devices::{
        EntryPoints, MediaDevices, MediaDevicesError, NavigatorMediaDevices,
    },
};

#[cfg(any(test, feature = "mockable"))]
#[doc(inline)]
pub use self::media_devices::MockMediaDevices;

/// Sets Rust's panic hook providing backtrace of the occurred panic to
/// JavaScript's `console.error()`.
///
/// When the `console_error_panic_hook` feature is disabled this is a no-op.
pub fn set_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Initializes [`wasm_logger`] as default application logger.
///
/// Only the first call has any effect.
///
/// [`wasm_logger`]: https://docs.rs/wasm-logger
pub fn init_logger() {
    static LOGGER: Once = Once::new();
    LOGGER.call_once(|| {
        wasm_logger::init(wasm_logger::Config::default());
    });
}

/// Runs a Rust [`Future`] on the current thread.
#[inline]
pub fn spawn<F>(task: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(task);
}
