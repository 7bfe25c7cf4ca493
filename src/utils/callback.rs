//! Somewhat convenient wrapper around JS functions used as callbacks.

use std::marker::PhantomData;

use wasm_bindgen::JsValue;

/// Wrapper for a single argument JS function.
///
/// Non-function values are accepted and silently ignored on call, the same
/// way a browser ignores a missing `getUserMedia()` callback.
#[derive(Clone, Debug)]
pub struct Function<T> {
    inner: Option<js_sys::Function>,
    _arg: PhantomData<T>,
}

impl<T: Into<JsValue>> Function<T> {
    /// Invokes the wrapped JS function with the provided `arg`.
    ///
    /// Returns `false` if there is no function to call or it has thrown.
    pub fn call1(&self, arg: T) -> bool {
        self.inner.as_ref().map_or(false, |f| {
            f.call1(&JsValue::NULL, &arg.into()).is_ok()
        })
    }
}

impl<T> From<js_sys::Function> for Function<T> {
    fn from(func: js_sys::Function) -> Self {
        Self {
            inner: Some(func),
            _arg: PhantomData,
        }
    }
}

impl<T> From<JsValue> for Function<T> {
    fn from(val: JsValue) -> Self {
        use wasm_bindgen::JsCast as _;

        Self {
            inner: val.dyn_into::<js_sys::Function>().ok(),
            _arg: PhantomData,
        }
    }
}
