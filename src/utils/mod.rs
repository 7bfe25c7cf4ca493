//! Miscellaneous utility structs and functions.

mod callback;
mod errors;

use js_sys::Reflect;
use serde::{de::DeserializeOwned, Serialize};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

#[doc(inline)]
pub use self::{
    callback::Function,
    errors::{JsCaused, JsonParseError, MockError},
};

/// Returns [`Window`] object.
///
/// # Panics
///
/// When global [`Window`] object is inaccessible.
pub fn window() -> Window {
    // Cannot use `lazy_static` since `window` is `!Sync`.
    // Safe to unwrap.
    web_sys::window().unwrap()
}

/// Returns [`Document`] of the current [`Window`].
///
/// # Panics
///
/// When the current [`Window`] has no [`Document`] (e.g. in a worker).
pub fn document() -> Document {
    window().document().unwrap()
}

/// Wrapper around interval timer ID.
#[derive(Debug)]
pub struct IntervalHandle(pub i32);

impl Drop for IntervalHandle {
    /// Clears interval with provided ID.
    fn drop(&mut self) {
        window().clear_interval_with_handle(self.0);
    }
}

/// Returns property of JS object by name if its defined.
/// Converts the value with a given predicate.
pub fn get_property_by_name<T, F, U>(
    value: &T,
    name: &str,
    into: F,
) -> Option<U>
where
    T: AsRef<wasm_bindgen::JsValue>,
    F: Fn(wasm_bindgen::JsValue) -> Option<U>,
{
    Reflect::get(value.as_ref(), &JsValue::from_str(name))
        .ok()
        .map_or_else(|| None, into)
}

/// Deserializes the provided JS value from its JSON representation.
///
/// `undefined` (and anything else `JSON.stringify()` can't represent) is
/// deserialized as JSON `null`.
///
/// # Errors
///
/// If the JSON representation doesn't match `T`.
#[inline]
pub fn from_js<T: DeserializeOwned>(
    value: &JsValue,
) -> Result<T, JsonParseError> {
    Ok(value.into_serde()?)
}

/// Serializes the provided value into a plain JS object.
///
/// # Errors
///
/// If `value` fails to serialize.
#[inline]
pub fn to_js<T: Serialize + ?Sized>(
    value: &T,
) -> Result<JsValue, JsonParseError> {
    Ok(JsValue::from_serde(value)?)
}
