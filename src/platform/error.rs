//! More convenient wrapper for [`js_sys::Error`].

use std::borrow::Cow;

use derive_more::Display;
use wasm_bindgen::{JsCast, JsValue};

/// Wrapper for JS value which returned from JS side as error.
#[derive(Clone, Debug, Display, PartialEq)]
#[display(fmt = "{}: {}", name, message)]
pub struct Error {
    /// Name of JS error.
    pub name: Cow<'static, str>,

    /// Message of JS error.
    pub message: Cow<'static, str>,

    /// Original JS error.
    pub sys_cause: Option<js_sys::Error>,
}

impl From<JsValue> for Error {
    fn from(val: JsValue) -> Self {
        match val.dyn_into::<js_sys::Error>() {
            Ok(err) => Self {
                name: Cow::Owned(err.name().into()),
                message: Cow::Owned(err.message().into()),
                sys_cause: Some(err),
            },
            Err(val) => match val.as_string() {
                Some(reason) => Self {
                    name: "Unknown JS error".into(),
                    message: reason.into(),
                    sys_cause: None,
                },
                None => Self {
                    name: "Unknown JS error".into(),
                    message: format!("{:?}", val).into(),
                    sys_cause: None,
                },
            },
        }
    }
}

impl From<Error> for js_sys::Error {
    fn from(err: Error) -> Self {
        let Error {
            name,
            message,
            sys_cause,
        } = err;
        sys_cause.unwrap_or_else(|| {
            let error = Self::new(&message);
            error.set_name(&name);
            error
        })
    }
}

impl From<Error> for JsValue {
    #[inline]
    fn from(err: Error) -> Self {
        js_sys::Error::from(err).into()
    }
}

/// Converts the provided JS value into an [`Error`].
///
/// Meant to be used in `.map_err(platform::error::from)` chains.
#[inline]
#[must_use]
pub fn from(val: JsValue) -> Error {
    Error::from(val)
}
