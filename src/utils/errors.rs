use std::{
    fmt::{Debug, Display},
    rc::Rc,
};

use derive_more::{Display, From};
use tracerr::{Trace, Traced};

use crate::platform;

/// Representation of an error which can be caused by an error returned from
/// the JS side.
pub trait JsCaused {
    /// Returns name of this error.
    fn name(&self) -> &'static str;

    /// Returns JS error if it is the cause.
    fn js_cause(self) -> Option<platform::Error>;
}

/// Application error passed to the JS side.
///
/// Contains JS side error if it is the cause and trace information.
#[derive(Clone, Debug, Display)]
#[display(fmt = "{}: {}\n{}", name, message, trace)]
pub struct MockError {
    name: &'static str,
    message: String,
    trace: Trace,
    source: Option<platform::Error>,
}

impl MockError {
    /// Prints error information to `console.error()`.
    pub fn print(&self) {
        log::error!("{}", self);
    }

    /// Returns name of this error.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns message of this error.
    #[inline]
    #[must_use]
    pub fn message(&self) -> String {
        self.message.clone()
    }

    /// Returns trace information of this error.
    #[inline]
    #[must_use]
    pub fn trace(&self) -> String {
        self.trace.to_string()
    }

    /// Returns JS side error if it is the cause.
    #[inline]
    #[must_use]
    pub fn source(&self) -> Option<platform::Error> {
        Clone::clone(&self.source)
    }

    /// Converts this [`MockError`] into a JS error.
    ///
    /// The JS side error is returned as is if it is the cause.
    #[must_use]
    pub fn into_js_error(self) -> js_sys::Error {
        match self.source {
            Some(source) => source.into(),
            None => {
                let error = js_sys::Error::new(&self.message);
                error.set_name(self.name);
                error
            }
        }
    }
}

impl<E: JsCaused + Display> From<(E, Trace)> for MockError {
    fn from((err, trace): (E, Trace)) -> Self {
        Self {
            name: err.name(),
            message: err.to_string(),
            trace,
            source: err.js_cause(),
        }
    }
}

impl<E: JsCaused + Display> From<Traced<E>> for MockError {
    #[inline]
    fn from(traced: Traced<E>) -> Self {
        Self::from(traced.into_parts())
    }
}

/// Wrapper for [`serde_json::error::Error`] that provides [`Clone`],
/// [`Debug`], [`Display`] implementations.
#[derive(Clone, Debug, Display, From)]
#[from(forward)]
pub struct JsonParseError(Rc<serde_json::error::Error>);

impl PartialEq for JsonParseError {
    fn eq(&self, other: &Self) -> bool {
        self.0.line() == other.0.line()
            && self.0.column() == other.0.column()
            && self.0.classify() == other.0.classify()
    }
}

impl JsCaused for JsonParseError {
    fn name(&self) -> &'static str {
        "JsonParseError"
    }

    fn js_cause(self) -> Option<platform::Error> {
        None
    }
}
