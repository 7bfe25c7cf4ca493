use std::fmt::Display;

use derive_more::From;
use tracerr::Traced;
use wasm_bindgen::prelude::*;

use crate::utils::{self, JsCaused};

/// Representation of app error exported to JS side.
///
/// Contains JS side error if it the cause and trace information.
#[wasm_bindgen]
#[derive(From)]
pub struct MockError(utils::MockError);

#[wasm_bindgen]
impl MockError {
    /// Returns name of error.
    pub fn name(&self) -> String {
        self.0.name().to_owned()
    }

    /// Returns message of errors.
    pub fn message(&self) -> String {
        self.0.message()
    }

    /// Returns trace information of error.
    pub fn trace(&self) -> String {
        self.0.trace()
    }

    /// Returns JS side error if it the cause.
    pub fn source(&self) -> Option<js_sys::Error> {
        self.0.source().and_then(|e| e.sys_cause)
    }
}

impl<E: JsCaused + Display> From<Traced<E>> for MockError {
    #[inline]
    fn from(traced: Traced<E>) -> Self {
        Self(utils::MockError::from(traced))
    }
}
