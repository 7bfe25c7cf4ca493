//! Resolving concrete values out of [MediaStreamConstraints][1].
//!
//! These are values to configure synthetic media with, not actual
//! constraints applied to a track.
//!
//! [1]: https://w3.org/TR/mediacapture-streams/#dom-mediastreamconstraints

use js_sys::{Array, Object, Reflect};
use serde_json::Value;
use wasm_bindgen::{JsCast as _, JsValue};

use crate::platform;

use super::MediaKind;

/// Width of a synthetic video if the request doesn't specify one.
pub const DEFAULT_WIDTH: u32 = 640;

/// Height of a synthetic video if the request doesn't specify one.
pub const DEFAULT_HEIGHT: u32 = 480;

/// Frame rate of a synthetic video if the request doesn't specify one.
pub const DEFAULT_FRAME_RATE: u32 = 15;

/// Nesting of JS objects read by [`ConstraintValue::from_js()`].
///
/// Objects nested deeper are read as empty ones.
const MAX_DEPTH: usize = 5;

/// Value of a constraints request as JS code sees it.
///
/// Unlike JSON, it keeps `undefined` properties and non-finite numbers.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintValue {
    /// `undefined`, or anything that has no other representation.
    Undefined,

    /// `null`.
    Null,

    /// Boolean.
    Bool(bool),

    /// Number, including `NaN` and infinities.
    Number(f64),

    /// String.
    String(String),

    /// Array items.
    List(Vec<ConstraintValue>),

    /// Own enumerable properties of an object, in their enumeration order.
    Dictionary(Vec<(String, ConstraintValue)>),
}

impl ConstraintValue {
    /// Reads the provided JS value along with its own enumerable properties
    /// in the order a `for...in` loop visits them.
    ///
    /// # Errors
    ///
    /// If a property getter throws.
    pub fn from_js(value: &JsValue) -> Result<Self, platform::Error> {
        Self::read(value, 0)
    }

    /// Reads the provided JS value found at the provided nesting `depth`.
    fn read(value: &JsValue, depth: usize) -> Result<Self, platform::Error> {
        if value.is_null() {
            return Ok(Self::Null);
        }
        if let Some(b) = value.as_bool() {
            return Ok(Self::Bool(b));
        }
        if let Some(n) = value.as_f64() {
            return Ok(Self::Number(n));
        }
        if let Some(s) = value.as_string() {
            return Ok(Self::String(s));
        }
        if !value.is_object() && !value.is_function() {
            return Ok(Self::Undefined);
        }

        let mut entries = Vec::new();
        if depth < MAX_DEPTH {
            for key in Object::keys(value.unchecked_ref::<Object>()).iter() {
                let item = Reflect::get(value, &key)
                    .map_err(platform::error::from)?;
                entries.push((
                    key.as_string().unwrap_or_default(),
                    Self::read(&item, depth + 1)?,
                ));
            }
        }
        Ok(if Array::is_array(value) {
            Self::List(entries.into_iter().map(|(_, v)| v).collect())
        } else {
            Self::Dictionary(entries)
        })
    }

    /// Returns value of the `key` property if this is a
    /// [`ConstraintValue::Dictionary`] having it.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        match self {
            Self::Dictionary(entries) => {
                entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    /// Checks whether this value is truthy in the JS sense.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::List(_) | Self::Dictionary(_) => true,
        }
    }

    /// Coerces this value to a number the way a numeric DOM attribute
    /// setter would.
    ///
    /// Returns [`None`] for values that have no numeric representation.
    #[must_use]
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    Some(0.0)
                } else {
                    s.parse().ok()
                }
            }
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Null => Some(0.0),
            Self::Undefined | Self::List(_) | Self::Dictionary(_) => None,
        }
    }
}

impl From<Value> for ConstraintValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Self::String(s),
            Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            Value::Object(map) => Self::Dictionary(
                map.into_iter().map(|(k, v)| (k, Self::from(v))).collect(),
            ),
        }
    }
}

impl From<&ConstraintValue> for Value {
    /// Converts the [`ConstraintValue`] the way `JSON.stringify()` would.
    fn from(value: &ConstraintValue) -> Self {
        match value {
            ConstraintValue::Undefined | ConstraintValue::Null => Self::Null,
            ConstraintValue::Bool(b) => Self::Bool(*b),
            ConstraintValue::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(Self::Null, Self::Number),
            ConstraintValue::String(s) => Self::String(s.clone()),
            ConstraintValue::List(items) => {
                Self::Array(items.iter().map(Self::from).collect())
            }
            ConstraintValue::Dictionary(entries) => Self::Object(
                entries
                    .iter()
                    .filter(|(_, v)| *v != ConstraintValue::Undefined)
                    .map(|(k, v)| (k.clone(), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Resolves the best value of the `capability` constraint for the given
/// [`MediaKind`] of the `request`.
///
/// A scalar constraint is returned as is. For an object constraint its
/// `ideal` value is taken if it has an `ideal` key (even an `undefined`
/// one), otherwise the value of its last enumerated key wins, so
/// `{min: 1, max: 2}` resolves to `2`.
///
/// Falsy `width`, `height` and `frameRate` are replaced with
/// [`DEFAULT_WIDTH`], [`DEFAULT_HEIGHT`] and [`DEFAULT_FRAME_RATE`]. Any other
/// capability is never defaulted, and resolves to [`None`] if it's
/// `undefined`.
#[must_use]
pub fn resolve(
    request: &ConstraintValue,
    kind: MediaKind,
    capability: &str,
) -> Option<ConstraintValue> {
    let value = request
        .get(kind.as_str())
        .and_then(|sub| sub.get(capability))
        .and_then(best_value);

    match default_for(capability) {
        Some(default) if !value.as_ref().map_or(false, |v| v.is_truthy()) => {
            Some(ConstraintValue::Number(f64::from(default)))
        }
        _ => value,
    }
}

/// Resolves the `capability` with [`resolve()`] and coerces it to a number
/// with [`ConstraintValue::to_number()`].
#[must_use]
pub fn resolve_number(
    request: &ConstraintValue,
    kind: MediaKind,
    capability: &str,
) -> Option<f64> {
    resolve(request, kind, capability)
        .as_ref()
        .and_then(ConstraintValue::to_number)
}

/// Picks a single value out of a constraint value.
fn best_value(value: &ConstraintValue) -> Option<ConstraintValue> {
    let best = match value {
        ConstraintValue::Null => None,
        ConstraintValue::Dictionary(entries) => value
            .get("ideal")
            .or_else(|| entries.last().map(|(_, v)| v))
            .cloned(),
        ConstraintValue::List(items) => items.last().cloned(),
        scalar => Some(scalar.clone()),
    };
    best.filter(|v| *v != ConstraintValue::Undefined)
}

/// Returns default value of the `capability` if it has one.
fn default_for(capability: &str) -> Option<u32> {
    match capability {
        "width" => Some(DEFAULT_WIDTH),
        "height" => Some(DEFAULT_HEIGHT),
        "frameRate" => Some(DEFAULT_FRAME_RATE),
        _ => None,
    }
}
