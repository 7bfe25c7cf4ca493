//! Interception of the `navigator` media acquisition entry points.

use std::{convert::TryFrom as _, fmt::Display, rc::Rc};

use derive_more::{Display, From};
use js_sys::{Object, Promise, Reflect};
use tracerr::Traced;
use wasm_bindgen::{closure::Closure, JsCast as _, JsValue};
use wasm_bindgen_futures::future_to_promise;

use crate::{
    media::{MalformedRequest, StreamRequest},
    platform::{self, media_devices::EntryPoints, MediaDevices},
    utils::{self, Function, JsCaused, JsonParseError, MockError},
};

/// Errors that may occur when intercepting the `navigator`.
#[derive(Clone, Debug, Display, From, PartialEq)]
pub enum InterceptionError {
    /// Occurs when entry points are installed before the originals were
    /// captured.
    #[display(fmt = "Original entry points are not captured")]
    #[from(ignore)]
    NotCaptured,

    /// Occurs when an entry point cannot be replaced.
    #[display(fmt = "Failed to replace {}: {}", _0, _1)]
    #[from(ignore)]
    ReplaceFailed(String, platform::Error),

    /// Occurs when an intercepted call receives a request which cannot be
    /// read.
    #[display(fmt = "{}", _0)]
    MalformedRequest(MalformedRequest),

    /// Occurs when a result of an intercepted call cannot be converted into
    /// a JS value.
    #[display(fmt = "Failed to serialize result: {}", _0)]
    SerializationFailed(JsonParseError),
}

impl JsCaused for InterceptionError {
    fn name(&self) -> &'static str {
        match self {
            Self::NotCaptured => "NotCaptured",
            Self::ReplaceFailed(..) => "ReplaceFailed",
            Self::MalformedRequest(_) => "MalformedRequest",
            Self::SerializationFailed(_) => "SerializationFailed",
        }
    }

    fn js_cause(self) -> Option<platform::Error> {
        match self {
            Self::ReplaceFailed(_, err)
            | Self::MalformedRequest(MalformedRequest(err)) => Some(err),
            Self::NotCaptured | Self::SerializationFailed(_) => None,
        }
    }
}

/// Media acquisition entry point which can be intercepted.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum EntryPoint {
    /// `navigator.getUserMedia`.
    #[display(fmt = "navigator.getUserMedia")]
    LegacyGetUserMedia,

    /// `navigator.mediaDevices.getUserMedia`.
    #[display(fmt = "navigator.mediaDevices.getUserMedia")]
    GetUserMedia,

    /// `navigator.mediaDevices.getSupportedConstraints`.
    #[display(fmt = "navigator.mediaDevices.getSupportedConstraints")]
    GetSupportedConstraints,

    /// `navigator.mediaDevices.enumerateDevices`.
    #[display(fmt = "navigator.mediaDevices.enumerateDevices")]
    EnumerateDevices,
}

impl EntryPoint {
    /// All the [`EntryPoint`]s.
    pub const ALL: [Self; 4] = [
        Self::LegacyGetUserMedia,
        Self::GetUserMedia,
        Self::GetSupportedConstraints,
        Self::EnumerateDevices,
    ];

    /// Returns name of the property this [`EntryPoint`] is stored under.
    #[must_use]
    pub fn property(self) -> &'static str {
        match self {
            Self::LegacyGetUserMedia | Self::GetUserMedia => "getUserMedia",
            Self::GetSupportedConstraints => "getSupportedConstraints",
            Self::EnumerateDevices => "enumerateDevices",
        }
    }

    /// Returns the object owning this [`EntryPoint`] and its current value
    /// among the provided [`EntryPoints`].
    fn locate(self, entry_points: &EntryPoints) -> (&JsValue, &JsValue) {
        match self {
            Self::LegacyGetUserMedia => (
                &entry_points.navigator,
                &entry_points.legacy_get_user_media,
            ),
            Self::GetUserMedia => {
                (&entry_points.media_devices, &entry_points.get_user_media)
            }
            Self::GetSupportedConstraints => (
                &entry_points.media_devices,
                &entry_points.get_supported_constraints,
            ),
            Self::EnumerateDevices => (
                &entry_points.media_devices,
                &entry_points.enumerate_devices,
            ),
        }
    }
}

/// Selection of the [`EntryPoint`]s to intercept.
///
/// Selects everything by default.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MockOptions {
    /// Whether `navigator.getUserMedia` is selected.
    pub legacy_get_user_media: bool,

    /// Whether `navigator.mediaDevices.getUserMedia` is selected.
    pub get_user_media: bool,

    /// Whether `navigator.mediaDevices.getSupportedConstraints` is selected.
    pub get_supported_constraints: bool,

    /// Whether `navigator.mediaDevices.enumerateDevices` is selected.
    pub enumerate_devices: bool,
}

impl MockOptions {
    /// Selects nothing.
    #[must_use]
    pub fn none() -> Self {
        Self {
            legacy_get_user_media: false,
            get_user_media: false,
            get_supported_constraints: false,
            enumerate_devices: false,
        }
    }

    /// Selects both `getUserMedia` entry points only.
    #[must_use]
    pub fn get_user_media_only() -> Self {
        Self {
            legacy_get_user_media: true,
            get_user_media: true,
            ..Self::none()
        }
    }

    /// Indicates whether the provided [`EntryPoint`] is selected.
    #[must_use]
    pub fn selects(&self, entry_point: EntryPoint) -> bool {
        match entry_point {
            EntryPoint::LegacyGetUserMedia => self.legacy_get_user_media,
            EntryPoint::GetUserMedia => self.get_user_media,
            EntryPoint::GetSupportedConstraints => {
                self.get_supported_constraints
            }
            EntryPoint::EnumerateDevices => self.enumerate_devices,
        }
    }
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            legacy_get_user_media: true,
            get_user_media: true,
            get_supported_constraints: true,
            enumerate_devices: true,
        }
    }
}

/// Entry points as they were before the interception.
#[derive(Debug)]
struct Originals {
    /// Captured entry points.
    entry_points: EntryPoints,

    /// [`EntryPoint`]s that were own properties of their objects rather
    /// than inherited from a prototype.
    own: Vec<EntryPoint>,

    /// Whether `navigator.mediaDevices` is a stand-in object created on
    /// capture.
    stand_in: bool,
}

/// [`EntryPoint`] replacement installed into the `navigator`.
struct Installed {
    /// Replaced [`EntryPoint`].
    entry_point: EntryPoint,

    /// JS function the [`EntryPoint`] is replaced with.
    ///
    /// Released once the [`EntryPoint`] is restored or replaced again.
    _closure: Box<dyn AsRef<JsValue>>,
}

/// Owner of the original `navigator` entry points and their installed
/// replacements.
#[derive(Default)]
pub struct InterceptionManager {
    /// Captured originals, if any.
    originals: Option<Originals>,

    /// Currently installed replacements.
    installed: Vec<Installed>,
}

impl InterceptionManager {
    /// Creates a new [`InterceptionManager`] which hasn't captured anything.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indicates whether the original entry points are captured.
    #[inline]
    #[must_use]
    pub fn is_prepared(&self) -> bool {
        self.originals.is_some()
    }

    /// Returns the captured original [`EntryPoints`], if any.
    #[inline]
    #[must_use]
    pub fn originals(&self) -> Option<&EntryPoints> {
        self.originals.as_ref().map(|o| &o.entry_points)
    }

    /// Captures the current `navigator` entry points as the originals.
    ///
    /// Does nothing if they are captured already. Creates an empty
    /// `navigator.mediaDevices` if there is none.
    ///
    /// # Errors
    ///
    /// With [`InterceptionError::ReplaceFailed`] if a missing
    /// `navigator.mediaDevices` cannot be created.
    pub fn capture_originals(
        &mut self,
    ) -> Result<(), Traced<InterceptionError>> {
        if self.is_prepared() {
            return Ok(());
        }

        let mut entry_points = EntryPoints::current();
        let stand_in = !entry_points.media_devices.is_object();
        if stand_in {
            let media_devices = JsValue::from(Object::new());
            set(&entry_points.navigator, "mediaDevices", &media_devices)
                .map_err(|e| {
                    tracerr::new!(InterceptionError::ReplaceFailed(
                        "navigator.mediaDevices".into(),
                        e,
                    ))
                })?;
            entry_points.media_devices = media_devices;
        }

        let own = EntryPoint::ALL
            .iter()
            .copied()
            .filter(|ep| {
                let (owner, _) = ep.locate(&entry_points);
                owner.dyn_ref::<Object>().map_or(false, |owner| {
                    owner.has_own_property(&ep.property().into())
                })
            })
            .collect();

        log::debug!(
            "Captured original entry points (stand-in mediaDevices: {})",
            stand_in,
        );
        self.originals = Some(Originals {
            entry_points,
            own,
            stand_in,
        });
        Ok(())
    }

    /// Replaces the [`EntryPoint`]s selected by the provided [`MockOptions`]
    /// with functions delegating to the provided `target`.
    ///
    /// Unselected [`EntryPoint`]s are left as they are.
    ///
    /// # Errors
    ///
    /// With [`InterceptionError::NotCaptured`] if the originals aren't
    /// captured yet.
    ///
    /// With [`InterceptionError::ReplaceFailed`] if an [`EntryPoint`] cannot
    /// be replaced. [`EntryPoint`]s replaced before stay replaced.
    pub fn install(
        &mut self,
        selection: MockOptions,
        target: &Rc<dyn MediaDevices>,
    ) -> Result<(), Traced<InterceptionError>> {
        let originals = self
            .originals
            .as_ref()
            .ok_or_else(|| tracerr::new!(InterceptionError::NotCaptured))?;
        let entry_points = originals.entry_points.clone();

        for entry_point in EntryPoint::ALL.iter().copied() {
            if !selection.selects(entry_point) {
                continue;
            }
            let closure = replacement(entry_point, Rc::clone(target));
            let (owner, _) = entry_point.locate(&entry_points);
            set(owner, entry_point.property(), (*closure).as_ref()).map_err(
                |e| {
                    tracerr::new!(InterceptionError::ReplaceFailed(
                        entry_point.to_string(),
                        e,
                    ))
                },
            )?;

            self.installed.retain(|i| i.entry_point != entry_point);
            self.installed.push(Installed {
                entry_point,
                _closure: closure,
            });
            log::debug!("Installed {}", entry_point);
        }
        Ok(())
    }

    /// Puts the captured originals back and releases the installed
    /// replacements.
    ///
    /// Does nothing if nothing is captured.
    pub fn restore(&mut self) {
        let originals = match self.originals.take() {
            Some(originals) => originals,
            None => return,
        };
        let entry_points = &originals.entry_points;

        for entry_point in EntryPoint::ALL.iter().copied() {
            let (owner, original) = entry_point.locate(entry_points);
            let property = entry_point.property();
            let restored = if originals.own.contains(&entry_point) {
                set(owner, property, original)
            } else {
                delete(owner, property)
            };
            if let Err(e) = restored {
                log::error!("Failed to restore {}: {}", entry_point, e);
            }
        }
        if originals.stand_in {
            if let Err(e) = delete(&entry_points.navigator, "mediaDevices") {
                log::error!("Failed to remove stand-in mediaDevices: {}", e);
            }
        }

        self.installed.clear();
        log::debug!("Restored original entry points");
    }
}

/// Sets the `property` of the `target` object.
///
/// Fails if the `property` is read-only.
fn set(
    target: &JsValue,
    property: &str,
    value: &JsValue,
) -> Result<(), platform::Error> {
    Reflect::set(target, &property.into(), value)
        .map_err(platform::error::from)
        .and_then(|done| refused(done, "assign to read only", property))
}

/// Deletes the own `property` of the `target` object.
///
/// Fails if the `property` is non-configurable.
fn delete(target: &JsValue, property: &str) -> Result<(), platform::Error> {
    target
        .dyn_ref::<Object>()
        .map_or(Ok(true), |target| {
            Reflect::delete_property(target, &property.into())
        })
        .map_err(platform::error::from)
        .and_then(|done| refused(done, "delete non-configurable", property))
}

/// Turns a `false` outcome of a [`Reflect`] operation into a `TypeError`
/// like the one strict mode code would throw.
fn refused(
    done: bool,
    action: &str,
    property: &str,
) -> Result<(), platform::Error> {
    if done {
        Ok(())
    } else {
        Err(platform::Error {
            name: "TypeError".into(),
            message: format!("Cannot {} property '{}'", action, property)
                .into(),
            sys_cause: None,
        })
    }
}

/// Converts the provided error into a value a replacement entry point
/// rejects with.
fn into_js_error<E: JsCaused + Display>(err: Traced<E>) -> JsValue {
    MockError::from(err).into_js_error().into()
}

/// Parses the JS request received by a replacement entry point.
fn parse_request(
    request: JsValue,
) -> Result<StreamRequest, Traced<InterceptionError>> {
    StreamRequest::try_from(request)
        .map_err(InterceptionError::from)
        .map_err(tracerr::wrap!())
}

/// Creates a JS function replacing the provided [`EntryPoint`] and
/// delegating to the `target`.
fn replacement(
    entry_point: EntryPoint,
    target: Rc<dyn MediaDevices>,
) -> Box<dyn AsRef<JsValue>> {
    match entry_point {
        EntryPoint::LegacyGetUserMedia => Box::new(Closure::wrap(Box::new(
            move |request: JsValue, on_success: JsValue, on_error: JsValue| {
                let target = Rc::clone(&target);
                let on_success = Function::<JsValue>::from(on_success);
                let on_error = Function::<JsValue>::from(on_error);
                platform::spawn(async move {
                    let stream = match parse_request(request) {
                        Ok(request) => target
                            .legacy_get_user_media(request)
                            .await
                            .map_err(into_js_error),
                        Err(e) => Err(into_js_error(e)),
                    };
                    let _ = match stream {
                        Ok(stream) => on_success.call1(stream.into()),
                        Err(e) => on_error.call1(e),
                    };
                });
            },
        )
            as Box<dyn Fn(JsValue, JsValue, JsValue)>)),
        EntryPoint::GetUserMedia => Box::new(Closure::wrap(Box::new(
            move |request: JsValue| {
                let target = Rc::clone(&target);
                future_to_promise(async move {
                    let request =
                        parse_request(request).map_err(into_js_error)?;
                    target
                        .get_user_media(request)
                        .await
                        .map(JsValue::from)
                        .map_err(into_js_error)
                })
            },
        )
            as Box<dyn Fn(JsValue) -> Promise>)),
        EntryPoint::GetSupportedConstraints => Box::new(Closure::wrap(
            Box::new(move || {
                target
                    .get_supported_constraints()
                    .map_err(into_js_error)
                    .and_then(|constraints| {
                        utils::to_js(&constraints)
                            .map_err(InterceptionError::from)
                            .map_err(tracerr::wrap!())
                            .map_err(into_js_error)
                    })
            }) as Box<dyn Fn() -> Result<JsValue, JsValue>>,
        )),
        EntryPoint::EnumerateDevices => Box::new(Closure::wrap(Box::new(
            move || {
                let target = Rc::clone(&target);
                future_to_promise(async move {
                    let devices = target
                        .enumerate_devices()
                        .await
                        .map_err(into_js_error)?;
                    utils::to_js(&devices)
                        .map_err(InterceptionError::from)
                        .map_err(tracerr::wrap!())
                        .map_err(into_js_error)
                })
            },
        )
            as Box<dyn Fn() -> Promise>)),
    }
}
