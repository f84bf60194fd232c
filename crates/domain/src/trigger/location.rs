//! Location trigger — fires when the device is inside or outside a
//! circular geofence.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Value, json};

use super::fields::{data_object, decimal, f64_or_zero, i64_or_zero, string_or_empty};
use super::{EvaluationContext, Icon, TriggerVariant};
use crate::form::{Command, Form, Widget};
use crate::geo::{GeoPoint, distance_meters};
use crate::i18n::{Localizer, TextKey};
use crate::parameter::{NumberFormat, Parameter, Select, SelectOption, Text};
use crate::time::{EpochMillis, minutes};

/// Minimum time between two firings of the same trigger. Keeps a device
/// parked right on the boundary from toggling the rule.
pub const DEBOUNCE_WINDOW: EpochMillis = minutes(5);

/// Geofence membership the trigger waits for.
///
/// The numeric codes are the persisted representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationMode {
    /// Produced only by decoding an unrecognized code. Never fires.
    Unset,
    Inside,
    Outside,
}

impl LocationMode {
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Unset => 0,
            Self::Inside => 1,
            Self::Outside => 2,
        }
    }

    /// Decode a persisted numeric code. Anything but `1` or `2` is
    /// [`Unset`](Self::Unset).
    #[must_use]
    pub fn from_code(code: f64) -> Self {
        if (code - 1.0).abs() < f64::EPSILON {
            Self::Inside
        } else if (code - 2.0).abs() < f64::EPSILON {
            Self::Outside
        } else {
            Self::Unset
        }
    }

    /// Display label; `Unset` maps to the generic mode placeholder.
    #[must_use]
    pub const fn label_key(self) -> TextKey {
        match self {
            Self::Inside => TextKey::LocationInside,
            Self::Outside => TextKey::LocationOutside,
            Self::Unset => TextKey::LocationMode,
        }
    }
}

/// The user-selectable modes, shared by every location trigger.
pub static LOCATION_MODES: [SelectOption<LocationMode>; 2] = [
    SelectOption {
        value: LocationMode::Inside,
        label: TextKey::LocationInside,
    },
    SelectOption {
        value: LocationMode::Outside,
        label: TextKey::LocationOutside,
    },
];

/// Map a localized label back to a mode.
///
/// `None` and unrecognized labels fall back to [`LocationMode::Inside`].
/// This differs on purpose from [`LocationMode::from_code`], where garbage
/// becomes `Unset`.
#[must_use]
pub fn label_to_mode(label: Option<&str>, i18n: &dyn Localizer) -> LocationMode {
    match label {
        Some(l) if l == i18n.lookup(TextKey::LocationOutside) => LocationMode::Outside,
        _ => LocationMode::Inside,
    }
}

/// Localized label of a numeric mode code; unknown codes get the
/// non-selectable placeholder.
#[must_use]
pub fn mode_to_label(code: f64, i18n: &dyn Localizer) -> String {
    i18n.lookup(LocationMode::from_code(code).label_key())
}

#[derive(Debug, Clone)]
struct LocationState {
    latitude: Parameter<f64>,
    longitude: Parameter<f64>,
    distance: Parameter<f64>,
    mode: Select<LocationMode>,
    name: Text,
    last_run: EpochMillis,
}

impl Default for LocationState {
    fn default() -> Self {
        Self {
            latitude: Parameter::new(0.0, -90.0, 90.0, 0.000_001, NumberFormat::fixed(6)),
            longitude: Parameter::new(0.0, -180.0, 180.0, 0.000_001, NumberFormat::fixed(6)),
            distance: Parameter::new(200.0, 0.0, 100_000.0, 10.0, NumberFormat::fixed(0)),
            mode: Select::new(&LOCATION_MODES, LocationMode::Inside),
            name: Text::default(),
            last_run: 0,
        }
    }
}

impl LocationState {
    fn center(&self) -> GeoPoint {
        GeoPoint::new(self.latitude.get(), self.longitude.get())
    }
}

/// Geofence trigger.
///
/// Setters return `&Self` so they can be chained.
#[derive(Debug, Default)]
pub struct LocationTrigger {
    state: Mutex<LocationState>,
}

impl LocationTrigger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LocationState> {
        // the state is plain data, a panic elsewhere cannot leave it torn
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.lock().latitude.get()
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.lock().longitude.get()
    }

    /// Geofence radius in meters.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.lock().distance.get()
    }

    #[must_use]
    pub fn mode(&self) -> LocationMode {
        self.lock().mode.get()
    }

    #[must_use]
    pub fn name(&self) -> String {
        self.lock().name.get().to_string()
    }

    #[must_use]
    pub fn center(&self) -> GeoPoint {
        self.lock().center()
    }

    pub fn set_latitude(&self, value: f64) -> &Self {
        self.lock().latitude.set(value);
        self
    }

    pub fn set_longitude(&self, value: f64) -> &Self {
        self.lock().longitude.set(value);
        self
    }

    pub fn set_distance(&self, value: f64) -> &Self {
        self.lock().distance.set(value);
        self
    }

    pub fn set_mode(&self, mode: LocationMode) -> &Self {
        self.lock().mode.set(mode);
        self
    }

    /// Set the mode from a persisted numeric code.
    pub fn set_mode_code(&self, code: f64) -> &Self {
        self.set_mode(LocationMode::from_code(code))
    }

    /// Set the mode from a localized label, as a picker would.
    pub fn set_mode_label(&self, label: Option<&str>, i18n: &dyn Localizer) -> &Self {
        self.set_mode(label_to_mode(label, i18n))
    }

    pub fn set_name(&self, name: impl Into<String>) -> &Self {
        self.lock().name.set(name);
        self
    }

    pub fn set_last_run(&self, last_run: EpochMillis) -> &Self {
        self.lock().last_run = last_run;
        self
    }

    /// Localized label of the current mode.
    #[must_use]
    pub fn mode_label(&self, i18n: &dyn Localizer) -> String {
        i18n.lookup(self.mode().label_key())
    }

    /// Run `f` against the edit form while holding the trigger lock.
    ///
    /// `current` is the last known fix; the "current location" button is
    /// enabled only when it is present. Do not call other methods of this
    /// trigger from inside `f`.
    pub fn edit<R>(&self, current: Option<GeoPoint>, f: impl FnOnce(&mut Form<'_>) -> R) -> R {
        let mut guard = self.lock();
        let state = &mut *guard;
        let mut form = Form::new()
            .heading(TextKey::Location)
            .field(TextKey::NameShort, Widget::Text(&mut state.name))
            .field(TextKey::LatitudeShort, Widget::Decimal(&mut state.latitude))
            .field(TextKey::LongitudeShort, Widget::Decimal(&mut state.longitude))
            .field(TextKey::DistanceShort, Widget::Decimal(&mut state.distance))
            .field(TextKey::LocationMode, Widget::Choice(&mut state.mode))
            .command(
                TextKey::CurrentLocation,
                Command::PopulateFromCurrentPosition,
                current.is_some(),
            );
        f(&mut form)
    }

    /// Execute a form command. Returns `true` if the trigger changed.
    pub fn apply_command(&self, command: Command, position: Option<GeoPoint>) -> bool {
        match command {
            Command::PopulateFromCurrentPosition => {
                let Some(position) = position else {
                    return false;
                };
                let mut state = self.lock();
                state.latitude.set(position.latitude);
                state.longitude.set(position.longitude);
                tracing::debug!(
                    latitude = position.latitude,
                    longitude = position.longitude,
                    "grabbed location"
                );
                true
            }
        }
    }
}

impl TriggerVariant for LocationTrigger {
    const DISCRIMINATOR: &'static str =
        "info.nightscout.androidaps.plugins.general.automation.triggers.TriggerLocation";

    fn should_run(&self, ctx: &EvaluationContext) -> bool {
        let state = self.lock();

        let Some(position) = ctx.position else {
            return false;
        };

        if ctx.now.saturating_sub(state.last_run) < DEBOUNCE_WINDOW {
            return false;
        }

        let radius = state.distance.get();
        let distance = distance_meters(&state.center(), &position);
        // equality is "not yet satisfied" in both modes
        let ready = match state.mode.get() {
            LocationMode::Inside => distance < radius,
            LocationMode::Outside => distance > radius,
            LocationMode::Unset => false,
        };

        if ready {
            tracing::debug!(
                name = state.name.get(),
                mode = ?state.mode.get(),
                distance,
                radius,
                "ready for execution"
            );
        }
        ready
    }

    fn encode_data(&self) -> Value {
        let state = self.lock();
        json!({
            "latitude": decimal(state.latitude.get()),
            "longitude": decimal(state.longitude.get()),
            "distance": decimal(state.distance.get()),
            "name": state.name.get(),
            "mode": state.mode.get().code(),
            "lastRun": state.last_run,
        })
    }

    fn hydrate(&self, data: &Value) -> &Self {
        let data = match data_object(data) {
            Ok(data) => data,
            Err(err) => {
                tracing::error!(error = %err, "cannot hydrate location trigger");
                return self;
            }
        };
        let mut state = self.lock();
        state.latitude.set(f64_or_zero(&data, "latitude"));
        state.longitude.set(f64_or_zero(&data, "longitude"));
        state.distance.set(f64_or_zero(&data, "distance"));
        state.name.set(string_or_empty(&data, "name"));
        state.mode.set(LocationMode::from_code(f64_or_zero(&data, "mode")));
        state.last_run = i64_or_zero(&data, "lastRun");
        drop(state);
        self
    }

    fn friendly_name(&self) -> TextKey {
        TextKey::Location
    }

    fn describe(&self, i18n: &dyn Localizer) -> String {
        let state = self.lock();
        let summary = format!(
            "{} {}",
            i18n.lookup(state.mode.get().label_key()),
            state.name.get()
        );
        i18n.format(TextKey::LocationIs, &summary)
    }

    fn icon(&self) -> Option<Icon> {
        Some(Icon::LocationOn)
    }

    fn duplicate(&self) -> Self {
        let state = self.lock();
        let copy = LocationState {
            latitude: state.latitude.copy(),
            longitude: state.longitude.copy(),
            distance: state.distance.copy(),
            mode: Select::new(&LOCATION_MODES, state.mode.get()),
            name: state.name.clone(),
            last_run: state.last_run,
        };
        Self {
            state: Mutex::new(copy),
        }
    }

    fn last_run(&self) -> EpochMillis {
        self.lock().last_run
    }

    fn executed(&self, now: EpochMillis) {
        self.lock().last_run = now;
    }
}
