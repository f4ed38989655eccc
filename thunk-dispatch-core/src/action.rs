//! Action values and conversions into them
//!
//! An action is either a plain string identifier or an object carrying a
//! `type` string plus arbitrary extra fields. Both shapes live in the
//! [`Action`] enum, so code that derives variants matches on the shape
//! instead of probing fields at runtime. The only place where dynamic input
//! is inspected is [`IntoAction`], which is where [`InvalidActionError`]
//! comes from.

use std::fmt;

use serde::de::{Deserialize, Deserializer, Error as _};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::variant::ErrorInfo;

/// Key holding the action type in the JSON form of an object action.
pub const TYPE_FIELD: &str = "type";

/// Key holding the error details of a failure action.
pub const ERROR_FIELD: &str = "error";

/// Anything that exposes a type identifier.
pub trait Typed {
    /// The action type, e.g. `"FETCH"` or `"FETCH_SUCCESS"`.
    fn type_name(&self) -> &str;
}

/// Error raised when a value is neither a string nor an object with a
/// string `type` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidActionError {
    found: String,
}

impl InvalidActionError {
    /// Create an error describing what was found instead of an action.
    pub fn new(found: impl Into<String>) -> Self {
        Self {
            found: found.into(),
        }
    }

    /// Description of the rejected value.
    pub fn found(&self) -> &str {
        &self.found
    }
}

impl fmt::Display for InvalidActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "action parameter is invalid: expected a string or an action object with a `type` field, found {}",
            self.found
        )
    }
}

impl std::error::Error for InvalidActionError {}

/// An action object: a `type` plus any number of extra fields.
///
/// The `type` key is never stored among the fields; it is kept separately so
/// an `ObjectAction` always has one.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectAction {
    kind: String,
    fields: Map<String, Value>,
}

impl ObjectAction {
    /// Create an object action with no extra fields.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            fields: Map::new(),
        }
    }

    /// Build an object action from a type and a serializable value.
    ///
    /// The value must serialize to a JSON object (or to `null`, which yields
    /// no fields). A `type` key in the serialized value is dropped in favour
    /// of `kind`.
    pub fn from_serialize<T>(
        kind: impl Into<String>,
        value: &T,
    ) -> Result<Self, InvalidActionError>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(value).map_err(|e| {
            InvalidActionError::new(format!("a value that failed to serialize ({e})"))
        })?;

        let mut fields = match value {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(InvalidActionError::new(format!(
                    "{} where an object was expected",
                    describe(&other)
                )))
            }
        };
        fields.remove(TYPE_FIELD);

        Ok(Self {
            kind: kind.into(),
            fields,
        })
    }

    /// Add a field, builder style.
    ///
    /// Same rules as [`ObjectAction::insert`]: `with_field("type", "B")`
    /// renames the action, and a non-string `type` value is discarded with a
    /// warning.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a field, returning the previous value under that key.
    ///
    /// The `type` key is reserved. A string value replaces the action type
    /// and the old type is returned. Any other value is discarded: the type
    /// and the fields stay as they were, a warning is logged, and `None` is
    /// returned.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        if key == TYPE_FIELD {
            return match value {
                Value::String(kind) => Some(Value::String(std::mem::replace(&mut self.kind, kind))),
                other => {
                    tracing::warn!(
                        action = %self.kind,
                        found = %describe(&other),
                        "ignoring non-string `type` field"
                    );
                    None
                }
            };
        }
        self.fields.insert(key, value)
    }

    /// Replace the action type.
    pub fn set_type(&mut self, kind: impl Into<String>) {
        self.kind = kind.into();
    }

    /// Look up a field other than `type`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// The `payload` field, if any.
    pub fn payload(&self) -> Option<&Value> {
        self.get("payload")
    }

    /// The error details attached by a failure derivation, if any.
    pub fn error(&self) -> Option<ErrorInfo> {
        self.get(ERROR_FIELD)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// All fields other than `type`.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Split into the type and the remaining fields.
    pub fn into_parts(self) -> (String, Map<String, Value>) {
        (self.kind, self.fields)
    }
}

impl Typed for ObjectAction {
    fn type_name(&self) -> &str {
        &self.kind
    }
}

impl TryFrom<Map<String, Value>> for ObjectAction {
    type Error = InvalidActionError;

    fn try_from(mut fields: Map<String, Value>) -> Result<Self, Self::Error> {
        match fields.remove(TYPE_FIELD) {
            Some(Value::String(kind)) => Ok(Self { kind, fields }),
            Some(_) => Err(InvalidActionError::new(
                "an object whose `type` field is not a string",
            )),
            None => Err(InvalidActionError::new("an object without a `type` field")),
        }
    }
}

impl From<ObjectAction> for Value {
    fn from(action: ObjectAction) -> Self {
        let (kind, fields) = action.into_parts();
        let mut map = Map::with_capacity(fields.len() + 1);
        map.insert(TYPE_FIELD.to_string(), Value::String(kind));
        map.extend(fields);
        Value::Object(map)
    }
}

impl Serialize for ObjectAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry(TYPE_FIELD, &self.kind)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ObjectAction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        ObjectAction::try_from(map).map_err(D::Error::custom)
    }
}

/// A dispatchable action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// A bare action identifier such as `"FETCH"`.
    Type(String),
    /// An action object with a `type` and extra fields.
    Object(ObjectAction),
}

impl Action {
    /// The object form, if this is an object action.
    pub fn as_object(&self) -> Option<&ObjectAction> {
        match self {
            Action::Object(object) => Some(object),
            Action::Type(_) => None,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Action::Object(_))
    }

    /// Convert into a JSON value (a string or an object).
    pub fn to_value(&self) -> Value {
        match self {
            Action::Type(kind) => Value::String(kind.clone()),
            Action::Object(object) => Value::from(object.clone()),
        }
    }
}

impl Typed for Action {
    fn type_name(&self) -> &str {
        match self {
            Action::Type(kind) => kind,
            Action::Object(object) => object.type_name(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl From<&str> for Action {
    fn from(kind: &str) -> Self {
        Action::Type(kind.to_string())
    }
}

impl From<String> for Action {
    fn from(kind: String) -> Self {
        Action::Type(kind)
    }
}

impl From<ObjectAction> for Action {
    fn from(object: ObjectAction) -> Self {
        Action::Object(object)
    }
}

impl From<Action> for Value {
    fn from(action: Action) -> Self {
        match action {
            Action::Type(kind) => Value::String(kind),
            Action::Object(object) => Value::from(object),
        }
    }
}

impl Serialize for Action {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Action::Type(kind) => serializer.serialize_str(kind),
            Action::Object(object) => object.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Action {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer)?
            .into_action()
            .map_err(D::Error::custom)
    }
}

/// Conversion into an [`Action`], rejecting values of the wrong shape.
///
/// Action creators may return anything implementing this trait. Use
/// `#[derive(IntoAction)]` to implement it for a `Serialize` struct.
pub trait IntoAction {
    fn into_action(self) -> Result<Action, InvalidActionError>;
}

impl IntoAction for Action {
    fn into_action(self) -> Result<Action, InvalidActionError> {
        Ok(self)
    }
}

impl IntoAction for ObjectAction {
    fn into_action(self) -> Result<Action, InvalidActionError> {
        Ok(Action::Object(self))
    }
}

impl IntoAction for String {
    fn into_action(self) -> Result<Action, InvalidActionError> {
        Ok(Action::Type(self))
    }
}

impl IntoAction for &str {
    fn into_action(self) -> Result<Action, InvalidActionError> {
        Ok(Action::Type(self.to_string()))
    }
}

impl IntoAction for Value {
    fn into_action(self) -> Result<Action, InvalidActionError> {
        match self {
            Value::String(kind) => Ok(Action::Type(kind)),
            Value::Object(map) => ObjectAction::try_from(map).map(Action::Object),
            other => Err(InvalidActionError::new(describe(&other))),
        }
    }
}

impl IntoAction for &Value {
    fn into_action(self) -> Result<Action, InvalidActionError> {
        self.clone().into_action()
    }
}

impl<A: IntoAction> IntoAction for Result<A, InvalidActionError> {
    fn into_action(self) -> Result<Action, InvalidActionError> {
        self.and_then(IntoAction::into_action)
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
