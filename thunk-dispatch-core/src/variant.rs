//! Success and failure variants of an action
//!
//! `FETCH` becomes `FETCH_SUCCESS` or `FETCH_FAILURE`. Object actions keep
//! every field; failure variants of object actions also carry an `error`
//! field with the message and stack of whatever went wrong.
//!
//! ```
//! use thunk_dispatch_core::{failure, success, Action, ObjectAction, Typed};
//!
//! assert_eq!(success("FETCH").unwrap(), Action::from("FETCH_SUCCESS"));
//!
//! let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
//! let action = failure(ObjectAction::new("FETCH").with_field("payload", 5), &err).unwrap();
//! assert_eq!(action.type_name(), "FETCH_FAILURE");
//! assert_eq!(action.as_object().unwrap().error().unwrap().message, "boom");
//! ```

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::action::{Action, IntoAction, InvalidActionError, Typed, ERROR_FIELD};

/// Outcome suffix appended to an action type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suffix {
    Success,
    Failure,
}

impl Suffix {
    pub fn as_str(self) -> &'static str {
        match self {
            Suffix::Success => "SUCCESS",
            Suffix::Failure => "FAILURE",
        }
    }

    /// Append this suffix to an action type: `FETCH` -> `FETCH_SUCCESS`.
    pub fn apply(self, kind: &str) -> String {
        format!("{}_{}", kind, self.as_str())
    }
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error details attached to a failure action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub stack: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(stack: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stack: stack.into(),
            message: message.into(),
        }
    }

    /// Extract details from an error.
    ///
    /// `message` is the error's `Display` output. `stack` starts with the same
    /// text and lists each `source()` below it, one per line, prefixed with
    /// `caused by: `.
    pub fn from_error<E: Error + ?Sized>(error: &E) -> Self {
        let message = error.to_string();
        let mut stack = message.clone();
        let mut source = error.source();
        while let Some(cause) = source {
            stack.push_str("\ncaused by: ");
            stack.push_str(&cause.to_string());
            source = cause.source();
        }
        Self { stack, message }
    }

    fn to_value(&self) -> serde_json::Value {
        json!({ "stack": self.stack, "message": self.message })
    }
}

/// Derive the `suffix` variant of `action`.
///
/// String actions only get the suffix; `error` is ignored for them. Object
/// actions are copied with the suffixed type, and `error`, when given,
/// replaces their `error` field.
pub fn derive_variant(action: Action, suffix: Suffix, error: Option<ErrorInfo>) -> Action {
    match action {
        Action::Type(kind) => Action::Type(suffix.apply(&kind)),
        Action::Object(mut object) => {
            let kind = suffix.apply(object.type_name());
            object.set_type(kind);
            if let Some(error) = error {
                object.insert(ERROR_FIELD, error.to_value());
            }
            Action::Object(object)
        }
    }
}

/// The `_SUCCESS` variant of an action.
pub fn success(action: impl IntoAction) -> Result<Action, InvalidActionError> {
    Ok(action.into_action()?.success())
}

/// The `_FAILURE` variant of an action, carrying details of `error`.
pub fn failure<E>(action: impl IntoAction, error: &E) -> Result<Action, InvalidActionError>
where
    E: Error + ?Sized,
{
    Ok(action.into_action()?.failure(error))
}

impl Action {
    /// Same as [`derive_variant`].
    pub fn with_suffix(self, suffix: Suffix, error: Option<ErrorInfo>) -> Action {
        derive_variant(self, suffix, error)
    }

    pub fn success(self) -> Action {
        derive_variant(self, Suffix::Success, None)
    }

    pub fn failure<E: Error + ?Sized>(self, error: &E) -> Action {
        derive_variant(self, Suffix::Failure, Some(ErrorInfo::from_error(error)))
    }
}
