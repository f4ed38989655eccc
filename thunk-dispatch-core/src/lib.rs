//! Core types for thunk-dispatch
//!
//! Helpers for the async half of a Redux/Elm-style action flow. The crate
//! does not hold state or reduce anything; it produces actions and hands them
//! to a [`Dispatch`] supplied by the caller.
//!
//! # Core Concepts
//!
//! - **Action**: a string identifier or an object with a `type` field
//! - **Variants**: `success` / `failure` suffix an action's type with
//!   `_SUCCESS` / `_FAILURE`
//! - **Thunk**: an action creator plus an async call, run as
//!   pending -> await -> success or failure
//! - **Dispatch**: the caller's capability for submitting actions
//!
//! # Basic Example
//!
//! ```ignore
//! use thunk_dispatch_core::prelude::*;
//!
//! let fetch_user = as_thunk(
//!     |id: u64| ObjectAction::new("FETCH_USER").with_field("payload", id),
//!     |id: u64| async move { api::load_user_id(id).await },
//! )
//! .after_failure(|_action, error, dispatch| {
//!     dispatch.dispatch(ObjectAction::new("NOTIFY").with_field("text", error.to_string()).into());
//! });
//!
//! let (action_tx, mut action_rx) = tokio::sync::mpsc::unbounded_channel();
//! fetch_user.run(42, &action_tx).await?;
//! // action_rx yields FETCH_USER, then FETCH_USER_SUCCESS or FETCH_USER_FAILURE
//! ```

pub mod action;
pub mod dispatch;
pub mod testing;
pub mod thunk;
pub mod variant;

pub use action::{Action, IntoAction, InvalidActionError, ObjectAction, Typed};
pub use dispatch::{glob_match, Dispatch, DispatchLoggerConfig, LoggingDispatch};
pub use thunk::{as_thunk, AsThunk, Thunk, ThunkError, ThunkPhase};
pub use variant::{derive_variant, failure, success, ErrorInfo, Suffix};

pub use testing::TestDispatch;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, IntoAction, InvalidActionError, ObjectAction, Typed};
    pub use crate::dispatch::{Dispatch, DispatchLoggerConfig, LoggingDispatch};
    pub use crate::thunk::{as_thunk, AsThunk, Thunk, ThunkError};
    pub use crate::variant::{failure, success, ErrorInfo, Suffix};
}
