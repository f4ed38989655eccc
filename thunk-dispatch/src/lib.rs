//! thunk-dispatch: success/failure actions and async thunks
//!
//! Wrap an async call so that it announces itself with a pending action and
//! reports back with a `_SUCCESS` or `_FAILURE` variant, through whatever
//! dispatcher the surrounding store provides.
//!
//! # Example
//! ```ignore
//! use thunk_dispatch::prelude::*;
//!
//! #[derive(IntoAction, Serialize)]
//! #[action(name = "FETCH")]
//! struct Fetch {
//!     payload: u64,
//! }
//!
//! let fetch = as_thunk(
//!     |payload: u64| Fetch { payload },
//!     |payload: u64| async move { api::double(payload).await },
//! );
//!
//! fetch.run(5, &action_tx).await?;
//! // FETCH { payload: 5 }, then FETCH_SUCCESS { payload: 10 }
//! ```

// Re-export everything from core
pub use thunk_dispatch_core::*;

// Re-export derive macros
pub use thunk_dispatch_macros::IntoAction;

/// Prelude for convenient imports
pub mod prelude {
    // Actions
    pub use thunk_dispatch_core::{Action, IntoAction, InvalidActionError, ObjectAction, Typed};

    // Variants
    pub use thunk_dispatch_core::{failure, success, ErrorInfo, Suffix};

    // Thunks
    pub use thunk_dispatch_core::{as_thunk, AsThunk, Thunk, ThunkError};

    // Dispatch
    pub use thunk_dispatch_core::{Dispatch, DispatchLoggerConfig, LoggingDispatch};

    // Derive macros
    pub use thunk_dispatch_macros::IntoAction;
}
