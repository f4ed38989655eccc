//! Test utilities for code built on thunk-dispatch
//!
//! - [`TestDispatch`]: a dispatcher that records every action it receives
//! - Assertion macros for verifying dispatched actions by type
//!
//! # Example
//!
//! ```ignore
//! use thunk_dispatch::testing::TestDispatch;
//! use thunk_dispatch::assert_dispatched;
//!
//! let mut dispatch = TestDispatch::new();
//! fetch_user.run(42, &dispatch).await?;
//!
//! let actions = dispatch.drain_dispatched();
//! assert_dispatched!(actions, "FETCH_USER");
//! assert_dispatched!(actions, "FETCH_USER_SUCCESS");
//! ```

use tokio::sync::mpsc;

use crate::action::{Action, Typed};
use crate::dispatch::Dispatch;

/// Dispatcher that records actions on an internal channel.
///
/// Cloned senders from [`TestDispatch::sender`] feed the same recorder, so
/// spawned tasks can dispatch into it too.
#[derive(Debug)]
pub struct TestDispatch {
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Action>,
}

impl TestDispatch {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Get a clone of the sender, itself usable as a dispatcher.
    pub fn sender(&self) -> mpsc::UnboundedSender<Action> {
        self.tx.clone()
    }

    /// Drain all dispatched actions, oldest first.
    pub fn drain_dispatched(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        while let Ok(action) = self.rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    /// Drain all dispatched actions, keeping only their type names.
    pub fn dispatched_types(&mut self) -> Vec<String> {
        self.drain_dispatched()
            .iter()
            .map(|a| a.type_name().to_string())
            .collect()
    }

    /// Check if anything was dispatched. Drains the recorder.
    pub fn has_dispatched(&mut self) -> bool {
        !self.drain_dispatched().is_empty()
    }
}

impl Default for TestDispatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatch for TestDispatch {
    fn dispatch(&self, action: Action) {
        let _ = self.tx.send(action);
    }
}

/// Assert that an action with the given type was dispatched.
///
/// # Example
///
/// ```ignore
/// let actions = dispatch.drain_dispatched();
/// assert_dispatched!(actions, "FETCH_SUCCESS");
/// ```
#[macro_export]
macro_rules! assert_dispatched {
    ($actions:expr, $type_name:expr) => {{
        use $crate::Typed;
        assert!(
            $actions.iter().any(|a| a.type_name() == $type_name),
            "Expected action `{}` to be dispatched, but got: {:?}",
            $type_name,
            $actions.iter().map(|a| a.type_name()).collect::<Vec<_>>()
        );
    }};
}

/// Assert that NO action with the given type was dispatched.
#[macro_export]
macro_rules! assert_not_dispatched {
    ($actions:expr, $type_name:expr) => {{
        use $crate::Typed;
        assert!(
            !$actions.iter().any(|a| a.type_name() == $type_name),
            "Expected action `{}` NOT to be dispatched, but it was: {:?}",
            $type_name,
            $actions.iter().map(|a| a.type_name()).collect::<Vec<_>>()
        );
    }};
}

/// Count how many dispatched actions have the given type.
///
/// # Example
///
/// ```ignore
/// assert_eq!(count_dispatched!(actions, "FETCH"), 2);
/// ```
#[macro_export]
macro_rules! count_dispatched {
    ($actions:expr, $type_name:expr) => {{
        use $crate::Typed;
        $actions
            .iter()
            .filter(|a| a.type_name() == $type_name)
            .count()
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ObjectAction;

    #[test]
    fn test_records_in_order() {
        let mut dispatch = TestDispatch::new();

        dispatch.dispatch(Action::from("FIRST"));
        dispatch.dispatch(ObjectAction::new("SECOND").into());
        dispatch.sender().dispatch(Action::from("THIRD"));

        assert_eq!(dispatch.dispatched_types(), vec!["FIRST", "SECOND", "THIRD"]);

        // Drain again should be empty
        assert!(!dispatch.has_dispatched());
    }

    #[test]
    fn test_assert_macros() {
        let actions = vec![
            Action::from("FETCH"),
            Action::from("FETCH_SUCCESS"),
            Action::from("FETCH"),
        ];

        assert_dispatched!(actions, "FETCH");
        assert_dispatched!(actions, "FETCH_SUCCESS");
        assert_not_dispatched!(actions, "FETCH_FAILURE");
        assert_eq!(count_dispatched!(actions, "FETCH"), 2);
        assert_eq!(count_dispatched!(actions, "OTHER"), 0);
    }
}
