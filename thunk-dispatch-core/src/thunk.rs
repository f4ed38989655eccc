//! Thunks that wrap an async call in pending/success/failure actions
//!
//! [`as_thunk`] pairs an action creator with an async operation. Running the
//! resulting thunk dispatches the pending action, awaits the call exactly
//! once, then dispatches either the success or the failure variant:
//!
//! ```text
//! PendingDispatched -> Awaiting -> SuccessDispatched -> Done
//!                               -> FailureDispatched -> Done
//! ```
//!
//! The success action comes from calling the action creator again on the
//! call's *result*; the failure action is derived from the original pending
//! action. If the creator rejects the result, the thunk takes the failure
//! path with [`ThunkError::InvalidAction`].
//!
//! # Example
//!
//! ```
//! use thunk_dispatch_core::{as_thunk, Action, ObjectAction};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), thunk_dispatch_core::InvalidActionError> {
//! let double = as_thunk(
//!     |n: i64| ObjectAction::new("FETCH").with_field("payload", n),
//!     |n: i64| async move { Ok::<_, std::io::Error>(n * 2) },
//! );
//!
//! let dispatched = std::sync::Mutex::new(Vec::new());
//! let dispatch = |action: Action| dispatched.lock().unwrap().push(action.to_value());
//! double.run(5, &dispatch).await?;
//!
//! let dispatched = dispatched.into_inner().unwrap();
//! assert_eq!(dispatched[0], serde_json::json!({"type": "FETCH", "payload": 5}));
//! assert_eq!(dispatched[1], serde_json::json!({"type": "FETCH_SUCCESS", "payload": 10}));
//! # Ok(())
//! # }
//! ```

use std::error::Error;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::action::{Action, IntoAction, InvalidActionError, Typed};
use crate::dispatch::Dispatch;

type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

type ActionCreatorFn<P> = dyn Fn(P) -> Result<Action, InvalidActionError> + Send + Sync;
type AsyncCallFn<P, E> = dyn Fn(P) -> BoxFuture<Result<P, E>> + Send + Sync;
type AfterSuccessFn<P> = dyn Fn(&Action, &P, &dyn Dispatch) + Send + Sync;
type AfterFailureFn<E> = dyn Fn(&Action, &ThunkError<E>, &dyn Dispatch) + Send + Sync;

/// Where a running thunk is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThunkPhase {
    PendingDispatched,
    Awaiting,
    SuccessDispatched,
    FailureDispatched,
    Done,
}

impl ThunkPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            ThunkPhase::PendingDispatched => "pending_dispatched",
            ThunkPhase::Awaiting => "awaiting",
            ThunkPhase::SuccessDispatched => "success_dispatched",
            ThunkPhase::FailureDispatched => "failure_dispatched",
            ThunkPhase::Done => "done",
        }
    }

    pub fn is_terminal(self) -> bool {
        self == ThunkPhase::Done
    }
}

impl fmt::Display for ThunkPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a thunk took the failure path.
///
/// Display and `source()` are those of the wrapped error, so the failure
/// action's [`ErrorInfo`](crate::ErrorInfo) reads the same as if it had been
/// built from the wrapped error directly.
#[derive(Debug)]
pub enum ThunkError<E> {
    /// The async call returned `Err`.
    Call(E),
    /// The call succeeded but the action creator rejected its result.
    InvalidAction(InvalidActionError),
}

impl<E> ThunkError<E> {
    /// The async call's error, if that is what failed.
    pub fn call_error(&self) -> Option<&E> {
        match self {
            ThunkError::Call(error) => Some(error),
            ThunkError::InvalidAction(_) => None,
        }
    }

    pub fn is_invalid_action(&self) -> bool {
        matches!(self, ThunkError::InvalidAction(_))
    }
}

impl<E: fmt::Display> fmt::Display for ThunkError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThunkError::Call(error) => error.fmt(f),
            ThunkError::InvalidAction(error) => error.fmt(f),
        }
    }
}

impl<E: Error> Error for ThunkError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ThunkError::Call(error) => error.source(),
            ThunkError::InvalidAction(error) => error.source(),
        }
    }
}

/// Create a thunk factory from an action creator and an async call.
///
/// - `action_creator` builds the pending action from the payload, and the
///   success action (before suffixing) from the call's result.
/// - `async_call` does the work. Its `Ok` value becomes the success payload.
///
/// Attach hooks with [`AsThunk::after_success`] and
/// [`AsThunk::after_failure`].
pub fn as_thunk<P, E, C, A, F, Fut>(action_creator: C, async_call: F) -> AsThunk<P, E>
where
    C: Fn(P) -> A + Send + Sync + 'static,
    A: IntoAction,
    F: Fn(P) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<P, E>> + Send + 'static,
    P: 'static,
    E: 'static,
{
    AsThunk {
        action_creator: Arc::new(move |payload| action_creator(payload).into_action()),
        async_call: Arc::new(move |payload| Box::pin(async_call(payload)) as BoxFuture<_>),
        after_success: None,
        after_failure: None,
    }
}

/// A reusable recipe for thunks; see [`as_thunk`].
///
/// Cloning is cheap: the creator, the call and the hooks are shared.
pub struct AsThunk<P, E> {
    action_creator: Arc<ActionCreatorFn<P>>,
    async_call: Arc<AsyncCallFn<P, E>>,
    after_success: Option<Arc<AfterSuccessFn<P>>>,
    after_failure: Option<Arc<AfterFailureFn<E>>>,
}

impl<P, E> Clone for AsThunk<P, E> {
    fn clone(&self) -> Self {
        Self {
            action_creator: Arc::clone(&self.action_creator),
            async_call: Arc::clone(&self.async_call),
            after_success: self.after_success.clone(),
            after_failure: self.after_failure.clone(),
        }
    }
}

impl<P, E> fmt::Debug for AsThunk<P, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsThunk")
            .field("after_success", &self.after_success.is_some())
            .field("after_failure", &self.after_failure.is_some())
            .finish()
    }
}

impl<P, E> AsThunk<P, E>
where
    P: Clone + Send + 'static,
    E: Error + 'static,
{
    /// Run `hook(pending_action, result, dispatch)` after the success action
    /// has been dispatched.
    pub fn after_success<H>(mut self, hook: H) -> Self
    where
        H: Fn(&Action, &P, &dyn Dispatch) + Send + Sync + 'static,
    {
        self.after_success = Some(Arc::new(hook));
        self
    }

    /// Run `hook(pending_action, error, dispatch)` after the failure action
    /// has been dispatched. `error` is either the call's error or the
    /// creator's rejection of the call's result.
    pub fn after_failure<H>(mut self, hook: H) -> Self
    where
        H: Fn(&Action, &ThunkError<E>, &dyn Dispatch) + Send + Sync + 'static,
    {
        self.after_failure = Some(Arc::new(hook));
        self
    }

    /// Bind a payload, producing a thunk ready to run against a dispatcher.
    pub fn thunk(&self, payload: P) -> Thunk<P, E> {
        Thunk {
            factory: self.clone(),
            payload,
        }
    }

    /// Shorthand for `self.thunk(payload).run(dispatch)`.
    pub async fn run<D: Dispatch>(
        &self,
        payload: P,
        dispatch: &D,
    ) -> Result<(), InvalidActionError> {
        self.thunk(payload).run(dispatch).await
    }
}

/// A thunk bound to one payload. Consumed by [`Thunk::run`].
pub struct Thunk<P, E> {
    factory: AsThunk<P, E>,
    payload: P,
}

impl<P: fmt::Debug, E> fmt::Debug for Thunk<P, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thunk")
            .field("payload", &self.payload)
            .field("factory", &self.factory)
            .finish()
    }
}

impl<P, E> Thunk<P, E>
where
    P: Clone + Send + 'static,
    E: Error + 'static,
{
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Dispatch the pending action, await the call, dispatch the outcome and
    /// run the matching hook.
    ///
    /// Once the pending action is out, every problem is reported through the
    /// failure action and the `after_failure` hook. That covers a failed call
    /// and a creator that rejects the call's result. The only `Err` is a
    /// creator that rejects the payload, in which case nothing is dispatched
    /// and the call never starts.
    pub async fn run<D: Dispatch>(self, dispatch: &D) -> Result<(), InvalidActionError> {
        let Thunk { factory, payload } = self;

        let action = (factory.action_creator)(payload.clone())?;
        dispatch.dispatch(action.clone());
        trace_phase(&action, ThunkPhase::PendingDispatched);

        trace_phase(&action, ThunkPhase::Awaiting);
        match (factory.async_call)(payload).await {
            Ok(result) => match (factory.action_creator)(result.clone()) {
                Ok(created) => {
                    let outcome = created.success();
                    tracing::debug!(
                        action = %action.type_name(),
                        outcome = %outcome.type_name(),
                        "async call succeeded"
                    );
                    dispatch.dispatch(outcome);
                    trace_phase(&action, ThunkPhase::SuccessDispatched);

                    if let Some(hook) = &factory.after_success {
                        let dispatch: &dyn Dispatch = dispatch;
                        hook(&action, &result, dispatch);
                    }
                }
                Err(invalid) => {
                    tracing::warn!(
                        action = %action.type_name(),
                        error = %invalid,
                        "action creator rejected the call's result"
                    );
                    let error = ThunkError::InvalidAction(invalid);
                    dispatch_failure(&factory, &action, error, dispatch);
                }
            },
            Err(error) => dispatch_failure(&factory, &action, ThunkError::Call(error), dispatch),
        }

        trace_phase(&action, ThunkPhase::Done);
        Ok(())
    }
}

fn dispatch_failure<P, E, D>(
    factory: &AsThunk<P, E>,
    action: &Action,
    error: ThunkError<E>,
    dispatch: &D,
) where
    E: Error + 'static,
    D: Dispatch,
{
    let outcome = action.clone().failure(&error);
    tracing::debug!(
        action = %action.type_name(),
        outcome = %outcome.type_name(),
        error = %error,
        "thunk failed"
    );
    dispatch.dispatch(outcome);
    trace_phase(action, ThunkPhase::FailureDispatched);

    if let Some(hook) = &factory.after_failure {
        let dispatch: &dyn Dispatch = dispatch;
        hook(action, &error, dispatch);
    }
}

fn trace_phase(action: &Action, phase: ThunkPhase) {
    tracing::trace!(
        action = %action.type_name(),
        phase = %phase,
        terminal = phase.is_terminal(),
        "thunk"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ObjectAction;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "boom")
        }
    }

    impl Error for Boom {}

    fn fetch(payload: i64) -> ObjectAction {
        ObjectAction::new("FETCH").with_field("payload", payload)
    }

    #[derive(Default)]
    struct Recorder {
        actions: Mutex<Vec<serde_json::Value>>,
    }

    impl Dispatch for Recorder {
        fn dispatch(&self, action: Action) {
            self.actions.lock().unwrap().push(action.to_value());
        }
    }

    impl Recorder {
        fn take(&self) -> Vec<serde_json::Value> {
            std::mem::take(&mut *self.actions.lock().unwrap())
        }
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(ThunkPhase::PendingDispatched.to_string(), "pending_dispatched");
        assert!(ThunkPhase::Done.is_terminal());
        assert!(!ThunkPhase::Awaiting.is_terminal());
    }

    #[tokio::test]
    async fn test_success_dispatches_pending_then_success() {
        let thunk = as_thunk(fetch, |n: i64| async move { Ok::<_, Boom>(n * 2) });
        let recorder = Recorder::default();

        thunk.run(5, &recorder).await.unwrap();

        assert_eq!(
            recorder.take(),
            vec![
                json!({"type": "FETCH", "payload": 5}),
                json!({"type": "FETCH_SUCCESS", "payload": 10}),
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_dispatches_failure_of_pending_action() {
        let thunk = as_thunk(fetch, |_: i64| async move { Err::<i64, _>(Boom) });
        let recorder = Recorder::default();

        thunk.run(5, &recorder).await.unwrap();

        assert_eq!(
            recorder.take(),
            vec![
                json!({"type": "FETCH", "payload": 5}),
                json!({
                    "type": "FETCH_FAILURE",
                    "payload": 5,
                    "error": {"stack": "boom", "message": "boom"},
                }),
            ]
        );
    }

    #[tokio::test]
    async fn test_pending_dispatched_before_call_starts() {
        let dispatched = Arc::new(AtomicUsize::new(0));
        let seen_at_call = Arc::new(AtomicUsize::new(usize::MAX));

        let seen = Arc::clone(&seen_at_call);
        let counter = Arc::clone(&dispatched);
        let thunk = as_thunk(fetch, move |n: i64| {
            seen.store(counter.load(Ordering::SeqCst), Ordering::SeqCst);
            async move { Ok::<_, Boom>(n) }
        });

        let counter = Arc::clone(&dispatched);
        let dispatch = move |_: Action| {
            counter.fetch_add(1, Ordering::SeqCst);
        };
        thunk.run(1, &dispatch).await.unwrap();

        assert_eq!(seen_at_call.load(Ordering::SeqCst), 1);
        assert_eq!(dispatched.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_hooks_run_after_outcome_dispatch() {
        let recorder = Arc::new(Recorder::default());

        let log = Arc::new(Mutex::new(Vec::new()));
        let success_log = Arc::clone(&log);
        let failure_log = Arc::clone(&log);
        let thunk = as_thunk(fetch, |n: i64| async move {
            if n < 0 {
                Err(Boom)
            } else {
                Ok(n + 1)
            }
        })
        .after_success(move |action, result, dispatch| {
            success_log
                .lock()
                .unwrap()
                .push(format!("success {} {}", action.type_name(), result));
            dispatch.dispatch(Action::from("FOLLOW_UP"));
        })
        .after_failure(move |action, error, _dispatch| {
            failure_log
                .lock()
                .unwrap()
                .push(format!("failure {} {}", action.type_name(), error));
        });

        thunk.run(1, recorder.as_ref()).await.unwrap();
        let actions = recorder.take();
        assert_eq!(actions.len(), 3);
        assert_eq!(actions[1]["type"], "FETCH_SUCCESS");
        assert_eq!(actions[2], json!("FOLLOW_UP"));

        thunk.run(-1, recorder.as_ref()).await.unwrap();
        assert_eq!(recorder.take().len(), 2);

        assert_eq!(
            *log.lock().unwrap(),
            vec!["success FETCH 2".to_string(), "failure FETCH boom".to_string()]
        );
    }

    #[tokio::test]
    async fn test_invalid_pending_action_dispatches_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let thunk = as_thunk(
            |_: i64| json!(42),
            move |n: i64| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok::<_, Boom>(n) }
            },
        );
        let recorder = Recorder::default();

        let err = thunk.run(1, &recorder).await.unwrap_err();
        assert_eq!(err.found(), "a number");
        assert!(recorder.take().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_rejected_result_takes_failure_path() {
        let failures = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&failures);
        let thunk = as_thunk(
            |p: i64| {
                if p > 5 {
                    json!(42)
                } else {
                    json!({"type": "FETCH", "payload": p})
                }
            },
            |p: i64| async move { Ok::<_, Boom>(p * 2) },
        )
        .after_success(|_, _, _| panic!("success hook must not run"))
        .after_failure(move |action, error, _| {
            seen.lock().unwrap().push((
                action.type_name().to_string(),
                error.is_invalid_action(),
                error.call_error().is_none(),
            ));
        });
        let recorder = Recorder::default();

        thunk.run(5, &recorder).await.unwrap();

        let actions = recorder.take();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0], json!({"type": "FETCH", "payload": 5}));
        assert_eq!(actions[1]["type"], "FETCH_FAILURE");
        assert_eq!(actions[1]["payload"], 5);
        let message = actions[1]["error"]["message"].as_str().unwrap();
        assert!(message.contains("found a number"), "{message}");
        assert_eq!(
            *failures.lock().unwrap(),
            vec![("FETCH".to_string(), true, true)]
        );
    }

    #[test]
    fn test_thunk_error_reads_as_wrapped_error() {
        let call: ThunkError<Boom> = ThunkError::Call(Boom);
        assert_eq!(call.to_string(), "boom");
        assert!(call.source().is_none());
        assert!(call.call_error().is_some());

        let info = crate::ErrorInfo::from_error(&call);
        assert_eq!(info.message, "boom");
        assert_eq!(info.stack, "boom");

        let invalid: ThunkError<Boom> = ThunkError::InvalidAction(InvalidActionError::new("null"));
        assert!(invalid.is_invalid_action());
        assert!(invalid.to_string().ends_with("found null"));
    }

    #[tokio::test]
    async fn test_string_actions_from_creator() {
        let thunk = as_thunk(|_: ()| "PING", |_: ()| async { Err::<(), _>(Boom) });
        let recorder = Recorder::default();

        thunk.thunk(()).run(&recorder).await.unwrap();
        assert_eq!(recorder.take(), vec![json!("PING"), json!("PING_FAILURE")]);
    }

    #[tokio::test]
    async fn test_thunks_are_independent() {
        let thunk = as_thunk(fetch, |n: i64| async move { Ok::<_, Boom>(n * 10) });
        let recorder = Arc::new(Recorder::default());

        let a = thunk.thunk(1);
        let b = thunk.thunk(2);
        assert_eq!(*b.payload(), 2);

        let (ra, rb) = tokio::join!(a.run(recorder.as_ref()), b.run(recorder.as_ref()));
        ra.unwrap();
        rb.unwrap();

        let mut types: Vec<_> = recorder
            .take()
            .into_iter()
            .map(|v| (v["type"].as_str().unwrap().to_string(), v["payload"].clone()))
            .collect();
        types.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.to_string().cmp(&b.1.to_string())));
        assert_eq!(
            types,
            vec![
                ("FETCH".to_string(), json!(1)),
                ("FETCH".to_string(), json!(2)),
                ("FETCH_SUCCESS".to_string(), json!(10)),
                ("FETCH_SUCCESS".to_string(), json!(20)),
            ]
        );
    }
}
