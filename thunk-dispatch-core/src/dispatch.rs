//! The dispatch capability and a logging wrapper around it
//!
//! This crate never owns a store. Whatever surrounds it hands in something
//! implementing [`Dispatch`]: a closure, an action channel, or a wrapper such
//! as [`LoggingDispatch`].
//!
//! # Example
//!
//! ```ignore
//! use thunk_dispatch_core::{DispatchLoggerConfig, LoggingDispatch};
//!
//! let (action_tx, mut action_rx) = tokio::sync::mpsc::unbounded_channel();
//!
//! // Log every FETCH* action before it reaches the main loop
//! let dispatch = LoggingDispatch::new(action_tx, DispatchLoggerConfig::new(Some("FETCH*"), None));
//! fetch_user.run(42, &dispatch).await?;
//! ```

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::action::{Action, Typed};

/// Submits actions to the surrounding state-management runtime.
///
/// Implementations must tolerate being called repeatedly.
pub trait Dispatch {
    fn dispatch(&self, action: Action);
}

impl<F> Dispatch for F
where
    F: Fn(Action),
{
    fn dispatch(&self, action: Action) {
        self(action)
    }
}

/// Shares one dispatcher between wrappers and spawned tasks.
///
/// Plain references need no impl of their own: [`Thunk::run`](crate::Thunk::run)
/// already borrows its dispatcher.
impl<D: Dispatch + ?Sized> Dispatch for Arc<D> {
    fn dispatch(&self, action: Action) {
        (**self).dispatch(action)
    }
}

/// Sends the action to the main loop's action channel.
///
/// If the receiver is gone the action is dropped with a warning.
impl Dispatch for mpsc::UnboundedSender<Action> {
    fn dispatch(&self, action: Action) {
        if let Err(mpsc::error::SendError(action)) = self.send(action) {
            tracing::warn!(action = %action.type_name(), "action channel closed, dropping action");
        }
    }
}

/// Configuration for dispatch logging with glob pattern filtering.
///
/// Patterns support `*` (any sequence of characters) and `?` (any single
/// character); everything else matches literally.
///
/// - `FETCH*` matches FETCH, FETCH_SUCCESS, FETCH_FAILURE
/// - `*_FAILURE` matches every failure variant
/// - `user/?OAD` matches user/LOAD
#[derive(Debug, Clone, Default)]
pub struct DispatchLoggerConfig {
    /// If non-empty, only log actions matching these patterns
    pub include_patterns: Vec<String>,
    /// Exclude actions matching these patterns (applied after include)
    pub exclude_patterns: Vec<String>,
}

impl DispatchLoggerConfig {
    /// Create a config from comma-separated pattern strings.
    ///
    /// `None` means no patterns for that list, so the default config logs
    /// every action.
    ///
    /// ```
    /// use thunk_dispatch_core::DispatchLoggerConfig;
    ///
    /// let config = DispatchLoggerConfig::new(Some("FETCH*, SAVE"), Some("*_SUCCESS"));
    /// assert!(config.should_log("FETCH"));
    /// assert!(config.should_log("SAVE"));
    /// assert!(!config.should_log("FETCH_SUCCESS"));
    /// assert!(!config.should_log("LOAD"));
    /// ```
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            include_patterns: include.map(split_patterns).unwrap_or_default(),
            exclude_patterns: exclude.map(split_patterns).unwrap_or_default(),
        }
    }

    pub fn with_patterns(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self {
            include_patterns: include,
            exclude_patterns: exclude,
        }
    }

    /// Check whether an action type passes the include/exclude patterns.
    pub fn should_log(&self, type_name: &str) -> bool {
        let included = self.include_patterns.is_empty()
            || self
                .include_patterns
                .iter()
                .any(|p| glob_match(p, type_name));

        included
            && !self
                .exclude_patterns
                .iter()
                .any(|p| glob_match(p, type_name))
    }
}

fn split_patterns(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

/// Glob matching supporting `*` (zero or more characters) and `?` (exactly
/// one character).
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    match_from(&pattern, &text)
}

fn match_from(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some(('*', rest)) => (0..=text.len()).any(|skip| match_from(rest, &text[skip..])),
        Some((&expected, rest)) => match text.split_first() {
            Some((&actual, text_rest)) if expected == '?' || expected == actual => {
                match_from(rest, text_rest)
            }
            _ => false,
        },
    }
}

/// Dispatcher wrapper that logs each action via `tracing::debug!` before
/// forwarding it.
///
/// Filtering only affects logging; every action is forwarded.
#[derive(Debug, Clone)]
pub struct LoggingDispatch<D> {
    inner: D,
    config: DispatchLoggerConfig,
    active: bool,
}

impl<D: Dispatch> LoggingDispatch<D> {
    pub fn new(inner: D, config: DispatchLoggerConfig) -> Self {
        Self {
            inner,
            config,
            active: true,
        }
    }

    /// Log every action
    pub fn log_all(inner: D) -> Self {
        Self::new(inner, DispatchLoggerConfig::default())
    }

    /// Set whether logging is active.
    ///
    /// When inactive actions are forwarded without logging, which suits
    /// toggling on a `--debug` flag.
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn config(&self) -> &DispatchLoggerConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut DispatchLoggerConfig {
        &mut self.config
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    pub fn into_inner(self) -> D {
        self.inner
    }
}

impl<D: Dispatch> Dispatch for LoggingDispatch<D> {
    fn dispatch(&self, action: Action) {
        if self.active && self.config.should_log(action.type_name()) {
            tracing::debug!(action = %action.type_name(), object = action.is_object(), "dispatch");
        }
        self.inner.dispatch(action);
    }
}
