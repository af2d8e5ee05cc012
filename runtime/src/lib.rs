//! # Helpdesk Runtime
//!
//! Runtime implementation for the helpdesk engine.
//!
//! This crate provides the `Store` that coordinates reducer execution and
//! effect handling for a single record.
//!
//! ## Core Components
//!
//! - **Store**: Owns the state of one record for the duration of a request
//! - **Effect Executor**: Interprets effect descriptions; dispatched actions
//!   are fed back into the reducer
//! - **Journal**: Every processed action, in processing order
//!
//! A store is built fresh per request around the record that request loaded.
//! Nothing here suspends: all reducers are pure and every effect is a
//! dispatch, so `send` runs the whole feedback loop to completion.
//!
//! ## Example
//!
//! ```ignore
//! use helpdesk_runtime::Store;
//!
//! let mut store = Store::new(TicketState::from(ticket), TicketReducer::new(), env);
//!
//! let journal = store.send(TicketAction::Update { changes })?;
//! assert!(journal.iter().any(|a| matches!(a, TicketAction::Updated { .. })));
//!
//! let ticket = store.into_state().ticket;
//! ```

use helpdesk_core::{effect::Effect, reducer::Reducer};
use std::collections::VecDeque;

/// Maximum length of a dispatch chain started by a single `send`
///
/// A command dispatching an event is depth 1; an event dispatching another
/// event is depth 2, and so on.
pub const MAX_DISPATCH_DEPTH: usize = 32;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// A reducer kept dispatching actions past the depth limit
        ///
        /// This indicates a reducer bug (an event that dispatches itself,
        /// directly or through a cycle).
        #[error("Dispatch chain exceeded {limit} levels")]
        DispatchLimitExceeded {
            /// The configured limit
            limit: usize,
        },
    }
}

pub use error::StoreError;

/// The Store - runtime for a reducer
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer type
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: S,
    reducer: R,
    environment: E,
    journal: Vec<A>,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
    A: Clone + std::fmt::Debug,
{
    /// Create a new store with initial state, reducer, and environment
    #[must_use]
    pub const fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self {
            state: initial_state,
            reducer,
            environment,
            journal: Vec::new(),
        }
    }

    /// Send an action through the reducer and run the feedback loop
    ///
    /// Returns the actions processed by this call, starting with `action`
    /// itself, in processing order. Dispatched actions are processed
    /// breadth-first, so all effects of one reducer call run before the
    /// effects they in turn produce.
    ///
    /// # Errors
    ///
    /// [`StoreError::DispatchLimitExceeded`] if the dispatch chain grows
    /// deeper than [`MAX_DISPATCH_DEPTH`]. State changes made before the
    /// limit was hit are kept; callers discard the store on error.
    pub fn send(&mut self, action: A) -> Result<&[A], StoreError> {
        let start = self.journal.len();
        let mut queue = VecDeque::from([(action, 0_usize)]);

        while let Some((action, depth)) = queue.pop_front() {
            if depth > MAX_DISPATCH_DEPTH {
                tracing::error!(depth, "Dispatch chain exceeded limit");
                return Err(StoreError::DispatchLimitExceeded {
                    limit: MAX_DISPATCH_DEPTH,
                });
            }

            tracing::trace!(?action, depth, "Reducing action");
            self.journal.push(action.clone());

            let effects = self
                .reducer
                .reduce(&mut self.state, action, &self.environment);

            for effect in effects {
                for next in Effect::into_actions(effect) {
                    queue.push_back((next, depth + 1));
                }
            }
        }

        Ok(&self.journal[start..])
    }

    /// Read the current state
    #[must_use]
    pub const fn state(&self) -> &S {
        &self.state
    }

    /// Every action processed by this store so far
    #[must_use]
    pub fn journal(&self) -> &[A] {
        &self.journal
    }

    /// Consume the store and return its state
    #[must_use]
    pub fn into_state(self) -> S {
        self.state
    }
}
