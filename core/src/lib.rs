//! # Helpdesk Core
//!
//! Core traits and types for the helpdesk engine.
//!
//! Every mutable record in the helpdesk (equipment, tickets) is modelled as a
//! reducer state. Commands are validated by a pure reducer which answers with
//! effect descriptions; the runtime feeds dispatched events back into the same
//! reducer, and only events change state.
//!
//! ## Core Concepts
//!
//! - **State**: The record being worked on, plus the last validation error
//! - **Action**: All possible inputs to a reducer (commands and events)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Description of what should happen next (never executed here)
//! - **Environment**: Injected dependencies via traits (the clock)
//!
//! ## Example
//!
//! ```
//! use helpdesk_core::{dispatch, effect::Effect, reducer::Reducer, SmallVec};
//!
//! #[derive(Clone, Debug)]
//! enum CounterAction {
//!     Increment,
//!     Incremented,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = u32;
//!     type Action = CounterAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut u32,
//!         action: CounterAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<CounterAction>; 4]> {
//!         match action {
//!             CounterAction::Increment => {
//!                 helpdesk_core::smallvec![dispatch!(CounterAction::Incremented)]
//!             }
//!             CounterAction::Incremented => {
//!                 *state += 1;
//!                 SmallVec::new()
//!             }
//!         }
//!     }
//! }
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// Declarative macros for building effects
pub mod effect_macros;

/// Reducer module - The core trait for business logic
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`
///
/// They contain all business logic and are deterministic and testable.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for business logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The domain state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected dependencies this reducer needs
    ///
    /// # Example
    ///
    /// ```ignore
    /// impl Reducer for TicketReducer {
    ///     type State = TicketState;
    ///     type Action = TicketAction;
    ///     type Environment = HelpdeskEnvironment;
    ///
    ///     fn reduce(
    ///         &self,
    ///         state: &mut TicketState,
    ///         action: TicketAction,
    ///         env: &HelpdeskEnvironment,
    ///     ) -> SmallVec<[Effect<TicketAction>; 4]> {
    ///         match action {
    ///             TicketAction::Update { changes } => {
    ///                 // Validate, then dispatch the resulting event
    ///                 smallvec![dispatch!(TicketAction::Updated { .. })]
    ///             }
    ///             _ => SmallVec::new(),
    ///         }
    ///     }
    /// }
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected dependencies
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// This is a pure function that:
        /// 1. Validates the action
        /// 2. Updates state in place (events only)
        /// 3. Returns effect descriptions to be executed by the runtime
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - Side effect descriptions
///
/// Effects are values, not execution. The runtime interprets them after the
/// reducer returns.
pub mod effect {
    /// Effect type - describes what should happen after a reducer call
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type that effects can produce (feedback loop)
    #[derive(Clone, PartialEq, Eq)]
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Feed an action back into the reducer
        Dispatch(Box<Action>),

        /// Run effects one after another, in order
        Sequential(Vec<Effect<Action>>),
    }

    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Dispatch(action) => {
                    f.debug_tuple("Effect::Dispatch").field(action).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Dispatch a single action
        #[must_use]
        pub fn dispatch(action: Action) -> Effect<Action> {
            Effect::Dispatch(Box::new(action))
        }

        /// Flatten this effect into the actions it dispatches, in order
        #[must_use]
        pub fn into_actions(self) -> Vec<Action> {
            let mut actions = Vec::new();
            self.collect_into(&mut actions);
            actions
        }

        fn collect_into(self, out: &mut Vec<Action>) {
            match self {
                Effect::None => {},
                Effect::Dispatch(action) => out.push(*action),
                Effect::Sequential(effects) => {
                    for effect in effects {
                        effect.collect_into(out);
                    }
                },
            }
        }
    }
}

/// Environment module - Dependency injection traits
///
/// All external dependencies are abstracted behind traits and injected
/// via the Environment parameter.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use helpdesk_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let before = clock.now();
    /// assert!(clock.now() >= before);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use proptest::prelude::*;

    #[test]
    fn sequential_effects_flatten_in_order() {
        let effect = Effect::chain(vec![
            Effect::dispatch(1),
            Effect::None,
            Effect::chain(vec![Effect::dispatch(2), Effect::dispatch(3)]),
        ]);

        assert_eq!(effect.into_actions(), vec![1, 2, 3]);
    }

    #[test]
    fn none_dispatches_nothing() {
        assert!(Effect::<u8>::None.into_actions().is_empty());
    }

    proptest! {
        #[test]
        fn nesting_never_reorders_or_drops_actions(
            groups in prop::collection::vec(
                prop::collection::vec(prop::option::of(any::<u8>()), 0..6),
                0..6,
            ),
        ) {
            let expected: Vec<u8> = groups.iter().flatten().filter_map(|a| *a).collect();
            let effect = Effect::chain(
                groups
                    .into_iter()
                    .map(|group| {
                        Effect::chain(
                            group
                                .into_iter()
                                .map(|a| a.map_or(Effect::None, Effect::dispatch))
                                .collect(),
                        )
                    })
                    .collect(),
            );

            prop_assert_eq!(effect.into_actions(), expected);
        }
    }
}
