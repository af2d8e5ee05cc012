//! Declarative macros for ergonomic effect construction
//!
//! Reducers answer almost every command with "dispatch this event" or
//! "dispatch these events in order"; these macros keep that terse.

/// Create an `Effect::Dispatch`, or an `Effect::Sequential` of dispatches
/// when given several actions
///
/// # Example
///
/// ```
/// use helpdesk_core::{dispatch, effect::Effect};
///
/// let single: Effect<u8> = dispatch!(1);
/// assert_eq!(single.into_actions(), vec![1]);
///
/// let many: Effect<u8> = dispatch!(1, 2, 3);
/// assert_eq!(many.into_actions(), vec![1, 2, 3]);
/// ```
#[macro_export]
macro_rules! dispatch {
    ($action:expr $(,)?) => {
        $crate::effect::Effect::Dispatch(::std::boxed::Box::new($action))
    };
    ($($action:expr),+ $(,)?) => {
        $crate::effect::Effect::Sequential(::std::vec![
            $($crate::effect::Effect::Dispatch(::std::boxed::Box::new($action))),+
        ])
    };
}
