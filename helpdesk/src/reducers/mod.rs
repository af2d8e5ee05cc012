//! Helpdesk reducers.
//!
//! This module contains the pure reducers for equipment and tickets.
//!
//! Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
//! Commands validate and dispatch events; events are the only code that
//! mutates state. The runtime [`Store`] feeds dispatched events back in.

pub mod equipment;
pub mod ticket;

use crate::error::{HelpdeskError, Result};
use helpdesk_core::reducer::Reducer;
use helpdesk_runtime::Store;
use std::fmt::Debug;

// Re-export
pub use equipment::{EquipmentOutcome, EquipmentReducer};
pub use ticket::{validate_comment_body, TicketOutcome, TicketReducer};

/// Run `action` and every event it dispatches through a fresh store.
///
/// Returns the final state and the processed actions in order.
///
/// # Errors
///
/// Returns [`HelpdeskError::Internal`] if the dispatch chain runs away.
pub fn execute<R>(
    reducer: R,
    state: R::State,
    action: R::Action,
    env: R::Environment,
) -> Result<(R::State, Vec<R::Action>)>
where
    R: Reducer,
    R::Action: Clone + Debug,
{
    let mut store = Store::new(state, reducer, env);
    let journal = store.send(action)?.to_vec();
    Ok((store.into_state(), journal))
}

/// Trim `value` and require it to be non-blank and at most `max` characters.
pub(crate) fn required_text(field: &'static str, value: &str, max: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(HelpdeskError::validation(field, "must not be blank"));
    }
    check_length(field, value, max)?;
    Ok(value.to_string())
}

/// Trim `value`, turning blank into `None`, and cap it at `max` characters.
pub(crate) fn optional_text(
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> Result<Option<String>> {
    let value = normalize_optional(value);
    if let Some(text) = &value {
        check_length(field, text, max)?;
    }
    Ok(value)
}

/// Trim `value`, turning blank into `None`.
pub(crate) fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(HelpdeskError::validation(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims_and_bounds() {
        assert_eq!(required_text("title", "  PC Broken ", 120), Ok("PC Broken".to_string()));
        assert!(required_text("title", "   ", 120).is_err());
        assert!(required_text("title", &"x".repeat(121), 120).is_err());
        assert!(required_text("title", &"é".repeat(120), 120).is_ok());
    }

    #[test]
    fn blank_optional_text_becomes_none() {
        assert_eq!(optional_text("serial", Some("  ".to_string()), 100), Ok(None));
        assert_eq!(
            optional_text("serial", Some(" SN-1 ".to_string()), 100),
            Ok(Some("SN-1".to_string()))
        );
        assert!(optional_text("serial", Some("x".repeat(101)), 100).is_err());
    }
}
