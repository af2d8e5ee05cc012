//! Helpdesk environment.
//!
//! Dependencies injected into the reducers: the clock and the field limits.
//! Repositories are not part of it; reducers never perform I/O.

use crate::config::HelpdeskConfig;
use crate::constants;
use chrono::{DateTime, Utc};
use helpdesk_core::environment::{Clock, SystemClock};
use std::fmt;
use std::sync::Arc;

/// Configurable text limits, already clamped to the domain bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldLimits {
    /// Longest accepted ticket title, in characters.
    pub title_max_chars: usize,
    /// Longest accepted comment body, in characters.
    pub comment_max_chars: usize,
}

impl FieldLimits {
    /// Build limits, clamping each into its permitted range.
    ///
    /// ```
    /// use helpdesk::environment::FieldLimits;
    ///
    /// let limits = FieldLimits::new(500, 5000);
    /// assert_eq!(limits.title_max_chars, 120);
    /// assert_eq!(limits.comment_max_chars, 1024);
    /// ```
    #[must_use]
    pub fn new(title_max_chars: usize, comment_max_chars: usize) -> Self {
        Self {
            title_max_chars: title_max_chars.clamp(1, constants::ticket::TITLE_MAX_CHARS),
            comment_max_chars: comment_max_chars
                .clamp(constants::comment::MIN_CHARS, constants::comment::MAX_CHARS),
        }
    }
}

impl Default for FieldLimits {
    fn default() -> Self {
        Self {
            title_max_chars: constants::ticket::TITLE_MAX_CHARS,
            comment_max_chars: constants::comment::MAX_CHARS,
        }
    }
}

/// Helpdesk environment.
///
/// Cheap to clone; a copy travels into every repository transaction.
#[derive(Clone)]
pub struct HelpdeskEnvironment {
    /// Source of every timestamp the reducers write.
    pub clock: Arc<dyn Clock>,

    /// Text limits enforced by the reducers.
    pub limits: FieldLimits,
}

impl HelpdeskEnvironment {
    /// Create an environment with the given clock and default limits.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            limits: FieldLimits::default(),
        }
    }

    /// Create an environment from configuration.
    #[must_use]
    pub fn from_config(config: &HelpdeskConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            limits: FieldLimits::new(config.title_max_chars, config.comment_max_chars),
        }
    }

    /// Replace the field limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: FieldLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Current time according to the injected clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

impl Default for HelpdeskEnvironment {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl fmt::Debug for HelpdeskEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelpdeskEnvironment")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_can_only_tighten_limits() {
        let config = HelpdeskConfig::default()
            .with_comment_max_chars(280)
            .with_title_max_chars(0);
        let env = HelpdeskEnvironment::from_config(&config, Arc::new(SystemClock));

        assert_eq!(env.limits.comment_max_chars, 280);
        assert_eq!(env.limits.title_max_chars, 1);
    }
}
