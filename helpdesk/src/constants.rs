//! Helpdesk constants.
//!
//! Field limits shared by the reducers, the service and the storage schema.

/// Comment body limits.
pub mod comment {
    /// Shortest accepted comment body, in characters.
    pub const MIN_CHARS: usize = 1;

    /// Longest accepted comment body, in characters.
    ///
    /// Configuration may lower this bound but never raise it.
    pub const MAX_CHARS: usize = 1024;
}

/// Ticket field limits.
pub mod ticket {
    /// Longest accepted ticket title, in characters.
    pub const TITLE_MAX_CHARS: usize = 120;
}

/// Equipment field limits.
pub mod equipment {
    /// Longest accepted display name, in characters.
    pub const NAME_MAX_CHARS: usize = 120;

    /// Longest accepted serial number, manufacturer or model, in characters.
    pub const DETAIL_MAX_CHARS: usize = 100;
}

/// Actor field limits.
pub mod actor {
    /// Longest accepted username, in characters.
    pub const USERNAME_MAX_CHARS: usize = 80;

    /// Longest accepted email address, in characters.
    pub const EMAIL_MAX_CHARS: usize = 120;
}

/// Record kinds used in `NotFound` errors and log fields.
pub mod entity {
    /// Actor records.
    pub const ACTOR: &str = "actor";

    /// Equipment records.
    pub const EQUIPMENT: &str = "equipment";

    /// Ticket records.
    pub const TICKET: &str = "ticket";
}
