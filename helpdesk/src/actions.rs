//! Helpdesk actions.
//!
//! Actions follow the CQRS pattern: Commands (requested changes) and Events
//! (what happened). Commands are validated by the reducers and answered with
//! dispatched events; only events change state.

use crate::error::HelpdeskError;
use crate::state::{
    Actor, ActorId, Comment, CommentId, Equipment, EquipmentDetails, EquipmentId, NewEquipment,
    NewTicket, Ticket, TicketChanges, TicketId,
};
use chrono::{DateTime, Utc};

/// Equipment action.
///
/// Inputs to the equipment reducer. Referenced actors have already been
/// looked up by the caller; the reducer only sees ids that exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EquipmentAction {
    // ═══════════════════════════════════════════════════════════════════════
    // Commands
    // ═══════════════════════════════════════════════════════════════════════
    /// Register a new piece of equipment under a pre-allocated id.
    Register {
        /// Identifier allocated by the repository.
        id: EquipmentId,
        /// Fields supplied by the caller.
        equipment: NewEquipment,
    },

    /// Replace the descriptive fields of the loaded record.
    Revise {
        /// New descriptive fields.
        details: EquipmentDetails,
    },

    /// Issue the equipment to an actor, or take it back with `None`.
    Assign {
        /// Actor receiving the equipment.
        assignee: Option<ActorId>,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Events
    // ═══════════════════════════════════════════════════════════════════════
    /// Equipment was registered.
    Registered {
        /// The new record.
        equipment: Equipment,
    },

    /// Descriptive fields were replaced.
    Revised {
        /// Normalized fields.
        details: EquipmentDetails,
        /// When the change happened.
        at: DateTime<Utc>,
    },

    /// Equipment was issued to an actor; status is now `Assigned`.
    Assigned {
        /// Actor holding the equipment.
        assignee: ActorId,
        /// When the change happened.
        at: DateTime<Utc>,
    },

    /// Equipment was taken back; `Assigned` status falls back to `InStock`.
    Unassigned {
        /// When the change happened.
        at: DateTime<Utc>,
    },

    /// A command was rejected; nothing changed.
    ValidationFailed {
        /// Why the command was rejected.
        error: HelpdeskError,
    },
}

/// Ticket action.
///
/// Inputs to the ticket reducer. Linked records (assignee, equipment) are
/// passed in already loaded so the reducer can enforce rules about them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketAction {
    // ═══════════════════════════════════════════════════════════════════════
    // Commands
    // ═══════════════════════════════════════════════════════════════════════
    /// File a new ticket under a pre-allocated id.
    Open {
        /// Identifier allocated by the repository.
        id: TicketId,
        /// Actor filing the ticket.
        reporter: ActorId,
        /// Fields supplied by the reporter.
        ticket: NewTicket,
        /// The record `ticket.equipment` points at.
        equipment: Option<Equipment>,
    },

    /// Apply a staff edit to the loaded ticket.
    Update {
        /// Full set of new field values.
        changes: TicketChanges,
        /// The actor `changes.assignee` points at.
        assignee: Option<Actor>,
        /// The record `changes.equipment` points at.
        equipment: Option<Equipment>,
    },

    /// Append a comment to the loaded ticket.
    Comment {
        /// Identifier allocated by the repository.
        id: CommentId,
        /// Actor writing the comment.
        author: ActorId,
        /// Comment text.
        body: String,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Events
    // ═══════════════════════════════════════════════════════════════════════
    /// A ticket was filed.
    Opened {
        /// The new ticket.
        ticket: Ticket,
    },

    /// Staff-editable fields were replaced.
    Updated {
        /// Normalized field values.
        changes: TicketChanges,
        /// When the change happened.
        at: DateTime<Utc>,
    },

    /// The ticket entered `Resolved`/`Closed` from an active status.
    Resolved {
        /// Resolution timestamp.
        at: DateTime<Utc>,
    },

    /// The ticket left `Resolved`/`Closed` for an active status.
    Reopened {
        /// When the ticket was reopened.
        at: DateTime<Utc>,
    },

    /// A comment was appended.
    Commented {
        /// The new comment.
        comment: Comment,
    },

    /// A command was rejected; nothing changed.
    ValidationFailed {
        /// Why the command was rejected.
        error: HelpdeskError,
    },
}

impl EquipmentAction {
    /// `true` for events, `false` for commands.
    #[must_use]
    pub const fn is_event(&self) -> bool {
        !matches!(
            self,
            Self::Register { .. } | Self::Revise { .. } | Self::Assign { .. }
        )
    }
}

impl TicketAction {
    /// `true` for events, `false` for commands.
    #[must_use]
    pub const fn is_event(&self) -> bool {
        !matches!(
            self,
            Self::Open { .. } | Self::Update { .. } | Self::Comment { .. }
        )
    }
}
