//! Ticket reducer.
//!
//! The status machine is permissive: any status may follow any other. The one
//! rule it enforces is on `resolved_at`, which is stamped when a ticket enters
//! `Resolved`/`Closed` from an active status and cleared when it leaves them.
//! An update therefore dispatches `Updated` followed by `Resolved` or
//! `Reopened` when the transition crosses that line.
//!
//! Linked records are checked here too: an assignee must be staff, and newly
//! linked equipment must not be retired.

use super::{execute, required_text};
use crate::actions::TicketAction;
use crate::constants::comment::MIN_CHARS;
use crate::environment::{FieldLimits, HelpdeskEnvironment};
use crate::error::{HelpdeskError, Result};
use crate::state::{
    Actor, ActorId, Comment, CommentId, Equipment, EquipmentId, EquipmentStatus, NewTicket,
    ResolutionChange, Ticket, TicketChanges, TicketId, TicketState, TicketStatus,
};
use helpdesk_core::effect::Effect;
use helpdesk_core::reducer::Reducer;
use helpdesk_core::{dispatch, smallvec, SmallVec};

/// Ticket reducer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicketReducer;

impl TicketReducer {
    /// Create a new ticket reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn open(
        state: &TicketState,
        id: TicketId,
        reporter: ActorId,
        input: NewTicket,
        equipment: Option<&Equipment>,
        env: &HelpdeskEnvironment,
    ) -> Result<Effect<TicketAction>> {
        if state.ticket.is_some() {
            return Err(HelpdeskError::Internal(format!("ticket {id} is already open")));
        }

        let title = required_text("title", &input.title, env.limits.title_max_chars)?;
        let description = required_text("description", &input.description, usize::MAX)?;
        check_equipment_link(input.equipment, equipment, None)?;

        let now = env.now();
        let ticket = Ticket {
            id,
            title,
            description,
            status: TicketStatus::Open,
            priority: input.priority.unwrap_or_default(),
            reporter,
            assignee: None,
            equipment: input.equipment,
            created_at: now,
            updated_at: now,
            resolved_at: None,
        };

        Ok(dispatch!(TicketAction::Opened { ticket }))
    }

    fn update(
        state: &TicketState,
        changes: TicketChanges,
        assignee: Option<&Actor>,
        equipment: Option<&Equipment>,
        env: &HelpdeskEnvironment,
    ) -> Result<Effect<TicketAction>> {
        let ticket = loaded(state)?;

        let changes = TicketChanges {
            title: required_text("title", &changes.title, env.limits.title_max_chars)?,
            description: required_text("description", &changes.description, usize::MAX)?,
            ..changes
        };
        check_assignee(changes.assignee, assignee)?;
        check_equipment_link(changes.equipment, equipment, ticket.equipment)?;

        let at = env.now();
        let transition = ResolutionChange::between(ticket.status, changes.status);
        let updated = TicketAction::Updated { changes, at };

        Ok(match transition {
            ResolutionChange::Set => dispatch!(updated, TicketAction::Resolved { at }),
            ResolutionChange::Clear => dispatch!(updated, TicketAction::Reopened { at }),
            ResolutionChange::Keep => dispatch!(updated),
        })
    }

    fn comment(
        state: &TicketState,
        id: CommentId,
        author: ActorId,
        body: String,
        env: &HelpdeskEnvironment,
    ) -> Result<Effect<TicketAction>> {
        let ticket = loaded(state)?;
        validate_comment_body(&body, env.limits)?;

        let comment = Comment {
            id,
            ticket: ticket.id,
            author,
            body,
            created_at: env.now(),
        };

        Ok(dispatch!(TicketAction::Commented { comment }))
    }
}

impl Reducer for TicketReducer {
    type State = TicketState;
    type Action = TicketAction;
    type Environment = HelpdeskEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let decided = match action {
            // ═══════════════════════════════════════════════════════════
            // Commands
            // ═══════════════════════════════════════════════════════════
            TicketAction::Open {
                id,
                reporter,
                ticket,
                equipment,
            } => Self::open(state, id, reporter, ticket, equipment.as_ref(), env),
            TicketAction::Update {
                changes,
                assignee,
                equipment,
            } => Self::update(state, changes, assignee.as_ref(), equipment.as_ref(), env),
            TicketAction::Comment { id, author, body } => {
                Self::comment(state, id, author, body, env)
            },

            // ═══════════════════════════════════════════════════════════
            // Events
            // ═══════════════════════════════════════════════════════════
            TicketAction::Opened { ticket } => {
                state.ticket = Some(ticket);
                return SmallVec::new();
            },
            TicketAction::Updated { changes, at } => {
                if let Some(ticket) = state.ticket.as_mut() {
                    ticket.title = changes.title;
                    ticket.description = changes.description;
                    ticket.status = changes.status;
                    ticket.priority = changes.priority;
                    ticket.assignee = changes.assignee;
                    ticket.equipment = changes.equipment;
                    ticket.updated_at = at;
                }
                return SmallVec::new();
            },
            TicketAction::Resolved { at } => {
                if let Some(ticket) = state.ticket.as_mut() {
                    ticket.resolved_at = Some(at);
                }
                return SmallVec::new();
            },
            TicketAction::Reopened { .. } => {
                if let Some(ticket) = state.ticket.as_mut() {
                    ticket.resolved_at = None;
                }
                return SmallVec::new();
            },
            TicketAction::Commented { comment } => {
                if let Some(ticket) = state.ticket.as_mut() {
                    ticket.updated_at = comment.created_at;
                }
                state.comments.push(comment);
                return SmallVec::new();
            },
            TicketAction::ValidationFailed { error } => {
                state.last_error = Some(error);
                return SmallVec::new();
            },
        };

        match decided {
            Ok(effect) => smallvec![effect],
            Err(error) => smallvec![dispatch!(TicketAction::ValidationFailed { error })],
        }
    }
}

/// Check a comment body against the configured length bounds.
///
/// Whitespace-only bodies count as empty.
///
/// # Errors
///
/// Returns [`HelpdeskError::ValidationFailed`] for field `body`.
pub fn validate_comment_body(body: &str, limits: FieldLimits) -> Result<()> {
    if body.trim().chars().count() < MIN_CHARS {
        return Err(HelpdeskError::validation("body", "must not be empty"));
    }
    let max = limits.comment_max_chars;
    if body.chars().count() > max {
        return Err(HelpdeskError::validation(
            "body",
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

/// Result of running one ticket command to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketOutcome {
    /// The ticket after every event was applied.
    pub ticket: Ticket,
    /// Comments added by the command.
    pub comments: Vec<Comment>,
    /// Every processed action, command first.
    pub journal: Vec<TicketAction>,
}

impl TicketOutcome {
    /// Run `action` against `state`.
    ///
    /// # Errors
    ///
    /// Returns the validation error the command was rejected with, or
    /// [`HelpdeskError::Internal`] if no ticket came out of it.
    pub fn run(state: TicketState, action: TicketAction, env: &HelpdeskEnvironment) -> Result<Self> {
        let (state, journal) = execute(TicketReducer::new(), state, action, env.clone())?;
        if let Some(error) = state.last_error {
            return Err(error);
        }
        let ticket = state
            .ticket
            .ok_or_else(|| HelpdeskError::Internal("ticket command produced no record".into()))?;
        Ok(Self {
            ticket,
            comments: state.comments,
            journal,
        })
    }
}

fn loaded(state: &TicketState) -> Result<&Ticket> {
    state
        .ticket
        .as_ref()
        .ok_or_else(|| HelpdeskError::Internal("no ticket loaded".into()))
}

fn check_assignee(requested: Option<ActorId>, record: Option<&Actor>) -> Result<()> {
    let Some(id) = requested else {
        return Ok(());
    };
    let actor = record
        .filter(|actor| actor.id == id)
        .ok_or_else(|| HelpdeskError::Internal(format!("assignee {id} was not loaded")))?;

    if !actor.role.is_staff() {
        return Err(HelpdeskError::validation(
            "assignee",
            format!("{} ({}) cannot be assigned tickets", actor.username, actor.role),
        ));
    }
    Ok(())
}

/// Keeping the current link is always allowed, even if that equipment was
/// retired since; switching to a different record requires it to be active.
fn check_equipment_link(
    requested: Option<EquipmentId>,
    record: Option<&Equipment>,
    current: Option<EquipmentId>,
) -> Result<()> {
    let Some(id) = requested else {
        return Ok(());
    };
    let equipment = record
        .filter(|equipment| equipment.id == id)
        .ok_or_else(|| HelpdeskError::Internal(format!("equipment {id} was not loaded")))?;

    if current != Some(id) && equipment.status == EquipmentStatus::Retired {
        return Err(HelpdeskError::validation(
            "equipment",
            format!("{} is retired and cannot be linked", equipment.name),
        ));
    }
    Ok(())
}
