//! Authorization gate.
//!
//! One explicit capability check, called at the start of every service
//! operation. It takes the actor (or `None` for anonymous), the operation, and
//! the target ticket when the rule depends on one, and returns a [`Decision`]
//! carrying a reason code.
//!
//! # Rules
//!
//! | Rule | Operations |
//! |------|------------|
//! | Staff (`it_support`, `admin`) | all equipment operations, ticket update |
//! | Any authenticated actor | ticket create/list, own assignment queue, linkable-equipment picker |
//! | Participant (staff, reporter or assignee) | ticket view, comment add |
//!
//! Holding a piece of equipment never grants access to its record.

use crate::error::{HelpdeskError, Result};
use crate::metrics;
use crate::state::{Actor, ActorId, Role, Ticket};
use std::fmt;

/// Operations the gate knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// List the equipment inventory.
    ListEquipment,
    /// Register equipment.
    CreateEquipment,
    /// View one equipment record.
    ViewEquipment,
    /// Edit the descriptive fields of equipment.
    EditEquipment,
    /// Issue or take back equipment.
    AssignEquipment,
    /// List the equipment held by an actor.
    ViewAssignedEquipment,
    /// List equipment a ticket may be linked to.
    BrowseLinkableEquipment,
    /// File a ticket.
    CreateTicket,
    /// List tickets (scoped per [`ticket_scope`]).
    ListTickets,
    /// List the tickets assigned to the caller.
    ViewOwnQueue,
    /// View a ticket and its comments.
    ViewTicket,
    /// Change a ticket's fields.
    UpdateTicket,
    /// Append a comment to a ticket.
    AddComment,
}

impl Operation {
    /// Stable name used in errors, logs and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListEquipment => "list_equipment",
            Self::CreateEquipment => "create_equipment",
            Self::ViewEquipment => "view_equipment",
            Self::EditEquipment => "edit_equipment",
            Self::AssignEquipment => "assign_equipment",
            Self::ViewAssignedEquipment => "view_assigned_equipment",
            Self::BrowseLinkableEquipment => "browse_linkable_equipment",
            Self::CreateTicket => "create_ticket",
            Self::ListTickets => "list_tickets",
            Self::ViewOwnQueue => "view_own_queue",
            Self::ViewTicket => "view_ticket",
            Self::UpdateTicket => "update_ticket",
            Self::AddComment => "add_comment",
        }
    }

    const fn rule(self) -> Rule {
        match self {
            Self::ListEquipment
            | Self::CreateEquipment
            | Self::ViewEquipment
            | Self::EditEquipment
            | Self::AssignEquipment
            | Self::ViewAssignedEquipment
            | Self::UpdateTicket => Rule::Staff,
            Self::BrowseLinkableEquipment
            | Self::CreateTicket
            | Self::ListTickets
            | Self::ViewOwnQueue => Rule::Authenticated,
            Self::ViewTicket | Self::AddComment => Rule::Participant,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Authenticated,
    Staff,
    Participant,
}

/// Why an operation was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    /// No authenticated actor.
    Anonymous,
    /// The actor's role is not allowed.
    RoleNotAllowed,
    /// The actor is neither staff, reporter nor assignee of the ticket.
    NotParticipant,
    /// The rule needs a target ticket and none was given.
    MissingTarget,
}

impl DenyReason {
    /// Stable reason code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Anonymous => "anonymous",
            Self::RoleNotAllowed => "role_not_allowed",
            Self::NotParticipant => "not_participant",
            Self::MissingTarget => "missing_target",
        }
    }
}

/// Outcome of a gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The operation may proceed.
    Allow,
    /// The operation is refused.
    Deny(DenyReason),
}

impl Decision {
    /// `true` for [`Decision::Allow`].
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

/// Decide whether `actor` may perform `operation` on `target`.
///
/// `target` is only consulted by participant rules (ticket view and comment).
///
/// ```
/// use helpdesk::gate::{decide, Decision, DenyReason, Operation};
///
/// assert_eq!(
///     decide(None, Operation::CreateTicket, None),
///     Decision::Deny(DenyReason::Anonymous)
/// );
/// ```
#[must_use]
pub fn decide(actor: Option<&Actor>, operation: Operation, target: Option<&Ticket>) -> Decision {
    let Some(actor) = actor else {
        return Decision::Deny(DenyReason::Anonymous);
    };

    match operation.rule() {
        Rule::Authenticated => Decision::Allow,
        Rule::Staff if actor.role.is_staff() => Decision::Allow,
        Rule::Staff => Decision::Deny(DenyReason::RoleNotAllowed),
        Rule::Participant if actor.role.is_staff() => Decision::Allow,
        Rule::Participant => match target {
            Some(ticket) if ticket.involves(actor.id) => Decision::Allow,
            Some(_) => Decision::Deny(DenyReason::NotParticipant),
            None => Decision::Deny(DenyReason::MissingTarget),
        },
    }
}

/// Boolean form of [`decide`].
#[must_use]
pub fn can_access(actor: Option<&Actor>, operation: Operation, target: Option<&Ticket>) -> bool {
    decide(actor, operation, target).is_allowed()
}

const REQUIRE_ROLE: &str = "require_role";

/// Require the actor to hold one of `allowed`.
///
/// Denials are logged and counted under the `require_role` label.
///
/// # Errors
///
/// - [`HelpdeskError::Unauthorized`] when `actor` is `None`
/// - [`HelpdeskError::Forbidden`] when the actor's role is not in `allowed`
pub fn require_role<'a>(actor: Option<&'a Actor>, allowed: &[Role]) -> Result<&'a Actor> {
    let Some(actor) = actor else {
        tracing::warn!(?allowed, "Anonymous request denied");
        metrics::record_access_denied(REQUIRE_ROLE);
        return Err(HelpdeskError::Unauthorized);
    };
    if allowed.contains(&actor.role) {
        return Ok(actor);
    }

    tracing::warn!(actor_id = %actor.id, role = %actor.role, ?allowed, "Role not allowed");
    metrics::record_access_denied(REQUIRE_ROLE);
    Err(HelpdeskError::Forbidden {
        operation: REQUIRE_ROLE,
        reason: DenyReason::RoleNotAllowed.as_str(),
    })
}

/// Run the gate and turn a denial into an error.
///
/// Denials are logged and counted.
///
/// # Errors
///
/// - [`HelpdeskError::Unauthorized`] for anonymous callers
/// - [`HelpdeskError::Forbidden`] for every other denial
pub fn authorize<'a>(
    actor: Option<&'a Actor>,
    operation: Operation,
    target: Option<&Ticket>,
) -> Result<&'a Actor> {
    match (decide(actor, operation, target), actor) {
        (Decision::Allow, Some(actor)) => Ok(actor),
        (Decision::Allow, None) | (Decision::Deny(DenyReason::Anonymous), _) => {
            tracing::warn!(operation = %operation, "Anonymous request denied");
            metrics::record_access_denied(operation.as_str());
            Err(HelpdeskError::Unauthorized)
        },
        (Decision::Deny(reason), _) => {
            tracing::warn!(
                operation = %operation,
                actor_id = ?actor.map(|a| a.id),
                reason = reason.as_str(),
                "Access denied"
            );
            metrics::record_access_denied(operation.as_str());
            Err(HelpdeskError::Forbidden {
                operation: operation.as_str(),
                reason: reason.as_str(),
            })
        },
    }
}

/// Reject anonymous callers before a target record is looked up.
///
/// Participant rules need the ticket, but an anonymous caller must not learn
/// whether it exists; call this first, then [`authorize`] with the record.
///
/// # Errors
///
/// [`HelpdeskError::Unauthorized`] when `actor` is `None`.
pub fn authenticate(actor: Option<&Actor>, operation: Operation) -> Result<&Actor> {
    actor.ok_or_else(|| {
        tracing::warn!(operation = %operation, "Anonymous request denied");
        metrics::record_access_denied(operation.as_str());
        HelpdeskError::Unauthorized
    })
}

/// Which tickets a list request may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketScope {
    /// Every ticket.
    All,
    /// Only tickets filed by this actor.
    ReportedBy(ActorId),
}

/// List scope for `actor`: staff see everything, employees their own tickets.
#[must_use]
pub fn ticket_scope(actor: &Actor) -> TicketScope {
    if actor.role.is_staff() {
        TicketScope::All
    } else {
        TicketScope::ReportedBy(actor.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Priority, TicketId, TicketStatus, STAFF_ROLES};
    use ::metrics::{
        Counter, CounterFn, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
    };
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Tallies `helpdesk_access_denied_total` increments by `operation` label.
    #[derive(Default)]
    struct DenialRecorder {
        tallies: Arc<Mutex<HashMap<String, u64>>>,
    }

    impl DenialRecorder {
        fn count(&self, operation: &str) -> u64 {
            self.tallies
                .lock()
                .map(|t| t.get(operation).copied().unwrap_or(0))
                .unwrap_or(0)
        }
    }

    struct Tally {
        operation: String,
        tallies: Arc<Mutex<HashMap<String, u64>>>,
    }

    impl CounterFn for Tally {
        fn increment(&self, value: u64) {
            if let Ok(mut tallies) = self.tallies.lock() {
                *tallies.entry(self.operation.clone()).or_default() += value;
            }
        }

        fn absolute(&self, value: u64) {
            if let Ok(mut tallies) = self.tallies.lock() {
                tallies.insert(self.operation.clone(), value);
            }
        }
    }

    impl Recorder for DenialRecorder {
        fn describe_counter(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_gauge(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}
        fn describe_histogram(&self, _: KeyName, _: Option<Unit>, _: SharedString) {}

        fn register_counter(&self, key: &Key, _: &Metadata<'_>) -> Counter {
            if key.name() != "helpdesk_access_denied_total" {
                return Counter::noop();
            }
            let operation = key
                .labels()
                .find(|label| label.key() == "operation")
                .map(|label| label.value().to_string())
                .unwrap_or_default();
            Counter::from_arc(Arc::new(Tally {
                operation,
                tallies: Arc::clone(&self.tallies),
            }))
        }

        fn register_gauge(&self, _: &Key, _: &Metadata<'_>) -> Gauge {
            Gauge::noop()
        }

        fn register_histogram(&self, _: &Key, _: &Metadata<'_>) -> Histogram {
            Histogram::noop()
        }
    }

    fn actor(id: i64, role: Role) -> Actor {
        Actor {
            id: ActorId(id),
            username: format!("user{id}"),
            email: format!("user{id}@example.com"),
            role,
            created_at: Utc.timestamp_opt(0, 0).single().unwrap_or_default(),
        }
    }

    fn ticket(reporter: i64, assignee: Option<i64>) -> Ticket {
        let now = Utc.timestamp_opt(0, 0).single().unwrap_or_default();
        Ticket {
            id: TicketId(1),
            title: "PC Broken".to_string(),
            description: "Will not boot".to_string(),
            status: TicketStatus::Open,
            priority: Priority::Medium,
            reporter: ActorId(reporter),
            assignee: assignee.map(ActorId),
            equipment: None,
            created_at: now,
            updated_at: now,
            resolved_at: None,
        }
    }

    #[test]
    fn anonymous_is_denied_everything() {
        assert_eq!(
            decide(None, Operation::CreateTicket, None),
            Decision::Deny(DenyReason::Anonymous)
        );
        assert_eq!(
            authorize(None, Operation::ListTickets, None),
            Err(HelpdeskError::Unauthorized)
        );
    }

    #[test]
    fn equipment_operations_require_staff() {
        let employee = actor(1, Role::Employee);
        let support = actor(2, Role::ItSupport);
        let admin = actor(3, Role::Admin);

        for operation in [
            Operation::ListEquipment,
            Operation::CreateEquipment,
            Operation::ViewEquipment,
            Operation::EditEquipment,
            Operation::AssignEquipment,
        ] {
            assert!(!can_access(Some(&employee), operation, None), "{operation}");
            assert!(can_access(Some(&support), operation, None), "{operation}");
            assert!(can_access(Some(&admin), operation, None), "{operation}");
        }
    }

    #[test]
    fn any_actor_may_file_and_list() {
        let employee = actor(1, Role::Employee);
        assert!(can_access(Some(&employee), Operation::CreateTicket, None));
        assert!(can_access(Some(&employee), Operation::ListTickets, None));
        assert!(can_access(Some(&employee), Operation::BrowseLinkableEquipment, None));
    }

    #[test]
    fn ticket_view_follows_participation() {
        let reporter = actor(1, Role::Employee);
        let assignee = actor(2, Role::Employee);
        let stranger = actor(3, Role::Employee);
        let support = actor(4, Role::ItSupport);
        let target = ticket(1, Some(2));

        for operation in [Operation::ViewTicket, Operation::AddComment] {
            assert!(can_access(Some(&reporter), operation, Some(&target)));
            assert!(can_access(Some(&assignee), operation, Some(&target)));
            assert!(can_access(Some(&support), operation, Some(&target)));
            assert_eq!(
                decide(Some(&stranger), operation, Some(&target)),
                Decision::Deny(DenyReason::NotParticipant)
            );
        }
    }

    #[test]
    fn participant_rule_without_target_is_denied() {
        let employee = actor(1, Role::Employee);
        assert_eq!(
            decide(Some(&employee), Operation::ViewTicket, None),
            Decision::Deny(DenyReason::MissingTarget)
        );
    }

    #[test]
    fn ticket_update_is_staff_only_even_for_reporter() {
        let reporter = actor(1, Role::Employee);
        let target = ticket(1, None);

        assert_eq!(
            authorize(Some(&reporter), Operation::UpdateTicket, Some(&target)),
            Err(HelpdeskError::Forbidden {
                operation: "update_ticket",
                reason: "role_not_allowed",
            })
        );
    }

    #[test]
    fn require_role_checks_membership() {
        let employee = actor(1, Role::Employee);
        let admin = actor(2, Role::Admin);

        assert_eq!(require_role(None, STAFF_ROLES), Err(HelpdeskError::Unauthorized));
        assert!(matches!(
            require_role(Some(&employee), STAFF_ROLES),
            Err(HelpdeskError::Forbidden { .. })
        ));
        assert_eq!(require_role(Some(&admin), &[Role::Admin]), Ok(&admin));
    }

    #[test]
    fn require_role_denials_are_counted() {
        let recorder = DenialRecorder::default();
        let employee = actor(1, Role::Employee);
        let support = actor(2, Role::ItSupport);

        ::metrics::with_local_recorder(&recorder, || {
            let _ = require_role(None, STAFF_ROLES);
            let _ = require_role(Some(&employee), STAFF_ROLES);
            let _ = require_role(Some(&support), STAFF_ROLES);
        });

        assert_eq!(recorder.count("require_role"), 2);
    }

    #[test]
    fn authorize_denials_are_counted_per_operation() {
        let recorder = DenialRecorder::default();
        let employee = actor(1, Role::Employee);

        ::metrics::with_local_recorder(&recorder, || {
            let _ = authorize(None, Operation::CreateTicket, None);
            let _ = authorize(Some(&employee), Operation::ListEquipment, None);
            let _ = authorize(Some(&employee), Operation::CreateTicket, None);
        });

        assert_eq!(recorder.count("create_ticket"), 1);
        assert_eq!(recorder.count("list_equipment"), 1);
    }

    #[test]
    fn list_scope_depends_on_role() {
        assert_eq!(ticket_scope(&actor(1, Role::Employee)), TicketScope::ReportedBy(ActorId(1)));
        assert_eq!(ticket_scope(&actor(2, Role::ItSupport)), TicketScope::All);
        assert_eq!(ticket_scope(&actor(3, Role::Admin)), TicketScope::All);
    }
}
