//! Helpdesk service.
//!
//! The entry point for the request layer. Every operation takes the
//! authenticated actor (or `None`) first and runs the gate before it looks
//! anything up or changes anything. Mutations load the record inside the
//! repository's critical section, run the reducer on it, and persist the
//! result; a rejected command writes nothing.
//!
//! Order of checks:
//! 1. Input that guards an invariant (comment body length)
//! 2. The gate: role rules before any lookup; participant rules after the
//!    ticket is loaded (so a missing ticket is `NotFound`, not `Forbidden`)
//! 3. Referenced records (`ActorNotFound`, `NotFound`)
//! 4. The reducer's domain rules (`ValidationFailed`)

use crate::actions::{EquipmentAction, TicketAction};
use crate::constants::{actor as actor_limits, entity};
use crate::environment::HelpdeskEnvironment;
use crate::error::{HelpdeskError, Result};
use crate::gate::{self, Operation, TicketScope};
use crate::metrics;
use crate::providers::{ActorRepository, EquipmentRepository, TicketRepository};
use crate::reducers::{required_text, validate_comment_body, EquipmentOutcome, TicketOutcome};
use crate::state::{
    Actor, ActorId, Comment, Equipment, EquipmentDetails, EquipmentId, EquipmentState,
    EquipmentStatus, NewEquipment, NewTicket, Role, Ticket, TicketChanges, TicketDetail, TicketId,
    TicketState, STAFF_ROLES,
};
use tracing::{debug, error, info};

/// Helpdesk service.
///
/// # Type Parameters
///
/// - `A`: Actor repository
/// - `E`: Equipment repository
/// - `T`: Ticket repository
#[derive(Debug, Clone)]
pub struct Helpdesk<A, E, T> {
    actors: A,
    equipment: E,
    tickets: T,
    env: HelpdeskEnvironment,
}

fn log_storage_error(operation: &'static str) -> impl Fn(&HelpdeskError) {
    move |err| {
        if matches!(err, HelpdeskError::Storage(_) | HelpdeskError::Internal(_)) {
            error!(operation, error = %err, "Helpdesk operation failed");
        }
    }
}

impl<A, E, T> Helpdesk<A, E, T>
where
    A: ActorRepository,
    E: EquipmentRepository,
    T: TicketRepository,
{
    /// Create a service over the given repositories.
    #[must_use]
    pub const fn new(actors: A, equipment: E, tickets: T, env: HelpdeskEnvironment) -> Self {
        Self {
            actors,
            equipment,
            tickets,
            env,
        }
    }

    /// The environment the reducers run with.
    #[must_use]
    pub const fn environment(&self) -> &HelpdeskEnvironment {
        &self.env
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Actors
    // ═══════════════════════════════════════════════════════════════════════

    /// Register a new actor.
    ///
    /// Called by the registration flow, which has no authenticated actor yet.
    ///
    /// # Errors
    ///
    /// - [`HelpdeskError::ValidationFailed`] for an unknown role or a blank or
    ///   overlong username/email
    /// - [`HelpdeskError::DuplicateActor`] if the username or email is taken
    pub async fn register_actor(&self, username: &str, email: &str, role: &str) -> Result<Actor> {
        debug!(username, role, "Registering actor");

        let role: Role = role.parse()?;
        let username = required_text("username", username, actor_limits::USERNAME_MAX_CHARS)?;
        let email = required_text("email", email, actor_limits::EMAIL_MAX_CHARS)?;

        let id = self.actors.next_actor_id().await?;
        let actor = Actor {
            id,
            username,
            email,
            role,
            created_at: self.env.now(),
        };

        let actor = self
            .actors
            .insert_actor(&actor)
            .await
            .inspect_err(log_storage_error("register_actor"))?;

        info!(actor_id = %actor.id, role = %actor.role, "Actor registered");
        Ok(actor)
    }

    /// Resolve an actor id, as the request layer does after authentication.
    ///
    /// # Errors
    ///
    /// [`HelpdeskError::ActorNotFound`] if no actor has `id`.
    pub async fn lookup_actor(&self, id: ActorId) -> Result<Actor> {
        self.actors
            .find_actor(id)
            .await?
            .ok_or(HelpdeskError::ActorNotFound { id: id.get() })
    }

    /// Resolve a login name to its actor, as the request layer does at sign-in.
    ///
    /// Surrounding whitespace is ignored, matching how names are stored.
    ///
    /// # Errors
    ///
    /// Returns error if the backend fails.
    pub async fn lookup_actor_by_username(&self, username: &str) -> Result<Option<Actor>> {
        debug!(username, "Looking up actor by username");

        self.actors.find_actor_by_username(username.trim()).await
    }

    /// Staff who can be assigned tickets, by username.
    ///
    /// # Errors
    ///
    /// `Unauthorized`/`Forbidden` unless the caller is staff.
    pub async fn staff_directory(&self, actor: Option<&Actor>) -> Result<Vec<Actor>> {
        let actor = gate::require_role(actor, STAFF_ROLES)?;
        debug!(actor_id = %actor.id, "Listing staff directory");

        self.actors.find_actors_by_roles(STAFF_ROLES).await
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Equipment
    // ═══════════════════════════════════════════════════════════════════════

    /// Register a piece of equipment.
    ///
    /// # Errors
    ///
    /// - `Unauthorized`/`Forbidden` unless the caller is staff
    /// - [`HelpdeskError::DuplicateSerial`] if the serial number is in use
    /// - [`HelpdeskError::ValidationFailed`] for invalid fields
    pub async fn create_equipment(
        &self,
        actor: Option<&Actor>,
        equipment: NewEquipment,
    ) -> Result<Equipment> {
        let actor = gate::authorize(actor, Operation::CreateEquipment, None)?;
        debug!(actor_id = %actor.id, name = %equipment.details.name, "Creating equipment");

        let id = self.equipment.next_equipment_id().await?;
        let outcome = EquipmentOutcome::run(
            EquipmentState::default(),
            EquipmentAction::Register { id, equipment },
            &self.env,
        )?;

        let created = self
            .equipment
            .insert_equipment(&outcome.equipment)
            .await
            .inspect_err(log_storage_error("create_equipment"))?;

        info!(equipment_id = %created.id, status = created.status.as_str(), "Equipment created");
        Ok(created)
    }

    /// Replace the descriptive fields of a piece of equipment.
    ///
    /// Status and assignment are left alone.
    ///
    /// # Errors
    ///
    /// - `Unauthorized`/`Forbidden` unless the caller is staff
    /// - [`HelpdeskError::NotFound`] if no record has `id`
    /// - [`HelpdeskError::DuplicateSerial`] if another record has the serial
    /// - [`HelpdeskError::ValidationFailed`] for invalid fields
    pub async fn update_equipment(
        &self,
        actor: Option<&Actor>,
        id: EquipmentId,
        details: EquipmentDetails,
    ) -> Result<Equipment> {
        let actor = gate::authorize(actor, Operation::EditEquipment, None)?;
        debug!(actor_id = %actor.id, equipment_id = %id, "Updating equipment");

        let env = self.env.clone();
        let (updated, _journal) = self
            .equipment
            .update_equipment_with(id, move |current| {
                let outcome = EquipmentOutcome::run(
                    EquipmentState::from(current),
                    EquipmentAction::Revise { details },
                    &env,
                )?;
                Ok((outcome.equipment, outcome.journal))
            })
            .await
            .inspect_err(log_storage_error("update_equipment"))?;

        info!(equipment_id = %id, "Equipment updated");
        Ok(updated)
    }

    /// Issue equipment to an actor, or take it back with `None`.
    ///
    /// Assigning always sets status `Assigned`, whatever it was before;
    /// unassigning returns `Assigned` equipment to `InStock` and leaves
    /// `InRepair`/`Retired` as they are.
    ///
    /// # Errors
    ///
    /// - `Unauthorized`/`Forbidden` unless the caller is staff
    /// - [`HelpdeskError::ActorNotFound`] if `assignee` does not exist
    /// - [`HelpdeskError::NotFound`] if no record has `id`
    pub async fn assign_equipment(
        &self,
        actor: Option<&Actor>,
        id: EquipmentId,
        assignee: Option<ActorId>,
    ) -> Result<Equipment> {
        let actor = gate::authorize(actor, Operation::AssignEquipment, None)?;
        debug!(actor_id = %actor.id, equipment_id = %id, ?assignee, "Assigning equipment");

        if let Some(assignee) = assignee {
            self.lookup_actor(assignee).await?;
        }

        let env = self.env.clone();
        let (updated, journal) = self
            .equipment
            .update_equipment_with(id, move |current| {
                let outcome = EquipmentOutcome::run(
                    EquipmentState::from(current),
                    EquipmentAction::Assign { assignee },
                    &env,
                )?;
                Ok((outcome.equipment, outcome.journal))
            })
            .await
            .inspect_err(log_storage_error("assign_equipment"))?;

        metrics::record_equipment_events(&journal);
        info!(
            equipment_id = %id,
            status = updated.status.as_str(),
            assigned_to = ?updated.assigned_to,
            "Equipment assignment changed"
        );
        Ok(updated)
    }

    /// One equipment record.
    ///
    /// # Errors
    ///
    /// - `Unauthorized`/`Forbidden` unless the caller is staff
    /// - [`HelpdeskError::NotFound`] if no record has `id`
    pub async fn view_equipment(&self, actor: Option<&Actor>, id: EquipmentId) -> Result<Equipment> {
        let actor = gate::authorize(actor, Operation::ViewEquipment, None)?;
        debug!(actor_id = %actor.id, equipment_id = %id, "Viewing equipment");

        self.equipment
            .find_equipment(id)
            .await?
            .ok_or(HelpdeskError::NotFound {
                entity: entity::EQUIPMENT,
                id: id.get(),
            })
    }

    /// The inventory, by name.
    ///
    /// # Errors
    ///
    /// `Unauthorized`/`Forbidden` unless the caller is staff.
    pub async fn list_equipment(&self, actor: Option<&Actor>) -> Result<Vec<Equipment>> {
        let actor = gate::authorize(actor, Operation::ListEquipment, None)?;
        debug!(actor_id = %actor.id, "Listing equipment");

        self.equipment.list_equipment().await
    }

    /// Equipment a ticket may be linked to: everything not retired, by name.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for anonymous callers.
    pub async fn list_linkable_equipment(&self, actor: Option<&Actor>) -> Result<Vec<Equipment>> {
        let actor = gate::authorize(actor, Operation::BrowseLinkableEquipment, None)?;
        debug!(actor_id = %actor.id, "Listing linkable equipment");

        let mut equipment = self.equipment.list_equipment().await?;
        equipment.retain(|e| e.status != EquipmentStatus::Retired);
        Ok(equipment)
    }

    /// Equipment currently issued to `owner`.
    ///
    /// # Errors
    ///
    /// `Unauthorized`/`Forbidden` unless the caller is staff.
    pub async fn equipment_assigned_to(
        &self,
        actor: Option<&Actor>,
        owner: ActorId,
    ) -> Result<Vec<Equipment>> {
        let actor = gate::authorize(actor, Operation::ViewAssignedEquipment, None)?;
        debug!(actor_id = %actor.id, owner = %owner, "Listing assigned equipment");

        self.equipment.find_equipment_by_assignee(owner).await
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Tickets
    // ═══════════════════════════════════════════════════════════════════════

    /// File a ticket. The caller becomes its reporter.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` for anonymous callers
    /// - [`HelpdeskError::NotFound`] if the linked equipment does not exist
    /// - [`HelpdeskError::ValidationFailed`] for a blank or overlong title, a
    ///   blank description, or retired equipment
    pub async fn create_ticket(&self, actor: Option<&Actor>, ticket: NewTicket) -> Result<Ticket> {
        let actor = gate::authorize(actor, Operation::CreateTicket, None)?;
        debug!(actor_id = %actor.id, "Creating ticket");

        let equipment = self.linked_equipment(ticket.equipment).await?;
        let id = self.tickets.next_ticket_id().await?;
        let outcome = TicketOutcome::run(
            TicketState::default(),
            TicketAction::Open {
                id,
                reporter: actor.id,
                ticket,
                equipment,
            },
            &self.env,
        )?;

        let created = self
            .tickets
            .insert_ticket(&outcome.ticket)
            .await
            .inspect_err(log_storage_error("create_ticket"))?;

        metrics::record_ticket_events(&outcome.journal);
        info!(
            ticket_id = %created.id,
            reporter = %created.reporter,
            priority = created.priority.as_str(),
            "Ticket created"
        );
        Ok(created)
    }

    /// Apply a staff edit to a ticket.
    ///
    /// `changes` is the full set of new values; sending the same changes twice
    /// leaves the ticket as it was apart from `updated_at`.
    ///
    /// # Errors
    ///
    /// - `Unauthorized`/`Forbidden` unless the caller is staff
    /// - [`HelpdeskError::ActorNotFound`] if the assignee does not exist
    /// - [`HelpdeskError::NotFound`] if the ticket or linked equipment does not
    ///   exist
    /// - [`HelpdeskError::ValidationFailed`] for invalid fields, a non-staff
    ///   assignee, or newly linked retired equipment
    pub async fn update_ticket(
        &self,
        actor: Option<&Actor>,
        id: TicketId,
        changes: TicketChanges,
    ) -> Result<Ticket> {
        let actor = gate::authorize(actor, Operation::UpdateTicket, None)?;
        debug!(
            actor_id = %actor.id,
            ticket_id = %id,
            status = changes.status.as_str(),
            "Updating ticket"
        );

        let assignee = match changes.assignee {
            Some(assignee) => Some(self.lookup_actor(assignee).await?),
            None => None,
        };
        let equipment = self.linked_equipment(changes.equipment).await?;

        let env = self.env.clone();
        let (updated, journal) = self
            .tickets
            .update_ticket_with(id, move |current| {
                let outcome = TicketOutcome::run(
                    TicketState::from(current),
                    TicketAction::Update {
                        changes,
                        assignee,
                        equipment,
                    },
                    &env,
                )?;
                Ok((outcome.ticket, outcome.journal))
            })
            .await
            .inspect_err(log_storage_error("update_ticket"))?;

        metrics::record_ticket_events(&journal);
        info!(
            ticket_id = %id,
            status = updated.status.as_str(),
            assignee = ?updated.assignee,
            "Ticket updated"
        );
        Ok(updated)
    }

    /// A ticket and its comments, oldest comment first.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` for anonymous callers
    /// - [`HelpdeskError::NotFound`] if no ticket has `id`
    /// - [`HelpdeskError::Forbidden`] unless the caller is staff, the reporter
    ///   or the assignee
    pub async fn view_ticket(&self, actor: Option<&Actor>, id: TicketId) -> Result<TicketDetail> {
        gate::authenticate(actor, Operation::ViewTicket)?;
        let ticket = self.load_ticket(id).await?;
        let actor = gate::authorize(actor, Operation::ViewTicket, Some(&ticket))?;
        debug!(actor_id = %actor.id, ticket_id = %id, "Viewing ticket");

        let comments = self.tickets.find_comments(id).await?;
        Ok(TicketDetail { ticket, comments })
    }

    /// Tickets visible to the caller, newest first.
    ///
    /// Staff see every ticket; employees see the ones they filed.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for anonymous callers.
    pub async fn list_tickets(&self, actor: Option<&Actor>) -> Result<Vec<Ticket>> {
        let actor = gate::authorize(actor, Operation::ListTickets, None)?;
        let scope = gate::ticket_scope(actor);
        debug!(actor_id = %actor.id, ?scope, "Listing tickets");

        match scope {
            TicketScope::All => self.tickets.list_tickets().await,
            TicketScope::ReportedBy(reporter) => {
                self.tickets.find_tickets_by_reporter(reporter).await
            },
        }
    }

    /// Tickets assigned to the caller, newest first.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for anonymous callers.
    pub async fn tickets_assigned_to_me(&self, actor: Option<&Actor>) -> Result<Vec<Ticket>> {
        let actor = gate::authorize(actor, Operation::ViewOwnQueue, None)?;
        debug!(actor_id = %actor.id, "Listing assigned tickets");

        self.tickets.find_tickets_by_assignee(actor.id).await
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Comments
    // ═══════════════════════════════════════════════════════════════════════

    /// Append a comment to a ticket and refresh its `updated_at`.
    ///
    /// # Errors
    ///
    /// - [`HelpdeskError::ValidationFailed`] if the body is empty or too long
    /// - `Unauthorized` for anonymous callers
    /// - [`HelpdeskError::NotFound`] if no ticket has `ticket_id`
    /// - [`HelpdeskError::Forbidden`] unless the caller is staff, the reporter
    ///   or the assignee
    pub async fn add_comment(
        &self,
        actor: Option<&Actor>,
        ticket_id: TicketId,
        body: &str,
    ) -> Result<Comment> {
        validate_comment_body(body, self.env.limits)?;
        gate::authenticate(actor, Operation::AddComment)?;
        let ticket = self.load_ticket(ticket_id).await?;
        let actor = gate::authorize(actor, Operation::AddComment, Some(&ticket))?;
        debug!(actor_id = %actor.id, ticket_id = %ticket_id, "Adding comment");

        let id = self.tickets.next_comment_id().await?;
        let author = actor.id;
        let body = body.to_string();
        let env = self.env.clone();

        let (_ticket, comment, journal) = self
            .tickets
            .comment_with(ticket_id, move |current| {
                let outcome = TicketOutcome::run(
                    TicketState::from(current),
                    TicketAction::Comment {
                        id,
                        author,
                        body,
                    },
                    &env,
                )?;
                let comment = outcome.comments.last().cloned().ok_or_else(|| {
                    HelpdeskError::Internal("comment command produced no comment".into())
                })?;
                Ok((outcome.ticket, comment, outcome.journal))
            })
            .await
            .inspect_err(log_storage_error("add_comment"))?;

        metrics::record_ticket_events(&journal);
        info!(comment_id = %comment.id, ticket_id = %ticket_id, "Comment added");
        Ok(comment)
    }

    async fn load_ticket(&self, id: TicketId) -> Result<Ticket> {
        self.tickets
            .find_ticket(id)
            .await?
            .ok_or(HelpdeskError::NotFound {
                entity: entity::TICKET,
                id: id.get(),
            })
    }

    async fn linked_equipment(&self, id: Option<EquipmentId>) -> Result<Option<Equipment>> {
        let Some(id) = id else {
            return Ok(None);
        };
        self.equipment
            .find_equipment(id)
            .await?
            .map(Some)
            .ok_or(HelpdeskError::NotFound {
                entity: entity::EQUIPMENT,
                id: id.get(),
            })
    }
}
