//! Helpdesk state types.
//!
//! Records (actors, equipment, tickets, comments), the inputs used to create
//! and change them, and the reducer states wrapping a single record. All types
//! are `Clone` so a fresh reducer state can be built per request.

use crate::error::HelpdeskError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// The raw database identifier.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Unique identifier for an actor.
    ActorId
);
record_id!(
    /// Unique identifier for an equipment record.
    EquipmentId
);
record_id!(
    /// Unique identifier for a ticket.
    TicketId
);
record_id!(
    /// Unique identifier for a comment.
    CommentId
);

// ═══════════════════════════════════════════════════════════════════════
// Identity & Roles
// ═══════════════════════════════════════════════════════════════════════

/// Authorization level of an actor. Fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Files tickets and follows their own.
    Employee,
    /// Triages tickets and manages inventory.
    ItSupport,
    /// Same powers as IT support.
    Admin,
}

/// Roles allowed to manage inventory and work tickets.
pub const STAFF_ROLES: &[Role] = &[Role::ItSupport, Role::Admin];

impl Role {
    /// Stable string form, as stored and as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::ItSupport => "it_support",
            Self::Admin => "admin",
        }
    }

    /// `true` for `it_support` and `admin`.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::ItSupport | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = HelpdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "employee" => Ok(Self::Employee),
            "it_support" => Ok(Self::ItSupport),
            "admin" => Ok(Self::Admin),
            other => Err(HelpdeskError::validation(
                "role",
                format!("unknown role '{other}'"),
            )),
        }
    }
}

/// An authenticated user of the helpdesk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Unique identifier.
    pub id: ActorId,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Authorization level.
    pub role: Role,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

// ═══════════════════════════════════════════════════════════════════════
// Equipment
// ═══════════════════════════════════════════════════════════════════════

/// Kind of physical asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentType {
    /// Laptop computer.
    Laptop,
    /// Desktop computer.
    Desktop,
    /// Display.
    Monitor,
    /// Keyboard.
    Keyboard,
    /// Mouse.
    Mouse,
    /// Printer.
    Printer,
    /// Network router.
    Router,
    /// Network switch.
    Switch,
    /// Server.
    Server,
    /// Anything else.
    Other,
}

impl EquipmentType {
    /// Every equipment type, in display order.
    pub const ALL: [Self; 10] = [
        Self::Laptop,
        Self::Desktop,
        Self::Monitor,
        Self::Keyboard,
        Self::Mouse,
        Self::Printer,
        Self::Router,
        Self::Switch,
        Self::Server,
        Self::Other,
    ];

    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Laptop => "Laptop",
            Self::Desktop => "Desktop",
            Self::Monitor => "Monitor",
            Self::Keyboard => "Keyboard",
            Self::Mouse => "Mouse",
            Self::Printer => "Printer",
            Self::Router => "Router",
            Self::Switch => "Switch",
            Self::Server => "Server",
            Self::Other => "Other",
        }
    }
}

impl FromStr for EquipmentType {
    type Err = HelpdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| HelpdeskError::validation("type", format!("unknown equipment type '{s}'")))
    }
}

/// Where a piece of equipment currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EquipmentStatus {
    /// Available for assignment.
    #[default]
    #[serde(rename = "In Stock")]
    InStock,
    /// Issued to an actor. Always paired with an assignee.
    Assigned,
    /// Out for repair.
    #[serde(rename = "In Repair")]
    InRepair,
    /// Decommissioned.
    Retired,
}

impl EquipmentStatus {
    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InStock => "In Stock",
            Self::Assigned => "Assigned",
            Self::InRepair => "In Repair",
            Self::Retired => "Retired",
        }
    }
}

impl FromStr for EquipmentStatus {
    type Err = HelpdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "In Stock" => Ok(Self::InStock),
            "Assigned" => Ok(Self::Assigned),
            "In Repair" => Ok(Self::InRepair),
            "Retired" => Ok(Self::Retired),
            other => Err(HelpdeskError::validation(
                "status",
                format!("unknown equipment status '{other}'"),
            )),
        }
    }
}

/// Editable descriptive fields of an equipment record.
///
/// Status and assignment are deliberately absent: they only change through
/// assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentDetails {
    /// Display name.
    pub name: String,
    /// Kind of asset.
    pub equipment_type: EquipmentType,
    /// Serial number, unique across all equipment when present.
    pub serial_number: Option<String>,
    /// Manufacturer.
    pub manufacturer: Option<String>,
    /// Model number.
    pub model: Option<String>,
    /// Purchase date.
    pub purchase_date: Option<NaiveDate>,
    /// Warranty expiry date.
    pub warranty_expiry: Option<NaiveDate>,
    /// Free-form notes.
    pub notes: Option<String>,
}

impl EquipmentDetails {
    /// Details with only the required fields set.
    #[must_use]
    pub fn new(name: impl Into<String>, equipment_type: EquipmentType) -> Self {
        Self {
            name: name.into(),
            equipment_type,
            serial_number: None,
            manufacturer: None,
            model: None,
            purchase_date: None,
            warranty_expiry: None,
            notes: None,
        }
    }

    /// Set the serial number.
    #[must_use]
    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_number = Some(serial.into());
        self
    }
}

/// Input for registering a new piece of equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEquipment {
    /// Descriptive fields.
    pub details: EquipmentDetails,
    /// Initial status; `InStock` when absent. `Assigned` is rejected.
    pub status: Option<EquipmentStatus>,
}

impl From<EquipmentDetails> for NewEquipment {
    fn from(details: EquipmentDetails) -> Self {
        Self {
            details,
            status: None,
        }
    }
}

/// A physical asset tracked by the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equipment {
    /// Unique identifier.
    pub id: EquipmentId,
    /// Display name.
    pub name: String,
    /// Kind of asset.
    pub equipment_type: EquipmentType,
    /// Serial number, unique across all equipment when present.
    pub serial_number: Option<String>,
    /// Manufacturer.
    pub manufacturer: Option<String>,
    /// Model number.
    pub model: Option<String>,
    /// Purchase date.
    pub purchase_date: Option<NaiveDate>,
    /// Warranty expiry date.
    pub warranty_expiry: Option<NaiveDate>,
    /// Current status.
    pub status: EquipmentStatus,
    /// Actor the equipment is issued to.
    pub assigned_to: Option<ActorId>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Equipment {
    /// The editable descriptive fields of this record.
    #[must_use]
    pub fn details(&self) -> EquipmentDetails {
        EquipmentDetails {
            name: self.name.clone(),
            equipment_type: self.equipment_type,
            serial_number: self.serial_number.clone(),
            manufacturer: self.manufacturer.clone(),
            model: self.model.clone(),
            purchase_date: self.purchase_date,
            warranty_expiry: self.warranty_expiry,
            notes: self.notes.clone(),
        }
    }

    /// Overwrite the descriptive fields, leaving status and assignment alone.
    pub fn apply_details(&mut self, details: EquipmentDetails) {
        self.name = details.name;
        self.equipment_type = details.equipment_type;
        self.serial_number = details.serial_number;
        self.manufacturer = details.manufacturer;
        self.model = details.model;
        self.purchase_date = details.purchase_date;
        self.warranty_expiry = details.warranty_expiry;
        self.notes = details.notes;
    }

    /// `status == Assigned` exactly when an assignee is present.
    #[must_use]
    pub const fn assignment_consistent(&self) -> bool {
        matches!(self.status, EquipmentStatus::Assigned) == self.assigned_to.is_some()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Tickets
// ═══════════════════════════════════════════════════════════════════════

/// Ticket workflow status. Any status may move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TicketStatus {
    /// Newly filed.
    #[default]
    Open,
    /// Being worked.
    #[serde(rename = "In Progress")]
    InProgress,
    /// Fixed.
    Resolved,
    /// Done, whether fixed or not.
    Closed,
}

impl TicketStatus {
    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
        }
    }

    /// `true` for `Resolved` and `Closed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

impl FromStr for TicketStatus {
    type Err = HelpdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Open" => Ok(Self::Open),
            "In Progress" => Ok(Self::InProgress),
            "Resolved" => Ok(Self::Resolved),
            "Closed" => Ok(Self::Closed),
            other => Err(HelpdeskError::validation(
                "status",
                format!("unknown ticket status '{other}'"),
            )),
        }
    }
}

/// What a status transition does to `resolved_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionChange {
    /// Entering `Resolved`/`Closed` from outside: stamp `resolved_at`.
    Set,
    /// Leaving `Resolved`/`Closed`: clear `resolved_at`.
    Clear,
    /// Staying on the same side: leave it alone.
    Keep,
}

impl ResolutionChange {
    /// Classify the transition `old -> new`.
    ///
    /// ```
    /// use helpdesk::state::{ResolutionChange, TicketStatus};
    ///
    /// assert_eq!(
    ///     ResolutionChange::between(TicketStatus::Open, TicketStatus::Resolved),
    ///     ResolutionChange::Set
    /// );
    /// assert_eq!(
    ///     ResolutionChange::between(TicketStatus::Resolved, TicketStatus::Closed),
    ///     ResolutionChange::Keep
    /// );
    /// ```
    #[must_use]
    pub const fn between(old: TicketStatus, new: TicketStatus) -> Self {
        match (old.is_terminal(), new.is_terminal()) {
            (false, true) => Self::Set,
            (true, false) => Self::Clear,
            _ => Self::Keep,
        }
    }
}

/// Ticket urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    /// Low.
    Low,
    /// Medium (default).
    #[default]
    Medium,
    /// High.
    High,
    /// Urgent.
    Urgent,
}

impl Priority {
    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Urgent => "Urgent",
        }
    }
}

impl FromStr for Priority {
    type Err = HelpdeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Low" => Ok(Self::Low),
            "Medium" => Ok(Self::Medium),
            "High" => Ok(Self::High),
            "Urgent" => Ok(Self::Urgent),
            other => Err(HelpdeskError::validation(
                "priority",
                format!("unknown priority '{other}'"),
            )),
        }
    }
}

/// A support request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique identifier.
    pub id: TicketId,
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Workflow status.
    pub status: TicketStatus,
    /// Urgency.
    pub priority: Priority,
    /// Actor who filed the ticket. Never changes.
    pub reporter: ActorId,
    /// Staff member working the ticket.
    pub assignee: Option<ActorId>,
    /// Linked equipment.
    pub equipment: Option<EquipmentId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp (including new comments).
    pub updated_at: DateTime<Utc>,
    /// Set exactly while the status is `Resolved` or `Closed`.
    pub resolved_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// `resolved_at` is present exactly when the status is terminal.
    #[must_use]
    pub const fn resolution_consistent(&self) -> bool {
        self.status.is_terminal() == self.resolved_at.is_some()
    }

    /// `true` if `actor` filed or is assigned this ticket.
    #[must_use]
    pub fn involves(&self, actor: ActorId) -> bool {
        self.reporter == actor || self.assignee == Some(actor)
    }
}

/// Input for filing a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTicket {
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Urgency; `Medium` when absent.
    pub priority: Option<Priority>,
    /// Equipment the ticket is about.
    pub equipment: Option<EquipmentId>,
}

impl NewTicket {
    /// A ticket with default priority and no linked equipment.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            priority: None,
            equipment: None,
        }
    }

    /// Set the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Link equipment.
    #[must_use]
    pub const fn with_equipment(mut self, equipment: EquipmentId) -> Self {
        self.equipment = Some(equipment);
        self
    }
}

/// Full set of staff-editable ticket fields.
///
/// Every field is written on update; `None` clears the assignee or the
/// equipment link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketChanges {
    /// Short summary.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Workflow status.
    pub status: TicketStatus,
    /// Urgency.
    pub priority: Priority,
    /// Staff member to work the ticket.
    pub assignee: Option<ActorId>,
    /// Linked equipment.
    pub equipment: Option<EquipmentId>,
}

impl From<&Ticket> for TicketChanges {
    fn from(ticket: &Ticket) -> Self {
        Self {
            title: ticket.title.clone(),
            description: ticket.description.clone(),
            status: ticket.status,
            priority: ticket.priority,
            assignee: ticket.assignee,
            equipment: ticket.equipment,
        }
    }
}

impl TicketChanges {
    /// Change the status.
    #[must_use]
    pub const fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = status;
        self
    }

    /// Change or clear the assignee.
    #[must_use]
    pub const fn with_assignee(mut self, assignee: Option<ActorId>) -> Self {
        self.assignee = assignee;
        self
    }

    /// Change or clear the equipment link.
    #[must_use]
    pub const fn with_equipment(mut self, equipment: Option<EquipmentId>) -> Self {
        self.equipment = equipment;
        self
    }
}

/// An immutable note on a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier.
    pub id: CommentId,
    /// Ticket the comment belongs to.
    pub ticket: TicketId,
    /// Actor who wrote it.
    pub author: ActorId,
    /// Text, 1 to 1024 characters.
    pub body: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A ticket with its comments, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDetail {
    /// The ticket.
    pub ticket: Ticket,
    /// Its comments in ascending creation order.
    pub comments: Vec<Comment>,
}

// ═══════════════════════════════════════════════════════════════════════
// Reducer States
// ═══════════════════════════════════════════════════════════════════════

/// State of the equipment reducer: one record for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EquipmentState {
    /// The record; `None` before registration.
    pub equipment: Option<Equipment>,
    /// Validation failure raised by the last command.
    pub last_error: Option<HelpdeskError>,
}

impl From<Equipment> for EquipmentState {
    fn from(equipment: Equipment) -> Self {
        Self {
            equipment: Some(equipment),
            last_error: None,
        }
    }
}

/// State of the ticket reducer: one ticket for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketState {
    /// The ticket; `None` before it is opened.
    pub ticket: Option<Ticket>,
    /// Comments added during this request.
    pub comments: Vec<Comment>,
    /// Validation failure raised by the last command.
    pub last_error: Option<HelpdeskError>,
}

impl From<Ticket> for TicketState {
    fn from(ticket: Ticket) -> Self {
        Self {
            ticket: Some(ticket),
            comments: Vec::new(),
            last_error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_rejects_unknown_roles() {
        assert_eq!("it_support".parse::<Role>(), Ok(Role::ItSupport));
        assert!(matches!(
            "superuser".parse::<Role>(),
            Err(HelpdeskError::ValidationFailed { field: "role", .. })
        ));
    }

    #[test]
    fn only_it_support_and_admin_are_staff() {
        assert!(!Role::Employee.is_staff());
        assert!(Role::ItSupport.is_staff());
        assert!(Role::Admin.is_staff());
    }

    #[test]
    fn resolution_change_covers_every_transition() {
        use TicketStatus::{Closed, InProgress, Open, Resolved};

        for old in [Open, InProgress, Resolved, Closed] {
            for new in [Open, InProgress, Resolved, Closed] {
                let expected = match (old.is_terminal(), new.is_terminal()) {
                    (false, true) => ResolutionChange::Set,
                    (true, false) => ResolutionChange::Clear,
                    _ => ResolutionChange::Keep,
                };
                assert_eq!(ResolutionChange::between(old, new), expected, "{old:?} -> {new:?}");
            }
        }
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            EquipmentStatus::InStock,
            EquipmentStatus::Assigned,
            EquipmentStatus::InRepair,
            EquipmentStatus::Retired,
        ] {
            assert_eq!(status.as_str().parse::<EquipmentStatus>(), Ok(status));
        }
        assert_eq!("In Progress".parse::<TicketStatus>(), Ok(TicketStatus::InProgress));
        assert_eq!("Router".parse::<EquipmentType>(), Ok(EquipmentType::Router));
    }

    #[test]
    fn defaults_match_new_records() {
        assert_eq!(TicketStatus::default(), TicketStatus::Open);
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(EquipmentStatus::default(), EquipmentStatus::InStock);
    }
}
