//! Business metrics for the helpdesk.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `helpdesk_tickets_opened_total` - Tickets filed
//! - `helpdesk_tickets_resolved_total` - Tickets entering `Resolved`/`Closed`
//! - `helpdesk_tickets_reopened_total` - Tickets leaving `Resolved`/`Closed`
//! - `helpdesk_comments_added_total` - Comments appended
//! - `helpdesk_equipment_assignments_total{action}` - Equipment issued (`assign`)
//!   or taken back (`unassign`)
//! - `helpdesk_access_denied_total{operation}` - Gate denials
//!
//! No exporter is installed here; without a recorder every call is a no-op.

use crate::actions::{EquipmentAction, TicketAction};
use metrics::describe_counter;

/// Register all metric descriptions.
///
/// Call once at startup, before any metrics are recorded.
pub fn register_metrics() {
    describe_counter!("helpdesk_tickets_opened_total", "Total number of tickets filed");
    describe_counter!(
        "helpdesk_tickets_resolved_total",
        "Total number of tickets moved into Resolved or Closed"
    );
    describe_counter!(
        "helpdesk_tickets_reopened_total",
        "Total number of tickets moved out of Resolved or Closed"
    );
    describe_counter!("helpdesk_comments_added_total", "Total number of comments added");
    describe_counter!(
        "helpdesk_equipment_assignments_total",
        "Total number of equipment assignment changes by action (assign, unassign)"
    );
    describe_counter!(
        "helpdesk_access_denied_total",
        "Total number of requests refused by the authorization gate, by operation"
    );

    tracing::info!("Helpdesk metrics registered");
}

// ============================================================================
// Metric Recording Functions
// ============================================================================

/// Record a ticket being filed.
pub fn record_ticket_opened() {
    metrics::counter!("helpdesk_tickets_opened_total").increment(1);
    tracing::debug!("Recorded ticket_opened metric");
}

/// Record a ticket entering `Resolved`/`Closed`.
pub fn record_ticket_resolved() {
    metrics::counter!("helpdesk_tickets_resolved_total").increment(1);
    tracing::debug!("Recorded ticket_resolved metric");
}

/// Record a ticket leaving `Resolved`/`Closed`.
pub fn record_ticket_reopened() {
    metrics::counter!("helpdesk_tickets_reopened_total").increment(1);
    tracing::debug!("Recorded ticket_reopened metric");
}

/// Record a comment being added.
pub fn record_comment_added() {
    metrics::counter!("helpdesk_comments_added_total").increment(1);
    tracing::debug!("Recorded comment_added metric");
}

/// Record an equipment assignment change.
///
/// # Arguments
///
/// * `action` - `"assign"` or `"unassign"`
pub fn record_equipment_assignment(action: &'static str) {
    metrics::counter!("helpdesk_equipment_assignments_total", "action" => action).increment(1);
    tracing::debug!(action, "Recorded equipment_assignment metric");
}

/// Record a gate denial.
///
/// # Arguments
///
/// * `operation` - Name of the refused operation
pub fn record_access_denied(operation: &'static str) {
    metrics::counter!("helpdesk_access_denied_total", "operation" => operation).increment(1);
    tracing::debug!(operation, "Recorded access_denied metric");
}

/// Record the metrics for every event in a committed ticket journal.
pub fn record_ticket_events(journal: &[TicketAction]) {
    for action in journal {
        match action {
            TicketAction::Opened { .. } => record_ticket_opened(),
            TicketAction::Resolved { .. } => record_ticket_resolved(),
            TicketAction::Reopened { .. } => record_ticket_reopened(),
            TicketAction::Commented { .. } => record_comment_added(),
            _ => {},
        }
    }
}

/// Record the metrics for every event in a committed equipment journal.
pub fn record_equipment_events(journal: &[EquipmentAction]) {
    for action in journal {
        match action {
            EquipmentAction::Assigned { .. } => record_equipment_assignment("assign"),
            EquipmentAction::Unassigned { .. } => record_equipment_assignment("unassign"),
            _ => {},
        }
    }
}
